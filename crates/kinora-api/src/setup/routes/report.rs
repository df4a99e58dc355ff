//! Startup listing of the exposed operations.

/// How an operation moves data between caller and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    Unary,
    ClientStream,
    ServerStream,
}

impl CallShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallShape::Unary => "UNARY",
            CallShape::ClientStream => "CLIENT STREAM",
            CallShape::ServerStream => "SERVER STREAM",
        }
    }
}

pub struct RouteInfo {
    pub operation: &'static str,
    pub method: &'static str,
    pub path: &'static str,
    pub shape: CallShape,
}

pub const ROUTES: &[RouteInfo] = &[
    RouteInfo {
        operation: "CreateMedia",
        method: "POST",
        path: "/api/v0/media",
        shape: CallShape::Unary,
    },
    RouteInfo {
        operation: "ListMedia",
        method: "GET",
        path: "/api/v0/media",
        shape: CallShape::Unary,
    },
    RouteInfo {
        operation: "GetMedia",
        method: "GET",
        path: "/api/v0/media/{id}",
        shape: CallShape::Unary,
    },
    RouteInfo {
        operation: "UpdateMedia",
        method: "PATCH",
        path: "/api/v0/media/{id}",
        shape: CallShape::Unary,
    },
    RouteInfo {
        operation: "DeleteMedia",
        method: "DELETE",
        path: "/api/v0/media/{id}",
        shape: CallShape::Unary,
    },
    RouteInfo {
        operation: "UploadFile",
        method: "PUT",
        path: "/api/v0/media/{id}/content",
        shape: CallShape::ClientStream,
    },
    RouteInfo {
        operation: "DownloadFile",
        method: "GET",
        path: "/api/v0/media/{id}/content",
        shape: CallShape::ServerStream,
    },
    RouteInfo {
        operation: "PresignUpload",
        method: "POST",
        path: "/api/v0/media/{id}/upload-url",
        shape: CallShape::Unary,
    },
    RouteInfo {
        operation: "CompleteDirectUpload",
        method: "POST",
        path: "/api/v0/media/{id}/upload-complete",
        shape: CallShape::Unary,
    },
    RouteInfo {
        operation: "PresignDownload",
        method: "GET",
        path: "/api/v0/media/{id}/download-url",
        shape: CallShape::Unary,
    },
];

/// Log every operation once. Called at startup only.
pub fn log_route_report() {
    for route in ROUTES {
        tracing::info!(
            operation = route.operation,
            method = route.method,
            path = route.path,
            call_type = route.shape.as_str(),
            "Registered route"
        );
    }
    tracing::info!(count = ROUTES.len(), "Route registration complete");
}
