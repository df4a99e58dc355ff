//! Shared key generation for storage backends.
//!
//! Key format: `{owner_id}/{record_id}/{file_name}`.

use uuid::Uuid;

/// Generate the object key for a record's content.
///
/// All backends must use this format so a record can move between them.
pub fn object_key(owner_id: &str, record_id: Uuid, file_name: &str) -> String {
    format!("{}/{}/{}", owner_id, record_id, file_name)
}

/// Percent-encode each segment of a key for use in a URL path.
pub(crate) fn encode_key_for_url(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        let id = Uuid::parse_str("6f9619ff-8b86-d011-b42d-00cf4fc964ff").unwrap();
        assert_eq!(
            object_key("user-1", id, "clip.mp4"),
            "user-1/6f9619ff-8b86-d011-b42d-00cf4fc964ff/clip.mp4"
        );
    }

    #[test]
    fn test_encode_key_keeps_separators() {
        assert_eq!(
            encode_key_for_url("user 1/abc/my clip.mp4"),
            "user%201/abc/my%20clip.mp4"
        );
    }
}
