use rand::RngCore;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Length of a record identifier in hex characters.
pub const OBJECT_ID_LEN: usize = 24;

/// Generate a 12-byte record identifier rendered as 24 lowercase hex chars.
///
/// Layout:
///   - 4 bytes: seconds since the Unix epoch (big endian)
///   - 8 bytes: random
///
/// Ids sort roughly by creation time and match the `[0-9a-f]{24}` shape
/// clients validate references against.
pub fn object_id() -> String {
    let secs = (now_millis() / 1000) as u32;
    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    rand::thread_rng().fill_bytes(&mut bytes[4..]);
    hex::encode(bytes)
}

/// Whether `value` has the shape of an identifier produced by [`object_id`].
pub fn is_object_id(value: &str) -> bool {
    value.len() == OBJECT_ID_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_shape() {
        let id = object_id();
        assert_eq!(id.len(), OBJECT_ID_LEN);
        assert!(is_object_id(&id));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn test_object_id_unique() {
        let a = object_id();
        let b = object_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_object_id_rejects() {
        assert!(!is_object_id(""));
        assert!(!is_object_id("abc"));
        assert!(!is_object_id("zzzzzzzzzzzzzzzzzzzzzzzz"));
        assert!(!is_object_id("0123456789abcdef012345678"));
        assert!(is_object_id("0123456789ABCDEF01234567"));
    }
}
