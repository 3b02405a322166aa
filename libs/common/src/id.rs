use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = meet_common::id::prefixed_ulid("room");
/// assert!(id.starts_with("room_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new().to_string())
}

/// Marker trait for types that represent a prefixed ID.
pub trait PrefixedId {
    const PREFIX: &'static str;

    fn generate() -> String {
        prefixed_ulid(Self::PREFIX)
    }
}

/// Well-known ID prefixes.
pub mod prefix {
    pub const USER: &str = "usr";
    pub const ROOM: &str = "room";
    pub const PARTICIPANT: &str = "prt";
    pub const SESSION: &str = "ses";
    pub const RECORDING: &str = "rec";
    pub const AUDIT: &str = "aud";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_ulid_format() {
        let id = prefixed_ulid("room");
        assert!(id.starts_with("room_"));
        // ULID is 26 chars, plus prefix + underscore
        assert_eq!(id.len(), 5 + 26);
    }

    #[test]
    fn test_uniqueness() {
        let a = prefixed_ulid("prt");
        let b = prefixed_ulid("prt");
        assert_ne!(a, b);
    }
}
