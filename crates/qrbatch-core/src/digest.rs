//! Keyed identifier digest: SHA-256 over the identifier followed by the secret.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `identifier` concatenated directly with `secret`.
pub fn keyed_digest(identifier: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_known_digest() {
        assert_eq!(
            keyed_digest("", ""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn no_separator_between_identifier_and_secret() {
        // sha256("hello\n")
        assert_eq!(
            keyed_digest("hel", "lo\n"),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
        assert_eq!(keyed_digest("12", "3"), keyed_digest("1", "23"));
    }

    #[test]
    fn deterministic_and_input_sensitive() {
        let d = keyed_digest("1001", "secret");
        assert_eq!(d, keyed_digest("1001", "secret"));
        assert_eq!(d.len(), 64);
        assert!(d.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        assert_ne!(d, keyed_digest("1002", "secret"));
        assert_ne!(d, keyed_digest("1001", "Secret"));
    }
}
