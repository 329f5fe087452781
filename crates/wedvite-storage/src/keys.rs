//! Shared key validation for tier backends.

use regex::Regex;

use crate::traits::{TierError, TierResult};

const MAX_KEY_LENGTH: usize = 128;

/// Validate a tier key.
///
/// Keys become file names in the local backend, so they are restricted to
/// `[A-Za-z0-9_.-]`, must not contain `..` and must not start with `/`.
pub fn validate_key(key: &str) -> TierResult<()> {
    if key.is_empty() {
        return Err(TierError::InvalidKey("Storage key cannot be empty".to_string()));
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(TierError::InvalidKey(format!(
            "Storage key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        )));
    }

    if key.contains("..") || key.starts_with('/') {
        return Err(TierError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }

    let pattern = Regex::new(r"^[a-zA-Z0-9_\-\.]+$").map_err(|e| {
        TierError::BackendError(format!("Failed to compile key validation regex: {}", e))
    })?;

    if !pattern.is_match(key) {
        return Err(TierError::InvalidKey(format!(
            "Storage key '{}' contains invalid characters. Allowed: letters, digits, underscore (_), hyphen (-), dot (.)",
            key
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_default_keys() {
        assert!(validate_key("wedding_invitations").is_ok());
        assert!(validate_key("wedding_invitations_temp").is_ok());
        assert!(validate_key("backup-2024.json").is_ok());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(matches!(validate_key("../etc/passwd"), Err(TierError::InvalidKey(_))));
        assert!(matches!(validate_key("/abs"), Err(TierError::InvalidKey(_))));
        assert!(matches!(validate_key("a/b"), Err(TierError::InvalidKey(_))));
        assert!(matches!(validate_key(""), Err(TierError::InvalidKey(_))));
    }

    #[test]
    fn rejects_overlong_keys() {
        let key = "k".repeat(MAX_KEY_LENGTH + 1);
        assert!(matches!(validate_key(&key), Err(TierError::InvalidKey(_))));
    }
}
