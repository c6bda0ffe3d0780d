//! Input validation for hotspot configuration values
//!
//! Lengths are counted in characters, not bytes.

use crate::error::{HotspotError, HotspotResult};

/// Minimum SSID length
pub const MIN_SSID_LEN: usize = 1;

/// Maximum SSID length
pub const MAX_SSID_LEN: usize = 32;

/// Minimum WPA passphrase length
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Validate SSID length (1 to 32 characters inclusive)
pub fn validate_ssid(ssid: &str) -> HotspotResult<()> {
    let len = ssid.chars().count();
    if !(MIN_SSID_LEN..=MAX_SSID_LEN).contains(&len) {
        return Err(HotspotError::Validation {
            field: "ssid",
            message: format!(
                "SSID must be between {} and {} characters, got {}",
                MIN_SSID_LEN, MAX_SSID_LEN, len
            ),
        });
    }

    Ok(())
}

/// Validate WPA passphrase length (at least 8 characters)
pub fn validate_passphrase(passphrase: &str) -> HotspotResult<()> {
    let len = passphrase.chars().count();
    if len < MIN_PASSPHRASE_LEN {
        return Err(HotspotError::Validation {
            field: "passphrase",
            message: format!(
                "Passphrase must be at least {} characters, got {}",
                MIN_PASSPHRASE_LEN, len
            ),
        });
    }

    Ok(())
}

/// Escape a value for a `WIFI:` QR payload field
///
/// `;`, `\` and `"` are prefixed with a backslash.
pub fn escape_wifi_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ';' | '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssid_validation() {
        assert!(validate_ssid("H").is_ok());
        assert!(validate_ssid("Home").is_ok());
        assert!(validate_ssid(&"x".repeat(32)).is_ok());
        // Counted in characters
        assert!(validate_ssid(&"é".repeat(32)).is_ok());

        assert!(validate_ssid("").is_err());
        assert!(validate_ssid(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_ssid_validation_error_field() {
        match validate_ssid("") {
            Err(HotspotError::Validation { field, .. }) => assert_eq!(field, "ssid"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_passphrase_validation() {
        assert!(validate_passphrase("abcdefgh").is_ok());
        assert!(validate_passphrase(&"p".repeat(100)).is_ok());

        assert!(validate_passphrase("").is_err());
        assert!(validate_passphrase("abcdefg").is_err());

        match validate_passphrase("short") {
            Err(HotspotError::Validation { field, .. }) => assert_eq!(field, "passphrase"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_escape_wifi_field() {
        assert_eq!(escape_wifi_field("Home"), "Home");
        assert_eq!(escape_wifi_field("a;b"), "a\\;b");
        assert_eq!(escape_wifi_field("back\\slash"), "back\\\\slash");
        assert_eq!(escape_wifi_field("say \"hi\""), "say \\\"hi\\\"");
    }
}
