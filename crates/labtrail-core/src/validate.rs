//! Request-shape validation helpers.
//!
//! Validation runs before any storage mutation; a shape that fails here is
//! rejected with [`Error::Validation`] and the store is never touched.

use crate::error::{Error, Result};

/// Upper bound on attachment payloads held in memory (25 MiB).
///
/// The transport layer is expected to enforce its own upload ceiling before
/// the payload reaches this core; this cap is the last line.
pub const MAX_ATTACHMENT_BYTES: usize = 25 * 1024 * 1024;

/// Reject a required text field that is empty or whitespace-only.
pub fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

/// Validate MIME type format per RFC 2045 (type/subtype).
///
/// Returns `true` if the format is valid: exactly one `/`, both parts
/// non-empty, and only token characters on each side.
pub fn is_valid_mime_type(mime: &str) -> bool {
    let parts: Vec<&str> = mime.split('/').collect();
    if parts.len() != 2 {
        return false;
    }
    let (media_type, subtype) = (parts[0], parts[1]);
    if media_type.is_empty() || subtype.is_empty() {
        return false;
    }
    let is_token_char = |c: char| -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '!' | '#' | '$' | '&' | '-' | '^' | '_' | '.' | '+')
    };
    media_type.chars().all(is_token_char) && subtype.chars().all(is_token_char)
}

/// Sanitize a filename for safe storage.
pub fn sanitize_filename(filename: &str) -> String {
    // Remove path components
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    // Replace dangerous characters
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    // Truncate if too long (preserve extension)
    if sanitized.len() > 255 {
        if let Some(dot_pos) = sanitized.rfind('.') {
            let ext = &sanitized[dot_pos..];
            let name = &sanitized[..255 - ext.len()];
            return format!("{}{}", name, ext);
        }
        return sanitized[..255].to_string();
    }

    sanitized.to_string()
}

/// Compute BLAKE3 hash of data with "blake3:" prefix.
///
/// Returns a string in the format: `blake3:{64-char-hex}`
pub fn compute_content_hash(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    format!("blake3:{}", hash.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("name", "Lab A").is_ok());
        assert!(require_non_blank("name", "").is_err());
        assert!(require_non_blank("name", "   ").is_err());
    }

    #[test]
    fn test_valid_mime_types() {
        assert!(is_valid_mime_type("image/png"));
        assert!(is_valid_mime_type("application/vnd.ms-excel"));
        assert!(is_valid_mime_type("text/plain"));
    }

    #[test]
    fn test_invalid_mime_types() {
        assert!(!is_valid_mime_type("png"));
        assert!(!is_valid_mime_type("image/"));
        assert!(!is_valid_mime_type("/png"));
        assert!(!is_valid_mime_type("image/png/extra"));
        assert!(!is_valid_mime_type("image/p ng"));
    }

    #[test]
    fn test_sanitize_filename_strips_paths() {
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\data\\scan.png"), "scan.png");
    }

    #[test]
    fn test_sanitize_filename_replaces_dangerous_chars() {
        assert_eq!(sanitize_filename("file<>:test.txt"), "file___test.txt");
        assert_eq!(sanitize_filename("file|name?.txt"), "file_name_.txt");
    }

    #[test]
    fn test_sanitize_filename_empty() {
        assert_eq!(sanitize_filename(""), "unnamed_file");
        assert_eq!(sanitize_filename("   "), "unnamed_file");
    }

    #[test]
    fn test_sanitize_filename_truncates_preserving_extension() {
        let long_name = format!("{}.png", "a".repeat(300));
        let sanitized = sanitize_filename(&long_name);
        assert!(sanitized.len() <= 255);
        assert!(sanitized.ends_with(".png"));
    }

    #[test]
    fn test_content_hash_format() {
        let hash = compute_content_hash(b"observation data");
        assert!(hash.starts_with("blake3:"));
        assert_eq!(hash.len(), "blake3:".len() + 64);
        // Same payload, same hash
        assert_eq!(hash, compute_content_hash(b"observation data"));
    }
}
