/// Who may call the balance routes
#[derive(Debug, Clone, PartialEq)]
pub enum AccessGate {
    /// No token required
    Open,
    /// Caller must pass `?user_token=` equal to this value
    Token(String),
}

impl AccessGate {
    /// Check the `user_token` a caller supplied, if any
    pub fn allows(&self, supplied: Option<&str>) -> bool {
        match self {
            AccessGate::Open => true,
            AccessGate::Token(expected) => match supplied {
                Some(token) => token_matches(expected, token),
                None => false,
            },
        }
    }
}

/// Byte-for-byte comparison that does not stop at the first difference.
///
/// Only the length leaks; the content of equal-length tokens is compared in full.
pub fn token_matches(expected: &str, supplied: &str) -> bool {
    let (expected, supplied) = (expected.as_bytes(), supplied.as_bytes());
    if expected.len() != supplied.len() {
        return false;
    }

    expected
        .iter()
        .zip(supplied)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
