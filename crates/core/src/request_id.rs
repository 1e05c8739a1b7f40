//! Request ID rules shared by both services.

/// The HTTP header carrying request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID accepted as is.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// The upstream request ID to reuse, if it is usable.
///
/// IDs are trimmed; blank, oversized or non-printable values are dropped so
/// a fresh one is generated instead.
#[must_use]
pub fn accept_upstream(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .filter(|id| id.bytes().all(|b| b.is_ascii_graphic()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_upstream() {
        assert_eq!(accept_upstream(Some(" edge-42 ")), Some("edge-42"));
        assert_eq!(accept_upstream(Some("   ")), None);
        assert_eq!(accept_upstream(None), None);
        assert_eq!(accept_upstream(Some("two words")), None);

        let longest = "a".repeat(MAX_REQUEST_ID_LEN);
        assert_eq!(accept_upstream(Some(&longest)), Some(longest.as_str()));
        let oversized = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        assert_eq!(accept_upstream(Some(&oversized)), None);
    }
}
