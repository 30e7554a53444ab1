//! Web URI validation
//!
//! Accepts absolute `http`/`https` URIs with a non-empty authority. This is a
//! syntactic check on the raw string only: the authority is not parsed, so
//! an out-of-range port or a bogus host passes here and fails later as a
//! daemon error.

/// Characters allowed anywhere in a URI (RFC 3986 reserved + unreserved + `%`)
fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            ':' | '/' | '?' | '#' | '[' | ']' | '@' | '!' | '$' | '&' | '\'' | '(' | ')' | '*'
                | '+' | ',' | ';' | '=' | '.' | '-' | '_' | '~' | '%'
        )
}

/// Every `%` must start a two-digit hex escape
fn has_valid_escapes(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || (bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

/// Split off a case-insensitive `http://` or `https://` prefix
fn strip_web_scheme(value: &str) -> Option<&str> {
    ["http://", "https://"].iter().find_map(|scheme| {
        value
            .get(..scheme.len())
            .filter(|head| head.eq_ignore_ascii_case(scheme))
            .map(|_| &value[scheme.len()..])
    })
}

/// Check that `value` is a well-formed absolute web URI
pub fn is_web_uri(value: &str) -> bool {
    if value.is_empty() || !value.chars().all(is_uri_char) || !has_valid_escapes(value) {
        return false;
    }

    let Some(rest) = strip_web_scheme(value) else {
        return false;
    };

    // Authority runs up to the first path, query or fragment delimiter
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    authority_end > 0
}
