//! Component-sensitive percent-encoding.
//!
//! Each URL component reserves a different set of characters, so every
//! function here takes a [`Component`] tag instead of having one escaper per
//! field.

use std::borrow::Cow;

use crate::constants::UPPER_HEX;
use crate::error::EscapeError;

/// The URL component a string belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// A whole path; only `?` is escaped among the reserved characters
    Path,
    /// A single path segment; `/`, `;`, `,` and `?` are escaped too
    PathSegment,
    /// A registered name or IP literal
    Host,
    /// An IPv6 zone identifier (RFC 6874)
    Zone,
    /// A username or password
    UserPassword,
    /// A query key or value; space encodes as `+`
    QueryComponent,
    /// The fragment
    Fragment,
}

/// Returns true if `b` must be percent-encoded when it appears in `component`.
#[must_use]
pub const fn should_escape(b: u8, component: Component) -> bool {
    if b.is_ascii_alphanumeric() {
        return false;
    }

    if matches!(component, Component::Host | Component::Zone)
        && matches!(
            b,
            b'!' | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b':'
                | b'['
                | b']'
                | b'<'
                | b'>'
                | b'"'
        )
    {
        return false;
    }

    match b {
        b'-' | b'_' | b'.' | b'~' => false,
        b'$' | b'&' | b'+' | b',' | b'/' | b':' | b';' | b'=' | b'?' | b'@' => match component {
            Component::Path => b == b'?',
            Component::PathSegment => matches!(b, b'/' | b';' | b',' | b'?'),
            Component::UserPassword => matches!(b, b'@' | b'/' | b'?' | b':'),
            Component::QueryComponent => true,
            Component::Fragment => false,
            Component::Host | Component::Zone => true,
        },
        // Sub-delims outside the reserved set stay literal only in fragments;
        // the single quote is always escaped.
        b'!' | b'(' | b')' | b'*' => !matches!(component, Component::Fragment),
        _ => true,
    }
}

/// Percent-encodes `s` for use in `component`.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
#[must_use]
pub fn escape(s: &str, component: Component) -> Cow<'_, str> {
    let to_escape = s
        .bytes()
        .filter(|&b| should_escape(b, component))
        .count();
    if to_escape == 0 {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 2 * to_escape);
    for b in s.bytes() {
        if b == b' ' && component == Component::QueryComponent {
            out.push('+');
        } else if should_escape(b, component) {
            out.push('%');
            out.push(char::from(UPPER_HEX[usize::from(b >> 4)]));
            out.push(char::from(UPPER_HEX[usize::from(b & 0x0f)]));
        } else {
            // Every byte >= 0x80 escapes, so this one is ASCII.
            out.push(char::from(b));
        }
    }
    Cow::Owned(out)
}

/// Decodes `%XX` escapes in `s` according to the rules of `component`.
///
/// In [`Component::QueryComponent`] a `+` decodes to a space. Hosts only allow
/// escapes of non-ASCII bytes (plus `%25`) and reject bytes that would need
/// escaping. Decoded bytes that are not valid UTF-8 become U+FFFD.
///
/// # Errors
///
/// Returns `EscapeError` on a `%` not followed by two hex digits, or on an
/// escape or literal character not allowed in a host or zone.
pub fn unescape(s: &str, component: Component) -> Result<Cow<'_, str>, EscapeError> {
    let bytes = s.as_bytes();
    let mut escapes = 0;
    let mut has_plus = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                escapes += 1;
                if i + 2 >= bytes.len() || !is_hex(bytes[i + 1]) || !is_hex(bytes[i + 2]) {
                    let end = (i + 3).min(bytes.len());
                    return Err(invalid_escape(&bytes[i..end], i));
                }
                let triple = &bytes[i..i + 3];
                if component == Component::Host && unhex(bytes[i + 1]) < 8 && triple != b"%25" {
                    return Err(invalid_escape(triple, i));
                }
                if component == Component::Zone {
                    let v = (unhex(bytes[i + 1]) << 4) | unhex(bytes[i + 2]);
                    if triple != b"%25" && v != b' ' && should_escape(v, Component::Host) {
                        return Err(invalid_escape(triple, i));
                    }
                }
                i += 3;
            }
            b'+' => {
                has_plus |= component == Component::QueryComponent;
                i += 1;
            }
            b => {
                if matches!(component, Component::Host | Component::Zone)
                    && b < 0x80
                    && should_escape(b, component)
                {
                    return Err(EscapeError::InvalidHostChar {
                        char: char::from(b),
                        position: i,
                    });
                }
                i += 1;
            }
        }
    }

    if escapes == 0 && !has_plus {
        return Ok(Cow::Borrowed(s));
    }

    let mut out = Vec::with_capacity(bytes.len() - 2 * escapes);
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                out.push((unhex(bytes[i + 1]) << 4) | unhex(bytes[i + 2]));
                i += 3;
            }
            b'+' if component == Component::QueryComponent => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    Ok(Cow::Owned(match String::from_utf8(out) {
        Ok(decoded) => decoded,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }))
}

/// Returns true if `s` is a valid already-escaped form for `component`.
///
/// Sub-delims, `:`, `@`, brackets, and `%` are accepted as-is; anything else
/// must be a byte that `component` leaves unescaped.
#[must_use]
pub fn is_valid_encoded(s: &str, component: Component) -> bool {
    s.bytes().all(|b| {
        matches!(
            b,
            b'!' | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b':'
                | b'@'
                | b'['
                | b']'
                | b'%'
        ) || !should_escape(b, component)
    })
}

const fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

const fn unhex(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

fn invalid_escape(bytes: &[u8], position: usize) -> EscapeError {
    EscapeError::InvalidEscape {
        escape: String::from_utf8_lossy(bytes).into_owned(),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreserved_never_escapes() {
        for component in [
            Component::Path,
            Component::PathSegment,
            Component::Host,
            Component::UserPassword,
            Component::QueryComponent,
            Component::Fragment,
        ] {
            assert_eq!(escape("aZ09-_.~", component), "aZ09-_.~");
        }
    }

    #[test]
    fn path_escapes_question_mark_only() {
        assert_eq!(escape("/a b/c?d;e,f", Component::Path), "/a%20b/c%3Fd;e,f");
        assert_eq!(
            escape("/a b/c?d;e,f", Component::PathSegment),
            "%2Fa%20b%2Fc%3Fd%3Be%2Cf"
        );
    }

    #[test]
    fn query_component_uses_plus_for_space() {
        assert_eq!(escape("a b&c=d", Component::QueryComponent), "a+b%26c%3Dd");
        assert_eq!(unescape("a+b%26c", Component::QueryComponent).unwrap(), "a b&c");
    }

    #[test]
    fn plus_is_literal_outside_query() {
        assert_eq!(unescape("a+b", Component::Path).unwrap(), "a+b");
        assert_eq!(unescape("a+b", Component::Fragment).unwrap(), "a+b");
    }

    #[test]
    fn fragment_keeps_sub_delims() {
        assert_eq!(escape("a!(b)*c'", Component::Fragment), "a!(b)*c%27");
        assert_eq!(escape("a!(b)*", Component::Path), "a%21%28b%29%2A");
    }

    #[test]
    fn userinfo_escapes_separators() {
        assert_eq!(escape("a@b:c/d", Component::UserPassword), "a%40b%3Ac%2Fd");
    }

    #[test]
    fn non_ascii_escapes_as_utf8_bytes() {
        assert_eq!(escape("é", Component::Path), "%C3%A9");
        assert_eq!(unescape("%C3%A9", Component::Path).unwrap(), "é");
    }

    #[test]
    fn unescape_without_escapes_borrows() {
        let decoded = unescape("/plain/path", Component::Path).unwrap();
        assert!(matches!(decoded, Cow::Borrowed(_)));
    }

    #[test]
    fn truncated_escape_fails() {
        assert_eq!(
            unescape("ab%4", Component::Path),
            Err(EscapeError::InvalidEscape {
                escape: "%4".to_string(),
                position: 2,
            })
        );
    }

    #[test]
    fn non_hex_escape_fails() {
        assert!(matches!(
            unescape("%zz", Component::Fragment),
            Err(EscapeError::InvalidEscape { position: 0, .. })
        ));
    }

    #[test]
    fn host_rejects_escaped_ascii() {
        assert!(unescape("ex%41mple", Component::Host).is_err());
        assert_eq!(unescape("%E4%B8%AD.com", Component::Host).unwrap(), "中.com");
    }

    #[test]
    fn host_rejects_literal_space() {
        assert_eq!(
            unescape("a b", Component::Host),
            Err(EscapeError::InvalidHostChar {
                char: ' ',
                position: 1,
            })
        );
    }

    #[test]
    fn zone_allows_percent_25() {
        assert_eq!(unescape("%25en0", Component::Zone).unwrap(), "%en0");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(unescape("%FF", Component::Path).unwrap(), "\u{FFFD}");
    }

    #[test]
    fn valid_encoded_accepts_escapes_and_sub_delims() {
        assert!(is_valid_encoded("/a%2Fb;c=d", Component::Path));
        assert!(!is_valid_encoded("/a b", Component::Path));
        assert!(!is_valid_encoded("/a?b", Component::Path));
    }
}
