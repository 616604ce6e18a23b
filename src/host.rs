//! Host and port handling for URL authorities.
//!
//! # Grammar Reference
//!
//! ```abnf
//! hostport   = host [ ":" port ]
//! host       = IP-literal / IPv4address / reg-name
//! IP-literal = "[" ( IPv6address / IPv6addrz / IPvFuture ) "]"
//! IPv6addrz  = IPv6address "%25" ZoneID
//! port       = *DIGIT
//! ```

use crate::error::ParseErrorKind;
use crate::escape::{unescape, Component};

/// Validates and decodes the `host[:port]` text of an authority.
///
/// `offset` is the byte offset of `raw` in the full input and is used for
/// error positions. The result keeps the port and any brackets as written.
pub(crate) fn parse_host(raw: &str, offset: usize) -> Result<String, ParseErrorKind> {
    let decode = |s: &str, at: usize, component: Component| {
        unescape(s, component)
            .map(std::borrow::Cow::into_owned)
            .map_err(|e| ParseErrorKind::from(e.shifted(offset + at)))
    };

    if raw.starts_with('[') {
        let close = raw
            .rfind(']')
            .ok_or(ParseErrorKind::MissingBracket { position: offset })?;

        let colon_port = &raw[close + 1..];
        if !valid_optional_port(colon_port) {
            return Err(ParseErrorKind::InvalidPort {
                port: colon_port.to_string(),
                position: offset + close + 1,
            });
        }

        // RFC 6874: a zone identifier follows "%25" and has its own escaping.
        if let Some(zone) = raw[..close].find("%25") {
            let mut host = decode(&raw[..zone], 0, Component::Host)?;
            host.push_str(&decode(&raw[zone..close], zone, Component::Zone)?);
            host.push_str(&decode(&raw[close..], close, Component::Host)?);
            return Ok(host);
        }
    } else if let Some(colon) = raw.rfind(':') {
        let colon_port = &raw[colon..];
        if !valid_optional_port(colon_port) {
            return Err(ParseErrorKind::InvalidPort {
                port: colon_port.to_string(),
                position: offset + colon,
            });
        }
    }

    decode(raw, 0, Component::Host)
}

/// Splits `host[:port]` into hostname and port.
///
/// The port is the digits after the last colon, or empty. Brackets around an
/// IP literal are removed from the hostname. A colon inside brackets never
/// starts a port because the text after it would contain `]`.
///
/// # Examples
///
/// ```
/// use urlscope::split_host_port;
///
/// assert_eq!(split_host_port("example.com:8080"), ("example.com", "8080"));
/// assert_eq!(split_host_port("[::1]:443"), ("::1", "443"));
/// assert_eq!(split_host_port("[::1]"), ("::1", ""));
/// assert_eq!(split_host_port("example.com"), ("example.com", ""));
/// ```
#[must_use]
pub fn split_host_port(host: &str) -> (&str, &str) {
    let (mut hostname, mut port) = (host, "");

    if let Some(colon) = host.rfind(':') {
        if valid_optional_port(&host[colon..]) {
            hostname = &host[..colon];
            port = &host[colon + 1..];
        }
    }

    if let Some(inner) = hostname
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        hostname = inner;
    }

    (hostname, port)
}

/// Returns true for an empty string or `:` followed only by digits.
#[must_use]
pub fn valid_optional_port(port: &str) -> bool {
    if port.is_empty() {
        return true;
    }
    port.strip_prefix(':')
        .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_host_with_port() {
        assert_eq!(parse_host("example.com:80", 0).unwrap(), "example.com:80");
    }

    #[test]
    fn parse_empty_port_is_allowed() {
        assert_eq!(parse_host("example.com:", 0).unwrap(), "example.com:");
    }

    #[test]
    fn parse_non_numeric_port_fails() {
        assert_eq!(
            parse_host("example.com:http", 7),
            Err(ParseErrorKind::InvalidPort {
                port: ":http".to_string(),
                position: 18,
            })
        );
    }

    #[test]
    fn parse_ipv6_literal() {
        assert_eq!(parse_host("[::1]:8080", 0).unwrap(), "[::1]:8080");
        assert_eq!(parse_host("[fe80::1]", 0).unwrap(), "[fe80::1]");
    }

    #[test]
    fn parse_ipv6_missing_bracket_fails() {
        assert_eq!(
            parse_host("[::1", 7),
            Err(ParseErrorKind::MissingBracket { position: 7 })
        );
    }

    #[test]
    fn parse_ipv6_junk_after_bracket_fails() {
        assert!(matches!(
            parse_host("[::1]x", 0),
            Err(ParseErrorKind::InvalidPort { position: 5, .. })
        ));
    }

    #[test]
    fn parse_ipv6_zone() {
        assert_eq!(parse_host("[fe80::1%25en0]:1", 0).unwrap(), "[fe80::1%en0]:1");
    }

    #[test]
    fn parse_decodes_non_ascii_escapes() {
        assert_eq!(parse_host("%C3%A9.fr", 0).unwrap(), "é.fr");
    }

    #[test]
    fn parse_rejects_escaped_ascii() {
        assert!(matches!(
            parse_host("a%2Fb", 4),
            Err(ParseErrorKind::InvalidEscape(e)) if e.position() == 5
        ));
    }

    #[test]
    fn split_keeps_empty_port() {
        assert_eq!(split_host_port("host:"), ("host", ""));
    }

    #[test]
    fn split_unbracketed_ipv6_like_text() {
        // "[::1" has no closing bracket to strip.
        assert_eq!(split_host_port("[::1"), ("[:", "1"));
    }

    #[test]
    fn valid_optional_port_cases() {
        assert!(valid_optional_port(""));
        assert!(valid_optional_port(":"));
        assert!(valid_optional_port(":8080"));
        assert!(!valid_optional_port("8080"));
        assert!(!valid_optional_port(":80a"));
    }
}
