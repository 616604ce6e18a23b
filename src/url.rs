//! Main URL type.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ParseError, ParseErrorKind};
use crate::escape::{escape, is_valid_encoded, unescape, Component};
use crate::host::{parse_host, split_host_port};
use crate::query::QueryValues;
use crate::userinfo::Userinfo;

/// A parsed URL or relative reference.
///
/// Components are stored decoded. `raw_path` and `raw_fragment` hold the
/// original text only when re-encoding the decoded value would not reproduce
/// it, and `raw_query` distinguishes "no `?`" (`None`) from "empty query"
/// (`Some("")`).
///
/// # Structure
///
/// ```text
/// scheme:opaque[?query][#fragment]
/// [scheme:][//[userinfo@]host[:port]]path[?query][#fragment]
/// ```
///
/// # Examples
///
/// ```
/// use urlscope::Url;
///
/// let url = Url::parse("https://a:b@example.com:8080/p%20ath?x=1&x=2#frag").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.username(), Some("a"));
/// assert_eq!(url.password(), Some("b"));
/// assert_eq!(url.hostname(), "example.com");
/// assert_eq!(url.port(), "8080");
/// assert_eq!(url.path(), "/p ath");
/// assert_eq!(url.query().get_all("x"), ["1", "2"]);
/// assert_eq!(url.fragment(), "frag");
///
/// let mail = Url::parse("mailto:user@example.com").unwrap();
/// assert_eq!(mail.opaque(), "user@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Url {
    pub(crate) scheme: String,
    pub(crate) opaque: String,
    pub(crate) user: Option<Userinfo>,
    pub(crate) host: String,
    pub(crate) has_authority: bool,
    pub(crate) path: String,
    pub(crate) raw_path: String,
    pub(crate) raw_query: Option<String>,
    pub(crate) fragment: String,
    pub(crate) raw_fragment: String,
}

impl Url {
    /// Parses a URL or relative reference.
    ///
    /// The empty string is valid and yields a URL with every field empty.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - The input contains an ASCII control character before the fragment
    /// - The input starts with `:`
    /// - A schemeless reference has a colon in its first path segment
    /// - The userinfo, host, or port is malformed
    /// - Any component contains a malformed percent escape
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let url = Self::parse_inner(input).map_err(|kind| ParseError {
            input: input.to_string(),
            kind,
        })?;
        debug!(input, scheme = %url.scheme, host = %url.host, path = %url.path, "parsed URL");
        Ok(url)
    }

    fn parse_inner(input: &str) -> Result<Self, ParseErrorKind> {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (input, None),
        };

        let mut url = Self::parse_reference(rest)?;

        if let Some(fragment) = fragment {
            url.set_fragment(fragment, rest.len() + 1)?;
        }

        Ok(url)
    }

    fn parse_reference(input: &str) -> Result<Self, ParseErrorKind> {
        if let Some(position) = input.bytes().position(|b| b < b' ' || b == 0x7f) {
            return Err(ParseErrorKind::ControlChar { position });
        }

        let mut url = Self::default();

        if input == "*" {
            url.path = "*".to_string();
            return Ok(url);
        }

        let (scheme, rest) = Self::split_scheme(input)?;
        url.scheme = scheme.to_ascii_lowercase();
        let mut offset = input.len() - rest.len();

        let rest = match rest.split_once('?') {
            Some((rest, query)) => {
                url.raw_query = Some(query.to_string());
                rest
            }
            None => rest,
        };

        if !rest.starts_with('/') {
            if !url.scheme.is_empty() {
                url.opaque = rest.to_string();
                return Ok(url);
            }

            // "a:b" without a scheme would read back as scheme "a".
            let segment = rest.split('/').next().unwrap_or_default();
            if let Some(colon) = segment.find(':') {
                return Err(ParseErrorKind::ColonInFirstSegment {
                    position: offset + colon,
                });
            }
        }

        let mut rest = rest;
        if (!url.scheme.is_empty() || !rest.starts_with("///")) && rest.starts_with("//") {
            let after = &rest[2..];
            let (authority, path) = after.split_at(after.find('/').unwrap_or(after.len()));
            let (user, host) = Self::parse_authority(authority, offset + 2)?;
            url.user = user;
            url.host = host;
            url.has_authority = true;
            offset += 2 + authority.len();
            rest = path;
        }

        url.set_path(rest, offset)?;
        Ok(url)
    }

    fn split_scheme(input: &str) -> Result<(&str, &str), ParseErrorKind> {
        for (i, b) in input.bytes().enumerate() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' => {}
                b'0'..=b'9' | b'+' | b'-' | b'.' if i > 0 => {}
                b':' if i == 0 => return Err(ParseErrorKind::MissingScheme),
                b':' => return Ok((&input[..i], &input[i + 1..])),
                _ => return Ok(("", input)),
            }
        }
        Ok(("", input))
    }

    fn parse_authority(
        authority: &str,
        offset: usize,
    ) -> Result<(Option<Userinfo>, String), ParseErrorKind> {
        match authority.rfind('@') {
            Some(at) => {
                let host = parse_host(&authority[at + 1..], offset + at + 1)?;
                let user = Userinfo::parse(&authority[..at], offset)?;
                Ok((Some(user), host))
            }
            None => Ok((None, parse_host(authority, offset)?)),
        }
    }

    fn set_path(&mut self, raw: &str, offset: usize) -> Result<(), ParseErrorKind> {
        let path = unescape(raw, Component::Path).map_err(|e| e.shifted(offset))?;
        self.raw_path = if escape(&path, Component::Path) == raw {
            String::new()
        } else {
            raw.to_string()
        };
        self.path = path.into_owned();
        Ok(())
    }

    /// Replaces the path with an already-escaped one produced by resolution.
    pub(crate) fn set_escaped_path(&mut self, escaped: &str) {
        // Dot-segment removal never splits a "%XX" triple, so this decodes.
        let path = unescape(escaped, Component::Path)
            .map_or_else(|_| escaped.to_string(), Cow::into_owned);
        self.raw_path = if escape(&path, Component::Path) == escaped {
            String::new()
        } else {
            escaped.to_string()
        };
        self.path = path;
    }

    fn set_fragment(&mut self, raw: &str, offset: usize) -> Result<(), ParseErrorKind> {
        let fragment = unescape(raw, Component::Fragment).map_err(|e| e.shifted(offset))?;
        self.raw_fragment = if escape(&fragment, Component::Fragment) == raw {
            String::new()
        } else {
            raw.to_string()
        };
        self.fragment = fragment.into_owned();
        Ok(())
    }

    /// Returns the lowercased scheme, or "" for a relative reference.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the opaque part of a `scheme:opaque` URL, as written.
    #[must_use]
    pub fn opaque(&self) -> &str {
        &self.opaque
    }

    /// Returns the userinfo, if the authority had one.
    #[must_use]
    pub const fn user(&self) -> Option<&Userinfo> {
        self.user.as_ref()
    }

    /// Returns the decoded username, if the authority had userinfo.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(Userinfo::username)
    }

    /// Returns the decoded password, if the userinfo had one.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.user.as_ref().and_then(Userinfo::password)
    }

    /// Returns true if the URL was written with `//` (an authority, possibly
    /// empty).
    #[must_use]
    pub const fn has_authority(&self) -> bool {
        self.has_authority
    }

    /// Returns `host[:port]` as written, after decoding.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the host without its port and without IP-literal brackets.
    #[must_use]
    pub fn hostname(&self) -> &str {
        split_host_port(&self.host).0
    }

    /// Returns the port digits, or "".
    #[must_use]
    pub fn port(&self) -> &str {
        split_host_port(&self.host).1
    }

    /// Returns the decoded path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the original path encoding, or "" when re-encoding
    /// [`Url::path`] reproduces it.
    #[must_use]
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// Returns the escaped path.
    ///
    /// Uses [`Url::raw_path`] when it is a valid encoding of [`Url::path`],
    /// otherwise re-encodes the decoded path.
    ///
    /// ```
    /// use urlscope::Url;
    ///
    /// let url = Url::parse("http://x/a%2Fb/c d").unwrap();
    /// assert_eq!(url.path(), "/a/b/c d");
    /// assert_eq!(url.escaped_path(), "/a/b/c%20d");
    ///
    /// let url = Url::parse("http://x/a%2Fb").unwrap();
    /// assert_eq!(url.escaped_path(), "/a%2Fb");
    /// ```
    #[must_use]
    pub fn escaped_path(&self) -> Cow<'_, str> {
        if raw_matches(&self.raw_path, &self.path, Component::Path) {
            return Cow::Borrowed(&self.raw_path);
        }
        if self.path == "*" {
            return Cow::Borrowed("*");
        }
        escape(&self.path, Component::Path)
    }

    /// Returns the raw query text after `?`, or `None` when there was no `?`.
    #[must_use]
    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    /// Returns true when the URL ends in a bare `?`.
    #[must_use]
    pub fn force_query(&self) -> bool {
        self.raw_query.as_deref() == Some("")
    }

    /// Returns the decoded query values, skipping pairs that fail to decode.
    #[must_use]
    pub fn query(&self) -> QueryValues {
        self.raw_query
            .as_deref()
            .map(QueryValues::parse_lenient)
            .unwrap_or_default()
    }

    /// Returns the decoded fragment.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns the original fragment encoding, or "" when re-encoding
    /// [`Url::fragment`] reproduces it.
    #[must_use]
    pub fn raw_fragment(&self) -> &str {
        &self.raw_fragment
    }

    /// Returns the escaped fragment, preferring [`Url::raw_fragment`] when it
    /// is a valid encoding of [`Url::fragment`].
    #[must_use]
    pub fn escaped_fragment(&self) -> Cow<'_, str> {
        if raw_matches(&self.raw_fragment, &self.fragment, Component::Fragment) {
            return Cow::Borrowed(&self.raw_fragment);
        }
        escape(&self.fragment, Component::Fragment)
    }

    /// Returns true if the URL has a scheme.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        !self.scheme.is_empty()
    }
}

fn raw_matches(raw: &str, decoded: &str, component: Component) -> bool {
    !raw.is_empty()
        && is_valid_encoded(raw, component)
        && unescape(raw, component).is_ok_and(|d| d == decoded)
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}:", self.scheme)?;
        }

        if self.opaque.is_empty() {
            let path = self.escaped_path();
            let authority = self.has_authority || !self.host.is_empty() || self.user.is_some();

            if authority {
                f.write_str("//")?;
                if let Some(user) = &self.user {
                    write!(f, "{user}@")?;
                }
                f.write_str(&escape(&self.host, Component::Host))?;
            }

            if !path.is_empty() && !path.starts_with('/') && !self.host.is_empty() {
                f.write_str("/")?;
            }

            // Without an authority, a path that would read back as one gets
            // "/." in front. Schemeless "///" already parses as a path.
            if !authority
                && path.starts_with("//")
                && (!self.scheme.is_empty() || !path.starts_with("///"))
            {
                f.write_str("/.")?;
            }

            // RFC 3986 §4.2: a first segment with ':' needs "./" in front.
            if !authority
                && self.scheme.is_empty()
                && path
                    .split('/')
                    .next()
                    .is_some_and(|segment| segment.contains(':'))
            {
                f.write_str("./")?;
            }

            f.write_str(&path)?;
        } else {
            f.write_str(&self.opaque)?;
        }

        if let Some(query) = &self.raw_query {
            write!(f, "?{query}")?;
        }

        if !self.fragment.is_empty() {
            write!(f, "#{}", self.escaped_fragment())?;
        }

        Ok(())
    }
}

impl FromStr for Url {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Url {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl serde::Serialize for Url {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Url {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_url() {
        let url = Url::parse("https://a:b@example.com:8080/p%20ath?x=1&x=2#frag").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.username(), Some("a"));
        assert_eq!(url.password(), Some("b"));
        assert_eq!(url.host(), "example.com:8080");
        assert_eq!(url.hostname(), "example.com");
        assert_eq!(url.port(), "8080");
        assert_eq!(url.path(), "/p ath");
        assert_eq!(url.raw_path(), "");
        assert_eq!(url.raw_query(), Some("x=1&x=2"));
        assert_eq!(url.fragment(), "frag");
    }

    #[test]
    fn parse_empty_is_valid() {
        let url = Url::parse("").unwrap();
        assert_eq!(url, Url::default());
        assert_eq!(url.to_string(), "");
    }

    #[test]
    fn parse_fragment_only() {
        let url = Url::parse("#frag").unwrap();
        assert_eq!(url.scheme(), "");
        assert_eq!(url.path(), "");
        assert_eq!(url.fragment(), "frag");
    }

    #[test]
    fn parse_lone_question_mark() {
        let url = Url::parse("?").unwrap();
        assert_eq!(url.raw_query(), Some(""));
        assert!(url.force_query());
        assert_eq!(url.to_string(), "?");
    }

    #[test]
    fn query_absent_vs_empty() {
        let url = Url::parse("http://x").unwrap();
        assert_eq!(url.raw_query(), None);
        assert!(!url.force_query());

        let url = Url::parse("http://x?").unwrap();
        assert_eq!(url.raw_query(), Some(""));
        assert!(url.force_query());
        assert_eq!(url.to_string(), "http://x?");
    }

    #[test]
    fn query_before_path_splits_authority() {
        let url = Url::parse("http://host?a=b").unwrap();
        assert_eq!(url.host(), "host");
        assert_eq!(url.path(), "");
        assert_eq!(url.raw_query(), Some("a=b"));
    }

    #[test]
    fn scheme_is_lowercased() {
        let url = Url::parse("HTTP://Example.COM/").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host(), "Example.COM");
    }

    #[test]
    fn scheme_cannot_start_with_digit() {
        let url = Url::parse("1http/x").unwrap();
        assert_eq!(url.scheme(), "");
        assert_eq!(url.path(), "1http/x");
    }

    #[test]
    fn missing_scheme_fails() {
        let err = Url::parse(":foo").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingScheme);
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn colon_in_first_segment_fails() {
        let err = Url::parse("1a:b").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ColonInFirstSegment { position: 2 });
    }

    #[test]
    fn control_char_fails() {
        let err = Url::parse("http://x/\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ControlChar { position: 9 });
    }

    #[test]
    fn opaque_url() {
        let url = Url::parse("mailto:user@example.com?subject=hi").unwrap();
        assert_eq!(url.scheme(), "mailto");
        assert_eq!(url.opaque(), "user@example.com");
        assert_eq!(url.host(), "");
        assert_eq!(url.user(), None);
        assert_eq!(url.query().get("subject"), Some("hi"));
        assert_eq!(url.to_string(), "mailto:user@example.com?subject=hi");
    }

    #[test]
    fn scheme_with_absolute_path_is_not_opaque() {
        let url = Url::parse("http:/x").unwrap();
        assert_eq!(url.opaque(), "");
        assert_eq!(url.path(), "/x");
        assert!(!url.has_authority());
        assert_eq!(url.to_string(), "http:/x");
    }

    #[test]
    fn network_path_reference() {
        let url = Url::parse("//example.com/a").unwrap();
        assert_eq!(url.scheme(), "");
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.path(), "/a");
        assert_eq!(url.to_string(), "//example.com/a");
    }

    #[test]
    fn schemeless_triple_slash_is_path() {
        let url = Url::parse("///a").unwrap();
        assert_eq!(url.host(), "");
        assert_eq!(url.path(), "///a");
    }

    #[test]
    fn double_slash_path_without_authority_keeps_host_empty() {
        let mut url = Url::parse("http:/x").unwrap();
        url.set_escaped_path("//h/p");
        assert_eq!(url.to_string(), "http:/.//h/p");
        assert_eq!(Url::parse(&url.to_string()).unwrap().host(), "");

        let mut url = Url::parse("/x").unwrap();
        url.set_escaped_path("//h/p");
        assert_eq!(url.to_string(), "/.//h/p");

        let url = Url::parse("///a").unwrap();
        assert_eq!(url.to_string(), "///a");
    }

    #[test]
    fn empty_authority_round_trips() {
        let url = Url::parse("file:///etc/hosts").unwrap();
        assert!(url.has_authority());
        assert_eq!(url.host(), "");
        assert_eq!(url.path(), "/etc/hosts");
        assert_eq!(url.to_string(), "file:///etc/hosts");

        let url = Url::parse("http://").unwrap();
        assert_eq!(url.to_string(), "http://");
    }

    #[test]
    fn userinfo_uses_last_at() {
        let url = Url::parse("http://a@b@host/").unwrap();
        assert_eq!(url.username(), Some("a@b"));
        assert_eq!(url.host(), "host");
        assert_eq!(url.to_string(), "http://a%40b@host/");
    }

    #[test]
    fn ipv6_host_and_port() {
        let url = Url::parse("http://[::1]:8080/").unwrap();
        assert_eq!(url.host(), "[::1]:8080");
        assert_eq!(url.hostname(), "::1");
        assert_eq!(url.port(), "8080");
    }

    #[test]
    fn unterminated_ipv6_fails_with_offset() {
        let err = Url::parse("http://[::1/x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingBracket { position: 7 });
    }

    #[test]
    fn bad_port_fails() {
        let err = Url::parse("http://host:8x/").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidPort { position: 11, .. }));
    }

    #[test]
    fn bad_path_escape_reports_absolute_offset() {
        let err = Url::parse("http://host/a%zz").unwrap_err();
        assert_eq!(err.offset(), Some(13));
    }

    #[test]
    fn bad_fragment_escape_reports_absolute_offset() {
        let err = Url::parse("http://h/#ab%").unwrap_err();
        assert_eq!(err.offset(), Some(12));
    }

    #[test]
    fn raw_path_kept_when_reencoding_differs() {
        let url = Url::parse("http://x/a%2Fb").unwrap();
        assert_eq!(url.path(), "/a/b");
        assert_eq!(url.raw_path(), "/a%2Fb");
        assert_eq!(url.escaped_path(), "/a%2Fb");
        assert_eq!(url.to_string(), "http://x/a%2Fb");
    }

    #[test]
    fn raw_path_empty_when_canonical() {
        let url = Url::parse("http://x/a%20b").unwrap();
        assert_eq!(url.raw_path(), "");
        assert_eq!(url.escaped_path(), "/a%20b");
    }

    #[test]
    fn lowercase_escape_is_kept_raw() {
        let url = Url::parse("http://x/%c3%a9").unwrap();
        assert_eq!(url.path(), "/é");
        assert_eq!(url.raw_path(), "/%c3%a9");
        assert_eq!(url.escaped_path(), "/%c3%a9");
    }

    #[test]
    fn raw_fragment_rule() {
        let url = Url::parse("http://x/#a%2Fb").unwrap();
        assert_eq!(url.fragment(), "a/b");
        assert_eq!(url.raw_fragment(), "a%2Fb");
        assert_eq!(url.escaped_fragment(), "a%2Fb");

        let url = Url::parse("http://x/#a b").unwrap();
        assert_eq!(url.fragment(), "a b");
        assert_eq!(url.raw_fragment(), "a b");
        assert_eq!(url.escaped_fragment(), "a%20b");
    }

    #[test]
    fn asterisk_is_a_path() {
        let url = Url::parse("*").unwrap();
        assert_eq!(url.path(), "*");
        assert_eq!(url.escaped_path(), "*");
    }

    #[test]
    fn relative_path_with_colon_gets_dot_slash() {
        let mut url = Url::default();
        url.set_escaped_path("a:b/c");
        assert_eq!(url.to_string(), "./a:b/c");
    }

    #[test]
    fn non_ascii_host_is_escaped_in_href() {
        let url = Url::parse("http://%E4%B8%AD.com/").unwrap();
        assert_eq!(url.hostname(), "中.com");
        assert_eq!(url.to_string(), "http://%E4%B8%AD.com/");
    }

    #[test]
    fn from_str_and_serde() {
        let url: Url = "http://example.com/a?b#c".parse().unwrap();
        let json = serde_json::to_string(&url).unwrap();
        assert_eq!(json, r#""http://example.com/a?b#c""#);
        let back: Url = serde_json::from_str(&json).unwrap();
        assert_eq!(back, url);
    }
}
