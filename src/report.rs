//! Presentation of a parsed URL: a text dump and a fixed JSON record.

use std::fmt;

use serde::Serialize;

use crate::query::QueryValues;
use crate::url::Url;

/// Every field of a URL, flattened for JSON output.
///
/// Field names serialize in `PascalCase`. `Username`, `Password`, `Query` and
/// `RawQuery` are `null` when absent; `Query` and `RawQuery` are present
/// exactly when the URL had a `?`.
///
/// # Examples
///
/// ```
/// use urlscope::{Url, UrlReport};
///
/// let url = Url::parse("http://x/?a=1").unwrap();
/// let json = UrlReport::from(&url).to_json().unwrap();
/// assert!(json.contains(r#""Query":{"a":["1"]}"#));
/// assert!(json.contains(r#""RawQuery":"a=1""#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UrlReport {
    /// The recomposed URL
    pub href: String,
    /// Lowercased scheme
    pub scheme: String,
    /// Decoded username, if there was userinfo
    pub username: Option<String>,
    /// Decoded password, if the userinfo had one
    pub password: Option<String>,
    /// `host[:port]`
    pub host: String,
    /// Host without port or brackets
    pub hostname: String,
    /// Port digits
    pub port: String,
    /// Decoded path
    pub path: String,
    /// Original path encoding when it differs from the default
    pub raw_path: String,
    /// Escaped path
    pub escaped_path: String,
    /// Opaque part
    pub opaque: String,
    /// Decoded query values
    pub query: Option<QueryValues>,
    /// Query text after `?`
    pub raw_query: Option<String>,
    /// Decoded fragment
    pub fragment: String,
    /// Original fragment encoding when it differs from the default
    pub raw_fragment: String,
    /// Escaped fragment
    pub escaped_fragment: String,
}

impl UrlReport {
    /// Serializes the report as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&Url> for UrlReport {
    fn from(url: &Url) -> Self {
        Self {
            href: url.to_string(),
            scheme: url.scheme().to_string(),
            username: url.username().map(str::to_string),
            password: url.password().map(str::to_string),
            host: url.host().to_string(),
            hostname: url.hostname().to_string(),
            port: url.port().to_string(),
            path: url.path().to_string(),
            raw_path: url.raw_path().to_string(),
            escaped_path: url.escaped_path().into_owned(),
            opaque: url.opaque().to_string(),
            query: url.raw_query().map(QueryValues::parse_lenient),
            raw_query: url.raw_query().map(str::to_string),
            fragment: url.fragment().to_string(),
            raw_fragment: url.raw_fragment().to_string(),
            escaped_fragment: url.escaped_fragment().into_owned(),
        }
    }
}

/// Human-readable, one-field-per-line dump of a URL.
///
/// String values are printed quoted and escaped.
///
/// ```
/// use urlscope::{TextDump, Url};
///
/// let url = Url::parse("http://x").unwrap();
/// let dump = TextDump(&url).to_string();
/// assert!(dump.contains("Scheme:   \"http\"\n"));
/// assert!(dump.contains("RawQuery: nil (force = false)\n"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TextDump<'a>(pub &'a Url);

impl fmt::Display for TextDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.0;
        writeln!(f, "String:   {:?}", url.to_string())?;
        writeln!(f, "Scheme:   {:?}", url.scheme())?;
        match url.user() {
            Some(user) => writeln!(f, "User:     {:?}", user.to_string())?,
            None => writeln!(f, "User:     nil")?,
        }
        writeln!(
            f,
            "Host:     {:?} ({:?}, {:?})",
            url.host(),
            url.hostname(),
            url.port()
        )?;
        writeln!(
            f,
            "Path:     {:?} (raw: {:?}; escaped: {:?})",
            url.path(),
            url.raw_path(),
            url.escaped_path()
        )?;
        writeln!(f, "Opaque:   {:?}", url.opaque())?;
        match url.raw_query() {
            Some("") => writeln!(f, "RawQuery: \"\" (force = true)")?,
            Some(query) => writeln!(f, "RawQuery: {query:?}")?,
            None => writeln!(f, "RawQuery: nil (force = false)")?,
        }
        writeln!(
            f,
            "Fragment: {:?} (raw: {:?}; escaped: {:?})",
            url.fragment(),
            url.raw_fragment(),
            url.escaped_fragment()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_full_url() {
        let url = Url::parse("https://a:b@example.com:8080/p%20ath?x=1&x=2#frag").unwrap();
        let report = UrlReport::from(&url);
        assert_eq!(report.username.as_deref(), Some("a"));
        assert_eq!(report.password.as_deref(), Some("b"));
        assert_eq!(report.hostname, "example.com");
        assert_eq!(report.port, "8080");
        assert_eq!(report.path, "/p ath");
        assert_eq!(report.escaped_path, "/p%20ath");
        assert_eq!(report.query.unwrap().get_all("x"), ["1", "2"]);
    }

    #[test]
    fn json_field_order_and_nulls() {
        let url = Url::parse("http://x/y").unwrap();
        let json = UrlReport::from(&url).to_json().unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"Href":"http://x/y","Scheme":"http","Username":null,"Password":null,"#,
                r#""Host":"x","Hostname":"x","Port":"","Path":"/y","RawPath":"","#,
                r#""EscapedPath":"/y","Opaque":"","Query":null,"RawQuery":null,"#,
                r#""Fragment":"","RawFragment":"","EscapedFragment":""}"#
            )
        );
    }

    #[test]
    fn json_parses_back() {
        let url = Url::parse("http://u:p@x:1/a%20b?k=v&k=w#f").unwrap();
        let report = UrlReport::from(&url);
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::to_value(&report).unwrap());
        assert_eq!(value["Query"]["k"], serde_json::json!(["v", "w"]));
    }

    #[test]
    fn json_empty_query_is_object() {
        let url = Url::parse("http://x?").unwrap();
        let json = UrlReport::from(&url).to_json().unwrap();
        assert!(json.contains(r#""Query":{},"RawQuery":"""#));
    }

    #[test]
    fn json_username_without_password() {
        let url = Url::parse("http://u@x").unwrap();
        let json = UrlReport::from(&url).to_json().unwrap();
        assert!(json.contains(r#""Username":"u","Password":null"#));
    }

    #[test]
    fn dump_lines() {
        let url = Url::parse("http://u:p@h:1/a%2Fb?#f%20g").unwrap();
        let dump = TextDump(&url).to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[2], r#"User:     "u:p""#);
        assert_eq!(lines[3], r#"Host:     "h:1" ("h", "1")"#);
        assert_eq!(lines[4], r#"Path:     "/a/b" (raw: "/a%2Fb"; escaped: "/a%2Fb")"#);
        assert_eq!(lines[6], r#"RawQuery: "" (force = true)"#);
        assert_eq!(lines[7], r#"Fragment: "f g" (raw: ""; escaped: "f%20g")"#);
    }

    #[test]
    fn dump_without_user() {
        let url = Url::parse("/rel?q=1").unwrap();
        let dump = TextDump(&url).to_string();
        assert!(dump.contains("User:     nil\n"));
        assert!(dump.contains("RawQuery: \"q=1\"\n"));
    }
}
