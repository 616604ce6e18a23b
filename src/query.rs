//! Decoded query values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::QueryError;
use crate::escape::{escape, unescape, Component};

/// Query values decoded from a `k=v&k=v` string.
///
/// Keys are sorted lexicographically; a key may carry several values, kept in
/// the order they appeared. Keys and values are decoded with form-encoding
/// rules, so `+` becomes a space.
///
/// # Examples
///
/// ```
/// use urlscope::QueryValues;
///
/// let values = QueryValues::parse("x=1&y=a+b&x=2").unwrap();
/// assert_eq!(values.get_all("x"), ["1", "2"]);
/// assert_eq!(values.get("y"), Some("a b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct QueryValues {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryValues {
    /// Creates an empty set of query values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses query values from a raw query string (without leading '?').
    ///
    /// # Errors
    ///
    /// Returns the first `QueryError` encountered: a pair containing `;`, or
    /// a key or value with a malformed percent escape.
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let (values, error) = Self::parse_collecting(input);
        match error {
            Some(e) => Err(e),
            None => Ok(values),
        }
    }

    /// Parses query values, skipping pairs that fail to decode.
    ///
    /// ```
    /// use urlscope::QueryValues;
    ///
    /// let values = QueryValues::parse_lenient("a=1&b=%zz&c;d=2&e=3");
    /// assert_eq!(values.len(), 2);
    /// assert_eq!(values.get("e"), Some("3"));
    /// ```
    #[must_use]
    pub fn parse_lenient(input: &str) -> Self {
        Self::parse_collecting(input).0
    }

    fn parse_collecting(input: &str) -> (Self, Option<QueryError>) {
        let mut values = Self::new();
        let mut first_error = None;

        for pair in input.split('&') {
            if pair.is_empty() {
                continue;
            }

            match Self::decode_pair(pair) {
                Ok((key, value)) => values.append(key, value),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        (values, first_error)
    }

    fn decode_pair(pair: &str) -> Result<(String, String), QueryError> {
        if pair.contains(';') {
            return Err(QueryError::InvalidSemicolon {
                pair: pair.to_string(),
            });
        }

        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let decode = |s: &str| {
            unescape(s, Component::QueryComponent)
                .map(std::borrow::Cow::into_owned)
                .map_err(|source| QueryError::InvalidPercentEncoding {
                    value: s.to_string(),
                    source,
                })
        };

        Ok((decode(key)?, decode(value)?))
    }

    /// Appends a value for `key`, after any existing values.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    /// Returns the first value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value for a key, in order of appearance.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.params
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns true if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns an iterator over keys and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Encodes the values as a query string, sorted by key.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, values) in &self.params {
            let key = escape(key, Component::QueryComponent);
            for value in values {
                if !out.is_empty() {
                    out.push('&');
                }
                out.push_str(&key);
                out.push('=');
                out.push_str(&escape(value, Component::QueryComponent));
            }
        }
        out
    }
}

impl fmt::Display for QueryValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for QueryValues {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
