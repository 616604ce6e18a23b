//! Reference resolution (RFC 3986 §5.2).

use tracing::debug;

use crate::error::ParseError;
use crate::url::Url;

/// Resolves `reference` against `base`, returning a new URL.
///
/// Follows RFC 3986 §5.2.2 ("Transform References"). The result always takes
/// the reference's fragment, never the base's. Neither input is modified.
///
/// # Examples
///
/// ```
/// use urlscope::{resolve, Url};
///
/// let base = Url::parse("http://example.com/a/b/c").unwrap();
/// let reference = Url::parse("../g").unwrap();
/// assert_eq!(resolve(&base, &reference).to_string(), "http://example.com/a/g");
/// ```
#[must_use]
pub fn resolve(base: &Url, reference: &Url) -> Url {
    let mut target = reference.clone();

    if reference.scheme.is_empty() {
        target.scheme.clone_from(&base.scheme);

        if reference.has_authority || !reference.host.is_empty() || reference.user.is_some() {
            target.set_escaped_path(&remove_dot_segments(&reference.escaped_path()));
        } else {
            target.user.clone_from(&base.user);
            target.host.clone_from(&base.host);
            target.has_authority = base.has_authority;

            let reference_path = reference.escaped_path();
            if reference_path.is_empty() {
                target.opaque.clone_from(&base.opaque);
                target.path.clone_from(&base.path);
                target.raw_path.clone_from(&base.raw_path);
                if reference.raw_query.is_none() {
                    target.raw_query.clone_from(&base.raw_query);
                }
            } else if reference_path.starts_with('/') {
                target.set_escaped_path(&remove_dot_segments(&reference_path));
            } else {
                let merged = merge(base, &reference_path);
                target.set_escaped_path(&remove_dot_segments(&merged));
            }
        }
    } else {
        target.set_escaped_path(&remove_dot_segments(&reference.escaped_path()));
    }

    debug!(base = %base, reference = %reference, resolved = %target, "resolved reference");
    target
}

/// Merges a relative-path reference onto the base path (RFC 3986 §5.2.3).
fn merge(base: &Url, reference_path: &str) -> String {
    let base_path = base.escaped_path();
    if base_path.is_empty() {
        return format!("/{reference_path}");
    }
    match base_path.rfind('/') {
        Some(slash) => format!("{}{reference_path}", &base_path[..=slash]),
        None => reference_path.to_string(),
    }
}

/// Removes `.` and `..` segments from a path (RFC 3986 §5.2.4).
///
/// A `..` that would climb above the root is dropped, and a trailing `.` or
/// `..` leaves a trailing `/`.
///
/// # Examples
///
/// ```
/// use urlscope::remove_dot_segments;
///
/// assert_eq!(remove_dot_segments("/a/b/../c"), "/a/c");
/// assert_eq!(remove_dot_segments("/a/./b/"), "/a/b/");
/// assert_eq!(remove_dot_segments("../a"), "a");
/// assert_eq!(remove_dot_segments("/a/b/.."), "/a/");
/// ```
#[must_use]
pub fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input
            .strip_prefix("../")
            .or_else(|| input.strip_prefix("./"))
        {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..].find('/').map_or(input.len(), |i| start + i);
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }

    output
}

fn pop_segment(output: &mut String) {
    match output.rfind('/') {
        Some(slash) => output.truncate(slash),
        None => output.clear(),
    }
}

impl Url {
    /// Resolves `reference` against this URL. See [`resolve`].
    #[must_use]
    pub fn resolve_reference(&self, reference: &Self) -> Self {
        resolve(self, reference)
    }

    /// Parses `input` and resolves it against this URL.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if `input` does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use urlscope::Url;
    ///
    /// let base = Url::parse("http://a/b/c/d;p?q").unwrap();
    /// assert_eq!(base.join("g?y#s").unwrap().to_string(), "http://a/b/c/g?y#s");
    /// ```
    pub fn join(&self, input: &str) -> Result<Self, ParseError> {
        Ok(self.resolve_reference(&Self::parse(input)?))
    }
}
