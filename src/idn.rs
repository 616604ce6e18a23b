//! Opt-in hostname conversion to ASCII-Compatible Encoding.

use std::borrow::Cow;

use tracing::debug;

use crate::constants::{MAX_DNS_DOMAIN_LENGTH, MAX_DNS_LABEL_LENGTH};
use crate::error::{IdnaError, IdnaErrorKind};
use crate::url::Url;

/// Converts a hostname to its ASCII form using UTS #46 lookup rules.
///
/// An all-ASCII hostname is returned as-is, borrowed and byte-identical: no
/// case folding and no validation. Anything else goes through strict
/// `ToASCII`, which rejects disallowed code points rather than mapping them,
/// and yields `xn--` labels for the non-ASCII parts.
///
/// # Errors
///
/// Returns `IdnaError` when a non-ASCII hostname cannot be encoded.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use urlscope::normalize_host;
///
/// assert_eq!(normalize_host("straße.de").unwrap(), "xn--strae-oqa.de");
/// assert!(matches!(normalize_host("Example.COM").unwrap(), Cow::Borrowed("Example.COM")));
/// ```
pub fn normalize_host(hostname: &str) -> Result<Cow<'_, str>, IdnaError> {
    if hostname.is_ascii() {
        return Ok(Cow::Borrowed(hostname));
    }

    match ::idna::domain_to_ascii_strict(hostname) {
        Ok(ascii) => {
            debug!(hostname, ascii = %ascii, "converted hostname to ASCII");
            Ok(Cow::Owned(ascii))
        }
        Err(_) => Err(IdnaError {
            hostname: hostname.to_string(),
            kind: classify(hostname),
        }),
    }
}

/// Strict conversion folds length violations into its generic error; redo the
/// conversion without DNS length checks to report which limit was exceeded.
fn classify(hostname: &str) -> IdnaErrorKind {
    let Ok(lenient) = ::idna::domain_to_ascii(hostname) else {
        return IdnaErrorKind::Disallowed {
            detail: describe_rejection(hostname),
        };
    };

    let domain = lenient.strip_suffix('.').unwrap_or(&lenient);
    if let Some(label) = domain
        .split('.')
        .find(|label| label.len() > MAX_DNS_LABEL_LENGTH)
    {
        return IdnaErrorKind::LabelTooLong {
            label: label.to_string(),
            max: MAX_DNS_LABEL_LENGTH,
            actual: label.len(),
        };
    }
    if domain.len() > MAX_DNS_DOMAIN_LENGTH {
        return IdnaErrorKind::DomainTooLong {
            max: MAX_DNS_DOMAIN_LENGTH,
            actual: domain.len(),
        };
    }

    IdnaErrorKind::Disallowed {
        detail: describe_rejection(hostname),
    }
}

/// Names the first rule the hostname breaks. `idna::Errors` carries no
/// detail of its own.
fn describe_rejection(hostname: &str) -> String {
    for c in hostname.chars() {
        if c.is_ascii() {
            if !(c.is_ascii_alphanumeric() || c == '-' || c == '.') {
                return format!("character {c:?} is not allowed in a hostname");
            }
        } else if ::idna::domain_to_ascii(c.encode_utf8(&mut [0; 4])).is_err() {
            return format!("code point U+{:04X} is disallowed", u32::from(c));
        }
    }

    for label in hostname.split('.') {
        if label.starts_with('-') || label.ends_with('-') {
            return format!("label '{label}' starts or ends with a hyphen");
        }
        if label.get(2..4) == Some("--") {
            return format!("label '{label}' has hyphens in the third and fourth positions");
        }
    }

    "a label breaks the bidi, joiner, or Punycode rules".to_string()
}

impl Url {
    /// Returns a copy of this URL with its hostname converted by
    /// [`normalize_host`].
    ///
    /// Any `:port` suffix is kept verbatim. IP literals (hosts starting with
    /// `[`) are never converted.
    ///
    /// # Errors
    ///
    /// Returns `IdnaError` when the hostname cannot be encoded.
    ///
    /// # Examples
    ///
    /// ```
    /// use urlscope::Url;
    ///
    /// let url = Url::parse("http://bücher.example:8080/").unwrap();
    /// let ascii = url.to_ascii_host().unwrap();
    /// assert_eq!(ascii.host(), "xn--bcher-kva.example:8080");
    /// ```
    pub fn to_ascii_host(&self) -> Result<Self, IdnaError> {
        if self.host.starts_with('[') {
            return Ok(self.clone());
        }

        let hostname = self.hostname();
        let ascii = normalize_host(hostname)?;
        if let Cow::Owned(ascii) = ascii {
            let mut url = self.clone();
            url.host = format!("{ascii}{}", &self.host[hostname.len()..]);
            return Ok(url);
        }
        Ok(self.clone())
    }
}
