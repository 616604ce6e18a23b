//! Error types for URL parsing, hostname normalization, and the CLI pipeline.

use std::fmt;

/// Errors that can occur when parsing a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The input that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Returns the byte offset into [`ParseError::input`] where parsing failed,
    /// when the failure can be pinned to one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match &self.kind {
            ParseErrorKind::ControlChar { position }
            | ParseErrorKind::ColonInFirstSegment { position }
            | ParseErrorKind::InvalidUserinfo { position }
            | ParseErrorKind::MissingBracket { position }
            | ParseErrorKind::InvalidPort { position, .. } => Some(*position),
            ParseErrorKind::InvalidEscape(e) => Some(e.position()),
            ParseErrorKind::MissingScheme => Some(0),
        }
    }
}

/// Specific parsing error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// An ASCII control byte appeared before the fragment
    ControlChar {
        /// Byte offset of the control character
        position: usize,
    },
    /// The input starts with `:`, so the scheme is empty
    MissingScheme,
    /// A schemeless reference has a colon in its first path segment
    ColonInFirstSegment {
        /// Byte offset of the colon
        position: usize,
    },
    /// The userinfo contains a character that must be escaped
    InvalidUserinfo {
        /// Byte offset of the offending character
        position: usize,
    },
    /// An IP literal host has no closing bracket
    MissingBracket {
        /// Byte offset of the opening bracket
        position: usize,
    },
    /// The text after the host's colon is not a port
    InvalidPort {
        /// The text found, including the leading colon
        port: String,
        /// Byte offset of the colon
        position: usize,
    },
    /// Percent-decoding a component failed
    InvalidEscape(EscapeError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse URL {:?}: ", self.input)?;
        match &self.kind {
            ParseErrorKind::ControlChar { position } => {
                write!(f, "invalid control character in URL at offset {position}")
            }
            ParseErrorKind::MissingScheme => write!(f, "missing protocol scheme"),
            ParseErrorKind::ColonInFirstSegment { position } => write!(
                f,
                "first path segment in URL cannot contain colon (offset {position})"
            ),
            ParseErrorKind::InvalidUserinfo { position } => {
                write!(f, "invalid userinfo at offset {position}")
            }
            ParseErrorKind::MissingBracket { position } => {
                write!(f, "missing ']' in host starting at offset {position}")
            }
            ParseErrorKind::InvalidPort { port, position } => {
                write!(f, "invalid port {port:?} after host at offset {position}")
            }
            ParseErrorKind::InvalidEscape(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::InvalidEscape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EscapeError> for ParseErrorKind {
    fn from(e: EscapeError) -> Self {
        Self::InvalidEscape(e)
    }
}

/// Errors from percent-decoding a single URL component.
///
/// Positions are byte offsets. [`crate::unescape`] reports them relative to
/// the string it was given; the URL parser shifts them to the full input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapeError {
    /// `%` not followed by two hex digits, or an escape not allowed in a host
    InvalidEscape {
        /// The offending escape, at most three bytes
        escape: String,
        /// Byte offset of the `%`
        position: usize,
    },
    /// A byte that may not appear literally in a host
    InvalidHostChar {
        /// The offending character
        char: char,
        /// Byte offset of the character
        position: usize,
    },
}

impl EscapeError {
    /// Returns the byte offset of the failure.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::InvalidEscape { position, .. } | Self::InvalidHostChar { position, .. } => {
                *position
            }
        }
    }

    pub(crate) fn shifted(self, offset: usize) -> Self {
        match self {
            Self::InvalidEscape { escape, position } => Self::InvalidEscape {
                escape,
                position: position + offset,
            },
            Self::InvalidHostChar { char, position } => Self::InvalidHostChar {
                char,
                position: position + offset,
            },
        }
    }
}

impl fmt::Display for EscapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEscape { escape, position } => {
                write!(f, "invalid URL escape {escape:?} at offset {position}")
            }
            Self::InvalidHostChar { char, position } => {
                write!(f, "invalid character {char:?} in host name at offset {position}")
            }
        }
    }
}

impl std::error::Error for EscapeError {}

/// Errors for query string parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A pair used `;` as a separator
    InvalidSemicolon {
        /// The rejected pair
        pair: String,
    },
    /// Invalid percent encoding
    InvalidPercentEncoding {
        /// The invalid value
        value: String,
        /// The underlying decoding failure
        source: EscapeError,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSemicolon { pair } => {
                write!(f, "invalid semicolon separator in query pair '{pair}'")
            }
            Self::InvalidPercentEncoding { value, source } => {
                write!(f, "invalid percent encoding in '{value}': {source}")
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSemicolon { .. } => None,
            Self::InvalidPercentEncoding { source, .. } => Some(source),
        }
    }
}

/// Errors from converting a hostname to its ASCII-Compatible Encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdnaError {
    /// The hostname that failed to convert
    pub hostname: String,
    /// Why the conversion failed
    pub kind: IdnaErrorKind,
}

/// Specific IDNA failure types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdnaErrorKind {
    /// The UTS #46 lookup rejected the input (disallowed code point, bad
    /// hyphen placement, bidi violation, or a Punycode failure)
    Disallowed {
        /// Diagnostic text from the IDNA processor
        detail: String,
    },
    /// An encoded label exceeds the DNS label limit
    LabelTooLong {
        /// The encoded label
        label: String,
        /// Maximum allowed length
        max: usize,
        /// Actual length
        actual: usize,
    },
    /// The encoded domain exceeds the DNS name limit
    DomainTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual length
        actual: usize,
    },
}

impl fmt::Display for IdnaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert host '{}' to ASCII: ", self.hostname)?;
        match &self.kind {
            IdnaErrorKind::Disallowed { detail } => {
                write!(f, "rejected by IDNA lookup ({detail})")
            }
            IdnaErrorKind::LabelTooLong { label, max, actual } => {
                write!(f, "label '{label}' is {actual} chars, max is {max}")
            }
            IdnaErrorKind::DomainTooLong { max, actual } => {
                write!(f, "encoded name length {actual} exceeds maximum {max}")
            }
        }
    }
}

impl std::error::Error for IdnaError {}

/// Errors from reading the CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No URL argument was given
    MissingInput,
    /// A flag that takes a value was last on the command line
    MissingValue {
        /// The flag as written
        flag: String,
    },
    /// An unrecognized flag
    UnknownFlag {
        /// The flag as written
        flag: String,
    },
    /// An IDNA policy name that is not `off`, `best-effort`, or `strict`
    InvalidPolicy {
        /// The rejected value
        value: String,
    },
    /// `-h` or `--help` was given
    HelpRequested,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => write!(f, "missing URL argument"),
            Self::MissingValue { flag } => write!(f, "flag '{flag}' needs a value"),
            Self::UnknownFlag { flag } => write!(f, "unknown flag '{flag}'"),
            Self::InvalidPolicy { value } => write!(
                f,
                "invalid IDNA policy '{value}'; expected off, best-effort, or strict"
            ),
            Self::HelpRequested => write!(f, "help requested"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from running the inspection pipeline.
///
/// Keeps a malformed input, a malformed base, and an unconvertible hostname
/// apart so callers can decide which ones are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    /// The URL being inspected failed to parse
    Input(ParseError),
    /// The base URL failed to parse
    Base(ParseError),
    /// Hostname conversion failed under the strict IDNA policy
    Idna(IdnaError),
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "{e}"),
            Self::Base(e) => write!(f, "parse base URL: {e}"),
            Self::Idna(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InspectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Input(e) | Self::Base(e) => Some(e),
            Self::Idna(e) => Some(e),
        }
    }
}
