//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use urlscope::prelude::*;
//!
//! let url = Url::parse("http://example.com/a/b/c").unwrap();
//! let resolved = resolve(&url, &Url::parse("../g").unwrap());
//! assert_eq!(resolved.path(), "/a/g");
//! ```
//!
//! The escaping functions are left out because their names are generic; use
//! them through the crate root.

pub use crate::{
    // Core types
    Component, QueryValues, Url, Userinfo,
    // Operations
    inspect, normalize_host, remove_dot_segments, resolve, split_host_port,
    // Presentation and configuration
    IdnaPolicy, InspectConfig, Inspection, TextDump, UrlReport,
    // Errors
    ConfigError, EscapeError, IdnaError, IdnaErrorKind, InspectError, ParseError, ParseErrorKind,
    QueryError,
    // Constants
    ACE_PREFIX, MAX_DNS_DOMAIN_LENGTH, MAX_DNS_LABEL_LENGTH,
};
