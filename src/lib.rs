//! URL parsing, reference resolution, and hostname normalization.
//!
//! This crate parses URLs and relative references following RFC 3986,
//! resolves references against a base URL (RFC 3986 §5.2), and optionally
//! converts internationalized hostnames to their ASCII form (UTS #46).
//!
//! # Overview
//!
//! A parsed [`Url`] keeps its components decoded, remembers the original
//! encoding when re-encoding would not reproduce it, and distinguishes an
//! absent query from an empty one:
//!
//! ```text
//! scheme:opaque[?query][#fragment]
//! [scheme:][//[userinfo@]host[:port]]path[?query][#fragment]
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use urlscope::Url;
//!
//! // Parse a URL
//! let url = Url::parse("https://a:b@example.com:8080/p%20ath?x=1&x=2#frag").unwrap();
//!
//! // Access components
//! assert_eq!(url.hostname(), "example.com");
//! assert_eq!(url.port(), "8080");
//! assert_eq!(url.path(), "/p ath");
//! assert_eq!(url.query().get_all("x"), ["1", "2"]);
//!
//! // Resolve a reference
//! let base = Url::parse("http://example.com/a/b/c").unwrap();
//! assert_eq!(base.join("../g").unwrap().path(), "/a/g");
//! ```
//!
//! # Hostname Normalization
//!
//! Conversion is opt-in and leaves ASCII hostnames and IP literals alone:
//!
//! ```rust
//! use urlscope::Url;
//!
//! let url = Url::parse("http://straße.de:8080/").unwrap();
//! assert_eq!(url.to_ascii_host().unwrap().host(), "xn--strae-oqa.de:8080");
//! ```
//!
//! # Inspection
//!
//! [`inspect`] runs the parse, resolve, and convert steps described by an
//! [`InspectConfig`]; [`UrlReport`] and [`TextDump`] present the result.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod constants;
mod error;
mod escape;
mod host;
mod idn;
mod inspect;
mod query;
mod report;
mod resolve;
mod url;
mod userinfo;

pub mod prelude;

pub use config::{IdnaPolicy, InspectConfig, USAGE};
pub use constants::{
    ACE_PREFIX, IDNA_ENV_VAR, LOG_ENV_VAR, MAX_DNS_DOMAIN_LENGTH, MAX_DNS_LABEL_LENGTH,
};
pub use error::{
    ConfigError, EscapeError, IdnaError, IdnaErrorKind, InspectError, ParseError, ParseErrorKind,
    QueryError,
};
pub use escape::{escape, is_valid_encoded, should_escape, unescape, Component};
pub use host::{split_host_port, valid_optional_port};
pub use idn::normalize_host;
pub use inspect::{inspect, Inspection};
pub use query::QueryValues;
pub use report::{TextDump, UrlReport};
pub use resolve::{remove_dot_segments, resolve};
pub use url::Url;
pub use userinfo::Userinfo;
