//! Constants shared by the parser, the hostname normalizer, and the CLI.

/// DNS label maximum length.
pub const MAX_DNS_LABEL_LENGTH: usize = 63;

/// DNS domain maximum length.
pub const MAX_DNS_DOMAIN_LENGTH: usize = 253;

/// Prefix marking an ASCII-Compatible Encoding (Punycode) label.
pub const ACE_PREFIX: &str = "xn--";

/// Environment variable holding the `tracing` filter directives for the CLI.
pub const LOG_ENV_VAR: &str = "URLSCOPE_LOG";

/// Environment variable selecting the default IDNA policy for the CLI.
pub const IDNA_ENV_VAR: &str = "URLSCOPE_IDNA";

pub(crate) const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";
