//! Configuration for an inspection run.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::constants::IDNA_ENV_VAR;
use crate::error::ConfigError;

/// Usage text printed for `-h` and for command-line errors.
pub const USAGE: &str = "\
usage: urlscope [--base <url>] [--idna | --idna-strict] <url>

  --base <url>     resolve <url> against this base URL
  --idna           convert the hostname to ASCII, keeping it on failure
  --idna-strict    convert the hostname to ASCII, failing on error
  -h, --help       print this message

environment:
  URLSCOPE_IDNA    default IDNA policy: off, best-effort, or strict
  URLSCOPE_LOG     log filter directives (default: warn)";

/// What to do with non-ASCII hostnames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdnaPolicy {
    /// Leave hostnames untouched
    #[default]
    Off,
    /// Convert, keeping the original hostname when conversion fails
    BestEffort,
    /// Convert, treating a failed conversion as an error
    Strict,
}

impl IdnaPolicy {
    /// Returns the policy's name as accepted by [`IdnaPolicy::from_str`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::BestEffort => "best-effort",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for IdnaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdnaPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "" => Ok(Self::Off),
            "best-effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            _ => Err(ConfigError::InvalidPolicy {
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for one inspection run.
///
/// Settings come from, in increasing priority: defaults, the
/// `URLSCOPE_IDNA` environment variable, and command-line flags.
///
/// # Examples
///
/// ```
/// use urlscope::{IdnaPolicy, InspectConfig};
///
/// let config = InspectConfig::from_args(["--base", "http://a/b", "c", "--idna"], None).unwrap();
/// assert_eq!(config.input, "c");
/// assert_eq!(config.base.as_deref(), Some("http://a/b"));
/// assert_eq!(config.idna, IdnaPolicy::BestEffort);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InspectConfig {
    /// The URL or reference to inspect.
    pub input: String,

    /// Base URL to resolve `input` against.
    ///
    /// Default: None
    pub base: Option<String>,

    /// Hostname conversion policy.
    ///
    /// Default: [`IdnaPolicy::Off`]
    pub idna: IdnaPolicy,
}

impl InspectConfig {
    /// Creates a configuration for `input` with defaults.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Sets the IDNA policy.
    #[must_use]
    pub const fn with_idna(mut self, policy: IdnaPolicy) -> Self {
        self.idna = policy;
        self
    }

    /// Reads the configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// See [`InspectConfig::from_args`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let policy = std::env::var(IDNA_ENV_VAR).ok();
        Self::from_args(std::env::args().skip(1), policy.as_deref())
    }

    /// Builds a configuration from command-line arguments (without the
    /// program name) and the value of `URLSCOPE_IDNA`, if set.
    ///
    /// Flags may be written with one or two dashes. `--` ends flag parsing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no URL is given, a flag is unknown or missing
    /// its value, the environment names an unknown policy, or help was
    /// requested.
    pub fn from_args<I, S>(args: I, idna_env: Option<&str>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        if let Some(value) = idna_env {
            config.idna = value.parse()?;
        }

        let mut positionals = Vec::new();
        let mut args = args.into_iter().map(Into::into);
        let mut flags_done = false;

        while let Some(arg) = args.next() {
            if flags_done || arg == "-" || !arg.starts_with('-') {
                positionals.push(arg);
                continue;
            }
            if arg == "--" {
                flags_done = true;
                continue;
            }

            let (name, inline_value) = match arg.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (arg.as_str(), None),
            };

            match name.trim_start_matches('-') {
                "base" => {
                    let value = match inline_value {
                        Some(value) => value,
                        None => args.next().ok_or_else(|| ConfigError::MissingValue {
                            flag: arg.clone(),
                        })?,
                    };
                    config.base = Some(value);
                }
                "idna" if inline_value.is_none() => config.idna = IdnaPolicy::BestEffort,
                "idna-strict" if inline_value.is_none() => config.idna = IdnaPolicy::Strict,
                "h" | "help" => return Err(ConfigError::HelpRequested),
                _ => return Err(ConfigError::UnknownFlag { flag: arg.clone() }),
            }
        }

        let mut positionals = positionals.into_iter();
        config.input = positionals.next().ok_or(ConfigError::MissingInput)?;
        let extra: Vec<String> = positionals.collect();
        if !extra.is_empty() {
            warn!(?extra, "ignoring extra arguments");
        }

        Ok(config)
    }
}
