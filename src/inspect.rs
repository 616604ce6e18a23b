//! The inspection pipeline: parse, optionally resolve, optionally convert
//! the hostname.

use tracing::{debug, warn};

use crate::config::{IdnaPolicy, InspectConfig};
use crate::error::{IdnaError, InspectError};
use crate::url::Url;

/// The outcome of a successful inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// The final URL, resolved and converted as configured
    pub url: Url,
    /// The base URL, when one was configured
    pub base: Option<Url>,
    /// A hostname conversion failure that [`IdnaPolicy::BestEffort`]
    /// recovered from by keeping the original hostname
    pub idna_error: Option<IdnaError>,
}

/// Runs the pipeline described by `config`.
///
/// # Errors
///
/// Returns `InspectError::Input` or `InspectError::Base` when a URL does not
/// parse, and `InspectError::Idna` when hostname conversion fails under
/// [`IdnaPolicy::Strict`].
///
/// # Examples
///
/// ```
/// use urlscope::{inspect, IdnaPolicy, InspectConfig};
///
/// let config = InspectConfig::new("../g")
///     .with_base("http://bücher.example/a/b/c")
///     .with_idna(IdnaPolicy::Strict);
/// let inspection = inspect(&config).unwrap();
/// assert_eq!(inspection.url.to_string(), "http://xn--bcher-kva.example/a/g");
/// ```
pub fn inspect(config: &InspectConfig) -> Result<Inspection, InspectError> {
    let input = Url::parse(&config.input).map_err(InspectError::Input)?;

    let (url, base) = match &config.base {
        Some(base) => {
            let base = Url::parse(base).map_err(InspectError::Base)?;
            (base.resolve_reference(&input), Some(base))
        }
        None => (input, None),
    };

    let mut inspection = Inspection {
        url,
        base,
        idna_error: None,
    };

    match config.idna {
        IdnaPolicy::Off => {}
        IdnaPolicy::BestEffort => match inspection.url.to_ascii_host() {
            Ok(url) => inspection.url = url,
            Err(e) => {
                warn!(error = %e, "keeping original hostname");
                inspection.idna_error = Some(e);
            }
        },
        IdnaPolicy::Strict => {
            inspection.url = inspection.url.to_ascii_host().map_err(InspectError::Idna)?;
        }
    }

    debug!(url = %inspection.url, policy = %config.idna, "inspection complete");
    Ok(inspection)
}
