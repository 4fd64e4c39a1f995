//! Search service configuration.
//!
//! [`SearchConfig`] is a set of clap arguments with environment fallbacks, so
//! the same definition backs [`SearchConfig::from_env`] and the CLI flags.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SPOT_SEARCH_FILTERS` | (none) | Comma-separated filter identifiers, in execution order |
//! | `SPOT_SEARCH_DEFAULT_LIMIT` | 20 | Result limit for distance searches without `limit` |
//! | `SPOT_SEARCH_TIMEOUT_MS` | 5000 | Per-search timeout |

use std::time::Duration;

use clap::{Args, Parser};

/// Default number of results for a distance search.
pub const DEFAULT_LIMIT: usize = 20;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SearchConfig {
    /// Filter identifiers, in execution order
    #[arg(long, env = "SPOT_SEARCH_FILTERS", value_delimiter = ',')]
    pub filters: Vec<String>,

    /// Result limit for distance searches without `limit`
    #[arg(long, env = "SPOT_SEARCH_DEFAULT_LIMIT", default_value = "20")]
    pub default_limit: usize,

    /// Per-search timeout in milliseconds
    #[arg(
        long = "timeout-ms",
        env = "SPOT_SEARCH_TIMEOUT_MS",
        default_value = "5000",
        value_parser = parse_millis
    )]
    pub request_timeout: Duration,
}

/// Parser reading only the environment.
#[derive(Parser)]
#[command(name = "search-service")]
struct EnvConfig {
    #[command(flatten)]
    search: SearchConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            default_limit: DEFAULT_LIMIT,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl SearchConfig {
    /// Read configuration from the environment.
    ///
    /// Process arguments are ignored. Unset variables take their defaults;
    /// a set but unparsable variable is an error, exactly as for the CLI flag.
    pub fn from_env() -> Result<Self, clap::Error> {
        EnvConfig::try_parse_from(["search-service"]).map(|parsed| parsed.search)
    }

    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }
}

fn parse_millis(value: &str) -> Result<Duration, std::num::ParseIntError> {
    value.trim().parse().map(Duration::from_millis)
}
