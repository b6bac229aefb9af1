//! Client configuration.
//!
//! Values come from the environment with fallbacks:
//!
//! | Variable                        | Default                      |
//! |---------------------------------|------------------------------|
//! | `PACKJOB_API_URL`               | `http://localhost:8080/api`  |
//! | `PACKJOB_SESSION_TOKEN`         | unset                        |
//! | `PACKJOB_JOB_TIMEOUT_SECS`      | unset (no timeout)           |
//! | `PACKJOB_CONNECT_TIMEOUT_SECS`  | `10`                         |

use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default connect timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root that `/user/packs` and `/job/{id}` are resolved against.
    pub base_url: Url,
    /// Sent as the `jwt` cookie when present.
    pub session_token: Option<String>,
    /// Upper bound on the streaming phase of a job.
    pub job_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            session_token: None,
            job_timeout: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Build a config for the given API root.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Load configuration from `PACKJOB_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("PACKJOB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let job_timeout = lookup("PACKJOB_JOB_TIMEOUT_SECS")
            .map(|v| parse_secs("PACKJOB_JOB_TIMEOUT_SECS", &v))
            .transpose()?;

        let connect_timeout = lookup("PACKJOB_CONNECT_TIMEOUT_SECS")
            .map(|v| parse_secs("PACKJOB_CONNECT_TIMEOUT_SECS", &v))
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        Ok(Self {
            base_url: parse_base_url(&base_url)?,
            session_token: lookup("PACKJOB_SESSION_TOKEN").filter(|t| !t.is_empty()),
            job_timeout,
            connect_timeout,
        })
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = Some(timeout);
        self
    }

    /// Join an API path onto the base URL.
    ///
    /// The base path is kept: `http://host/api` + `/job/1` is
    /// `http://host/api/job/1`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// URL of a job's event stream, `{base}/job/{job_id}`.
    ///
    /// The id is pushed as a single path segment, so reserved characters in
    /// it are percent-encoded instead of changing the request target.
    pub fn job_url(&self, job_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .push("job")
            .push(job_id);
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid API URL: {}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("API URL must be http or https, got {}", url.scheme());
    }
    Ok(url)
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .with_context(|| format!("Invalid {} value: {}", key, value))
}
