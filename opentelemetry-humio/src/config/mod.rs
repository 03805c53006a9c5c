//! Humio exporter settings as loaded from configuration.

mod de;
pub(crate) mod endpoint;
pub(crate) mod sanitize;
mod validate;

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Value of the `user-agent` header when the user does not configure one.
pub const DEFAULT_USER_AGENT: &str = "opentelemetry-collector-contrib Humio";

pub(crate) const CONTENT_TYPE_JSON: &str = "application/json";
pub(crate) const CONTENT_ENCODING_GZIP: &str = "gzip";

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
const DEFAULT_NUM_CONSUMERS: usize = 10;
const DEFAULT_QUEUE_SIZE: usize = 5000;
const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ELAPSED_TIME: Duration = Duration::from_secs(5 * 60);

/// Settings of the HTTP client talking to the ingest API.
///
/// `endpoint` and header values accept any YAML scalar, so `x-api-version: 2`
/// loads as the string `"2"`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpClientSettings {
    /// Base URL of the Humio instance, e.g. `https://cloud.humio.com`.
    #[serde(deserialize_with = "de::scalar_string")]
    pub endpoint: String,

    /// Additional headers sent with every request.
    #[serde(deserialize_with = "de::scalar_string_map")]
    pub headers: HashMap<String, String>,

    /// Timeout of a single request.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        HttpClientSettings {
            endpoint: String::new(),
            headers: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for HttpClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientSettings")
            .field("endpoint", &self.endpoint)
            .field("headers", &redacted_headers(&self.headers))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Settings of the in-memory queue buffering data before it is sent.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Whether data is queued at all.
    pub enabled: bool,
    /// Number of workers draining the queue.
    pub num_consumers: usize,
    /// Maximum number of batches kept in the queue.
    pub queue_size: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        QueueSettings {
            enabled: true,
            num_consumers: DEFAULT_NUM_CONSUMERS,
            queue_size: DEFAULT_QUEUE_SIZE,
        }
    }
}

/// Settings of the retry policy applied to failed requests.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Whether failed requests are retried.
    pub enabled: bool,
    /// Delay before the first retry.
    #[serde(with = "humantime_serde")]
    pub initial_interval: Duration,
    /// Upper bound of the delay between two retries.
    #[serde(with = "humantime_serde")]
    pub max_interval: Duration,
    /// Time after which a request is given up on.
    #[serde(with = "humantime_serde")]
    pub max_elapsed_time: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            enabled: true,
            initial_interval: DEFAULT_INITIAL_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            max_elapsed_time: DEFAULT_MAX_ELAPSED_TIME,
        }
    }
}

/// Settings specific to logs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Name of the parser applied to unstructured logs when the ingest token
    /// has none assigned.
    pub log_parser: String,
}

/// Settings specific to traces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TracesConfig {
    /// Send Unix timestamps instead of ISO 8601 strings.
    pub unix_timestamps: bool,
}

/// Humio exporter configuration, as supplied by the user.
///
/// Call [`Config::validate`] once to fail fast, then [`Config::sanitize`] to obtain
/// the settings used for sending data.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client settings. Their keys sit at the top level of the document.
    #[serde(flatten)]
    pub http: HttpClientSettings,

    /// Queueing settings, read from `sending_queue`.
    pub sending_queue: QueueSettings,

    /// Retry settings, read from `retry_on_failure`.
    pub retry_on_failure: RetrySettings,

    /// Token identifying and authorizing with a Humio repository.
    pub ingest_token: String,

    /// Send requests without gzip compression.
    pub disable_compression: bool,

    /// Key-value pairs used to route data to specific data sources.
    pub tags: HashMap<String, String>,

    /// Do not add the service name as a tag.
    pub disable_service_tag: bool,

    /// Logs settings.
    pub logs: LogsConfig,

    /// Traces settings.
    pub traces: TracesConfig,
}

impl Config {
    /// Creates a `Config` from a YAML string. An empty document yields the defaults.
    pub fn from_yaml(yaml_str: &str) -> crate::Result<Self> {
        let config: Option<Config> = serde_yaml::from_str(yaml_str)?;
        Ok(config.unwrap_or_default())
    }

    /// Creates a `Config` from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(file_path: P) -> crate::Result<Self> {
        let yaml_str = std::fs::read_to_string(file_path)?;
        Self::from_yaml(&yaml_str)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("http", &self.http)
            .field("sending_queue", &self.sending_queue)
            .field("retry_on_failure", &self.retry_on_failure)
            .field("ingest_token", &"<redacted>")
            .field("disable_compression", &self.disable_compression)
            .field("tags", &self.tags)
            .field("disable_service_tag", &self.disable_service_tag)
            .field("logs", &self.logs)
            .field("traces", &self.traces)
            .finish()
    }
}

/// Values of every header named `name`, ignoring ASCII case.
///
/// More than one value is returned when user keys differ only in case.
pub(crate) fn header_values<'a>(
    headers: &'a HashMap<String, String>,
    name: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    headers
        .iter()
        .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Headers in name order with the `authorization` value hidden.
pub(crate) fn redacted_headers(headers: &HashMap<String, String>) -> BTreeMap<&str, &str> {
    headers
        .iter()
        .map(|(key, value)| {
            if key.eq_ignore_ascii_case("authorization") {
                (key.as_str(), "<redacted>")
            } else {
                (key.as_str(), value.as_str())
            }
        })
        .collect()
}
