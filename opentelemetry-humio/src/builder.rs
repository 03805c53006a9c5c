use crate::config::sanitize::SanitizedConfig;
use crate::{Config, QueueSettings, RetrySettings};
use std::collections::HashMap;
use std::time::Duration;

/// Create a new Humio configuration builder.
pub fn new_config() -> HumioConfigBuilder {
    HumioConfigBuilder::default()
}

/// Builder for [`SanitizedConfig`].
///
/// Starts from the same defaults as a configuration file that only sets the
/// ingest token and the endpoint.
#[derive(Debug, Default)]
pub struct HumioConfigBuilder {
    config: Config,
}

impl HumioConfigBuilder {
    /// Validate and sanitize the configuration.
    pub fn build(self) -> crate::Result<SanitizedConfig> {
        self.config.validate()?;
        self.config.sanitize()
    }

    /// The configuration assembled so far, neither validated nor sanitized.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Assign the token used to authorize with the Humio repository.
    pub fn with_ingest_token<T: Into<String>>(mut self, token: T) -> Self {
        self.config.ingest_token = token.into();
        self
    }

    /// Assign the base URL of the Humio instance.
    pub fn with_endpoint<T: Into<String>>(mut self, endpoint: T) -> Self {
        self.config.http.endpoint = endpoint.into();
        self
    }

    /// Set additional headers to send with every request.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.config.http.headers.extend(headers);
        self
    }

    /// Set a single additional header.
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config.http.headers.insert(key.into(), value.into());
        self
    }

    /// Assign the timeout of a single request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout = timeout;
        self
    }

    /// Add tags used to route data inside Humio.
    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.config.tags.extend(tags);
        self
    }

    /// Add a single routing tag.
    pub fn with_tag<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config.tags.insert(key.into(), value.into());
        self
    }

    /// Send uncompressed request bodies.
    pub fn with_compression_disabled(mut self, disabled: bool) -> Self {
        self.config.disable_compression = disabled;
        self
    }

    /// Do not tag data with the service name.
    ///
    /// At least one tag must be added with [`with_tag`](Self::with_tag) instead.
    pub fn with_service_tag_disabled(mut self, disabled: bool) -> Self {
        self.config.disable_service_tag = disabled;
        self
    }

    /// Assign the parser applied to unstructured logs.
    pub fn with_log_parser<T: Into<String>>(mut self, parser: T) -> Self {
        self.config.logs.log_parser = parser.into();
        self
    }

    /// Send trace timestamps as Unix time instead of ISO 8601.
    pub fn with_unix_timestamps(mut self, enabled: bool) -> Self {
        self.config.traces.unix_timestamps = enabled;
        self
    }

    /// Assign the queueing settings.
    pub fn with_sending_queue(mut self, settings: QueueSettings) -> Self {
        self.config.sending_queue = settings;
        self
    }

    /// Assign the retry settings.
    pub fn with_retry_on_failure(mut self, settings: RetrySettings) -> Self {
        self.config.retry_on_failure = settings;
        self
    }
}

impl From<Config> for HumioConfigBuilder {
    fn from(config: Config) -> Self {
        HumioConfigBuilder { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_builder_defaults() {
        let builder = new_config();

        assert_eq!(*builder.config(), Config::default());
        assert!(matches!(builder.build(), Err(Error::MissingIngestToken)));
    }

    #[test]
    fn test_builder_build() {
        let config = new_config()
            .with_ingest_token("abc123")
            .with_endpoint("https://cloud.example.com/")
            .with_header("X-Team", "platform")
            .with_timeout(Duration::from_secs(2))
            .with_tag("host", "web-01")
            .with_log_parser("accesslog")
            .with_unix_timestamps(true)
            .build()
            .unwrap();

        assert_eq!(
            config.structured_endpoint().as_str(),
            "https://cloud.example.com/api/v1/ingest/humio-structured"
        );
        assert_eq!(config.headers()["authorization"], "Bearer abc123");
        assert_eq!(config.headers()["x-team"], "platform");
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.tags()["host"], "web-01");
        assert_eq!(config.logs().log_parser, "accesslog");
        assert!(config.traces().unix_timestamps);
    }

    #[test]
    fn test_builder_validates_before_sanitizing() {
        let result = new_config()
            .with_ingest_token("abc123")
            .with_endpoint("https://cloud.example.com")
            .with_header("authorization", "Bearer other")
            .build();
        assert!(matches!(result, Err(Error::AuthorizationOverride)));

        let result = new_config()
            .with_ingest_token("abc123")
            .with_endpoint("https://cloud.example.com")
            .with_compression_disabled(true)
            .with_header("content-encoding", "gzip")
            .build();
        assert!(matches!(result, Err(Error::ContentEncodingMismatch)));

        let result = new_config()
            .with_ingest_token("abc123")
            .with_endpoint("https://cloud.example.com")
            .with_service_tag_disabled(true)
            .build();
        assert!(matches!(result, Err(Error::MissingTags)));
    }

    #[test]
    fn test_builder_extends_headers_and_tags() {
        let builder = new_config()
            .with_header("x-a", "1")
            .with_headers(HashMap::from([("x-b".to_string(), "2".to_string())]))
            .with_tag("host", "web-01")
            .with_tags(HashMap::from([("env".to_string(), "prod".to_string())]));

        assert_eq!(builder.config().http.headers.len(), 2);
        assert_eq!(builder.config().tags.len(), 2);
    }

    #[test]
    fn test_builder_queue_and_retry() {
        let config = new_config()
            .with_ingest_token("abc123")
            .with_endpoint("https://cloud.example.com")
            .with_sending_queue(QueueSettings {
                enabled: true,
                num_consumers: 2,
                queue_size: 100,
            })
            .with_retry_on_failure(RetrySettings {
                enabled: false,
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(config.sending_queue().num_consumers, 2);
        assert!(!config.retry_on_failure().enabled);

        let result = new_config()
            .with_ingest_token("abc123")
            .with_endpoint("https://cloud.example.com")
            .with_sending_queue(QueueSettings {
                enabled: true,
                num_consumers: 0,
                queue_size: 100,
            })
            .build();
        assert!(matches!(result, Err(Error::InvalidQueueSettings(_))));
    }

    #[test]
    fn test_builder_from_config() {
        let config = Config::from_yaml(
            r#"
            ingest_token: abc123
            endpoint: https://cloud.example.com
            "#,
        )
        .unwrap();

        let sanitized = HumioConfigBuilder::from(config.clone()).build().unwrap();
        assert_eq!(sanitized, config.sanitize().unwrap());
    }
}
