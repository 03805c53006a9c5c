use super::endpoint::{build_endpoint, STRUCTURED_PATH, UNSTRUCTURED_PATH};
use super::{
    redacted_headers, Config, LogsConfig, QueueSettings, RetrySettings, TracesConfig,
    CONTENT_ENCODING_GZIP, CONTENT_TYPE_JSON, DEFAULT_USER_AGENT,
};
use crate::Error;
use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use opentelemetry::{otel_debug, otel_warn};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Tag carrying the service name, unless the service tag is disabled.
const SERVICE_TAG: &str = "service";

/// Settings ready to be used by the transport, produced by [`Config::sanitize`].
///
/// Immutable, so it can be shared between the workers sending requests.
#[derive(Clone, PartialEq, Eq)]
pub struct SanitizedConfig {
    structured_endpoint: Url,
    unstructured_endpoint: Url,
    headers: HashMap<String, String>,
    timeout: Duration,
    compression_enabled: bool,
    tags: HashMap<String, String>,
    service_tag_enabled: bool,
    logs: LogsConfig,
    traces: TracesConfig,
    sending_queue: QueueSettings,
    retry_on_failure: RetrySettings,
}

impl Config {
    /// Derives the ingest URLs and the headers sent with every request.
    ///
    /// Expects a configuration that passed [`Config::validate`]. The result:
    ///
    /// - has the user headers with lower-cased names; when keys differ only in
    ///   case, the one sorting last byte-wise wins, so an all lower-case key is
    ///   preferred
    /// - always sets `content-type: application/json` and
    ///   `authorization: Bearer <ingest_token>`
    /// - sets `content-encoding: gzip` unless compression is disabled
    /// - sets a default `user-agent` if none is configured
    ///
    /// Headers are never removed. Fails with [`Error::MalformedEndpoint`] if either
    /// ingest URL cannot be built from the endpoint.
    pub fn sanitize(&self) -> crate::Result<SanitizedConfig> {
        let endpoint = &self.http.endpoint;
        let (structured_endpoint, unstructured_endpoint) = match (
            build_endpoint(endpoint, STRUCTURED_PATH),
            build_endpoint(endpoint, UNSTRUCTURED_PATH),
        ) {
            (Ok(structured), Ok(unstructured)) => (structured, unstructured),
            _ => {
                return Err(Error::MalformedEndpoint {
                    endpoint: endpoint.clone(),
                })
            }
        };

        let mut user_headers: Vec<(&String, &String)> = self.http.headers.iter().collect();
        user_headers.sort_unstable();
        let mut headers: HashMap<String, String> = user_headers
            .into_iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value.clone()))
            .collect();

        headers.insert("content-type".to_string(), CONTENT_TYPE_JSON.to_string());
        headers.insert(
            "authorization".to_string(),
            format!("Bearer {}", self.ingest_token),
        );
        if !self.disable_compression {
            headers.insert(
                "content-encoding".to_string(),
                CONTENT_ENCODING_GZIP.to_string(),
            );
        }
        headers
            .entry("user-agent".to_string())
            .or_insert_with(|| DEFAULT_USER_AGENT.to_string());

        otel_debug!(
            name: "HumioConfig.Sanitized",
            compression = !self.disable_compression,
            header_count = headers.len()
        );

        Ok(SanitizedConfig {
            structured_endpoint,
            unstructured_endpoint,
            headers,
            timeout: self.http.timeout,
            compression_enabled: !self.disable_compression,
            tags: self.tags.clone(),
            service_tag_enabled: !self.disable_service_tag,
            logs: self.logs.clone(),
            traces: self.traces.clone(),
            sending_queue: self.sending_queue.clone(),
            retry_on_failure: self.retry_on_failure.clone(),
        })
    }
}

impl SanitizedConfig {
    /// URL of the structured ingest API.
    pub fn structured_endpoint(&self) -> &Url {
        &self.structured_endpoint
    }

    /// URL of the unstructured ingest API.
    pub fn unstructured_endpoint(&self) -> &Url {
        &self.unstructured_endpoint
    }

    /// Headers sent with every request, keyed by lower-case name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Headers as an [`HeaderMap`], ready to be put on a request.
    ///
    /// Headers that are not valid HTTP are skipped. The authorization value is
    /// marked sensitive.
    pub fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (key, value) in &self.headers {
            if let (Ok(name), Ok(mut value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                value.set_sensitive(name == AUTHORIZATION);
                map.insert(name, value);
            } else {
                otel_warn!(name: "HumioConfig.InvalidHeader", header = key.as_str());
            }
        }
        map
    }

    /// Timeout of a single request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether request bodies are gzip compressed.
    pub fn compression_enabled(&self) -> bool {
        self.compression_enabled
    }

    /// Configured tags, without the service tag.
    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// Tags attached to data of the given service.
    ///
    /// Adds `service = <service_name>` unless the service tag is disabled. A
    /// configured `service` tag takes precedence.
    pub fn routing_tags(&self, service_name: Option<&str>) -> HashMap<String, String> {
        let mut tags = self.tags.clone();
        if let Some(service_name) = service_name.filter(|_| self.service_tag_enabled) {
            tags.entry(SERVICE_TAG.to_string())
                .or_insert_with(|| service_name.to_string());
        }
        tags
    }

    /// Logs settings.
    pub fn logs(&self) -> &LogsConfig {
        &self.logs
    }

    /// Traces settings.
    pub fn traces(&self) -> &TracesConfig {
        &self.traces
    }

    /// Queueing settings.
    pub fn sending_queue(&self) -> &QueueSettings {
        &self.sending_queue
    }

    /// Retry settings.
    pub fn retry_on_failure(&self) -> &RetrySettings {
        &self.retry_on_failure
    }
}

impl fmt::Debug for SanitizedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers = redacted_headers(&self.headers);

        f.debug_struct("SanitizedConfig")
            .field("structured_endpoint", &self.structured_endpoint.as_str())
            .field("unstructured_endpoint", &self.unstructured_endpoint.as_str())
            .field("headers", &headers)
            .field("timeout", &self.timeout)
            .field("compression_enabled", &self.compression_enabled)
            .field("tags", &self.tags)
            .field("service_tag_enabled", &self.service_tag_enabled)
            .field("logs", &self.logs)
            .field("traces", &self.traces)
            .field("sending_queue", &self.sending_queue)
            .field("retry_on_failure", &self.retry_on_failure)
            .finish()
    }
}
