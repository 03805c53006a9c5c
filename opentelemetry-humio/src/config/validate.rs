use super::endpoint::{build_endpoint, UNSTRUCTURED_PATH};
use super::{header_values, Config, CONTENT_ENCODING_GZIP, CONTENT_TYPE_JSON};
use crate::Error;
use opentelemetry::otel_debug;

impl Config {
    /// Ensures the configuration is usable, so the exporter can fail early.
    ///
    /// Checks run in this order and the first failure is returned:
    ///
    /// 1. the ingest token is set ([`Error::MissingIngestToken`])
    /// 2. the endpoint is set ([`Error::MissingEndpoint`])
    /// 3. at least one tag exists when the service tag is disabled ([`Error::MissingTags`])
    /// 4. the unstructured ingest URL can be built from the endpoint ([`Error::InvalidEndpoint`])
    /// 5. a `content-type` header, if set, is `application/json` ([`Error::ContentTypeMismatch`])
    /// 6. no `authorization` header is set ([`Error::AuthorizationOverride`])
    /// 7. a `content-encoding` header, if set, is `gzip` and compression is enabled
    ///    ([`Error::ContentEncodingMismatch`])
    /// 8. an enabled sending queue has consumers and capacity ([`Error::InvalidQueueSettings`])
    ///
    /// Header names are compared case-insensitively. When several keys name the
    /// same header, every value must pass. Nothing is modified.
    pub fn validate(&self) -> crate::Result<()> {
        let result = self.check();
        match &result {
            Ok(()) => {
                otel_debug!(name: "HumioConfig.Validated");
            }
            Err(err) => {
                let reason = err.to_string();
                otel_debug!(
                    name: "HumioConfig.ValidationFailed",
                    reason = reason.as_str()
                );
            }
        }
        result
    }

    fn check(&self) -> crate::Result<()> {
        if self.ingest_token.is_empty() {
            return Err(Error::MissingIngestToken);
        }

        if self.http.endpoint.is_empty() {
            return Err(Error::MissingEndpoint);
        }

        if self.disable_service_tag && self.tags.is_empty() {
            return Err(Error::MissingTags);
        }

        if let Err(source) = build_endpoint(&self.http.endpoint, UNSTRUCTURED_PATH) {
            return Err(Error::InvalidEndpoint {
                endpoint: self.http.endpoint.clone(),
                source,
            });
        }

        let headers = &self.http.headers;
        if header_values(headers, "content-type").any(|value| value != CONTENT_TYPE_JSON) {
            return Err(Error::ContentTypeMismatch);
        }

        if header_values(headers, "authorization").next().is_some() {
            return Err(Error::AuthorizationOverride);
        }

        if header_values(headers, "content-encoding")
            .any(|value| self.disable_compression || value != CONTENT_ENCODING_GZIP)
        {
            return Err(Error::ContentEncodingMismatch);
        }

        if self.sending_queue.enabled {
            if self.sending_queue.num_consumers == 0 {
                return Err(Error::InvalidQueueSettings(
                    "number of queue consumers must be positive",
                ));
            }
            if self.sending_queue.queue_size == 0 {
                return Err(Error::InvalidQueueSettings("queue size must be positive"));
            }
        }

        Ok(())
    }
}
