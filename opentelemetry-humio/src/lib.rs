//! # OpenTelemetry Humio Exporter Configuration
//!
//! Validates the settings of a Humio exporter and derives what every outgoing
//! ingest request needs: the structured and unstructured ingest URLs and the final
//! set of HTTP headers.
//!
//! See the [Humio Docs](https://library.humio.com/) for details on ingest tokens
//! and the ingest API.
//!
//! ## Quickstart
//!
//! ```no_run
//! fn main() -> Result<(), opentelemetry_humio::Error> {
//!     let config = opentelemetry_humio::new_config()
//!         .with_ingest_token("00000000-0000-0000-0000-000000000000")
//!         .with_endpoint("https://cloud.humio.com")
//!         .build()?;
//!
//!     assert_eq!(
//!         config.structured_endpoint().as_str(),
//!         "https://cloud.humio.com/api/v1/ingest/humio-structured"
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Loading from YAML
//!
//! The keys match the ones used by the collector's `humio` exporter, so existing
//! configuration files can be reused:
//!
//! ```no_run
//! use opentelemetry_humio::Config;
//!
//! fn main() -> Result<(), opentelemetry_humio::Error> {
//!     let config = Config::from_yaml(
//!         r#"
//!         ingest_token: 00000000-0000-0000-0000-000000000000
//!         endpoint: https://cloud.humio.com
//!         disable_service_tag: true
//!         tags:
//!           host: web-01
//!         logs:
//!           log_parser: accesslog
//!         "#,
//!     )?;
//!
//!     // Fail fast, then derive the settings handed to the transport.
//!     config.validate()?;
//!     let sanitized = config.sanitize()?;
//!     let headers = sanitized.header_map();
//!     assert_eq!(headers["content-encoding"], "gzip");
//!     Ok(())
//! }
//! ```
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![cfg_attr(test, deny(warnings))]

mod builder;
mod config;

pub use builder::{new_config, HumioConfigBuilder};
pub use config::endpoint::{EndpointError, STRUCTURED_PATH, UNSTRUCTURED_PATH};
pub use config::sanitize::SanitizedConfig;
pub use config::{
    Config, HttpClientSettings, LogsConfig, QueueSettings, RetrySettings, TracesConfig,
    DEFAULT_USER_AGENT,
};

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading, validating or sanitizing a Humio configuration.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No ingest token was configured.
    #[error("missing ingest token")]
    MissingIngestToken,

    /// No endpoint was configured.
    #[error("missing endpoint")]
    MissingEndpoint,

    /// The service tag is disabled and nothing replaces it.
    #[error("at least one custom tag required when service tag is disabled")]
    MissingTags,

    /// The endpoint cannot be extended with the ingest API paths.
    #[error("invalid endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        /// The configured endpoint.
        endpoint: String,
        /// Why the ingest URL could not be built.
        source: EndpointError,
    },

    /// A `content-type` header other than `application/json` was configured.
    #[error("content-type must be application/json")]
    ContentTypeMismatch,

    /// An `authorization` header was configured by the user.
    #[error("authorization header must not be set by the user")]
    AuthorizationOverride,

    /// The `content-encoding` header disagrees with `disable_compression`.
    #[error("content-encoding mismatch with compression setting")]
    ContentEncodingMismatch,

    /// The sending queue is enabled with unusable settings.
    #[error("sending_queue: {0}")]
    InvalidQueueSettings(&'static str),

    /// The ingest URLs could not be derived while sanitizing.
    #[error("malformed endpoint {endpoint}")]
    MalformedEndpoint {
        /// The configured endpoint.
        endpoint: String,
    },

    /// The configuration document could not be deserialized.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error reports a violated configuration invariant.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingIngestToken
                | Error::MissingEndpoint
                | Error::MissingTags
                | Error::InvalidEndpoint { .. }
                | Error::ContentTypeMismatch
                | Error::AuthorizationOverride
                | Error::ContentEncodingMismatch
                | Error::InvalidQueueSettings(_)
        )
    }

    /// Whether the error was raised while deriving the ingest URLs.
    pub fn is_derivation(&self) -> bool {
        matches!(self, Error::MalformedEndpoint { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let test_cases = vec![
            (Error::MissingIngestToken, "missing ingest token"),
            (Error::MissingEndpoint, "missing endpoint"),
            (
                Error::MissingTags,
                "at least one custom tag required when service tag is disabled",
            ),
            (
                Error::ContentTypeMismatch,
                "content-type must be application/json",
            ),
            (
                Error::AuthorizationOverride,
                "authorization header must not be set by the user",
            ),
            (
                Error::ContentEncodingMismatch,
                "content-encoding mismatch with compression setting",
            ),
            (
                Error::MalformedEndpoint {
                    endpoint: "mailto:ops@example.com".to_string(),
                },
                "malformed endpoint mailto:ops@example.com",
            ),
        ];

        for (error, expected) in test_cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::MissingTags.is_validation());
        assert!(!Error::MissingTags.is_derivation());

        let derivation = Error::MalformedEndpoint {
            endpoint: String::new(),
        };
        assert!(derivation.is_derivation());
        assert!(!derivation.is_validation());

        let io = Error::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!io.is_validation());
        assert!(!io.is_derivation());
    }
}
