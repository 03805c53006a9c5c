use url::Url;

/// Sub-path of the ingest API accepting raw, unparsed log lines.
pub const UNSTRUCTURED_PATH: &str = "api/v1/ingest/humio-unstructured";

/// Sub-path of the ingest API accepting pre-parsed events.
pub const STRUCTURED_PATH: &str = "api/v1/ingest/humio-structured";

/// Reasons an ingest URL cannot be built from the configured endpoint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EndpointError {
    /// The endpoint is not an absolute URL.
    #[error("{0}")]
    Parse(#[from] url::ParseError),

    /// The endpoint parsed, but it has no hierarchical path to extend (e.g. `mailto:`).
    #[error("url cannot carry a path")]
    CannotBeABase,
}

/// Join `dest` onto the path of `base`.
///
/// Empty and `.` segments on either side are dropped, so `https://host/base/` and
/// `https://host/base` both yield `/base/<dest>`. Query and fragment are kept.
pub(crate) fn build_endpoint(base: &str, dest: &str) -> Result<Url, EndpointError> {
    let mut url = Url::parse(base)?;
    if url.cannot_be_a_base() {
        return Err(EndpointError::CannotBeABase);
    }

    let path = url
        .path()
        .split('/')
        .chain(dest.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");
    url.set_path(&format!("/{path}"));

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_endpoint() {
        let test_cases = vec![
            // Format: (base, expected)
            (
                "https://cloud.example.com",
                "https://cloud.example.com/api/v1/ingest/humio-structured",
            ),
            (
                "https://cloud.example.com/",
                "https://cloud.example.com/api/v1/ingest/humio-structured",
            ),
            (
                "https://cloud.example.com/base/",
                "https://cloud.example.com/base/api/v1/ingest/humio-structured",
            ),
            (
                "https://cloud.example.com/base",
                "https://cloud.example.com/base/api/v1/ingest/humio-structured",
            ),
            (
                "https://cloud.example.com//base//nested/",
                "https://cloud.example.com/base/nested/api/v1/ingest/humio-structured",
            ),
            (
                "http://localhost:8080/./humio",
                "http://localhost:8080/humio/api/v1/ingest/humio-structured",
            ),
            (
                "https://cloud.example.com/base?org=1",
                "https://cloud.example.com/base/api/v1/ingest/humio-structured?org=1",
            ),
        ];

        for (base, expected) in test_cases {
            let url = build_endpoint(base, STRUCTURED_PATH).unwrap();
            assert_eq!(url.as_str(), expected, "joining onto {base}");
        }
    }

    #[test]
    fn test_build_endpoint_keeps_path_prefix() {
        let url = build_endpoint("https://cloud.example.com/base/", UNSTRUCTURED_PATH).unwrap();
        assert_eq!(url.path(), "/base/api/v1/ingest/humio-unstructured");
        assert_eq!(url.host_str(), Some("cloud.example.com"));
    }

    #[test]
    fn test_build_endpoint_errors() {
        assert!(matches!(
            build_endpoint("https://cloud example.com", STRUCTURED_PATH),
            Err(EndpointError::Parse(_))
        ));
        assert_eq!(
            build_endpoint("cloud.example.com", STRUCTURED_PATH),
            Err(EndpointError::Parse(url::ParseError::RelativeUrlWithoutBase))
        );
        assert_eq!(
            build_endpoint("mailto:ops@example.com", STRUCTURED_PATH),
            Err(EndpointError::CannotBeABase)
        );
        assert!(matches!(
            build_endpoint("http://", STRUCTURED_PATH),
            Err(EndpointError::Parse(_))
        ));
    }
}
