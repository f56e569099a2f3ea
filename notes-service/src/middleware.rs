//! Request tracking middleware
//!
//! Request id generation and propagation, plus masking of credential
//! headers in trace output.

use http::header::{AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION, SET_COOKIE};
use http::HeaderName;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

use crate::{
    config::MiddlewareConfig,
    error::{Error, Result},
    ids::MakeHexRequestId,
};

/// Headers masked in logs and spans
pub const SENSITIVE_HEADERS: [HeaderName; 6] = [
    AUTHORIZATION,
    PROXY_AUTHORIZATION,
    COOKIE,
    SET_COOKIE,
    HeaderName::from_static("x-api-key"),
    HeaderName::from_static("x-auth-token"),
];

/// Parse the configured request id header
pub fn request_id_header(config: &MiddlewareConfig) -> Result<HeaderName> {
    HeaderName::try_from(config.request_id_header.as_str()).map_err(|e| {
        Error::Internal(format!(
            "invalid request id header '{}': {}",
            config.request_id_header, e
        ))
    })
}

/// Stamp requests lacking `header` with a generated id
pub fn request_id_layer(header: HeaderName) -> SetRequestIdLayer<MakeHexRequestId> {
    SetRequestIdLayer::new(header, MakeHexRequestId)
}

/// Copy the request id from `header` onto the response
pub fn request_id_propagation_layer(header: HeaderName) -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(header)
}

/// Mask [`SENSITIVE_HEADERS`]
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    SetSensitiveRequestHeadersLayer::new(SENSITIVE_HEADERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    fn tracked(header: HeaderName) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(request_id_propagation_layer(header.clone()))
            .layer(request_id_layer(header))
    }

    #[test]
    fn test_request_id_header_from_config() {
        let config = MiddlewareConfig::default();
        assert_eq!(request_id_header(&config).unwrap(), "x-request-id");

        let bad = MiddlewareConfig {
            request_id_header: "not a header".to_string(),
            ..MiddlewareConfig::default()
        };
        assert!(matches!(request_id_header(&bad), Err(Error::Internal(_))));
    }

    #[test]
    fn test_sensitive_headers_cover_credentials() {
        assert!(SENSITIVE_HEADERS.contains(&AUTHORIZATION));
        assert!(SENSITIVE_HEADERS.contains(&HeaderName::from_static("x-api-key")));
    }

    #[tokio::test]
    async fn test_generated_id_is_echoed() {
        let header = HeaderName::from_static("x-request-id");
        let response = tracked(header.clone())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get(&header).unwrap().to_str().unwrap();
        assert!(id.starts_with(MakeHexRequestId::PREFIX));
    }

    #[tokio::test]
    async fn test_incoming_id_is_kept() {
        let header = HeaderName::from_static("x-correlation-id");
        let response = tracked(header.clone())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(&header, "upstream-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get(&header).unwrap(), "upstream-7");
    }
}
