use axum::{body::Body, extract::Request};
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Keeps a caller-supplied `x-request-id`, otherwise assigns a UUID v4
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Echoes the request id back on the response
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Log-field form of a request id
pub fn request_id_str(request_id: &RequestId) -> &str {
    request_id.header_value().to_str().unwrap_or("<non-ascii>")
}

pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(request_id_str)
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Extension, Router};
    use axum_test::TestServer;
    use tower::ServiceBuilder;

    async fn echo_id(Extension(request_id): Extension<RequestId>) -> String {
        request_id_str(&request_id).to_string()
    }

    fn server() -> TestServer {
        let app = Router::new().route("/", get(echo_id)).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(propagate_request_id_layer()),
        );
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_handler_and_response_share_the_id() {
        let response = server().get("/").await;

        let echoed = response.header(REQUEST_ID_HEADER);
        assert_eq!(response.text(), echoed.to_str().unwrap());
        assert_eq!(response.text().len(), 36);
    }

    #[tokio::test]
    async fn test_caller_id_is_kept() {
        let response = server()
            .get("/")
            .add_header(
                axum::http::HeaderName::from_static(REQUEST_ID_HEADER),
                axum::http::HeaderValue::from_static("search-42"),
            )
            .await;

        assert_eq!(response.text(), "search-42");
        assert_eq!(response.header(REQUEST_ID_HEADER), "search-42");
    }
}
