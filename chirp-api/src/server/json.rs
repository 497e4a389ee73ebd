use crate::server::ServerError;
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use headers::ContentType;
use serde::Serialize;
use std::any::type_name;
use tracing::warn;

/// Serializes `T` as the `application/json` reply body.
///
/// A value that cannot be represented as JSON (for example a map with
/// non-string keys) is answered with [`ServerError::JsonResponse`], and the
/// offending type is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (TypedHeader(ContentType::json()), body).into_response(),
            Err(err) => {
                warn!(body_type = type_name::<T>(), "Reply body is not valid JSON");
                ServerError::JsonResponse(err).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::json::Json;
    use axum::{
        http::{StatusCode, header::CONTENT_TYPE},
        response::IntoResponse,
    };
    use chirp_common::model::{Id, post::PostMarker};
    use std::collections::HashMap;

    async fn body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn replies_with_json_content_type() {
        let ids: Vec<Id<PostMarker>> = vec![Id::new(2), Id::new(1)];

        let response = Json(ids).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body(response).await, serde_json::json!([2, 1]));
    }

    #[tokio::test]
    async fn unrepresentable_body_is_internal_error() {
        let tuple_keys = HashMap::from([((1_u8, 2_u8), "x")]);

        let response = Json(tuple_keys).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(response).await, serde_json::json!({"status": 500}));
    }
}
