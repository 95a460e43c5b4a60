use crate::render;
use crate::state::AppState;
use axum::{
    Router,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use detector::{DEFAULT_CONFIDENCE, DetectError};
use thiserror::Error;
use tower_http::cors::CorsLayer;

pub async fn run_server(addr: &str, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/upload", get(upload))
        .route("/capture", get(capture))
        .route("/detect", post(detect))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn landing() -> Html<String> {
    Html(render::landing_page())
}

async fn upload() -> Html<String> {
    Html(render::upload_page())
}

async fn capture() -> Html<String> {
    Html(render::capture_page())
}

/// Upload and capture both post here: multipart body with the image bytes
/// and the confidence slider value.
async fn detect(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, GatewayError> {
    let mut image_bytes: Option<Bytes> = None;
    let mut confidence = DEFAULT_CONFIDENCE;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                image_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| GatewayError::BadRequest(e.to_string()))?,
                );
            }
            Some("confidence") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| GatewayError::BadRequest(e.to_string()))?;
                confidence = raw.trim().parse().map_err(|_| {
                    GatewayError::BadRequest(format!("invalid confidence value: {raw}"))
                })?;
            }
            _ => {}
        }
    }

    let image_bytes =
        image_bytes.ok_or_else(|| GatewayError::BadRequest("missing image field".to_string()))?;

    let analysis = {
        let mut detector = state
            .detector
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        detector.analyze(&image_bytes, confidence)?
    };

    let body = render::result_page(&image_bytes, &analysis).map_err(GatewayError::Render)?;
    Ok(Html(body))
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error("failed to render response: {0}")]
    Render(anyhow::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::BadRequest(_)
            | GatewayError::Detect(DetectError::InvalidParameter(_))
            | GatewayError::Detect(DetectError::Decode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Detect(DetectError::Fetch(_)) => StatusCode::BAD_GATEWAY,
            GatewayError::Detect(_) | GatewayError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        tracing::error!(error = %self, "request failed");

        (status, Html(render::error_page(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_side_problems_map_to_unprocessable_entity() {
        let err = GatewayError::BadRequest("missing image field".to_string());
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let err = GatewayError::Detect(DetectError::InvalidParameter(1.5));
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn fetch_failures_map_to_bad_gateway() {
        let err = GatewayError::Detect(DetectError::Fetch("unreachable".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn inference_failures_map_to_internal_error() {
        let err = GatewayError::Detect(DetectError::Inference(anyhow::anyhow!("device lost")));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
