use axum::{
    Json,
    extract::multipart::MultipartError,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::pipeline::ComparisonError;
use crate::search::SearchError;

/// Response header naming the error category on failed requests.
pub const ERROR_KIND_HEADER: &str = "X-FaceFind-Error";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("probe rejected: {0}")]
    ProbeRejected(String),

    #[error("provider error: {0}")]
    ProviderError(String),

    #[error("corpus error: {0}")]
    CorpusError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<SearchError> for GatewayError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Probe(ComparisonError::Decode(e)) => {
                GatewayError::ProbeRejected(e.to_string())
            }
            SearchError::Probe(ComparisonError::Provider(
                e @ EmbeddingError::NoFaceDetected { .. },
            )) => GatewayError::ProbeRejected(e.to_string()),
            SearchError::Probe(ComparisonError::Provider(e)) => {
                GatewayError::ProviderError(e.to_string())
            }
            SearchError::Probe(e @ ComparisonError::Worker(_)) => {
                GatewayError::InternalError(e.to_string())
            }
            SearchError::Corpus(e) => GatewayError::CorpusError(e.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::Multipart(e) => (e.status(), "invalid_request"),
            GatewayError::ProbeRejected(_) => (StatusCode::UNPROCESSABLE_ENTITY, "probe_error"),
            GatewayError::ProviderError(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
            GatewayError::CorpusError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "corpus_error"),
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(ERROR_KIND_HEADER, HeaderValue::from_static(kind));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
