use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::error::GatewayError;
use super::state::HandlerState;
use crate::cache::{CACHE_STATUS_HEADER, CacheStats, CacheStatus, ClearedCounts};
use crate::embedding::EmbeddingProvider;
use crate::imaging::{DomainHint, ImageDomain};
use crate::pipeline::ImageInput;
use crate::scoring::ComparisonResult;
use crate::search::{RankedMatch, SearchOptions};

/// Service name reported by `/api/health`.
pub const SERVICE_NAME: &str = "FaceFind";

pub const FIELD_SKETCH: &str = "sketch";
pub const FIELD_PHOTO: &str = "photo";
pub const FIELD_SKETCH_DOMAIN: &str = "sketch_domain";
pub const FIELD_PHOTO_DOMAIN: &str = "photo_domain";
pub const FIELD_USE_CACHE: &str = "use_cache";
pub const FIELD_TOP_K: &str = "top_k";
pub const FIELD_THRESHOLD: &str = "threshold";

/// Multipart body collected into memory, keyed by field name. Later duplicates win.
#[derive(Debug, Default)]
pub struct UploadForm {
    parts: HashMap<String, Vec<u8>>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, GatewayError> {
        let mut parts = HashMap::new();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let bytes = field.bytes().await?;
            parts.insert(name, bytes.to_vec());
        }
        Ok(Self { parts })
    }

    pub fn from_parts<I, K>(parts: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// A required, non-empty file part.
    pub fn take_file(&mut self, name: &str) -> Result<Vec<u8>, GatewayError> {
        match self.parts.remove(name) {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            Some(_) => Err(GatewayError::InvalidRequest(format!(
                "file '{name}' is empty"
            ))),
            None => Err(GatewayError::InvalidRequest(format!(
                "missing file '{name}'"
            ))),
        }
    }

    /// A text part, trimmed. Blank values count as absent.
    pub fn text(&self, name: &str) -> Result<Option<String>, GatewayError> {
        let Some(bytes) = self.parts.get(name) else {
            return Ok(None);
        };
        let value = std::str::from_utf8(bytes).map_err(|_| {
            GatewayError::InvalidRequest(format!("field '{name}' is not valid UTF-8"))
        })?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    pub fn hint(&self, name: &str) -> Result<DomainHint, GatewayError> {
        match self.text(name)? {
            Some(value) => value
                .parse()
                .map_err(|e| GatewayError::InvalidRequest(format!("{name}: {e}"))),
            None => Ok(DomainHint::Auto),
        }
    }

    /// Absent means `true`; only `true`/`1` enable the cache once the field is sent.
    pub fn flag(&self, name: &str) -> Result<bool, GatewayError> {
        Ok(match self.text(name)? {
            Some(value) => matches!(value.to_ascii_lowercase().as_str(), "true" | "1"),
            None => true,
        })
    }

    pub fn number<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, GatewayError> {
        self.text(name)?
            .map(|value| {
                value.parse().map_err(|_| {
                    GatewayError::InvalidRequest(format!("field '{name}' is not a valid number"))
                })
            })
            .transpose()
    }
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub result: ComparisonResult,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub search_id: String,
    pub probe_domain: ImageDomain,
    pub matches: Vec<RankedMatch>,
    pub total_matches: usize,
    pub searched_records: usize,
    pub failed_records: usize,
    /// Minimum similarity applied, if any.
    pub threshold_used: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub cleared: ClearedCounts,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

#[instrument]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[instrument(skip(state, multipart))]
pub async fn compare_handler<P>(
    State(state): State<HandlerState<P>>,
    multipart: Multipart,
) -> Result<Response, GatewayError>
where
    P: EmbeddingProvider + 'static,
{
    let mut form = UploadForm::read(multipart).await?;
    let sketch = ImageInput::new(form.take_file(FIELD_SKETCH)?)
        .with_hint(form.hint(FIELD_SKETCH_DOMAIN)?);
    let photo = ImageInput::new(form.take_file(FIELD_PHOTO)?)
        .with_hint(form.hint(FIELD_PHOTO_DOMAIN)?);
    let use_cache = form.flag(FIELD_USE_CACHE)?;

    let result = state.pipeline.compare_with(&sketch, &photo, use_cache).await;
    let cache_status = CacheStatus::from_hit(result.from_cache);

    info!(
        similarity = result.similarity,
        confidence = %result.confidence_level,
        cache = %cache_status,
        "Comparison served"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(cache_status.as_header_value()),
    );

    let success = !result.is_failure();
    Ok((
        StatusCode::OK,
        headers,
        Json(CompareResponse { result, success }),
    )
        .into_response())
}

#[instrument(skip(state, multipart))]
pub async fn search_handler<P>(
    State(state): State<HandlerState<P>>,
    multipart: Multipart,
) -> Result<Json<SearchResponse>, GatewayError>
where
    P: EmbeddingProvider + 'static,
{
    let mut form = UploadForm::read(multipart).await?;
    let probe = ImageInput::new(form.take_file(FIELD_SKETCH)?)
        .with_hint(form.hint(FIELD_SKETCH_DOMAIN)?);
    let options = search_options(&form, state.search_defaults)?;

    let search_id = Uuid::new_v4().to_string();
    debug!(search_id = %search_id, top_k = options.top_k, "Search started");

    let outcome = state
        .ranker
        .search(&probe, state.corpus.as_ref(), &options)
        .await?;

    Ok(Json(SearchResponse {
        search_id,
        probe_domain: outcome.probe_domain,
        total_matches: outcome.total_matches(),
        searched_records: outcome.searched_records,
        failed_records: outcome.failed_records,
        threshold_used: options.min_similarity,
        matches: outcome.matches,
    }))
}

/// Request fields over the configured defaults.
pub fn search_options(
    form: &UploadForm,
    defaults: SearchOptions,
) -> Result<SearchOptions, GatewayError> {
    let mut options = defaults;

    if let Some(top_k) = form.number::<usize>(FIELD_TOP_K)? {
        if top_k == 0 {
            return Err(GatewayError::InvalidRequest(
                "top_k must be positive".to_string(),
            ));
        }
        options = options.top_k(top_k);
    }

    if let Some(threshold) = form.number::<f64>(FIELD_THRESHOLD)? {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(GatewayError::InvalidRequest(
                "threshold must be within [0, 1]".to_string(),
            ));
        }
        options = options.threshold(threshold);
    }

    Ok(options)
}

#[instrument(skip(state))]
pub async fn cache_clear_handler<P>(State(state): State<HandlerState<P>>) -> Json<ClearResponse>
where
    P: EmbeddingProvider + 'static,
{
    Json(ClearResponse {
        message: "Caches cleared successfully",
        cleared: state.pipeline.caches().clear(),
    })
}

#[instrument(skip(state))]
pub async fn cache_stats_handler<P>(State(state): State<HandlerState<P>>) -> Json<StatsResponse>
where
    P: EmbeddingProvider + 'static,
{
    Json(StatsResponse {
        stats: state.pipeline.caches().stats(),
        model: state.pipeline.provider().model_name().to_string(),
    })
}
