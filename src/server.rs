use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use serde::{Deserialize, Deserializer, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::campaigns::{CampaignAggregator, CampaignsResponse, Proximity, Upstream};
use crate::cli::Args;
use crate::constants::DEFAULT_RADIUS_KM;
use crate::geo::Coordinates;
use crate::geocode::GeocodeCache;

#[derive(Clone)]
struct AppState {
    campaigns: Arc<CampaignAggregator>,
}

pub async fn run(opts: Args) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .build()
        .context("build HTTP client")?;
    // One cache for the life of the process, shared by every request.
    let cache = Arc::new(GeocodeCache::new());
    let aggregator = CampaignAggregator::new(client, Upstream::default(), cache);

    let app = router(aggregator);

    let addr = SocketAddr::from(([0, 0, 0, 0], opts.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!("NBTS API running on port {}", opts.port);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(aggregator: CampaignAggregator) -> Router {
    let state = AppState {
        campaigns: Arc::new(aggregator),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/nbts-campaigns", get(api_nbts_campaigns))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CampaignParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    lng: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    radius: Option<f64>,
}

/// `?lat=` counts as absent; anything else must parse as a number.
fn blank_as_none<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl CampaignParams {
    /// Filtering needs both coordinates; a lone `lat` or `lng` is ignored.
    fn proximity(&self) -> Option<Proximity> {
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            return None;
        };
        Some(Proximity {
            origin: Coordinates::new(lat, lng),
            radius_km: self.radius.unwrap_or(DEFAULT_RADIUS_KM),
        })
    }
}

async fn api_nbts_campaigns(
    State(st): State<AppState>,
    Query(p): Query<CampaignParams>,
) -> Result<PrettyJson<CampaignsResponse>, CampaignsError> {
    let resp = st
        .campaigns
        .list(p.proximity())
        .await
        .map_err(CampaignsError)?;
    Ok(PrettyJson(resp))
}

/// JSON body with two-space indentation.
struct PrettyJson<T>(T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_string_pretty(&self.0) {
            Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
}

/// Upstream fetch or parse failure; the whole request fails with 500.
struct CampaignsError(anyhow::Error);

impl IntoResponse for CampaignsError {
    fn into_response(self) -> Response {
        let details = format!("{:#}", self.0);
        tracing::error!("Failed to parse NBTS campaigns: {details}");
        let body = ErrorBody {
            error: "Failed to parse NBTS campaigns",
            details,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, PrettyJson(body)).into_response()
    }
}
