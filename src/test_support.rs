//! In-process stand-ins for the NBTS page and the Nominatim search API.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::constants::GEOCODER_USER_AGENT;

pub const PAGE_PATH: &str = "/mobile/";

pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[derive(Clone)]
pub struct FakeNominatim {
    places: Arc<HashMap<String, (f64, f64)>>,
    failing: Arc<HashSet<String>>,
    hits: Arc<AtomicUsize>,
}

impl FakeNominatim {
    pub fn new(places: &[(&str, f64, f64)]) -> Self {
        Self {
            places: Arc::new(
                places
                    .iter()
                    .map(|(q, lat, lon)| (q.to_string(), (*lat, *lon)))
                    .collect(),
            ),
            failing: Arc::new(HashSet::new()),
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_on(self, q: &str) -> Self {
        let mut failing = (*self.failing).clone();
        failing.insert(q.to_string());
        Self {
            failing: Arc::new(failing),
            ..self
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/search", get(search))
            .with_state(self.clone())
    }
}

async fn search(
    State(fake): State<FakeNominatim>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.hits.fetch_add(1, Ordering::SeqCst);

    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if agent != GEOCODER_USER_AGENT {
        return StatusCode::FORBIDDEN.into_response();
    }
    if params.get("limit").map(String::as_str) != Some("1") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let q = params.get("q").cloned().unwrap_or_default();
    if fake.failing.contains(&q) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    let body = match fake.places.get(&q) {
        Some((lat, lon)) => json!([{
            "lat": lat.to_string(),
            "lon": lon.to_string(),
            "display_name": q,
        }]),
        None => json!([]),
    };
    Json(body).into_response()
}

/// Serves `html` at [`PAGE_PATH`] to browser-like clients only.
pub fn nbts_page(html: &'static str) -> Router {
    Router::new().route(
        PAGE_PATH,
        get(move |headers: HeaderMap| async move {
            let browser = headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ua| ua.starts_with("Mozilla/"));
            if browser {
                Html(html).into_response()
            } else {
                StatusCode::FORBIDDEN.into_response()
            }
        }),
    )
}

pub fn broken_nbts_page() -> Router {
    Router::new().route(
        PAGE_PATH,
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    )
}
