use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::constants::GEOCODER_USER_AGENT;
use crate::geo::Coordinates;

/// Outcome of a lookup. Failures are folded into `Unresolved`; callers never
/// see a geocoding error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geocoded {
    Resolved(Coordinates),
    Unresolved,
}

impl Geocoded {
    pub fn coordinates(self) -> Option<Coordinates> {
        match self {
            Geocoded::Resolved(c) => Some(c),
            Geocoded::Unresolved => None,
        }
    }
}

/// Process-lifetime memo of successful lookups, keyed by the exact
/// normalized location string. Entries are never evicted; misses are not
/// remembered.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: Mutex<HashMap<String, Coordinates>>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, location: &str) -> Option<Coordinates> {
        self.entries.lock().await.get(location).copied()
    }

    pub async fn insert(&self, location: &str, coords: Coordinates) {
        self.entries.lock().await.insert(location.to_string(), coords);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

pub struct Geocoder {
    client: Client,
    search_url: String,
    cache: Arc<GeocodeCache>,
}

impl Geocoder {
    pub fn new(client: Client, search_url: impl Into<String>, cache: Arc<GeocodeCache>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            cache,
        }
    }

    pub async fn lookup(&self, location: &str) -> Geocoded {
        if location.is_empty() {
            return Geocoded::Unresolved;
        }
        if let Some(coords) = self.cache.get(location).await {
            return Geocoded::Resolved(coords);
        }

        // The cache lock is not held across the request; two concurrent misses
        // for one key both query and both insert the same value.
        match self.search(location).await {
            Ok(Some(coords)) => {
                self.cache.insert(location, coords).await;
                Geocoded::Resolved(coords)
            }
            Ok(None) => {
                tracing::debug!(location, "Geocoder returned no candidates");
                Geocoded::Unresolved
            }
            Err(e) => {
                tracing::warn!(location, "Geocoding failed: {e:#}");
                Geocoded::Unresolved
            }
        }
    }

    async fn search(&self, location: &str) -> anyhow::Result<Option<Coordinates>> {
        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.search_url)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .header(USER_AGENT, GEOCODER_USER_AGENT)
            .send()
            .await
            .with_context(|| format!("GET {}", self.search_url))?
            .error_for_status()
            .context("geocoder returned an error status")?
            .json()
            .await
            .context("decode geocoder response")?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        let latitude: f64 = place.lat.trim().parse().context("parse lat")?;
        let longitude: f64 = place.lon.trim().parse().context("parse lon")?;
        Ok(Some(Coordinates::new(latitude, longitude)))
    }
}
