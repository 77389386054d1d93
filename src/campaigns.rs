use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::Context;
use reqwest::Client;
use serde::Serialize;

use crate::constants::{NBTS_URL, NOMINATIM_SEARCH_URL, SOURCE_TAG};
use crate::geo::{Coordinates, haversine_km, round2};
use crate::geocode::{GeocodeCache, Geocoded, Geocoder};
use crate::location::normalize_location;
use crate::nbts::{self, CampaignRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    pub id: String,
    pub source: &'static str,
    pub date: String,
    pub title: String,
    pub venue: String,
    pub blood_bank: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl CampaignRecord {
    fn from_row(row: CampaignRow, city: String, geocoded: Geocoded, source_url: &str) -> Self {
        let coords = geocoded.coordinates();
        Self {
            id: format!("nbts_{}_{}", row.index, row.date.replace('-', "")),
            source: SOURCE_TAG,
            date: row.date,
            title: row.title,
            venue: row.venue,
            blood_bank: row.blood_bank,
            city,
            latitude: coords.map(|c| c.latitude),
            longitude: coords.map(|c| c.longitude),
            source_url: source_url.to_string(),
            distance_km: None,
        }
    }

    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Serialize)]
pub struct CampaignsResponse {
    pub source: &'static str,
    pub total: usize,
    pub campaigns: Vec<CampaignRecord>,
}

#[derive(Debug, Clone, Copy)]
pub struct Proximity {
    pub origin: Coordinates,
    pub radius_km: f64,
}

/// Where the listing page and the geocoder live.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub page_url: String,
    pub geocoder_url: String,
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            page_url: NBTS_URL.to_string(),
            geocoder_url: NOMINATIM_SEARCH_URL.to_string(),
        }
    }
}

pub struct CampaignAggregator {
    client: Client,
    page_url: String,
    geocoder: Geocoder,
}

impl CampaignAggregator {
    pub fn new(client: Client, upstream: Upstream, cache: Arc<GeocodeCache>) -> Self {
        let geocoder = Geocoder::new(client.clone(), upstream.geocoder_url, cache);
        Self {
            client,
            page_url: upstream.page_url,
            geocoder,
        }
    }

    /// Fetch, parse and geocode the listing. Only the page fetch/parse can
    /// fail; unresolved locations surface as null coordinates.
    pub async fn list(&self, proximity: Option<Proximity>) -> anyhow::Result<CampaignsResponse> {
        let html = nbts::fetch_page(&self.client, &self.page_url).await?;
        let rows = nbts::parse_rows(&html).context("parse campaign table")?;

        // Sequential on purpose: Nominatim allows one request per second per client.
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let city = normalize_location(&row.blood_bank);
            let geocoded = self.geocoder.lookup(&city).await;
            records.push(CampaignRecord::from_row(row, city, geocoded, &self.page_url));
        }

        let built = records.len();
        let campaigns = match proximity {
            Some(p) => filter_by_proximity(records, p),
            None => records,
        };
        tracing::info!(built, returned = campaigns.len(), "Served NBTS campaigns");

        Ok(CampaignsResponse {
            source: SOURCE_TAG,
            total: campaigns.len(),
            campaigns,
        })
    }
}

/// Attach `distanceKm` (2 decimals), drop records without coordinates or
/// beyond the radius, and order nearest first. Ties keep row order.
pub fn filter_by_proximity(records: Vec<CampaignRecord>, p: Proximity) -> Vec<CampaignRecord> {
    let mut out: Vec<CampaignRecord> = records
        .into_iter()
        .filter_map(|mut r| {
            let coords = r.coordinates()?;
            let d = round2(haversine_km(p.origin, coords));
            r.distance_km = Some(d);
            (d <= p.radius_km).then_some(r)
        })
        .collect();
    out.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    out
}
