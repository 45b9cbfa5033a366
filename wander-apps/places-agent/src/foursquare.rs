//!  Wander Places Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Foursquare Places Client
//!
//! Effectful (network) operations against the Foursquare Places API:
//! place search, place details and place photos.

use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::ToolError;
use crate::upstream::{build_http_client, join_url, null_as_default, read_body, with_query};

const SERVICE: &str = "Foursquare";

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 50;
pub const DEFAULT_LIMIT: i64 = 10;

/// Clamp a requested result count into `[1, 50]`
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(MIN_LIMIT, MAX_LIMIT)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
}

/// A place as returned by search; every provider field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub fsq_place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: Location,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Meters from the search origin
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
}

impl Place {
    /// Formatted address, falling back to the country
    pub fn address(&self) -> Option<&str> {
        self.location
            .formatted_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.location.country.as_deref().filter(|s| !s.is_empty()))
    }

    /// Comma-separated category names, `None` when there are none
    pub fn category_names(&self) -> Option<String> {
        let names: Vec<&str> = self
            .categories
            .iter()
            .filter_map(|c| c.name.as_deref())
            .collect();
        (!names.is_empty()).then(|| names.join(", "))
    }
}

/// Everything the place endpoint can tell about one place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(flatten)]
    pub place: Place,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    /// Price tier, 1 (cheap) to 4 (very expensive)
    #[serde(default)]
    pub price: Option<u8>,
    #[serde(default)]
    pub hours: Option<Value>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub social_media: Option<Value>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: Option<String>,
    pub prefix: String,
    pub suffix: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
}

impl Photo {
    /// Full-resolution URL
    pub fn url(&self) -> String {
        format!("{}original{}", self.prefix, self.suffix)
    }
}

/// Parameters of a place search
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSearch {
    pub near: String,
    pub query: String,
    pub limit: i64,
    pub categories: Option<String>,
}

impl PlaceSearch {
    pub fn new(near: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            near: near.into(),
            query: query.into(),
            limit: DEFAULT_LIMIT,
            categories: None,
        }
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn categories(mut self, categories: impl Into<String>) -> Self {
        let categories = categories.into();
        self.categories = (!categories.trim().is_empty()).then_some(categories);
        self
    }

    pub fn effective_limit(&self) -> i64 {
        clamp_limit(self.limit)
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("near", self.near.clone()),
            ("query", self.query.clone()),
            ("limit", self.effective_limit().to_string()),
        ];
        if let Some(categories) = &self.categories {
            pairs.push(("categories", categories.clone()));
        }
        pairs
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<Place>,
}

fn require_place_id(fsq_place_id: Option<&str>) -> Result<&str, ToolError> {
    fsq_place_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ToolError::validation("fsq_place_id is required"))
}

#[derive(Clone)]
pub struct FoursquareClient {
    client: Arc<wreq::Client>,
    base_url: String,
    api_key: Option<String>,
    api_version: String,
}

impl FoursquareClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = build_http_client(config.timeout)?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.foursquare_base_url.clone(),
            api_key: config.foursquare_api_key.clone(),
            api_version: config.foursquare_api_version.clone(),
        })
    }
}

impl FoursquareClient {
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        pairs: &[(&str, String)],
    ) -> Result<T, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredentials("FOURSQUARE_API_KEY"))?;
        let url = with_query(&join_url(&self.base_url, endpoint), pairs);

        tracing::info!("[{}] GET {}", SERVICE, url);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("X-Places-Api-Version", self.api_version.as_str())
            .send()
            .await
            .map_err(ToolError::transport(SERVICE))?;

        let body = read_body(SERVICE, response).await?;
        serde_json::from_str(&body).map_err(ToolError::decode(SERVICE))
    }

    pub async fn search_places(&self, search: &PlaceSearch) -> Result<Vec<Place>, ToolError> {
        tracing::debug!("Place search: {:?}", search);
        let response: SearchResponse = self.get_json("/search", &search.query_pairs()).await?;
        tracing::info!(
            "[{}] /search - Found {} results near \"{}\"",
            SERVICE,
            response.results.len(),
            search.near
        );
        Ok(response.results)
    }

    /// Fails with a validation error, before any request, when the id is missing
    pub async fn place_details(&self, fsq_place_id: Option<&str>) -> Result<PlaceDetails, ToolError> {
        let id = require_place_id(fsq_place_id)?;
        let endpoint = format!("/{}", urlencoding::encode(id));
        self.get_json(&endpoint, &[]).await
    }

    pub async fn place_photos(
        &self,
        fsq_place_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Photo>, ToolError> {
        let id = require_place_id(fsq_place_id)?;
        let endpoint = format!("/{}/photos", urlencoding::encode(id));
        let photos: Option<Vec<Photo>> = self
            .get_json(&endpoint, &[("limit", clamp_limit(limit).to_string())])
            .await?;
        let photos = photos.unwrap_or_default();
        tracing::info!("[{}] Found {} photos for {}", SERVICE, photos.len(), id);
        Ok(photos)
    }
}
