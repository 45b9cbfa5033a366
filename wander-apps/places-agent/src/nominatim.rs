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

//! # Nominatim Geocoding Client
//!
//! Resolves a place name to the bounding box of its best match.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::ToolError;
use crate::upstream::{build_http_client, join_url, read_body, with_query};

const SERVICE: &str = "Nominatim";

/// Geographic rectangle in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Degrees {
    Text(String),
    Number(f64),
}

impl Degrees {
    fn value(&self) -> Option<f64> {
        match self {
            Degrees::Text(s) => s.trim().parse().ok(),
            Degrees::Number(n) => Some(*n),
        }
    }
}

impl BoundingBox {
    /// Nominatim orders the edges `[south, north, west, east]`
    fn from_nominatim(raw: &[Degrees]) -> Result<Self, ToolError> {
        let edges: Option<Vec<f64>> = raw.iter().map(Degrees::value).collect();
        match edges.as_deref() {
            Some(&[south, north, west, east]) => Ok(Self {
                north,
                south,
                east,
                west,
            }),
            _ => Err(ToolError::Decode {
                service: SERVICE,
                message: format!("malformed boundingbox: {:?}", raw),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    boundingbox: Option<Vec<Degrees>>,
}

#[derive(Clone)]
pub struct NominatimClient {
    client: Arc<wreq::Client>,
    base_url: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = build_http_client(config.timeout)?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.nominatim_base_url.clone(),
            user_agent: config.nominatim_user_agent.clone(),
        })
    }

    /// Bounding box of the first match for `city`
    pub async fn resolve_bounding_box(&self, city: &str) -> Result<BoundingBox, ToolError> {
        tracing::info!("[{}] Getting coordinates for: {}", SERVICE, city);
        let url = with_query(
            &join_url(&self.base_url, "/search"),
            &[
                ("q", city.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("limit", "1".to_string()),
            ],
        );

        let response = self
            .client
            .get(&url)
            .header("User-Agent", self.user_agent.as_str())
            .send()
            .await
            .map_err(ToolError::transport(SERVICE))?;

        let body = read_body(SERVICE, response).await?;
        let results: Option<Vec<GeocodeResult>> =
            serde_json::from_str(&body).map_err(ToolError::decode(SERVICE))?;

        let Some(first) = results.unwrap_or_default().into_iter().next() else {
            return Err(ToolError::NotFound(format!("No location found for: {}", city)));
        };
        let raw = first.boundingbox.unwrap_or_default();
        let bbox = BoundingBox::from_nominatim(&raw)?;

        tracing::info!(
            "[{}] {} -> N:{}, W:{}, S:{}, E:{}",
            SERVICE,
            first.display_name.as_deref().unwrap_or(city),
            bbox.north,
            bbox.west,
            bbox.south,
            bbox.east
        );
        Ok(bbox)
    }
}
