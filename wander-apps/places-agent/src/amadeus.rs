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

//! # Amadeus Client
//!
//! OAuth client-credentials exchange (with a cached token) and the
//! square-region activities endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use wander_token_cache::{Clock, IssuedToken, SystemClock, TokenCache};

use crate::config::ApiConfig;
use crate::error::ToolError;
use crate::nominatim::BoundingBox;
use crate::upstream::{build_http_client, encode_pairs, join_url, null_as_default, read_body, with_query};

const SERVICE: &str = "Amadeus";
const ACTIVITIES_SERVICE: &str = "Amadeus activities API";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCode {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub category: Option<CategoryCode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfLink {
    #[serde(default)]
    pub href: Option<String>,
}

// Amadeus sends amounts as decimal strings, but tolerate plain numbers too
fn amount_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrice {
    #[serde(default, deserialize_with = "amount_as_text")]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// One item of the activities endpoint, as sent by Amadeus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub booking_link: Option<String>,
    #[serde(default, rename = "self")]
    pub self_link: Option<SelfLink>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pictures: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classifications: Vec<Classification>,
}

#[derive(Deserialize)]
struct ActivitiesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<RawActivity>,
}

#[derive(Clone)]
pub struct AmadeusClient {
    client: Arc<wreq::Client>,
    base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
    tokens: TokenCache,
}

impl AmadeusClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Token expiry is measured on `clock`
    pub fn with_clock(config: &ApiConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = build_http_client(config.timeout)?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.amadeus_base_url.clone(),
            api_key: config.amadeus_api_key.clone(),
            api_secret: config.amadeus_api_secret.clone(),
            tokens: TokenCache::with_clock(clock),
        })
    }
}

impl AmadeusClient {
    /// Cached access token, refreshed through the OAuth endpoint when absent or expired
    pub async fn access_token(&self) -> Result<String, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredentials("AMADEUS_API_KEY"))?;
        let api_secret = self
            .api_secret
            .as_deref()
            .ok_or(ToolError::MissingCredentials("AMADEUS_API_SECRET"))?;

        self.tokens
            .get_or_refresh(|| self.request_token(api_key, api_secret))
            .await
    }

    async fn request_token(&self, api_key: &str, api_secret: &str) -> Result<IssuedToken, ToolError> {
        tracing::info!("[{}] Getting new access token...", SERVICE);
        let url = join_url(&self.base_url, "/v1/security/oauth2/token");
        let form = encode_pairs(&[
            ("grant_type", "client_credentials".to_string()),
            ("client_id", api_key.to_string()),
            ("client_secret", api_secret.to_string()),
        ]);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(ToolError::transport(SERVICE))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ToolError::transport(SERVICE))?;
        if !status.is_success() {
            tracing::error!("[{}] OAuth failed: {} {}", SERVICE, status.as_u16(), body);
            return Err(ToolError::UpstreamAuth {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(ToolError::decode(SERVICE))?;
        tracing::info!(
            "[{}] Access token obtained, expires in {}s",
            SERVICE,
            token.expires_in
        );
        Ok(IssuedToken {
            access_token: token.access_token,
            expires_in: Duration::from_secs(token.expires_in),
        })
    }

    /// Activities inside `bbox`, in provider order
    pub async fn activities_by_square(
        &self,
        access_token: &str,
        bbox: &BoundingBox,
    ) -> Result<Vec<RawActivity>, ToolError> {
        let url = with_query(
            &join_url(&self.base_url, "/v1/shopping/activities/by-square"),
            &[
                ("north", bbox.north.to_string()),
                ("west", bbox.west.to_string()),
                ("south", bbox.south.to_string()),
                ("east", bbox.east.to_string()),
            ],
        );

        tracing::info!("[{}] GET {}", SERVICE, url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(ToolError::transport(ACTIVITIES_SERVICE))?;

        let body = read_body(ACTIVITIES_SERVICE, response).await?;
        let parsed: ActivitiesResponse =
            serde_json::from_str(&body).map_err(ToolError::decode(ACTIVITIES_SERVICE))?;
        tracing::debug!("[{}] {} activities in square", SERVICE, parsed.data.len());
        Ok(parsed.data)
    }
}
