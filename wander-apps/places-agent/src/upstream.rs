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

//! Plumbing shared by the upstream API clients.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

use crate::error::ToolError;

pub(crate) fn build_http_client(timeout: Duration) -> Result<wreq::Client> {
    wreq::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// `k1=v1&k2=v2`, percent-encoded, skipping empty values
pub(crate) fn encode_pairs(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn with_query(url: &str, pairs: &[(&str, String)]) -> String {
    let query = encode_pairs(pairs);
    if query.is_empty() {
        url.to_string()
    } else {
        format!("{}?{}", url, query)
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Reads the body and turns a non-success status into [`ToolError::UpstreamHttp`]
pub(crate) async fn read_body(
    service: &'static str,
    response: wreq::Response,
) -> Result<String, ToolError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(ToolError::transport(service))?;

    tracing::debug!(
        "[{}] HTTP {} {}, {} bytes",
        service,
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
        body.len()
    );

    if !status.is_success() {
        tracing::warn!("[{}] Error {}: {}", service, status.as_u16(), body);
        return Err(ToolError::UpstreamHttp {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Treats an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
