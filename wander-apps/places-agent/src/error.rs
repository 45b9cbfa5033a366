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

//! # Tool Errors
//!
//! Every failure a tool pipeline can produce. Transports render these as
//! `Error: <message>` text (stdio) or a JSON-RPC / REST error body (HTTP).

use thiserror::Error;

pub type Result<T, E = ToolError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ToolError {
    /// A required tool argument is missing or unusable
    #[error("{0}")]
    Validation(String),

    /// Non-success status from Foursquare, Nominatim or the Amadeus data API
    #[error("{service} HTTP {status}: {body}")]
    UpstreamHttp {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The Amadeus client-credentials exchange was refused
    #[error("Amadeus OAuth failed: {status} {body}")]
    UpstreamAuth { status: u16, body: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("{0} is not configured")]
    MissingCredentials(&'static str),

    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: wreq::Error,
    },

    #[error("unexpected response from {service}: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn transport(service: &'static str) -> impl FnOnce(wreq::Error) -> Self {
        move |source| Self::Transport { service, source }
    }

    pub(crate) fn decode(service: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |e| Self::Decode {
            service,
            message: e.to_string(),
        }
    }

    /// True for errors raised before any network call was attempted
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UnknownTool(_)
                | Self::UnknownMethod(_)
                | Self::MissingCredentials(_)
        )
    }
}
