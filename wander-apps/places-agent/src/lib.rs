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

// Library for wander-places-agent
// MCP tools for places (Foursquare), geocoding (Nominatim) and activities (Amadeus)

mod activities;
mod amadeus;
mod config;
mod error;
pub mod format;
mod foursquare;
mod nominatim;
mod tools;
mod upstream;

#[cfg(feature = "mcp")]
mod http_server;
#[cfg(feature = "mcp")]
mod mcp_server;

pub use activities::{
    Activity, ActivityFinder, ActivityQuery, DESCRIPTION_MAX_CHARS, Price, filter_activities,
    html_to_text,
};
pub use amadeus::{AmadeusClient, RawActivity, RawPrice};
pub use config::ApiConfig;
#[cfg(any(feature = "cli", feature = "mcp"))]
pub use config::ApiArgs;
pub use error::{Result, ToolError};
pub use foursquare::{
    FoursquareClient, Photo, Place, PlaceDetails, PlaceSearch, clamp_limit,
};
pub use nominatim::{BoundingBox, NominatimClient};
pub use tools::{
    CityActivitiesInput, PlaceDetailsInput, PlacePhotosInput, SearchActivitiesInput,
    SearchPlacesInput, ToolCall, ToolName, Toolbox,
};

// Re-export the clock types so callers can drive token expiry
pub use wander_token_cache::{Clock, ManualClock, SystemClock};

#[cfg(feature = "mcp")]
pub use http_server::{AppState, router};
#[cfg(feature = "mcp")]
pub use mcp_server::PlacesAgentServer;
