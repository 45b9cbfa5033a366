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

//! # Upstream API Configuration
//!
//! Credentials and endpoints for Foursquare, Amadeus and Nominatim.
//! Binaries fill this from flags or environment variables through [`ApiArgs`].

use std::fmt;
use std::time::Duration;

pub const FOURSQUARE_BASE_URL: &str = "https://places-api.foursquare.com/places";
pub const FOURSQUARE_API_VERSION: &str = "2025-06-17";
pub const AMADEUS_BASE_URL: &str = "https://test.api.amadeus.com";
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const NOMINATIM_USER_AGENT: &str = "mcp-server/1.0 (contact: admin@example.com)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct ApiConfig {
    pub foursquare_api_key: Option<String>,
    pub foursquare_api_version: String,
    pub foursquare_base_url: String,
    pub amadeus_api_key: Option<String>,
    pub amadeus_api_secret: Option<String>,
    pub amadeus_base_url: String,
    pub nominatim_base_url: String,
    pub nominatim_user_agent: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            foursquare_api_key: None,
            foursquare_api_version: FOURSQUARE_API_VERSION.to_string(),
            foursquare_base_url: FOURSQUARE_BASE_URL.to_string(),
            amadeus_api_key: None,
            amadeus_api_secret: None,
            amadeus_base_url: AMADEUS_BASE_URL.to_string(),
            nominatim_base_url: NOMINATIM_BASE_URL.to_string(),
            nominatim_user_agent: NOMINATIM_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn redact(secret: &Option<String>) -> &'static str {
    match secret {
        Some(_) => "<set>",
        None => "<unset>",
    }
}

// Keys never reach the logs
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("foursquare_api_key", &redact(&self.foursquare_api_key))
            .field("foursquare_api_version", &self.foursquare_api_version)
            .field("foursquare_base_url", &self.foursquare_base_url)
            .field("amadeus_api_key", &redact(&self.amadeus_api_key))
            .field("amadeus_api_secret", &redact(&self.amadeus_api_secret))
            .field("amadeus_base_url", &self.amadeus_base_url)
            .field("nominatim_base_url", &self.nominatim_base_url)
            .field("nominatim_user_agent", &self.nominatim_user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Flags shared by every binary; each one falls back to an environment variable
#[cfg(any(feature = "cli", feature = "mcp"))]
#[derive(clap::Args, Clone)]
pub struct ApiArgs {
    #[arg(long, env = "FOURSQUARE_API_KEY", hide_env_values = true)]
    pub foursquare_api_key: Option<String>,

    #[arg(long, env = "FOURSQUARE_API_VERSION", default_value = FOURSQUARE_API_VERSION)]
    pub foursquare_api_version: String,

    #[arg(long, env = "FOURSQUARE_BASE_URL", default_value = FOURSQUARE_BASE_URL, hide = true)]
    pub foursquare_base_url: String,

    #[arg(long, env = "AMADEUS_API_KEY", hide_env_values = true)]
    pub amadeus_api_key: Option<String>,

    #[arg(long, env = "AMADEUS_API_SECRET", hide_env_values = true)]
    pub amadeus_api_secret: Option<String>,

    #[arg(long, env = "AMADEUS_BASE_URL", default_value = AMADEUS_BASE_URL, hide = true)]
    pub amadeus_base_url: String,

    #[arg(long, env = "NOMINATIM_BASE_URL", default_value = NOMINATIM_BASE_URL, hide = true)]
    pub nominatim_base_url: String,

    /// Contact string sent to Nominatim, as its usage policy requires
    #[arg(long, env = "NOMINATIM_USER_AGENT", default_value = NOMINATIM_USER_AGENT)]
    pub nominatim_user_agent: String,

    /// Per-request timeout for upstream calls, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[cfg(any(feature = "cli", feature = "mcp"))]
impl fmt::Debug for ApiArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&ApiConfig::from(self.clone()), f)
    }
}

#[cfg(any(feature = "cli", feature = "mcp"))]
impl From<ApiArgs> for ApiConfig {
    fn from(args: ApiArgs) -> Self {
        Self {
            foursquare_api_key: non_empty(args.foursquare_api_key),
            foursquare_api_version: args.foursquare_api_version,
            foursquare_base_url: args.foursquare_base_url,
            amadeus_api_key: non_empty(args.amadeus_api_key),
            amadeus_api_secret: non_empty(args.amadeus_api_secret),
            amadeus_base_url: args.amadeus_base_url,
            nominatim_base_url: args.nominatim_base_url,
            nominatim_user_agent: args.nominatim_user_agent,
            timeout: Duration::from_secs(args.timeout_secs.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_credentials() {
        let config = ApiConfig {
            foursquare_api_key: Some("fsq-secret".into()),
            amadeus_api_secret: Some("amadeus-secret".into()),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("fsq-secret"));
        assert!(!printed.contains("amadeus-secret"));
        assert!(printed.contains("<set>"));
        assert!(printed.contains("<unset>"));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("k".into())), Some("k".into()));
    }
}
