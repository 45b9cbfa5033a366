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

//! # Tool Dispatcher
//!
//! The fixed set of tools, their inputs, and the pipeline behind each one.
//! Both transports go through [`Toolbox::call`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use wander_token_cache::{Clock, SystemClock};

use crate::activities::{Activity, ActivityFinder, ActivityQuery};
use crate::amadeus::AmadeusClient;
use crate::config::ApiConfig;
use crate::error::ToolError;
use crate::format;
use crate::foursquare::{FoursquareClient, Photo, Place, PlaceDetails, PlaceSearch};
use crate::nominatim::NominatimClient;

fn default_near() -> String {
    "Antalya".to_string()
}

fn default_query() -> String {
    "restaurant".to_string()
}

fn default_city() -> String {
    "Istanbul".to_string()
}

fn default_activity_type() -> String {
    "museum".to_string()
}

fn default_limit() -> i64 {
    10
}

fn default_city_limit() -> i64 {
    20
}

/// Read a limit written as any decimal number, dropping the fraction
pub fn parse_limit(raw: &str) -> Result<i64, ToolError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.trunc() as i64)
        .ok_or_else(|| ToolError::validation(format!("invalid limit: {}", raw)))
}

// Clients send limits as JSON numbers, integral or not
fn limit_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    match n.as_i64() {
        Some(limit) => Ok(limit),
        None => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
            .ok_or_else(|| de::Error::custom(format!("invalid limit: {}", n))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct SearchPlacesInput {
    /// Location to search near (e.g., "Antalya", "Istanbul")
    #[serde(default = "default_near")]
    pub near: String,
    /// Search query for places (e.g., "restaurant", "cafe", "bazaar")
    #[serde(default = "default_query")]
    pub query: String,
    /// Number of results to return (1-50)
    #[serde(default = "default_limit", deserialize_with = "limit_from_number")]
    #[cfg_attr(feature = "mcp", schemars(with = "f64", range(min = 1, max = 50)))]
    pub limit: i64,
    /// Category IDs to filter by (comma-separated)
    #[serde(default)]
    pub categories: String,
}

impl Default for SearchPlacesInput {
    fn default() -> Self {
        Self {
            near: default_near(),
            query: default_query(),
            limit: default_limit(),
            categories: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct PlaceDetailsInput {
    /// Foursquare place ID
    #[serde(default)]
    pub fsq_place_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct PlacePhotosInput {
    /// Foursquare place ID
    #[serde(default)]
    pub fsq_place_id: Option<String>,
    /// Number of photos to return (1-50)
    #[serde(default = "default_limit", deserialize_with = "limit_from_number")]
    #[cfg_attr(feature = "mcp", schemars(with = "f64", range(min = 1, max = 50)))]
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct SearchActivitiesInput {
    /// City name to search activities in (e.g., "Istanbul", "Paris", "New York")
    #[serde(default = "default_city")]
    pub city: String,
    /// Type of activity to search for (e.g., "museum", "restaurant", "tour", "boat", "food")
    #[serde(rename = "type", default = "default_activity_type")]
    pub activity_type: String,
    /// Maximum number of activities to return (1-50)
    #[serde(default = "default_limit", deserialize_with = "limit_from_number")]
    #[cfg_attr(feature = "mcp", schemars(with = "f64", range(min = 1, max = 50)))]
    pub limit: i64,
}

impl Default for SearchActivitiesInput {
    fn default() -> Self {
        Self {
            city: default_city(),
            activity_type: default_activity_type(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct CityActivitiesInput {
    /// City name (e.g., "Istanbul", "Antalya", "Cappadocia")
    #[cfg_attr(feature = "mcp", schemars(required))]
    pub city: Option<String>,
    /// Maximum number of activities to return
    #[serde(default = "default_city_limit", deserialize_with = "limit_from_number")]
    #[cfg_attr(feature = "mcp", schemars(with = "f64", range(min = 1, max = 50)))]
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    SearchPlaces,
    GetPlaceDetails,
    GetPlacePhotos,
    SearchActivities,
    GetCityActivities,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::SearchPlaces,
        ToolName::GetPlaceDetails,
        ToolName::GetPlacePhotos,
        ToolName::SearchActivities,
        ToolName::GetCityActivities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SearchPlaces => "search_places",
            ToolName::GetPlaceDetails => "get_place_details",
            ToolName::GetPlacePhotos => "get_place_photos",
            ToolName::SearchActivities => "search_activities",
            ToolName::GetCityActivities => "get_city_activities",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// A resolved tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    SearchPlaces(SearchPlacesInput),
    GetPlaceDetails(PlaceDetailsInput),
    GetPlacePhotos(PlacePhotosInput),
    SearchActivities(SearchActivitiesInput),
    GetCityActivities(CityActivitiesInput),
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::validation(format!("invalid arguments for {}: {}", tool, e)))
}

impl ToolCall {
    /// Resolve a tool name and its JSON arguments
    pub fn parse(name: &str, arguments: Value) -> Result<Self, ToolError> {
        let tool: ToolName = name.parse()?;
        Ok(match tool {
            ToolName::SearchPlaces => ToolCall::SearchPlaces(parse_args(tool, arguments)?),
            ToolName::GetPlaceDetails => ToolCall::GetPlaceDetails(parse_args(tool, arguments)?),
            ToolName::GetPlacePhotos => ToolCall::GetPlacePhotos(parse_args(tool, arguments)?),
            ToolName::SearchActivities => ToolCall::SearchActivities(parse_args(tool, arguments)?),
            ToolName::GetCityActivities => {
                ToolCall::GetCityActivities(parse_args(tool, arguments)?)
            }
        })
    }

    pub fn name(&self) -> ToolName {
        match self {
            ToolCall::SearchPlaces(_) => ToolName::SearchPlaces,
            ToolCall::GetPlaceDetails(_) => ToolName::GetPlaceDetails,
            ToolCall::GetPlacePhotos(_) => ToolName::GetPlacePhotos,
            ToolCall::SearchActivities(_) => ToolName::SearchActivities,
            ToolCall::GetCityActivities(_) => ToolName::GetCityActivities,
        }
    }
}

impl From<SearchPlacesInput> for PlaceSearch {
    fn from(input: SearchPlacesInput) -> Self {
        PlaceSearch::new(input.near, input.query)
            .limit(input.limit)
            .categories(input.categories)
    }
}

impl From<SearchActivitiesInput> for ActivityQuery {
    fn from(input: SearchActivitiesInput) -> Self {
        ActivityQuery::new(input.city)
            .activity_type(input.activity_type)
            .limit(input.limit)
    }
}

impl From<CityActivitiesInput> for ActivityQuery {
    fn from(input: CityActivitiesInput) -> Self {
        ActivityQuery::new(input.city.unwrap_or_default()).limit(input.limit)
    }
}

/// All upstream clients, shared by every transport
#[derive(Clone)]
pub struct Toolbox {
    places: FoursquareClient,
    activities: ActivityFinder,
}

impl Toolbox {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Same as [`Toolbox::new`], with the Amadeus token expiry measured on `clock`
    pub fn with_clock(config: &ApiConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let places = FoursquareClient::new(config)?;
        let amadeus = AmadeusClient::with_clock(config, clock)?;
        let geocoder = NominatimClient::new(config)?;
        Ok(Self {
            places,
            activities: ActivityFinder::new(amadeus, geocoder),
        })
    }

    pub async fn search_places(&self, search: &PlaceSearch) -> Result<Vec<Place>, ToolError> {
        self.places.search_places(search).await
    }

    pub async fn place_details(&self, fsq_place_id: Option<&str>) -> Result<PlaceDetails, ToolError> {
        self.places.place_details(fsq_place_id).await
    }

    pub async fn place_photos(
        &self,
        fsq_place_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Photo>, ToolError> {
        self.places.place_photos(fsq_place_id, limit).await
    }

    pub async fn search_activities(&self, query: &ActivityQuery) -> Result<Vec<Activity>, ToolError> {
        self.activities.search(query).await
    }

    /// Run a tool and render its result as text
    pub async fn call(&self, call: ToolCall) -> Result<String, ToolError> {
        let tool = call.name();
        tracing::debug!("Calling tool {}: {:?}", tool, call);

        match call {
            ToolCall::SearchPlaces(input) => {
                let search = PlaceSearch::from(input);
                let places = self.search_places(&search).await?;
                Ok(format::render_places(&search.near, &search.query, &places))
            }
            ToolCall::GetPlaceDetails(input) => {
                let details = self.place_details(input.fsq_place_id.as_deref()).await?;
                Ok(format::render_place_details(&details))
            }
            ToolCall::GetPlacePhotos(input) => {
                let photos = self
                    .place_photos(input.fsq_place_id.as_deref(), input.limit)
                    .await?;
                Ok(format::render_photos(&photos))
            }
            ToolCall::SearchActivities(input) => self.render_activities(input.into()).await,
            ToolCall::GetCityActivities(input) => self.render_activities(input.into()).await,
        }
    }

    async fn render_activities(&self, query: ActivityQuery) -> Result<String, ToolError> {
        let activities = self.search_activities(&query).await?;
        Ok(format::render_activities(
            query.city.trim(),
            &query.activity_type,
            &activities,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_tool_name_round_trips() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = ToolCall::parse("book_flight", json!({})).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "book_flight"));
    }

    #[test]
    fn search_places_defaults() {
        let call = ToolCall::parse("search_places", Value::Null).unwrap();
        assert_eq!(call, ToolCall::SearchPlaces(SearchPlacesInput::default()));
    }

    #[test]
    fn activity_type_is_read_from_type_key() {
        let call = ToolCall::parse(
            "search_activities",
            json!({"city": "Paris", "type": "tour", "limit": 3}),
        )
        .unwrap();
        let ToolCall::SearchActivities(input) = call else {
            panic!("wrong variant");
        };
        assert_eq!(input.activity_type, "tour");
        let query = ActivityQuery::from(input);
        assert_eq!(query, ActivityQuery::new("Paris").activity_type("tour").limit(3));
    }

    #[test]
    fn city_activities_have_no_type_filter() {
        let call = ToolCall::parse("get_city_activities", json!({"city": "Antalya"})).unwrap();
        let ToolCall::GetCityActivities(input) = call else {
            panic!("wrong variant");
        };
        let query = ActivityQuery::from(input);
        assert_eq!(query.activity_type, "");
        assert_eq!(query.limit, 20);
    }

    #[test]
    fn missing_city_reaches_the_pipeline_as_blank() {
        let call = ToolCall::parse("get_city_activities", json!({})).unwrap();
        let ToolCall::GetCityActivities(input) = call else {
            panic!("wrong variant");
        };
        assert_eq!(input.city, None);
        assert_eq!(ActivityQuery::from(input).city, "");
    }

    #[tokio::test]
    async fn missing_city_is_reported_as_required() {
        let toolbox = Toolbox::new(&ApiConfig::default()).unwrap();
        let call = ToolCall::parse("get_city_activities", json!({})).unwrap();
        let err = toolbox.call(call).await.unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        assert_eq!(err.to_string(), "city is required");
    }

    #[test]
    fn fractional_limits_are_truncated() {
        let call = ToolCall::parse("search_places", json!({"limit": 5.0})).unwrap();
        let ToolCall::SearchPlaces(input) = call else {
            panic!("wrong variant");
        };
        assert_eq!(input.limit, 5);

        let call = ToolCall::parse("get_place_photos", json!({"limit": 7.9})).unwrap();
        let ToolCall::GetPlacePhotos(input) = call else {
            panic!("wrong variant");
        };
        assert_eq!(input.limit, 7);
    }

    #[test]
    fn limit_text_is_parsed_like_a_number() {
        assert_eq!(parse_limit("5").unwrap(), 5);
        assert_eq!(parse_limit(" 12.5 ").unwrap(), 12);
        assert_eq!(parse_limit("abc").unwrap_err().to_string(), "invalid limit: abc");
        assert!(parse_limit("inf").is_err());
    }

    #[test]
    fn place_details_accepts_empty_arguments() {
        let call = ToolCall::parse("get_place_details", json!({})).unwrap();
        assert_eq!(call, ToolCall::GetPlaceDetails(PlaceDetailsInput::default()));
    }

    #[test]
    fn wrong_argument_types_are_validation_errors() {
        let err = ToolCall::parse("search_places", json!({"limit": "many"})).unwrap_err();
        assert!(err.to_string().starts_with("invalid arguments for search_places"));
    }
}
