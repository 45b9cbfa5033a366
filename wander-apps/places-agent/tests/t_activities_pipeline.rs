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

//! Activity pipeline (token, geocode, square query, filter) against mocked
//! Amadeus and Nominatim servers.

#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use wander_places_agent::{
    ActivityQuery, ApiConfig, CityActivitiesInput, ManualClock, SearchActivitiesInput, ToolCall,
    ToolError, Toolbox,
};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const SQUARE_PATH: &str = "/v1/shopping/activities/by-square";

fn config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        amadeus_api_key: Some("amadeus-key".to_string()),
        amadeus_api_secret: Some("amadeus-secret".to_string()),
        amadeus_base_url: server.uri(),
        nominatim_base_url: server.uri(),
        nominatim_user_agent: "wander-tests/1.0".to_string(),
        ..Default::default()
    }
}

fn toolbox_with_clock(server: &MockServer) -> (Toolbox, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let toolbox = Toolbox::with_clock(&config(server), clock.clone()).unwrap();
    (toolbox, clock)
}

fn istanbul() -> Value {
    json!([{
        "display_name": "İstanbul, Marmara Bölgesi, Türkiye",
        "boundingbox": ["40.8", "41.3", "28.6", "29.4"]
    }])
}

fn activities() -> Value {
    json!({
        "data": [
            {
                "id": "1",
                "name": "Topkapi Palace Museum skip-the-line",
                "description": "<p>Walk the <b>Ottoman</b> courtyards</p>",
                "bookingLink": "https://book.example/topkapi",
                "price": {"amount": "25.00", "currencyCode": "EUR"},
                "pictures": ["https://img.example/topkapi.jpg"]
            },
            {
                "id": "2",
                "name": "Bosphorus Sunset Cruise",
                "description": "Sail between two continents",
                "price": {"amount": "40.00", "currencyCode": "EUR"},
                "classifications": [{"category": {"code": "BOAT"}}]
            },
            {
                "id": "3",
                "self": {"href": "https://test.api.amadeus.com/v1/shopping/activities/3"},
                "name": "Archaeology Highlights",
                "description": "<p>Guided visit</p>",
                "classifications": [{"category": {"code": "MUSEUM"}}]
            },
            {
                "id": "4",
                "name": "Pera Museum",
                "description": format!("<p>{}</p>", "Art ".repeat(100))
            }
        ]
    })
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=amadeus-key"))
        .and(body_string_contains("client_secret=amadeus-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "amadeusOAuth2Token",
            "access_token": "tok-1",
            "token_type": "Bearer",
            "expires_in": 1799
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_geocoder(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Istanbul"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(header("User-Agent", "wander-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(istanbul()))
        .mount(server)
        .await;
}

async fn mount_square(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SQUARE_PATH))
        .and(query_param("north", "41.3"))
        .and(query_param("west", "28.6"))
        .and(query_param("south", "40.8"))
        .and(query_param("east", "29.4"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(activities()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn type_filter_and_limit_apply_in_provider_order() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_geocoder(&server).await;
    mount_square(&server).await;

    let (toolbox, _) = toolbox_with_clock(&server);
    let found = toolbox
        .search_activities(&ActivityQuery::new("Istanbul").activity_type("MUSEUM").limit(2))
        .await
        .unwrap();

    let names: Vec<_> = found.iter().filter_map(|a| a.name.as_deref()).collect();
    assert_eq!(names, ["Topkapi Palace Museum skip-the-line", "Archaeology Highlights"]);
    assert_eq!(found[0].link.as_deref(), Some("https://book.example/topkapi"));
    assert_eq!(found[0].description.as_deref(), Some("Walk the Ottoman courtyards"));
    assert_eq!(
        found[1].link.as_deref(),
        Some("https://test.api.amadeus.com/v1/shopping/activities/3")
    );
}

#[tokio::test]
async fn search_activities_renders_text() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_geocoder(&server).await;
    mount_square(&server).await;

    let (toolbox, _) = toolbox_with_clock(&server);
    let text = toolbox
        .call(ToolCall::SearchActivities(SearchActivitiesInput {
            city: "Istanbul".to_string(),
            activity_type: "boat".to_string(),
            limit: 10,
        }))
        .await
        .unwrap();

    assert!(text.starts_with("Found 1 boat activities in Istanbul:\n\n"));
    assert!(text.contains("1. **Bosphorus Sunset Cruise**"));
    assert!(text.contains("💰 40.00 EUR"));
    assert!(text.contains("📸 No image"));
    assert!(text.contains("🔗 No booking link"));
}

#[tokio::test]
async fn city_activities_are_unfiltered() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_geocoder(&server).await;
    mount_square(&server).await;

    let (toolbox, _) = toolbox_with_clock(&server);
    let text = toolbox
        .call(ToolCall::GetCityActivities(CityActivitiesInput {
            city: Some("Istanbul".to_string()),
            limit: 20,
        }))
        .await
        .unwrap();

    assert!(text.starts_with("Found 4 activities in Istanbul:\n\n"));
    assert!(text.contains("4. **Pera Museum**"));
    assert!(text.contains("Price not available"));
    // 400 characters of description cut down with an ellipsis
    assert!(text.contains("Art Art…"));
}

#[tokio::test]
async fn token_is_reused_while_valid() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_geocoder(&server).await;
    mount_square(&server).await;

    let (toolbox, clock) = toolbox_with_clock(&server);
    let query = ActivityQuery::new("Istanbul");
    toolbox.search_activities(&query).await.unwrap();
    clock.advance(Duration::from_secs(1700));
    toolbox.search_activities(&query).await.unwrap();
}

#[tokio::test]
async fn token_is_refreshed_once_expired() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;
    mount_geocoder(&server).await;
    mount_square(&server).await;

    let (toolbox, clock) = toolbox_with_clock(&server);
    let query = ActivityQuery::new("Istanbul");
    toolbox.search_activities(&query).await.unwrap();
    // 1799s lifetime minus the 60s margin
    clock.advance(Duration::from_secs(1739));
    toolbox.search_activities(&query).await.unwrap();
    toolbox.search_activities(&query).await.unwrap();
}

#[tokio::test]
async fn unknown_city_is_not_found() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SQUARE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let (toolbox, _) = toolbox_with_clock(&server);
    let err = toolbox
        .search_activities(&ActivityQuery::new("Atlantis"))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound(_)));
    assert_eq!(err.to_string(), "No location found for: Atlantis");
}

#[tokio::test]
async fn rejected_credentials_stop_the_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (toolbox, _) = toolbox_with_clock(&server);
    let err = toolbox
        .search_activities(&ActivityQuery::new("Istanbul"))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::UpstreamAuth { status: 401, .. }));
    assert_eq!(err.to_string(), "Amadeus OAuth failed: 401 invalid_client");
}

#[tokio::test]
async fn activities_endpoint_failure_is_reported() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_geocoder(&server).await;
    Mock::given(method("GET"))
        .and(path(SQUARE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (toolbox, _) = toolbox_with_clock(&server);
    let err = toolbox
        .search_activities(&ActivityQuery::new("Istanbul"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Amadeus activities API HTTP 500: boom");
}

#[tokio::test]
async fn missing_credentials_are_named() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = ApiConfig {
        amadeus_api_secret: None,
        ..config(&server)
    };
    let err = Toolbox::new(&config)
        .unwrap()
        .search_activities(&ActivityQuery::new("Istanbul"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "AMADEUS_API_SECRET is not configured");
}

#[tokio::test]
async fn blank_city_is_rejected() {
    let server = MockServer::start().await;
    let (toolbox, _) = toolbox_with_clock(&server);
    let err = toolbox
        .search_activities(&ActivityQuery::new("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Validation(_)));
}
