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

//! # HTTP Transport
//!
//! - `GET  /health`
//! - `POST /mcp` plain JSON-RPC: `initialize`, `notifications/initialized`,
//!   `tools/list`, `tools/call`. Every failure is a `-32603` error with HTTP 500.
//! - `GET  /api/search`, `/api/places/:id`, `/api/activities` return the
//!   structured records as JSON, or `{"error": ...}` with HTTP 500.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rmcp::model::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::activities::ActivityQuery;
use crate::error::ToolError;
use crate::foursquare::PlaceSearch;
use crate::mcp_server::PlacesAgentServer;
use crate::tools::{ToolCall, Toolbox, parse_limit};

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const INTERNAL_ERROR: i64 = -32603;

#[derive(Clone)]
pub struct AppState {
    toolbox: Arc<Toolbox>,
    tools: Arc<Vec<Tool>>,
}

impl AppState {
    pub fn new(toolbox: Arc<Toolbox>) -> Self {
        let tools = PlacesAgentServer::new(Arc::clone(&toolbox)).tools();
        Self {
            toolbox,
            tools: Arc::new(tools),
        }
    }
}

pub fn router(toolbox: Arc<Toolbox>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mcp", post(mcp_endpoint))
        .route("/api/search", get(api_search))
        .route("/api/places/:id", get(api_place_details))
        .route("/api/activities", get(api_activities))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(toolbox))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum McpMethod {
    Initialize,
    Initialized,
    ListTools,
    CallTool,
}

impl FromStr for McpMethod {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialize" => Ok(McpMethod::Initialize),
            "notifications/initialized" => Ok(McpMethod::Initialized),
            "tools/list" => Ok(McpMethod::ListTools),
            "tools/call" => Ok(McpMethod::CallTool),
            other => Err(ToolError::UnknownMethod(other.to_string())),
        }
    }
}

fn default_id() -> Value {
    json!(1)
}

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
    #[serde(default = "default_id")]
    id: Value,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// `Ok(None)` means acknowledge without a result
async fn dispatch(
    state: &AppState,
    method: Option<&str>,
    params: Value,
) -> Result<Option<Value>, ToolError> {
    let method: McpMethod = method.unwrap_or("undefined").parse()?;
    match method {
        McpMethod::Initialize => Ok(Some(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {"tools": {}},
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        }))),
        McpMethod::Initialized => Ok(None),
        McpMethod::ListTools => Ok(Some(json!({ "tools": state.tools.as_ref() }))),
        McpMethod::CallTool => {
            let params: CallToolParams = serde_json::from_value(params)
                .map_err(|e| ToolError::validation(format!("invalid tools/call params: {}", e)))?;
            let call = ToolCall::parse(&params.name, params.arguments)?;
            let text = state.toolbox.call(call).await?;
            Ok(Some(json!({
                "content": [{"type": "text", "text": text}],
            })))
        }
    }
}

async fn mcp_endpoint(State(state): State<AppState>, Json(request): Json<JsonRpcRequest>) -> Response {
    let JsonRpcRequest { method, params, id } = request;
    tracing::info!("POST /mcp - {}", method.as_deref().unwrap_or("N/A"));

    match dispatch(&state, method.as_deref(), params).await {
        Ok(Some(result)) => Json(json!({"jsonrpc": "2.0", "id": id, "result": result})).into_response(),
        Ok(None) => Json(json!({"jsonrpc": "2.0", "id": id})).into_response(),
        Err(e) => {
            tracing::error!("MCP Error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": INTERNAL_ERROR, "message": e.to_string()},
                })),
            )
                .into_response()
        }
    }
}

fn rest_error(e: ToolError) -> Response {
    tracing::error!("API Error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": e.to_string()})),
    )
        .into_response()
}

// Query limits stay text so a bad value gets the JSON error envelope
fn query_limit(raw: Option<&str>) -> Result<i64, ToolError> {
    raw.map_or(Ok(10), parse_limit)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    near: Option<String>,
    query: Option<String>,
    limit: Option<String>,
}

async fn api_search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let limit = match query_limit(params.limit.as_deref()) {
        Ok(limit) => limit,
        Err(e) => return rest_error(e),
    };
    let search = PlaceSearch::new(
        params.near.unwrap_or_else(|| "Antalya".to_string()),
        params.query.unwrap_or_else(|| "restaurant".to_string()),
    )
    .limit(limit);

    match state.toolbox.search_places(&search).await {
        Ok(places) => Json(places).into_response(),
        Err(e) => rest_error(e),
    }
}

async fn api_place_details(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.toolbox.place_details(Some(&id)).await {
        Ok(details) => Json(details).into_response(),
        Err(e) => rest_error(e),
    }
}

#[derive(Debug, Deserialize)]
struct ActivitiesParams {
    city: Option<String>,
    #[serde(rename = "type")]
    activity_type: Option<String>,
    limit: Option<String>,
}

async fn api_activities(
    State(state): State<AppState>,
    Query(params): Query<ActivitiesParams>,
) -> Response {
    let limit = match query_limit(params.limit.as_deref()) {
        Ok(limit) => limit,
        Err(e) => return rest_error(e),
    };
    let query = ActivityQuery::new(params.city.unwrap_or_else(|| "Istanbul".to_string()))
        .activity_type(params.activity_type.unwrap_or_else(|| "museum".to_string()))
        .limit(limit);

    match state.toolbox.search_activities(&query).await {
        Ok(activities) => Json(activities).into_response(),
        Err(e) => rest_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names() {
        assert_eq!("tools/call".parse::<McpMethod>().unwrap(), McpMethod::CallTool);
        assert_eq!(
            "notifications/initialized".parse::<McpMethod>().unwrap(),
            McpMethod::Initialized
        );
        let err = "resources/list".parse::<McpMethod>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown method: resources/list");
    }

    #[test]
    fn query_limit_defaults_to_ten() {
        assert_eq!(query_limit(None).unwrap(), 10);
        assert_eq!(query_limit(Some("7.5")).unwrap(), 7);
        assert!(matches!(query_limit(Some("abc")), Err(ToolError::Validation(_))));
    }

    #[test]
    fn request_id_defaults_to_one() {
        let request: JsonRpcRequest = serde_json::from_str(r#"{"method": "tools/list"}"#).unwrap();
        assert_eq!(request.id, json!(1));
        assert_eq!(request.params, Value::Null);
    }
}
