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

//! # MCP Server Handler
//!
//! rmcp handler exposing the tools. Pipeline failures come back as a text
//! result reading `Error: <message>`, never as a protocol error.

use std::sync::Arc;

use rmcp::handler::server::{ServerHandler, tool::ToolRouter, wrapper::Parameters};
use rmcp::model::{CallToolResult, Content, Tool};
use rmcp::{tool, tool_router};
use serde_json::Value;

use crate::tools::{
    CityActivitiesInput, PlaceDetailsInput, PlacePhotosInput, SearchActivitiesInput,
    SearchPlacesInput, ToolCall, Toolbox,
};

#[derive(Clone)]
pub struct PlacesAgentServer {
    toolbox: Arc<Toolbox>,
    tool_router: ToolRouter<Self>,
}

impl PlacesAgentServer {
    pub fn new(toolbox: Arc<Toolbox>) -> Self {
        Self {
            toolbox,
            tool_router: Self::tool_router(),
        }
    }

    /// Tool descriptors, as published by `tools/list`
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn run(&self, call: ToolCall) -> Result<String, String> {
        let tool = call.name();
        self.toolbox.call(call).await.map_err(|e| {
            if e.is_client_side() {
                tracing::info!("Tool {} rejected: {}", tool, e);
            } else {
                tracing::warn!("Tool {} failed: {}", tool, e);
            }
            format!("Error: {e}")
        })
    }
}

#[tool_router]
impl PlacesAgentServer {
    #[tool(
        name = "search_places",
        description = "Search for places using Foursquare Places API. Parameters: near (city or area, default Antalya), query (e.g. restaurant, cafe, bazaar), limit (1-50), categories (comma-separated Foursquare category IDs, optional)."
    )]
    async fn search_places(&self, params: Parameters<SearchPlacesInput>) -> Result<String, String> {
        self.run(ToolCall::SearchPlaces(params.0)).await
    }

    #[tool(
        name = "get_place_details",
        description = "Get detailed information about a specific place. Parameters: fsq_place_id (Foursquare place ID, required)."
    )]
    async fn get_place_details(
        &self,
        params: Parameters<PlaceDetailsInput>,
    ) -> Result<String, String> {
        self.run(ToolCall::GetPlaceDetails(params.0)).await
    }

    #[tool(
        name = "get_place_photos",
        description = "Get photos for a specific place. Parameters: fsq_place_id (Foursquare place ID, required), limit (1-50)."
    )]
    async fn get_place_photos(
        &self,
        params: Parameters<PlacePhotosInput>,
    ) -> Result<String, String> {
        self.run(ToolCall::GetPlacePhotos(params.0)).await
    }

    #[tool(
        name = "search_activities",
        description = "Search for activities and attractions in a city using Amadeus API. Parameters: city (default Istanbul), type (e.g. museum, tour, boat, food; default museum), limit (1-50)."
    )]
    async fn search_activities(
        &self,
        params: Parameters<SearchActivitiesInput>,
    ) -> Result<String, String> {
        self.run(ToolCall::SearchActivities(params.0)).await
    }

    #[tool(
        name = "get_city_activities",
        description = "Get all available activities in a specific city without filtering. Parameters: city (required), limit (1-50, default 20)."
    )]
    async fn get_city_activities(
        &self,
        params: Parameters<CityActivitiesInput>,
    ) -> Result<String, String> {
        self.run(ToolCall::GetCityActivities(params.0)).await
    }
}

impl ServerHandler for PlacesAgentServer {
    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::ListToolsResult, rmcp::ErrorData>> + Send + '_
    {
        tracing::debug!(
            "list_tools called, tools count: {}",
            self.tool_router.list_all().len()
        );
        Box::pin(async move {
            let tools = self.tool_router.list_all();
            Ok(rmcp::model::ListToolsResult::with_all_items(tools))
        })
    }

    fn call_tool(
        &self,
        request: rmcp::model::CallToolRequestParam,
        context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::CallToolResult, rmcp::ErrorData>> + Send + '_
    {
        let router = self.tool_router.clone();
        let self_clone = self.clone();
        Box::pin(async move {
            // Argument errors are answered as text, never as invalid_params
            let arguments = request.arguments.clone().map(Value::Object).unwrap_or_default();
            if let Err(e) = ToolCall::parse(&request.name, arguments) {
                tracing::info!("Tool {} rejected: {}", request.name, e);
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Error: {e}"
                ))]));
            }
            let context =
                rmcp::handler::server::tool::ToolCallContext::new(&self_clone, request, context);
            router.call(context).await
        })
    }

    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::V_2025_03_26,
            capabilities: rmcp::model::ServerCapabilities {
                tools: Some(rmcp::model::ToolsCapability::default()),
                ..Default::default()
            },
            server_info: rmcp::model::Implementation::from_build_env(),
            instructions: Some(
                "Places search and details (Foursquare), activity search by city (Amadeus + OpenStreetMap)."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::tools::ToolName;

    fn server() -> PlacesAgentServer {
        let toolbox = Toolbox::new(&ApiConfig::default()).unwrap();
        PlacesAgentServer::new(Arc::new(toolbox))
    }

    #[test]
    fn router_lists_every_tool() {
        let mut names: Vec<String> = server().tools().iter().map(|t| t.name.to_string()).collect();
        names.sort();
        let mut expected: Vec<String> = ToolName::ALL.iter().map(|t| t.to_string()).collect();
        expected.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn arguments_of_the_wrong_type_are_caught_before_decoding() {
        let err = ToolCall::parse("search_places", serde_json::json!({"near": 42})).unwrap_err();
        assert!(err.is_client_side());
        assert!(format!("Error: {err}").starts_with("Error: invalid arguments for search_places"));
    }

    #[tokio::test]
    async fn missing_city_becomes_error_text() {
        let text = server()
            .run(ToolCall::GetCityActivities(CityActivitiesInput {
                city: None,
                limit: 20,
            }))
            .await
            .unwrap_err();
        assert_eq!(text, "Error: city is required");
    }

    #[tokio::test]
    async fn failures_become_error_text() {
        let text = server()
            .run(ToolCall::GetPlaceDetails(PlaceDetailsInput::default()))
            .await
            .unwrap_err();
        assert_eq!(text, "Error: fsq_place_id is required");
    }
}
