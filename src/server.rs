//! MCP server exposing the ratings tools.

use crate::context::ServerContext;
use crate::tools::{
    CheckVoteRequest, CompareRequest, ListEntriesRequest, RankingRequest, RateRequest, SearchRequest,
    SetFiltersRequest, SetScopeRequest, handle_check_vote, handle_compare, handle_list_entries,
    handle_ranking, handle_rate, handle_reload_snapshot, handle_search, handle_set_filters,
    handle_set_scope,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for neighborhood and local-service ratings
#[derive(Clone)]
pub struct RatingsServer {
    context: ServerContext,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for RatingsServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingsServer")
            .field("context", &self.context)
            .finish()
    }
}

#[tool_router]
impl RatingsServer {
    pub fn new(context: ServerContext) -> Self {
        Self {
            context,
            tool_router: Self::tool_router(),
        }
    }

    pub const fn context(&self) -> &ServerContext {
        &self.context
    }

    #[tool(
        description = "Choose the city and location type (neighborhood, childcare, doctors, dentists, shops) that every other tool works on. Reports the criteria for the type and how many ratings are in scope.",
        input_schema = inline_schema_for_type::<SetScopeRequest>()
    )]
    async fn set_scope(
        &self,
        Parameters(request): Parameters<SetScopeRequest>,
    ) -> std::result::Result<String, String> {
        handle_set_scope(&self.context, request).await
    }

    #[tool(
        description = "Set the minimum vote count, minimum overall rating (0-5) and sort order used by listings and search. Omitted fields keep their current value.",
        input_schema = inline_schema_for_type::<SetFiltersRequest>()
    )]
    async fn set_filters(
        &self,
        Parameters(request): Parameters<SetFiltersRequest>,
    ) -> std::result::Result<String, String> {
        handle_set_filters(&self.context, request).await
    }

    #[tool(
        description = "List rated places in the current scope with their average scores, vote counts and recent opinions, filtered and sorted by the current settings. Paginated.",
        input_schema = inline_schema_for_type::<ListEntriesRequest>()
    )]
    async fn list_entries(
        &self,
        Parameters(request): Parameters<ListEntriesRequest>,
    ) -> std::result::Result<String, String> {
        handle_list_entries(&self.context, request).await
    }

    #[tool(
        description = "Top places in the current scope by overall rating or by number of votes.",
        input_schema = inline_schema_for_type::<RankingRequest>()
    )]
    async fn ranking(
        &self,
        Parameters(request): Parameters<RankingRequest>,
    ) -> std::result::Result<String, String> {
        handle_ranking(&self.context, request).await
    }

    #[tool(
        description = "Find places in the current scope by name. Matching ignores case and accents and tolerates typos. When nothing matches, suggests similar names.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.context, request).await
    }

    #[tool(
        description = "Compare two or three neighborhoods of the current city criterion by criterion.",
        input_schema = inline_schema_for_type::<CompareRequest>()
    )]
    async fn compare(
        &self,
        Parameters(request): Parameters<CompareRequest>,
    ) -> std::result::Result<String, String> {
        handle_compare(&self.context, request).await
    }

    #[tool(
        description = "Set draft scores (1-5, 0 = unrated) for the criteria of the current location type. The draft is used by check_vote and resets when the location type changes.",
        input_schema = inline_schema_for_type::<RateRequest>()
    )]
    async fn rate(
        &self,
        Parameters(request): Parameters<RateRequest>,
    ) -> std::result::Result<String, String> {
        handle_rate(&self.context, request).await
    }

    #[tool(
        description = "Check whether a vote for the current scope would be accepted: required fields, all-or-none ratings, opinion length and one vote per user and place. Shows the record that would be stored.",
        input_schema = inline_schema_for_type::<CheckVoteRequest>()
    )]
    async fn check_vote(
        &self,
        Parameters(request): Parameters<CheckVoteRequest>,
    ) -> std::result::Result<String, String> {
        handle_check_vote(&self.context, request).await
    }

    #[tool(description = "Reload the ratings snapshot file now. On failure the previous snapshot stays in use.")]
    async fn reload_snapshot(&self) -> std::result::Result<String, String> {
        handle_reload_snapshot(&self.context).await
    }
}

#[tool_handler]
impl ServerHandler for RatingsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "kvartali: ratings of neighborhoods, childcare, doctors, dentists and shops by city. \
                 Start with set_scope to pick a city and location type, then use list_entries, \
                 search, ranking or compare. Scores are averages on a 0-5 scale.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this sets `inline_subschemas = true` so
/// enums such as the location type are inlined instead of referenced through `$ref`.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let serde_json::Value::Object(json_object) = object else {
        panic!("Schema serialization produced non-object value");
    };

    Arc::new(json_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn inline_schema_expands_enums() {
        let schema = inline_schema_for_type::<SetScopeRequest>();
        let text = serde_json::Value::Object((*schema).clone()).to_string();
        assert!(text.contains("neighborhood"), "{text}");
        assert!(!text.contains("$ref"), "{text}");
    }

    #[test]
    fn every_tool_is_routed() {
        let server = RatingsServer::new(ServerContext::new(Config::default()));
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "check_vote",
                "compare",
                "list_entries",
                "ranking",
                "rate",
                "reload_snapshot",
                "search",
                "set_filters",
                "set_scope",
            ]
        );
    }

    #[test]
    fn info_advertises_tools_and_instructions() {
        let info = RatingsServer::new(ServerContext::new(Config::default())).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some_and(|text| text.contains("set_scope")));
    }
}
