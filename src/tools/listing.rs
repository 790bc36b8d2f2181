//! Listing, ranking and search handlers.

use crate::context::ServerContext;
use crate::filter::{DEFAULT_TOP_LIMIT, paginate, top_by_rating, top_by_votes};
use crate::format::{render_entries, render_suggestions};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListEntriesRequest {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<usize>,
    /// Entries per page (default: configured page size)
    pub per_page: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    /// Highest overall average
    #[default]
    Rating,
    /// Most votes
    Votes,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct RankingRequest {
    #[serde(default)]
    pub by: RankBy,
    /// Number of entries (default: 10)
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Name or part of a name; case and accents are ignored
    pub query: String,
    /// Maximum number of results to return (default: 10)
    #[serde(default = "default_limit")]
    pub limit: Option<usize>,
}

fn default_limit() -> Option<usize> {
    Some(DEFAULT_TOP_LIMIT)
}

pub async fn handle_list_entries(
    ctx: &ServerContext,
    request: ListEntriesRequest,
) -> Result<String, String> {
    let view = ctx.view().await;
    let entries = view.listing().map_err(|e| e.to_string())?;

    let per_page = request.per_page.unwrap_or(ctx.config().page_size).max(1);
    let page = request.page.unwrap_or(1).max(1);
    let shown = paginate(&entries, page - 1, per_page);

    if entries.is_empty() {
        return Ok(format!(
            "No {} in {} match the current filters.",
            view.scope.location_type, view.scope.city
        ));
    }
    if shown.is_empty() {
        return Ok(format!(
            "Page {} is past the end: {} entries fit on {} pages.",
            page,
            entries.len(),
            entries.len().div_ceil(per_page)
        ));
    }

    let first_rank = (page - 1) * per_page + 1;
    let mut output = format!(
        "{} in {} ({}-{} of {}, sorted by {}):\n\n",
        view.scope.location_type,
        view.scope.city,
        first_rank,
        first_rank + shown.len() - 1,
        entries.len(),
        view.filters.sort_by
    );
    render_entries(&mut output, shown, view.criteria(), first_rank).map_err(|e| e.to_string())?;
    Ok(output)
}

pub async fn handle_ranking(ctx: &ServerContext, request: RankingRequest) -> Result<String, String> {
    let view = ctx.view().await;
    let entries = view.listing().map_err(|e| e.to_string())?;
    let limit = request.limit.unwrap_or(DEFAULT_TOP_LIMIT);

    let (top, label) = match request.by {
        RankBy::Rating => (top_by_rating(&entries, limit), "highest rated"),
        RankBy::Votes => (top_by_votes(&entries, limit), "most voted"),
    };

    let mut output = format!(
        "Top {} {} {} in {}:\n\n",
        top.len(),
        label,
        view.scope.location_type,
        view.scope.city
    );
    for (idx, entry) in top.iter().enumerate() {
        let value = match request.by {
            RankBy::Rating => format!("{:.1}", entry.overall_average),
            RankBy::Votes => entry.votes().to_string(),
        };
        writeln!(output, "{}. {}: {}", idx + 1, entry.entity_name, value).map_err(|e| e.to_string())?;
    }
    Ok(output)
}

/// Search the current scope. An empty result lists close names instead.
pub async fn handle_search(ctx: &ServerContext, request: SearchRequest) -> Result<String, String> {
    let view = ctx.view().await;
    let mut results = view.search(&request.query).map_err(|e| e.to_string())?;

    let mut output = String::new();
    if results.is_empty() {
        let suggestions = view.suggest(&request.query);
        render_suggestions(&mut output, &request.query, &suggestions).map_err(|e| e.to_string())?;
        return Ok(output);
    }

    let total = results.len();
    results.truncate(request.limit.unwrap_or(DEFAULT_TOP_LIMIT));
    writeln!(
        output,
        "Results for '{}' in {} {} ({} of {}):\n",
        request.query,
        view.scope.city,
        view.scope.location_type,
        results.len(),
        total
    )
    .map_err(|e| e.to_string())?;
    render_entries(&mut output, &results, view.criteria(), 1).map_err(|e| e.to_string())?;
    Ok(output)
}
