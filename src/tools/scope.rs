//! Session settings: scope, filters and the draft ratings.

use crate::context::ServerContext;
use crate::filter::SortBy;
use crate::format::render_scope;
use crate::location::LocationType;
use rmcp::schemars;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SetScopeRequest {
    /// City to browse, e.g. "София"
    pub city: Option<String>,
    /// Kind of place to browse
    pub location_type: Option<LocationType>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SetFiltersRequest {
    /// Hide entries with fewer votes
    pub min_votes: Option<usize>,
    /// Hide entries with a lower overall average (0-5)
    pub min_rating: Option<f64>,
    pub sort_by: Option<SortBy>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct RateRequest {
    /// Criterion key to score (1-5, 0 clears the criterion)
    #[serde(default)]
    pub ratings: BTreeMap<String, u8>,
    /// Reset every criterion to unrated before applying `ratings`
    #[serde(default)]
    pub clear: bool,
}

pub async fn handle_set_scope(ctx: &ServerContext, request: SetScopeRequest) -> Result<String, String> {
    let view = {
        let mut state = ctx.state().write().await;
        if let Some(city) = &request.city {
            state.set_city(city).map_err(|e| e.to_string())?;
        }
        if let Some(location_type) = request.location_type {
            state.set_location_type(location_type);
        }
        state.view()
    };

    let in_scope = view.snapshot.iter().filter(|r| r.in_scope(&view.scope)).count();
    let mut output = String::new();
    render_scope(&mut output, &view.scope, &view.filters, in_scope).map_err(|e| e.to_string())?;
    Ok(output)
}

pub async fn handle_set_filters(
    ctx: &ServerContext,
    request: SetFiltersRequest,
) -> Result<String, String> {
    let view = {
        let mut state = ctx.state().write().await;
        let mut filters = *state.filters();
        if let Some(min_votes) = request.min_votes {
            filters.min_votes = min_votes;
        }
        if let Some(min_rating) = request.min_rating {
            filters.min_rating = min_rating;
        }
        if let Some(sort_by) = request.sort_by {
            filters.sort_by = sort_by;
        }
        state.set_filters(filters).map_err(|e| e.to_string())?;
        state.view()
    };

    let in_scope = view.snapshot.iter().filter(|r| r.in_scope(&view.scope)).count();
    let mut output = String::new();
    render_scope(&mut output, &view.scope, &view.filters, in_scope).map_err(|e| e.to_string())?;
    Ok(output)
}

/// Update the draft ratings. Nothing changes when any rating is rejected.
pub async fn handle_rate(ctx: &ServerContext, request: RateRequest) -> Result<String, String> {
    let mut state = ctx.state().write().await;
    let criteria = state.criteria();

    let ratings = if request.clear {
        let mut cleared: BTreeMap<String, u8> = criteria.keys().map(|k| (k.to_string(), 0)).collect();
        cleared.extend(request.ratings);
        cleared
    } else {
        request.ratings
    };
    state.set_ratings(&ratings).map_err(|e| e.to_string())?;

    let mut output = String::new();
    writeln!(output, "Draft ratings for {} in {}:", state.location_type(), state.city())
        .map_err(|e| e.to_string())?;
    for criterion in criteria.iter() {
        let value = state.draft_ratings().get(&criterion.key).copied().unwrap_or(0);
        let shown = if value == 0 {
            "-".to_string()
        } else {
            value.to_string()
        };
        writeln!(output, "• {}: {}", criterion.label, shown).map_err(|e| e.to_string())?;
    }
    Ok(output)
}
