//! Side-by-side neighborhood comparison handler.

use crate::compare::{CompareError, Comparison, MIN_ITEMS};
use crate::context::ServerContext;
use crate::filter::FilterSettings;
use crate::format::render_comparison;
use crate::search::{self, normalize};
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompareRequest {
    /// Neighborhood names in the current city, in column order
    pub names: Vec<String>,
}

pub async fn handle_compare(ctx: &ServerContext, request: CompareRequest) -> Result<String, String> {
    let view = ctx.view().await;
    if !view.scope.location_type.is_comparable() {
        return Err(format!(
            "Only neighborhoods can be compared; the current location type is {}. \
             Use set_scope with location_type \"neighborhood\".",
            view.scope.location_type
        ));
    }
    if request.names.len() < MIN_ITEMS {
        return Err(CompareError::NotEnoughItems {
            selected: request.names.len(),
        }
        .to_string());
    }

    // filters hide entries from listings, not from an explicit comparison
    let candidates = search::listing(
        &view.snapshot,
        &view.scope,
        view.criteria(),
        &FilterSettings::default(),
    )
    .map_err(|e| e.to_string())?;

    let mut comparison = Comparison::new(ctx.config().comparison.max_items);
    for name in &request.names {
        let wanted = normalize(name);
        let entry = candidates
            .iter()
            .find(|e| e.entity_name == *name)
            .or_else(|| candidates.iter().find(|e| normalize(&e.entity_name) == wanted))
            .ok_or_else(|| {
                let mut message = format!("No ratings for '{}' in {}.", name, view.scope.city);
                if let Some(best) = view.suggest(name).first() {
                    message.push_str(&format!(" Did you mean '{}'?", best.entity_name));
                }
                message
            })?;
        comparison.add(entry.clone()).map_err(|e| e.to_string())?;
    }

    let table = comparison.table(view.criteria()).map_err(|e| e.to_string())?;
    let mut output = format!("Comparison of neighborhoods in {}:\n\n", view.scope.city);
    render_comparison(&mut output, &table).map_err(|e| e.to_string())?;
    Ok(output)
}
