//! Pre-submission vote check.

use crate::context::ServerContext;
use crate::location::RequiredField;
use crate::vote::voted_keys;
use rmcp::schemars;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct CheckVoteRequest {
    /// Neighborhood or childcare center
    pub place: Option<String>,
    pub doctor_name: Option<String>,
    /// Doctor's specialty, e.g. "Кардиолог"
    pub specialty: Option<String>,
    pub shop_category: Option<String>,
    pub shop_name: Option<String>,
    /// Criterion key to score (1-5); merged over the session's draft ratings
    #[serde(default)]
    pub ratings: BTreeMap<String, u8>,
    #[serde(default)]
    pub opinion: String,
    /// Checks whether this user already voted for the same place
    pub submitter_id: Option<String>,
    /// Stored with the record, ISO-8601
    #[serde(default)]
    pub timestamp: String,
}

impl CheckVoteRequest {
    fn fields(&self) -> impl Iterator<Item = (RequiredField, &str)> {
        [
            (RequiredField::Place, &self.place),
            (RequiredField::DoctorName, &self.doctor_name),
            (RequiredField::Specialty, &self.specialty),
            (RequiredField::ShopCategory, &self.shop_category),
            (RequiredField::ShopName, &self.shop_name),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    }
}

/// Validate a vote for the current scope and preview the stored record.
pub async fn handle_check_vote(ctx: &ServerContext, request: CheckVoteRequest) -> Result<String, String> {
    let (draft, rules, snapshot) = {
        let state = ctx.state().read().await;
        (state.vote_draft(), *state.vote_rules(), state.snapshot())
    };

    let mut draft = request
        .fields()
        .fold(draft, |draft, (field, value)| draft.with_field(field, value))
        .with_opinion(request.opinion.as_str());
    for (criterion, &value) in &request.ratings {
        draft = draft.with_rating(criterion.as_str(), value);
    }

    let submitter = request.submitter_id.as_deref().unwrap_or_default();
    let already_voted = if submitter.is_empty() {
        BTreeSet::new()
    } else {
        voted_keys(&snapshot, submitter)
    };

    let record = draft
        .into_record(&rules, submitter, &already_voted, request.timestamp.as_str())
        .map_err(|e| format!("Vote rejected: {}", e))?;

    let rated = record.ratings.values().filter(|&&v| v > 0.0).count();
    let mut output = String::new();
    writeln!(
        output,
        "Vote for '{}' ({}, {}) is valid: {} of {} criteria rated{}.\n",
        record.entity_name,
        record.location_type,
        record.city,
        rated,
        record.ratings.len(),
        if record.opinion.is_empty() { "" } else { ", with opinion" }
    )
    .map_err(|e| e.to_string())?;
    let preview = serde_json::to_string_pretty(&record).map_err(|e| e.to_string())?;
    writeln!(output, "Record to store:\n{}", preview).map_err(|e| e.to_string())?;
    Ok(output)
}
