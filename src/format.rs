//! Plain-text rendering of listings, comparisons and suggestions for tool output.

use crate::aggregate::AggregatedEntry;
use crate::compare::{ComparisonTable, ScoreBand, criterion_series};
use crate::filter::FilterSettings;
use crate::location::{CriteriaSet, Scope};
use crate::search::Suggestion;
use std::fmt::{self, Write as _};

/// Opinions quoted under each entry.
const QUOTED_OPINIONS: usize = 2;

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("1 {}", one)
    } else {
        format!("{} {}", count, many)
    }
}

/// Render ranked entries starting at `first_rank`.
pub fn render_entries(
    output: &mut String,
    entries: &[AggregatedEntry],
    criteria: &CriteriaSet,
    first_rank: usize,
) -> fmt::Result {
    for (idx, entry) in entries.iter().enumerate() {
        write!(
            output,
            "{}. {} - {:.1}/5 ({})",
            first_rank + idx,
            entry.entity_name,
            entry.overall_average,
            plural(entry.votes(), "vote", "votes")
        )?;
        if let Some(specialty) = &entry.specialty {
            write!(output, " [{}]", specialty)?;
        }
        writeln!(output)?;

        // single-criterion types already show it as the overall score
        if criteria.len() > 1 {
            let breakdown: Vec<String> = criterion_series(entry, criteria)
                .into_iter()
                .map(|(label, value)| format!("{} {:.1}", label, value))
                .collect();
            writeln!(output, "   {}", breakdown.join(", "))?;
        }

        let opinions: Vec<_> = entry.opinions().collect();
        for record in opinions.iter().rev().take(QUOTED_OPINIONS) {
            writeln!(output, "   \"{}\"", record.opinion.trim())?;
        }
        if opinions.len() > QUOTED_OPINIONS {
            writeln!(
                output,
                "   ...and {} more",
                plural(opinions.len() - QUOTED_OPINIONS, "opinion", "opinions")
            )?;
        }
    }
    Ok(())
}

pub fn render_scope(
    output: &mut String,
    scope: &Scope,
    filters: &FilterSettings,
    records_in_scope: usize,
) -> fmt::Result {
    writeln!(output, "City: {}", scope.city)?;
    writeln!(output, "Location type: {}", scope.location_type)?;
    let labels: Vec<&str> = scope
        .location_type
        .criteria()
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    writeln!(output, "Criteria: {}", labels.join(", "))?;
    writeln!(
        output,
        "Filters: at least {}, rating >= {:.1}, sorted by {}",
        plural(filters.min_votes, "vote", "votes"),
        filters.min_rating,
        filters.sort_by
    )?;
    writeln!(output, "Records in scope: {}", records_in_scope)
}

pub fn render_suggestions(output: &mut String, query: &str, suggestions: &[Suggestion]) -> fmt::Result {
    writeln!(output, "No results found for '{}'.", query)?;
    if suggestions.is_empty() {
        return Ok(());
    }
    writeln!(output, "\nDid you mean:")?;
    for suggestion in suggestions {
        writeln!(output, "• {}", suggestion.entity_name)?;
    }
    Ok(())
}

/// Render a comparison as a Markdown table, one column per entry.
pub fn render_comparison(output: &mut String, table: &ComparisonTable) -> fmt::Result {
    write!(output, "| Критерий |")?;
    for column in &table.columns {
        write!(output, " {} |", column.entity_name)?;
    }
    writeln!(output)?;
    write!(output, "|---|")?;
    for _ in &table.columns {
        write!(output, "---|")?;
    }
    writeln!(output)?;

    for row in &table.rows {
        write!(output, "| {} |", row.label)?;
        for &value in &row.values {
            write!(output, " {:.1} ({}) |", value, ScoreBand::of(value).as_str())?;
        }
        writeln!(output)?;
    }

    write!(output, "| Обща оценка |")?;
    for column in &table.columns {
        write!(output, " **{:.1}** |", column.overall_average)?;
    }
    writeln!(output)?;
    write!(output, "| Гласове |")?;
    for column in &table.columns {
        write!(output, " {} |", column.votes)?;
    }
    writeln!(output)
}
