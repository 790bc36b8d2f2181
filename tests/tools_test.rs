mod common;

use assert2::check;
use common::{SnapshotFile, context_with, server_context, snapshot_file, sofia_snapshot};
use kvartali::config::{ComparisonConfig, SnapshotConfig};
use kvartali::tools::{
    CheckVoteRequest, CompareRequest, ListEntriesRequest, RankBy, RankingRequest, RateRequest,
    SearchRequest, SetFiltersRequest, SetScopeRequest, handle_check_vote, handle_compare,
    handle_list_entries, handle_ranking, handle_rate, handle_reload_snapshot, handle_search,
    handle_set_filters, handle_set_scope,
};
use kvartali::{Config, LocationType, RatingRecord, ServerContext, SortBy};
use rstest::rstest;
use std::collections::BTreeMap;

fn search_request(query: &str) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        limit: Some(10),
    }
}

#[rstest]
#[tokio::test]
async fn list_entries_ranks_current_scope(server_context: ServerContext) {
    let output = handle_list_entries(&server_context, ListEntriesRequest::default())
        .await
        .unwrap();

    check!(output.starts_with("neighborhood in София (1-3 of 3, sorted by ratingDesc)"));
    check!(output.contains("1. Лозенец - 4.1/5 (2 votes)"), "{}", output);
    check!(output.contains("2. Младост - 3.2/5 (3 votes)"), "{}", output);
    check!(output.contains("3. Люлин - 1.9/5 (1 vote)"), "{}", output);
    check!(output.contains("\"Спокойно и зелено\""));
    check!(!output.contains("Чайка"), "other cities stay out of scope");
}

#[rstest]
#[tokio::test]
async fn list_entries_paginates(server_context: ServerContext) {
    let request = ListEntriesRequest {
        page: Some(2),
        per_page: Some(2),
    };
    let output = handle_list_entries(&server_context, request).await.unwrap();
    check!(output.contains("(3-3 of 3"));
    check!(output.contains("3. Люлин"));
    check!(!output.contains("Лозенец"));

    let request = ListEntriesRequest {
        page: Some(5),
        per_page: Some(2),
    };
    let output = handle_list_entries(&server_context, request).await.unwrap();
    check!(output.contains("past the end"));
}

#[rstest]
#[tokio::test]
async fn filters_change_listing(server_context: ServerContext) {
    let request = SetFiltersRequest {
        min_votes: Some(2),
        min_rating: None,
        sort_by: Some(SortBy::VotesDesc),
    };
    let output = handle_set_filters(&server_context, request).await.unwrap();
    check!(output.contains("at least 2 votes"));
    check!(output.contains("sorted by votesDesc"));

    let output = handle_list_entries(&server_context, ListEntriesRequest::default())
        .await
        .unwrap();
    check!(output.contains("1. Младост"));
    check!(output.contains("2. Лозенец"));
    check!(!output.contains("Люлин"));

    let invalid = SetFiltersRequest {
        min_rating: Some(9.0),
        ..SetFiltersRequest::default()
    };
    let error = handle_set_filters(&server_context, invalid).await.unwrap_err();
    check!(error.contains("min_rating"));
    check!(server_context.state().read().await.filters().min_votes == 2);
}

#[rstest]
#[tokio::test]
async fn set_scope_switches_city_and_type(server_context: ServerContext) {
    let request = SetScopeRequest {
        city: Some("София".to_string()),
        location_type: Some(LocationType::Doctors),
    };
    let output = handle_set_scope(&server_context, request).await.unwrap();
    check!(output.contains("Location type: doctors"));
    check!(output.contains("Criteria: Обща оценка"));
    check!(output.contains("Records in scope: 2"));

    let output = handle_list_entries(&server_context, ListEntriesRequest::default())
        .await
        .unwrap();
    check!(output.contains("Д-р Иванов (Кардиолог) - 5.0/5 (1 vote) [Кардиолог]"));

    let blank = SetScopeRequest {
        city: Some("  ".to_string()),
        location_type: None,
    };
    check!(handle_set_scope(&server_context, blank).await.is_err());
}

#[rstest]
#[tokio::test]
async fn ranking_by_votes(server_context: ServerContext) {
    let request = RankingRequest {
        by: RankBy::Votes,
        limit: Some(2),
    };
    let output = handle_ranking(&server_context, request).await.unwrap();
    check!(output.starts_with("Top 2 most voted neighborhood in София"));
    check!(output.contains("1. Младост: 3"));
    check!(output.contains("2. Лозенец: 2"));
}

#[rstest]
#[tokio::test]
async fn search_finds_prefix_match(server_context: ServerContext) {
    let output = handle_search(&server_context, search_request("лозен")).await.unwrap();
    check!(output.contains("Results for 'лозен'"), "{}", output);
    check!(output.contains("1. Лозенец"));
    check!(!output.contains("Младост"));
}

#[rstest]
#[tokio::test]
async fn empty_search_suggests_close_names(server_context: ServerContext) {
    let output = handle_search(&server_context, search_request("xyzzy")).await.unwrap();
    check!(output.starts_with("No results found for 'xyzzy'."));
    check!(!output.contains("Did you mean"));

    // too long to match by edit distance, but shares the whole name as a prefix
    let query = "Лозенец Южен парк град София";
    let output = handle_search(&server_context, search_request(query)).await.unwrap();
    check!(output.contains("Did you mean:\n• Лозенец"), "{}", output);
}

#[rstest]
#[tokio::test]
async fn compare_two_neighborhoods(server_context: ServerContext) {
    let request = CompareRequest {
        names: vec!["Лозенец".to_string(), "люлин".to_string()],
    };
    let output = handle_compare(&server_context, request).await.unwrap();
    check!(output.contains("| Критерий | Лозенец | Люлин |"), "{}", output);
    check!(output.contains("| Сигурност | 5.0 (excellent) | 1.0 (poor) |"), "{}", output);
    check!(output.contains("| Гласове | 2 | 1 |"));
}

#[rstest]
#[tokio::test]
async fn compare_rejects_bad_selections(server_context: ServerContext) {
    let one = CompareRequest {
        names: vec!["Лозенец".to_string()],
    };
    check!(handle_compare(&server_context, one).await.unwrap_err().contains("at least 2"));

    let unknown = CompareRequest {
        names: vec!["Лозенец".to_string(), "Лозенетс".to_string()],
    };
    let error = handle_compare(&server_context, unknown).await.unwrap_err();
    check!(error.contains("No ratings for 'Лозенетс'"));
    check!(error.contains("Did you mean 'Лозенец'?"));

    let four = CompareRequest {
        names: ["Лозенец", "Младост", "Люлин", "Лозенец"]
            .map(String::from)
            .to_vec(),
    };
    // the repeated name is ignored, so three columns fit
    check!(handle_compare(&server_context, four).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn compare_respects_configured_limit(sofia_snapshot: Vec<RatingRecord>) {
    let config = Config {
        comparison: ComparisonConfig { max_items: 2 },
        ..Config::default()
    };
    let context = context_with(config, sofia_snapshot);
    let request = CompareRequest {
        names: ["Лозенец", "Младост", "Люлин"].map(String::from).to_vec(),
    };
    let error = handle_compare(&context, request).await.unwrap_err();
    check!(error.contains("at most 2"));
}

#[rstest]
#[tokio::test]
async fn compare_needs_neighborhood_scope(server_context: ServerContext) {
    handle_set_scope(
        &server_context,
        SetScopeRequest {
            city: None,
            location_type: Some(LocationType::Shops),
        },
    )
    .await
    .unwrap();
    let request = CompareRequest {
        names: ["Фантастико", "Билла"].map(String::from).to_vec(),
    };
    check!(handle_compare(&server_context, request).await.unwrap_err().contains("Only neighborhoods"));
}

#[rstest]
#[tokio::test]
async fn rate_then_check_vote(server_context: ServerContext) {
    let partial = RateRequest {
        ratings: BTreeMap::from([("safety".to_string(), 5)]),
        clear: false,
    };
    let output = handle_rate(&server_context, partial).await.unwrap();
    check!(output.contains("• Сигурност: 5"));
    check!(output.contains("• Транспорт: -"));

    let request = CheckVoteRequest {
        place: Some("Витоша".to_string()),
        ..CheckVoteRequest::default()
    };
    let error = handle_check_vote(&server_context, request).await.unwrap_err();
    check!(error.contains("rate all 10 criteria or none of them (1 rated)"), "{}", error);

    let all: BTreeMap<String, u8> = LocationType::Neighborhood
        .criteria()
        .keys()
        .map(|k| (k.to_string(), 4))
        .collect();
    handle_rate(&server_context, RateRequest { ratings: all, clear: false })
        .await
        .unwrap();
    let request = CheckVoteRequest {
        place: Some("Витоша".to_string()),
        submitter_id: Some("u9".to_string()),
        timestamp: "2024-05-01T12:00:00Z".to_string(),
        ..CheckVoteRequest::default()
    };
    let output = handle_check_vote(&server_context, request).await.unwrap();
    check!(output.contains("Vote for 'Витоша' (neighborhood, София) is valid: 10 of 10 criteria rated."));
    check!(output.contains("\"neighborhood\": \"Витоша\""));
    check!(output.contains("\"userId\": \"u9\""));
}

#[rstest]
#[tokio::test]
async fn rate_rejects_unknown_criterion_without_changes(server_context: ServerContext) {
    let request = RateRequest {
        ratings: BTreeMap::from([("safety".to_string(), 3), ("parking".to_string(), 2)]),
        clear: false,
    };
    check!(handle_rate(&server_context, request).await.is_err());
    check!(server_context.state().read().await.draft_ratings()["safety"] == 0);
}

#[rstest]
#[tokio::test]
async fn check_vote_catches_duplicates_and_missing_fields(server_context: ServerContext) {
    let duplicate = CheckVoteRequest {
        place: Some("Лозенец".to_string()),
        opinion: "Много добро място за живеене".to_string(),
        submitter_id: Some("u1".to_string()),
        ..CheckVoteRequest::default()
    };
    let error = handle_check_vote(&server_context, duplicate).await.unwrap_err();
    check!(error.contains("already voted for neighborhood::София::Лозенец"), "{}", error);

    handle_set_scope(
        &server_context,
        SetScopeRequest {
            city: None,
            location_type: Some(LocationType::Doctors),
        },
    )
    .await
    .unwrap();
    let missing_specialty = CheckVoteRequest {
        doctor_name: Some("Д-р Георгиев".to_string()),
        ratings: BTreeMap::from([("overall".to_string(), 5)]),
        ..CheckVoteRequest::default()
    };
    let error = handle_check_vote(&server_context, missing_specialty).await.unwrap_err();
    check!(error.contains("missing required field 'specialty'"));

    let complete = CheckVoteRequest {
        doctor_name: Some("Д-р Георгиев".to_string()),
        specialty: Some("Невролог".to_string()),
        ratings: BTreeMap::from([("overall".to_string(), 5)]),
        ..CheckVoteRequest::default()
    };
    let output = handle_check_vote(&server_context, complete).await.unwrap();
    check!(output.contains("'Д-р Георгиев (Невролог)'"));
}

#[rstest]
#[tokio::test]
async fn reload_snapshot_replaces_records(snapshot_file: SnapshotFile) {
    let config = Config {
        snapshot: SnapshotConfig {
            path: Some(snapshot_file.path().to_path_buf()),
            ..SnapshotConfig::default()
        },
        ..Config::default()
    };
    let context = ServerContext::new(config);

    let output = handle_reload_snapshot(&context).await.unwrap();
    check!(output.starts_with("Loaded 10 records"));
    check!(output.contains("(generation 1)"));

    snapshot_file.write_raw("{ not json");
    let error = handle_reload_snapshot(&context).await.unwrap_err();
    check!(error.contains("previous one kept"));
    check!(context.state().read().await.snapshot().len() == 10);
    check!(context.state().read().await.generation() == 1);
}

#[tokio::test]
async fn reload_without_configured_file_fails() {
    let context = ServerContext::new(Config::default());
    let error = handle_reload_snapshot(&context).await.unwrap_err();
    check!(error.contains("No snapshot file configured"));
}
