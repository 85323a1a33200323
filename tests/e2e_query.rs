// RegSift - tests/e2e_query.rs
//
// End-to-end tests for the load -> facets -> search/filter/sort pipeline.
//
// These tests read real fixture files from disk, persist annotations through
// the real file-backed store, and write real export files. No mocks.

use regsift::app::annotations::AnnotationStore;
use regsift::app::loader::load_source;
use regsift::app::state::{AppState, LoadStatus};
use regsift::core::annotation::{AnnotationPatch, InteractionStatus};
use regsift::core::discovery::DatasetSource;
use regsift::core::export::{export_csv, export_json};
use regsift::core::facets::extract_facets;
use regsift::core::filter::FilterState;
use regsift::core::model::{FinancialField, Financials, Record};
use regsift::core::parser::{parse, parse_records, DecodeMode};
use regsift::core::query::{resolve, visible_records, Query};
use regsift::platform::fs::{FileKvStore, MemoryKvStore};
use regsift::platform::http::HttpClient;
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Helpers
// =============================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_records(name: &str) -> Vec<Record> {
    let text = fs::read_to_string(fixture(name)).expect("read fixture");
    parse(&text).into_records().expect("fixture should parse")
}

fn names<'a>(records: &'a [Record], indices: &[usize]) -> Vec<&'a str> {
    resolve(records, indices).iter().map(|r| r.name()).collect()
}

// =============================================================================
// Ingestion
// =============================================================================

#[test]
fn e2e_whole_document_fixture() {
    let text = fs::read_to_string(fixture("companies.json")).unwrap();
    let outcome = parse(&text);
    assert_eq!(outcome.mode(), DecodeMode::WholeDocument);
    assert_eq!(outcome.report().dropped_invalid, 2);

    let records = outcome.into_records().unwrap();
    let all: Vec<usize> = (0..records.len()).collect();
    assert_eq!(
        names(&records, &all),
        vec!["Norrsken Bygg AB", "Älvdalens Konsult HB", "Cesium Handel AB"]
    );

    // Lenient field decoding.
    let konsult = &records[1];
    assert_eq!(konsult.financials.revenue, Some(850_000.0));
    assert_eq!(konsult.board[0].age, Some(61));
    assert!(!konsult.has_company_phone());

    let cesium = &records[2];
    assert_eq!(cesium.financials, Financials::default());
    assert!(cesium.board.is_empty());
}

#[test]
fn e2e_line_delimited_fixture() {
    let text = fs::read_to_string(fixture("companies.jsonl")).unwrap();
    let outcome = parse(&text);
    assert_eq!(outcome.mode(), DecodeMode::LineDelimited);
    assert_eq!(outcome.report().malformed_lines, 1);
    assert_eq!(outcome.report().dropped_invalid, 1);

    let records = outcome.into_records().unwrap();
    let all: Vec<usize> = (0..records.len()).collect();
    assert_eq!(names(&records, &all), vec!["Rad Ett AB", "Rad Två AB", "Rad Tre AB"]);
}

#[test]
fn e2e_facets_from_fixture() {
    let facets = extract_facets(&fixture_records("companies.json"));
    assert_eq!(
        facets.sni_values,
        vec![
            "Byggande av bostadshus och andra byggnader",
            "Konsultverksamhet avseende företags organisation",
            "Renovering",
        ]
    );
    assert_eq!(facets.category_values, vec!["Bygg", "Hantverk", "IT", "Konsult"]);
}

// =============================================================================
// Query
// =============================================================================

#[test]
fn e2e_range_bounds_treat_undisclosed_asymmetrically() {
    let records = fixture_records("companies.json");
    let annotations = AnnotationStore::load(MemoryKvStore::new());

    let mut query = Query::default();
    query.filter.ranges.revenue.min = Some(1000.0);
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &query)),
        vec!["Norrsken Bygg AB", "Älvdalens Konsult HB"]
    );

    let mut query = Query::default();
    query.filter.ranges.get_mut(FinancialField::Revenue).max = Some(1_000_000.0);
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &query)),
        vec!["Cesium Handel AB", "Älvdalens Konsult HB"]
    );
}

#[test]
fn e2e_search_and_facet_selection() {
    let records = fixture_records("companies.json");
    let annotations = AnnotationStore::load(MemoryKvStore::new());

    let by_city = Query {
        search: "UMEÅ".to_string(),
        ..Default::default()
    };
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &by_city)),
        vec!["Norrsken Bygg AB"]
    );

    let by_org = Query {
        search: "969777".to_string(),
        ..Default::default()
    };
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &by_org)),
        vec!["Älvdalens Konsult HB"]
    );

    let mut by_sni = Query::default();
    by_sni.filter.sni.insert("Renovering".to_string());
    by_sni.filter.categories.insert("IT".to_string());
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &by_sni)),
        vec!["Älvdalens Konsult HB"]
    );
}

#[test]
fn e2e_sort_orders() {
    let records = fixture_records("companies.json");
    let annotations = AnnotationStore::load(MemoryKvStore::new());

    let by_name = Query::default();
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &by_name)),
        vec!["Cesium Handel AB", "Norrsken Bygg AB", "Älvdalens Konsult HB"]
    );

    let by_profit = Query {
        sort: "net_profit-desc".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &by_profit)),
        vec!["Norrsken Bygg AB", "Älvdalens Konsult HB", "Cesium Handel AB"]
    );

    let by_date = Query {
        sort: "date-desc".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &by_date)),
        vec!["Älvdalens Konsult HB", "Norrsken Bygg AB", "Cesium Handel AB"]
    );
}

// =============================================================================
// Annotations
// =============================================================================

#[test]
fn e2e_favorites_only_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = r#"[
        {"company": {"name": "Första AB", "org_number": "A"}},
        {"company": {"name": "Andra AB", "org_number": "B"}}
    ]"#;
    let (records, ok) = parse_records(dataset);
    assert!(ok);

    {
        let mut annotations = AnnotationStore::load(FileKvStore::new(dir.path()));
        assert!(annotations.toggle_favorite("B").unwrap());
        annotations
            .merge("B", &AnnotationPatch::comment("ring efter lunch"))
            .unwrap();
    }

    let annotations = AnnotationStore::load(FileKvStore::new(dir.path()));
    let b = annotations.get("B");
    assert!(b.is_favorite, "comment merge must not reset the favorite flag");
    assert_eq!(b.status, InteractionStatus::None);
    assert_eq!(b.comment, "ring efter lunch");

    let query = Query {
        filter: FilterState::favorites(),
        ..Default::default()
    };
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &query)),
        vec!["Andra AB"]
    );
}

#[test]
fn e2e_follow_ups_quick_filter() {
    let records = fixture_records("companies.json");
    let mut annotations = AnnotationStore::load(MemoryKvStore::new());
    annotations
        .merge("556123-4567", &AnnotationPatch::status(InteractionStatus::Callback))
        .unwrap();
    annotations
        .merge("559001-0001", &AnnotationPatch::status(InteractionStatus::NotInterested))
        .unwrap();

    let query = Query {
        filter: FilterState::follow_ups(),
        ..Default::default()
    };
    assert_eq!(
        names(&records, &visible_records(&records, &annotations, &query)),
        vec!["Norrsken Bygg AB"]
    );
}

// =============================================================================
// Loader, state and export
// =============================================================================

#[test]
fn e2e_state_loads_fixture_from_disk() {
    let annotations = AnnotationStore::load(MemoryKvStore::new());
    let http = HttpClient::default();
    let source = DatasetSource::File(fixture("companies.jsonl"));

    let mut state = AppState::new();
    let ticket = state.begin_load(&source);
    state.complete_load(ticket, load_source(&source, &http), &annotations);
    assert_eq!(state.status, LoadStatus::Loaded { count: 3 });

    state.query.filter.ranges.revenue.min = Some(1000.0);
    state.recompute(&annotations);
    let visible: Vec<&str> = state.visible_records().iter().map(|r| r.name()).collect();
    assert_eq!(visible, vec!["Rad Två AB"]);
}

#[test]
fn e2e_export_visible_set() {
    let dir = tempfile::tempdir().unwrap();
    let records = fixture_records("companies.json");
    let mut annotations = AnnotationStore::load(MemoryKvStore::new());
    annotations
        .merge("969777-1234", &AnnotationPatch::status(InteractionStatus::Interested))
        .unwrap();

    let query = Query {
        search: "a".to_string(),
        sort: "revenue-desc".parse().unwrap(),
        ..Default::default()
    };
    let indices = visible_records(&records, &annotations, &query);
    let visible = resolve(&records, &indices);

    let csv_path = dir.path().join("out.csv");
    let count = export_csv(
        &visible,
        &annotations,
        fs::File::create(&csv_path).unwrap(),
        &csv_path,
    )
    .unwrap();
    assert_eq!(count, visible.len());
    let csv_text = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_text.contains("969777-1234"));
    assert!(csv_text.contains("interested"));

    let json_path = dir.path().join("out.json");
    export_json(&visible, fs::File::create(&json_path).unwrap(), &json_path).unwrap();
    let reloaded = fixture_like(&json_path);
    let expected: Vec<Record> = visible.into_iter().cloned().collect();
    assert_eq!(reloaded, expected);
}

fn fixture_like(path: &Path) -> Vec<Record> {
    let text = fs::read_to_string(path).unwrap();
    parse(&text).into_records().unwrap()
}
