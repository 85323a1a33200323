// RegSift - app/state.rs
//
// Application state: the loaded dataset, its facets, the current query and
// the visible index list derived from them.
//
// Loads are two-phase. `begin_load` issues a ticket; `complete_load` applies
// a result only if its ticket is the newest one issued, so a slow earlier
// fetch can never overwrite a later one.

use crate::core::annotation::AnnotationLookup;
use crate::core::discovery::DatasetSource;
use crate::core::facets::{extract_facets, Facets};
use crate::core::model::Record;
use crate::core::parser::parse;
use crate::core::query::{resolve, visible_records, Query};
use crate::util::error::ReadError;

/// Identifies one load request. Later requests carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// What the front end should show about the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet.
    Waiting,
    /// A load is outstanding; the visible set is empty.
    Reading { source: String },
    /// The dataset holds `count` records.
    Loaded { count: usize },
    /// The payload was read but contained no valid records; dataset empty.
    FormatError { message: String },
    /// The payload could not be read; the previous records are kept.
    ReadError { message: String },
}

impl LoadStatus {
    pub fn is_reading(&self) -> bool {
        matches!(self, LoadStatus::Reading { .. })
    }
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Current dataset, in source order. Never mutated by queries.
    pub records: Vec<Record>,

    /// Facet vocabularies of `records`.
    pub facets: Facets,

    /// Search, filter and sort currently applied.
    pub query: Query,

    /// Indices into `records` of the visible set, in display order.
    pub visible: Vec<usize>,

    pub status: LoadStatus,

    latest_ticket: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            facets: Facets::default(),
            query: Query::default(),
            visible: Vec::new(),
            status: LoadStatus::Waiting,
            latest_ticket: 0,
        }
    }

    /// Start loading `source`.
    ///
    /// Filter and search reset; the sort is kept. Until completion the
    /// visible set is empty.
    pub fn begin_load(&mut self, source: &DatasetSource) -> LoadTicket {
        self.latest_ticket += 1;
        let ticket = LoadTicket(self.latest_ticket);

        self.query.filter.reset();
        self.query.search.clear();
        self.visible.clear();
        self.status = LoadStatus::Reading {
            source: source.to_string(),
        };

        tracing::info!(source = %source, ticket = ticket.0, "Dataset load started");
        ticket
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// Returns false, changing nothing, when a newer load has been started.
    pub fn complete_load<A: AnnotationLookup + ?Sized>(
        &mut self,
        ticket: LoadTicket,
        result: Result<String, ReadError>,
        annotations: &A,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Stale dataset load discarded"
            );
            return false;
        }

        match result {
            Ok(text) => match parse(&text).into_records() {
                Ok(records) => {
                    tracing::info!(records = records.len(), "Dataset loaded");
                    self.facets = extract_facets(&records);
                    self.status = LoadStatus::Loaded {
                        count: records.len(),
                    };
                    self.records = records;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Dataset rejected");
                    self.records.clear();
                    self.facets = Facets::default();
                    self.status = LoadStatus::FormatError {
                        message: e.to_string(),
                    };
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Dataset read failed");
                self.status = LoadStatus::ReadError {
                    message: e.to_string(),
                };
            }
        }

        self.recompute(annotations);
        true
    }

    /// Load already-read text in one step.
    pub fn load_text<A: AnnotationLookup + ?Sized>(
        &mut self,
        source: &DatasetSource,
        text: String,
        annotations: &A,
    ) {
        let ticket = self.begin_load(source);
        self.complete_load(ticket, Ok(text), annotations);
    }

    /// Re-derive the visible set. Call after any query or annotation change.
    pub fn recompute<A: AnnotationLookup + ?Sized>(&mut self, annotations: &A) {
        if self.status.is_reading() {
            self.visible.clear();
            return;
        }
        self.visible = visible_records(&self.records, annotations, &self.query);
    }

    /// Visible records in display order.
    pub fn visible_records(&self) -> Vec<&Record> {
        resolve(&self.records, &self.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::Annotation;
    use crate::core::sort::SortSpec;
    use std::collections::HashMap;
    use std::path::PathBuf;

    const TWO: &str = r#"[
        {"company": {"name": "Beta AB", "org_number": "2"}},
        {"company": {"name": "Alfa AB", "org_number": "1"}}
    ]"#;

    fn source() -> DatasetSource {
        DatasetSource::File(PathBuf::from("test.json"))
    }

    fn no_annotations() -> HashMap<String, Annotation> {
        HashMap::new()
    }

    #[test]
    fn test_load_and_recompute() {
        let mut state = AppState::new();
        state.load_text(&source(), TWO.to_string(), &no_annotations());
        assert_eq!(state.status, LoadStatus::Loaded { count: 2 });
        let names: Vec<&str> = state.visible_records().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Alfa AB", "Beta AB"]);
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut state = AppState::new();
        let first = state.begin_load(&source());
        let second = state.begin_load(&source());
        assert!(second > first);

        assert!(state.complete_load(second, Ok(TWO.to_string()), &no_annotations()));
        let applied = state.complete_load(
            first,
            Ok(r#"{"company": {"name": "Gammal AB"}}"#.to_string()),
            &no_annotations(),
        );
        assert!(!applied);
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn test_new_load_resets_filter_keeps_sort() {
        let mut state = AppState::new();
        state.load_text(&source(), TWO.to_string(), &no_annotations());
        state.query.search = "alfa".to_string();
        state.query.filter.favorites_only = true;
        state.query.sort = "name-desc".parse::<SortSpec>().unwrap();

        let ticket = state.begin_load(&source());
        assert!(state.visible.is_empty());
        assert!(state.query.search.is_empty());
        assert!(state.query.filter.is_empty());
        assert_eq!(state.query.sort.to_string(), "name-desc");

        state.complete_load(ticket, Ok(TWO.to_string()), &no_annotations());
        assert_eq!(state.visible, vec![0, 1]);
    }

    #[test]
    fn test_format_error_empties_dataset() {
        let mut state = AppState::new();
        state.load_text(&source(), TWO.to_string(), &no_annotations());
        state.load_text(&source(), "not json\nstill not".to_string(), &no_annotations());
        assert!(matches!(state.status, LoadStatus::FormatError { .. }));
        assert!(state.records.is_empty());
        assert!(state.facets.is_empty());
        assert!(state.visible.is_empty());
    }

    #[test]
    fn test_read_error_keeps_records() {
        let mut state = AppState::new();
        state.load_text(&source(), TWO.to_string(), &no_annotations());
        let ticket = state.begin_load(&source());
        let err = ReadError::File {
            path: PathBuf::from("gone.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        state.complete_load(ticket, Err(err), &no_annotations());
        assert!(matches!(state.status, LoadStatus::ReadError { .. }));
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.visible.len(), 2);
    }
}
