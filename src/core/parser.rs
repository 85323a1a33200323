// RegSift - core/parser.rs
//
// Tolerant dataset ingestion.
// Core layer: accepts already-read text, never touches the filesystem or
// network (the app layer handles reading).
//
// Two decode paths, tried in order, first success wins:
//   1. Whole-document: the entire text is one JSON value (array or object).
//   2. Line-delimited: only when (1) fails to decode at all, every non-blank
//      line is decoded as an independent record object.
// A whole-document decode that succeeds with zero valid records does NOT
// fall through to line mode.

use crate::core::model::Record;
use crate::util::constants;
use crate::util::error::IngestError;
use serde_json::Value;

/// Which decode path produced (or failed to produce) the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    WholeDocument,
    LineDelimited,
}

impl DecodeMode {
    pub fn label(&self) -> &'static str {
        match self {
            DecodeMode::WholeDocument => "whole-document",
            DecodeMode::LineDelimited => "line-delimited",
        }
    }
}

impl std::fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Records recovered by one decode path plus what had to be skipped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParseReport {
    /// Valid records in source order.
    pub records: Vec<Record>,
    /// Elements or lines that decoded as JSON but were not valid records.
    pub dropped_invalid: usize,
    /// Lines that were not decodable JSON (line mode only).
    pub malformed_lines: usize,
}

/// Tagged outcome of [`parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The whole text decoded as one JSON value and yielded at least one record.
    Whole(ParseReport),
    /// Whole-text decode failed; line-by-line decode yielded at least one record.
    Lines(ParseReport),
    /// No valid records from whichever path ran last.
    Failed { mode: DecodeMode, report: ParseReport },
}

impl IngestOutcome {
    /// True iff at least one record was recovered.
    pub fn ok(&self) -> bool {
        !matches!(self, IngestOutcome::Failed { .. })
    }

    /// Decode path that determined the outcome.
    pub fn mode(&self) -> DecodeMode {
        match self {
            IngestOutcome::Whole(_) => DecodeMode::WholeDocument,
            IngestOutcome::Lines(_) => DecodeMode::LineDelimited,
            IngestOutcome::Failed { mode, .. } => *mode,
        }
    }

    pub fn report(&self) -> &ParseReport {
        match self {
            IngestOutcome::Whole(r) | IngestOutcome::Lines(r) => r,
            IngestOutcome::Failed { report, .. } => report,
        }
    }

    /// Records, or a format error when none were recovered.
    ///
    /// A failed batch never yields a partial dataset.
    pub fn into_records(self) -> Result<Vec<Record>, IngestError> {
        match self {
            IngestOutcome::Whole(r) | IngestOutcome::Lines(r) => Ok(r.records),
            IngestOutcome::Failed { mode, report } => Err(IngestError::Format {
                mode: mode.label(),
                dropped_invalid: report.dropped_invalid,
                malformed_lines: report.malformed_lines,
            }),
        }
    }
}

/// Parse raw dataset text into records.
pub fn parse(raw: &str) -> IngestOutcome {
    let text = raw.strip_prefix(constants::UTF8_BOM).unwrap_or(raw);

    let (mode, report) = match serde_json::from_str::<Value>(text) {
        Ok(document) => (DecodeMode::WholeDocument, decode_document(document)),
        Err(e) => {
            tracing::debug!(
                error = %e,
                "Whole-document decode failed; falling back to line-delimited"
            );
            (DecodeMode::LineDelimited, decode_lines(text))
        }
    };

    tracing::debug!(
        mode = %mode,
        records = report.records.len(),
        dropped_invalid = report.dropped_invalid,
        malformed_lines = report.malformed_lines,
        "Ingestion finished"
    );

    match (mode, report.records.is_empty()) {
        (mode, true) => IngestOutcome::Failed { mode, report },
        (DecodeMode::WholeDocument, false) => IngestOutcome::Whole(report),
        (DecodeMode::LineDelimited, false) => IngestOutcome::Lines(report),
    }
}

/// Contract-shaped wrapper: `(records, ok)`.
pub fn parse_records(raw: &str) -> (Vec<Record>, bool) {
    let outcome = parse(raw);
    let ok = outcome.ok();
    let records = match outcome {
        IngestOutcome::Whole(r) | IngestOutcome::Lines(r) => r.records,
        IngestOutcome::Failed { .. } => Vec::new(),
    };
    (records, ok)
}

/// Minimal shape check: a `company` object carrying a non-empty `name` string.
pub fn is_valid_record_value(value: &Value) -> bool {
    value
        .get("company")
        .and_then(Value::as_object)
        .and_then(|company| company.get("name"))
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty())
}

/// Convert a decoded JSON value into a record, or `None` if it is not one.
fn record_from_value(value: Value) -> Option<Record> {
    if !is_valid_record_value(&value) {
        return None;
    }
    match serde_json::from_value::<Record>(value) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!(error = %e, "Record has the right shape but wrong field types");
            None
        }
    }
}

fn decode_document(document: Value) -> ParseReport {
    let mut report = ParseReport::default();
    match document {
        Value::Array(items) => {
            report.records.reserve(items.len());
            for item in items {
                match record_from_value(item) {
                    Some(record) => report.records.push(record),
                    None => report.dropped_invalid += 1,
                }
            }
        }
        other @ Value::Object(_) => match record_from_value(other) {
            Some(record) => report.records.push(record),
            None => report.dropped_invalid += 1,
        },
        // A bare string, number, bool or null decoded fine but is no dataset.
        _ => report.dropped_invalid += 1,
    }
    report
}

fn decode_lines(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (line_idx, line) in text.split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => match record_from_value(value) {
                Some(record) => report.records.push(record),
                None => report.dropped_invalid += 1,
            },
            Err(e) => {
                report.malformed_lines += 1;
                tracing::trace!(
                    line = line_idx + 1,
                    error = %e,
                    preview = %preview(line),
                    "Skipping malformed line"
                );
            }
        }
    }

    report
}

/// Truncated copy of a line for trace output.
fn preview(line: &str) -> String {
    line.chars().take(constants::DEBUG_MAX_LINE_PREVIEW).collect()
}
