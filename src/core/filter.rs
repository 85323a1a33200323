// RegSift - core/filter.rs
//
// Composable filter engine for company records.
// All filter dimensions are AND-combined; within a multi-select dimension the
// selected values are OR-combined, and an empty selection means "no
// constraint".
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::annotation::{Annotation, AnnotationLookup, InteractionStatus};
use crate::core::model::{FinancialField, Record};
use std::collections::HashSet;

// =============================================================================
// Filter building blocks
// =============================================================================

/// Any / yes / no selector over a boolean property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriState {
    #[default]
    Any,
    Yes,
    No,
}

impl TriState {
    /// Whether a record whose property is `present` passes this selector.
    pub fn admits(self, present: bool) -> bool {
        match self {
            TriState::Any => true,
            TriState::Yes => present,
            TriState::No => !present,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TriState::Any => "any",
            TriState::Yes => "yes",
            TriState::No => "no",
        }
    }
}

impl std::fmt::Display for TriState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TriState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "" => Ok(TriState::Any),
            "yes" | "y" | "true" => Ok(TriState::Yes),
            "no" | "n" | "false" => Ok(TriState::No),
            other => Err(format!("expected any, yes or no, got '{other}'")),
        }
    }
}

/// Inclusive numeric bounds over one disclosed amount. `None` = unbounded.
///
/// An undisclosed amount fails any `min` bound but is never excluded by a
/// `max` bound.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn admits(&self, amount: Option<f64>) -> bool {
        if let Some(min) = self.min {
            if amount.unwrap_or(f64::NEG_INFINITY) < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if amount.is_some_and(|v| v > max) {
                return false;
            }
        }
        true
    }
}

/// One range filter per [`FinancialField`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialRanges {
    pub revenue: RangeFilter,
    pub profit_after_financial_items: RangeFilter,
    pub net_profit: RangeFilter,
    pub total_assets: RangeFilter,
}

impl FinancialRanges {
    pub fn get(&self, field: FinancialField) -> &RangeFilter {
        match field {
            FinancialField::Revenue => &self.revenue,
            FinancialField::ProfitAfterFinancialItems => &self.profit_after_financial_items,
            FinancialField::NetProfit => &self.net_profit,
            FinancialField::TotalAssets => &self.total_assets,
        }
    }

    pub fn get_mut(&mut self, field: FinancialField) -> &mut RangeFilter {
        match field {
            FinancialField::Revenue => &mut self.revenue,
            FinancialField::ProfitAfterFinancialItems => &mut self.profit_after_financial_items,
            FinancialField::NetProfit => &mut self.net_profit,
            FinancialField::TotalAssets => &mut self.total_assets,
        }
    }

    pub fn is_empty(&self) -> bool {
        FinancialField::all().iter().all(|f| self.get(*f).is_empty())
    }
}

// =============================================================================
// Filter state
// =============================================================================

/// Complete filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Range bounds over the four disclosed amounts.
    pub ranges: FinancialRanges,

    /// Company lists a phone number.
    pub company_phone: TriState,

    /// At least one board member lists a phone number.
    pub board_phone: TriState,

    /// Registered for F-tax.
    pub f_skatt: TriState,

    /// Registered for VAT.
    pub vat_registered: TriState,

    /// Registered as an employer.
    pub employer_registered: TriState,

    /// SNI description lines to include (empty = all).
    pub sni: HashSet<String>,

    /// Category labels to include (empty = all).
    pub categories: HashSet<String>,

    /// Annotation statuses to include (empty = all).
    pub statuses: HashSet<InteractionStatus>,

    /// Only records marked as favorites.
    pub favorites_only: bool,
}

impl FilterState {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of active filter dimensions (for a "filters (3)" badge).
    pub fn active_count(&self) -> usize {
        let ranges = FinancialField::all()
            .iter()
            .filter(|f| !self.ranges.get(**f).is_empty())
            .count();
        let tri_states = [
            self.company_phone,
            self.board_phone,
            self.f_skatt,
            self.vat_registered,
            self.employer_registered,
        ]
        .iter()
        .filter(|t| **t != TriState::Any)
        .count();
        let selections = [
            !self.sni.is_empty(),
            !self.categories.is_empty(),
            !self.statuses.is_empty(),
            self.favorites_only,
        ]
        .iter()
        .filter(|active| **active)
        .count();
        ranges + tri_states + selections
    }

    /// Clear every filter dimension.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Create a quick-filter for favorites only.
    pub fn favorites() -> Self {
        Self {
            favorites_only: true,
            ..Default::default()
        }
    }

    /// Create a quick-filter for companies awaiting follow-up.
    pub fn follow_ups() -> Self {
        let mut statuses = HashSet::new();
        statuses.insert(InteractionStatus::Interested);
        statuses.insert(InteractionStatus::Callback);
        Self {
            statuses,
            ..Default::default()
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Decide whether `record` (with its `annotation`) passes `filter` and the
/// free-text `search_term`.
pub fn matches(
    record: &Record,
    annotation: &Annotation,
    filter: &FilterState,
    search_term: &str,
) -> bool {
    matches_search(record, &search_term.to_lowercase()) && matches_all(record, annotation, filter)
}

/// Apply search and filters to a slice of records, returning indices of
/// matching records in their original order.
///
/// Returns indices into `records` rather than copies so callers can keep a
/// single owned dataset and re-run the pass on every input change.
pub fn apply_filters<A: AnnotationLookup + ?Sized>(
    records: &[Record],
    annotations: &A,
    filter: &FilterState,
    search_term: &str,
) -> Vec<usize> {
    let term_lower = search_term.to_lowercase();

    if filter.is_empty() && term_lower.is_empty() {
        return (0..records.len()).collect();
    }

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            matches_search(record, &term_lower)
                && matches_all(record, annotations.annotation(record.org_number()), filter)
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Case-insensitive substring search over name, org number, and city.
/// `term_lower` must already be lowercased; empty matches everything.
fn matches_search(record: &Record, term_lower: &str) -> bool {
    if term_lower.is_empty() {
        return true;
    }
    record.company.name.to_lowercase().contains(term_lower)
        || record.company.org_number.contains(term_lower)
        || record.contact.city.to_lowercase().contains(term_lower)
}

/// Check a record against every filter dimension.
fn matches_all(record: &Record, annotation: &Annotation, filter: &FilterState) -> bool {
    // Financial ranges
    for field in FinancialField::all() {
        if !filter.ranges.get(*field).admits(field.value_of(record)) {
            return false;
        }
    }

    // Phone presence
    if !filter.company_phone.admits(record.has_company_phone()) {
        return false;
    }
    if !filter.board_phone.admits(record.has_board_phone()) {
        return false;
    }

    // Tax registrations
    let tax = &record.tax_info;
    if !filter.f_skatt.admits(tax.f_skatt)
        || !filter.vat_registered.admits(tax.vat_registered)
        || !filter.employer_registered.admits(tax.employer_registered)
    {
        return false;
    }

    // Multi-select facets
    if !filter.sni.is_empty() && !record.sni_values().any(|v| filter.sni.contains(v)) {
        return false;
    }
    if !filter.categories.is_empty()
        && !record.category_values().any(|v| filter.categories.contains(v))
    {
        return false;
    }

    // Annotation overlay
    if !filter.statuses.is_empty() && !filter.statuses.contains(&annotation.status) {
        return false;
    }
    if filter.favorites_only && !annotation.is_favorite {
        return false;
    }

    true
}
