// RegSift - core/facets.rs
//
// Facet vocabularies for multi-select filters.
// Derived once per dataset load from the whole record set, never from the
// filtered view, so values hidden by the current filters stay selectable.

use crate::core::model::Record;
use std::collections::BTreeSet;

/// Distinct SNI description lines and category labels, each sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub sni_values: Vec<String>,
    pub category_values: Vec<String>,
}

impl Facets {
    pub fn is_empty(&self) -> bool {
        self.sni_values.is_empty() && self.category_values.is_empty()
    }
}

/// Collect the facet vocabularies across `records`.
pub fn extract_facets(records: &[Record]) -> Facets {
    let mut sni: BTreeSet<&str> = BTreeSet::new();
    let mut categories: BTreeSet<&str> = BTreeSet::new();

    for record in records {
        sni.extend(record.sni_values());
        categories.extend(record.category_values());
    }

    tracing::debug!(
        records = records.len(),
        sni_values = sni.len(),
        category_values = categories.len(),
        "Facets extracted"
    );

    Facets {
        sni_values: sni.into_iter().map(str::to_string).collect(),
        category_values: categories.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sni: &str, categories: &[&str]) -> Record {
        let mut r = Record::default();
        r.company.name = "X".to_string();
        r.industry.sni_description = sni.to_string();
        r.industry.categories = categories.iter().map(|c| (*c).to_string()).collect();
        r
    }

    #[test]
    fn test_sni_lines_deduplicated_and_sorted() {
        let records = vec![record("A\nB", &[]), record("B\nC", &[])];
        let facets = extract_facets(&records);
        assert_eq!(facets.sni_values, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_values_are_trimmed_and_blanks_dropped() {
        let records = vec![
            record("  Bygg \n \n", &[" IT ", "", "  "]),
            record("Bygg", &["IT", "Handel"]),
        ];
        let facets = extract_facets(&records);
        assert_eq!(facets.sni_values, vec!["Bygg"]);
        assert_eq!(facets.category_values, vec!["Handel", "IT"]);
    }

    #[test]
    fn test_empty_dataset() {
        let facets = extract_facets(&[]);
        assert!(facets.is_empty());
    }
}
