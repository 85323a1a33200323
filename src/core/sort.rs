// RegSift - core/sort.rs
//
// Deterministic ordering of the filtered record set.
// No secondary key is applied: equal keys keep their input order because the
// orchestrator always uses a stable sort.

use crate::core::model::{FinancialField, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// What to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Company name, case-insensitive.
    Name,
    /// One of the disclosed amounts; undisclosed sorts lowest.
    Amount(FinancialField),
    /// Registration date; unparsable or missing sorts as the epoch.
    RegistrationDate,
}

impl SortKey {
    pub fn key(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Amount(field) => field.key(),
            SortKey::RegistrationDate => "date",
        }
    }

    /// Every supported key.
    pub fn all() -> Vec<SortKey> {
        let mut keys = vec![SortKey::Name];
        keys.extend(FinancialField::all().iter().copied().map(SortKey::Amount));
        keys.push(SortKey::RegistrationDate);
        keys
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(SortKey::Name),
            "date" => Some(SortKey::RegistrationDate),
            other => FinancialField::from_key(other).map(SortKey::Amount),
        }
    }
}

/// Ascending or descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn key(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Sort key plus direction, written as `"<key>-<direction>"` (e.g. `name-asc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::Name, SortDirection::Ascending)
    }
}

impl std::fmt::Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.key.key(), self.direction.key())
    }
}

impl std::str::FromStr for SortSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Field keys contain underscores, never hyphens, so the last hyphen
        // separates the direction.
        let (key, direction) = s
            .trim()
            .rsplit_once('-')
            .ok_or_else(|| format!("sort '{s}' must look like <key>-<asc|desc>"))?;
        let key = SortKey::from_key(key).ok_or_else(|| {
            let known: Vec<&str> = SortKey::all().iter().map(SortKey::key).collect();
            format!("unknown sort key '{key}' (expected one of {})", known.join(", "))
        })?;
        let direction = match direction {
            "asc" => SortDirection::Ascending,
            "desc" => SortDirection::Descending,
            other => return Err(format!("unknown sort direction '{other}' (expected asc or desc)")),
        };
        Ok(Self { key, direction })
    }
}

/// Compare two records under `spec`.
pub fn compare(a: &Record, b: &Record, spec: &SortSpec) -> Ordering {
    let ascending = match spec.key {
        SortKey::Name => a
            .company
            .name
            .to_lowercase()
            .cmp(&b.company.name.to_lowercase()),
        SortKey::Amount(field) => {
            let va = field.value_of(a).unwrap_or(f64::NEG_INFINITY);
            let vb = field.value_of(b).unwrap_or(f64::NEG_INFINITY);
            va.partial_cmp(&vb).unwrap_or(Ordering::Equal)
        }
        SortKey::RegistrationDate => registration_timestamp(a).cmp(&registration_timestamp(b)),
    };

    match spec.direction {
        SortDirection::Ascending => ascending,
        SortDirection::Descending => ascending.reverse(),
    }
}

/// Stable in-place sort of record indices.
pub fn sort_indices(indices: &mut [usize], records: &[Record], spec: &SortSpec) {
    indices.sort_by(|&a, &b| compare(&records[a], &records[b], spec));
}

/// Registration date in milliseconds since the Unix epoch; 0 when missing or
/// unparsable.
pub fn registration_timestamp(record: &Record) -> i64 {
    parse_date_millis(&record.company.registration_date).unwrap_or(0)
}

/// Parse the date formats seen in registry exports.
fn parse_date_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ndt.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Record {
        let mut r = Record::default();
        r.company.name = name.to_string();
        r
    }

    fn sorted_names(records: &[Record], spec: &str) -> Vec<String> {
        let spec: SortSpec = spec.parse().unwrap();
        let mut indices: Vec<usize> = (0..records.len()).collect();
        sort_indices(&mut indices, records, &spec);
        indices
            .into_iter()
            .map(|i| records[i].company.name.clone())
            .collect()
    }

    #[test]
    fn test_name_asc_case_insensitive() {
        let records = vec![named("Böta AB"), named("Alfa AB"), named("alfa bygg")];
        assert_eq!(
            sorted_names(&records, "name-asc"),
            vec!["Alfa AB", "alfa bygg", "Böta AB"]
        );
    }

    #[test]
    fn test_net_profit_desc_puts_undisclosed_last() {
        let mut loss = named("Loss");
        loss.financials.net_profit = Some(-50_000.0);
        let undisclosed = named("Undisclosed");
        let mut gain = named("Gain");
        gain.financials.net_profit = Some(10.0);
        let records = vec![undisclosed, loss, gain];
        assert_eq!(
            sorted_names(&records, "net_profit-desc"),
            vec!["Gain", "Loss", "Undisclosed"]
        );
        assert_eq!(
            sorted_names(&records, "net_profit-asc"),
            vec!["Undisclosed", "Loss", "Gain"]
        );
    }

    #[test]
    fn test_date_sort_unparsable_as_epoch() {
        let mut old = named("Old");
        old.company.registration_date = "1985-03-01".to_string();
        let mut new = named("New");
        new.company.registration_date = "2021-11-30T08:00:00Z".to_string();
        let mut junk = named("Junk");
        junk.company.registration_date = "okänt".to_string();
        let records = vec![new, junk, old];
        assert_eq!(
            sorted_names(&records, "date-asc"),
            vec!["Junk", "Old", "New"]
        );
    }

    #[test]
    fn test_pre_epoch_dates_sort_before_missing() {
        let mut ancient = named("Ancient");
        ancient.company.registration_date = "1901-01-01".to_string();
        let missing = named("Missing");
        let records = vec![missing, ancient];
        assert_eq!(
            sorted_names(&records, "date-asc"),
            vec!["Ancient", "Missing"]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut a = named("Same");
        a.company.org_number = "1".to_string();
        let mut b = named("SAME");
        b.company.org_number = "2".to_string();
        let records = vec![a, b];
        let spec: SortSpec = "name-desc".parse().unwrap();
        let mut indices = vec![0, 1];
        sort_indices(&mut indices, &records, &spec);
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_sort_spec_round_trip() {
        for key in SortKey::all() {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let spec = SortSpec::new(key, direction);
                assert_eq!(spec.to_string().parse::<SortSpec>(), Ok(spec));
            }
        }
        assert_eq!(
            "profit_after_financial_items-desc".parse::<SortSpec>(),
            Ok(SortSpec::new(
                SortKey::Amount(FinancialField::ProfitAfterFinancialItems),
                SortDirection::Descending
            ))
        );
    }

    #[test]
    fn test_sort_spec_rejects_garbage() {
        assert!("name".parse::<SortSpec>().is_err());
        assert!("size-asc".parse::<SortSpec>().is_err());
        assert!("name-up".parse::<SortSpec>().is_err());
    }
}
