// RegSift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// Decoding is lenient: every sub-object defaults when absent, null or of the
// wrong type, and amounts accept numbers or numeric strings. The only hard shape
// requirement (a `company` object with a non-empty name) is enforced by the
// parser before a value ever reaches these types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Record (one business entity)
// =============================================================================

/// One company's full profile as loaded from a dataset.
///
/// `company.org_number` is the record identity: unique within a dataset and
/// stable across reloads, which is what lets annotations survive a reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub company: Company,

    #[serde(default, deserialize_with = "lenient_default")]
    pub contact: Contact,

    #[serde(default, deserialize_with = "lenient_default")]
    pub financials: Financials,

    #[serde(default, deserialize_with = "lenient_default")]
    pub industry: Industry,

    #[serde(default, deserialize_with = "lenient_default")]
    pub tax_info: TaxInfo,

    /// Board members in source order.
    #[serde(default, deserialize_with = "lenient_board")]
    pub board: Vec<BoardMember>,
}

impl Record {
    /// Record identity (organisation number).
    pub fn org_number(&self) -> &str {
        &self.company.org_number
    }

    /// Company display name.
    pub fn name(&self) -> &str {
        &self.company.name
    }

    /// True when the company itself lists a non-empty phone number.
    pub fn has_company_phone(&self) -> bool {
        self.contact.phone.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// True when at least one board member lists a non-empty phone number.
    pub fn has_board_phone(&self) -> bool {
        self.board
            .iter()
            .any(|m| m.phone.as_deref().is_some_and(|p| !p.is_empty()))
    }

    /// SNI description lines: split on newline, trimmed, blanks dropped.
    pub fn sni_values(&self) -> impl Iterator<Item = &str> {
        self.industry
            .sni_description
            .split('\n')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Category labels, trimmed, blanks dropped.
    pub fn category_values(&self) -> impl Iterator<Item = &str> {
        self.industry
            .categories
            .iter()
            .map(|c| c.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Company identity block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub org_number: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub legal_form: String,

    /// Free-text registry status (e.g. "Bolaget är aktivt").
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,

    /// Registration date as supplied; parsed only when sorting by date.
    #[serde(default, deserialize_with = "lenient_string")]
    pub registration_date: String,
}

/// Company contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub county: String,
}

/// Reported financial figures for one period.
///
/// Each amount is `None` when the company has not disclosed it. `None` is
/// never the same as zero, and a present amount is always finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    #[serde(default, deserialize_with = "lenient_string")]
    pub period: String,

    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub revenue: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub profit_after_financial_items: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub net_profit: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_assets: Option<f64>,
}

/// Industry classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub activity_description: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub sni_code: String,

    /// One or more SNI descriptions separated by newlines. Each line is an
    /// independent facet value.
    #[serde(default, deserialize_with = "lenient_string")]
    pub sni_description: String,

    #[serde(default, deserialize_with = "lenient_string_list")]
    pub categories: Vec<String>,
}

/// Swedish tax registration flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxInfo {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub f_skatt: bool,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub vat_registered: bool,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub employer_registered: bool,
}

/// One board member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardMember {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,

    #[serde(
        default,
        deserialize_with = "lenient_age",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<u32>,

    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient_default")]
    pub address: Address,
}

/// Postal address of a board member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "lenient_string")]
    pub street: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub postal_code: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
}

// =============================================================================
// Lenient field decoders
// =============================================================================

/// A sub-object that is `null` or of the wrong JSON type decodes as
/// `T::default()` instead of failing the whole record.
fn lenient_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Non-object board entries are skipped; a non-list decodes as empty.
fn lenient_board<'de, D>(deserializer: D) -> Result<Vec<BoardMember>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Strings pass through; numbers and booleans are stringified; anything else
/// (null, arrays, objects) becomes the empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Non-string list entries are skipped; a non-list decodes as empty.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    })
}

/// Numbers or numeric strings; everything else, and any non-finite result,
/// is treated as "not disclosed".
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_amount(&Value::deserialize(deserializer)?))
}

/// Extract a finite amount from a JSON value.
pub fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|v| v.is_finite())
}

fn lenient_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

// =============================================================================
// Financial field selector
// =============================================================================

/// The four disclosed amounts that range filters and sorting can target.
///
/// Field access goes through [`FinancialField::accessor`] rather than by name
/// so adding a field is a compile error until every match is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FinancialField {
    Revenue,
    ProfitAfterFinancialItems,
    NetProfit,
    TotalAssets,
}

impl FinancialField {
    /// All variants in display order.
    pub fn all() -> &'static [FinancialField] {
        &[
            FinancialField::Revenue,
            FinancialField::ProfitAfterFinancialItems,
            FinancialField::NetProfit,
            FinancialField::TotalAssets,
        ]
    }

    /// Extraction function for this field.
    pub fn accessor(self) -> fn(&Financials) -> Option<f64> {
        match self {
            FinancialField::Revenue => |f: &Financials| f.revenue,
            FinancialField::ProfitAfterFinancialItems => |f: &Financials| f.profit_after_financial_items,
            FinancialField::NetProfit => |f: &Financials| f.net_profit,
            FinancialField::TotalAssets => |f: &Financials| f.total_assets,
        }
    }

    /// The amount for this field on `record`, `None` when undisclosed.
    pub fn value_of(self, record: &Record) -> Option<f64> {
        (self.accessor())(&record.financials)
    }

    /// JSON / sort-key name of the field.
    pub fn key(self) -> &'static str {
        match self {
            FinancialField::Revenue => "revenue",
            FinancialField::ProfitAfterFinancialItems => "profit_after_financial_items",
            FinancialField::NetProfit => "net_profit",
            FinancialField::TotalAssets => "total_assets",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            FinancialField::Revenue => "Revenue",
            FinancialField::ProfitAfterFinancialItems => "Profit before tax",
            FinancialField::NetProfit => "Net profit",
            FinancialField::TotalAssets => "Total assets",
        }
    }

    /// Look up a field by its key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.key() == key)
    }
}

impl std::fmt::Display for FinancialField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sub_objects_default() {
        let record: Record = serde_json::from_str(r#"{"company":{"name":"Alfa AB"}}"#).unwrap();
        assert_eq!(record.name(), "Alfa AB");
        assert_eq!(record.financials.revenue, None);
        assert!(record.board.is_empty());
        assert!(!record.tax_info.f_skatt);
    }

    #[test]
    fn test_null_sub_objects_default() {
        let record: Record = serde_json::from_str(
            r#"{"company":{"name":"Alfa AB","status":null},"contact":null,"board":null}"#,
        )
        .unwrap();
        assert_eq!(record.company.status, "");
        assert_eq!(record.contact, Contact::default());
    }

    #[test]
    fn test_wrong_typed_sub_objects_default() {
        let record: Record = serde_json::from_str(
            r#"{"company":{"name":"A"},"contact":"okänd","industry":7,
                "board":[{"name":"Eva","address":"Storgatan 1"},"vakant",3]}"#,
        )
        .unwrap();
        assert_eq!(record.contact, Contact::default());
        assert_eq!(record.industry, Industry::default());
        assert_eq!(record.board.len(), 1);
        assert_eq!(record.board[0].name, "Eva");
        assert_eq!(record.board[0].address, Address::default());
    }

    #[test]
    fn test_amounts_absent_vs_zero() {
        let record: Record = serde_json::from_str(
            r#"{"company":{"name":"A"},"financials":{"revenue":0,"net_profit":null}}"#,
        )
        .unwrap();
        assert_eq!(record.financials.revenue, Some(0.0));
        assert_eq!(record.financials.net_profit, None);
    }

    #[test]
    fn test_amounts_numeric_strings_and_garbage() {
        let record: Record = serde_json::from_str(
            r#"{"company":{"name":"A"},"financials":{"revenue":" 1500 ","net_profit":"n/a","total_assets":"NaN"}}"#,
        )
        .unwrap();
        assert_eq!(record.financials.revenue, Some(1500.0));
        assert_eq!(record.financials.net_profit, None);
        assert_eq!(record.financials.total_assets, None, "NaN must never enter the model");
    }

    #[test]
    fn test_org_number_as_number_is_stringified() {
        let record: Record =
            serde_json::from_str(r#"{"company":{"name":"A","org_number":5566778899}}"#).unwrap();
        assert_eq!(record.org_number(), "5566778899");
    }

    #[test]
    fn test_phone_presence() {
        let mut record = Record::default();
        assert!(!record.has_company_phone());
        record.contact.phone = Some(String::new());
        assert!(!record.has_company_phone(), "empty phone counts as absent");
        record.contact.phone = Some("08-123 45".to_string());
        assert!(record.has_company_phone());

        assert!(!record.has_board_phone());
        record.board.push(BoardMember::default());
        record.board.push(BoardMember {
            phone: Some("070-1".to_string()),
            ..Default::default()
        });
        assert!(record.has_board_phone());
    }

    #[test]
    fn test_sni_values_split_and_trim() {
        let mut record = Record::default();
        record.industry.sni_description = " Bygg \n\nKonsult\n".to_string();
        let values: Vec<&str> = record.sni_values().collect();
        assert_eq!(values, vec!["Bygg", "Konsult"]);
    }

    #[test]
    fn test_financial_field_accessor_round_trip() {
        let record = Record {
            financials: Financials {
                revenue: Some(1.0),
                profit_after_financial_items: Some(2.0),
                net_profit: Some(3.0),
                total_assets: Some(4.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let values: Vec<Option<f64>> = FinancialField::all()
            .iter()
            .map(|f| f.value_of(&record))
            .collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(
            FinancialField::from_key("net_profit"),
            Some(FinancialField::NetProfit)
        );
        assert_eq!(FinancialField::from_key("profit"), None);
    }
}
