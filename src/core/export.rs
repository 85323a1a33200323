// RegSift - core/export.rs
//
// CSV and JSON export of the visible record set.
// Core layer: writes to any Write trait object; the path is only carried for
// error context.

use crate::core::annotation::AnnotationLookup;
use crate::core::model::Record;
use crate::util::constants::{EXPORT_LIST_SEPARATOR, MAX_EXPORT_RECORDS};
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

const CSV_HEADER: [&str; 18] = [
    "org_number",
    "name",
    "legal_form",
    "status",
    "registration_date",
    "phone",
    "city",
    "county",
    "period",
    "revenue",
    "profit_after_financial_items",
    "net_profit",
    "total_assets",
    "sni_code",
    "categories",
    "interaction_status",
    "favorite",
    "comment",
];

fn check_limit(count: usize) -> Result<(), ExportError> {
    if count > MAX_EXPORT_RECORDS {
        return Err(ExportError::TooManyRecords {
            count,
            max: MAX_EXPORT_RECORDS,
        });
    }
    Ok(())
}

fn amount_cell(amount: Option<f64>) -> String {
    amount.map(|v| v.to_string()).unwrap_or_default()
}

/// Export records to CSV, one row per record with its annotation flattened in.
pub fn export_csv<W: Write, A: AnnotationLookup + ?Sized>(
    records: &[&Record],
    annotations: &A,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_limit(records.len())?;

    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER).map_err(csv_err)?;

    let mut count = 0;
    for record in records {
        let annotation = annotations.annotation(record.org_number());
        let company = &record.company;
        let financials = &record.financials;
        let categories: Vec<&str> = record.category_values().collect();

        csv_writer
            .write_record([
                company.org_number.as_str(),
                company.name.as_str(),
                company.legal_form.as_str(),
                company.status.as_str(),
                company.registration_date.as_str(),
                record.contact.phone.as_deref().unwrap_or(""),
                record.contact.city.as_str(),
                record.contact.county.as_str(),
                financials.period.as_str(),
                &amount_cell(financials.revenue),
                &amount_cell(financials.profit_after_financial_items),
                &amount_cell(financials.net_profit),
                &amount_cell(financials.total_assets),
                record.industry.sni_code.as_str(),
                &categories.join(EXPORT_LIST_SEPARATOR),
                annotation.status.key(),
                if annotation.is_favorite { "yes" } else { "no" },
                annotation.comment.as_str(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %export_path.display(), records = count, "CSV export written");
    Ok(count)
}

/// Export records to JSON (array of record objects).
///
/// The output is a valid whole-document dataset and can be loaded again.
pub fn export_json<W: Write>(
    records: &[&Record],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_limit(records.len())?;
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %export_path.display(), records = records.len(), "JSON export written");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::{Annotation, InteractionStatus};
    use crate::core::parser::parse_records;
    use std::collections::HashMap;

    fn make_record(org: &str, name: &str) -> Record {
        let mut r = Record::default();
        r.company.org_number = org.to_string();
        r.company.name = name.to_string();
        r.financials.revenue = Some(1250.0);
        r.industry.categories = vec!["IT".to_string(), "Konsult".to_string()];
        r
    }

    #[test]
    fn test_csv_export() {
        let a = make_record("556001", "Alfa, Bygg & Co");
        let b = make_record("556002", "Beta AB");
        let mut annotations = HashMap::new();
        annotations.insert(
            "556002".to_string(),
            Annotation {
                status: InteractionStatus::Callback,
                comment: "ring".to_string(),
                is_favorite: true,
            },
        );

        let mut buf = Vec::new();
        let count =
            export_csv(&[&a, &b], &annotations, &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("org_number,name,"));
        assert!(output.contains("\"Alfa, Bygg & Co\""), "commas must be quoted");
        assert!(output.contains("IT; Konsult"));
        assert!(output.contains("callback,yes,ring"));
        assert!(output.contains("none,no,"));
    }

    #[test]
    fn test_json_export_is_reloadable() {
        let a = make_record("556001", "Alfa AB");
        let mut buf = Vec::new();
        let count = export_json(&[&a], &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 1);

        let text = String::from_utf8(buf).unwrap();
        let (records, ok) = parse_records(&text);
        assert!(ok);
        assert_eq!(records, vec![a]);
    }
}
