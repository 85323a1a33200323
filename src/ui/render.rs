// RegSift - ui/render.rs
//
// Plain-text rendering of the visible record set for the terminal.
// Two layouts: multi-line cards and one-line rows. The display cap is applied
// here; the query layer always hands over the full ordered set.

use crate::core::annotation::{AnnotationLookup, InteractionStatus};
use crate::core::discovery::DatasetEntry;
use crate::core::facets::Facets;
use crate::core::model::{FinancialField, Record};
use std::io::{self, Write};

/// Registry status text meaning "active" (shown as-is otherwise).
const ACTIVE_STATUS: &str = "Bolaget är aktivt";

/// Record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Cards,
    Rows,
}

// =============================================================================
// Formatting helpers
// =============================================================================

/// Whole kronor with space-grouped thousands: `1 250 000 kr`. Absent is `-`.
pub fn format_sek(amount: Option<f64>) -> String {
    let Some(value) = amount else {
        return "-".to_string();
    };
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{grouped} kr")
}

/// Compact kronor for row layout: `1,3 mn kr`, `850 tn kr`, `420 kr`.
pub fn format_sek_compact(amount: Option<f64>) -> String {
    let Some(value) = amount else {
        return "-".to_string();
    };
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, " md")
    } else if abs >= 1e6 {
        (value / 1e6, " mn")
    } else if abs >= 1e3 {
        (value / 1e3, " tn")
    } else {
        return format!("{value:.0} kr");
    };

    let text = if scaled.abs() >= 100.0 {
        format!("{scaled:.0}")
    } else {
        let one_decimal = format!("{scaled:.1}");
        one_decimal
            .strip_suffix(".0")
            .map(str::to_string)
            .unwrap_or(one_decimal)
            .replace('.', ",")
    };
    format!("{text}{suffix} kr")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn company_status(record: &Record) -> &str {
    match record.company.status.as_str() {
        ACTIVE_STATUS => "active",
        "" => "unknown",
        other => other,
    }
}

fn favorite_marker(is_favorite: bool) -> char {
    if is_favorite {
        '*'
    } else {
        ' '
    }
}

// =============================================================================
// Record rendering
// =============================================================================

/// Render `records` (already in display order), at most `max_rendered` of them,
/// followed by a notice when the list was truncated.
pub fn render_records<W: Write, A: AnnotationLookup + ?Sized>(
    out: &mut W,
    records: &[&Record],
    annotations: &A,
    layout: Layout,
    max_rendered: usize,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(out, "No companies match the current search and filters.")?;
        return Ok(());
    }

    let shown = records.len().min(max_rendered);
    for record in &records[..shown] {
        match layout {
            Layout::Cards => render_card(out, record, annotations)?,
            Layout::Rows => render_row(out, record, annotations)?,
        }
    }

    if shown < records.len() {
        writeln!(
            out,
            "\nShowing {shown} of {} companies. Narrow the search or filters to see the rest.",
            records.len()
        )?;
    } else {
        writeln!(out, "\n{} companies", records.len())?;
    }
    Ok(())
}

/// One line per record: favorite marker, name, org number, city, revenue,
/// net profit, interaction status.
pub fn render_row<W: Write, A: AnnotationLookup + ?Sized>(
    out: &mut W,
    record: &Record,
    annotations: &A,
) -> io::Result<()> {
    let annotation = annotations.annotation(record.org_number());
    let status = match annotation.status {
        InteractionStatus::None => String::new(),
        other => format!("  [{}]", other.label()),
    };
    writeln!(
        out,
        "{} {:<40} {:<13} {:<16} {:>12} {:>12}{status}",
        favorite_marker(annotation.is_favorite),
        record.name(),
        or_dash(record.org_number()),
        or_dash(&record.contact.city),
        format_sek_compact(record.financials.revenue),
        format_sek_compact(record.financials.net_profit),
    )
}

/// Multi-line card with every section of the record plus its annotation.
pub fn render_card<W: Write, A: AnnotationLookup + ?Sized>(
    out: &mut W,
    record: &Record,
    annotations: &A,
) -> io::Result<()> {
    let annotation = annotations.annotation(record.org_number());
    let company = &record.company;
    let contact = &record.contact;
    let industry = &record.industry;

    writeln!(
        out,
        "{}{} ({})",
        if annotation.is_favorite { "* " } else { "" },
        company.name,
        or_dash(&company.org_number)
    )?;
    writeln!(
        out,
        "  {} | {} | registered {}",
        or_dash(&company.legal_form),
        company_status(record),
        or_dash(&company.registration_date)
    )?;
    writeln!(
        out,
        "  Phone: {}  Address: {}, {} ({})",
        contact.phone.as_deref().unwrap_or("-"),
        or_dash(&contact.address),
        or_dash(&contact.city),
        or_dash(&contact.county)
    )?;

    writeln!(out, "  Financials ({}):", or_dash(&record.financials.period))?;
    for field in FinancialField::all() {
        writeln!(
            out,
            "    {:<32} {:>18}",
            field.label(),
            format_sek(field.value_of(record))
        )?;
    }

    writeln!(out, "  SNI {}", or_dash(&industry.sni_code))?;
    for line in record.sni_values() {
        writeln!(out, "    {line}")?;
    }
    let categories: Vec<&str> = record.category_values().collect();
    if !categories.is_empty() {
        writeln!(out, "  Categories: {}", categories.join(", "))?;
    }

    let tax = &record.tax_info;
    writeln!(
        out,
        "  F-skatt: {}  VAT: {}  Employer: {}",
        yes_no(tax.f_skatt),
        yes_no(tax.vat_registered),
        yes_no(tax.employer_registered)
    )?;

    if record.board.is_empty() {
        writeln!(out, "  Board: no data")?;
    } else {
        writeln!(out, "  Board:")?;
        for member in &record.board {
            let age = member
                .age
                .map(|a| format!(", {a} years"))
                .unwrap_or_default();
            let phone = member
                .phone
                .as_deref()
                .map(|p| format!("  tel {p}"))
                .unwrap_or_default();
            writeln!(out, "    {} ({}{age}){phone}", member.name, or_dash(&member.role))?;
        }
    }

    if !annotation.is_default() {
        writeln!(out, "  Status: {}", annotation.status.label())?;
        if !annotation.comment.is_empty() {
            writeln!(out, "  Comment: {}", annotation.comment)?;
        }
    }
    writeln!(out)
}

// =============================================================================
// Other listings
// =============================================================================

/// Facet vocabularies, one value per line under a heading.
pub fn render_facets<W: Write>(out: &mut W, facets: &Facets) -> io::Result<()> {
    writeln!(out, "SNI ({}):", facets.sni_values.len())?;
    for value in &facets.sni_values {
        writeln!(out, "  {value}")?;
    }
    writeln!(out, "Categories ({}):", facets.category_values.len())?;
    for value in &facets.category_values {
        writeln!(out, "  {value}")?;
    }
    Ok(())
}

/// Dataset registry: name, origin, source.
pub fn render_datasets<W: Write>(out: &mut W, entries: &[DatasetEntry]) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "No datasets registered.")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(
            out,
            "{:<24} {:<10} {}",
            entry.name,
            entry.origin.label(),
            entry.source
        )?;
    }
    Ok(())
}
