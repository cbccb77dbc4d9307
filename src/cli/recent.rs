use comfy_table::{Cell, CellAlignment, Table};

use super::projects::status_cell;
use super::{enum_filter, no_results, print_footer, PageArgs};
use crate::context::Context;
use crate::error::Result;
use crate::filter::{filter_records, FilterSpec};
use crate::fmt::{amount, money};
use crate::models::{Record, RecordKind, RecordStatus};
use crate::pager::paginate;

pub struct RecentQuery {
    pub search: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub period: Option<String>,
}

pub fn run(ctx: &Context, query: RecentQuery, paging: &PageArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let spec = FilterSpec {
        search: query.search,
        kind: enum_filter(query.kind, RecordKind::ALL)?,
        status: enum_filter(query.status, RecordStatus::ALL)?,
        period: query.period,
        ..Default::default()
    };
    let filtered = filter_records(&store.list_records()?, &spec);
    if filtered.is_empty() {
        println!("{}", no_results(&spec));
        return Ok(());
    }

    let page = paginate(&filtered, paging.page, paging.size(ctx));
    println!("{}", format_records(page.items, ctx.base_currency()));
    print_footer(&page, &spec);
    Ok(())
}

/// Amount in its own currency; records without one are in `base`.
fn amount_text(r: &Record, base: &str) -> String {
    match (r.amount, r.currency.as_deref()) {
        (Some(value), Some(currency)) => format!("{} {currency}", amount(value)),
        (Some(value), None) => money(value, base),
        (None, _) => String::new(),
    }
}

pub fn format_records(records: &[Record], base: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Type", "Status", "Reference", "Name", "Amount"]);
    for r in records {
        table.add_row(vec![
            Cell::new(&r.date),
            Cell::new(r.kind),
            status_cell(r.status),
            Cell::new(&r.reference),
            Cell::new(&r.name),
            Cell::new(amount_text(r, base)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: Option<f64>, currency: Option<&str>) -> Record {
        Record {
            id: "DON-0001".into(),
            date: "2025-03-02".into(),
            kind: RecordKind::Donation,
            status: RecordStatus::Success,
            reference: "cs_424242".into(),
            name: "Amina Diallo".into(),
            amount,
            currency: currency.map(str::to_string),
            fx: None,
        }
    }

    #[test]
    fn test_amount_text() {
        assert_eq!(amount_text(&record(Some(1200.0), Some("EUR")), "USD"), "1,200.00 EUR");
        assert_eq!(amount_text(&record(Some(-5.0), Some("EUR")), "USD"), "-5.00 EUR");
        assert_eq!(amount_text(&record(Some(5.0), None), "USD"), "$5.00");
        assert_eq!(amount_text(&record(Some(5.0), None), "GBP"), "£5.00");
        assert_eq!(amount_text(&record(None, None), "USD"), "");
    }

    #[test]
    fn test_format_records() {
        colored::control::set_override(false);
        let out = format_records(&[record(Some(50.0), Some("USD"))], "USD");
        assert!(out.contains("donation"));
        assert!(out.contains("success"));
        assert!(out.contains("Amina Diallo"));
    }
}
