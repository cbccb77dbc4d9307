use chrono::{Local, NaiveDate};
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::context::Context;
use crate::error::{KitboardError, Result};
use crate::fmt::{money, segment_bar, SEGMENT_GLYPHS};
use crate::kpi::{compute_dashboard_kpis, DashboardInput, DashboardKpis};

const BAR_WIDTH: usize = 40;
const SEGMENT_LABELS: [&str; 3] = ["Distribution", "Formation", "Other"];

/// Accept `YYYY-MM`, defaulting to the current month.
pub(crate) fn resolve_month(month: Option<&str>) -> Result<String> {
    match month {
        None => Ok(Local::now().format("%Y-%m").to_string()),
        Some(m) => {
            let m = m.trim();
            let invalid = || KitboardError::InvalidArgument(format!("month must be YYYY-MM, got {m}"));
            if m.len() != 7 {
                return Err(invalid());
            }
            NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d").map_err(|_| invalid())?;
            Ok(m.to_string())
        }
    }
}

pub fn run(ctx: &Context, month: Option<String>) -> Result<()> {
    let month = resolve_month(month.as_deref())?;
    let store = ctx.open_store()?;

    let projects = store.list_projects()?;
    let records = store.list_records()?;
    let expenses = store.list_all_expenses()?;
    let sessions = store.list_all_beneficiaries()?;
    let input = DashboardInput {
        projects: &projects,
        records: &records,
        expenses: &expenses,
        sessions: &sessions,
    };
    let kpis = compute_dashboard_kpis(&input, &month, ctx.base_currency());

    if !ctx.settings.organisation_name.is_empty() {
        println!("{}", ctx.settings.organisation_name.bold());
    }
    println!("{}", format_dashboard(&kpis, &month, ctx.base_currency()));
    Ok(())
}

pub fn format_dashboard(kpis: &DashboardKpis, month: &str, base: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["", month, "Total"]);
    table.add_row(vec![
        Cell::new("Active projects".bold()),
        Cell::new(""),
        Cell::new(kpis.active_projects),
    ]);
    table.add_row(vec![
        Cell::new("Collected".bold()),
        Cell::new(money(kpis.collected_this_month, base).green()),
        Cell::new(money(kpis.collected_total, base).green()),
    ]);
    table.add_row(vec![
        Cell::new("Spent".bold()),
        Cell::new(money(kpis.spent_this_month, base).red()),
        Cell::new(money(kpis.spent_total, base).red()),
    ]);
    table.add_row(vec![
        Cell::new("Beneficiaries".bold()),
        Cell::new(kpis.beneficiaries_this_month),
        Cell::new(kpis.beneficiaries_total),
    ]);

    let legend: Vec<String> = SEGMENT_LABELS
        .iter()
        .zip(kpis.distribution.iter())
        .zip(SEGMENT_GLYPHS.iter())
        .map(|((label, share), glyph)| format!("{glyph} {label} {share}%"))
        .collect();

    format!(
        "{table}\nAmounts in {base}\n\nSessions by type\n[{}]\n{}",
        segment_bar(&kpis.distribution, BAR_WIDTH),
        legend.join("  ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_month() {
        assert_eq!(resolve_month(Some("2025-03")).unwrap(), "2025-03");
        assert!(resolve_month(Some("2025-13")).is_err());
        assert!(resolve_month(Some("march")).is_err());
        assert_eq!(resolve_month(None).unwrap().len(), 7);
    }

    #[test]
    fn test_format_dashboard() {
        colored::control::set_override(false);
        let kpis = DashboardKpis {
            active_projects: 2,
            collected_this_month: 100.0,
            collected_total: 1320.5,
            spent_this_month: 30.0,
            spent_total: 100.0,
            beneficiaries_this_month: 10,
            beneficiaries_total: 20,
            distribution: [50, 50, 0],
        };
        let out = format_dashboard(&kpis, "2025-03", "USD");
        assert!(out.contains("2025-03"));
        assert!(out.contains("$1,320.50"));
        assert!(out.contains("Amounts in USD"));
        assert!(out.contains("Distribution 50%"));
        assert!(out.contains("Other 0%"));

        let eur = format_dashboard(&kpis, "2025-03", "EUR");
        assert!(eur.contains("€1,320.50"));
        assert!(!eur.contains('$'));
    }
}
