use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::context::Context;
use crate::error::Result;
use crate::fmt::{money, pct};
use crate::kpi::{Budget, ProjectKpis};
use crate::loader::{load_snapshot, ProjectSnapshot};
use crate::models::Milestone;

pub fn run(ctx: &Context, id: &str, budget: Option<f64>) -> Result<()> {
    let store = ctx.open_store()?;
    let snapshot = load_snapshot(store.as_ref(), id)?;
    let kpis = snapshot.kpis(budget, ctx.base_currency());
    println!("{}", format_project(&snapshot, snapshot.budget(budget), &kpis, ctx.base_currency()));
    Ok(())
}

pub fn format_kpis(kpis: &ProjectKpis, budget: Budget, base: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);

    let budget_label = if budget.is_placeholder() {
        format!("{} (placeholder)", money(kpis.total_budget, base))
    } else {
        money(kpis.total_budget, base)
    };
    let rows: Vec<(&str, String)> = vec![
        ("Budget", budget_label),
        ("Spent", money(kpis.spent, base)),
        ("Remaining", money(kpis.remaining(), base)),
        ("Execution", pct(kpis.execution_pct)),
        ("Admin spend", money(kpis.admin_spent, base)),
        ("Admin share", pct(kpis.admin_share_pct)),
        ("Reports validated", kpis.reports_valid.to_string()),
        ("Reports pending", kpis.reports_pending.to_string()),
        ("Beneficiaries", kpis.beneficiaries_total.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label.bold()), Cell::new(value)]);
    }
    table
}

fn format_milestones(milestones: &[Milestone]) -> String {
    if milestones.is_empty() {
        return "No milestones.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Due", "Milestone", "Done"]);
    for m in milestones {
        let done = if m.done { Cell::new("yes".green()) } else { Cell::new("no".yellow()) };
        table.add_row(vec![Cell::new(&m.due_date), Cell::new(&m.title), done]);
    }
    table.to_string()
}

pub fn format_project(snapshot: &ProjectSnapshot, budget: Budget, kpis: &ProjectKpis, base: &str) -> String {
    let p = &snapshot.project;
    format!(
        "{} {}\n{} | {} | started {} | {}\n\n{}\nAmounts in {base}\n\n{}\n{}",
        p.id.bold(),
        p.name.bold(),
        p.organisation,
        p.location,
        p.start_date,
        p.status,
        format_kpis(kpis, budget, base),
        "Milestones".bold(),
        format_milestones(&snapshot.milestones)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::demo_dataset;
    use crate::store::MemoryStore;

    fn snapshot(id: &str) -> ProjectSnapshot {
        let data = demo_dataset(chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        load_snapshot(&MemoryStore::new(data), id).unwrap()
    }

    #[test]
    fn test_placeholder_budget_is_labelled() {
        colored::control::set_override(false);
        let snap = snapshot("PRJ-002");
        let budget = snap.budget(None);
        assert!(budget.is_placeholder());
        let out = format_project(&snap, budget, &snap.kpis(None, "USD"), "USD");
        assert!(out.contains("(placeholder)"));
        assert!(out.contains("Milestones"));
    }

    #[test]
    fn test_explicit_budget_is_not_labelled() {
        colored::control::set_override(false);
        let snap = snapshot("PRJ-002");
        let budget = snap.budget(Some(50000.0));
        let out = format_project(&snap, budget, &snap.kpis(Some(50000.0), "USD"), "USD");
        assert!(!out.contains("(placeholder)"));
        assert!(out.contains("$50,000.00"));
    }

    #[test]
    fn test_draft_project_without_activity() {
        let snap = snapshot("PRJ-003");
        let k = snap.kpis(None, "USD");
        assert_eq!(k.spent, 0.0);
        assert_eq!(k.execution_pct, 0.0);
        assert_eq!(snap.milestones.len(), 1);
    }
}
