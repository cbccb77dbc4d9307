use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::{no_results, print_footer, PageArgs};
use crate::context::Context;
use crate::error::Result;
use crate::filter::{filter_records, sort_expenses, ExpenseSort, FilterSpec};
use crate::fmt::{amount, money};
use crate::kpi::to_base;
use crate::models::Expense;
use crate::pager::paginate;

pub struct ExpensesQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub period: Option<String>,
    pub sort: ExpenseSort,
}

pub fn run(ctx: &Context, project_id: &str, query: ExpensesQuery, paging: &PageArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let project = store.find_project(project_id)?;
    let base = ctx.base_currency();

    let spec = FilterSpec {
        search: query.search,
        kind: query.category,
        period: query.period,
        ..Default::default()
    };
    let mut filtered = filter_records(&store.list_project_expenses(&project.id)?, &spec);
    if filtered.is_empty() {
        println!("{}", no_results(&spec));
        return Ok(());
    }
    sort_expenses(&mut filtered, query.sort, base);

    let total: f64 = filtered.iter().map(|e| expense_base(e, base)).sum();
    let page = paginate(&filtered, paging.page, paging.size(ctx));

    println!("{} {}", project.id.bold(), project.name);
    println!("{}", format_expenses(page.items, base));
    println!("Total ({} rows): {}", filtered.len(), money(total, base).bold());
    print_footer(&page, &spec);
    Ok(())
}

fn expense_base(e: &Expense, base: &str) -> f64 {
    to_base(e.amount, &e.currency, Some(e.fx), base)
}

fn original_amount(e: &Expense) -> String {
    format!("{} {}", amount(e.amount), e.currency)
}

pub fn format_expenses(expenses: &[Expense], base: &str) -> String {
    let mut table = Table::new();
    let base_header = format!("Amount ({base})");
    table.set_header(vec!["Date", "ID", "Payee", "Category", "Original", base_header.as_str()]);
    for e in expenses {
        let category = if e.is_admin() {
            Cell::new(e.category.as_str().yellow())
        } else {
            Cell::new(&e.category)
        };
        table.add_row(vec![
            Cell::new(&e.date),
            Cell::new(&e.id),
            Cell::new(&e.payee),
            category,
            Cell::new(original_amount(e)).set_alignment(CellAlignment::Right),
            Cell::new(money(expense_base(e, base), base)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(amount: f64, currency: &str, fx: f64) -> Expense {
        Expense {
            id: "E1".into(),
            project_id: "PRJ-001".into(),
            activity_id: None,
            date: "2025-01-04".into(),
            payee: "Local pad workshop".into(),
            amount,
            currency: currency.into(),
            fx,
            category: "kits".into(),
        }
    }

    #[test]
    fn test_original_amount_keeps_currency() {
        assert_eq!(original_amount(&expense(310000.0, "KES", 0.0077)), "310,000.00 KES");
        assert_eq!(original_amount(&expense(-5.0, "EUR", 1.08)), "-5.00 EUR");
    }

    #[test]
    fn test_format_expenses_converts_to_base() {
        let out = format_expenses(&[expense(100.0, "EUR", 1.08)], "USD");
        assert!(out.contains("Amount (USD)"));
        assert!(out.contains("$108.00"));
        assert!(out.contains("100.00 EUR"));
    }

    #[test]
    fn test_base_column_uses_base_currency() {
        let out = format_expenses(&[expense(100.0, "USD", 0.92)], "EUR");
        assert!(out.contains("Amount (EUR)"));
        assert!(out.contains("€92.00"));
        assert!(!out.contains("$92.00"));
    }
}
