pub mod beneficiaries;
pub mod browse;
pub mod dashboard;
pub mod demo;
pub mod expenses;
pub mod import;
pub mod init;
pub mod load;
pub mod project;
pub mod projects;
pub mod recent;
pub mod status;

use std::fmt::Display;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::context::Context;
use crate::error::{KitboardError, Result};
use crate::filter::{ExpenseSort, FilterSpec};
use crate::pager::Page;

#[derive(Parser)]
#[command(
    name = "kitboard",
    version,
    about = "Program dashboard for menstrual-health kit projects: donations, expenses, reports and beneficiaries."
)]
pub struct Cli {
    /// Read from a JSON dataset file instead of the database
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Paging flags shared by every list command.
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number (1-based; out-of-range pages clamp to the last page)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (default: page_size from settings)
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,
}

impl PageArgs {
    pub fn size(&self, ctx: &Context) -> usize {
        self.page_size.unwrap_or_else(|| ctx.page_size())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up kitboard: choose a data directory and initialize the database.
    Init {
        /// Path for kitboard data (default: ~/Documents/kitboard)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Switch to an existing kitboard data directory.
    Load {
        /// Path to data directory containing kitboard.db
        path: String,
    },
    /// Load sample projects, donations, expenses and sessions to explore kitboard.
    Demo,
    /// Import a JSON dataset file.
    Import {
        /// Path to the dataset (.json)
        file: String,
    },
    /// Show current database (or the --dataset file) and summary statistics.
    Status,
    /// Headline KPIs across all projects.
    Dashboard {
        /// Month for the "this month" figures: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// List projects.
    Projects {
        /// Case-insensitive search over id and name
        #[arg(long)]
        search: Option<String>,
        /// Status, e.g. active, draft, pending
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        organisation: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// Start year: YYYY
        #[arg(long)]
        year: Option<String>,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Budget, spending, reports and milestones for one project.
    Project {
        /// Project ID
        id: String,
        /// Total budget to measure execution against (default: the project's budget)
        #[arg(long)]
        budget: Option<f64>,
    },
    /// List a project's expenses.
    Expenses {
        /// Project ID
        project: String,
        /// Search over id, payee and activity
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Date prefix: YYYY or YYYY-MM
        #[arg(long)]
        period: Option<String>,
        #[arg(long, value_enum, default_value_t = ExpenseSort::Date)]
        sort: ExpenseSort,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Donations, reports and project events, in the order they were stored.
    Recent {
        /// Search over reference, name and id
        #[arg(long)]
        search: Option<String>,
        /// Record type: donation, report, project
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Date prefix: YYYY or YYYY-MM
        #[arg(long)]
        period: Option<String>,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// List or export a project's beneficiary sessions.
    Beneficiaries {
        /// Project ID
        project: String,
        #[arg(long)]
        search: Option<String>,
        /// Session type: distribution, formation
        #[arg(long = "type")]
        kind: Option<String>,
        /// Date prefix: YYYY or YYYY-MM
        #[arg(long)]
        period: Option<String>,
        #[command(flatten)]
        paging: PageArgs,
        /// Write the filtered sessions to CSV instead of printing them
        #[arg(long)]
        export: bool,
        /// Export a single session by ID
        #[arg(long)]
        session: Option<String>,
        /// Output directory for exports (default: <data_dir>/exports)
        #[arg(long)]
        output: Option<String>,
    },
    /// Interactively browse projects.
    Browse,
}

// ---------------------------------------------------------------------------
// Shared output helpers
// ---------------------------------------------------------------------------

pub(crate) fn no_results(spec: &FilterSpec) -> String {
    if spec.is_empty() {
        "No results.".to_string()
    } else {
        format!("No results for {}.", spec.describe())
    }
}

/// `Rows 11-20 of 42 | Page 2/5 | status: active`
pub(crate) fn page_footer<T>(page: &Page<'_, T>, spec: &FilterSpec) -> String {
    let mut line = format!(
        "Rows {}-{} of {} | Page {}/{}",
        page.first_row(),
        page.last_row(),
        page.total_items,
        page.page,
        page.total_pages
    );
    if !spec.is_empty() {
        line.push_str(&format!(" | {}", spec.describe()));
    }
    line
}

pub(crate) fn print_footer<T>(page: &Page<'_, T>, spec: &FilterSpec) {
    println!("{}", page_footer(page, spec).dimmed());
    let mut hints = Vec::new();
    if page.has_prev() {
        hints.push(format!("previous: --page {}", page.page - 1));
    }
    if page.has_next() {
        hints.push(format!("next: --page {}", page.page + 1));
    }
    if !hints.is_empty() {
        println!("{}", hints.join("  ").dimmed());
    }
}

/// Check a typed filter value against a closed enum. `all` and empty pass
/// through as "no constraint".
pub(crate) fn enum_filter<T>(value: Option<String>, allowed: &[T]) -> Result<Option<String>>
where
    T: FromStr + Display,
{
    let Some(raw) = value else {
        return Ok(None);
    };
    let v = raw.trim().to_lowercase();
    if v.is_empty() || v == "all" {
        return Ok(None);
    }
    match v.parse::<T>() {
        Ok(parsed) => Ok(Some(parsed.to_string())),
        Err(_) => {
            let names: Vec<String> = allowed.iter().map(|a| a.to_string()).collect();
            Err(KitboardError::InvalidArgument(format!(
                "unknown value '{raw}', expected one of: all, {}",
                names.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager::paginate;

    #[test]
    fn test_page_footer() {
        let rows: Vec<u32> = (1..=42).collect();
        let page = paginate(&rows, 2, 10);
        let spec = FilterSpec {
            status: Some("active".into()),
            ..Default::default()
        };
        assert_eq!(
            page_footer(&page, &spec),
            "Rows 11-20 of 42 | Page 2/5 | status: active"
        );
        assert_eq!(
            page_footer(&page, &FilterSpec::default()),
            "Rows 11-20 of 42 | Page 2/5"
        );
    }

    #[test]
    fn test_no_results_mentions_filters() {
        let spec = FilterSpec {
            search: Some("zzz".into()),
            ..Default::default()
        };
        assert_eq!(no_results(&spec), "No results for search: \"zzz\".");
        assert_eq!(no_results(&FilterSpec::default()), "No results.");
    }

    #[test]
    fn test_cli_parses_paging_flags() {
        let cli = Cli::try_parse_from(["kitboard", "projects", "--page", "3", "--page-size", "5"]).unwrap();
        match cli.command {
            Some(Commands::Projects { paging, .. }) => {
                assert_eq!(paging.page, 3);
                assert_eq!(paging.page_size, Some(5));
            }
            _ => panic!("expected projects"),
        }
    }

    #[test]
    fn test_enum_filter() {
        use crate::models::RecordStatus;
        assert_eq!(
            enum_filter(Some(" Active ".into()), RecordStatus::ALL).unwrap().as_deref(),
            Some("active")
        );
        assert_eq!(enum_filter(Some("ALL".into()), RecordStatus::ALL).unwrap(), None);
        assert_eq!(enum_filter::<RecordStatus>(None, RecordStatus::ALL).unwrap(), None);
        let err = enum_filter(Some("archived".into()), RecordStatus::ALL).unwrap_err();
        assert!(err.to_string().contains("unknown value 'archived'"));
    }

    #[test]
    fn test_recent_help_describes_stored_order() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let recent = cmd.find_subcommand("recent").unwrap();
        let about = recent.get_about().unwrap().to_string();
        assert!(about.contains("order they were stored"));
        assert!(!about.contains("newest first"));
    }

    #[test]
    fn test_dataset_flag_is_global() {
        let cli = Cli::try_parse_from(["kitboard", "projects", "--dataset", "p.json"]).unwrap();
        assert_eq!(cli.dataset.as_deref(), Some("p.json"));
    }

    #[test]
    fn test_cli_parses_expense_sort() {
        let cli = Cli::try_parse_from(["kitboard", "expenses", "PRJ-001", "--sort", "amount"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Expenses { sort: ExpenseSort::Amount, .. })
        ));
    }
}
