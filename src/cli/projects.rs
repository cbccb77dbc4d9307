use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{enum_filter, no_results, print_footer, PageArgs};
use crate::context::Context;
use crate::error::Result;
use crate::filter::{filter_records, FilterSpec};
use crate::models::{Project, RecordStatus};
use crate::pager::paginate;

pub struct ProjectsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub organisation: Option<String>,
    pub country: Option<String>,
    pub year: Option<String>,
}

impl ProjectsQuery {
    pub fn spec(self) -> Result<FilterSpec> {
        Ok(FilterSpec {
            search: self.search,
            status: enum_filter(self.status, RecordStatus::ALL)?,
            organisation: self.organisation,
            country: self.country,
            year: self.year,
            ..Default::default()
        })
    }
}

pub fn run(ctx: &Context, query: ProjectsQuery, paging: &PageArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let spec = query.spec()?;
    let filtered = filter_records(&store.list_projects()?, &spec);

    if filtered.is_empty() {
        println!("{}", no_results(&spec));
        return Ok(());
    }

    let page = paginate(&filtered, paging.page, paging.size(ctx));
    println!("{}", format_projects(page.items));
    print_footer(&page, &spec);
    Ok(())
}

pub(crate) fn status_cell(status: RecordStatus) -> Cell {
    match status {
        RecordStatus::Active | RecordStatus::Success | RecordStatus::Validated => {
            Cell::new(status.as_str().green())
        }
        RecordStatus::Pending | RecordStatus::Submitted | RecordStatus::Draft => {
            Cell::new(status.as_str().yellow())
        }
        RecordStatus::Refunded | RecordStatus::Rejected => Cell::new(status.as_str().red()),
    }
}

pub fn format_projects(projects: &[Project]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Organisation", "Country", "Start", "Status"]);
    for p in projects {
        table.add_row(vec![
            Cell::new(&p.id),
            Cell::new(&p.name),
            Cell::new(&p.organisation),
            Cell::new(p.country()),
            Cell::new(&p.start_date),
            status_cell(p.status),
        ]);
    }
    table.to_string()
}
