use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::{no_results, print_footer, PageArgs};
use crate::context::Context;
use crate::error::{KitboardError, Result};
use crate::export::{export_beneficiaries, export_file_name};
use crate::filter::{filter_records, FilterSpec};
use crate::models::BeneficiarySession;
use crate::pager::paginate;
use crate::settings::shellexpand_path;

pub struct BeneficiariesQuery {
    pub search: Option<String>,
    pub kind: Option<String>,
    pub period: Option<String>,
}

pub struct ExportArgs {
    pub export: bool,
    pub session: Option<String>,
    pub output: Option<String>,
}

fn output_dir(ctx: &Context, output: Option<&str>) -> PathBuf {
    match output {
        Some(dir) => PathBuf::from(shellexpand_path(dir)),
        None => ctx.data_dir().join("exports"),
    }
}

pub fn run(
    ctx: &Context,
    project_id: &str,
    query: BeneficiariesQuery,
    paging: &PageArgs,
    export: ExportArgs,
) -> Result<()> {
    let store = ctx.open_store()?;
    let project = store.find_project(project_id)?;
    let sessions = store.list_beneficiaries(&project.id)?;

    if let Some(ref session_id) = export.session {
        let session = sessions
            .iter()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| KitboardError::UnknownSession(session_id.clone()))?;
        let name = export_file_name(&project.id, Some(session));
        let dir = output_dir(ctx, export.output.as_deref());
        let path = export_beneficiaries(&dir, &name, std::slice::from_ref(session))?;
        println!("Exported session {} to {}", session.id, path.display());
        return Ok(());
    }

    let spec = FilterSpec {
        search: query.search,
        kind: query.kind,
        period: query.period,
        ..Default::default()
    };
    let filtered = filter_records(&sessions, &spec);

    if export.export {
        // Always the whole filtered set, never just the visible page.
        let name = export_file_name(&project.id, None);
        let dir = output_dir(ctx, export.output.as_deref());
        let path = export_beneficiaries(&dir, &name, &filtered)?;
        println!("Exported {} sessions to {}", filtered.len(), path.display());
        return Ok(());
    }

    if filtered.is_empty() {
        println!("{}", no_results(&spec));
        return Ok(());
    }

    let females: u64 = filtered.iter().map(|s| s.females as u64).sum();
    let males: u64 = filtered.iter().map(|s| s.males as u64).sum();
    let page = paginate(&filtered, paging.page, paging.size(ctx));

    println!("{} {}", project.id.bold(), project.name);
    println!("{}", format_sessions(page.items));
    println!(
        "Total ({} sessions): {} beneficiaries ({females} female, {males} male)",
        filtered.len(),
        (females + males).to_string().bold()
    );
    print_footer(&page, &spec);
    Ok(())
}

pub fn format_sessions(sessions: &[BeneficiarySession]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Session", "Type", "Females", "Males", "Total", "File"]);
    for s in sessions {
        let kind = if s.session_type.trim().is_empty() {
            Cell::new("\u{2014}")
        } else {
            Cell::new(&s.session_type)
        };
        table.add_row(vec![
            Cell::new(&s.date),
            Cell::new(&s.id),
            kind,
            Cell::new(s.females).set_alignment(CellAlignment::Right),
            Cell::new(s.males).set_alignment(CellAlignment::Right),
            Cell::new(s.total()).set_alignment(CellAlignment::Right),
            Cell::new(s.file.as_deref().unwrap_or("")),
        ]);
    }
    table.to_string()
}
