use std::path::Path;

use crate::context::Context;
use crate::dataset::read_dataset;
use crate::db::{find_import_by_checksum, insert_dataset};
use crate::error::{KitboardError, Result};

pub fn run(ctx: &Context, file: &str) -> Result<()> {
    let path = Path::new(file);
    let (data, checksum) = read_dataset(path)?;

    let mut conn = ctx.open_connection()?;
    if let Some(previous) = find_import_by_checksum(&conn, &checksum)? {
        return Err(KitboardError::AlreadyImported(previous));
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());
    let count = insert_dataset(&mut conn, &data, &filename, Some(&checksum))?;

    println!(
        "Imported {count} rows from {filename} ({} projects, {} expenses, {} sessions).",
        data.projects.len(),
        data.expenses.len(),
        data.beneficiary_sessions.len()
    );
    Ok(())
}
