use rusqlite::{Connection, OptionalExtension};

use std::path::Path;

use crate::context::Context;
use crate::dataset::{read_dataset, Dataset};
use crate::db::get_connection;
use crate::error::Result;

const COUNTED_TABLES: &[(&str, &str)] = &[
    ("Projects:", "projects"),
    ("Records:", "records"),
    ("Activities:", "activities"),
    ("Expenses:", "expenses"),
    ("Reports:", "reports"),
    ("Sessions:", "beneficiary_sessions"),
    ("Milestones:", "milestones"),
];

fn count(conn: &Connection, table: &str) -> Result<i64> {
    Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?)
}

/// Row counts of an in-memory dataset, in the same order as `COUNTED_TABLES`.
fn dataset_counts(data: &Dataset) -> [usize; 7] {
    [
        data.projects.len(),
        data.records.len(),
        data.activities.len(),
        data.expenses.len(),
        data.reports.len(),
        data.beneficiary_sessions.len(),
        data.milestones.len(),
    ]
}

fn run_dataset(path: &Path) -> Result<()> {
    let (data, checksum) = read_dataset(path)?;
    println!("Dataset:      {}", path.display());
    println!("Checksum:     {checksum}");
    println!();
    for ((label, _), n) in COUNTED_TABLES.iter().zip(dataset_counts(&data)) {
        println!("{label:<14}{n}");
    }
    Ok(())
}

pub fn run(ctx: &Context) -> Result<()> {
    let settings = &ctx.settings;
    let db_path = ctx.db_path();

    if let Some(ref path) = ctx.dataset {
        return run_dataset(path);
    }

    println!(
        "Organisation: {}",
        if settings.organisation_name.is_empty() { "(not set)" } else { &settings.organisation_name }
    );
    println!("Data dir:     {}", ctx.data_dir().display());
    println!("Database:     {}", db_path.display());
    println!("Currency:     {}", settings.base_currency);
    println!("Page size:    {}", settings.page_size);

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `kitboard init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    println!();
    for (label, table) in COUNTED_TABLES {
        println!("{label:<14}{}", count(&conn, table)?);
    }

    let imports: i64 = count(&conn, "imports")?;
    let last: Option<String> = conn
        .query_row(
            "SELECT filename FROM imports ORDER BY id DESC LIMIT 1",
            [],
            |r| r.get(0),
        )
        .optional()?;
    println!();
    match last {
        Some(name) => println!("Imports:      {imports} (last: {name})"),
        None => println!("Imports:      {imports}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::demo_dataset;

    #[test]
    fn test_dataset_counts_follow_table_order() {
        let data = demo_dataset(chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        let counts = dataset_counts(&data);
        assert_eq!(counts.len(), COUNTED_TABLES.len());
        assert_eq!(counts[0], data.projects.len());
        assert_eq!(counts[5], data.beneficiary_sessions.len());
        assert_eq!(counts.iter().sum::<usize>(), data.row_count());
    }
}
