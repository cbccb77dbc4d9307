use chrono::Local;

use crate::context::Context;
use crate::dataset::demo_dataset;
use crate::db::insert_dataset;
use crate::error::{KitboardError, Result};

pub fn run(ctx: &Context) -> Result<()> {
    let mut conn = ctx.open_connection()?;

    let existing: i64 = conn.query_row("SELECT count(*) FROM projects", [], |r| r.get(0))?;
    if existing > 0 {
        return Err(KitboardError::Other(
            "Database already has projects. Demo data is only loaded into an empty database.".to_string(),
        ));
    }

    let data = demo_dataset(Local::now().date_naive());
    insert_dataset(&mut conn, &data, "demo", None)?;

    println!(
        "Loaded demo data: {} projects, {} records, {} expenses, {} beneficiary sessions.",
        data.projects.len(),
        data.records.len(),
        data.expenses.len(),
        data.beneficiary_sessions.len()
    );
    println!("Try `kitboard dashboard` or `kitboard projects`.");
    Ok(())
}
