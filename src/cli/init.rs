use std::path::PathBuf;

use crate::context::Context;
use crate::db::{get_connection, init_db, DB_FILE};
use crate::error::Result;
use crate::settings::{save_settings, shellexpand_path};

pub fn run(ctx: &Context, data_dir: Option<String>) -> Result<()> {
    let mut settings = ctx.settings.clone();
    if let Some(dir) = data_dir {
        let expanded = shellexpand_path(&dir);
        std::fs::create_dir_all(&expanded)?;
        settings.data_dir = shellexpand_path(&expanded);
    }

    let data_dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(data_dir.join("exports"))?;

    let db_path = data_dir.join(DB_FILE);
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    save_settings(&settings)?;

    log::info!("initialized database at {}", db_path.display());
    println!("Initialized kitboard at {}", data_dir.display());
    println!("Run `kitboard demo` to load sample data, or `kitboard import <file.json>`.");
    Ok(())
}
