use std::path::PathBuf;

use crate::context::Context;
use crate::db::DB_FILE;
use crate::error::{KitboardError, Result};
use crate::settings::{save_settings, shellexpand_path};

pub fn run(ctx: &Context, path: &str) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));
    let db_path = resolved.join(DB_FILE);

    if !db_path.exists() {
        return Err(KitboardError::Settings(format!(
            "No database found at {}\nRun `kitboard init --data-dir {}` to create one.",
            db_path.display(),
            resolved.display()
        )));
    }

    let mut settings = ctx.settings.clone();
    settings.data_dir = resolved.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!("Switched to {}", resolved.display());
    Ok(())
}
