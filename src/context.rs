use std::path::PathBuf;
use std::sync::Arc;

use crate::dataset::read_dataset;
use crate::db::{get_connection, init_db, SqliteStore, DB_FILE};
use crate::error::{KitboardError, Result};
use crate::loader::SharedStore;
use crate::settings::{load_settings, Settings};
use crate::store::MemoryStore;

/// Settings resolved once at startup and handed to every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    /// Read from this JSON dataset instead of the database.
    pub dataset: Option<PathBuf>,
}

impl Context {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            dataset: None,
        }
    }

    pub fn with_dataset(mut self, dataset: Option<PathBuf>) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn load() -> Self {
        Self::new(load_settings())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.settings.data_dir)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(DB_FILE)
    }

    pub fn base_currency(&self) -> &str {
        &self.settings.base_currency
    }

    pub fn page_size(&self) -> usize {
        self.settings.page_size
    }

    fn require_db(&self) -> Result<PathBuf> {
        let path = self.db_path();
        if !path.exists() {
            return Err(KitboardError::Other(format!(
                "No database at {}. Run `kitboard init` first.",
                path.display()
            )));
        }
        Ok(path)
    }

    /// Open the database for writing, making sure the schema exists.
    pub fn open_connection(&self) -> Result<rusqlite::Connection> {
        let conn = get_connection(&self.require_db()?)?;
        init_db(&conn)?;
        Ok(conn)
    }

    pub fn open_store(&self) -> Result<SharedStore> {
        if let Some(ref path) = self.dataset {
            let (data, _) = read_dataset(path)?;
            log::info!("reading {} rows from {}", data.row_count(), path.display());
            return Ok(Arc::new(MemoryStore::new(data)));
        }
        let conn = self.open_connection()?;
        Ok(Arc::new(SqliteStore::new(conn)))
    }
}
