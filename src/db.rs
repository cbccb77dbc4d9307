use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::dataset::Dataset;
use crate::error::{KitboardError, Result};
use crate::models::{Activity, BeneficiarySession, Expense, Milestone, Project, Record, Report};
use crate::store::RecordStore;

pub const DB_FILE: &str = "kitboard.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    organisation TEXT NOT NULL,
    location TEXT NOT NULL,
    start_date TEXT NOT NULL,
    status TEXT NOT NULL,
    budget REAL NOT NULL DEFAULT 0,
    collected REAL NOT NULL DEFAULT 0,
    spent REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS records (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    kind TEXT NOT NULL,
    status TEXT NOT NULL,
    reference TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT '',
    amount REAL,
    currency TEXT,
    fx REAL
);

CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    date TEXT NOT NULL,
    title TEXT NOT NULL,
    kind TEXT NOT NULL,
    status TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS expenses (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    activity_id TEXT,
    date TEXT NOT NULL,
    payee TEXT NOT NULL,
    amount REAL NOT NULL,
    currency TEXT NOT NULL,
    fx REAL NOT NULL DEFAULT 1,
    category TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    date TEXT NOT NULL,
    title TEXT NOT NULL,
    status TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS beneficiary_sessions (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    date TEXT NOT NULL,
    session_type TEXT NOT NULL DEFAULT '',
    females INTEGER NOT NULL DEFAULT 0,
    males INTEGER NOT NULL DEFAULT 0,
    file TEXT,
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS milestones (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    title TEXT NOT NULL,
    due_date TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Read a string column and parse it into one of the model enums.
fn enum_col<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

pub fn find_import_by_checksum(conn: &Connection, checksum: &str) -> Result<Option<String>> {
    let name = conn
        .query_row(
            "SELECT filename FROM imports WHERE checksum = ?1",
            [checksum],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name)
}

/// Insert every collection of `data` in one transaction and log the import.
pub fn insert_dataset(conn: &mut Connection, data: &Dataset, filename: &str, checksum: Option<&str>) -> Result<usize> {
    let tx = conn.transaction()?;

    for p in &data.projects {
        tx.execute(
            "INSERT INTO projects (id, name, organisation, location, start_date, status, budget, collected, spent) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![p.id, p.name, p.organisation, p.location, p.start_date, p.status.as_str(), p.budget, p.collected, p.spent],
        )?;
    }
    for r in &data.records {
        tx.execute(
            "INSERT INTO records (id, date, kind, status, reference, name, amount, currency, fx) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![r.id, r.date, r.kind.as_str(), r.status.as_str(), r.reference, r.name, r.amount, r.currency, r.fx],
        )?;
    }
    for a in &data.activities {
        tx.execute(
            "INSERT INTO activities (id, project_id, date, title, kind, status) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![a.id, a.project_id, a.date, a.title, a.kind.as_str(), a.status.as_str()],
        )?;
    }
    for e in &data.expenses {
        tx.execute(
            "INSERT INTO expenses (id, project_id, activity_id, date, payee, amount, currency, fx, category) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![e.id, e.project_id, e.activity_id, e.date, e.payee, e.amount, e.currency, e.fx, e.category],
        )?;
    }
    for r in &data.reports {
        tx.execute(
            "INSERT INTO reports (id, project_id, date, title, status) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![r.id, r.project_id, r.date, r.title, r.status.as_str()],
        )?;
    }
    for s in &data.beneficiary_sessions {
        tx.execute(
            "INSERT INTO beneficiary_sessions (id, project_id, date, session_type, females, males, file) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![s.id, s.project_id, s.date, s.session_type, s.females, s.males, s.file],
        )?;
    }
    for m in &data.milestones {
        tx.execute(
            "INSERT INTO milestones (id, project_id, title, due_date, done) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![m.id, m.project_id, m.title, m.due_date, m.done],
        )?;
    }

    let count = data.row_count();
    tx.execute(
        "INSERT INTO imports (filename, record_count, checksum) VALUES (?1, ?2, ?3)",
        params![filename, count as i64, checksum],
    )?;
    tx.commit()?;

    log::info!("imported {count} rows from {filename}");
    Ok(count)
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// `RecordStore` over the kitboard database. Access is serialized so the store
/// can be shared with the background loader.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| KitboardError::Other("database lock poisoned".to_string()))
    }

    fn query<T>(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
        map: impl FnMut(&Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        log::debug!("store query: {sql}");
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn project_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        organisation: row.get(2)?,
        location: row.get(3)?,
        start_date: row.get(4)?,
        status: enum_col(row, 5)?,
        budget: row.get(6)?,
        collected: row.get(7)?,
        spent: row.get(8)?,
    })
}

const PROJECT_COLS: &str =
    "SELECT id, name, organisation, location, start_date, status, budget, collected, spent FROM projects";

fn expense_row(row: &Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        project_id: row.get(1)?,
        activity_id: row.get(2)?,
        date: row.get(3)?,
        payee: row.get(4)?,
        amount: row.get(5)?,
        currency: row.get(6)?,
        fx: row.get(7)?,
        category: row.get(8)?,
    })
}

const EXPENSE_COLS: &str =
    "SELECT id, project_id, activity_id, date, payee, amount, currency, fx, category FROM expenses";

fn session_row(row: &Row) -> rusqlite::Result<BeneficiarySession> {
    Ok(BeneficiarySession {
        id: row.get(0)?,
        project_id: row.get(1)?,
        date: row.get(2)?,
        session_type: row.get(3)?,
        females: row.get(4)?,
        males: row.get(5)?,
        file: row.get(6)?,
    })
}

const SESSION_COLS: &str =
    "SELECT id, project_id, date, session_type, females, males, file FROM beneficiary_sessions";

impl RecordStore for SqliteStore {
    fn list_projects(&self) -> Result<Vec<Project>> {
        self.query(&format!("{PROJECT_COLS} ORDER BY rowid"), &[], project_row)
    }

    fn find_project(&self, project_id: &str) -> Result<Project> {
        let conn = self.conn()?;
        conn.query_row(&format!("{PROJECT_COLS} WHERE id = ?1"), [project_id], project_row)
            .optional()?
            .ok_or_else(|| KitboardError::UnknownProject(project_id.to_string()))
    }

    fn list_records(&self) -> Result<Vec<Record>> {
        self.query(
            "SELECT id, date, kind, status, reference, name, amount, currency, fx FROM records ORDER BY rowid",
            &[],
            |row| {
                Ok(Record {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    kind: enum_col(row, 2)?,
                    status: enum_col(row, 3)?,
                    reference: row.get(4)?,
                    name: row.get(5)?,
                    amount: row.get(6)?,
                    currency: row.get(7)?,
                    fx: row.get(8)?,
                })
            },
        )
    }

    fn list_project_activities(&self, project_id: &str) -> Result<Vec<Activity>> {
        self.query(
            "SELECT id, project_id, date, title, kind, status FROM activities WHERE project_id = ?1 ORDER BY rowid",
            &[&project_id],
            |row| {
                Ok(Activity {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    date: row.get(2)?,
                    title: row.get(3)?,
                    kind: enum_col(row, 4)?,
                    status: enum_col(row, 5)?,
                })
            },
        )
    }

    fn list_project_expenses(&self, project_id: &str) -> Result<Vec<Expense>> {
        self.query(
            &format!("{EXPENSE_COLS} WHERE project_id = ?1 ORDER BY rowid"),
            &[&project_id],
            expense_row,
        )
    }

    fn list_project_reports(&self, project_id: &str) -> Result<Vec<Report>> {
        self.query(
            "SELECT id, project_id, date, title, status FROM reports WHERE project_id = ?1 ORDER BY rowid",
            &[&project_id],
            |row| {
                Ok(Report {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    date: row.get(2)?,
                    title: row.get(3)?,
                    status: enum_col(row, 4)?,
                })
            },
        )
    }

    fn list_beneficiaries(&self, project_id: &str) -> Result<Vec<BeneficiarySession>> {
        self.query(
            &format!("{SESSION_COLS} WHERE project_id = ?1 ORDER BY rowid"),
            &[&project_id],
            session_row,
        )
    }

    fn list_project_milestones(&self, project_id: &str) -> Result<Vec<Milestone>> {
        self.query(
            "SELECT id, project_id, title, due_date, done FROM milestones WHERE project_id = ?1 ORDER BY due_date, rowid",
            &[&project_id],
            |row| {
                Ok(Milestone {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    title: row.get(2)?,
                    due_date: row.get(3)?,
                    done: row.get(4)?,
                })
            },
        )
    }

    fn list_all_expenses(&self) -> Result<Vec<Expense>> {
        self.query(&format!("{EXPENSE_COLS} ORDER BY rowid"), &[], expense_row)
    }

    fn list_all_beneficiaries(&self) -> Result<Vec<BeneficiarySession>> {
        self.query(&format!("{SESSION_COLS} ORDER BY rowid"), &[], session_row)
    }
}
