use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::error::Result;
use crate::kpi::{compute_project_kpis, Budget, ProjectKpis};
use crate::models::{Activity, BeneficiarySession, Expense, Milestone, Project, Report};
use crate::store::RecordStore;

pub type SharedStore = Arc<dyn RecordStore + Send + Sync>;

/// Everything the project view needs, read in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSnapshot {
    pub project: Project,
    pub activities: Vec<Activity>,
    pub expenses: Vec<Expense>,
    pub reports: Vec<Report>,
    pub sessions: Vec<BeneficiarySession>,
    pub milestones: Vec<Milestone>,
}

impl ProjectSnapshot {
    pub fn budget(&self, explicit: Option<f64>) -> Budget {
        Budget::for_project(explicit, &self.project)
    }

    pub fn kpis(&self, explicit_budget: Option<f64>, base: &str) -> ProjectKpis {
        compute_project_kpis(
            self.budget(explicit_budget),
            &self.activities,
            &self.expenses,
            &self.reports,
            &self.sessions,
            base,
        )
    }
}

pub fn load_snapshot(store: &dyn RecordStore, project_id: &str) -> Result<ProjectSnapshot> {
    let project = store.find_project(project_id)?;
    Ok(ProjectSnapshot {
        activities: store.list_project_activities(project_id)?,
        expenses: store.list_project_expenses(project_id)?,
        reports: store.list_project_reports(project_id)?,
        sessions: store.list_beneficiaries(project_id)?,
        milestones: store.list_project_milestones(project_id)?,
        project,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading { project_id: String },
    Ready(Box<ProjectSnapshot>),
    Failed { project_id: String, message: String },
}

struct Response {
    generation: u64,
    project_id: String,
    result: std::result::Result<ProjectSnapshot, String>,
}

/// Loads project snapshots on worker threads. Each request bumps the generation;
/// only the response for the latest generation is applied.
pub struct ProjectLoader {
    store: SharedStore,
    generation: u64,
    last_requested: Option<String>,
    state: LoadState,
    tx: Sender<Response>,
    rx: Receiver<Response>,
}

impl ProjectLoader {
    pub fn new(store: SharedStore) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            store,
            generation: 0,
            last_requested: None,
            state: LoadState::Idle,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn request(&mut self, project_id: &str) {
        self.generation += 1;
        let generation = self.generation;
        self.last_requested = Some(project_id.to_string());
        self.state = LoadState::Loading {
            project_id: project_id.to_string(),
        };

        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let project_id = project_id.to_string();
        log::debug!("loading {project_id} (generation {generation})");
        thread::spawn(move || {
            let result = load_snapshot(store.as_ref(), &project_id).map_err(|e| e.to_string());
            // Receiver gone means the loader was dropped; nothing left to update.
            let _ = tx.send(Response {
                generation,
                project_id,
                result,
            });
        });
    }

    /// Re-request the last project, typically after a failure.
    pub fn retry(&mut self) -> bool {
        match self.last_requested.clone() {
            Some(id) => {
                self.request(&id);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, resp: Response) -> bool {
        if resp.generation != self.generation {
            log::debug!(
                "discarding stale load of {} (generation {}, current {})",
                resp.project_id,
                resp.generation,
                self.generation
            );
            return false;
        }
        self.state = match resp.result {
            Ok(snapshot) => LoadState::Ready(Box::new(snapshot)),
            Err(message) => LoadState::Failed {
                project_id: resp.project_id,
                message,
            },
        };
        true
    }

    /// Drain finished loads without blocking. Returns true if the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(resp) = self.rx.try_recv() {
            changed |= self.apply(resp);
        }
        changed
    }

}

#[cfg(test)]
impl ProjectLoader {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// Wait for the current request to finish, up to `timeout`.
    pub fn block_until_settled(&mut self, timeout: std::time::Duration) -> &LoadState {
        use std::sync::mpsc::RecvTimeoutError;
        use std::time::Instant;

        let deadline = Instant::now() + timeout;
        while self.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(resp) => {
                    self.apply(resp);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        &self.state
    }
}
