use crate::dataset::Dataset;
use crate::error::{KitboardError, Result};
use crate::models::{Activity, BeneficiarySession, Expense, Milestone, Project, Record, Report};

/// Read-only access to the program's records. Every project-scoped list keeps
/// the store's own order.
pub trait RecordStore {
    fn list_projects(&self) -> Result<Vec<Project>>;
    fn list_records(&self) -> Result<Vec<Record>>;
    fn list_project_activities(&self, project_id: &str) -> Result<Vec<Activity>>;
    fn list_project_expenses(&self, project_id: &str) -> Result<Vec<Expense>>;
    fn list_project_reports(&self, project_id: &str) -> Result<Vec<Report>>;
    fn list_beneficiaries(&self, project_id: &str) -> Result<Vec<BeneficiarySession>>;
    fn list_project_milestones(&self, project_id: &str) -> Result<Vec<Milestone>>;

    /// All expenses and sessions across projects, for the dashboard.
    fn list_all_expenses(&self) -> Result<Vec<Expense>>;
    fn list_all_beneficiaries(&self) -> Result<Vec<BeneficiarySession>>;

    fn find_project(&self, project_id: &str) -> Result<Project> {
        self.list_projects()?
            .into_iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| KitboardError::UnknownProject(project_id.to_string()))
    }
}

/// Store backed by an in-memory `Dataset`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Dataset,
}

impl MemoryStore {
    pub fn new(data: Dataset) -> Self {
        Self { data }
    }
}

fn scoped<T: Clone>(rows: &[T], project_id: &str, key: impl Fn(&T) -> &str) -> Vec<T> {
    rows.iter().filter(|r| key(r) == project_id).cloned().collect()
}

impl RecordStore for MemoryStore {
    fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.data.projects.clone())
    }

    fn list_records(&self) -> Result<Vec<Record>> {
        Ok(self.data.records.clone())
    }

    fn list_project_activities(&self, project_id: &str) -> Result<Vec<Activity>> {
        Ok(scoped(&self.data.activities, project_id, |a| a.project_id.as_str()))
    }

    fn list_project_expenses(&self, project_id: &str) -> Result<Vec<Expense>> {
        Ok(scoped(&self.data.expenses, project_id, |e| e.project_id.as_str()))
    }

    fn list_project_reports(&self, project_id: &str) -> Result<Vec<Report>> {
        Ok(scoped(&self.data.reports, project_id, |r| r.project_id.as_str()))
    }

    fn list_beneficiaries(&self, project_id: &str) -> Result<Vec<BeneficiarySession>> {
        Ok(scoped(&self.data.beneficiary_sessions, project_id, |s| s.project_id.as_str()))
    }

    fn list_project_milestones(&self, project_id: &str) -> Result<Vec<Milestone>> {
        Ok(scoped(&self.data.milestones, project_id, |m| m.project_id.as_str()))
    }

    fn list_all_expenses(&self) -> Result<Vec<Expense>> {
        Ok(self.data.expenses.clone())
    }

    fn list_all_beneficiaries(&self) -> Result<Vec<BeneficiarySession>> {
        Ok(self.data.beneficiary_sessions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::demo_dataset;

    #[test]
    fn test_project_scoped_lists() {
        let data = demo_dataset(chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        let store = MemoryStore::new(data.clone());
        let first = &data.projects[0].id;

        let expenses = store.list_project_expenses(first).unwrap();
        assert!(!expenses.is_empty());
        assert!(expenses.iter().all(|e| &e.project_id == first));

        let sessions = store.list_beneficiaries(first).unwrap();
        assert!(sessions.iter().all(|s| &s.project_id == first));

        assert!(store.list_project_reports("nope").unwrap().is_empty());
    }

    #[test]
    fn test_find_project_unknown_is_error() {
        let store = MemoryStore::default();
        let err = store.find_project("missing").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
