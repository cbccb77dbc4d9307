use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{
    Activity, ActivityKind, BeneficiarySession, Expense, Milestone, Project, Record, RecordKind,
    RecordStatus, Report,
};

/// A complete set of program records, as stored in a JSON dataset file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub projects: Vec<Project>,
    pub records: Vec<Record>,
    pub activities: Vec<Activity>,
    pub expenses: Vec<Expense>,
    pub reports: Vec<Report>,
    pub beneficiary_sessions: Vec<BeneficiarySession>,
    pub milestones: Vec<Milestone>,
}

impl Dataset {
    pub fn row_count(&self) -> usize {
        self.projects.len()
            + self.records.len()
            + self.activities.len()
            + self.expenses.len()
            + self.reports.len()
            + self.beneficiary_sessions.len()
            + self.milestones.len()
    }
}

/// Parse a dataset file, returning it with the SHA-256 of its bytes.
pub fn read_dataset(path: &Path) -> Result<(Dataset, String)> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let checksum = hex::encode(hasher.finalize());
    let data: Dataset = serde_json::from_slice(&bytes)?;
    Ok((data, checksum))
}

// ---------------------------------------------------------------------------
// Demo data
// ---------------------------------------------------------------------------

const MONTHS: u32 = 6;

struct DemoProject {
    id: &'static str,
    name: &'static str,
    organisation: &'static str,
    location: &'static str,
    start_date: &'static str,
    status: RecordStatus,
    budget: f64,
    /// Local currency for kit purchases and its USD rate.
    currency: &'static str,
    fx: f64,
    kit_cost: f64,
}

const PROJECTS: &[DemoProject] = &[
    DemoProject {
        id: "PRJ-001",
        name: "Safe Cycles Kisumu",
        organisation: "Cycle Aid",
        location: "Kenya, Kisumu",
        start_date: "2023-09-01",
        status: RecordStatus::Active,
        budget: 95000.0,
        currency: "KES",
        fx: 0.0077,
        kit_cost: 310_000.0,
    },
    DemoProject {
        id: "PRJ-002",
        name: "Pads for Girls Gulu",
        organisation: "Cycle Aid",
        location: "Uganda, Gulu",
        start_date: "2024-02-15",
        status: RecordStatus::Active,
        // No agreed budget yet: KPIs fall back to the placeholder.
        budget: 0.0,
        currency: "UGX",
        fx: 0.00027,
        kit_cost: 8_500_000.0,
    },
    DemoProject {
        id: "PRJ-003",
        name: "Menstrual Health Clubs Thies",
        organisation: "Girls First",
        location: "Senegal, Thies",
        start_date: "2024-10-01",
        status: RecordStatus::Draft,
        budget: 40000.0,
        currency: "XOF",
        fx: 0.0016,
        kit_cost: 1_250_000.0,
    },
    DemoProject {
        id: "PRJ-004",
        name: "Reusable Kits Lome",
        organisation: "Girls First",
        location: "Togo, Lome",
        start_date: "2022-05-01",
        status: RecordStatus::Pending,
        budget: 60000.0,
        currency: "XOF",
        fx: 0.0016,
        kit_cost: 900_000.0,
    },
];

const DONORS: &[(&str, f64, &str, Option<f64>)] = &[
    ("Amina Diallo", 50.0, "USD", None),
    ("Fondation Lune", 1200.0, "EUR", Some(1.08)),
    ("Jean Martin", 75.0, "EUR", Some(1.08)),
    ("Rotary Club Nairobi", 25000.0, "KES", Some(0.0077)),
    ("Sarah Okafor", 120.0, "USD", None),
    ("Cycle Circle Monthly", 300.0, "USD", None),
];

const DONATION_STATUSES: &[RecordStatus] = &[
    RecordStatus::Success,
    RecordStatus::Success,
    RecordStatus::Pending,
    RecordStatus::Success,
    RecordStatus::Refunded,
    RecordStatus::Success,
    RecordStatus::Success,
];

/// Clamp a day to the last valid day of the given year/month.
fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last_day = next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(28);
    day.min(last_day)
}

fn make_date(year: i32, month: u32, day: u32) -> String {
    let d = clamp_day(year, month, day);
    format!("{year:04}-{month:02}-{d:02}")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn report_status(months_ago: u32, project_idx: usize) -> RecordStatus {
    match months_ago {
        0 => RecordStatus::Draft,
        1 => RecordStatus::Submitted,
        2 if project_idx % 2 == 1 => RecordStatus::Submitted,
        3 if project_idx == 2 => RecordStatus::Rejected,
        _ => RecordStatus::Validated,
    }
}

/// Build six months of deterministic demo records ending at `today`'s month.
pub fn demo_dataset(today: NaiveDate) -> Dataset {
    let mut data = Dataset::default();

    for (pi, p) in PROJECTS.iter().enumerate() {
        data.projects.push(Project {
            id: p.id.to_string(),
            name: p.name.to_string(),
            organisation: p.organisation.to_string(),
            location: p.location.to_string(),
            start_date: p.start_date.to_string(),
            status: p.status,
            budget: p.budget,
            collected: 0.0,
            spent: 0.0,
        });
        data.records.push(Record {
            id: format!("{}-START", p.id),
            date: p.start_date.to_string(),
            kind: RecordKind::Project,
            status: p.status,
            reference: p.id.to_string(),
            name: p.name.to_string(),
            amount: None,
            currency: None,
            fx: None,
        });

        // The draft project has no field activity yet.
        if p.status == RecordStatus::Draft {
            data.milestones.push(Milestone {
                id: format!("{}-MS-01", p.id),
                project_id: p.id.to_string(),
                title: "Partner agreement signed".to_string(),
                due_date: make_date(today.year(), today.month(), 28),
                done: false,
            });
            continue;
        }

        for i in 0..MONTHS {
            let months_ago = MONTHS - 1 - i;
            let target = today - chrono::Months::new(months_ago);
            let (year, month) = (target.year(), target.month());
            let idx = i as usize + pi;
            let seq = i + 1;

            let dist_id = format!("{}-ACT-{:02}D", p.id, seq);
            let form_id = format!("{}-ACT-{:02}F", p.id, seq);
            data.activities.push(Activity {
                id: dist_id.clone(),
                project_id: p.id.to_string(),
                date: make_date(year, month, 6),
                title: "Kit distribution".to_string(),
                kind: ActivityKind::Distribution,
                status: if months_ago == 0 { RecordStatus::Pending } else { RecordStatus::Validated },
            });
            data.activities.push(Activity {
                id: form_id.clone(),
                project_id: p.id.to_string(),
                date: make_date(year, month, 18),
                title: "Menstrual health workshop".to_string(),
                kind: ActivityKind::Formation,
                status: if months_ago == 0 { RecordStatus::Pending } else { RecordStatus::Validated },
            });

            // Kit purchase in local currency, varying slightly by month.
            let vary = 1.0 + ((idx % 5) as f64 - 2.0) * 0.03;
            data.expenses.push(Expense {
                id: format!("{}-EXP-{:02}K", p.id, seq),
                project_id: p.id.to_string(),
                activity_id: Some(dist_id.clone()),
                date: make_date(year, month, 4),
                payee: "Local pad workshop".to_string(),
                amount: round2(p.kit_cost * vary),
                currency: p.currency.to_string(),
                fx: p.fx,
                category: "kits".to_string(),
            });
            data.expenses.push(Expense {
                id: format!("{}-EXP-{:02}T", p.id, seq),
                project_id: p.id.to_string(),
                activity_id: Some(dist_id.clone()),
                date: make_date(year, month, 6),
                payee: "Transport \"Express\" Ltd".to_string(),
                amount: round2(180.0 + (idx % 3) as f64 * 22.5),
                currency: "USD".to_string(),
                fx: 1.0,
                category: "logistics".to_string(),
            });
            data.expenses.push(Expense {
                id: format!("{}-EXP-{:02}F", p.id, seq),
                project_id: p.id.to_string(),
                activity_id: Some(form_id.clone()),
                date: make_date(year, month, 18),
                payee: "Peer educator fees".to_string(),
                amount: 420.0,
                currency: "EUR".to_string(),
                fx: 1.08,
                category: "training".to_string(),
            });
            data.expenses.push(Expense {
                id: format!("{}-EXP-{:02}A", p.id, seq),
                project_id: p.id.to_string(),
                activity_id: None,
                date: make_date(year, month, 28),
                payee: "Office & coordination".to_string(),
                amount: 350.0,
                currency: "USD".to_string(),
                fx: 1.0,
                category: "admin".to_string(),
            });

            let females = 60 + (idx % 4) as u32 * 15;
            let sid = format!("{}-SES-{:02}D", p.id, seq);
            data.beneficiary_sessions.push(BeneficiarySession {
                file: (seq % 3 == 0).then(|| format!("{}.csv", sid.to_lowercase())),
                id: sid,
                project_id: p.id.to_string(),
                date: make_date(year, month, 6),
                session_type: "distribution".to_string(),
                females,
                males: 0,
            });
            data.beneficiary_sessions.push(BeneficiarySession {
                id: format!("{}-SES-{:02}F", p.id, seq),
                project_id: p.id.to_string(),
                date: make_date(year, month, 18),
                session_type: "formation".to_string(),
                females: females / 2,
                males: 8 + (idx % 3) as u32 * 4,
                file: None,
            });
            if seq % 2 == 0 {
                data.beneficiary_sessions.push(BeneficiarySession {
                    id: format!("{}-SES-{:02}X", p.id, seq),
                    project_id: p.id.to_string(),
                    date: make_date(year, month, 22),
                    session_type: String::new(),
                    females: 12,
                    males: 3,
                    file: None,
                });
            }

            let status = report_status(months_ago, pi);
            let report_id = format!("{}-RPT-{:02}", p.id, seq);
            let title = format!("Monthly report {year:04}-{month:02}");
            data.reports.push(Report {
                id: report_id.clone(),
                project_id: p.id.to_string(),
                date: make_date(year, month, 30),
                title: title.clone(),
                status,
            });
            data.records.push(Record {
                id: report_id.clone(),
                date: make_date(year, month, 30),
                kind: RecordKind::Report,
                status,
                reference: report_id,
                name: format!("{} - {}", p.name, title),
                amount: None,
                currency: None,
                fx: None,
            });
        }

        let milestones = [
            ("Baseline survey", 0u32, true),
            ("First 1,000 kits distributed", 2, true),
            ("Mid-term evaluation", 0, false),
        ];
        for (mi, (title, back, done)) in milestones.iter().enumerate() {
            let due = if *done {
                today - chrono::Months::new(MONTHS - 1 - back)
            } else {
                today + chrono::Months::new(2)
            };
            data.milestones.push(Milestone {
                id: format!("{}-MS-{:02}", p.id, mi + 1),
                project_id: p.id.to_string(),
                title: title.to_string(),
                due_date: due.format("%Y-%m-%d").to_string(),
                done: *done,
            });
        }
    }

    // Donations: three per month, rotating donors and statuses.
    for i in 0..MONTHS {
        let months_ago = MONTHS - 1 - i;
        let target = today - chrono::Months::new(months_ago);
        let (year, month) = (target.year(), target.month());
        for j in 0..3usize {
            let n = i as usize * 3 + j;
            let (donor, amount, currency, fx) = DONORS[n % DONORS.len()];
            data.records.push(Record {
                id: format!("DON-{:04}", n + 1),
                date: make_date(year, month, 2 + j as u32 * 9),
                kind: RecordKind::Donation,
                status: DONATION_STATUSES[n % DONATION_STATUSES.len()],
                reference: format!("cs_{:06}", 424_242 + n * 37),
                name: donor.to_string(),
                amount: Some(amount),
                currency: Some(currency.to_string()),
                fx,
            });
        }
    }

    data.records.sort_by(|a, b| b.date.cmp(&a.date));
    data
}
