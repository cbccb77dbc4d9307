use crate::models::{
    Activity, ActivityKind, BeneficiarySession, Expense, Project, Record, RecordKind, RecordStatus,
    Report,
};

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

// ---------------------------------------------------------------------------
// Currency + ratio helpers
// ---------------------------------------------------------------------------

/// Convert an amount to the base currency. Base-currency amounts are never scaled;
/// a missing fx on a foreign amount counts as 1.0.
pub fn to_base(amount: f64, currency: &str, fx: Option<f64>, base: &str) -> f64 {
    if currency.eq_ignore_ascii_case(base) {
        amount
    } else {
        amount * fx.unwrap_or(1.0)
    }
}

/// `num / den * 100`, or 0 when the denominator is 0 (or the result is not finite).
pub fn percent(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let pct = num / den * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

fn expense_in_base(e: &Expense, base: &str) -> f64 {
    to_base(e.amount, &e.currency, Some(e.fx), base)
}

fn record_in_base(r: &Record, base: &str) -> f64 {
    match (r.amount, r.currency.as_deref()) {
        (Some(amount), Some(currency)) => to_base(amount, currency, r.fx, base),
        (Some(amount), None) => amount,
        (None, _) => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Project KPIs
// ---------------------------------------------------------------------------

/// Where a project's budget comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    Fixed(f64),
    /// Legacy stand-in derived from the activity count.
    Placeholder,
}

pub const PLACEHOLDER_PER_ACTIVITY: f64 = 5000.0;
pub const PLACEHOLDER_BASE: f64 = 70000.0;
pub const PLACEHOLDER_EMPTY: f64 = 120000.0;

impl Budget {
    pub fn resolve(&self, activity_count: usize) -> f64 {
        match *self {
            Budget::Fixed(amount) => amount,
            Budget::Placeholder if activity_count == 0 => PLACEHOLDER_EMPTY,
            Budget::Placeholder => activity_count as f64 * PLACEHOLDER_PER_ACTIVITY + PLACEHOLDER_BASE,
        }
    }

    /// Explicit value if given, else the project's own budget, else the placeholder.
    pub fn for_project(explicit: Option<f64>, project: &Project) -> Self {
        match explicit {
            Some(amount) => Budget::Fixed(amount),
            None if project.budget > 0.0 => Budget::Fixed(project.budget),
            None => Budget::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Budget::Placeholder)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectKpis {
    pub total_budget: f64,
    pub spent: f64,
    pub admin_spent: f64,
    pub execution_pct: f64,
    pub admin_share_pct: f64,
    pub reports_valid: usize,
    pub reports_pending: usize,
    pub beneficiaries_total: u64,
}

impl ProjectKpis {
    pub fn remaining(&self) -> f64 {
        self.total_budget - self.spent
    }
}

pub fn compute_project_kpis(
    budget: Budget,
    activities: &[Activity],
    expenses: &[Expense],
    reports: &[Report],
    sessions: &[BeneficiarySession],
    base: &str,
) -> ProjectKpis {
    let total_budget = budget.resolve(activities.len());

    let mut spent = 0.0f64;
    let mut admin_spent = 0.0f64;
    for e in expenses {
        let amount = expense_in_base(e, base);
        spent += amount;
        if e.is_admin() {
            admin_spent += amount;
        }
    }

    let reports_valid = reports
        .iter()
        .filter(|r| r.status == RecordStatus::Validated)
        .count();
    let reports_pending = reports
        .iter()
        .filter(|r| r.status == RecordStatus::Submitted)
        .count();

    ProjectKpis {
        total_budget,
        spent,
        admin_spent,
        execution_pct: percent(spent, total_budget),
        admin_share_pct: percent(admin_spent, spent),
        reports_valid,
        reports_pending,
        beneficiaries_total: sessions.iter().map(|s| s.total()).sum(),
    }
}

// ---------------------------------------------------------------------------
// Dashboard KPIs
// ---------------------------------------------------------------------------

/// Everything the dashboard aggregates, unfiltered.
pub struct DashboardInput<'a> {
    pub projects: &'a [Project],
    pub records: &'a [Record],
    pub expenses: &'a [Expense],
    pub sessions: &'a [BeneficiarySession],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardKpis {
    pub active_projects: usize,
    pub collected_this_month: f64,
    pub collected_total: f64,
    pub spent_this_month: f64,
    pub spent_total: f64,
    pub beneficiaries_this_month: u64,
    pub beneficiaries_total: u64,
    /// Whole-percent shares of sessions: [distribution, formation, blank]. Sums to <= 100.
    pub distribution: [u8; 3],
}

pub fn compute_dashboard_kpis(input: &DashboardInput, month: &str, base: &str) -> DashboardKpis {
    let in_month = |date: &str| date.starts_with(month);

    let active_projects = input
        .projects
        .iter()
        .filter(|p| p.status == RecordStatus::Active)
        .count();

    let mut collected_total = 0.0f64;
    let mut collected_this_month = 0.0f64;
    for r in input
        .records
        .iter()
        .filter(|r| r.kind == RecordKind::Donation && r.status == RecordStatus::Success)
    {
        let amount = record_in_base(r, base);
        collected_total += amount;
        if in_month(&r.date) {
            collected_this_month += amount;
        }
    }

    let mut spent_total = 0.0f64;
    let mut spent_this_month = 0.0f64;
    for e in input.expenses {
        let amount = expense_in_base(e, base);
        spent_total += amount;
        if in_month(&e.date) {
            spent_this_month += amount;
        }
    }

    let mut beneficiaries_total = 0u64;
    let mut beneficiaries_this_month = 0u64;
    for s in input.sessions {
        beneficiaries_total += s.total();
        if in_month(&s.date) {
            beneficiaries_this_month += s.total();
        }
    }

    DashboardKpis {
        active_projects,
        collected_this_month,
        collected_total,
        spent_this_month,
        spent_total,
        beneficiaries_this_month,
        beneficiaries_total,
        distribution: session_distribution(input.sessions),
    }
}

/// Floor each share so the three never exceed 100 together.
pub fn session_distribution(sessions: &[BeneficiarySession]) -> [u8; 3] {
    if sessions.is_empty() {
        return [0, 0, 0];
    }
    let mut counts = [0usize; 3];
    for s in sessions {
        // Unrecognised types land in the last bucket, `other`.
        let idx = ActivityKind::ALL
            .iter()
            .position(|k| s.session_type.trim().eq_ignore_ascii_case(k.as_str()))
            .unwrap_or(ActivityKind::ALL.len() - 1);
        counts[idx] += 1;
    }
    let total = sessions.len();
    counts.map(|c| (c * 100 / total) as u8)
}
