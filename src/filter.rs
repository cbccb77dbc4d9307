use std::borrow::Cow;
use std::cmp::Ordering;

use crate::kpi::to_base;
use crate::models::{BeneficiarySession, Expense, Project, Record, Report};

/// A field a `FilterSpec` can constrain by exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Kind,
    Status,
    Organisation,
    Country,
    Year,
}

/// Something the filter engine can match against.
pub trait Filterable {
    /// Text fields searched by `FilterSpec::search`.
    fn search_fields(&self) -> Vec<&str>;

    /// Value of an equality field, or `None` if the record has no such field.
    fn field(&self, field: Field) -> Option<Cow<'_, str>>;

    /// ISO date used for period buckets.
    fn date(&self) -> Option<&str>;
}

/// Optional constraints; `None`, empty or `"all"` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub search: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub organisation: Option<String>,
    pub country: Option<String>,
    pub year: Option<String>,
    /// Date prefix: `YYYY` or `YYYY-MM`.
    pub period: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    let v = value.as_deref()?.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(v)
    }
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.constraints().is_empty() && active(&self.search).is_none() && active(&self.period).is_none()
    }

    fn constraints(&self) -> Vec<(Field, &str)> {
        [
            (Field::Kind, &self.kind),
            (Field::Status, &self.status),
            (Field::Organisation, &self.organisation),
            (Field::Country, &self.country),
            (Field::Year, &self.year),
        ]
        .into_iter()
        .filter_map(|(field, value)| active(value).map(|v| (field, v)))
        .collect()
    }

    /// Human-readable summary of the active constraints, e.g. `status: active, search: "kit"`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(s) = active(&self.search) {
            parts.push(format!("search: \"{s}\""));
        }
        for (field, value) in self.constraints() {
            let label = match field {
                Field::Kind => "type",
                Field::Status => "status",
                Field::Organisation => "organisation",
                Field::Country => "country",
                Field::Year => "year",
            };
            parts.push(format!("{label}: {value}"));
        }
        if let Some(p) = active(&self.period) {
            parts.push(format!("period: {p}"));
        }
        parts.join(", ")
    }

    pub fn matches<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        if let Some(needle) = active(&self.search) {
            let needle = needle.to_lowercase();
            let hit = record
                .search_fields()
                .iter()
                .any(|text| text.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        for (field, wanted) in self.constraints() {
            match record.field(field) {
                Some(value) if value == wanted => {}
                _ => return false,
            }
        }

        if let Some(prefix) = active(&self.period) {
            match record.date() {
                Some(date) if date.starts_with(prefix) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Return the records matching `spec`, in input order. The input is untouched.
pub fn filter_records<T: Filterable + Clone>(records: &[T], spec: &FilterSpec) -> Vec<T> {
    records.iter().filter(|r| spec.matches(*r)).cloned().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExpenseSort {
    /// Oldest first.
    Date,
    /// Largest base-currency amount first.
    Amount,
}

pub fn sort_expenses(expenses: &mut [Expense], key: ExpenseSort, base: &str) {
    match key {
        ExpenseSort::Date => expenses.sort_by(|a, b| a.date.cmp(&b.date)),
        ExpenseSort::Amount => expenses.sort_by(|a, b| {
            let a = to_base(a.amount, &a.currency, Some(a.fx), base);
            let b = to_base(b.amount, &b.currency, Some(b.fx), base);
            b.partial_cmp(&a).unwrap_or(Ordering::Equal)
        }),
    }
}

// ---------------------------------------------------------------------------
// Filterable impls
// ---------------------------------------------------------------------------

impl Filterable for Record {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.reference.as_str(), self.name.as_str(), self.id.as_str()]
    }

    fn field(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Kind => Some(Cow::Borrowed(self.kind.as_str())),
            Field::Status => Some(Cow::Borrowed(self.status.as_str())),
            Field::Year => self.date.get(..4).map(Cow::Borrowed),
            Field::Organisation | Field::Country => None,
        }
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

impl Filterable for Project {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.name.as_str()]
    }

    fn field(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Status => Some(Cow::Borrowed(self.status.as_str())),
            Field::Organisation => Some(Cow::Borrowed(&self.organisation)),
            Field::Country => Some(Cow::Borrowed(self.country())),
            Field::Year => Some(Cow::Borrowed(self.year())),
            Field::Kind => Some(Cow::Borrowed("project")),
        }
    }

    fn date(&self) -> Option<&str> {
        Some(&self.start_date)
    }
}

impl Filterable for Expense {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.payee.as_str()];
        if let Some(ref a) = self.activity_id {
            fields.push(a);
        }
        fields
    }

    fn field(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Kind => Some(Cow::Borrowed(&self.category)),
            Field::Year => self.date.get(..4).map(Cow::Borrowed),
            _ => None,
        }
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

impl Filterable for Report {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.title.as_str()]
    }

    fn field(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Kind => Some(Cow::Borrowed("report")),
            Field::Status => Some(Cow::Borrowed(self.status.as_str())),
            Field::Year => self.date.get(..4).map(Cow::Borrowed),
            _ => None,
        }
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

impl Filterable for BeneficiarySession {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.session_type.as_str()];
        if let Some(ref f) = self.file {
            fields.push(f);
        }
        fields
    }

    fn field(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Kind => Some(Cow::Borrowed(&self.session_type)),
            Field::Year => self.date.get(..4).map(Cow::Borrowed),
            _ => None,
        }
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordKind, RecordStatus};

    fn record(id: &str, date: &str, kind: RecordKind, status: RecordStatus, name: &str) -> Record {
        Record {
            id: id.into(),
            date: date.into(),
            kind,
            status,
            reference: format!("REF-{id}"),
            name: name.into(),
            amount: Some(25.0),
            currency: Some("USD".into()),
            fx: None,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("1", "2025-01-03", RecordKind::Donation, RecordStatus::Success, "Amina Diallo"),
            record("2", "2025-01-09", RecordKind::Report, RecordStatus::Submitted, "Q4 narrative"),
            record("3", "2025-02-14", RecordKind::Donation, RecordStatus::Pending, "Jean Martin"),
            record("4", "2024-12-20", RecordKind::Project, RecordStatus::Active, "School kits"),
            record("5", "2025-02-28", RecordKind::Donation, RecordStatus::Refunded, "amina b."),
        ]
    }

    fn project(id: &str, org: &str, location: &str, start: &str, status: RecordStatus) -> Project {
        Project {
            id: id.into(),
            name: format!("Project {id}"),
            organisation: org.into(),
            location: location.into(),
            start_date: start.into(),
            status,
            budget: 0.0,
            collected: 0.0,
            spent: 0.0,
        }
    }

    fn expense(id: &str, date: &str, amount: f64, currency: &str, fx: f64) -> Expense {
        Expense {
            id: id.into(),
            project_id: "p1".into(),
            activity_id: None,
            date: date.into(),
            payee: "Supplier".into(),
            amount,
            currency: currency.into(),
            fx,
            category: "kits".into(),
        }
    }

    fn ids<T>(rows: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
        rows.iter().map(|r| id(r).to_string()).collect()
    }

    #[test]
    fn test_empty_spec_returns_everything_in_order() {
        let rows = filter_records(&sample(), &FilterSpec::default());
        assert_eq!(ids(&rows, |r| r.id.as_str()), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_all_sentinel_and_blank_search_are_no_constraint() {
        let spec = FilterSpec {
            search: Some("   ".into()),
            kind: Some("all".into()),
            status: Some("ALL".into()),
            ..Default::default()
        };
        assert!(spec.is_empty());
        assert_eq!(filter_records(&sample(), &spec).len(), 5);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let spec = FilterSpec { search: Some("AMINA".into()), ..Default::default() };
        let rows = filter_records(&sample(), &spec);
        assert_eq!(ids(&rows, |r| r.id.as_str()), vec!["1", "5"]);
    }

    #[test]
    fn test_search_matches_reference_code() {
        let spec = FilterSpec { search: Some("ref-3".into()), ..Default::default() };
        let rows = filter_records(&sample(), &spec);
        assert_eq!(ids(&rows, |r| r.id.as_str()), vec!["3"]);
    }

    #[test]
    fn test_constraints_combine_with_and() {
        let spec = FilterSpec {
            kind: Some("donation".into()),
            period: Some("2025-02".into()),
            ..Default::default()
        };
        let rows = filter_records(&sample(), &spec);
        assert_eq!(ids(&rows, |r| r.id.as_str()), vec!["3", "5"]);

        let spec = FilterSpec {
            kind: Some("donation".into()),
            status: Some("pending".into()),
            search: Some("amina".into()),
            ..Default::default()
        };
        assert!(filter_records(&sample(), &spec).is_empty());
    }

    #[test]
    fn test_missing_field_fails_match() {
        // Records have no organisation.
        let spec = FilterSpec { organisation: Some("Cycle Aid".into()), ..Default::default() };
        assert!(filter_records(&sample(), &spec).is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let spec = FilterSpec { search: Some("x".into()), ..Default::default() };
        assert!(filter_records::<Record>(&[], &spec).is_empty());
        assert!(filter_records::<Record>(&[], &FilterSpec::default()).is_empty());
    }

    #[test]
    fn test_filter_does_not_mutate_source() {
        let source = sample();
        let before = source.clone();
        let spec = FilterSpec { status: Some("success".into()), ..Default::default() };
        let _ = filter_records(&source, &spec);
        assert_eq!(source, before);
    }

    #[test]
    fn test_filter_never_grows_and_is_idempotent() {
        let specs = vec![
            FilterSpec { search: Some("a".into()), ..Default::default() },
            FilterSpec { kind: Some("donation".into()), ..Default::default() },
            FilterSpec { period: Some("2025".into()), status: Some("success".into()), ..Default::default() },
            FilterSpec { year: Some("2024".into()), ..Default::default() },
        ];
        let source = sample();
        for spec in &specs {
            let once = filter_records(&source, spec);
            assert!(once.len() <= source.len());
            let twice = filter_records(&once, spec);
            assert_eq!(once, twice, "spec {spec:?} is not idempotent");
        }
    }

    #[test]
    fn test_project_derived_fields() {
        let projects = vec![
            project("a", "Cycle Aid", "Kenya, Kisumu", "2023-04-01", RecordStatus::Active),
            project("b", "Cycle Aid", "Uganda, Gulu", "2024-01-15", RecordStatus::Draft),
            project("c", "Girls First", "Kenya, Nairobi", "2024-06-01", RecordStatus::Active),
        ];
        let spec = FilterSpec { country: Some("Kenya".into()), ..Default::default() };
        assert_eq!(ids(&filter_records(&projects, &spec), |p| p.id.as_str()), vec!["a", "c"]);

        let spec = FilterSpec { year: Some("2024".into()), ..Default::default() };
        assert_eq!(ids(&filter_records(&projects, &spec), |p| p.id.as_str()), vec!["b", "c"]);

        let spec = FilterSpec {
            organisation: Some("Cycle Aid".into()),
            status: Some("active".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_records(&projects, &spec), |p| p.id.as_str()), vec!["a"]);
    }

    #[test]
    fn test_sort_expenses_by_date_ascending() {
        let mut rows = vec![
            expense("a", "2025-03-01", 10.0, "USD", 1.0),
            expense("b", "2025-01-15", 10.0, "USD", 1.0),
            expense("c", "2025-02-01", 10.0, "USD", 1.0),
        ];
        sort_expenses(&mut rows, ExpenseSort::Date, "USD");
        assert_eq!(ids(&rows, |e| e.id.as_str()), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_expenses_by_normalized_amount_descending() {
        let mut rows = vec![
            expense("a", "2025-01-01", 100.0, "USD", 1.0),
            expense("b", "2025-01-02", 100.0, "EUR", 1.08),
            expense("c", "2025-01-03", 50_000.0, "XOF", 0.0016),
        ];
        sort_expenses(&mut rows, ExpenseSort::Amount, "USD");
        assert_eq!(ids(&rows, |e| e.id.as_str()), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_describe_lists_active_constraints() {
        let spec = FilterSpec {
            search: Some("kit".into()),
            status: Some("active".into()),
            country: Some("all".into()),
            period: Some("2025".into()),
            ..Default::default()
        };
        assert_eq!(spec.describe(), "search: \"kit\", status: active, period: 2025");
        assert_eq!(FilterSpec::default().describe(), "");
    }
}
