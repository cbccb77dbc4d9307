use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Declares a closed string-backed enum with `as_str`, `FromStr` and `Display`.
macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError { kind: $label, value: s.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(RecordKind, "record kind", {
    Donation => "donation",
    Report => "report",
    Project => "project",
});

string_enum!(RecordStatus, "status", {
    Success => "success",
    Pending => "pending",
    Submitted => "submitted",
    Validated => "validated",
    Refunded => "refunded",
    Rejected => "rejected",
    Draft => "draft",
    Active => "active",
});

string_enum!(ActivityKind, "activity kind", {
    Distribution => "distribution",
    Formation => "formation",
    Other => "other",
});

/// One row of the recent-items feed: donations, reports and project events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub date: String,
    pub kind: RecordKind,
    pub status: RecordStatus,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub fx: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub project_id: String,
    pub date: String,
    pub title: String,
    pub kind: ActivityKind,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub activity_id: Option<String>,
    pub date: String,
    pub payee: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default = "default_fx")]
    pub fx: f64,
    pub category: String,
}

fn default_fx() -> f64 {
    1.0
}

impl Expense {
    pub fn is_admin(&self) -> bool {
        self.category.eq_ignore_ascii_case("admin")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub project_id: String,
    pub date: String,
    pub title: String,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiarySession {
    pub id: String,
    pub project_id: String,
    pub date: String,
    pub session_type: String,
    pub females: u32,
    pub males: u32,
    #[serde(default)]
    pub file: Option<String>,
}

impl BeneficiarySession {
    pub fn total(&self) -> u64 {
        self.females as u64 + self.males as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub due_date: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub organisation: String,
    pub location: String,
    pub start_date: String,
    pub status: RecordStatus,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub collected: f64,
    #[serde(default)]
    pub spent: f64,
}

pub const LOCATION_SEPARATOR: char = ',';

impl Project {
    /// Country is the part of the location before the first separator.
    pub fn country(&self) -> &str {
        match self.location.split_once(LOCATION_SEPARATOR) {
            Some((country, _)) => country.trim(),
            None => self.location.trim(),
        }
    }

    pub fn year(&self) -> &str {
        self.start_date.get(..4).unwrap_or(&self.start_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(location: &str, start_date: &str) -> Project {
        Project {
            id: "p1".into(),
            name: "Kits for Schools".into(),
            organisation: "Cycle Aid".into(),
            location: location.into(),
            start_date: start_date.into(),
            status: RecordStatus::Active,
            budget: 0.0,
            collected: 0.0,
            spent: 0.0,
        }
    }

    #[test]
    fn test_country_is_prefix_before_separator() {
        assert_eq!(project("Kenya, Nairobi", "2024-03-01").country(), "Kenya");
        assert_eq!(project("Senegal", "2024-03-01").country(), "Senegal");
        assert_eq!(project("  Togo ,Lomé", "2024-03-01").country(), "Togo");
    }

    #[test]
    fn test_year_is_first_four_chars() {
        assert_eq!(project("Kenya", "2023-11-20").year(), "2023");
        assert_eq!(project("Kenya", "20").year(), "20");
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("Validated".parse::<RecordStatus>().unwrap(), RecordStatus::Validated);
        assert_eq!(" draft ".parse::<RecordStatus>().unwrap(), RecordStatus::Draft);
        assert!("archived".parse::<RecordStatus>().is_err());
    }

    #[test]
    fn test_enum_serde_uses_lowercase() {
        let json = serde_json::to_string(&RecordKind::Donation).unwrap();
        assert_eq!(json, "\"donation\"");
        let kind: ActivityKind = serde_json::from_str("\"formation\"").unwrap();
        assert_eq!(kind, ActivityKind::Formation);
    }

    #[test]
    fn test_expense_fx_defaults_to_one() {
        let json = r#"{"id":"e1","project_id":"p1","date":"2025-01-02","payee":"Pads Co",
            "amount":10.0,"currency":"USD","category":"kits"}"#;
        let e: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(e.fx, 1.0);
        assert!(!e.is_admin());
    }

    #[test]
    fn test_session_total() {
        let s = BeneficiarySession {
            id: "s1".into(),
            project_id: "p1".into(),
            date: "2025-01-02".into(),
            session_type: "distribution".into(),
            females: 30,
            males: 12,
            file: None,
        };
        assert_eq!(s.total(), 42);
    }
}
