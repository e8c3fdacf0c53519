// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Categories every user can file expenses and budgets under without adding them first.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Housing",
    "Food",
    "Transportation",
    "Utilities",
    "Healthcare",
    "Entertainment",
    "Shopping",
    "Savings",
    "Other",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub created_at: String,
}

/// Recurrence tag stored on a record. Informational only; nothing projects future rows from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cadence {
    #[default]
    OneTime,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Cadence {
    pub const ALL: [Cadence; 6] = [
        Cadence::OneTime,
        Cadence::Weekly,
        Cadence::Biweekly,
        Cadence::Monthly,
        Cadence::Quarterly,
        Cadence::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::OneTime => "one-time",
            Cadence::Weekly => "weekly",
            Cadence::Biweekly => "biweekly",
            Cadence::Monthly => "monthly",
            Cadence::Quarterly => "quarterly",
            Cadence::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid cadence '{0}', expected one of one-time|weekly|biweekly|monthly|quarterly|yearly")]
pub struct CadenceError(pub String);

impl FromStr for Cadence {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(|c: char| c == '_' || c == ' ', "-");
        Cadence::ALL
            .into_iter()
            .find(|c| c.as_str() == norm || (norm == "onetime" && *c == Cadence::OneTime))
            .ok_or_else(|| CadenceError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub id: i64,
    pub user_key: String,
    pub source: String,
    pub amount: Option<Decimal>,
    pub date: Option<String>, // YYYY-MM-DD as stored
    pub cadence: Cadence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub user_key: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<String>,
    pub cadence: Cadence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub id: i64,
    pub user_key: String,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub cadence: Cadence,
}
