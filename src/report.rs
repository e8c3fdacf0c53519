// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregation of a user's income, expense and budget rows into the report
//! payload behind every dashboard view.
//!
//! Everything here is a pure function of its inputs. Rows that break a
//! precondition are skipped and reported as [`InvalidInput`] warnings instead
//! of failing the whole report.

use crate::models::{BudgetRecord, ExpenseRecord, IncomeRecord};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A calendar month, keyed by its first day. Orders chronologically and
/// serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid month '{0}', expected YYYY-MM")]
pub struct YearMonthError(pub String);

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || YearMonthError(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(err)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(err());
        }
        let year: i32 = y.parse().map_err(|_| err())?;
        let month: u32 = m.parse().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a stored record date. Accepts `YYYY-MM-DD`, optionally followed by a time part.
pub fn parse_record_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = match s.char_indices().nth(10) {
        Some((idx, 'T' | ' ')) => &s[..idx],
        Some(_) => return None,
        None => s,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
    Budget,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
            RecordKind::Budget => "budget",
        })
    }
}

/// A row the caller should have rejected before it reached the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("{kind} #{id}: missing amount, row skipped")]
    MissingAmount { kind: RecordKind, id: i64 },
    #[error("{kind} #{id}: negative amount {amount}, row skipped")]
    NegativeAmount {
        kind: RecordKind,
        id: i64,
        amount: Decimal,
    },
    #[error("{kind} #{id}: missing date, row skipped")]
    MissingDate { kind: RecordKind, id: i64 },
    #[error("{kind} #{id}: missing category, row skipped")]
    MissingCategory { kind: RecordKind, id: i64 },
    #[error("{kind} #{id}: amount overflows the running total, row skipped")]
    AmountOverflow { kind: RecordKind, id: i64 },
    /// The row still counts toward totals; only the monthly series leaves it out.
    #[error("{kind} #{id}: unparseable date '{date}', left out of the monthly series")]
    UnparseableDate {
        kind: RecordKind,
        id: i64,
        date: String,
    },
}

impl InvalidInput {
    pub fn record_id(&self) -> i64 {
        match self {
            InvalidInput::MissingAmount { id, .. }
            | InvalidInput::NegativeAmount { id, .. }
            | InvalidInput::MissingDate { id, .. }
            | InvalidInput::MissingCategory { id, .. }
            | InvalidInput::AmountOverflow { id, .. }
            | InvalidInput::UnparseableDate { id, .. } => *id,
        }
    }

    /// Whether the row was dropped entirely rather than only from the time series.
    pub fn skipped(&self) -> bool {
        !matches!(self, InvalidInput::UnparseableDate { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub year_month: YearMonth,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budgets {
    pub total: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub totals: Totals,
    pub monthly_income: Vec<MonthTotal>,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub budgets: Budgets,
}

impl ReportPayload {
    /// The last `n` months of the income series, still in ascending order.
    pub fn recent_months(&self, n: usize) -> &[MonthTotal] {
        let start = self.monthly_income.len().saturating_sub(n);
        &self.monthly_income[start..]
    }

    pub fn is_empty(&self) -> bool {
        self.monthly_income.is_empty()
            && self.expenses_by_category.is_empty()
            && self.budgets.by_category.is_empty()
            && self.totals.income.is_zero()
            && self.totals.expenses.is_zero()
    }
}

/// Payload plus the warnings collected while building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub payload: ReportPayload,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_warnings"
    )]
    pub warnings: Vec<InvalidInput>,
}

fn serialize_warnings<S: Serializer>(
    warnings: &[InvalidInput],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(warnings.iter().map(|w| w.to_string()))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn checked_amount(
    kind: RecordKind,
    id: i64,
    amount: Option<Decimal>,
    warnings: &mut Vec<InvalidInput>,
) -> Option<Decimal> {
    match amount {
        None => {
            warnings.push(InvalidInput::MissingAmount { kind, id });
            None
        }
        Some(a) if a.is_sign_negative() && !a.is_zero() => {
            warnings.push(InvalidInput::NegativeAmount {
                kind,
                id,
                amount: a,
            });
            None
        }
        Some(a) => Some(a),
    }
}

/// Adds `amount` to `total`, or records an overflow warning and leaves `total` alone.
///
/// Amounts are non-negative, so every per-month or per-category subtotal is
/// bounded by the running total checked here.
fn add_to_total(
    total: &mut Decimal,
    amount: Decimal,
    kind: RecordKind,
    id: i64,
    warnings: &mut Vec<InvalidInput>,
) -> bool {
    match total.checked_add(amount) {
        Some(sum) => {
            *total = sum;
            true
        }
        None => {
            warnings.push(InvalidInput::AmountOverflow { kind, id });
            false
        }
    }
}

/// Sums per category and returns the groups with the largest total first.
/// Equal totals are ordered by category name.
fn by_category_desc(groups: BTreeMap<String, Decimal>) -> Vec<CategoryTotal> {
    let mut items: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    // stable: BTreeMap already yields names ascending
    items.sort_by(|a, b| b.total.cmp(&a.total));
    items
}

/// Builds the report payload for one user's rows.
///
/// Categories are grouped by their exact stored text. Expense and budget
/// categories are grouped independently; a category that only appears on one
/// side is never dropped from that side.
pub fn build_report(
    income: &[IncomeRecord],
    expense: &[ExpenseRecord],
    budget: &[BudgetRecord],
) -> Report {
    let mut warnings = Vec::new();

    let mut total_income = Decimal::ZERO;
    let mut monthly: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for rec in income {
        let Some(amount) = checked_amount(RecordKind::Income, rec.id, rec.amount, &mut warnings)
        else {
            continue;
        };
        let Some(date) = non_blank(rec.date.as_deref()) else {
            warnings.push(InvalidInput::MissingDate {
                kind: RecordKind::Income,
                id: rec.id,
            });
            continue;
        };
        if !add_to_total(&mut total_income, amount, RecordKind::Income, rec.id, &mut warnings) {
            continue;
        }
        match parse_record_date(date) {
            Some(d) => *monthly.entry(YearMonth::of(d)).or_insert(Decimal::ZERO) += amount,
            None => warnings.push(InvalidInput::UnparseableDate {
                kind: RecordKind::Income,
                id: rec.id,
                date: date.to_string(),
            }),
        }
    }

    let mut total_expenses = Decimal::ZERO;
    let mut spent: BTreeMap<String, Decimal> = BTreeMap::new();
    for rec in expense {
        let Some(amount) = checked_amount(RecordKind::Expense, rec.id, rec.amount, &mut warnings)
        else {
            continue;
        };
        if non_blank(rec.date.as_deref()).is_none() {
            warnings.push(InvalidInput::MissingDate {
                kind: RecordKind::Expense,
                id: rec.id,
            });
            continue;
        }
        let Some(category) = rec.category.as_deref().filter(|c| !c.trim().is_empty()) else {
            warnings.push(InvalidInput::MissingCategory {
                kind: RecordKind::Expense,
                id: rec.id,
            });
            continue;
        };
        if !add_to_total(
            &mut total_expenses,
            amount,
            RecordKind::Expense,
            rec.id,
            &mut warnings,
        ) {
            continue;
        }
        *spent.entry(category.to_string()).or_insert(Decimal::ZERO) += amount;
    }

    let mut budget_total = Decimal::ZERO;
    let mut budgeted: BTreeMap<String, Decimal> = BTreeMap::new();
    for rec in budget {
        let Some(amount) = checked_amount(RecordKind::Budget, rec.id, rec.amount, &mut warnings)
        else {
            continue;
        };
        let Some(category) = rec.category.as_deref().filter(|c| !c.trim().is_empty()) else {
            warnings.push(InvalidInput::MissingCategory {
                kind: RecordKind::Budget,
                id: rec.id,
            });
            continue;
        };
        if !add_to_total(&mut budget_total, amount, RecordKind::Budget, rec.id, &mut warnings) {
            continue;
        }
        // duplicate rows for a category add up
        *budgeted.entry(category.to_string()).or_insert(Decimal::ZERO) += amount;
    }

    let by_category: Vec<CategoryTotal> = budgeted
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();

    Report {
        payload: ReportPayload {
            totals: Totals {
                income: total_income,
                expenses: total_expenses,
                net: total_income - total_expenses,
            },
            monthly_income: monthly
                .into_iter()
                .map(|(year_month, total)| MonthTotal { year_month, total })
                .collect(),
            expenses_by_category: by_category_desc(spent),
            budgets: Budgets {
                total: budget_total,
                by_category,
            },
        },
        warnings,
    }
}

/// One row of the budget-vs-actual view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub category: String,
    pub budgeted: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

/// Joins spending and budget totals over the union of their categories.
///
/// A category missing on either side counts as zero there. Rows come back
/// ordered by category name.
pub fn budget_vs_actual(
    spent: &[CategoryTotal],
    budgeted: &[CategoryTotal],
) -> Vec<BudgetComparison> {
    let mut union: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for c in budgeted {
        union.entry(c.category.as_str()).or_default().0 += c.total;
    }
    for c in spent {
        union.entry(c.category.as_str()).or_default().1 += c.total;
    }
    union
        .into_iter()
        .map(|(category, (budgeted, spent))| BudgetComparison {
            category: category.to_string(),
            budgeted,
            spent,
            remaining: budgeted - spent,
        })
        .collect()
}
