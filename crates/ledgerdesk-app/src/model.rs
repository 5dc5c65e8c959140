// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use time::{Date, OffsetDateTime};

use crate::ids::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(Date),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Null and blank text both count as "no value" for sorting and validation.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Decimal(value) if value.is_finite() => Some(*value),
            Self::Text(value) => value.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Decimal(value) => format!("{value:.2}"),
            Self::Bool(true) => "yes".to_owned(),
            Self::Bool(false) => "no".to_owned(),
            Self::Date(value) => value.to_string(),
        }
    }

    /// Total order over non-blank values. Values rank by class first
    /// (numbers, including numeric text, then dates, then booleans, then other
    /// text) and only compare within a class: numbers numerically, dates
    /// chronologically, text by case-folded display.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self.sort_key(), other.sort_key()) {
            (SortKey::Number(left), SortKey::Number(right)) => left.total_cmp(&right),
            (SortKey::Date(left), SortKey::Date(right)) => left.cmp(&right),
            (SortKey::Bool(left), SortKey::Bool(right)) => left.cmp(&right),
            (SortKey::Text(left), SortKey::Text(right)) => left.cmp(&right),
            (left, right) => left.rank().cmp(&right.rank()),
        }
    }

    fn sort_key(&self) -> SortKey {
        if let Some(number) = self.as_number() {
            return SortKey::Number(number);
        }
        match self {
            Self::Date(value) => SortKey::Date(*value),
            Self::Bool(value) => SortKey::Bool(*value),
            other => SortKey::Text(other.display().to_lowercase()),
        }
    }
}

enum SortKey {
    Number(f64),
    Date(Date),
    Bool(bool),
    Text(String),
}

impl SortKey {
    const fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Date(_) => 1,
            Self::Bool(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: FieldValue) -> Self {
        self.fields.insert(key.to_owned(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn display(&self, key: &str) -> String {
        if key == "id" {
            return self.id.to_string();
        }
        self.get(key).map(FieldValue::display).unwrap_or_default()
    }
}

pub type RecordPayload = BTreeMap<String, FieldValue>;

/// Audit data sent along with soft-delete and restore calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionMeta {
    pub user_id: UserId,
    pub at: OffsetDateTime,
}

impl ActionMeta {
    pub fn now(user_id: UserId) -> Self {
        Self {
            user_id,
            at: OffsetDateTime::now_utc(),
        }
    }
}

/// One server page of active records. `page` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl Page {
    pub fn empty(limit: u32) -> Self {
        Self {
            records: Vec::new(),
            page: 1,
            limit,
            total: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.limit)
    }
}

pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 1;
    }
    let limit = u64::from(limit);
    let pages = total.saturating_add(limit - 1) / limit;
    pages.clamp(1, u64::from(u32::MAX)) as u32
}

/// One page of rows as an adapter returns it; `R` is the raw row type before
/// normalization and [`Record`] after.
#[derive(Debug, Clone, PartialEq)]
pub struct PageData<R> {
    pub records: Vec<R>,
    pub total: u64,
}

/// Correlates an issued request with its response. Issued in increasing
/// order per list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketCounter {
    last: u64,
}

impl TicketCounter {
    pub fn issue(&mut self) -> Ticket {
        self.last = self.last.saturating_add(1);
        Ticket(self.last)
    }
}

/// What happened to a response handed to one of the list sub-states.
#[derive(Debug)]
pub enum Resolution {
    Applied,
    Failed(anyhow::Error),
    /// Superseded by a newer request; dropped without touching state.
    Stale,
}

impl Resolution {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, total_pages};
    use std::cmp::Ordering;

    #[test]
    fn numeric_text_compares_numerically() {
        let nine = FieldValue::text("9");
        let ten = FieldValue::Integer(10);
        assert_eq!(nine.cmp_value(&ten), Ordering::Less);
    }

    #[test]
    fn text_compares_case_insensitively() {
        let lower = FieldValue::text("apple");
        let upper = FieldValue::text("Banana");
        assert_eq!(lower.cmp_value(&upper), Ordering::Less);
        assert_eq!(
            FieldValue::text("ACME").cmp_value(&FieldValue::text("acme")),
            Ordering::Equal
        );
    }

    #[test]
    fn blank_covers_null_and_whitespace() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::text("  ").is_blank());
        assert!(!FieldValue::Integer(0).is_blank());
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 25), 1);
        assert_eq!(total_pages(60, 25), 3);
        assert_eq!(total_pages(50, 25), 2);
        assert_eq!(total_pages(7, 0), 1);
    }
}
