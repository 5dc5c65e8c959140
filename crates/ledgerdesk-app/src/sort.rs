// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Single-key sort state. `(Some(key), None)` is a transient that the next
/// header click turns into an ascending sort.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(key: &str, direction: SortDirection) -> Self {
        Self {
            key: Some(key.to_owned()),
            direction: Some(direction),
        }
    }

    /// The active key and direction, or `None` when rows fall back to id order.
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        match (&self.key, self.direction) {
            (Some(key), Some(direction)) => Some((key.as_str(), direction)),
            _ => None,
        }
    }

    /// Header click: asc, then desc, then cleared. A different key always
    /// starts over at asc.
    pub fn cycle(&mut self, key: &str) {
        let same_key = self.key.as_deref() == Some(key);
        *self = match (same_key, self.direction) {
            (true, None) | (false, _) => Self::by(key, SortDirection::Asc),
            (true, Some(SortDirection::Asc)) => Self::by(key, SortDirection::Desc),
            (true, Some(SortDirection::Desc)) => Self::none(),
        };
    }
}

/// Returns `records` ordered by `state`. Blank values (missing, null, empty
/// text) sort first in both directions; ties and the unsorted case fall back
/// to ascending id.
pub fn sort_records(records: &[Record], state: &SortState) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|left, right| compare_records(left, right, state));
    sorted
}

fn compare_records(left: &Record, right: &Record, state: &SortState) -> Ordering {
    let Some((key, direction)) = state.active() else {
        return left.id.cmp(&right.id);
    };

    let left_value = sort_value(left, key);
    let right_value = sort_value(right, key);
    let order = match (left_value, right_value) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left_value), Some(right_value)) => match direction {
            SortDirection::Asc => left_value.cmp_value(&right_value),
            SortDirection::Desc => left_value.cmp_value(&right_value).reverse(),
        },
    };
    order.then_with(|| left.id.cmp(&right.id))
}

fn sort_value(record: &Record, key: &str) -> Option<FieldValue> {
    if key == "id" {
        return Some(FieldValue::Integer(record.id.get()));
    }
    record.get(key).filter(|value| !value.is_blank()).cloned()
}
