// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::EntitySchema;

/// Column key -> shown. Always total over the declared columns.
pub type ColumnVisibility = BTreeMap<String, bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    KeepOneColumnVisible,
}

/// Live column visibility plus the draft edited by the column picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibilitySet {
    order: Vec<String>,
    defaults: ColumnVisibility,
    live: ColumnVisibility,
    pending: ColumnVisibility,
    picker_open: bool,
}

impl ColumnVisibilitySet {
    pub fn new<'a>(columns: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let mut order = Vec::new();
        let mut defaults = ColumnVisibility::new();
        for (key, visible) in columns {
            if defaults.insert(key.to_owned(), visible).is_none() {
                order.push(key.to_owned());
            }
        }
        Self {
            order,
            live: defaults.clone(),
            pending: defaults.clone(),
            defaults,
            picker_open: false,
        }
    }

    pub fn for_schema(schema: &EntitySchema) -> Self {
        Self::new(
            schema
                .columns
                .iter()
                .map(|column| (column.key, column.default_visible)),
        )
    }

    /// Builds the live map from a previously saved one. Columns the saved map
    /// does not know take their default; keys that are no longer declared are
    /// dropped.
    pub fn reconcile(mut self, saved: &ColumnVisibility) -> Self {
        self.live = self
            .order
            .iter()
            .map(|key| {
                let visible = saved
                    .get(key)
                    .or_else(|| self.defaults.get(key))
                    .copied()
                    .unwrap_or(true);
                (key.clone(), visible)
            })
            .collect();
        self.pending = self.live.clone();
        self
    }

    pub fn live(&self) -> &ColumnVisibility {
        &self.live
    }

    pub fn pending(&self) -> &ColumnVisibility {
        &self.pending
    }

    pub fn defaults(&self) -> &ColumnVisibility {
        &self.defaults
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.live.get(key).copied().unwrap_or(false)
    }

    /// Visible column keys in declaration order.
    pub fn visible_keys(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|key| self.is_visible(key))
            .map(String::as_str)
            .collect()
    }

    pub fn open_picker(&mut self) {
        self.pending = self.live.clone();
        self.picker_open = true;
    }

    /// Flips `key` in the draft. Unknown keys are ignored.
    pub fn toggle(&mut self, key: &str) -> bool {
        match self.pending.get_mut(key) {
            Some(visible) => {
                *visible = !*visible;
                true
            }
            None => false,
        }
    }

    pub fn commit(&mut self) -> CommitOutcome {
        if !self.pending.values().any(|visible| *visible) {
            return CommitOutcome::KeepOneColumnVisible;
        }
        self.live = self.pending.clone();
        self.picker_open = false;
        CommitOutcome::Committed
    }

    pub fn cancel(&mut self) {
        self.pending = self.live.clone();
        self.picker_open = false;
    }

    /// Resets the draft, not the live map; takes effect on `commit`.
    pub fn restore_defaults(&mut self) {
        self.pending = self.defaults.clone();
    }
}
