// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! JSON record normalization shared by the storage and HTTP backends.
//!
//! Source systems disagree on casing and separators (`Id`, `ID`, `id`,
//! `CreditLimit`, `credit_limit`). Everything that guesses at field names
//! lives here, driven by the entity's declared columns; the list view only
//! ever sees normalized [`Record`]s.

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Map, Value};
use time::Date;
use time::macros::format_description;

use crate::{ColumnKind, EntityKind, EntitySchema, FieldValue, Record, RecordId, RecordPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonNormalizer {
    schema: EntitySchema,
}

impl JsonNormalizer {
    pub const fn new(kind: EntityKind) -> Self {
        Self {
            schema: kind.schema(),
        }
    }

    pub fn schema(&self) -> EntitySchema {
        self.schema
    }

    pub fn normalize(&self, raw: &Value) -> Result<Record> {
        let object = raw
            .as_object()
            .ok_or_else(|| anyhow!("expected a JSON object for a {} record", self.kind_label()))?;

        let id = find_key(object, "id")
            .ok_or_else(|| anyhow!("{} record is missing an id", self.kind_label()))?;
        let id = json_integer(id).with_context(|| format!("{} record id", self.kind_label()))?;

        let mut record = Record::new(RecordId::new(id));
        for column in self.schema.columns {
            let value = match find_key(object, column.key) {
                Some(value) => field_from_json(column.kind, value).with_context(|| {
                    format!("{} record {id}: field {}", self.kind_label(), column.key)
                })?,
                None => FieldValue::Null,
            };
            record.fields.insert(column.key.to_owned(), value);
        }
        Ok(record)
    }

    pub fn payload_to_json(&self, payload: &RecordPayload) -> Value {
        let mut object = Map::new();
        for column in self.schema.columns {
            if let Some(value) = payload.get(column.key) {
                object.insert(column.key.to_owned(), field_to_json(value));
            }
        }
        Value::Object(object)
    }

    fn kind_label(&self) -> &'static str {
        self.schema.kind.as_str()
    }
}

fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_key<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = object.get(key) {
        return Some(value);
    }
    let folded = fold_key(key);
    object
        .iter()
        .find(|(candidate, _)| fold_key(candidate) == folded)
        .map(|(_, value)| value)
}

fn json_integer(value: &Value) -> Result<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| anyhow!("expected an integer, got {number}")),
        Value::String(text) => text
            .trim()
            .parse()
            .with_context(|| format!("expected an integer, got {text:?}")),
        other => bail!("expected an integer, got {other}"),
    }
}

fn json_decimal(value: &Value) -> Result<f64> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| anyhow!("expected a number, got {number}")),
        Value::String(text) => text
            .trim()
            .parse()
            .with_context(|| format!("expected a number, got {text:?}")),
        other => bail!("expected a number, got {other}"),
    }
}

pub fn parse_date(raw: &str) -> Result<Date> {
    let trimmed = raw.trim();
    // Timestamps like 2026-01-09T00:00:00Z carry the date in the first ten chars.
    let day = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("expected a YYYY-MM-DD date, got {raw:?}"))
}

pub fn field_from_json(kind: ColumnKind, value: &Value) -> Result<FieldValue> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }
    if let Value::String(text) = value
        && text.trim().is_empty()
        && kind != ColumnKind::Text
    {
        return Ok(FieldValue::Null);
    }

    let field = match kind {
        ColumnKind::Text => match value {
            Value::String(text) => FieldValue::Text(text.clone()),
            Value::Number(number) => FieldValue::Text(number.to_string()),
            Value::Bool(flag) => FieldValue::Text(flag.to_string()),
            other => bail!("expected text, got {other}"),
        },
        ColumnKind::Integer => FieldValue::Integer(json_integer(value)?),
        ColumnKind::Decimal => FieldValue::Decimal(json_decimal(value)?),
        ColumnKind::Bool => match value {
            Value::Bool(flag) => FieldValue::Bool(*flag),
            Value::Number(number) => FieldValue::Bool(number.as_i64().unwrap_or(0) != 0),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => FieldValue::Bool(true),
                "0" | "false" | "no" | "off" => FieldValue::Bool(false),
                _ => bail!("expected a boolean, got {text:?}"),
            },
            other => bail!("expected a boolean, got {other}"),
        },
        ColumnKind::Date => match value {
            Value::String(text) => FieldValue::Date(parse_date(text)?),
            other => bail!("expected a date string, got {other}"),
        },
    };
    Ok(field)
}

pub fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(text) => Value::String(text.clone()),
        FieldValue::Integer(number) => Value::from(*number),
        FieldValue::Decimal(number) => {
            serde_json::Number::from_f64(*number).map_or(Value::Null, Value::Number)
        }
        FieldValue::Bool(flag) => Value::Bool(*flag),
        FieldValue::Date(date) => Value::String(date.to_string()),
    }
}
