// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};

use crate::{ColumnKind, EntityKind, FieldValue, Record, RecordId, RecordPayload, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
    /// Opened from an inactive row: read-only except for restore.
    Restore(RecordId),
}

impl FormMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "new",
            Self::Edit(_) => "edit",
            Self::Restore(_) => "restore",
        }
    }

    pub const fn record_id(self) -> Option<RecordId> {
        match self {
            Self::Create => None,
            Self::Edit(id) | Self::Restore(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordForm {
    pub kind: EntityKind,
    pub mode: FormMode,
    pub values: RecordPayload,
}

impl RecordForm {
    pub fn blank(kind: EntityKind) -> Self {
        let values = kind
            .schema()
            .columns
            .iter()
            .map(|column| {
                let value = match column.kind {
                    ColumnKind::Text => FieldValue::Text(String::new()),
                    ColumnKind::Bool => FieldValue::Bool(false),
                    _ => FieldValue::Null,
                };
                (column.key.to_owned(), value)
            })
            .collect();
        Self {
            kind,
            mode: FormMode::Create,
            values,
        }
    }

    pub fn edit(kind: EntityKind, record: &Record) -> Self {
        Self::from_record(kind, FormMode::Edit(record.id), record)
    }

    pub fn restore(kind: EntityKind, record: &Record) -> Self {
        Self::from_record(kind, FormMode::Restore(record.id), record)
    }

    fn from_record(kind: EntityKind, mode: FormMode, record: &Record) -> Self {
        let values = kind
            .schema()
            .columns
            .iter()
            .map(|column| {
                let value = record.get(column.key).cloned().unwrap_or(FieldValue::Null);
                (column.key.to_owned(), value)
            })
            .collect();
        Self { kind, mode, values }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.mode, FormMode::Restore(_))
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<()> {
        if self.is_read_only() {
            bail!("inactive records are read-only -- restore the record to edit it");
        }
        let schema = self.kind.schema();
        if schema.column(key).is_none() {
            bail!("{} has no field {key:?}", self.kind.as_str());
        }
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    /// Parses typed text for `key` according to the column kind.
    pub fn set_input(&mut self, key: &str, raw: &str) -> Result<()> {
        let column = self
            .kind
            .schema()
            .column(key)
            .with_context(|| format!("{} has no field {key:?}", self.kind.as_str()))?;
        let value = parse_input(column.kind, raw)
            .with_context(|| format!("{} {}", self.kind.label(), column.label.to_lowercase()))?;
        self.set_field(key, value)
    }

    pub fn validate(&self) -> Result<()> {
        for column in self.kind.schema().required_columns() {
            let missing = self
                .values
                .get(column.key)
                .is_none_or(FieldValue::is_blank);
            if missing {
                bail!(
                    "{} is required -- enter a {} and retry",
                    column.label,
                    column.label.to_lowercase()
                );
            }
        }
        Ok(())
    }

    pub fn payload(&self) -> RecordPayload {
        self.values.clone()
    }
}

pub fn parse_input(kind: ColumnKind, raw: &str) -> Result<FieldValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(match kind {
            ColumnKind::Text => FieldValue::Text(String::new()),
            _ => FieldValue::Null,
        });
    }

    let value = match kind {
        ColumnKind::Text => FieldValue::Text(raw.to_owned()),
        ColumnKind::Integer => FieldValue::Integer(
            trimmed
                .parse()
                .with_context(|| format!("{trimmed:?} is not a whole number"))?,
        ),
        ColumnKind::Decimal => FieldValue::Decimal(
            trimmed
                .replace(',', "")
                .parse()
                .with_context(|| format!("{trimmed:?} is not a number"))?,
        ),
        ColumnKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" | "on" => FieldValue::Bool(true),
            "n" | "no" | "false" | "0" | "off" => FieldValue::Bool(false),
            _ => bail!("{trimmed:?} is not yes/no"),
        },
        ColumnKind::Date => FieldValue::Date(parse_date(trimmed)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{FormMode, RecordForm, parse_input};
    use crate::{ColumnKind, EntityKind, FieldValue, Record, RecordId};
    use anyhow::Result;

    #[test]
    fn blank_form_fails_required_fields() {
        let form = RecordForm::blank(EntityKind::Customer);
        let error = form.validate().expect_err("blank customer is invalid");
        assert!(error.to_string().contains("Code is required"));
    }

    #[test]
    fn whitespace_does_not_satisfy_required() -> Result<()> {
        let mut form = RecordForm::blank(EntityKind::Department);
        form.set_input("code", "FIN")?;
        form.set_input("name", "   ")?;
        let error = form.validate().expect_err("blank name is invalid");
        assert!(error.to_string().contains("Name is required"));
        Ok(())
    }

    #[test]
    fn filled_form_validates() -> Result<()> {
        let mut form = RecordForm::blank(EntityKind::Meeting);
        form.set_input("title", "Quarterly review")?;
        form.set_input("meeting_date", "2026-03-31")?;
        form.validate()?;
        assert!(matches!(
            form.value("meeting_date"),
            Some(FieldValue::Date(_))
        ));
        Ok(())
    }

    #[test]
    fn restore_mode_is_read_only() {
        let record = Record::new(RecordId::new(5)).with("name", FieldValue::text("Old"));
        let mut form = RecordForm::restore(EntityKind::Department, &record);
        assert_eq!(form.mode, FormMode::Restore(RecordId::new(5)));
        assert!(form.is_read_only());
        assert!(form.set_field("name", FieldValue::text("New")).is_err());
        assert_eq!(form.value("name"), Some(&FieldValue::text("Old")));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut form = RecordForm::blank(EntityKind::Department);
        assert!(form.set_field("salary", FieldValue::Integer(1)).is_err());
    }

    #[test]
    fn parse_input_by_kind() -> Result<()> {
        assert_eq!(parse_input(ColumnKind::Integer, " 42 ")?, FieldValue::Integer(42));
        assert_eq!(
            parse_input(ColumnKind::Decimal, "1,250.50")?,
            FieldValue::Decimal(1250.5)
        );
        assert_eq!(parse_input(ColumnKind::Bool, "yes")?, FieldValue::Bool(true));
        assert_eq!(parse_input(ColumnKind::Integer, "")?, FieldValue::Null);
        assert!(parse_input(ColumnKind::Integer, "4.5").is_err());
        Ok(())
    }
}
