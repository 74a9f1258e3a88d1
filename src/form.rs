//! Builds the input-widget lists for the create and edit dialogs.
//!
//! One widget per column, chosen by the column's kind and seeded with
//! existing values: text inputs carry the column's distinct values as
//! datalist options, foreign keys carry their option list, and edit forms
//! carry the row's current values. Configured default values suppress the
//! widget entirely — the value is injected at mutation time instead.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::existing::ExistingValues;
use crate::schema::{ColumnDescriptor, ColumnKind, FkOption, pretty_name};

/// Submitted form content: column name to entered JSON value.
pub type FormValues = BTreeMap<String, JsonValue>;

/// Description of one input control the host should render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum InputWidget {
    /// Shown but not editable (the primary key on edit forms).
    ReadOnly { column: String, value: JsonValue },
    /// Foreign-key selector; `selected` is the current raw key or null.
    FkSelect {
        column: String,
        options: Vec<FkOption>,
        selected: JsonValue,
    },
    /// Free text with the column's existing distinct values as suggestions.
    Datalist {
        column: String,
        options: Vec<String>,
        value: Option<String>,
    },
    Integer {
        column: String,
        value: Option<i64>,
    },
    Float {
        column: String,
        value: Option<f64>,
    },
    Date {
        column: String,
        value: Option<NaiveDate>,
    },
    Checkbox {
        column: String,
        value: bool,
    },
}

impl InputWidget {
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::ReadOnly { column, .. }
            | Self::FkSelect { column, .. }
            | Self::Datalist { column, .. }
            | Self::Integer { column, .. }
            | Self::Float { column, .. }
            | Self::Date { column, .. }
            | Self::Checkbox { column, .. } => column,
        }
    }
}

/// A complete dialog form: title plus ordered input widgets.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormSpec {
    pub title: String,
    pub fields: Vec<InputWidget>,
}

/// Build the create form: one widget per non-primary-key column, none for
/// columns covered by a default value.
#[must_use]
pub fn create_form(
    table: &str,
    columns: &[ColumnDescriptor],
    existing: &ExistingValues,
    defaults: &FormValues,
) -> FormSpec {
    let mut fields = Vec::new();
    for descriptor in columns {
        if descriptor.primary_key || defaults.contains_key(descriptor.name) {
            continue;
        }
        if let Some(widget) = input_widget(descriptor, existing, None) {
            fields.push(widget);
        }
    }
    FormSpec {
        title: format!("Add {}", pretty_name(table)),
        fields,
    }
}

/// Build the edit form for a row (as fetched by
/// [`find_row`](crate::mutation::find_row)): the same widgets seeded with
/// current values, the primary key shown read-only, defaulted columns
/// suppressed.
#[must_use]
pub fn edit_form(
    table: &str,
    columns: &[ColumnDescriptor],
    existing: &ExistingValues,
    row: &JsonValue,
    defaults: &FormValues,
) -> FormSpec {
    let mut fields = Vec::new();
    for descriptor in columns {
        let current = row.get(descriptor.name).cloned().unwrap_or(JsonValue::Null);
        if descriptor.primary_key {
            fields.push(InputWidget::ReadOnly {
                column: descriptor.name.to_string(),
                value: current,
            });
            continue;
        }
        if defaults.contains_key(descriptor.name) {
            continue;
        }
        if let Some(widget) = input_widget(descriptor, existing, Some(&current)) {
            fields.push(widget);
        }
    }
    FormSpec {
        title: format!("Edit {}", pretty_name(table)),
        fields,
    }
}

fn input_widget(
    descriptor: &ColumnDescriptor,
    existing: &ExistingValues,
    current: Option<&JsonValue>,
) -> Option<InputWidget> {
    let column = descriptor.name.to_string();
    match descriptor.kind() {
        ColumnKind::ForeignKey => {
            let options = existing
                .foreign
                .get(descriptor.name)
                .cloned()
                .unwrap_or_default();
            let selected = current.cloned().unwrap_or(JsonValue::Null);
            Some(InputWidget::FkSelect {
                column,
                options,
                selected,
            })
        }
        ColumnKind::Text => {
            let mut options = existing
                .text
                .get(descriptor.name)
                .cloned()
                .unwrap_or_default();
            let value = current
                .and_then(JsonValue::as_str)
                .map(std::string::ToString::to_string);
            if let Some(value) = &value {
                if !options.iter().any(|option| option == value) {
                    options.push(value.clone());
                }
            }
            Some(InputWidget::Datalist {
                column,
                options,
                value,
            })
        }
        ColumnKind::Integer => Some(InputWidget::Integer {
            column,
            value: current.and_then(JsonValue::as_i64),
        }),
        ColumnKind::Float => Some(InputWidget::Float {
            column,
            value: current.and_then(JsonValue::as_f64),
        }),
        ColumnKind::Date => Some(InputWidget::Date {
            column,
            value: current
                .and_then(JsonValue::as_str)
                .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()),
        }),
        ColumnKind::Boolean => Some(InputWidget::Checkbox {
            column,
            value: current.and_then(JsonValue::as_bool).unwrap_or(false),
        }),
        ColumnKind::PrimaryKey => None,
        ColumnKind::Unsupported => {
            tracing::debug!(column = descriptor.name, "skipping unsupported column in form");
            None
        }
    }
}
