//! Per-render filter state, the widget set offered for it, and the fold
//! from entered values into a Sea-ORM [`Condition`].
//!
//! Filter state is reconstructed by the host from widget values on every
//! render; nothing here persists across passes. Composition never touches
//! the caller's base select — filters are returned as fresh `Condition`
//! values.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::existing::ExistingValues;
use crate::schema::{AdminResource, ColumnDescriptor, ColumnKind, FkOption};
use crate::value::db_value;

/// Sentinel option meaning "no filter" in text and foreign-key selectors.
pub const ALL_SENTINEL: &str = "ALL";

/// A value the user entered into one filter widget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// Text selector choice; [`ALL_SENTINEL`] and empty strings are no-ops.
    Text(String),
    /// Raw foreign-key value; JSON `null` (the sentinel option) is a no-op.
    Key(JsonValue),
    Integer(i64),
    Float(f64),
    /// Inclusive date range. Rows with a null date always pass.
    DateRange(NaiveDate, NaiveDate),
}

/// Mapping from column name to the value entered in its filter widget.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    entries: BTreeMap<String, FilterValue>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: FilterValue) {
        self.entries.insert(column.into(), value);
    }

    pub fn clear(&mut self, column: &str) {
        self.entries.remove(column);
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.entries.get(column)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.entries.iter()
    }
}

/// Description of one filter control the host should render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum FilterWidget {
    /// Selector over distinct values, [`ALL_SENTINEL`] first.
    Select { column: String, options: Vec<String> },
    /// Selector over foreign-key options, sentinel option first.
    FkSelect {
        column: String,
        options: Vec<FkOption>,
    },
    /// Two date pickers bounded by the observed range.
    DateRange {
        column: String,
        min: NaiveDate,
        max: NaiveDate,
    },
    IntegerInput { column: String },
    FloatInput { column: String },
}

impl FilterWidget {
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Select { column, .. }
            | Self::FkSelect { column, .. }
            | Self::DateRange { column, .. }
            | Self::IntegerInput { column }
            | Self::FloatInput { column } => column,
        }
    }
}

/// Build the filter widget set for a column list.
///
/// `filterable` restricts which columns get widgets (`None` means all);
/// `fixed` names columns whose filter is applied by configuration and so
/// never offered to the user. Primary keys, booleans, and unsupported
/// columns get no widget.
#[must_use]
pub fn filter_widgets(
    columns: &[ColumnDescriptor],
    filterable: Option<&[String]>,
    fixed: &[String],
    existing: &ExistingValues,
) -> Vec<FilterWidget> {
    let mut widgets = Vec::new();
    for descriptor in columns {
        let name = descriptor.name;
        if let Some(allowed) = filterable {
            if !allowed.iter().any(|column| column.as_str() == name) {
                continue;
            }
        }
        if fixed.iter().any(|column| column.as_str() == name) {
            continue;
        }

        match descriptor.kind() {
            ColumnKind::Text => {
                let mut options = vec![ALL_SENTINEL.to_string()];
                if let Some(values) = existing.text.get(name) {
                    options.extend(values.iter().cloned());
                }
                widgets.push(FilterWidget::Select {
                    column: name.to_string(),
                    options,
                });
            }
            ColumnKind::ForeignKey => {
                let mut options = vec![FkOption::all()];
                if let Some(values) = existing.foreign.get(name) {
                    options.extend(values.iter().cloned());
                }
                widgets.push(FilterWidget::FkSelect {
                    column: name.to_string(),
                    options,
                });
            }
            ColumnKind::Date => {
                if let Some(&(min, max)) = existing.dates.get(name) {
                    widgets.push(FilterWidget::DateRange {
                        column: name.to_string(),
                        min,
                        max,
                    });
                }
            }
            ColumnKind::Integer => widgets.push(FilterWidget::IntegerInput {
                column: name.to_string(),
            }),
            ColumnKind::Float => widgets.push(FilterWidget::FloatInput {
                column: name.to_string(),
            }),
            ColumnKind::PrimaryKey | ColumnKind::Boolean => {}
            ColumnKind::Unsupported => {
                tracing::debug!(column = name, "skipping unsupported column in filters");
            }
        }
    }
    widgets
}

/// Fold the filter state into a query condition.
///
/// Sentinel and empty values contribute nothing. Foreign-key filters
/// match on the raw key column, never on the joined label. Date ranges
/// translate to `(col >= from AND col <= to) OR col IS NULL`, so rows
/// with a null date always pass; they are skipped entirely when
/// `include_date_filters` is false (the rolling-balance query).
#[must_use]
pub fn build_condition<R: AdminResource>(
    state: &FilterState,
    include_date_filters: bool,
) -> Condition {
    let mut condition = Condition::all();

    for descriptor in R::columns() {
        let Some(value) = state.get(descriptor.name) else {
            continue;
        };
        let Some(column) = R::column(descriptor.name) else {
            continue;
        };

        match (descriptor.kind(), value) {
            (ColumnKind::Text, FilterValue::Text(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() || trimmed == ALL_SENTINEL {
                    continue;
                }
                condition = condition.add(column.eq(trimmed));
            }
            (ColumnKind::ForeignKey, FilterValue::Key(key)) => {
                if key.is_null() {
                    continue;
                }
                match db_value(&descriptor, key) {
                    Ok(key) => condition = condition.add(column.eq(key)),
                    Err(err) => {
                        tracing::debug!(column = descriptor.name, %err, "ignoring filter value");
                    }
                }
            }
            (ColumnKind::Integer, FilterValue::Integer(number)) => {
                condition = condition.add(column.eq(*number));
            }
            (ColumnKind::Float, FilterValue::Float(number)) => {
                condition = condition.add(column.eq(*number));
            }
            (ColumnKind::Date, FilterValue::DateRange(from, until)) => {
                if !include_date_filters {
                    continue;
                }
                let in_range = Condition::all().add(column.gte(*from)).add(column.lte(*until));
                condition = condition.add(Condition::any().add(in_range).add(column.is_null()));
            }
            (kind, value) => {
                tracing::debug!(
                    column = descriptor.name,
                    ?kind,
                    ?value,
                    "filter value does not match column kind; ignored"
                );
            }
        }
    }

    condition
}
