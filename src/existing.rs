//! Harvests the values already present in a table: distinct strings for
//! datalist/selector options, observed date ranges for date pickers, and
//! `(key, label)` option lists for foreign-key columns.
//!
//! Everything here is recomputed per render pass. On large tables the
//! distinct and option scans are the expensive part of a render; the
//! 10 000-row cap bounds the damage but the cost is a known limitation.

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Iterable, ModelTrait,
    PrimaryKeyToColumn, QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::schema::{AdminResource, ColumnKind, FkOption};
use crate::value::json_value;

/// Row cap for distinct-value and foreign-key option scans.
pub const VALUE_SCAN_LIMIT: u64 = 10_000;

/// Fallback width of the date-picker range when a table has no rows.
pub const EMPTY_TABLE_DATE_WINDOW_DAYS: i64 = 30;

/// Values observed in the table, keyed by column name.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ExistingValues {
    /// Distinct values per text column, nulls dropped.
    pub text: HashMap<String, Vec<String>>,
    /// Observed `(min, max)` per date column.
    pub dates: HashMap<String, (NaiveDate, NaiveDate)>,
    /// Options per foreign-key column.
    pub foreign: HashMap<String, Vec<FkOption>>,
}

/// Load existing values for every text, date, and foreign-key column of
/// the resource.
///
/// # Errors
///
/// Returns the first `DbErr` raised by any of the per-column scans.
pub async fn load<R: AdminResource>(db: &DatabaseConnection) -> Result<ExistingValues, DbErr> {
    let mut existing = ExistingValues::default();
    let today = Utc::now().date_naive();

    for descriptor in R::columns() {
        match descriptor.kind() {
            ColumnKind::Text => {
                let Some(column) = R::column(descriptor.name) else {
                    continue;
                };
                let values: Vec<Option<String>> = R::EntityType::find()
                    .select_only()
                    .column(column)
                    .distinct()
                    .limit(VALUE_SCAN_LIMIT)
                    .into_tuple()
                    .all(db)
                    .await?;
                existing.text.insert(
                    descriptor.name.to_string(),
                    values.into_iter().flatten().collect(),
                );
            }
            ColumnKind::Date => {
                let Some(column) = R::column(descriptor.name) else {
                    continue;
                };
                let bounds: Option<(Option<NaiveDate>, Option<NaiveDate>)> = R::EntityType::find()
                    .select_only()
                    .expr(column.min())
                    .expr(column.max())
                    .into_tuple()
                    .one(db)
                    .await?;
                let (min, max) = bounds.unwrap_or((None, None));
                existing.dates.insert(
                    descriptor.name.to_string(),
                    (
                        min.unwrap_or_else(|| today - Duration::days(EMPTY_TABLE_DATE_WINDOW_DAYS)),
                        max.unwrap_or(today),
                    ),
                );
            }
            ColumnKind::ForeignKey => {
                let mut options = R::foreign_key_options(db, descriptor.name).await?;
                options.truncate(usize::try_from(VALUE_SCAN_LIMIT).unwrap_or(usize::MAX));
                existing.foreign.insert(descriptor.name.to_string(), options);
            }
            _ => {}
        }
    }

    tracing::debug!(
        table = R::TABLE_NAME,
        text_columns = existing.text.len(),
        date_columns = existing.dates.len(),
        fk_columns = existing.foreign.len(),
        "loaded existing values"
    );
    Ok(existing)
}

/// Build the option list for a foreign-key column from the referenced
/// entity: every row (capped at [`VALUE_SCAN_LIMIT`]) as its primary-key
/// value plus its `Display` rendering.
///
/// # Errors
///
/// Returns any `DbErr` raised while reading the referenced table.
pub async fn fk_options_from<E, C>(db: &C) -> Result<Vec<FkOption>, DbErr>
where
    E: EntityTrait,
    E::Model: std::fmt::Display,
    C: ConnectionTrait,
{
    let Some(key_column) = E::PrimaryKey::iter().next().map(PrimaryKeyToColumn::into_column)
    else {
        return Ok(Vec::new());
    };

    let rows = E::find().limit(VALUE_SCAN_LIMIT).all(db).await?;
    Ok(rows
        .iter()
        .map(|row| FkOption::new(json_value(row.get(key_column)), row.to_string()))
        .collect())
}
