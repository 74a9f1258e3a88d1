//! Composes the select statement behind the grid: base statement, fixed
//! filters, ordering with a stable tie-breaker, pagination, counting, and
//! the JSON page fetch.
//!
//! Every function takes the select by value and returns a new one; the
//! caller keeps its own clone of the base when it needs to re-filter.

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde_json::Value as JsonValue;

use crate::schema::AdminResource;
use crate::value::db_value;

/// The statement the grid reads from: the caller's select when supplied,
/// otherwise a blanket select of the entity.
#[must_use]
pub fn base_select<R: AdminResource>(
    read_from: Option<Select<R::EntityType>>,
) -> Select<R::EntityType> {
    read_from.unwrap_or_else(R::EntityType::find)
}

/// Apply configured always-on filters (`column = value`) to the base.
///
/// # Errors
///
/// Returns a `DbErr` when a fixed value cannot be coerced to its
/// column's type.
pub fn apply_fixed_filters<R: AdminResource>(
    select: Select<R::EntityType>,
    fixed: &[(String, JsonValue)],
) -> Result<Select<R::EntityType>, DbErr> {
    let columns = R::columns();
    let mut select = select;
    for (name, value) in fixed {
        let descriptor = columns
            .iter()
            .find(|descriptor| descriptor.name == name.as_str())
            .ok_or_else(|| DbErr::Custom(format!("unknown fixed filter column `{name}`")))?;
        let column = R::column(name)
            .ok_or_else(|| DbErr::Custom(format!("unknown fixed filter column `{name}`")))?;
        select = select.filter(column.eq(db_value(descriptor, value)?));
    }
    Ok(select)
}

/// Restrict the select with a composed filter condition.
#[must_use]
pub fn filtered<R: AdminResource>(
    select: Select<R::EntityType>,
    condition: Condition,
) -> Select<R::EntityType> {
    select.filter(condition)
}

/// Order by the configured column ascending, with the primary key always
/// appended as a stable tie-breaker. An unknown column name falls back to
/// primary-key order alone.
#[must_use]
pub fn ordered<R: AdminResource>(
    select: Select<R::EntityType>,
    order_by: Option<&str>,
) -> Select<R::EntityType> {
    let select = match order_by.and_then(R::column) {
        Some(column) => select.order_by(column, Order::Asc),
        None => {
            if let Some(name) = order_by {
                tracing::debug!(column = name, "unknown order column; using key order");
            }
            select
        }
    };
    select.order_by(R::ID_COLUMN, Order::Asc)
}

/// Window the select to one page. Pages are 1-indexed.
#[must_use]
pub fn paged<E: EntityTrait>(select: Select<E>, page: u64, page_size: u64) -> Select<E> {
    select.offset(page_offset(page, page_size)).limit(page_size)
}

/// Offset of the first row of a 1-indexed page.
#[must_use]
pub const fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1) * page_size
}

/// Count the rows the select would produce. Errors degrade to zero with a
/// warning so a broken count cannot take the whole grid down.
pub async fn count_rows<E, C>(select: Select<E>, db: &C) -> u64
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    match select.count(db).await {
        Ok(count) => count,
        Err(err) => {
            tracing::warn!(%err, "row count failed; treating as empty");
            0
        }
    }
}

/// Fetch the page's rows as JSON maps keyed by column name.
///
/// # Errors
///
/// Returns any `DbErr` raised by the query.
pub async fn fetch_page<E, C>(select: Select<E>, db: &C) -> Result<Vec<JsonValue>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    select.into_json().all(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_one_indexed() {
        assert_eq!(page_offset(1, 50), 0);
        assert_eq!(page_offset(2, 50), 50);
        assert_eq!(page_offset(4, 200), 600);
    }

    #[test]
    fn page_zero_behaves_like_page_one() {
        assert_eq!(page_offset(0, 50), 0);
    }
}
