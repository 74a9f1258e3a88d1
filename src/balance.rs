//! Rolling balance: the sum of a numeric column over every row preceding
//! the current page, plus a running cumulative sum over the page itself.
//!
//! The preceding-rows sum is computed by the database — the ordered,
//! filtered statement is windowed to the page offset and wrapped in a
//! `SUM` subquery. By default the window uses the non-date filters only,
//! matching the displayed "previous balance" figure to the ledger-style
//! use this feature came from; see
//! [`GridOptions::rolling_includes_date_filters`](crate::grid::GridOptions).

use sea_orm::sea_query::{Alias, Expr, Func, Query};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QuerySelect, QueryTrait, Select};
use serde_json::{Value as JsonValue, json};

/// Name of the derived column added to page rows.
pub const BALANCE_COLUMN: &str = "rolling_balance";

/// Sum of `column` over the first `offset` rows of the ordered select.
///
/// An offset of zero (first page) is zero by definition and issues no
/// query. A `SUM` over zero rows is also zero.
///
/// # Errors
///
/// Returns any `DbErr` raised by the aggregate query.
pub async fn previous_balance<E, C>(
    db: &C,
    select: Select<E>,
    column: &str,
    offset: u64,
) -> Result<f64, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if offset == 0 {
        return Ok(0.0);
    }

    let window = select.limit(offset).into_query();
    let mut aggregate = Query::select();
    aggregate
        .expr_as(Func::sum(Expr::col(Alias::new(column))), Alias::new("balance"))
        .from_subquery(window, Alias::new("balance_window"));

    let statement = db.get_database_backend().build(&aggregate);
    let Some(row) = db.query_one(statement).await? else {
        return Ok(0.0);
    };

    // SUM comes back as REAL or INTEGER depending on the column type.
    if let Ok(Some(value)) = row.try_get::<Option<f64>>("", "balance") {
        return Ok(value);
    }
    if let Ok(Some(value)) = row.try_get::<Option<i64>>("", "balance") {
        #[allow(clippy::cast_precision_loss)]
        return Ok(value as f64);
    }
    Ok(0.0)
}

/// Add the derived [`BALANCE_COLUMN`] to each page row: a running sum of
/// `column` seeded with `previous`. Null cells contribute zero.
pub fn add_running_sum(rows: &mut [JsonValue], column: &str, previous: f64) {
    let mut running = previous;
    for row in rows.iter_mut() {
        if let JsonValue::Object(cells) = row {
            running += cells.get(column).and_then(JsonValue::as_f64).unwrap_or(0.0);
            cells.insert(BALANCE_COLUMN.to_string(), json!(running));
        }
    }
}
