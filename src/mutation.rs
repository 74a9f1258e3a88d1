//! Executes create, update, and delete actions against the entity.
//!
//! Every action runs in its own transaction. Failures roll the
//! transaction back and surface the error's message verbatim as an error
//! notice; there are no retries and no concurrency checks — last write
//! wins, as whatever isolation the database provides.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, TransactionTrait, Value,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::form::FormValues;
use crate::schema::{AdminResource, ColumnKind, key_column, pretty_name};
use crate::value::{db_value, fit_column_type};

/// Outcome of a user action, ready to show in the host UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    Error,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

/// A mutation requested by the user. Row identities are primary-key
/// values as they appear in the grid's JSON rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Create { values: FormValues },
    Update { id: JsonValue, values: FormValues },
    Delete { ids: Vec<JsonValue> },
}

/// Run an action in a transaction and report the outcome as a notice.
///
/// The error path is deliberately blunt: whatever message the database
/// raised is what the user sees.
pub async fn apply_action<R: AdminResource>(db: &DatabaseConnection, action: &Action) -> Notice {
    match run_in_transaction::<R>(db, action).await {
        Ok(message) => {
            tracing::debug!(table = R::TABLE_NAME, %message, "action applied");
            Notice::success(message)
        }
        Err(err) => {
            tracing::error!(table = R::TABLE_NAME, %err, "action failed; rolled back");
            Notice::error(err.to_string())
        }
    }
}

async fn run_in_transaction<R: AdminResource>(
    db: &DatabaseConnection,
    action: &Action,
) -> Result<String, DbErr> {
    let name = pretty_name(R::TABLE_NAME);
    let txn = db.begin().await?;

    let outcome = match action {
        Action::Create { values } => insert_row::<R, _>(&txn, values)
            .await
            .map(|()| format!("{name} row created")),
        Action::Update { id, values } => update_row::<R, _>(&txn, id, values)
            .await
            .map(|()| format!("{name} row saved")),
        Action::Delete { ids } => delete_rows::<R, _>(&txn, ids)
            .await
            .map(|deleted| format!("{deleted} {name} rows deleted")),
    };

    match outcome {
        Ok(message) => {
            txn.commit().await?;
            Ok(message)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(%rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Insert a new row from submitted form values. Primary-key and
/// unsupported columns are ignored; absent columns keep their database
/// defaults.
///
/// # Errors
///
/// Returns a `DbErr` on coercion failure or from the insert itself.
pub async fn insert_row<R, C>(conn: &C, values: &FormValues) -> Result<(), DbErr>
where
    R: AdminResource,
    C: ConnectionTrait,
{
    let mut row = <R::ActiveModelType as ActiveModelTrait>::default();
    set_fields::<R>(&mut row, values)?;
    row.insert(conn).await?;
    Ok(())
}

/// Update an existing row: fetch it, overwrite the submitted columns,
/// write it back. The primary key itself is never editable.
///
/// # Errors
///
/// `DbErr::RecordNotFound` when the id matches no row, otherwise any
/// coercion or update error.
pub async fn update_row<R, C>(conn: &C, id: &JsonValue, values: &FormValues) -> Result<(), DbErr>
where
    R: AdminResource,
    C: ConnectionTrait,
{
    let key = key_value::<R>(id)?;
    let model = R::EntityType::find()
        .filter(R::ID_COLUMN.eq(key))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("{} not found", pretty_name(R::TABLE_NAME))))?;

    let mut row = model.into_active_model();
    set_fields::<R>(&mut row, values)?;
    row.update(conn).await?;
    Ok(())
}

/// Delete one or many rows by primary-key value.
///
/// # Errors
///
/// `DbErr::RecordNotFound` when nothing matched, otherwise any delete
/// error.
pub async fn delete_rows<R, C>(conn: &C, ids: &[JsonValue]) -> Result<u64, DbErr>
where
    R: AdminResource,
    C: ConnectionTrait,
{
    let keys = ids
        .iter()
        .map(|id| key_value::<R>(id))
        .collect::<Result<Vec<Value>, DbErr>>()?;
    let result = R::EntityType::delete_many()
        .filter(R::ID_COLUMN.is_in(keys))
        .exec(conn)
        .await?;
    match result.rows_affected {
        0 => Err(DbErr::RecordNotFound(format!(
            "{} not found",
            pretty_name(R::TABLE_NAME)
        ))),
        deleted => Ok(deleted),
    }
}

/// Read a row back by primary-key value, as a JSON map.
///
/// # Errors
///
/// `DbErr::RecordNotFound` when the id matches no row.
pub async fn find_row<R, C>(conn: &C, id: &JsonValue) -> Result<JsonValue, DbErr>
where
    R: AdminResource,
    C: ConnectionTrait,
{
    let key = key_value::<R>(id)?;
    R::EntityType::find()
        .filter(R::ID_COLUMN.eq(key))
        .into_json()
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("{} not found", pretty_name(R::TABLE_NAME))))
}

fn set_fields<R: AdminResource>(
    row: &mut R::ActiveModelType,
    values: &FormValues,
) -> Result<(), DbErr> {
    for descriptor in R::columns() {
        if descriptor.primary_key || descriptor.kind() == ColumnKind::Unsupported {
            continue;
        }
        let Some(value) = values.get(descriptor.name) else {
            continue;
        };
        let Some(column) = R::column(descriptor.name) else {
            continue;
        };
        let coerced = db_value(&descriptor, value)?;
        let coerced = fit_column_type(descriptor.name, column.def().get_column_type(), coerced)?;
        row.set(column, coerced);
    }
    Ok(())
}

fn key_value<R: AdminResource>(id: &JsonValue) -> Result<Value, DbErr> {
    let columns = R::columns();
    let descriptor = key_column(&columns)
        .ok_or_else(|| DbErr::Custom(format!("{} has no primary key column", R::TABLE_NAME)))?;
    if id.is_null() {
        return Err(DbErr::Custom(format!(
            "missing primary key value for {}",
            R::TABLE_NAME
        )));
    }
    db_value(descriptor, id)
}
