//! Column descriptors, semantic column kinds, and the [`AdminResource`]
//! trait binding a descriptor set to a Sea-ORM entity.
//!
//! The schema layer supplies an explicit, closed description of each
//! column instead of inspecting ORM metadata at runtime: widgets, filters,
//! and mutations are all derived from the [`ColumnKind`] a descriptor
//! classifies to.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IdenStatic, IntoActiveModel, Iterable,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Declared value type of a column, as supplied by the schema layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Text,
    Integer,
    Float,
    Date,
    Boolean,
    /// Anything the grid cannot edit or filter (JSON blobs, arrays, ...).
    Other,
}

/// Semantic kind of a column, derived from its descriptor.
///
/// Classification order: primary key wins over foreign key, which wins
/// over the declared value type. Columns that classify as `Unsupported`
/// are skipped in forms and filters; this is silent, not an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    PrimaryKey,
    ForeignKey,
    Text,
    Integer,
    Float,
    Date,
    Boolean,
    Unsupported,
}

/// Reference to the table a foreign-key column points at.
///
/// A descriptor carries at most one reference; for multi-FK columns the
/// schema author decides which relation drives the option list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRef {
    pub table: &'static str,
    pub referenced_column: &'static str,
}

/// One selectable option for a foreign-key column: the referenced primary
/// key value and a human-readable label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FkOption {
    pub key: JsonValue,
    pub label: String,
}

impl FkOption {
    pub fn new(key: impl Into<JsonValue>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    /// The sentinel entry meaning "no filter"; its key is JSON `null`.
    #[must_use]
    pub fn all() -> Self {
        Self {
            key: JsonValue::Null,
            label: crate::filter::ALL_SENTINEL.to_string(),
        }
    }

    /// Whether this option is the no-op sentinel.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.key.is_null()
    }
}

/// Static description of a single table column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: &'static str,
    pub value_type: ValueType,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnDescriptor {
    #[must_use]
    pub const fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            primary_key: false,
            foreign_key: None,
        }
    }

    #[must_use]
    pub const fn primary_key(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            primary_key: true,
            foreign_key: None,
        }
    }

    #[must_use]
    pub const fn foreign_key(
        name: &'static str,
        value_type: ValueType,
        reference: ForeignKeyRef,
    ) -> Self {
        Self {
            name,
            value_type,
            primary_key: false,
            foreign_key: Some(reference),
        }
    }

    /// Classify this column into its semantic kind.
    #[must_use]
    pub const fn kind(&self) -> ColumnKind {
        if self.primary_key {
            ColumnKind::PrimaryKey
        } else if self.foreign_key.is_some() {
            ColumnKind::ForeignKey
        } else {
            match self.value_type {
                ValueType::Text => ColumnKind::Text,
                ValueType::Integer => ColumnKind::Integer,
                ValueType::Float => ColumnKind::Float,
                ValueType::Date => ColumnKind::Date,
                ValueType::Boolean => ColumnKind::Boolean,
                ValueType::Other => ColumnKind::Unsupported,
            }
        }
    }
}

/// Find the primary-key descriptor in a column set.
#[must_use]
pub fn key_column(columns: &[ColumnDescriptor]) -> Option<&ColumnDescriptor> {
    columns.iter().find(|descriptor| descriptor.primary_key)
}

/// Turn a snake_case identifier into a display title.
///
/// `"invoice_item"` becomes `"Invoice Item"`.
#[must_use]
pub fn pretty_name(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A Sea-ORM entity exposed through the admin grid.
///
/// Implementors bind the entity's types, name its table and primary-key
/// column, and enumerate the column descriptors the grid composes
/// widgets, filters, and mutations from.
#[async_trait]
pub trait AdminResource: Send + Sync
where
    Self::EntityType: EntityTrait<Column = Self::ColumnType> + Sync,
    Self::ActiveModelType:
        ActiveModelTrait<Entity = Self::EntityType> + ActiveModelBehavior + Send + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync + IntoActiveModel<Self::ActiveModelType>,
{
    type EntityType: EntityTrait<Column = Self::ColumnType> + Sync;
    type ColumnType: ColumnTrait + Copy + std::fmt::Debug;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType> + ActiveModelBehavior + Send + Sync;

    const TABLE_NAME: &'static str;
    const ID_COLUMN: Self::ColumnType;

    /// The descriptor for every column of the table, in display order.
    fn columns() -> Vec<ColumnDescriptor>;

    /// Resolve a descriptor name to the entity's column.
    fn column(name: &str) -> Option<Self::ColumnType> {
        Self::ColumnType::iter().find(|column| column.as_str() == name)
    }

    /// Option list for a foreign-key column, as `(key, label)` pairs.
    ///
    /// The default implementation returns no options; implementors with
    /// foreign-key columns override this, usually by delegating to
    /// [`fk_options_from`](crate::existing::fk_options_from) for the
    /// referenced entity.
    ///
    /// # Errors
    ///
    /// Returns any `DbErr` raised while reading the referenced table.
    async fn foreign_key_options(
        db: &DatabaseConnection,
        column: &str,
    ) -> Result<Vec<FkOption>, DbErr> {
        let _ = (db, column);
        Ok(Vec::new())
    }
}
