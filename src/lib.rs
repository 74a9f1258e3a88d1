//! Schema-driven CRUD data grids for Sea-ORM backed admin pages.
//!
//! Given an entity described by an explicit column-descriptor schema,
//! `gridcrate` computes everything a host UI needs to show a generic
//! administration table: a filtered, paginated page of rows, type-aware
//! filter and input widget descriptions, create/edit dialog forms, and
//! transactional mutations with user-facing notices.
//!
//! The crate renders nothing and keeps no state between passes. The host
//! calls [`Grid::render`] with an explicit [`UiState`] on every
//! interaction and draws the returned [`GridView`]; widget rendering and
//! reactivity stay with the host, SQL and transactions stay with
//! Sea-ORM.
//!
//! ```rust,ignore
//! use gridcrate::{Grid, GridOptions, UiState};
//!
//! let grid = Grid::<Invoice>::new(
//!     GridOptions::new()
//!         .order_by("invoice_date")
//!         .rolling_total("amount")
//!         .filterable(["category", "client_id", "invoice_date"]),
//! );
//!
//! let view = grid.render(&db, &UiState::new()).await?;
//! // draw view.filters, view.pagination, view.rows ...
//! ```

pub mod balance;
pub mod existing;
pub mod filter;
pub mod form;
pub mod grid;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod schema;
pub mod value;

pub use balance::BALANCE_COLUMN;
pub use existing::{ExistingValues, fk_options_from};
pub use filter::{ALL_SENTINEL, FilterState, FilterValue, FilterWidget};
pub use form::{FormSpec, FormValues, InputWidget};
pub use grid::{ErasedGrid, Grid, GridOptions, GridView, UiState};
pub use mutation::{Action, Notice, NoticeKind};
pub use pagination::{PAGE_SIZE_OPTIONS, PageMenu, paginate};
pub use schema::{
    AdminResource, ColumnDescriptor, ColumnKind, FkOption, ForeignKeyRef, ValueType, pretty_name,
};
