//! Ties the pieces together: per-table options, explicit per-render UI
//! state, and the render pass producing a [`GridView`] for the host to
//! draw.
//!
//! A render is one synchronous pass over the data flow: existing values →
//! filter widgets → condition → count → pagination → page rows → rolling
//! balance → view. The host re-runs it on every interaction, passing the
//! widget state back in; nothing is kept between passes.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, Select};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::marker::PhantomData;

use crate::balance::{self, BALANCE_COLUMN};
use crate::existing;
use crate::filter::{FilterState, FilterWidget, build_condition, filter_widgets};
use crate::form::{FormSpec, FormValues, create_form, edit_form};
use crate::mutation::{Action, Notice, apply_action, find_row};
use crate::pagination::{PAGE_SIZE_OPTIONS, PageMenu, paginate};
use crate::query;
use crate::schema::{AdminResource, ColumnKind, key_column, pretty_name};

/// Per-table display configuration. Immutable during a render pass.
#[derive(Clone, Debug, Serialize)]
pub struct GridOptions {
    /// Column to order by; the primary key is always the tie-breaker.
    pub order_by: Option<String>,
    /// Numeric column to accumulate into a rolling balance.
    pub rolling_total_column: Option<String>,
    /// Whether the previous-balance sum honours date-range filters.
    /// Off by default: the original ledger behavior sums every row
    /// before the page under the non-date filters only.
    pub rolling_includes_date_filters: bool,
    /// Columns the user may filter on; `None` offers all eligible ones.
    pub available_filter: Option<Vec<String>>,
    /// Columns to display, in order; `None` shows all.
    pub visible_columns: Option<Vec<String>>,
    /// Hide the primary-key column in the grid (it stays in the row data
    /// for selection bookkeeping).
    pub hide_key: bool,
    /// Values injected into created rows; each suppresses its widget.
    pub default_values: FormValues,
    /// Always-on `column = value` filters, never shown as widgets.
    pub fixed_filters: Vec<(String, JsonValue)>,
    /// Ascending page-size menu.
    pub page_sizes: Vec<u64>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            order_by: None,
            rolling_total_column: None,
            rolling_includes_date_filters: false,
            available_filter: None,
            visible_columns: None,
            hide_key: true,
            default_values: FormValues::new(),
            fixed_filters: Vec::new(),
            page_sizes: PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

impl GridOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    #[must_use]
    pub fn rolling_total(mut self, column: impl Into<String>) -> Self {
        self.rolling_total_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn filterable(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available_filter = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn visible(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.visible_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn show_key(mut self) -> Self {
        self.hide_key = false;
        self
    }

    #[must_use]
    pub fn default_value(mut self, column: impl Into<String>, value: JsonValue) -> Self {
        self.default_values.insert(column.into(), value);
        self
    }

    #[must_use]
    pub fn fixed_filter(mut self, column: impl Into<String>, value: JsonValue) -> Self {
        self.fixed_filters.push((column.into(), value));
        self
    }

    #[must_use]
    pub fn page_sizes(mut self, sizes: impl IntoIterator<Item = u64>) -> Self {
        self.page_sizes = sizes.into_iter().collect();
        self
    }
}

/// Everything the host feeds back into a render: current widget values
/// and selection. Replaces the ambient session flags of reactive
/// frameworks with an explicit value the caller owns.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UiState {
    pub filters: FilterState,
    /// Requested 1-indexed page; clamped during the render.
    pub page: u64,
    /// Requested page size; must be in the reduced menu to take effect.
    pub page_size: Option<u64>,
    /// Positions of selected rows on the current page.
    pub selected: Vec<usize>,
    /// Rolling-balance toggle.
    pub rolling_enabled: bool,
    /// Notice from the last applied action, echoed into the view.
    pub notice: Option<Notice>,
}

impl UiState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            page: 1,
            rolling_enabled: true,
            ..Self::default()
        }
    }
}

/// One rendered pass over the table, ready to draw.
#[derive(Clone, Debug, Serialize)]
pub struct GridView {
    pub title: String,
    /// Name of the primary-key column within the row maps.
    pub key_column: String,
    pub filters: Vec<FilterWidget>,
    pub pagination: PageMenu,
    /// Column names to display, in order.
    pub columns: Vec<String>,
    /// The page's rows as JSON maps keyed by column name.
    pub rows: Vec<JsonValue>,
    /// Style classes per row, parallel to `rows`; empty without a styler.
    pub row_styles: Vec<Vec<String>>,
    /// Selected row positions, clamped to the page.
    pub selected: Vec<usize>,
    pub total_rows: u64,
    /// Previous-balance figure when the rolling total is active.
    pub previous_balance: Option<f64>,
    /// Explicit empty-table indicator.
    pub empty: bool,
    pub notice: Option<Notice>,
}

impl GridView {
    /// Primary-key values of the selected rows, for edit/delete dispatch.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<JsonValue> {
        self.selected
            .iter()
            .filter_map(|&position| self.rows.get(position))
            .filter_map(|row| row.get(&self.key_column))
            .cloned()
            .collect()
    }

    /// Primary-key value of the first selected row, for the edit dialog.
    #[must_use]
    pub fn first_selected_id(&self) -> Option<JsonValue> {
        self.selected_ids().into_iter().next()
    }
}

type StyleFn = Box<dyn Fn(&JsonValue) -> Vec<String> + Send + Sync>;

/// A CRUD grid over one admin resource.
pub struct Grid<R: AdminResource> {
    options: GridOptions,
    read_from: Option<Select<R::EntityType>>,
    style_fn: Option<StyleFn>,
    resource: PhantomData<R>,
}

impl<R: AdminResource> Grid<R> {
    #[must_use]
    pub fn new(options: GridOptions) -> Self {
        Self {
            options,
            read_from: None,
            style_fn: None,
            resource: PhantomData,
        }
    }

    /// Read from a caller-composed select (joins, where clauses, CTE-like
    /// bases) instead of a blanket select of the entity. The select must
    /// still produce the entity's columns.
    #[must_use]
    pub fn read_from(mut self, select: Select<R::EntityType>) -> Self {
        self.read_from = Some(select);
        self
    }

    /// Style rows with a callback from row map to css-class list.
    #[must_use]
    pub fn style_with(
        mut self,
        style_fn: impl Fn(&JsonValue) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.style_fn = Some(Box::new(style_fn));
        self
    }

    #[must_use]
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    #[must_use]
    pub fn title(&self) -> String {
        pretty_name(R::TABLE_NAME)
    }

    /// Run one render pass.
    ///
    /// # Errors
    ///
    /// Returns the first `DbErr` raised while loading existing values,
    /// fetching the page, or computing the rolling balance.
    pub async fn render(
        &self,
        db: &DatabaseConnection,
        state: &UiState,
    ) -> Result<GridView, DbErr> {
        let columns = R::columns();
        let existing = existing::load::<R>(db).await?;

        let fixed_names: Vec<String> = self
            .options
            .fixed_filters
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        let widgets = filter_widgets(
            &columns,
            self.options.available_filter.as_deref(),
            &fixed_names,
            &existing,
        );

        let base = query::apply_fixed_filters::<R>(
            query::base_select::<R>(self.read_from.clone()),
            &self.options.fixed_filters,
        )?;

        let condition = build_condition::<R>(&state.filters, true);
        let order_by = self.options.order_by.as_deref();
        let filtered = query::ordered::<R>(
            query::filtered::<R>(base.clone(), condition),
            order_by,
        );

        let total_rows = query::count_rows(filtered.clone(), db).await;
        let menu = paginate(
            total_rows,
            &self.options.page_sizes,
            state.page_size,
            state.page,
        );
        let mut rows =
            query::fetch_page(query::paged(filtered, menu.page, menu.page_size), db).await?;

        let previous_balance = self
            .rolling_balance(db, state, &base, &mut rows, menu.offset())
            .await?;

        let key_name = key_column(&columns)
            .map_or_else(|| "id".to_string(), |descriptor| descriptor.name.to_string());
        let visible = self.visible_columns(&columns, &key_name);
        let row_styles = self.style_fn.as_ref().map_or_else(Vec::new, |style| {
            rows.iter().map(|row| style(row)).collect()
        });
        let selected: Vec<usize> = state
            .selected
            .iter()
            .copied()
            .filter(|&position| position < rows.len())
            .collect();

        Ok(GridView {
            title: self.title(),
            key_column: key_name,
            filters: widgets,
            pagination: menu,
            columns: visible,
            empty: rows.is_empty(),
            row_styles,
            selected,
            total_rows,
            previous_balance,
            notice: state.notice.clone(),
            rows,
        })
    }

    /// Apply a user action, merging configured default values into create
    /// and update payloads, and report the outcome.
    pub async fn apply(&self, db: &DatabaseConnection, action: Action) -> Notice {
        let action = self.with_defaults(action);
        apply_action::<R>(db, &action).await
    }

    /// Build the create dialog.
    ///
    /// # Errors
    ///
    /// Returns any `DbErr` raised while loading existing values.
    pub async fn create_form(&self, db: &DatabaseConnection) -> Result<FormSpec, DbErr> {
        let existing = existing::load::<R>(db).await?;
        Ok(create_form(
            R::TABLE_NAME,
            &R::columns(),
            &existing,
            &self.options.default_values,
        ))
    }

    /// Build the edit dialog for one row.
    ///
    /// # Errors
    ///
    /// `DbErr::RecordNotFound` when the id matches no row, otherwise any
    /// load error.
    pub async fn edit_form(
        &self,
        db: &DatabaseConnection,
        id: &JsonValue,
    ) -> Result<FormSpec, DbErr> {
        let existing = existing::load::<R>(db).await?;
        let row = find_row::<R, _>(db, id).await?;
        Ok(edit_form(
            R::TABLE_NAME,
            &R::columns(),
            &existing,
            &row,
            &self.options.default_values,
        ))
    }

    async fn rolling_balance(
        &self,
        db: &DatabaseConnection,
        state: &UiState,
        base: &Select<R::EntityType>,
        rows: &mut [JsonValue],
        offset: u64,
    ) -> Result<Option<f64>, DbErr> {
        let Some(rolling) = &self.options.rolling_total_column else {
            return Ok(None);
        };
        if !state.rolling_enabled {
            return Ok(None);
        }

        let condition = build_condition::<R>(
            &state.filters,
            self.options.rolling_includes_date_filters,
        );
        let window = query::ordered::<R>(
            query::filtered::<R>(base.clone(), condition),
            self.options.order_by.as_deref(),
        );
        let previous = balance::previous_balance(db, window, rolling, offset).await?;
        balance::add_running_sum(rows, rolling, previous);
        Ok(Some(previous))
    }

    fn visible_columns(
        &self,
        columns: &[crate::schema::ColumnDescriptor],
        key_name: &str,
    ) -> Vec<String> {
        let mut visible: Vec<String> = match &self.options.visible_columns {
            Some(chosen) => chosen.clone(),
            None => columns
                .iter()
                .filter(|descriptor| descriptor.kind() != ColumnKind::Unsupported)
                .map(|descriptor| descriptor.name.to_string())
                .collect(),
        };
        if self.options.hide_key {
            visible.retain(|name| name != key_name);
        }
        if self.options.rolling_total_column.is_some()
            && !visible.iter().any(|name| name == BALANCE_COLUMN)
        {
            visible.push(BALANCE_COLUMN.to_string());
        }
        visible
    }
}

/// Object-safe view of a [`Grid`], letting a host hold a heterogeneous
/// list of tables and drive whichever one the user picked.
#[async_trait]
pub trait ErasedGrid: Send + Sync {
    fn table_name(&self) -> &'static str;
    fn grid_title(&self) -> String;

    async fn render_page(
        &self,
        db: &DatabaseConnection,
        state: &UiState,
    ) -> Result<GridView, DbErr>;

    async fn apply_user_action(&self, db: &DatabaseConnection, action: Action) -> Notice;

    async fn creation_form(&self, db: &DatabaseConnection) -> Result<FormSpec, DbErr>;

    async fn edition_form(
        &self,
        db: &DatabaseConnection,
        id: &JsonValue,
    ) -> Result<FormSpec, DbErr>;
}

#[async_trait]
impl<R: AdminResource + 'static> ErasedGrid for Grid<R> {
    fn table_name(&self) -> &'static str {
        R::TABLE_NAME
    }

    fn grid_title(&self) -> String {
        self.title()
    }

    async fn render_page(
        &self,
        db: &DatabaseConnection,
        state: &UiState,
    ) -> Result<GridView, DbErr> {
        self.render(db, state).await
    }

    async fn apply_user_action(&self, db: &DatabaseConnection, action: Action) -> Notice {
        self.apply(db, action).await
    }

    async fn creation_form(&self, db: &DatabaseConnection) -> Result<FormSpec, DbErr> {
        self.create_form(db).await
    }

    async fn edition_form(
        &self,
        db: &DatabaseConnection,
        id: &JsonValue,
    ) -> Result<FormSpec, DbErr> {
        self.edit_form(db, id).await
    }
}

impl<R: AdminResource> Grid<R> {
    fn with_defaults(&self, action: Action) -> Action {
        match action {
            Action::Create { mut values } => {
                for (column, value) in &self.options.default_values {
                    values.insert(column.clone(), value.clone());
                }
                Action::Create { values }
            }
            Action::Update { id, mut values } => {
                for (column, value) in &self.options.default_values {
                    values.insert(column.clone(), value.clone());
                }
                Action::Update { id, values }
            }
            Action::Delete { ids } => Action::Delete { ids },
        }
    }
}
