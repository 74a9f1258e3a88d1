use async_trait::async_trait;
use gridcrate::existing::fk_options_from;
use gridcrate::schema::{
    AdminResource, ColumnDescriptor, FkOption, ForeignKeyRef, ValueType,
};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::prelude::*;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub mod client {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "clients")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl std::fmt::Display for Model {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.name)
        }
    }
}

pub mod invoice {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "invoices")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub category: String,
        pub amount: f64,
        pub invoice_date: Option<Date>,
        pub paid: bool,
        pub client_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::client::Entity",
            from = "Column::ClientId",
            to = "super::client::Column::Id"
        )]
        Client,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// The invoices table as exposed through the admin grid.
pub struct InvoiceAdmin;

#[async_trait]
impl AdminResource for InvoiceAdmin {
    type EntityType = invoice::Entity;
    type ColumnType = invoice::Column;
    type ActiveModelType = invoice::ActiveModel;

    const TABLE_NAME: &'static str = "invoices";
    const ID_COLUMN: invoice::Column = invoice::Column::Id;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::primary_key("id", ValueType::Integer),
            ColumnDescriptor::new("category", ValueType::Text),
            ColumnDescriptor::new("amount", ValueType::Float),
            ColumnDescriptor::new("invoice_date", ValueType::Date),
            ColumnDescriptor::new("paid", ValueType::Boolean),
            ColumnDescriptor::foreign_key(
                "client_id",
                ValueType::Integer,
                ForeignKeyRef {
                    table: "clients",
                    referenced_column: "id",
                },
            ),
        ]
    }

    async fn foreign_key_options(
        db: &DatabaseConnection,
        column: &str,
    ) -> Result<Vec<FkOption>, DbErr> {
        match column {
            "client_id" => fk_options_from::<client::Entity, _>(db).await,
            _ => Ok(Vec::new()),
        }
    }
}

pub async fn insert_client(db: &DatabaseConnection, name: &str) -> Result<i32, DbErr> {
    let row = client::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    };
    let model = row.insert(db).await?;
    Ok(model.id)
}

pub async fn insert_invoice(
    db: &DatabaseConnection,
    category: &str,
    amount: f64,
    invoice_date: Option<chrono::NaiveDate>,
    paid: bool,
    client_id: i32,
) -> Result<i32, DbErr> {
    let row = invoice::ActiveModel {
        category: Set(category.to_string()),
        amount: Set(amount),
        invoice_date: Set(invoice_date),
        paid: Set(paid),
        client_id: Set(client_id),
        ..Default::default()
    };
    let model = row.insert(db).await?;
    Ok(model.id)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateClientTable), Box::new(CreateInvoiceTable)]
    }
}

pub struct CreateClientTable;

#[async_trait::async_trait]
impl MigrationName for CreateClientTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_client_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateClientTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(ClientEntity)
            .if_not_exists()
            .col(
                ColumnDef::new(ClientColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(ClientColumn::Name).string().not_null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientEntity).to_owned())
            .await?;
        Ok(())
    }
}

pub struct CreateInvoiceTable;

#[async_trait::async_trait]
impl MigrationName for CreateInvoiceTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_invoice_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateInvoiceTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(InvoiceEntity)
            .if_not_exists()
            .col(
                ColumnDef::new(InvoiceColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(InvoiceColumn::Category).string().not_null())
            .col(ColumnDef::new(InvoiceColumn::Amount).double().not_null())
            .col(ColumnDef::new(InvoiceColumn::InvoiceDate).date().null())
            .col(
                ColumnDef::new(InvoiceColumn::Paid)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(InvoiceColumn::ClientId).integer().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_invoices_client_id")
                    .from(InvoiceEntity, InvoiceColumn::ClientId)
                    .to(ClientEntity, ClientColumn::Id),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InvoiceEntity).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum ClientColumn {
    Id,
    Name,
}

impl Iden for ClientColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Name => "name",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct ClientEntity;

impl Iden for ClientEntity {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "clients").unwrap();
    }
}

#[derive(Debug)]
pub enum InvoiceColumn {
    Id,
    Category,
    Amount,
    InvoiceDate,
    Paid,
    ClientId,
}

impl Iden for InvoiceColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Category => "category",
                Self::Amount => "amount",
                Self::InvoiceDate => "invoice_date",
                Self::Paid => "paid",
                Self::ClientId => "client_id",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct InvoiceEntity;

impl Iden for InvoiceEntity {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "invoices").unwrap();
    }
}
