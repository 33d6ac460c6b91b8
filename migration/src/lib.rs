pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_clients_table;
mod m20250101_000002_create_contracts_table;
mod m20250101_000003_create_payments_table;
mod m20250101_000004_create_assets_table;
mod m20250101_000005_create_asset_documents_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_clients_table::Migration),
            Box::new(m20250101_000002_create_contracts_table::Migration),
            Box::new(m20250101_000003_create_payments_table::Migration),
            Box::new(m20250101_000004_create_assets_table::Migration),
            Box::new(m20250101_000005_create_asset_documents_table::Migration),
        ]
    }
}
