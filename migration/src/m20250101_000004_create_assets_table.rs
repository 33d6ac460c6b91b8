use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table("assets")
                    .if_not_exists()
                    .col(pk_auto("id"))
                    .col(string("name").not_null())
                    .col(string("type").not_null())
                    .col(string_null("vin"))
                    .col(string("status").not_null())
                    .col(string_null("location"))
                    .col(date_null("inspection_date"))
                    .col(string_null("maintenance_info"))
                    .col(string_null("insurance_info"))
                    .col(integer("client_id").not_null())
                    .col(timestamp("created_at").default(Expr::current_timestamp()).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assets_client_id")
                            .from("assets", "client_id")
                            .to("clients", "id"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table("assets").to_owned())
            .await
    }
}
