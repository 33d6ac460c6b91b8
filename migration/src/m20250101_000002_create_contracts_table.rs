use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table("contracts")
                    .if_not_exists()
                    .col(pk_auto("id"))
                    .col(integer_null("client_id"))
                    .col(string("title").not_null())
                    .col(string("number").not_null())
                    .col(double("amount").not_null())
                    .col(double_null("remaining_balance"))
                    .col(string_null("status"))
                    .col(string_null("asset_type"))
                    .col(string_null("client_type"))
                    .col(date("start_date").not_null())
                    .col(date("end_date").not_null())
                    .col(date_null("due_date"))
                    .col(timestamp("created_at").default(Expr::current_timestamp()).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contracts_client_id")
                            .from("contracts", "client_id")
                            .to("clients", "id"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table("contracts").to_owned())
            .await
    }
}
