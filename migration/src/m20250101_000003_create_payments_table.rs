use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table("payments")
                    .if_not_exists()
                    .col(pk_auto("id"))
                    .col(integer("client_id").not_null())
                    .col(integer("contract_id").not_null())
                    .col(double("amount").not_null())
                    .col(date("date").not_null())
                    .col(double("late_fee").default(0.0).not_null())
                    .col(string_null("receipt_path"))
                    .col(string_null("receipt_type"))
                    .col(timestamp("created_at").default(Expr::current_timestamp()).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_client_id")
                            .from("payments", "client_id")
                            .to("clients", "id"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_contract_id")
                            .from("payments", "contract_id")
                            .to("contracts", "id"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table("payments").to_owned())
            .await
    }
}
