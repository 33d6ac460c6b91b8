use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table("asset_documents")
                    .if_not_exists()
                    .col(pk_auto("id"))
                    .col(integer("asset_id").not_null())
                    .col(string("doc_type").not_null())
                    .col(string("filename").not_null())
                    .col(string("filepath").not_null())
                    .col(timestamp("uploaded_at").default(Expr::current_timestamp()).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_documents_asset_id")
                            .from("asset_documents", "asset_id")
                            .to("assets", "id"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table("asset_documents").to_owned())
            .await
    }
}
