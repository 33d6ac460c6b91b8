use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "assets")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub vin: Option<String>,
    pub status: String,
    pub location: Option<String>,
    pub inspection_date: Option<chrono::NaiveDate>,
    pub maintenance_info: Option<String>,
    pub insurance_info: Option<String>,
    pub client_id: i32,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
    #[sea_orm(has_many = "super::asset_documents::Entity")]
    AssetDocuments,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::asset_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
