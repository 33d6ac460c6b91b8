use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "contracts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: Option<i32>,
    pub title: String,
    pub number: String,
    pub amount: f64,
    pub remaining_balance: Option<f64>,
    pub status: Option<String>,
    pub asset_type: Option<String>,
    pub client_type: Option<String>,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub due_date: Option<chrono::NaiveDate>,
    pub created_at: chrono::NaiveDateTime,
}

impl Model {
    /// Outstanding balance; contracts created before balance tracking carry
    /// `None` and count as fully unpaid.
    pub fn outstanding(&self) -> f64 {
        self.remaining_balance.unwrap_or(self.amount)
    }

    /// Due date with the historical fallback to the contract start date.
    pub fn effective_due_date(&self) -> chrono::NaiveDate {
        self.due_date.unwrap_or(self.start_date)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
