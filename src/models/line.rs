use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Telecom circuit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub provider_id: Option<i32>,
    pub phone_number: Option<String>,
    #[sea_orm(unique)]
    pub number: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::ProviderId",
        to = "super::company::Column::Id",
        on_delete = "SetNull"
    )]
    Provider,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
