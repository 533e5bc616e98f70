use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dns_servers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub ip_address: String,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub disabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        super::dns_server_clients::Relation::Client.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::dns_server_clients::Relation::DnsServer.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
