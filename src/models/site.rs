use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Physical or logical site (GSite).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        super::site_clients::Relation::Client.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::site_clients::Relation::Site.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
