use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tenant owning address space and inventory.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::network::Entity")]
    Networks,
    #[sea_orm(has_many = "super::vlan::Entity")]
    Vlans,
    #[sea_orm(has_many = "super::vrf::Entity")]
    Vrfs,
    #[sea_orm(has_many = "super::line::Entity")]
    Lines,
}

impl Related<super::network::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Networks.def()
    }
}

impl Related<super::vlan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vlans.def()
    }
}

impl Related<super::vrf::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vrfs.def()
    }
}

impl Related<super::line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
