use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SNMP credential profile. v1/v2c use `community`, v3 uses the auth/priv
/// fields selected by `security_level`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "snmp_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub version: i16,
    pub comment: Option<String>,
    pub community: Option<String>,
    pub security_level: Option<String>,
    pub auth_algorithm: Option<String>,
    #[serde(skip_serializing)]
    pub auth_password: Option<String>,
    pub priv_algorithm: Option<String>,
    #[serde(skip_serializing)]
    pub priv_password: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        super::snmp_group_clients::Relation::Client.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::snmp_group_clients::Relation::SnmpGroup.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
