use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Custom field definition for one entity type.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "eav_attributes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entity_type: String,
    pub name: String,
    /// TEXT, FLOAT, INT, DATE or BOOLEAN
    pub datatype: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::eav_value::Entity")]
    Values,
}

impl Related<super::eav_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Values.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
