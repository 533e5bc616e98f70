use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Polymorphic tag assignment. `entity_type` holds an `EntityType` tag.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tagged_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_type: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::custom_tag::Entity",
        from = "Column::TagId",
        to = "super::custom_tag::Column::Id",
        on_delete = "Cascade"
    )]
    Tag,
}

impl Related<super::custom_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
