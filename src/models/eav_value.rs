use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One typed value; exactly the column matching the attribute datatype is set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "eav_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub attribute_id: i32,
    pub entity_type: String,
    pub entity_id: i32,
    pub value_text: Option<String>,
    pub value_float: Option<f64>,
    pub value_int: Option<i64>,
    pub value_date: Option<String>,
    pub value_bool: Option<bool>,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::eav_attribute::Entity",
        from = "Column::AttributeId",
        to = "super::eav_attribute::Column::Id",
        on_delete = "Cascade"
    )]
    Attribute,
}

impl Related<super::eav_attribute::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attribute.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
