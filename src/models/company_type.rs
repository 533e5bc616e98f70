use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role a company plays for a client: provider, consulting, supplier, ...
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_type: String,
    pub comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
