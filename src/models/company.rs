use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vendor, provider or other organisation working with a client.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub fax_number: Option<String>,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        super::company_clients::Relation::Client.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::company_clients::Relation::Company.def().rev())
    }
}

impl Related<super::contact::Entity> for Entity {
    fn to() -> RelationDef {
        super::company_contacts::Relation::Contact.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::company_contacts::Relation::Company.def().rev())
    }
}

impl Related<super::company_type::Entity> for Entity {
    fn to() -> RelationDef {
        super::company_company_types::Relation::CompanyType.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::company_company_types::Relation::Company.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
