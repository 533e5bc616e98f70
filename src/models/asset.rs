use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub site_id: Option<i32>,
    pub hostname: Option<String>,
    pub category_id: Option<i32>,
    pub snmp_group_id: Option<i32>,
    pub manufacturer_id: Option<i32>,
    pub os_id: Option<i32>,
    pub serial_number: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub descr_snmp: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::Id",
        on_delete = "SetNull"
    )]
    Site,
    #[sea_orm(
        belongs_to = "super::host_category::Entity",
        from = "Column::CategoryId",
        to = "super::host_category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::snmp_group::Entity",
        from = "Column::SnmpGroupId",
        to = "super::snmp_group::Column::Id",
        on_delete = "SetNull"
    )]
    SnmpGroup,
    #[sea_orm(
        belongs_to = "super::manufacturer::Entity",
        from = "Column::ManufacturerId",
        to = "super::manufacturer::Column::Id",
        on_delete = "SetNull"
    )]
    Manufacturer,
    #[sea_orm(
        belongs_to = "super::operating_system::Entity",
        from = "Column::OsId",
        to = "super::operating_system::Column::Id",
        on_delete = "SetNull"
    )]
    OperatingSystem,
    #[sea_orm(has_many = "super::ip::Entity")]
    Ips,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        super::asset_clients::Relation::Client.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::asset_clients::Relation::Asset.def().rev())
    }
}

impl Related<super::ip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
