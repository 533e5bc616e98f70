use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single address inside a network.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ips")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub network_id: i32,
    pub asset_id: Option<i32>,
    pub site_id: Option<i32>,
    pub category_id: Option<i32>,
    pub snmp_group_id: Option<i32>,
    pub manufacturer_id: Option<i32>,
    pub os_id: Option<i32>,
    /// Canonical address text, unique within `network_id`
    pub ip_address: String,
    pub hostname: Option<String>,
    pub dns_name: Option<String>,
    pub domain: Option<String>,
    /// Newline separated CNAME records
    pub cnames: Option<String>,
    /// Lowercase colon-separated MAC
    pub mac: Option<String>,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub url: Option<String>,
    pub if_alias: Option<String>,
    pub if_descr: Option<String>,
    pub cm_enabled: bool,
    pub ping_status: Option<bool>,
    pub ping_last_checked: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::network::Entity",
        from = "Column::NetworkId",
        to = "super::network::Column::Id",
        on_delete = "Cascade"
    )]
    Network,
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::Id",
        on_delete = "Cascade"
    )]
    Asset,
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
}

impl Related<super::network::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Network.def()
    }
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
