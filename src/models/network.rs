use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "networks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub vlan_id: Option<i32>,
    pub dns_server_group_id: Option<i32>,
    pub site_id: Option<i32>,
    pub category_id: Option<i32>,
    /// VRF this network is a member of
    pub vrf_id: Option<i32>,
    /// VRF whose route distinguisher applies to this network
    pub rd_vrf_id: Option<i32>,
    /// Canonical network address
    pub ip_address: String,
    /// Prefix length
    pub mask: i32,
    /// 4 or 6
    pub ip_version: i32,
    /// Top of an address hierarchy within its (client, vrf, family) scope
    pub rootnet: bool,
    /// Percentage of usable hosts with an IP record
    pub utilization: i16,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::vlan::Entity",
        from = "Column::VlanId",
        to = "super::vlan::Column::Id",
        on_delete = "SetNull"
    )]
    Vlan,
    #[sea_orm(
        belongs_to = "super::dns_server_group::Entity",
        from = "Column::DnsServerGroupId",
        to = "super::dns_server_group::Column::Id",
        on_delete = "SetNull"
    )]
    DnsServerGroup,
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::Id",
        on_delete = "SetNull"
    )]
    Site,
    #[sea_orm(
        belongs_to = "super::network_category::Entity",
        from = "Column::CategoryId",
        to = "super::network_category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::vrf::Entity",
        from = "Column::VrfId",
        to = "super::vrf::Column::Id",
        on_delete = "NoAction"
    )]
    Vrf,
    #[sea_orm(
        belongs_to = "super::vrf::Entity",
        from = "Column::RdVrfId",
        to = "super::vrf::Column::Id",
        on_delete = "SetNull"
    )]
    RouteDistinguisher,
    #[sea_orm(has_many = "super::ip::Entity")]
    Ips,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::vlan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vlan.def()
    }
}

// Membership is the default path to a VRF; the RD owner is reached through
// `Relation::RouteDistinguisher` explicitly.
impl Related<super::vrf::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vrf.def()
    }
}

impl Related<super::ip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parsed prefix. Rows are validated on insert, so this only fails on
    /// hand-edited data.
    pub fn prefix(&self) -> Option<ipnet::IpNet> {
        let addr: std::net::IpAddr = self.ip_address.parse().ok()?;
        ipnet::IpNet::new(addr, u8::try_from(self.mask).ok()?).ok()
    }

    pub fn cidr(&self) -> String {
        format!("{}/{}", self.ip_address, self.mask)
    }
}
