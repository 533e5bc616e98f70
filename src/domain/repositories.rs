//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::{AttributeValue, DomainError};
use crate::models::{ip, network};

/// Input for creating a network
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNetwork {
    pub client_id: i32,
    pub ip_address: String,
    pub mask: i32,
    #[serde(default)]
    pub vrf_id: Option<i32>,
    #[serde(default)]
    pub rd_vrf_id: Option<i32>,
    #[serde(default)]
    pub rootnet: bool,
    #[serde(default)]
    pub vlan_id: Option<i32>,
    #[serde(default)]
    pub dns_server_group_id: Option<i32>,
    #[serde(default)]
    pub site_id: Option<i32>,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewNetwork {
    pub fn new(client_id: i32, ip_address: impl Into<String>, mask: i32) -> Self {
        Self {
            client_id,
            ip_address: ip_address.into(),
            mask,
            ..Default::default()
        }
    }

    pub fn in_vrf(mut self, vrf_id: i32) -> Self {
        self.vrf_id = Some(vrf_id);
        self
    }

    pub fn rootnet(mut self) -> Self {
        self.rootnet = true;
        self
    }
}

/// Input for updating a network. The address and VRF membership are fixed
/// once created; everything else can change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkUpdate {
    #[serde(default)]
    pub rootnet: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub rd_vrf_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub vlan_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub dns_server_group_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub site_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub comment: Option<Option<String>>,
}

/// Filter criteria for network queries
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NetworkFilter {
    pub client_id: Option<i32>,
    pub vrf_id: Option<i32>,
    pub rootnet: Option<bool>,
}

/// Input for creating an IP record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewIp {
    pub network_id: i32,
    pub ip_address: String,
    pub hostname: Option<String>,
    pub dns_name: Option<String>,
    pub domain: Option<String>,
    pub cnames: Option<String>,
    pub mac: Option<String>,
    pub asset_id: Option<i32>,
    pub site_id: Option<i32>,
    pub category_id: Option<i32>,
    pub snmp_group_id: Option<i32>,
    pub manufacturer_id: Option<i32>,
    pub os_id: Option<i32>,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub url: Option<String>,
    pub if_alias: Option<String>,
    pub if_descr: Option<String>,
    pub cm_enabled: bool,
    pub ping_status: Option<bool>,
    pub ping_last_checked: Option<String>,
}

/// Partial update of an IP record.
///
/// Outer `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpPatch {
    #[serde(default)]
    pub network_id: Option<i32>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub hostname: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub dns_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub domain: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub cnames: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub mac: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub asset_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub site_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub snmp_group_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub manufacturer_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub os_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub serial_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub comment: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub if_alias: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub if_descr: Option<Option<String>>,
    #[serde(default)]
    pub cm_enabled: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub ping_status: Option<Option<bool>>,
    #[serde(default, deserialize_with = "present")]
    pub ping_last_checked: Option<Option<String>>,
}

impl From<NewIp> for IpPatch {
    /// Full replacement: every field is written, absent optionals are cleared.
    fn from(ip: NewIp) -> Self {
        Self {
            network_id: Some(ip.network_id),
            ip_address: Some(ip.ip_address),
            hostname: Some(ip.hostname),
            dns_name: Some(ip.dns_name),
            domain: Some(ip.domain),
            cnames: Some(ip.cnames),
            mac: Some(ip.mac),
            asset_id: Some(ip.asset_id),
            site_id: Some(ip.site_id),
            category_id: Some(ip.category_id),
            snmp_group_id: Some(ip.snmp_group_id),
            manufacturer_id: Some(ip.manufacturer_id),
            os_id: Some(ip.os_id),
            serial_number: Some(ip.serial_number),
            description: Some(ip.description),
            comment: Some(ip.comment),
            url: Some(ip.url),
            if_alias: Some(ip.if_alias),
            if_descr: Some(ip.if_descr),
            cm_enabled: Some(ip.cm_enabled),
            ping_status: Some(ip.ping_status),
            ping_last_checked: Some(ip.ping_last_checked),
        }
    }
}

/// Distinguishes an explicit `null` (clear the field) from an absent key,
/// which `#[serde(default)]` leaves as `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Filter criteria for IP queries
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IpFilter {
    pub network: Option<i32>,
    pub hostname: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// IP record as exposed by the REST resource
#[derive(Debug, Clone, Serialize)]
pub struct IpRecord {
    #[serde(flatten)]
    pub ip: ip::Model,
    pub linked_ip: Vec<i32>,
    pub tags: Vec<String>,
    pub custom_fields: BTreeMap<String, AttributeValue>,
}

/// Network with its tags and custom field values
#[derive(Debug, Clone, Serialize)]
pub struct NetworkRecord {
    #[serde(flatten)]
    pub network: network::Model,
    pub tags: Vec<String>,
    pub custom_fields: BTreeMap<String, AttributeValue>,
}

/// Paginated result with total count
#[derive(Debug, Serialize)]
pub struct PaginatedIps {
    pub objects: Vec<IpRecord>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Repository trait for the IP resource
#[async_trait]
pub trait IpRepository: Send + Sync {
    /// Find IP records matching the filter, ordered by network then creation
    async fn find_all(&self, filter: IpFilter) -> Result<PaginatedIps, DomainError>;

    /// Find a single IP record by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<IpRecord>, DomainError>;

    /// Create a fully described IP record
    async fn create(&self, input: NewIp) -> Result<IpRecord, DomainError>;

    /// Replace every field of a record (PUT)
    async fn replace(&self, id: i32, input: NewIp) -> Result<IpRecord, DomainError>;

    /// Apply a partial update (PATCH)
    async fn update(&self, id: i32, patch: IpPatch) -> Result<IpRecord, DomainError>;

    /// Delete an IP record
    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Link two IP records symmetrically
    async fn link(&self, a: i32, b: i32) -> Result<(), DomainError>;

    /// Remove a link between two IP records
    async fn unlink(&self, a: i32, b: i32) -> Result<(), DomainError>;

    /// IP records linked to `id`
    async fn linked(&self, id: i32) -> Result<Vec<ip::Model>, DomainError>;
}

/// Repository trait for Network entity
#[async_trait]
pub trait NetworkRepository: Send + Sync {
    async fn find_all(&self, filter: NetworkFilter) -> Result<Vec<network::Model>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<network::Model>, DomainError>;

    async fn create(&self, input: NewNetwork) -> Result<network::Model, DomainError>;

    async fn update(&self, id: i32, input: NetworkUpdate) -> Result<network::Model, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Supernets of `id` in the same client/VRF/family, nearest first
    async fn ancestors(&self, id: i32) -> Result<Vec<network::Model>, DomainError>;

    /// Direct subnets of `id`
    async fn children(&self, id: i32) -> Result<Vec<network::Model>, DomainError>;
}
