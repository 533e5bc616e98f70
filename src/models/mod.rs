pub mod app_image;
pub mod asset;
pub mod asset_clients;
pub mod client;
pub mod company;
pub mod company_clients;
pub mod company_company_types;
pub mod company_contacts;
pub mod company_type;
pub mod contact;
pub mod contact_clients;
pub mod custom_tag;
pub mod dns_server;
pub mod dns_server_clients;
pub mod dns_server_group;
pub mod eav_attribute;
pub mod eav_value;
pub mod host_category;
pub mod ip;
pub mod line;
pub mod linked_ip;
pub mod manufacturer;
pub mod network;
pub mod network_category;
pub mod network_column_hierarchy;
pub mod operating_system;
pub mod site;
pub mod site_clients;
pub mod snmp_group;
pub mod snmp_group_clients;
pub mod tagged_item;
pub mod user;
pub mod vlan;
pub mod vrf;
