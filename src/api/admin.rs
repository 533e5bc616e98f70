//! Admin surface
//!
//! Every registered model gets list, detail, create, update and delete. Writes
//! go through the typed services so uniqueness, cascade and restrict rules
//! hold; bodies are decoded into the typed service inputs.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DatabaseConnection, EntityTrait, PrimaryKeyTrait};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::str::FromStr;

use super::error::ApiJson;
use crate::auth::Claims;
use crate::domain::{
    AttributeValue, DomainError, DomainResult, EntityType, NetworkUpdate, NewNetwork,
};
use crate::infrastructure::AppState;
use crate::models::{
    app_image, company, company_type, contact, custom_tag, dns_server, dns_server_group,
    eav_attribute, host_category, ip, line, manufacturer, network_category,
    network_column_hierarchy, operating_system, site, snmp_group,
};
use crate::services::{
    asset_service, client_service, custom_field_service, dns_service, fetch, ip_service,
    line_service, network_service, organization_service, segment_service, tag_service,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminModel {
    Clients,
    Contacts,
    CompanyTypes,
    Companies,
    Sites,
    HostCategories,
    NetworkCategories,
    Vlans,
    Vrfs,
    DnsServerGroups,
    DnsServers,
    NetworkColumnHierarchy,
    Networks,
    SnmpGroups,
    Manufacturers,
    OperatingSystems,
    AppImages,
    Assets,
    Ips,
    Lines,
    CustomTags,
    CustomFields,
}

impl AdminModel {
    pub const ALL: [AdminModel; 22] = [
        AdminModel::Clients,
        AdminModel::Contacts,
        AdminModel::CompanyTypes,
        AdminModel::Companies,
        AdminModel::Sites,
        AdminModel::HostCategories,
        AdminModel::NetworkCategories,
        AdminModel::Vlans,
        AdminModel::Vrfs,
        AdminModel::DnsServerGroups,
        AdminModel::DnsServers,
        AdminModel::NetworkColumnHierarchy,
        AdminModel::Networks,
        AdminModel::SnmpGroups,
        AdminModel::Manufacturers,
        AdminModel::OperatingSystems,
        AdminModel::AppImages,
        AdminModel::Assets,
        AdminModel::Ips,
        AdminModel::Lines,
        AdminModel::CustomTags,
        AdminModel::CustomFields,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminModel::Clients => "clients",
            AdminModel::Contacts => "contacts",
            AdminModel::CompanyTypes => "company_types",
            AdminModel::Companies => "companies",
            AdminModel::Sites => "sites",
            AdminModel::HostCategories => "host_categories",
            AdminModel::NetworkCategories => "network_categories",
            AdminModel::Vlans => "vlans",
            AdminModel::Vrfs => "vrfs",
            AdminModel::DnsServerGroups => "dns_server_groups",
            AdminModel::DnsServers => "dns_servers",
            AdminModel::NetworkColumnHierarchy => "network_column_hierarchy",
            AdminModel::Networks => "networks",
            AdminModel::SnmpGroups => "snmp_groups",
            AdminModel::Manufacturers => "manufacturers",
            AdminModel::OperatingSystems => "operating_systems",
            AdminModel::AppImages => "app_images",
            AdminModel::Assets => "assets",
            AdminModel::Ips => "ips",
            AdminModel::Lines => "lines",
            AdminModel::CustomTags => "custom_tags",
            AdminModel::CustomFields => "custom_fields",
        }
    }

    /// Whether `POST /api/admin/{model}` is available.
    pub fn creatable(&self) -> bool {
        !matches!(self, AdminModel::Ips)
    }
}

impl FromStr for AdminModel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminModel::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown admin model '{}'", s)))
    }
}

fn to_json<T: Serialize>(value: T) -> DomainResult<Value> {
    serde_json::to_value(value).map_err(|e| DomainError::Database(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: Value) -> DomainResult<T> {
    serde_json::from_value(body).map_err(|e| DomainError::validation(e.to_string()))
}

async fn list_of<E>(db: &DatabaseConnection) -> DomainResult<Value>
where
    E: EntityTrait,
    E::Model: Serialize,
{
    to_json(E::find().all(db).await?)
}

async fn one_of<E>(db: &DatabaseConnection, id: i32, entity: &'static str) -> DomainResult<Value>
where
    E: EntityTrait,
    E::Model: Serialize,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    to_json(fetch::<E, _>(db, id, entity).await?)
}

async fn list_model(state: &AppState, model: AdminModel) -> DomainResult<Value> {
    let db = state.db();
    match model {
        AdminModel::Clients => to_json(client_service::list_clients(db).await?),
        AdminModel::Contacts => to_json(organization_service::list_contacts(db).await?),
        AdminModel::CompanyTypes => to_json(organization_service::list_company_types(db).await?),
        AdminModel::Companies => to_json(organization_service::list_companies(db).await?),
        AdminModel::Sites => to_json(organization_service::list_sites(db).await?),
        AdminModel::HostCategories => {
            to_json(organization_service::list_host_categories(db).await?)
        }
        AdminModel::NetworkCategories => {
            to_json(organization_service::list_network_categories(db).await?)
        }
        AdminModel::Vlans => to_json(segment_service::list_vlans(db, None).await?),
        AdminModel::Vrfs => to_json(segment_service::list_vrfs(db, None).await?),
        AdminModel::DnsServerGroups => to_json(dns_service::list_dns_server_groups(db).await?),
        AdminModel::DnsServers => to_json(dns_service::list_dns_servers(db, None).await?),
        AdminModel::NetworkColumnHierarchy => {
            to_json(organization_service::list_column_levels(db).await?)
        }
        AdminModel::Networks => to_json(state.network_repo.find_all(Default::default()).await?),
        AdminModel::SnmpGroups => to_json(asset_service::list_snmp_groups(db).await?),
        AdminModel::Manufacturers => to_json(asset_service::list_manufacturers(db).await?),
        AdminModel::OperatingSystems => to_json(asset_service::list_operating_systems(db).await?),
        AdminModel::AppImages => to_json(asset_service::list_app_images(db).await?),
        AdminModel::Assets => to_json(asset_service::list_assets(db).await?),
        AdminModel::Ips => list_of::<ip::Entity>(db).await,
        AdminModel::Lines => to_json(line_service::list_lines(db, None).await?),
        AdminModel::CustomTags => to_json(tag_service::list_tags(db).await?),
        AdminModel::CustomFields => to_json(custom_field_service::list_fields(db, None).await?),
    }
}

/// Detail view: the row, plus the ids of its many-to-many links. Networks and
/// IPs carry their tags and custom field values.
async fn get_model(db: &DatabaseConnection, model: AdminModel, id: i32) -> DomainResult<Value> {
    match model {
        AdminModel::Clients => to_json(client_service::get_client(db, id).await?),
        AdminModel::Contacts => with_links(
            one_of::<contact::Entity>(db, id, "contact").await?,
            [("client_ids", organization_service::contact_client_ids(db, id).await?)],
        ),
        AdminModel::CompanyTypes => one_of::<company_type::Entity>(db, id, "company type").await,
        AdminModel::Companies => {
            let row = one_of::<company::Entity>(db, id, "company").await?;
            let (clients, contacts, types) = organization_service::company_links(db, id).await?;
            with_links(
                row,
                [
                    ("client_ids", clients),
                    ("contact_ids", contacts),
                    ("company_type_ids", types),
                ],
            )
        }
        AdminModel::Sites => with_links(
            one_of::<site::Entity>(db, id, "site").await?,
            [("client_ids", organization_service::site_client_ids(db, id).await?)],
        ),
        AdminModel::HostCategories => {
            one_of::<host_category::Entity>(db, id, "host category").await
        }
        AdminModel::NetworkCategories => {
            one_of::<network_category::Entity>(db, id, "network category").await
        }
        AdminModel::Vlans => to_json(segment_service::get_vlan(db, id).await?),
        AdminModel::Vrfs => to_json(segment_service::get_vrf(db, id).await?),
        AdminModel::DnsServerGroups => {
            one_of::<dns_server_group::Entity>(db, id, "DNS server group").await
        }
        AdminModel::DnsServers => with_links(
            one_of::<dns_server::Entity>(db, id, "DNS server").await?,
            [("client_ids", dns_service::dns_server_client_ids(db, id).await?)],
        ),
        AdminModel::NetworkColumnHierarchy => {
            one_of::<network_column_hierarchy::Entity>(db, id, "column level").await
        }
        AdminModel::Networks => to_json(network_service::network_record(db, id).await?),
        AdminModel::SnmpGroups => with_links(
            one_of::<snmp_group::Entity>(db, id, "SNMP group").await?,
            [("client_ids", asset_service::snmp_group_client_ids(db, id).await?)],
        ),
        AdminModel::Manufacturers => one_of::<manufacturer::Entity>(db, id, "manufacturer").await,
        AdminModel::OperatingSystems => {
            one_of::<operating_system::Entity>(db, id, "operating system").await
        }
        AdminModel::AppImages => one_of::<app_image::Entity>(db, id, "image").await,
        AdminModel::Assets => with_links(
            to_json(asset_service::get_asset(db, id).await?)?,
            [("client_ids", asset_service::asset_client_ids(db, id).await?)],
        ),
        AdminModel::Ips => {
            let model = ip_service::get_ip(db, id).await?;
            to_json(ip_service::ip_record(db, model).await?)
        }
        AdminModel::Lines => one_of::<line::Entity>(db, id, "line").await,
        AdminModel::CustomTags => one_of::<custom_tag::Entity>(db, id, "tag").await,
        AdminModel::CustomFields => {
            one_of::<eav_attribute::Entity>(db, id, "custom field").await
        }
    }
}

fn with_links<const N: usize>(
    mut row: Value,
    links: [(&'static str, Vec<i32>); N],
) -> DomainResult<Value> {
    if let Value::Object(fields) = &mut row {
        for (name, ids) in links {
            fields.insert(name.to_string(), json!(ids));
        }
    }
    Ok(row)
}

/// Overlay the keys of a PATCH body on the current detail view of a row.
fn merge(mut current: Value, body: Value) -> DomainResult<Value> {
    let Value::Object(changes) = body else {
        return Err(DomainError::validation("request body must be a JSON object"));
    };
    if let Value::Object(fields) = &mut current {
        fields.extend(changes);
    }
    Ok(current)
}

async fn delete_model(state: &AppState, model: AdminModel, id: i32) -> DomainResult<()> {
    let db = state.db();
    match model {
        AdminModel::Clients => client_service::delete_client(db, id).await,
        AdminModel::Contacts => organization_service::delete_contact(db, id).await,
        AdminModel::CompanyTypes => organization_service::delete_company_type(db, id).await,
        AdminModel::Companies => organization_service::delete_company(db, id).await,
        AdminModel::Sites => organization_service::delete_site(db, id).await,
        AdminModel::HostCategories => organization_service::delete_host_category(db, id).await,
        AdminModel::NetworkCategories => {
            organization_service::delete_network_category(db, id).await
        }
        AdminModel::Vlans => segment_service::delete_vlan(db, id).await,
        AdminModel::Vrfs => segment_service::delete_vrf(db, id).await,
        AdminModel::DnsServerGroups => dns_service::delete_dns_server_group(db, id).await,
        AdminModel::DnsServers => dns_service::delete_dns_server(db, id).await,
        AdminModel::NetworkColumnHierarchy => {
            organization_service::delete_column_level(db, id).await
        }
        AdminModel::Networks => state.network_repo.delete(id).await,
        AdminModel::SnmpGroups => asset_service::delete_snmp_group(db, id).await,
        AdminModel::Manufacturers => asset_service::delete_manufacturer(db, id).await,
        AdminModel::OperatingSystems => asset_service::delete_operating_system(db, id).await,
        AdminModel::AppImages => asset_service::delete_app_image(db, id).await,
        AdminModel::Assets => asset_service::delete_asset(db, id).await,
        AdminModel::Ips => ip_service::delete_ip(db, id).await,
        AdminModel::Lines => line_service::delete_line(db, id).await,
        AdminModel::CustomTags => tag_service::delete_tag(db, id).await,
        AdminModel::CustomFields => custom_field_service::remove_field(db, id).await,
    }
}

#[derive(Deserialize)]
struct NamedRequest {
    name: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    client_ids: Vec<i32>,
}

#[derive(Deserialize)]
struct CompanyTypeRequest {
    company_type: String,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Deserialize)]
struct ColumnLevelRequest {
    column_name: String,
    level: i32,
}

#[derive(Deserialize)]
struct TagRequest {
    tag: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct FieldRequest {
    entity_type: EntityType,
    name: String,
    #[serde(rename = "type")]
    datatype: String,
}

async fn create_model(state: &AppState, model: AdminModel, body: Value) -> DomainResult<Value> {
    let db = state.db();
    match model {
        AdminModel::Clients => {
            let req: NamedRequest = from_json(body)?;
            to_json(client_service::create_client(db, &req.name).await?)
        }
        AdminModel::Contacts => {
            to_json(organization_service::create_contact(db, from_json(body)?).await?)
        }
        AdminModel::CompanyTypes => {
            let req: CompanyTypeRequest = from_json(body)?;
            to_json(
                organization_service::create_company_type(db, &req.company_type, req.comment)
                    .await?,
            )
        }
        AdminModel::Companies => {
            to_json(organization_service::create_company(db, from_json(body)?).await?)
        }
        AdminModel::Sites => {
            let req: NamedRequest = from_json(body)?;
            to_json(organization_service::create_site(db, &req.name, &req.client_ids).await?)
        }
        AdminModel::HostCategories => {
            let req: NamedRequest = from_json(body)?;
            to_json(organization_service::create_host_category(db, &req.name, req.comment).await?)
        }
        AdminModel::NetworkCategories => {
            let req: NamedRequest = from_json(body)?;
            to_json(
                organization_service::create_network_category(db, &req.name, req.comment).await?,
            )
        }
        AdminModel::Vlans => to_json(segment_service::create_vlan(db, from_json(body)?).await?),
        AdminModel::Vrfs => to_json(segment_service::create_vrf(db, from_json(body)?).await?),
        AdminModel::DnsServerGroups => {
            to_json(dns_service::create_dns_server_group(db, from_json(body)?).await?)
        }
        AdminModel::DnsServers => {
            to_json(dns_service::create_dns_server(db, from_json(body)?).await?)
        }
        AdminModel::NetworkColumnHierarchy => {
            let req: ColumnLevelRequest = from_json(body)?;
            to_json(organization_service::create_column_level(db, &req.column_name, req.level).await?)
        }
        AdminModel::Networks => {
            let input: NewNetwork = from_json(body)?;
            to_json(state.network_repo.create(input).await?)
        }
        AdminModel::SnmpGroups => {
            to_json(asset_service::create_snmp_group(db, from_json(body)?).await?)
        }
        AdminModel::Manufacturers => {
            to_json(asset_service::create_manufacturer(db, from_json(body)?).await?)
        }
        AdminModel::OperatingSystems => {
            to_json(asset_service::create_operating_system(db, from_json(body)?).await?)
        }
        AdminModel::AppImages => to_json(asset_service::create_app_image(db, from_json(body)?).await?),
        AdminModel::Assets => to_json(asset_service::create_asset(db, from_json(body)?).await?),
        AdminModel::Lines => to_json(line_service::create_line(db, from_json(body)?).await?),
        AdminModel::CustomTags => {
            let req: TagRequest = from_json(body)?;
            to_json(tag_service::create_tag(db, &req.tag, req.description).await?)
        }
        AdminModel::CustomFields => {
            let req: FieldRequest = from_json(body)?;
            to_json(
                custom_field_service::add_field(db, req.entity_type, &req.name, &req.datatype)
                    .await?,
            )
        }
        AdminModel::Ips => Err(DomainError::validation(
            "IP records are created through /api/v1/IP/",
        )),
    }
}

/// Networks, VLANs and IPs take their own partial update inputs. Every other
/// model is patched by merging the body into its current state and running
/// the result through the typed replace of its service.
async fn update_model(
    state: &AppState,
    model: AdminModel,
    id: i32,
    body: Value,
) -> DomainResult<Value> {
    let db = state.db();
    match model {
        AdminModel::Clients => {
            let req: NamedRequest = from_json(body)?;
            to_json(client_service::rename_client(db, id, &req.name).await?)
        }
        AdminModel::Networks => {
            let input: NetworkUpdate = from_json(body)?;
            state.network_repo.update(id, input).await?;
            to_json(network_service::network_record(db, id).await?)
        }
        AdminModel::Vlans => to_json(segment_service::update_vlan(db, id, from_json(body)?).await?),
        AdminModel::Ips => {
            let model = ip_service::update_ip(db, id, from_json(body)?).await?;
            to_json(ip_service::ip_record(db, model).await?)
        }
        AdminModel::CustomFields => Err(DomainError::validation(
            "custom fields cannot change once created; remove the field and add it again",
        )),
        other => {
            let merged = merge(get_model(db, other, id).await?, body)?;
            replace_model(db, other, id, merged).await
        }
    }
}

async fn replace_model(
    db: &DatabaseConnection,
    model: AdminModel,
    id: i32,
    body: Value,
) -> DomainResult<Value> {
    match model {
        AdminModel::Contacts => {
            to_json(organization_service::update_contact(db, id, from_json(body)?).await?)
        }
        AdminModel::CompanyTypes => {
            let req: CompanyTypeRequest = from_json(body)?;
            to_json(
                organization_service::update_company_type(db, id, &req.company_type, req.comment)
                    .await?,
            )
        }
        AdminModel::Companies => {
            to_json(organization_service::update_company(db, id, from_json(body)?).await?)
        }
        AdminModel::Sites => {
            let req: NamedRequest = from_json(body)?;
            to_json(organization_service::update_site(db, id, &req.name, &req.client_ids).await?)
        }
        AdminModel::HostCategories => {
            let req: NamedRequest = from_json(body)?;
            to_json(
                organization_service::update_host_category(db, id, &req.name, req.comment)
                    .await?,
            )
        }
        AdminModel::NetworkCategories => {
            let req: NamedRequest = from_json(body)?;
            to_json(
                organization_service::update_network_category(db, id, &req.name, req.comment)
                    .await?,
            )
        }
        AdminModel::Vrfs => to_json(segment_service::update_vrf(db, id, from_json(body)?).await?),
        AdminModel::DnsServerGroups => {
            to_json(dns_service::update_dns_server_group(db, id, from_json(body)?).await?)
        }
        AdminModel::DnsServers => {
            to_json(dns_service::update_dns_server(db, id, from_json(body)?).await?)
        }
        AdminModel::NetworkColumnHierarchy => {
            let req: ColumnLevelRequest = from_json(body)?;
            to_json(
                organization_service::update_column_level(db, id, &req.column_name, req.level)
                    .await?,
            )
        }
        AdminModel::SnmpGroups => {
            to_json(asset_service::update_snmp_group(db, id, from_json(body)?).await?)
        }
        AdminModel::Manufacturers => {
            to_json(asset_service::update_manufacturer(db, id, from_json(body)?).await?)
        }
        AdminModel::OperatingSystems => {
            to_json(asset_service::update_operating_system(db, id, from_json(body)?).await?)
        }
        AdminModel::AppImages => {
            to_json(asset_service::update_app_image(db, id, from_json(body)?).await?)
        }
        AdminModel::Assets => to_json(asset_service::update_asset(db, id, from_json(body)?).await?),
        AdminModel::Lines => to_json(line_service::update_line(db, id, from_json(body)?).await?),
        AdminModel::CustomTags => {
            let req: TagRequest = from_json(body)?;
            to_json(tag_service::update_tag(db, id, &req.tag, req.description).await?)
        }
        AdminModel::Clients
        | AdminModel::Networks
        | AdminModel::Vlans
        | AdminModel::Ips
        | AdminModel::CustomFields => Err(DomainError::validation(format!(
            "{} has its own update path",
            model.as_str()
        ))),
    }
}

/// Hierarchy views of a network, and the attachment lists of tags and fields.
async fn relation_of(
    state: &AppState,
    model: AdminModel,
    id: i32,
    relation: &str,
) -> DomainResult<Value> {
    let db = state.db();
    match (model, relation) {
        (AdminModel::Networks, "ancestors") => to_json(state.network_repo.ancestors(id).await?),
        (AdminModel::Networks, "children") => to_json(state.network_repo.children(id).await?),
        (AdminModel::Networks, "parent") => to_json(network_service::parent(db, id).await?),
        (AdminModel::Networks, "rootnet") => to_json(network_service::rootnet_of(db, id).await?),
        (AdminModel::CustomTags, entity) => {
            let entity_type: EntityType = entity.parse()?;
            fetch::<custom_tag::Entity, _>(db, id, "tag").await?;
            to_json(tag_service::entities_tagged(db, id, entity_type).await?)
        }
        _ => Err(DomainError::validation(format!(
            "{} has no relation '{}'",
            model.as_str(),
            relation
        ))),
    }
}

#[derive(Deserialize)]
struct TagItemRequest {
    entity_id: i32,
}

#[derive(Deserialize)]
struct FieldValueRequest {
    entity_id: i32,
    value: AttributeValue,
}

/// Attach an entity to a tag, or store a custom field value.
async fn attach(
    state: &AppState,
    model: AdminModel,
    id: i32,
    relation: &str,
    body: Value,
) -> DomainResult<Value> {
    let db = state.db();
    match (model, relation) {
        (AdminModel::CustomTags, entity) => {
            let entity_type: EntityType = entity.parse()?;
            let req: TagItemRequest = from_json(body)?;
            tag_service::tag_entity(db, id, entity_type, req.entity_id).await?;
            Ok(json!({ "tag_id": id, "entity_type": entity_type, "entity_id": req.entity_id }))
        }
        (AdminModel::CustomFields, "values") => {
            let req: FieldValueRequest = from_json(body)?;
            let value = custom_field_service::set_value(db, id, req.entity_id, req.value).await?;
            Ok(json!({ "attribute_id": id, "entity_id": req.entity_id, "value": value }))
        }
        _ => Err(DomainError::validation(format!(
            "{} has no relation '{}'",
            model.as_str(),
            relation
        ))),
    }
}

fn respond(result: DomainResult<Value>, status: StatusCode) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn parse_model(model: &str) -> Result<AdminModel, Response> {
    model.parse::<AdminModel>().map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Unknown model '{}'", model) })),
        )
            .into_response()
    })
}

// ============ Handlers ============

pub async fn index(claims: Claims) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }

    let models: Vec<Value> = AdminModel::ALL
        .iter()
        .map(|m| {
            json!({
                "name": m.as_str(),
                "url": format!("/api/admin/{}", m.as_str()),
                "creatable": m.creatable(),
            })
        })
        .collect();
    Json(json!({ "models": models })).into_response()
}

pub async fn list(
    claims: Claims,
    State(state): State<AppState>,
    Path(model): Path<String>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }
    let model = match parse_model(&model) {
        Ok(m) => m,
        Err(response) => return response,
    };
    respond(list_model(&state, model).await, StatusCode::OK)
}

pub async fn create(
    claims: Claims,
    State(state): State<AppState>,
    Path(model): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }
    let model = match parse_model(&model) {
        Ok(m) => m,
        Err(response) => return response,
    };
    respond(create_model(&state, model, body).await, StatusCode::CREATED)
}

pub async fn detail(
    claims: Claims,
    State(state): State<AppState>,
    Path((model, id)): Path<(String, i32)>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }
    let model = match parse_model(&model) {
        Ok(m) => m,
        Err(response) => return response,
    };
    respond(get_model(state.db(), model, id).await, StatusCode::OK)
}

pub async fn update(
    claims: Claims,
    State(state): State<AppState>,
    Path((model, id)): Path<(String, i32)>,
    ApiJson(body): ApiJson<Value>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }
    let model = match parse_model(&model) {
        Ok(m) => m,
        Err(response) => return response,
    };
    respond(update_model(&state, model, id, body).await, StatusCode::OK)
}

pub async fn delete(
    claims: Claims,
    State(state): State<AppState>,
    Path((model, id)): Path<(String, i32)>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }
    let model = match parse_model(&model) {
        Ok(m) => m,
        Err(response) => return response,
    };
    match delete_model(&state, model, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn relation(
    claims: Claims,
    State(state): State<AppState>,
    Path((model, id, relation)): Path<(String, i32, String)>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }
    let model = match parse_model(&model) {
        Ok(m) => m,
        Err(response) => return response,
    };
    respond(relation_of(&state, model, id, &relation).await, StatusCode::OK)
}

pub async fn attach_relation(
    claims: Claims,
    State(state): State<AppState>,
    Path((model, id, relation)): Path<(String, i32, String)>,
    ApiJson(body): ApiJson<Value>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }
    let model = match parse_model(&model) {
        Ok(m) => m,
        Err(response) => return response,
    };
    respond(attach(&state, model, id, &relation, body).await, StatusCode::CREATED)
}
