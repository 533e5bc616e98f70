//! Organization Service - contacts, companies, sites, categories and the
//! network column hierarchy.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

use super::{check_clients, check_ref, fetch, linked_ids, now, purge_polymorphic};
use crate::domain::validation::{email, optional, phone_number, required};
use crate::domain::{DomainError, DomainResult, EntityType};
use crate::models::{
    company, company_clients, company_company_types, company_contacts, company_type, contact,
    contact_clients, host_category, network_category, network_column_hierarchy, site,
    site_clients,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewContact {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub movil_number: Option<String>,
    pub comment: Option<String>,
    pub client_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCompany {
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub fax_number: Option<String>,
    pub comment: Option<String>,
    pub client_ids: Vec<i32>,
    pub contact_ids: Vec<i32>,
    pub company_type_ids: Vec<i32>,
}

// ============ Contacts ============

/// A contact needs a name or a surname; phone numbers and the email are
/// checked when present.
fn contact_fields(input: NewContact) -> DomainResult<contact::ActiveModel> {
    let name = optional(input.name);
    let surname = optional(input.surname);
    if name.is_none() && surname.is_none() {
        return Err(DomainError::validation("a contact needs a name or a surname"));
    }

    Ok(contact::ActiveModel {
        name: Set(name),
        surname: Set(surname),
        email: Set(email(input.email)?),
        address: Set(optional(input.address)),
        phone_number: Set(phone_number("phone_number", input.phone_number)?),
        movil_number: Set(phone_number("movil_number", input.movil_number)?),
        comment: Set(optional(input.comment)),
        ..Default::default()
    })
}

async fn link_contact_clients<C: ConnectionTrait>(
    conn: &C,
    contact_id: i32,
    client_ids: Vec<i32>,
) -> DomainResult<()> {
    contact_clients::Entity::delete_many()
        .filter(contact_clients::Column::ContactId.eq(contact_id))
        .exec(conn)
        .await?;
    for client_id in client_ids {
        contact_clients::ActiveModel {
            contact_id: Set(contact_id),
            client_id: Set(client_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub async fn create_contact(
    db: &DatabaseConnection,
    input: NewContact,
) -> DomainResult<contact::Model> {
    let client_ids = input.client_ids.clone();
    let mut active = contact_fields(input)?;

    let txn = db.begin().await?;
    let client_ids = check_clients(&txn, &client_ids).await?;

    let now = now();
    active.created_at = Set(now.clone());
    active.updated_at = Set(now);
    let model = active.insert(&txn).await?;
    link_contact_clients(&txn, model.id, client_ids).await?;

    txn.commit().await?;
    Ok(model)
}

/// Replace every field of a contact, including the clients it is shared with.
pub async fn update_contact(
    db: &DatabaseConnection,
    id: i32,
    input: NewContact,
) -> DomainResult<contact::Model> {
    let client_ids = input.client_ids.clone();
    let mut active = contact_fields(input)?;

    let txn = db.begin().await?;
    fetch::<contact::Entity, _>(&txn, id, "contact").await?;
    let client_ids = check_clients(&txn, &client_ids).await?;

    active.id = Set(id);
    active.updated_at = Set(now());
    let model = active.update(&txn).await?;
    link_contact_clients(&txn, id, client_ids).await?;

    txn.commit().await?;
    tracing::info!("Updated contact {}", id);
    Ok(model)
}

pub async fn contact_client_ids(db: &DatabaseConnection, id: i32) -> DomainResult<Vec<i32>> {
    linked_ids::<contact_clients::Entity, _>(
        db,
        contact_clients::Column::ContactId,
        id,
        contact_clients::Column::ClientId,
    )
    .await
}

pub async fn list_contacts(db: &DatabaseConnection) -> DomainResult<Vec<contact::Model>> {
    Ok(contact::Entity::find()
        .order_by_asc(contact::Column::Surname)
        .order_by_asc(contact::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_contact(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<contact::Entity, _>(db, id, "contact").await?;
    contact::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

// ============ Companies ============

pub async fn create_company_type(
    db: &DatabaseConnection,
    label: &str,
    comment: Option<String>,
) -> DomainResult<company_type::Model> {
    let label = required("company type", label)?;
    ensure_company_type_free(db, &label, None).await?;

    Ok(company_type::ActiveModel {
        company_type: Set(label),
        comment: Set(optional(comment)),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn update_company_type(
    db: &DatabaseConnection,
    id: i32,
    label: &str,
    comment: Option<String>,
) -> DomainResult<company_type::Model> {
    let label = required("company type", label)?;
    let existing = fetch::<company_type::Entity, _>(db, id, "company type").await?;
    ensure_company_type_free(db, &label, Some(id)).await?;

    let mut active: company_type::ActiveModel = existing.into();
    active.company_type = Set(label);
    active.comment = Set(optional(comment));
    Ok(active.update(db).await?)
}

async fn ensure_company_type_free(
    db: &DatabaseConnection,
    label: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query =
        company_type::Entity::find().filter(company_type::Column::CompanyType.eq(label));
    if let Some(id) = except {
        query = query.filter(company_type::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(DomainError::duplicate(
            "company_types.company_type",
            format!("company type '{}' already exists", label),
        ));
    }
    Ok(())
}

pub async fn list_company_types(db: &DatabaseConnection) -> DomainResult<Vec<company_type::Model>> {
    Ok(company_type::Entity::find()
        .order_by_asc(company_type::Column::CompanyType)
        .all(db)
        .await?)
}

pub async fn delete_company_type(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<company_type::Entity, _>(db, id, "company type").await?;
    company_type::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

fn company_fields(input: &NewCompany) -> DomainResult<company::ActiveModel> {
    Ok(company::ActiveModel {
        name: Set(required("company name", &input.name)?),
        address: Set(optional(input.address.clone())),
        phone_number: Set(phone_number("phone_number", input.phone_number.clone())?),
        fax_number: Set(phone_number("fax_number", input.fax_number.clone())?),
        comment: Set(optional(input.comment.clone())),
        ..Default::default()
    })
}

/// Check the referenced clients, contacts and company types, then make them
/// the company's only links.
async fn link_company<C: ConnectionTrait>(
    conn: &C,
    company_id: i32,
    input: &NewCompany,
) -> DomainResult<()> {
    let client_ids = check_clients(conn, &input.client_ids).await?;
    for id in &input.contact_ids {
        check_ref::<contact::Entity, _>(conn, Some(*id), "contact").await?;
    }
    for id in &input.company_type_ids {
        check_ref::<company_type::Entity, _>(conn, Some(*id), "company type").await?;
    }

    company_clients::Entity::delete_many()
        .filter(company_clients::Column::CompanyId.eq(company_id))
        .exec(conn)
        .await?;
    company_contacts::Entity::delete_many()
        .filter(company_contacts::Column::CompanyId.eq(company_id))
        .exec(conn)
        .await?;
    company_company_types::Entity::delete_many()
        .filter(company_company_types::Column::CompanyId.eq(company_id))
        .exec(conn)
        .await?;

    for client_id in client_ids {
        company_clients::ActiveModel {
            company_id: Set(company_id),
            client_id: Set(client_id),
        }
        .insert(conn)
        .await?;
    }
    for contact_id in dedup(&input.contact_ids) {
        company_contacts::ActiveModel {
            company_id: Set(company_id),
            contact_id: Set(contact_id),
        }
        .insert(conn)
        .await?;
    }
    for company_type_id in dedup(&input.company_type_ids) {
        company_company_types::ActiveModel {
            company_id: Set(company_id),
            company_type_id: Set(company_type_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub async fn create_company(
    db: &DatabaseConnection,
    input: NewCompany,
) -> DomainResult<company::Model> {
    let mut active = company_fields(&input)?;

    let txn = db.begin().await?;
    let now = now();
    active.created_at = Set(now.clone());
    active.updated_at = Set(now);
    let model = active.insert(&txn).await?;
    link_company(&txn, model.id, &input).await?;

    txn.commit().await?;
    tracing::info!("Created company '{}' (id {})", model.name, model.id);
    Ok(model)
}

/// Replace every field and link of a company.
pub async fn update_company(
    db: &DatabaseConnection,
    id: i32,
    input: NewCompany,
) -> DomainResult<company::Model> {
    let mut active = company_fields(&input)?;

    let txn = db.begin().await?;
    fetch::<company::Entity, _>(&txn, id, "company").await?;
    active.id = Set(id);
    active.updated_at = Set(now());
    let model = active.update(&txn).await?;
    link_company(&txn, id, &input).await?;

    txn.commit().await?;
    tracing::info!("Updated company '{}' (id {})", model.name, id);
    Ok(model)
}

/// Client, contact and company type ids linked to a company.
pub async fn company_links(
    db: &DatabaseConnection,
    id: i32,
) -> DomainResult<(Vec<i32>, Vec<i32>, Vec<i32>)> {
    let clients = linked_ids::<company_clients::Entity, _>(
        db,
        company_clients::Column::CompanyId,
        id,
        company_clients::Column::ClientId,
    )
    .await?;
    let contacts = linked_ids::<company_contacts::Entity, _>(
        db,
        company_contacts::Column::CompanyId,
        id,
        company_contacts::Column::ContactId,
    )
    .await?;
    let types = linked_ids::<company_company_types::Entity, _>(
        db,
        company_company_types::Column::CompanyId,
        id,
        company_company_types::Column::CompanyTypeId,
    )
    .await?;
    Ok((clients, contacts, types))
}

pub async fn list_companies(db: &DatabaseConnection) -> DomainResult<Vec<company::Model>> {
    Ok(company::Entity::find()
        .order_by_asc(company::Column::Name)
        .all(db)
        .await?)
}

/// VLANs and lines naming the company as provider keep existing without one.
pub async fn delete_company(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<company::Entity, _>(db, id, "company").await?;
    company::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

// ============ Sites ============

pub async fn create_site(
    db: &DatabaseConnection,
    name: &str,
    client_ids: &[i32],
) -> DomainResult<site::Model> {
    let name = required("site name", name)?;

    let txn = db.begin().await?;
    let client_ids = check_clients(&txn, client_ids).await?;
    let model = site::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    link_site_clients(&txn, model.id, client_ids).await?;

    txn.commit().await?;
    Ok(model)
}

/// Rename a site and replace the clients it is shared with.
pub async fn update_site(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
    client_ids: &[i32],
) -> DomainResult<site::Model> {
    let name = required("site name", name)?;

    let txn = db.begin().await?;
    let existing = fetch::<site::Entity, _>(&txn, id, "site").await?;
    let client_ids = check_clients(&txn, client_ids).await?;

    let mut active: site::ActiveModel = existing.into();
    active.name = Set(name);
    let model = active.update(&txn).await?;
    link_site_clients(&txn, id, client_ids).await?;

    txn.commit().await?;
    Ok(model)
}

pub async fn site_client_ids(db: &DatabaseConnection, id: i32) -> DomainResult<Vec<i32>> {
    linked_ids::<site_clients::Entity, _>(
        db,
        site_clients::Column::SiteId,
        id,
        site_clients::Column::ClientId,
    )
    .await
}

async fn link_site_clients<C: ConnectionTrait>(
    conn: &C,
    site_id: i32,
    client_ids: Vec<i32>,
) -> DomainResult<()> {
    site_clients::Entity::delete_many()
        .filter(site_clients::Column::SiteId.eq(site_id))
        .exec(conn)
        .await?;
    for client_id in client_ids {
        site_clients::ActiveModel {
            site_id: Set(site_id),
            client_id: Set(client_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub async fn list_sites(db: &DatabaseConnection) -> DomainResult<Vec<site::Model>> {
    Ok(site::Entity::find()
        .order_by_asc(site::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_site(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    fetch::<site::Entity, _>(&txn, id, "site").await?;
    purge_polymorphic(&txn, EntityType::Site, &[id]).await?;
    site::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

// ============ Categories ============

pub async fn create_host_category(
    db: &DatabaseConnection,
    name: &str,
    comment: Option<String>,
) -> DomainResult<host_category::Model> {
    let name = required("host category", name)?;
    ensure_host_category_free(db, &name, None).await?;

    Ok(host_category::ActiveModel {
        name: Set(name),
        comment: Set(optional(comment)),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn update_host_category(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
    comment: Option<String>,
) -> DomainResult<host_category::Model> {
    let name = required("host category", name)?;
    let existing = fetch::<host_category::Entity, _>(db, id, "host category").await?;
    ensure_host_category_free(db, &name, Some(id)).await?;

    let mut active: host_category::ActiveModel = existing.into();
    active.name = Set(name);
    active.comment = Set(optional(comment));
    Ok(active.update(db).await?)
}

async fn ensure_host_category_free(
    db: &DatabaseConnection,
    name: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query = host_category::Entity::find().filter(host_category::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(host_category::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(DomainError::duplicate(
            "host_categories.name",
            format!("host category '{}' already exists", name),
        ));
    }
    Ok(())
}

pub async fn list_host_categories(
    db: &DatabaseConnection,
) -> DomainResult<Vec<host_category::Model>> {
    Ok(host_category::Entity::find()
        .order_by_asc(host_category::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_host_category(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<host_category::Entity, _>(db, id, "host category").await?;
    host_category::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

pub async fn create_network_category(
    db: &DatabaseConnection,
    name: &str,
    comment: Option<String>,
) -> DomainResult<network_category::Model> {
    let name = required("network category", name)?;
    ensure_network_category_free(db, &name, None).await?;

    Ok(network_category::ActiveModel {
        name: Set(name),
        comment: Set(optional(comment)),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn update_network_category(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
    comment: Option<String>,
) -> DomainResult<network_category::Model> {
    let name = required("network category", name)?;
    let existing = fetch::<network_category::Entity, _>(db, id, "network category").await?;
    ensure_network_category_free(db, &name, Some(id)).await?;

    let mut active: network_category::ActiveModel = existing.into();
    active.name = Set(name);
    active.comment = Set(optional(comment));
    Ok(active.update(db).await?)
}

async fn ensure_network_category_free(
    db: &DatabaseConnection,
    name: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query =
        network_category::Entity::find().filter(network_category::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(network_category::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(DomainError::duplicate(
            "network_categories.name",
            format!("network category '{}' already exists", name),
        ));
    }
    Ok(())
}

pub async fn list_network_categories(
    db: &DatabaseConnection,
) -> DomainResult<Vec<network_category::Model>> {
    Ok(network_category::Entity::find()
        .order_by_asc(network_category::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_network_category(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<network_category::Entity, _>(db, id, "network category").await?;
    network_category::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

// ============ Network column hierarchy ============

/// Register a column of the network list view at a display level.
pub async fn create_column_level(
    db: &DatabaseConnection,
    column_name: &str,
    level: i32,
) -> DomainResult<network_column_hierarchy::Model> {
    let column_name = required("column name", column_name)?;
    column_level(level)?;
    ensure_column_free(db, &column_name, None).await?;

    Ok(network_column_hierarchy::ActiveModel {
        column_name: Set(column_name),
        level: Set(level),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn update_column_level(
    db: &DatabaseConnection,
    id: i32,
    column_name: &str,
    level: i32,
) -> DomainResult<network_column_hierarchy::Model> {
    let column_name = required("column name", column_name)?;
    column_level(level)?;
    let existing =
        fetch::<network_column_hierarchy::Entity, _>(db, id, "column level").await?;
    ensure_column_free(db, &column_name, Some(id)).await?;

    let mut active: network_column_hierarchy::ActiveModel = existing.into();
    active.column_name = Set(column_name);
    active.level = Set(level);
    Ok(active.update(db).await?)
}

fn column_level(level: i32) -> DomainResult<i32> {
    if level < 0 {
        return Err(DomainError::validation(format!(
            "level {} must not be negative",
            level
        )));
    }
    Ok(level)
}

async fn ensure_column_free(
    db: &DatabaseConnection,
    column_name: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query = network_column_hierarchy::Entity::find()
        .filter(network_column_hierarchy::Column::ColumnName.eq(column_name));
    if let Some(id) = except {
        query = query.filter(network_column_hierarchy::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(DomainError::duplicate(
            "network_column_hierarchy.column_name",
            format!("column '{}' already has a level", column_name),
        ));
    }
    Ok(())
}

pub async fn list_column_levels(
    db: &DatabaseConnection,
) -> DomainResult<Vec<network_column_hierarchy::Model>> {
    Ok(network_column_hierarchy::Entity::find()
        .order_by_asc(network_column_hierarchy::Column::Level)
        .order_by_asc(network_column_hierarchy::Column::ColumnName)
        .all(db)
        .await?)
}

pub async fn delete_column_level(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<network_column_hierarchy::Entity, _>(db, id, "column level").await?;
    network_column_hierarchy::Entity::delete_by_id(id)
        .exec(db)
        .await?;
    Ok(())
}

fn dedup(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
