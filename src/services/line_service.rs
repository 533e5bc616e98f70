//! Line Service - provider lines, unique by number and by name

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

use super::{check_ref, fetch, now, purge_polymorphic};
use crate::domain::validation::{optional, phone_number, required};
use crate::domain::{DomainError, DomainResult, EntityType};
use crate::models::line::{self, Entity as Line};
use crate::models::{client, company};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewLine {
    pub client_id: i32,
    pub provider_id: Option<i32>,
    pub number: i32,
    pub name: String,
    pub phone_number: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
}

pub async fn create_line(db: &DatabaseConnection, input: NewLine) -> DomainResult<line::Model> {
    let name = required("line name", &input.name)?;
    let phone = phone_number("phone_number", input.phone_number)?;

    let txn = db.begin().await?;
    check_ref::<client::Entity, _>(&txn, Some(input.client_id), "client").await?;
    check_ref::<company::Entity, _>(&txn, input.provider_id, "provider").await?;
    ensure_unique(&txn, input.number, &name, None).await?;

    let now = now();
    let model = line::ActiveModel {
        client_id: Set(input.client_id),
        provider_id: Set(input.provider_id),
        phone_number: Set(phone),
        number: Set(input.number),
        name: Set(name),
        comment: Set(optional(input.comment)),
        description: Set(optional(input.description)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!("Created line {} '{}'", model.number, model.name);
    Ok(model)
}

/// Replace every field of a line. Number and name stay unique.
pub async fn update_line(
    db: &DatabaseConnection,
    id: i32,
    input: NewLine,
) -> DomainResult<line::Model> {
    let name = required("line name", &input.name)?;
    let phone = phone_number("phone_number", input.phone_number)?;

    let txn = db.begin().await?;
    let existing = fetch::<Line, _>(&txn, id, "line").await?;
    check_ref::<client::Entity, _>(&txn, Some(input.client_id), "client").await?;
    check_ref::<company::Entity, _>(&txn, input.provider_id, "provider").await?;
    ensure_unique(&txn, input.number, &name, Some(id)).await?;

    let mut active: line::ActiveModel = existing.into();
    active.client_id = Set(input.client_id);
    active.provider_id = Set(input.provider_id);
    active.phone_number = Set(phone);
    active.number = Set(input.number);
    active.name = Set(name);
    active.comment = Set(optional(input.comment));
    active.description = Set(optional(input.description));
    active.updated_at = Set(now());

    let model = active.update(&txn).await?;
    txn.commit().await?;
    tracing::info!("Updated line {} '{}'", model.number, model.name);
    Ok(model)
}

async fn ensure_unique<C: ConnectionTrait>(
    conn: &C,
    number: i32,
    name: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let others = || match except {
        Some(id) => Line::find().filter(line::Column::Id.ne(id)),
        None => Line::find(),
    };

    if others()
        .filter(line::Column::Number.eq(number))
        .one(conn)
        .await?
        .is_some()
    {
        return Err(DomainError::duplicate(
            "lines.number",
            format!("line number {} already exists", number),
        ));
    }
    if others()
        .filter(line::Column::Name.eq(name))
        .one(conn)
        .await?
        .is_some()
    {
        return Err(DomainError::duplicate(
            "lines.name",
            format!("line '{}' already exists", name),
        ));
    }
    Ok(())
}

pub async fn list_lines(
    db: &DatabaseConnection,
    client_id: Option<i32>,
) -> DomainResult<Vec<line::Model>> {
    let mut query = Line::find();
    if let Some(client_id) = client_id {
        query = query.filter(line::Column::ClientId.eq(client_id));
    }
    Ok(query.order_by_asc(line::Column::Number).all(db).await?)
}

pub async fn delete_line(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    fetch::<Line, _>(&txn, id, "line").await?;
    purge_polymorphic(&txn, EntityType::Line, &[id]).await?;
    Line::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}
