//! Custom Field Service - typed extra attributes (EAV)
//!
//! Attributes are declared per entity type. Values live in one side table with
//! a nullable column per datatype; exactly one column is set per row.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::BTreeMap;

use super::{entity_exists, fetch, now};
use crate::domain::validation::required;
use crate::domain::{AttributeType, AttributeValue, DomainError, DomainResult, EntityType};
use crate::models::eav_attribute::{self, Entity as Attribute};
use crate::models::eav_value::{self, Entity as Value};

/// Declare a custom field. `type_token` is one of TEXT, FLOAT, INT, DATE or
/// BOOLEAN, in any case.
pub async fn add_field(
    db: &DatabaseConnection,
    entity_type: EntityType,
    name: &str,
    type_token: &str,
) -> DomainResult<eav_attribute::Model> {
    let datatype: AttributeType = type_token.parse()?;
    if !entity_type.supports_custom_fields() {
        return Err(DomainError::validation(format!(
            "{} does not accept custom fields",
            entity_type
        )));
    }
    let name = required("field name", name)?;

    let taken = Attribute::find()
        .filter(eav_attribute::Column::EntityType.eq(entity_type.as_str()))
        .filter(eav_attribute::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::duplicate(
            "eav_attributes.entity_type, eav_attributes.name",
            format!("{} already has a field '{}'", entity_type, name),
        ));
    }

    let model = eav_attribute::ActiveModel {
        entity_type: Set(entity_type.as_str().to_string()),
        name: Set(name),
        datatype: Set(datatype.as_str().to_string()),
        created_at: Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        "Added {} field '{}' to {}",
        model.datatype,
        model.name,
        model.entity_type
    );
    Ok(model)
}

pub async fn list_fields(
    db: &DatabaseConnection,
    entity_type: Option<EntityType>,
) -> DomainResult<Vec<eav_attribute::Model>> {
    let mut query = Attribute::find();
    if let Some(entity_type) = entity_type {
        query = query.filter(eav_attribute::Column::EntityType.eq(entity_type.as_str()));
    }
    Ok(query
        .order_by_asc(eav_attribute::Column::EntityType)
        .order_by_asc(eav_attribute::Column::Name)
        .all(db)
        .await?)
}

/// Remove a field and every value stored for it.
pub async fn remove_field(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let existing = fetch::<Attribute, _>(db, id, "custom field").await?;
    Attribute::delete_by_id(id).exec(db).await?;
    tracing::info!(
        "Removed field '{}' from {}",
        existing.name,
        existing.entity_type
    );
    Ok(())
}

/// Store a value for one entity, replacing any previous value.
pub async fn set_value(
    db: &DatabaseConnection,
    attribute_id: i32,
    entity_id: i32,
    value: AttributeValue,
) -> DomainResult<AttributeValue> {
    let txn = db.begin().await?;
    let attribute = fetch::<Attribute, _>(&txn, attribute_id, "custom field").await?;
    let entity_type: EntityType = attribute.entity_type.parse()?;
    let datatype: AttributeType = attribute.datatype.parse()?;
    let value = value.coerce(datatype)?;

    if !entity_exists(&txn, entity_type, entity_id).await? {
        return Err(DomainError::validation(format!(
            "{} {} does not exist",
            entity_type, entity_id
        )));
    }

    let existing = Value::find()
        .filter(eav_value::Column::AttributeId.eq(attribute_id))
        .filter(eav_value::Column::EntityId.eq(entity_id))
        .one(&txn)
        .await?;

    let mut active = match existing {
        Some(row) => row.into(),
        None => eav_value::ActiveModel {
            attribute_id: Set(attribute_id),
            entity_type: Set(attribute.entity_type.clone()),
            entity_id: Set(entity_id),
            ..Default::default()
        },
    };
    write_columns(&mut active, datatype, &value);
    active.updated_at = Set(now());
    active.save(&txn).await?;

    txn.commit().await?;
    Ok(value)
}

pub async fn get_value(
    db: &DatabaseConnection,
    attribute_id: i32,
    entity_id: i32,
) -> DomainResult<Option<AttributeValue>> {
    let attribute = fetch::<Attribute, _>(db, attribute_id, "custom field").await?;
    let datatype: AttributeType = attribute.datatype.parse()?;

    let row = Value::find()
        .filter(eav_value::Column::AttributeId.eq(attribute_id))
        .filter(eav_value::Column::EntityId.eq(entity_id))
        .one(db)
        .await?;
    Ok(row.and_then(|r| read_columns(&r, datatype)))
}

/// Every custom field value of one entity, keyed by field name.
pub async fn values_for<C: ConnectionTrait>(
    conn: &C,
    entity_type: EntityType,
    entity_id: i32,
) -> DomainResult<BTreeMap<String, AttributeValue>> {
    let rows = Value::find()
        .find_also_related(Attribute)
        .filter(eav_value::Column::EntityType.eq(entity_type.as_str()))
        .filter(eav_value::Column::EntityId.eq(entity_id))
        .all(conn)
        .await?;

    let mut values = BTreeMap::new();
    for (row, attribute) in rows {
        let Some(attribute) = attribute else {
            continue;
        };
        let datatype: AttributeType = attribute.datatype.parse()?;
        if let Some(value) = read_columns(&row, datatype) {
            values.insert(attribute.name, value);
        }
    }
    Ok(values)
}

pub(crate) async fn purge<C: ConnectionTrait>(
    conn: &C,
    entity_type: EntityType,
    ids: &[i32],
) -> DomainResult<()> {
    Value::delete_many()
        .filter(eav_value::Column::EntityType.eq(entity_type.as_str()))
        .filter(eav_value::Column::EntityId.is_in(ids.to_vec()))
        .exec(conn)
        .await?;
    Ok(())
}

fn write_columns(active: &mut eav_value::ActiveModel, datatype: AttributeType, value: &AttributeValue) {
    active.value_text = Set(None);
    active.value_float = Set(None);
    active.value_int = Set(None);
    active.value_date = Set(None);
    active.value_bool = Set(None);

    match (datatype, value) {
        (AttributeType::Date, AttributeValue::Text(s)) => active.value_date = Set(Some(s.clone())),
        (_, AttributeValue::Text(s)) => active.value_text = Set(Some(s.clone())),
        (_, AttributeValue::Float(f)) => active.value_float = Set(Some(*f)),
        (_, AttributeValue::Int(i)) => active.value_int = Set(Some(*i)),
        (_, AttributeValue::Boolean(b)) => active.value_bool = Set(Some(*b)),
    }
}

fn read_columns(row: &eav_value::Model, datatype: AttributeType) -> Option<AttributeValue> {
    match datatype {
        AttributeType::Text => row.value_text.clone().map(AttributeValue::Text),
        AttributeType::Date => row.value_date.clone().map(AttributeValue::Text),
        AttributeType::Float => row.value_float.map(AttributeValue::Float),
        AttributeType::Int => row.value_int.map(AttributeValue::Int),
        AttributeType::Boolean => row.value_bool.map(AttributeValue::Boolean),
    }
}
