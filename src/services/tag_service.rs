//! Tag Service - free-form tags attached to any taggable entity

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{entity_exists, fetch, now};
use crate::domain::validation::{optional, required};
use crate::domain::{DomainError, DomainResult, EntityType};
use crate::models::custom_tag::{self, Entity as CustomTag};
use crate::models::tagged_item::{self, Entity as TaggedItem};

pub async fn create_tag(
    db: &DatabaseConnection,
    tag: &str,
    description: Option<String>,
) -> DomainResult<custom_tag::Model> {
    let tag = required("tag", tag)?;
    ensure_tag_free(db, &tag, None).await?;

    let model = custom_tag::ActiveModel {
        tag: Set(tag),
        description: Set(optional(description)),
        created_at: Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Created tag '{}'", model.tag);
    Ok(model)
}

pub async fn update_tag(
    db: &DatabaseConnection,
    id: i32,
    tag: &str,
    description: Option<String>,
) -> DomainResult<custom_tag::Model> {
    let tag = required("tag", tag)?;
    let existing = fetch::<CustomTag, _>(db, id, "tag").await?;
    ensure_tag_free(db, &tag, Some(id)).await?;

    let mut active: custom_tag::ActiveModel = existing.into();
    active.tag = Set(tag);
    active.description = Set(optional(description));
    Ok(active.update(db).await?)
}

async fn ensure_tag_free(db: &DatabaseConnection, tag: &str, except: Option<i32>) -> DomainResult<()> {
    let mut query = CustomTag::find().filter(custom_tag::Column::Tag.eq(tag));
    if let Some(id) = except {
        query = query.filter(custom_tag::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(DomainError::duplicate(
            "custom_tags.tag",
            format!("tag '{}' already exists", tag),
        ));
    }
    Ok(())
}

pub async fn list_tags(db: &DatabaseConnection) -> DomainResult<Vec<custom_tag::Model>> {
    Ok(CustomTag::find()
        .order_by_asc(custom_tag::Column::Tag)
        .all(db)
        .await?)
}

/// Delete a tag and all of its assignments.
pub async fn delete_tag(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let existing = fetch::<CustomTag, _>(db, id, "tag").await?;
    CustomTag::delete_by_id(id).exec(db).await?;
    tracing::info!("Deleted tag '{}'", existing.tag);
    Ok(())
}

/// Attach a tag to an entity. Tagging twice is a no-op.
pub async fn tag_entity(
    db: &DatabaseConnection,
    tag_id: i32,
    entity_type: EntityType,
    entity_id: i32,
) -> DomainResult<()> {
    let txn = db.begin().await?;
    fetch::<CustomTag, _>(&txn, tag_id, "tag").await?;
    if !entity_exists(&txn, entity_type, entity_id).await? {
        return Err(DomainError::validation(format!(
            "{} {} does not exist",
            entity_type, entity_id
        )));
    }

    let key = (tag_id, entity_type.as_str().to_string(), entity_id);
    if TaggedItem::find_by_id(key).one(&txn).await?.is_none() {
        tagged_item::ActiveModel {
            tag_id: Set(tag_id),
            entity_type: Set(entity_type.as_str().to_string()),
            entity_id: Set(entity_id),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(())
}

pub async fn untag_entity(
    db: &DatabaseConnection,
    tag_id: i32,
    entity_type: EntityType,
    entity_id: i32,
) -> DomainResult<()> {
    TaggedItem::delete_by_id((tag_id, entity_type.as_str().to_string(), entity_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Tags attached to one entity, by name.
pub async fn tags_for<C: ConnectionTrait>(
    conn: &C,
    entity_type: EntityType,
    entity_id: i32,
) -> DomainResult<Vec<custom_tag::Model>> {
    let tag_ids: Vec<i32> = TaggedItem::find()
        .select_only()
        .column(tagged_item::Column::TagId)
        .filter(tagged_item::Column::EntityType.eq(entity_type.as_str()))
        .filter(tagged_item::Column::EntityId.eq(entity_id))
        .into_tuple()
        .all(conn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(CustomTag::find()
        .filter(custom_tag::Column::Id.is_in(tag_ids))
        .order_by_asc(custom_tag::Column::Tag)
        .all(conn)
        .await?)
}

/// Ids of the entities of one type carrying a tag.
pub async fn entities_tagged(
    db: &DatabaseConnection,
    tag_id: i32,
    entity_type: EntityType,
) -> DomainResult<Vec<i32>> {
    Ok(TaggedItem::find()
        .select_only()
        .column(tagged_item::Column::EntityId)
        .filter(tagged_item::Column::TagId.eq(tag_id))
        .filter(tagged_item::Column::EntityType.eq(entity_type.as_str()))
        .order_by_asc(tagged_item::Column::EntityId)
        .into_tuple()
        .all(db)
        .await?)
}

pub(crate) async fn purge<C: ConnectionTrait>(
    conn: &C,
    entity_type: EntityType,
    ids: &[i32],
) -> DomainResult<()> {
    TaggedItem::delete_many()
        .filter(tagged_item::Column::EntityType.eq(entity_type.as_str()))
        .filter(tagged_item::Column::EntityId.is_in(ids.to_vec()))
        .exec(conn)
        .await?;
    Ok(())
}
