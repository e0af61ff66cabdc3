use crate::{
    entities::{equipment, equipment_item},
    errors::ServiceError,
    events::EventSender,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Service for the equipment SKU catalog
#[derive(Clone)]
pub struct EquipmentService {
    db: Arc<DatabaseConnection>,
    #[allow(dead_code)]
    event_sender: EventSender,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateEquipmentInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub unit_price: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateEquipmentInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub manufacturer: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub unit_price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentListQuery {
    pub search: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct EquipmentListResult {
    pub equipment: Vec<equipment::Model>,
    pub total: u64,
}

impl EquipmentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, logger: Logger) -> Self {
        Self {
            db,
            event_sender,
            logger,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_equipment(
        &self,
        input: CreateEquipmentInput,
    ) -> Result<equipment::Model, ServiceError> {
        input.validate()?;

        let model = equipment::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            model: Set(input.model),
            manufacturer: Set(input.manufacturer),
            unit_price: Set(input.unit_price),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "equipment created"; "equipment_id" => %created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_equipment(&self, id: Uuid) -> Result<equipment::Model, ServiceError> {
        equipment::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Equipment {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update_equipment(
        &self,
        id: Uuid,
        input: UpdateEquipmentInput,
    ) -> Result<equipment::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_equipment(id).await?;

        let mut model: equipment::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(sku_model) = input.model {
            model.model = Set(sku_model);
        }
        if let Some(manufacturer) = input.manufacturer {
            model.manufacturer = Set(manufacturer);
        }
        if let Some(unit_price) = input.unit_price {
            model.unit_price = Set(unit_price);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db).await?)
    }

    /// Delete a SKU; refused while physical items of it exist.
    #[instrument(skip(self))]
    pub async fn delete_equipment(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_equipment(id).await?;

        let item_count = equipment_item::Entity::find()
            .filter(equipment_item::Column::EquipmentId.eq(id))
            .count(&*self.db)
            .await?;
        if item_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Equipment {} has {} tracked item(s)",
                id, item_count
            )));
        }

        equipment::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_equipment(
        &self,
        query: EquipmentListQuery,
    ) -> Result<EquipmentListResult, ServiceError> {
        let mut db_query = equipment::Entity::find();

        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search.trim());
            db_query = db_query.filter(
                Condition::any()
                    .add(equipment::Column::Name.like(&pattern))
                    .add(equipment::Column::Model.like(&pattern)),
            );
        }
        if let Some(active) = query.active {
            db_query = db_query.filter(equipment::Column::IsActive.eq(active));
        }

        let total = db_query.clone().count(&*self.db).await?;
        let equipment = db_query
            .order_by_asc(equipment::Column::Name)
            .limit(super::clamp_limit(query.limit))
            .offset(query.offset.unwrap_or(0))
            .all(&*self.db)
            .await?;

        Ok(EquipmentListResult { equipment, total })
    }
}
