use crate::{
    entities::{equipment, equipment_item, equipment_item::ItemStatus, warehouse},
    errors::ServiceError,
    events::EventSender,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use slog::Logger;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Service for warehouses
#[derive(Clone)]
pub struct WarehouseService {
    db: Arc<DatabaseConnection>,
    #[allow(dead_code)]
    event_sender: EventSender,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateWarehouseInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateWarehouseInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub location: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Per-SKU in-stock count within a warehouse
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StockLine {
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub in_stock: u64,
}

impl WarehouseService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, logger: Logger) -> Self {
        Self {
            db,
            event_sender,
            logger,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_warehouse(
        &self,
        input: CreateWarehouseInput,
    ) -> Result<warehouse::Model, ServiceError> {
        input.validate()?;

        let model = warehouse::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            location: Set(input.location),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "warehouse created"; "warehouse_id" => %created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, id: Uuid) -> Result<warehouse::Model, ServiceError> {
        warehouse::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(&self) -> Result<Vec<warehouse::Model>, ServiceError> {
        Ok(warehouse::Entity::find()
            .order_by_asc(warehouse::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn update_warehouse(
        &self,
        id: Uuid,
        input: UpdateWarehouseInput,
    ) -> Result<warehouse::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_warehouse(id).await?;

        let mut model: warehouse::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(location) = input.location {
            model.location = Set(location);
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db).await?)
    }

    /// Delete a warehouse; refused while items are stored in it.
    #[instrument(skip(self))]
    pub async fn delete_warehouse(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_warehouse(id).await?;

        let stored = equipment_item::Entity::find()
            .filter(equipment_item::Column::WarehouseId.eq(id))
            .count(&*self.db)
            .await?;
        if stored > 0 {
            return Err(ServiceError::Conflict(format!(
                "Warehouse {} still stores {} item(s)",
                id, stored
            )));
        }

        warehouse::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// Per-equipment counts of in-stock items in this warehouse.
    #[instrument(skip(self))]
    pub async fn warehouse_stock(&self, id: Uuid) -> Result<Vec<StockLine>, ServiceError> {
        self.get_warehouse(id).await?;

        let items = equipment_item::Entity::find()
            .filter(equipment_item::Column::WarehouseId.eq(id))
            .filter(equipment_item::Column::Status.eq(ItemStatus::InStock.to_string()))
            .all(&*self.db)
            .await?;

        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for item in &items {
            *counts.entry(item.equipment_id).or_insert(0) += 1;
        }

        let skus = equipment::Entity::find()
            .filter(equipment::Column::Id.is_in(counts.keys().copied().collect::<Vec<_>>()))
            .all(&*self.db)
            .await?;

        let mut lines: Vec<StockLine> = skus
            .into_iter()
            .map(|sku| StockLine {
                in_stock: counts.get(&sku.id).copied().unwrap_or(0),
                equipment_id: sku.id,
                equipment_name: sku.name,
            })
            .collect();
        lines.sort_by(|a, b| a.equipment_name.cmp(&b.equipment_name));

        Ok(lines)
    }
}
