use crate::{
    entities::{
        bid, client, equipment, equipment_item,
        equipment_item::ItemStatus,
        warehouse,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Service for serialized equipment inventory: receiving units, assigning
/// them to clients and bids, and tracking their lifecycle.
#[derive(Clone)]
pub struct EquipmentItemService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    logger: Logger,
}

/// Normalize an IMEI for storage and comparison: trimmed, uppercased.
pub fn normalize_imei(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct ReceiveItemInput {
    pub equipment_id: Uuid,
    pub warehouse_id: Uuid,
    #[validate(length(min = 8, max = 20))]
    pub imei: Option<String>,
    pub serial_number: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateItemInput {
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub imei: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub serial_number: Option<Option<String>>,
    pub warehouse_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct AssignItemInput {
    pub client_id: Uuid,
    pub bid_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemListQuery {
    pub equipment_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<ItemStatus>,
    pub imei: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ItemListResult {
    pub items: Vec<equipment_item::Model>,
    pub total: u64,
}

impl EquipmentItemService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, logger: Logger) -> Self {
        Self {
            db,
            event_sender,
            logger,
        }
    }

    async fn ensure_imei_free(
        &self,
        imei: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = equipment_item::Entity::find()
            .filter(equipment_item::Column::Imei.eq(imei));
        if let Some(id) = exclude {
            query = query.filter(equipment_item::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "An equipment item with IMEI {} already exists",
                imei
            )));
        }
        Ok(())
    }

    /// Receive a physical unit into a warehouse.
    #[instrument(skip(self))]
    pub async fn receive_item(
        &self,
        input: ReceiveItemInput,
    ) -> Result<equipment_item::Model, ServiceError> {
        input.validate()?;

        equipment::Entity::find_by_id(input.equipment_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Equipment {} not found", input.equipment_id))
            })?;
        warehouse::Entity::find_by_id(input.warehouse_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Warehouse {} not found", input.warehouse_id))
            })?;

        let imei = input.imei.as_deref().map(normalize_imei);
        if let Some(ref imei) = imei {
            self.ensure_imei_free(imei, None).await?;
        }

        let now = Utc::now();
        let model = equipment_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            equipment_id: Set(input.equipment_id),
            imei: Set(imei),
            serial_number: Set(input.serial_number),
            status: Set(ItemStatus::InStock.to_string()),
            warehouse_id: Set(Some(input.warehouse_id)),
            supplier_id: Set(input.supplier_id),
            client_id: Set(None),
            bid_id: Set(None),
            received_at: Set(now),
            assigned_at: Set(None),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "equipment item received";
            "item_id" => %created.id, "warehouse_id" => %input.warehouse_id);
        self.event_sender
            .send(Event::EquipmentItemReceived {
                item_id: created.id,
                warehouse_id: input.warehouse_id,
            })
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: Uuid) -> Result<equipment_item::Model, ServiceError> {
        equipment_item::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Equipment item {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self, query: ItemListQuery) -> Result<ItemListResult, ServiceError> {
        let mut db_query = equipment_item::Entity::find();

        if let Some(equipment_id) = query.equipment_id {
            db_query = db_query.filter(equipment_item::Column::EquipmentId.eq(equipment_id));
        }
        if let Some(warehouse_id) = query.warehouse_id {
            db_query = db_query.filter(equipment_item::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(supplier_id) = query.supplier_id {
            db_query = db_query.filter(equipment_item::Column::SupplierId.eq(supplier_id));
        }
        if let Some(client_id) = query.client_id {
            db_query = db_query.filter(equipment_item::Column::ClientId.eq(client_id));
        }
        if let Some(status) = query.status {
            db_query = db_query.filter(equipment_item::Column::Status.eq(status.to_string()));
        }
        if let Some(imei) = &query.imei {
            db_query = db_query.filter(equipment_item::Column::Imei.eq(normalize_imei(imei)));
        }

        let total = db_query.clone().count(&*self.db).await?;
        let items = db_query
            .order_by_desc(equipment_item::Column::ReceivedAt)
            .limit(super::clamp_limit(query.limit))
            .offset(query.offset.unwrap_or(0))
            .all(&*self.db)
            .await?;

        Ok(ItemListResult { items, total })
    }

    /// Update identifying fields. IMEI, serial and warehouse may only change
    /// while the item is in stock; notes are always editable.
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        id: Uuid,
        input: UpdateItemInput,
    ) -> Result<equipment_item::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_item(id).await?;
        let status = existing
            .status()
            .map_err(|_| ServiceError::InternalError(format!("bad item status: {}", existing.status)))?;

        let touches_identity =
            input.imei.is_some() || input.serial_number.is_some() || input.warehouse_id.is_some();
        if touches_identity && status != ItemStatus::InStock {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is {}; IMEI, serial and warehouse can only change while in stock",
                id, status
            )));
        }

        if let Some(warehouse_id) = input.warehouse_id {
            warehouse::Entity::find_by_id(warehouse_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Warehouse {} not found", warehouse_id))
                })?;
        }

        let normalized_imei = match &input.imei {
            Some(Some(raw)) => {
                let imei = normalize_imei(raw);
                if imei.len() < 8 || imei.len() > 20 {
                    return Err(ServiceError::ValidationError(
                        "IMEI must be between 8 and 20 characters".into(),
                    ));
                }
                self.ensure_imei_free(&imei, Some(id)).await?;
                Some(Some(imei))
            }
            Some(None) => Some(None),
            None => None,
        };

        let mut model: equipment_item::ActiveModel = existing.into();
        if let Some(imei) = normalized_imei {
            model.imei = Set(imei);
        }
        if let Some(serial) = input.serial_number {
            model.serial_number = Set(serial);
        }
        if let Some(warehouse_id) = input.warehouse_id {
            model.warehouse_id = Set(Some(warehouse_id));
        }
        if let Some(notes) = input.notes {
            model.notes = Set(notes);
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db).await?)
    }

    /// Delete a unit; only stock or written-off items can go.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_item(id).await?;
        let status = existing
            .status()
            .map_err(|_| ServiceError::InternalError(format!("bad item status: {}", existing.status)))?;

        if !matches!(status, ItemStatus::InStock | ItemStatus::WrittenOff) {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is {}; only in-stock or written-off items can be deleted",
                id, status
            )));
        }

        equipment_item::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// Assign an in-stock unit to a client, optionally pinned to one of the
    /// client's bids.
    #[instrument(skip(self))]
    pub async fn assign_item(
        &self,
        id: Uuid,
        input: AssignItemInput,
    ) -> Result<equipment_item::Model, ServiceError> {
        let existing = self.get_item(id).await?;
        let status = existing
            .status()
            .map_err(|_| ServiceError::InternalError(format!("bad item status: {}", existing.status)))?;

        if status != ItemStatus::InStock {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is {}; only in-stock items can be assigned",
                id, status
            )));
        }

        let assignee = client::Entity::find_by_id(input.client_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client {} not found", input.client_id))
            })?;
        if assignee.is_archived {
            return Err(ServiceError::InvalidOperation(format!(
                "Client {} is archived",
                assignee.id
            )));
        }

        if let Some(bid_id) = input.bid_id {
            let linked_bid = bid::Entity::find_by_id(bid_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Bid {} not found", bid_id)))?;
            if linked_bid.client_id != input.client_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "Bid {} belongs to a different client",
                    bid_id
                )));
            }
        }

        let mut model: equipment_item::ActiveModel = existing.into();
        model.status = Set(ItemStatus::Assigned.to_string());
        model.client_id = Set(Some(input.client_id));
        model.bid_id = Set(input.bid_id);
        model.warehouse_id = Set(None);
        model.assigned_at = Set(Some(Utc::now()));
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&*self.db).await?;
        slog::info!(self.logger, "equipment item assigned";
            "item_id" => %id, "client_id" => %input.client_id);
        self.event_sender
            .send(Event::EquipmentItemAssigned {
                item_id: id,
                client_id: input.client_id,
                bid_id: input.bid_id,
            })
            .await;
        Ok(updated)
    }

    /// Mark an assigned unit as installed on the client's object.
    #[instrument(skip(self))]
    pub async fn install_item(&self, id: Uuid) -> Result<equipment_item::Model, ServiceError> {
        let existing = self.get_item(id).await?;
        let status = existing
            .status()
            .map_err(|_| ServiceError::InternalError(format!("bad item status: {}", existing.status)))?;

        if status != ItemStatus::Assigned {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is {}; only assigned items can be installed",
                id, status
            )));
        }

        let mut model: equipment_item::ActiveModel = existing.into();
        model.status = Set(ItemStatus::Installed.to_string());
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&*self.db).await?;
        self.event_sender
            .send(Event::EquipmentItemInstalled(id))
            .await;
        Ok(updated)
    }

    /// Return an assigned or installed unit to stock.
    #[instrument(skip(self))]
    pub async fn release_item(
        &self,
        id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<equipment_item::Model, ServiceError> {
        let existing = self.get_item(id).await?;
        let status = existing
            .status()
            .map_err(|_| ServiceError::InternalError(format!("bad item status: {}", existing.status)))?;

        if !matches!(status, ItemStatus::Assigned | ItemStatus::Installed) {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is {}; only assigned or installed items can be released",
                id, status
            )));
        }

        warehouse::Entity::find_by_id(warehouse_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Warehouse {} not found", warehouse_id))
            })?;

        let mut model: equipment_item::ActiveModel = existing.into();
        model.status = Set(ItemStatus::InStock.to_string());
        model.warehouse_id = Set(Some(warehouse_id));
        model.client_id = Set(None);
        model.bid_id = Set(None);
        model.assigned_at = Set(None);
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&*self.db).await?;
        self.event_sender
            .send(Event::EquipmentItemReleased {
                item_id: id,
                warehouse_id,
            })
            .await;
        Ok(updated)
    }

    /// Write off a unit. Terminal; linkage to clients and warehouses is cut.
    #[instrument(skip(self))]
    pub async fn write_off_item(&self, id: Uuid) -> Result<equipment_item::Model, ServiceError> {
        let existing = self.get_item(id).await?;
        let status = existing
            .status()
            .map_err(|_| ServiceError::InternalError(format!("bad item status: {}", existing.status)))?;

        if status.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is already written off",
                id
            )));
        }

        let mut model: equipment_item::ActiveModel = existing.into();
        model.status = Set(ItemStatus::WrittenOff.to_string());
        model.warehouse_id = Set(None);
        model.client_id = Set(None);
        model.bid_id = Set(None);
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&*self.db).await?;
        slog::info!(self.logger, "equipment item written off"; "item_id" => %id);
        self.event_sender
            .send(Event::EquipmentItemWrittenOff(id))
            .await;
        Ok(updated)
    }

    /// Items attached to a bid.
    #[instrument(skip(self))]
    pub async fn bid_items(&self, bid_id: Uuid) -> Result<Vec<equipment_item::Model>, ServiceError> {
        let items = equipment_item::Entity::find()
            .filter(equipment_item::Column::BidId.eq(bid_id))
            .order_by_desc(equipment_item::Column::AssignedAt)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    /// Closing a bid installs everything still merely assigned to it.
    #[instrument(skip(self))]
    pub async fn install_bid_items(&self, bid_id: Uuid) -> Result<u64, ServiceError> {
        let pending = equipment_item::Entity::find()
            .filter(equipment_item::Column::BidId.eq(bid_id))
            .filter(equipment_item::Column::Status.eq(ItemStatus::Assigned.to_string()))
            .all(&*self.db)
            .await?;

        let count = pending.len() as u64;
        for item in pending {
            let item_id = item.id;
            let mut model: equipment_item::ActiveModel = item.into();
            model.status = Set(ItemStatus::Installed.to_string());
            model.updated_at = Set(Some(Utc::now()));
            model.update(&*self.db).await?;
            self.event_sender
                .send(Event::EquipmentItemInstalled(item_id))
                .await;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imei_normalization() {
        assert_eq!(normalize_imei("  35a91107  "), "35A91107");
        assert_eq!(normalize_imei("490154203237518"), "490154203237518");
    }
}
