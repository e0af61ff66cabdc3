use crate::{
    entities::{bid, client, client_object, equipment_item},
    errors::ServiceError,
    events::{Event, EventSender},
    workflow::StatusAction,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
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

use super::bid_types::BidTypeService;
use super::equipment_items::EquipmentItemService;

/// Service for bids (work orders).
///
/// Status moves are constrained by the bid type's transition graph; entering
/// a terminal status closes the bid and installs its assigned equipment.
#[derive(Clone)]
pub struct BidService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    bid_types: BidTypeService,
    equipment_items: EquipmentItemService,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateBidInput {
    pub bid_type_id: Uuid,
    pub client_id: Uuid,
    pub client_object_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateBidInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub amount: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub client_object_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidListQuery {
    pub bid_type_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub scheduled_from: Option<DateTime<Utc>>,
    pub scheduled_to: Option<DateTime<Utc>>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct BidListResult {
    pub bids: Vec<bid::Model>,
    pub total: u64,
}

/// One kanban column of the bid board.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BoardColumn {
    pub status: String,
    pub label: String,
    pub position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub bids: Vec<bid::Model>,
}

impl BidService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        bid_types: BidTypeService,
        equipment_items: EquipmentItemService,
        logger: Logger,
    ) -> Self {
        Self {
            db,
            event_sender,
            bid_types,
            equipment_items,
            logger,
        }
    }

    /// Next human-readable bid number: B-YYYYMM-NNNN, counter per month.
    async fn next_bid_number(&self, now: DateTime<Utc>) -> Result<String, ServiceError> {
        let month_prefix = format!("B-{}-", now.format("%Y%m"));

        let last = bid::Entity::find()
            .filter(bid::Column::Number.like(format!("{}%", month_prefix)))
            .order_by_desc(bid::Column::Number)
            .one(&*self.db)
            .await?;

        let next_seq = match last {
            Some(model) => model
                .number
                .rsplit('-')
                .next()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(0)
                .saturating_add(1),
            None => 1,
        };

        Ok(format!("{}{:04}", month_prefix, next_seq))
    }

    #[instrument(skip(self))]
    pub async fn create_bid(&self, input: CreateBidInput) -> Result<bid::Model, ServiceError> {
        input.validate()?;

        let owner = client::Entity::find_by_id(input.client_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client {} not found", input.client_id))
            })?;
        if owner.is_archived {
            return Err(ServiceError::InvalidOperation(format!(
                "Client {} is archived",
                owner.id
            )));
        }

        let kind = self.bid_types.get_bid_type(input.bid_type_id).await?;
        if !kind.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Bid type {} is inactive",
                kind.id
            )));
        }
        let workflow = crate::workflow::Workflow::from_json(&kind.statuses, &kind.transitions)?;

        if let Some(object_id) = input.client_object_id {
            let object = client_object::Entity::find_by_id(object_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Client object {} not found", object_id))
                })?;
            if object.client_id != input.client_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "Client object {} belongs to a different client",
                    object_id
                )));
            }
        }

        let now = Utc::now();
        let number = self.next_bid_number(now).await?;

        let model = bid::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(number),
            bid_type_id: Set(input.bid_type_id),
            client_id: Set(input.client_id),
            client_object_id: Set(input.client_object_id),
            status: Set(workflow.initial_status().key.clone()),
            assignee_id: Set(None),
            title: Set(input.title),
            description: Set(input.description),
            amount: Set(input.amount),
            scheduled_at: Set(input.scheduled_at),
            closed_at: Set(None),
            created_by: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "bid created";
            "bid_id" => %created.id, "number" => &created.number);
        self.event_sender.send(Event::BidCreated(created.id)).await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_bid(&self, id: Uuid) -> Result<bid::Model, ServiceError> {
        bid::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Bid {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn get_bid_by_number(&self, number: &str) -> Result<bid::Model, ServiceError> {
        bid::Entity::find()
            .filter(bid::Column::Number.eq(number))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Bid {} not found", number)))
    }

    #[instrument(skip(self))]
    pub async fn list_bids(&self, query: BidListQuery) -> Result<BidListResult, ServiceError> {
        let mut db_query = bid::Entity::find();

        if let Some(bid_type_id) = query.bid_type_id {
            db_query = db_query.filter(bid::Column::BidTypeId.eq(bid_type_id));
        }
        if let Some(client_id) = query.client_id {
            db_query = db_query.filter(bid::Column::ClientId.eq(client_id));
        }
        if let Some(status) = &query.status {
            db_query = db_query.filter(bid::Column::Status.eq(status));
        }
        if let Some(assignee_id) = query.assignee_id {
            db_query = db_query.filter(bid::Column::AssigneeId.eq(assignee_id));
        }
        if let Some(from) = query.scheduled_from {
            db_query = db_query.filter(bid::Column::ScheduledAt.gte(from));
        }
        if let Some(to) = query.scheduled_to {
            db_query = db_query.filter(bid::Column::ScheduledAt.lte(to));
        }

        let total = db_query.clone().count(&*self.db).await?;
        let bids = db_query
            .order_by_desc(bid::Column::CreatedAt)
            .limit(super::clamp_limit(query.limit))
            .offset(query.offset.unwrap_or(0))
            .all(&*self.db)
            .await?;

        Ok(BidListResult { bids, total })
    }

    /// Update mutable fields; gated on the `edit` action of the current
    /// status.
    #[instrument(skip(self))]
    pub async fn update_bid(
        &self,
        id: Uuid,
        input: UpdateBidInput,
    ) -> Result<bid::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_bid(id).await?;

        let workflow = self.bid_types.workflow_of(existing.bid_type_id).await?;
        if !workflow.allows_action(&existing.status, StatusAction::Edit) {
            return Err(ServiceError::InvalidOperation(format!(
                "Bid {} cannot be edited in status '{}'",
                id, existing.status
            )));
        }

        if let Some(Some(object_id)) = input.client_object_id {
            let object = client_object::Entity::find_by_id(object_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Client object {} not found", object_id))
                })?;
            if object.client_id != existing.client_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "Client object {} belongs to a different client",
                    object_id
                )));
            }
        }

        let mut model: bid::ActiveModel = existing.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(amount) = input.amount {
            model.amount = Set(amount);
        }
        if let Some(scheduled_at) = input.scheduled_at {
            model.scheduled_at = Set(scheduled_at);
        }
        if let Some(client_object_id) = input.client_object_id {
            model.client_object_id = Set(client_object_id);
        }
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&*self.db).await?;
        self.event_sender.send(Event::BidUpdated(updated.id)).await;
        Ok(updated)
    }

    /// Assign the bid; gated on the `assign` action of the current status.
    #[instrument(skip(self))]
    pub async fn assign_bid(
        &self,
        id: Uuid,
        assignee_id: Uuid,
    ) -> Result<bid::Model, ServiceError> {
        let existing = self.get_bid(id).await?;

        let workflow = self.bid_types.workflow_of(existing.bid_type_id).await?;
        if !workflow.allows_action(&existing.status, StatusAction::Assign) {
            return Err(ServiceError::InvalidOperation(format!(
                "Bid {} cannot be assigned in status '{}'",
                id, existing.status
            )));
        }

        let mut model: bid::ActiveModel = existing.into();
        model.assignee_id = Set(Some(assignee_id));
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&*self.db).await?;
        self.event_sender
            .send(Event::BidAssigned {
                bid_id: id,
                assignee_id,
            })
            .await;
        Ok(updated)
    }

    /// Move the bid along its type's transition graph.
    #[instrument(skip(self))]
    pub async fn update_bid_status(
        &self,
        id: Uuid,
        new_status: &str,
    ) -> Result<bid::Model, ServiceError> {
        let existing = self.get_bid(id).await?;
        let workflow = self.bid_types.workflow_of(existing.bid_type_id).await?;

        let target = workflow.status(new_status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!(
                "'{}' is not a status of this bid type",
                new_status
            ))
        })?;

        if !workflow.can_transition(&existing.status, new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "invalid status transition '{}' -> '{}'",
                existing.status, new_status
            )));
        }

        let old_status = existing.status.clone();
        let entering_terminal = target.is_terminal;
        let bid_id = existing.id;

        let mut model: bid::ActiveModel = existing.into();
        model.status = Set(new_status.to_string());
        if entering_terminal {
            model.closed_at = Set(Some(Utc::now()));
        }
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&*self.db).await?;

        self.event_sender
            .send(Event::BidStatusChanged {
                bid_id,
                old_status: old_status.clone(),
                new_status: new_status.to_string(),
                at: Utc::now(),
            })
            .await;

        if entering_terminal {
            let installed = self.equipment_items.install_bid_items(bid_id).await?;
            slog::info!(self.logger, "bid closed";
                "bid_id" => %bid_id, "items_installed" => installed);
            self.event_sender.send(Event::BidClosed(bid_id)).await;
        }

        Ok(updated)
    }

    /// Kanban board for one bid type: open bids bucketed per status.
    #[instrument(skip(self))]
    pub async fn board(&self, bid_type_id: Uuid) -> Result<Vec<BoardColumn>, ServiceError> {
        let workflow = self.bid_types.workflow_of(bid_type_id).await?;
        let view = workflow.view();

        let open_statuses: Vec<String> = view
            .statuses
            .iter()
            .filter(|s| !s.is_terminal)
            .map(|s| s.key.clone())
            .collect();

        let bids = bid::Entity::find()
            .filter(bid::Column::BidTypeId.eq(bid_type_id))
            .filter(bid::Column::Status.is_in(open_statuses))
            .order_by_desc(bid::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut columns: Vec<BoardColumn> = view
            .statuses
            .iter()
            .filter(|s| !s.is_terminal)
            .map(|s| BoardColumn {
                status: s.key.clone(),
                label: s.label.clone(),
                position: s.position,
                color: s.color.clone(),
                bids: Vec::new(),
            })
            .collect();

        for entry in bids {
            if let Some(column) = columns.iter_mut().find(|c| c.status == entry.status) {
                column.bids.push(entry);
            }
        }

        Ok(columns)
    }

    #[instrument(skip(self))]
    pub async fn bid_equipment(
        &self,
        id: Uuid,
    ) -> Result<Vec<equipment_item::Model>, ServiceError> {
        self.get_bid(id).await?;
        self.equipment_items.bid_items(id).await
    }

    /// Delete a bid; only allowed while it sits in the initial status with no
    /// equipment attached.
    #[instrument(skip(self))]
    pub async fn delete_bid(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_bid(id).await?;

        let workflow = self.bid_types.workflow_of(existing.bid_type_id).await?;
        if existing.status != workflow.initial_status().key {
            return Err(ServiceError::InvalidOperation(format!(
                "Bid {} has left the initial status and cannot be deleted",
                id
            )));
        }

        let attached = equipment_item::Entity::find()
            .filter(equipment_item::Column::BidId.eq(id))
            .count(&*self.db)
            .await?;
        if attached > 0 {
            return Err(ServiceError::Conflict(format!(
                "Bid {} has {} equipment item(s) attached",
                id, attached
            )));
        }

        bid::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        self.event_sender.send(Event::BidDeleted(id)).await;
        Ok(())
    }
}
