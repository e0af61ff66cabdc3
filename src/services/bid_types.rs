use crate::{
    entities::{bid, bid_type},
    errors::ServiceError,
    events::{Event, EventSender},
    workflow::{StatusAction, StatusDef, Workflow, WorkflowView},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Service for bid types and their status workflows.
///
/// Workflow mutations follow one shape: load the row, parse the JSON columns
/// into a [`Workflow`], apply the in-memory change, re-validate, write both
/// columns back.
#[derive(Clone)]
pub struct BidTypeService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateBidTypeInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateBidTypeInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct AddStatusInput {
    pub key: String,
    pub label: String,
    /// Appended after the last status when omitted
    pub position: Option<u32>,
    pub color: Option<String>,
    #[serde(default)]
    pub actions: Vec<StatusAction>,
    #[serde(default)]
    pub is_terminal: bool,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusInput {
    pub label: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub color: Option<Option<String>>,
    pub actions: Option<Vec<StatusAction>>,
    pub is_terminal: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct TransitionInput {
    pub from: String,
    pub to: String,
}

impl BidTypeService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, logger: Logger) -> Self {
        Self {
            db,
            event_sender,
            logger,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_bid_type(
        &self,
        input: CreateBidTypeInput,
    ) -> Result<bid_type::Model, ServiceError> {
        input.validate()?;

        let (statuses, transitions) = Workflow::default_workflow().to_json();
        let model = bid_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            statuses: Set(statuses),
            transitions: Set(transitions),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "bid type created"; "bid_type_id" => %created.id);
        self.event_sender
            .send(Event::BidTypeCreated(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_bid_type(&self, id: Uuid) -> Result<bid_type::Model, ServiceError> {
        bid_type::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Bid type {} not found", id)))
    }

    /// Parse the stored workflow of a bid type.
    pub async fn workflow_of(&self, id: Uuid) -> Result<Workflow, ServiceError> {
        let model = self.get_bid_type(id).await?;
        Ok(Workflow::from_json(&model.statuses, &model.transitions)?)
    }

    #[instrument(skip(self))]
    pub async fn workflow_view(&self, id: Uuid) -> Result<WorkflowView, ServiceError> {
        Ok(self.workflow_of(id).await?.view())
    }

    #[instrument(skip(self))]
    pub async fn list_bid_types(&self) -> Result<Vec<bid_type::Model>, ServiceError> {
        Ok(bid_type::Entity::find()
            .order_by_asc(bid_type::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn update_bid_type(
        &self,
        id: Uuid,
        input: UpdateBidTypeInput,
    ) -> Result<bid_type::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_bid_type(id).await?;

        let mut model: bid_type::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
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

    /// Delete a bid type; refused while bids of the type exist.
    #[instrument(skip(self))]
    pub async fn delete_bid_type(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_bid_type(id).await?;

        let in_use = bid::Entity::find()
            .filter(bid::Column::BidTypeId.eq(id))
            .count(&*self.db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(format!(
                "Bid type {} is used by {} bid(s)",
                id, in_use
            )));
        }

        bid_type::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn save_workflow(
        &self,
        model: bid_type::Model,
        workflow: Workflow,
    ) -> Result<bid_type::Model, ServiceError> {
        let id = model.id;
        let (statuses, transitions) = workflow.to_json();
        let mut active: bid_type::ActiveModel = model.into();
        active.statuses = Set(statuses);
        active.transitions = Set(transitions);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send(Event::BidTypeWorkflowChanged(id))
            .await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn add_status(
        &self,
        id: Uuid,
        input: AddStatusInput,
    ) -> Result<bid_type::Model, ServiceError> {
        let model = self.get_bid_type(id).await?;
        let mut workflow = Workflow::from_json(&model.statuses, &model.transitions)?;

        workflow.add_status(StatusDef {
            key: input.key,
            label: input.label,
            position: input.position.unwrap_or(u32::MAX),
            color: input.color,
            actions: input.actions,
            is_terminal: input.is_terminal,
        })?;

        self.save_workflow(model, workflow).await
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status_key: &str,
        input: UpdateStatusInput,
    ) -> Result<bid_type::Model, ServiceError> {
        let model = self.get_bid_type(id).await?;
        let mut workflow = Workflow::from_json(&model.statuses, &model.transitions)?;

        workflow.update_status(
            status_key,
            input.label,
            input.color,
            input.actions,
            input.is_terminal,
        )?;

        self.save_workflow(model, workflow).await
    }

    /// Remove a status; refused while bids of this type sit in it.
    #[instrument(skip(self))]
    pub async fn remove_status(
        &self,
        id: Uuid,
        status_key: &str,
    ) -> Result<bid_type::Model, ServiceError> {
        let model = self.get_bid_type(id).await?;
        let mut workflow = Workflow::from_json(&model.statuses, &model.transitions)?;

        let occupied = bid::Entity::find()
            .filter(bid::Column::BidTypeId.eq(id))
            .filter(bid::Column::Status.eq(status_key))
            .count(&*self.db)
            .await?;
        if occupied > 0 {
            return Err(ServiceError::Conflict(format!(
                "{} bid(s) currently sit in status '{}'",
                occupied, status_key
            )));
        }

        workflow.remove_status(status_key)?;
        self.save_workflow(model, workflow).await
    }

    #[instrument(skip(self))]
    pub async fn reorder_statuses(
        &self,
        id: Uuid,
        keys: Vec<String>,
    ) -> Result<bid_type::Model, ServiceError> {
        let model = self.get_bid_type(id).await?;
        let mut workflow = Workflow::from_json(&model.statuses, &model.transitions)?;
        workflow.reorder(&keys)?;
        self.save_workflow(model, workflow).await
    }

    #[instrument(skip(self))]
    pub async fn add_transition(
        &self,
        id: Uuid,
        input: TransitionInput,
    ) -> Result<bid_type::Model, ServiceError> {
        let model = self.get_bid_type(id).await?;
        let mut workflow = Workflow::from_json(&model.statuses, &model.transitions)?;
        workflow.add_transition(&input.from, &input.to)?;
        self.save_workflow(model, workflow).await
    }

    #[instrument(skip(self))]
    pub async fn remove_transition(
        &self,
        id: Uuid,
        input: TransitionInput,
    ) -> Result<bid_type::Model, ServiceError> {
        let model = self.get_bid_type(id).await?;
        let mut workflow = Workflow::from_json(&model.statuses, &model.transitions)?;
        workflow.remove_transition(&input.from, &input.to)?;
        self.save_workflow(model, workflow).await
    }
}
