use crate::{
    entities::{bid, client, client_object, equipment_item},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
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

/// Service for managing clients
#[derive(Clone)]
pub struct ClientService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateClientInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub legal_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub manager_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateClientInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub legal_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub manager_notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub archived: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ClientListResult {
    pub clients: Vec<client::Model>,
    pub total: u64,
}

impl ClientService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, logger: Logger) -> Self {
        Self {
            db,
            event_sender,
            logger,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_client(
        &self,
        input: CreateClientInput,
    ) -> Result<client::Model, ServiceError> {
        input.validate()?;

        let model = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            legal_name: Set(input.legal_name),
            phone: Set(input.phone),
            email: Set(input.email),
            address: Set(input.address),
            contact_person: Set(input.contact_person),
            manager_notes: Set(input.manager_notes),
            is_archived: Set(false),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "client created"; "client_id" => %created.id);
        self.event_sender
            .send(Event::ClientCreated(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_client(&self, id: Uuid) -> Result<client::Model, ServiceError> {
        client::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update_client(
        &self,
        id: Uuid,
        input: UpdateClientInput,
    ) -> Result<client::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_client(id).await?;

        let mut model: client::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(legal_name) = input.legal_name {
            model.legal_name = Set(legal_name);
        }
        if let Some(phone) = input.phone {
            model.phone = Set(phone);
        }
        if let Some(email) = input.email {
            model.email = Set(email);
        }
        if let Some(address) = input.address {
            model.address = Set(address);
        }
        if let Some(contact_person) = input.contact_person {
            model.contact_person = Set(contact_person);
        }
        if let Some(manager_notes) = input.manager_notes {
            model.manager_notes = Set(manager_notes);
        }
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&*self.db).await?;
        self.event_sender
            .send(Event::ClientUpdated(updated.id))
            .await;
        Ok(updated)
    }

    /// Soft-archive; already-archived clients pass through unchanged.
    #[instrument(skip(self))]
    pub async fn archive_client(&self, id: Uuid) -> Result<client::Model, ServiceError> {
        let existing = self.get_client(id).await?;
        if existing.is_archived {
            return Ok(existing);
        }

        let mut model: client::ActiveModel = existing.into();
        model.is_archived = Set(true);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&*self.db).await?;

        self.event_sender
            .send(Event::ClientArchived(updated.id))
            .await;
        Ok(updated)
    }

    /// Hard delete. Refused while the client still has bids or assigned
    /// equipment items.
    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_client(id).await?;

        let bid_count = bid::Entity::find()
            .filter(bid::Column::ClientId.eq(id))
            .count(&*self.db)
            .await?;
        if bid_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Client {} still has {} bid(s)",
                id, bid_count
            )));
        }

        let item_count = equipment_item::Entity::find()
            .filter(equipment_item::Column::ClientId.eq(id))
            .count(&*self.db)
            .await?;
        if item_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Client {} still has {} assigned equipment item(s)",
                id, item_count
            )));
        }

        // Objects carry no history of their own; they go with the client
        client_object::Entity::delete_many()
            .filter(client_object::Column::ClientId.eq(id))
            .exec(&*self.db)
            .await?;
        client::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;

        slog::info!(self.logger, "client deleted"; "client_id" => %id);
        self.event_sender.send(Event::ClientDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_clients(
        &self,
        query: ClientListQuery,
    ) -> Result<ClientListResult, ServiceError> {
        let mut db_query = client::Entity::find();

        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search.trim());
            db_query = db_query.filter(
                Condition::any()
                    .add(client::Column::Name.like(&pattern))
                    .add(client::Column::Phone.like(&pattern))
                    .add(client::Column::Email.like(&pattern)),
            );
        }
        if let Some(archived) = query.archived {
            db_query = db_query.filter(client::Column::IsArchived.eq(archived));
        }

        let total = db_query.clone().count(&*self.db).await?;
        let clients = db_query
            .order_by_asc(client::Column::Name)
            .limit(super::clamp_limit(query.limit))
            .offset(query.offset.unwrap_or(0))
            .all(&*self.db)
            .await?;

        Ok(ClientListResult { clients, total })
    }

    /// The client's bids, newest first.
    #[instrument(skip(self))]
    pub async fn client_bids(
        &self,
        id: Uuid,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<bid::Model>, ServiceError> {
        self.get_client(id).await?;
        let bids = bid::Entity::find()
            .filter(bid::Column::ClientId.eq(id))
            .order_by_desc(bid::Column::CreatedAt)
            .limit(super::clamp_limit(limit))
            .offset(offset.unwrap_or(0))
            .all(&*self.db)
            .await?;
        Ok(bids)
    }

    /// Equipment items currently assigned to the client.
    #[instrument(skip(self))]
    pub async fn client_equipment(
        &self,
        id: Uuid,
    ) -> Result<Vec<equipment_item::Model>, ServiceError> {
        self.get_client(id).await?;
        let items = equipment_item::Entity::find()
            .filter(equipment_item::Column::ClientId.eq(id))
            .order_by_desc(equipment_item::Column::AssignedAt)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn client_objects(
        &self,
        id: Uuid,
    ) -> Result<Vec<client_object::Model>, ServiceError> {
        self.get_client(id).await?;
        let objects = client_object::Entity::find()
            .filter(client_object::Column::ClientId.eq(id))
            .order_by_asc(client_object::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(objects)
    }
}
