use crate::{
    entities::{bid, client, client_object},
    errors::ServiceError,
    events::EventSender,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde::Deserialize;
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Service for client objects (vehicles)
#[derive(Clone)]
pub struct ClientObjectService {
    db: Arc<DatabaseConnection>,
    #[allow(dead_code)]
    event_sender: EventSender,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateClientObjectInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub plate_number: Option<String>,
    #[validate(length(max = 17))]
    pub vin: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateClientObjectInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub plate_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub vin: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub brand: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub notes: Option<Option<String>>,
}

impl ClientObjectService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, logger: Logger) -> Self {
        Self {
            db,
            event_sender,
            logger,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_object(
        &self,
        client_id: Uuid,
        input: CreateClientObjectInput,
    ) -> Result<client_object::Model, ServiceError> {
        input.validate()?;

        client::Entity::find_by_id(client_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", client_id)))?;

        let model = client_object::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(client_id),
            name: Set(input.name),
            plate_number: Set(input.plate_number),
            vin: Set(input.vin),
            brand: Set(input.brand),
            model: Set(input.model),
            year: Set(input.year),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "client object created";
            "object_id" => %created.id, "client_id" => %client_id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_object(&self, id: Uuid) -> Result<client_object::Model, ServiceError> {
        client_object::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Client object {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update_object(
        &self,
        id: Uuid,
        input: UpdateClientObjectInput,
    ) -> Result<client_object::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_object(id).await?;

        let mut model: client_object::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(plate_number) = input.plate_number {
            model.plate_number = Set(plate_number);
        }
        if let Some(vin) = input.vin {
            model.vin = Set(vin);
        }
        if let Some(brand) = input.brand {
            model.brand = Set(brand);
        }
        if let Some(object_model) = input.model {
            model.model = Set(object_model);
        }
        if let Some(year) = input.year {
            model.year = Set(year);
        }
        if let Some(notes) = input.notes {
            model.notes = Set(notes);
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db).await?)
    }

    /// Delete; refused while a bid references the object.
    #[instrument(skip(self))]
    pub async fn delete_object(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_object(id).await?;

        let referencing = bid::Entity::find()
            .filter(bid::Column::ClientObjectId.eq(id))
            .count(&*self.db)
            .await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Client object {} is referenced by {} bid(s)",
                id, referencing
            )));
        }

        client_object::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}
