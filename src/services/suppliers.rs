use crate::{
    entities::{equipment_item, supplier},
    errors::ServiceError,
    events::EventSender,
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

/// Service for suppliers
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
    #[allow(dead_code)]
    event_sender: EventSender,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::services::double_option")]
    pub notes: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, logger: Logger) -> Self {
        Self {
            db,
            event_sender,
            logger,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_supplier(
        &self,
        input: CreateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        input.validate()?;

        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            contact_person: Set(input.contact_person),
            phone: Set(input.phone),
            email: Set(input.email),
            notes: Set(input.notes),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        slog::info!(self.logger, "supplier created"; "supplier_id" => %created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, id: Uuid) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find()
            .order_by_asc(supplier::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn update_supplier(
        &self,
        id: Uuid,
        input: UpdateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_supplier(id).await?;

        let mut model: supplier::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(contact_person) = input.contact_person {
            model.contact_person = Set(contact_person);
        }
        if let Some(phone) = input.phone {
            model.phone = Set(phone);
        }
        if let Some(email) = input.email {
            model.email = Set(email);
        }
        if let Some(notes) = input.notes {
            model.notes = Set(notes);
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db).await?)
    }

    /// Delete a supplier; refused while items reference it.
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_supplier(id).await?;

        let referenced = equipment_item::Entity::find()
            .filter(equipment_item::Column::SupplierId.eq(id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            return Err(ServiceError::Conflict(format!(
                "Supplier {} is referenced by {} item(s)",
                id, referenced
            )));
        }

        supplier::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// Items sourced from this supplier.
    #[instrument(skip(self))]
    pub async fn supplier_items(
        &self,
        id: Uuid,
    ) -> Result<Vec<equipment_item::Model>, ServiceError> {
        self.get_supplier(id).await?;
        let items = equipment_item::Entity::find()
            .filter(equipment_item::Column::SupplierId.eq(id))
            .order_by_desc(equipment_item::Column::ReceivedAt)
            .all(&*self.db)
            .await?;
        Ok(items)
    }
}
