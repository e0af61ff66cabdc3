use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Client entity: a company or person the business serves.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name
    #[validate(length(
        min = 1,
        max = 255,
        message = "Client name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// Registered legal name, when different from the display name
    pub legal_name: Option<String>,

    pub phone: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub address: Option<String>,

    /// Primary contact person
    pub contact_person: Option<String>,

    /// Free-form notes kept by the account manager
    pub manager_notes: Option<String>,

    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client_object::Entity")]
    ClientObjects,
    #[sea_orm(has_many = "super::bid::Entity")]
    Bids,
    #[sea_orm(has_many = "super::equipment_item::Entity")]
    EquipmentItems,
}

impl Related<super::client_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientObjects.def()
    }
}

impl Related<super::bid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl Related<super::equipment_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EquipmentItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
