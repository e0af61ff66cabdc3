use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A serviced object belonging to a client, typically a vehicle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "client_objects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub client_id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Object name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// License plate for vehicles
    pub plate_number: Option<String>,

    #[validate(length(max = 17, message = "VIN cannot exceed 17 characters"))]
    pub vin: Option<String>,

    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(has_many = "super::bid::Entity")]
    Bids,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::bid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
