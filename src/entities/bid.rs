use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Bid (work order) entity.
///
/// `status` always holds a status key of the bid type's current workflow.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-readable number, e.g. B-202608-0042
    #[validate(length(
        min = 1,
        max = 50,
        message = "Bid number must be between 1 and 50 characters"
    ))]
    pub number: String,

    pub bid_type_id: Uuid,
    pub client_id: Uuid,
    pub client_object_id: Option<Uuid>,

    /// Current status key within the bid type's workflow
    pub status: String,

    pub assignee_id: Option<Uuid>,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bid_type::Entity",
        from = "Column::BidTypeId",
        to = "super::bid_type::Column::Id"
    )]
    BidType,
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::client_object::Entity",
        from = "Column::ClientObjectId",
        to = "super::client_object::Column::Id"
    )]
    ClientObject,
    #[sea_orm(has_many = "super::equipment_item::Entity")]
    EquipmentItems,
}

impl Related<super::bid_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BidType.def()
    }
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::client_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientObject.def()
    }
}

impl Related<super::equipment_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EquipmentItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
