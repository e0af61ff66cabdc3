use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A configurable bid category carrying its own status workflow.
///
/// `statuses` and `transitions` are JSON columns holding the serialized
/// [`crate::workflow::StatusDef`] / [`crate::workflow::TransitionDef`] arrays.
/// All mutation goes through [`crate::workflow::Workflow`], which re-validates
/// the graph before it is written back.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "bid_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Bid type name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub description: Option<String>,

    /// JSON array of status definitions
    #[sea_orm(column_type = "Json")]
    pub statuses: Json,

    /// JSON array of directed transitions between status keys
    #[sea_orm(column_type = "Json")]
    pub transitions: Json,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bid::Entity")]
    Bids,
}

impl Related<super::bid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
