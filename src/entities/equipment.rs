use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Equipment SKU in the catalog (e.g. a tracker model).
/// Physical units live in [`super::equipment_item`].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Equipment name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub model: Option<String>,
    pub manufacturer: Option<String>,

    /// List price per unit
    pub unit_price: Option<Decimal>,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::equipment_item::Entity")]
    EquipmentItems,
}

impl Related<super::equipment_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EquipmentItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
