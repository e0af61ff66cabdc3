use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a physical equipment unit.
///
/// `in_stock` items sit in a warehouse; `assigned` items belong to a client
/// (and optionally a bid); `installed` items are mounted on the client's
/// object; `written_off` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InStock,
    Assigned,
    Installed,
    WrittenOff,
}

impl ItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::WrittenOff)
    }
}

/// A physical unit of an equipment SKU, individually tracked by IMEI/serial.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "equipment_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub equipment_id: Uuid,

    /// Normalized IMEI (trimmed, uppercase); unique across all items when set
    #[validate(length(min = 8, max = 20, message = "IMEI must be between 8 and 20 characters"))]
    pub imei: Option<String>,

    pub serial_number: Option<String>,

    /// One of [`ItemStatus`], stored as its snake_case string
    pub status: String,

    pub warehouse_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,

    pub received_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn status(&self) -> Result<ItemStatus, strum::ParseError> {
        self.status.parse()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id"
    )]
    Equipment,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::bid::Entity",
        from = "Column::BidId",
        to = "super::bid::Column::Id"
    )]
    Bid,
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::bid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bid.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_string() {
        assert_eq!(ItemStatus::InStock.to_string(), "in_stock");
        assert_eq!(
            "written_off".parse::<ItemStatus>().unwrap(),
            ItemStatus::WrittenOff
        );
    }

    #[test]
    fn only_write_off_is_terminal() {
        assert!(ItemStatus::WrittenOff.is_terminal());
        assert!(!ItemStatus::InStock.is_terminal());
        assert!(!ItemStatus::Assigned.is_terminal());
        assert!(!ItemStatus::Installed.is_terminal());
    }
}
