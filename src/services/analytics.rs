use crate::{
    entities::{bid, client, equipment_item, equipment_item::ItemStatus, supplier, warehouse},
    errors::ServiceError,
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::bid_types::BidTypeService;

const MAX_TREND_DAYS: i64 = 365;
const DEFAULT_TREND_DAYS: i64 = 30;

/// Read-only dashboard queries.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DatabaseConnection>,
    bid_types: BidTypeService,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardMetrics {
    pub active_clients: u64,
    pub archived_clients: u64,
    pub open_bids: u64,
    pub closed_bids: u64,
    pub items_in_stock: u64,
    pub items_assigned: u64,
    pub items_installed: u64,
    pub items_written_off: u64,
    pub warehouses: u64,
    pub suppliers: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub label: String,
    pub position: u32,
    pub count: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WarehouseStockCount {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub in_stock: u64,
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>, bid_types: BidTypeService) -> Self {
        Self { db, bid_types }
    }

    async fn count_items(&self, status: ItemStatus) -> Result<u64, ServiceError> {
        Ok(equipment_item::Entity::find()
            .filter(equipment_item::Column::Status.eq(status.to_string()))
            .count(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardMetrics, ServiceError> {
        let active_clients = client::Entity::find()
            .filter(client::Column::IsArchived.eq(false))
            .count(&*self.db)
            .await?;
        let archived_clients = client::Entity::find()
            .filter(client::Column::IsArchived.eq(true))
            .count(&*self.db)
            .await?;

        let open_bids = bid::Entity::find()
            .filter(bid::Column::ClosedAt.is_null())
            .count(&*self.db)
            .await?;
        let closed_bids = bid::Entity::find()
            .filter(bid::Column::ClosedAt.is_not_null())
            .count(&*self.db)
            .await?;

        Ok(DashboardMetrics {
            active_clients,
            archived_clients,
            open_bids,
            closed_bids,
            items_in_stock: self.count_items(ItemStatus::InStock).await?,
            items_assigned: self.count_items(ItemStatus::Assigned).await?,
            items_installed: self.count_items(ItemStatus::Installed).await?,
            items_written_off: self.count_items(ItemStatus::WrittenOff).await?,
            warehouses: warehouse::Entity::find().count(&*self.db).await?,
            suppliers: supplier::Entity::find().count(&*self.db).await?,
        })
    }

    /// Bid counts per status of one bid type, in position order.
    #[instrument(skip(self))]
    pub async fn bids_by_status(
        &self,
        bid_type_id: Uuid,
    ) -> Result<Vec<StatusCount>, ServiceError> {
        let view = self.bid_types.workflow_view(bid_type_id).await?;

        let mut counts = Vec::with_capacity(view.statuses.len());
        for status in view.statuses {
            let count = bid::Entity::find()
                .filter(bid::Column::BidTypeId.eq(bid_type_id))
                .filter(bid::Column::Status.eq(status.key.clone()))
                .count(&*self.db)
                .await?;
            counts.push(StatusCount {
                status: status.key,
                label: status.label,
                position: status.position,
                count,
            });
        }

        Ok(counts)
    }

    /// Daily bid creation counts over the trailing window. Days without bids
    /// appear with a zero count.
    #[instrument(skip(self))]
    pub async fn bids_created(&self, days: Option<i64>) -> Result<Vec<DailyCount>, ServiceError> {
        let days = days.unwrap_or(DEFAULT_TREND_DAYS).clamp(1, MAX_TREND_DAYS);
        let today = Utc::now().date_naive();
        let cutoff = today - Duration::days(days - 1);

        let bids = bid::Entity::find()
            .filter(bid::Column::CreatedAt.gte(cutoff.and_time(NaiveTime::MIN).and_utc()))
            .order_by_asc(bid::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
        for entry in &bids {
            *per_day.entry(entry.created_at.date_naive()).or_insert(0) += 1;
        }

        let mut series = Vec::with_capacity(days as usize);
        for offset in 0..days {
            let date = cutoff + Duration::days(offset);
            series.push(DailyCount {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            });
        }

        Ok(series)
    }

    /// In-stock item counts per warehouse.
    #[instrument(skip(self))]
    pub async fn equipment_by_warehouse(&self) -> Result<Vec<WarehouseStockCount>, ServiceError> {
        let warehouses = warehouse::Entity::find()
            .order_by_asc(warehouse::Column::Name)
            .all(&*self.db)
            .await?;

        let mut result = Vec::with_capacity(warehouses.len());
        for entry in warehouses {
            let in_stock = equipment_item::Entity::find()
                .filter(equipment_item::Column::WarehouseId.eq(entry.id))
                .filter(equipment_item::Column::Status.eq(ItemStatus::InStock.to_string()))
                .count(&*self.db)
                .await?;
            result.push(WarehouseStockCount {
                warehouse_id: entry.id,
                warehouse_name: entry.name,
                in_stock,
            });
        }

        Ok(result)
    }
}
