pub mod analytics;
pub mod bid_types;
pub mod bids;
pub mod client_objects;
pub mod clients;
pub mod common;
pub mod equipment;
pub mod equipment_items;
pub mod notes;
pub mod suppliers;
pub mod tokens;
pub mod warehouses;

use crate::db::DbPool;
use crate::events::EventSender;
use slog::Logger;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub clients: Arc<crate::services::clients::ClientService>,
    pub client_objects: Arc<crate::services::client_objects::ClientObjectService>,
    pub equipment: Arc<crate::services::equipment::EquipmentService>,
    pub equipment_items: Arc<crate::services::equipment_items::EquipmentItemService>,
    pub bid_types: Arc<crate::services::bid_types::BidTypeService>,
    pub bids: Arc<crate::services::bids::BidService>,
    pub warehouses: Arc<crate::services::warehouses::WarehouseService>,
    pub suppliers: Arc<crate::services::suppliers::SupplierService>,
    pub notes: Arc<crate::services::notes::NoteService>,
    pub analytics: Arc<crate::services::analytics::AnalyticsService>,
    pub tokens: Arc<crate::services::tokens::TokenService>,
}

impl AppServices {
    /// Build the service container used by HTTP handlers.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        auth_service: Arc<crate::auth::AuthService>,
        base_logger: Logger,
    ) -> Self {
        let clients_logger = base_logger.new(slog::o!("component" => "client_service"));
        let objects_logger = base_logger.new(slog::o!("component" => "client_object_service"));
        let equipment_logger = base_logger.new(slog::o!("component" => "equipment_service"));
        let items_logger = base_logger.new(slog::o!("component" => "equipment_item_service"));
        let bid_types_logger = base_logger.new(slog::o!("component" => "bid_type_service"));
        let bids_logger = base_logger.new(slog::o!("component" => "bid_service"));
        let warehouses_logger = base_logger.new(slog::o!("component" => "warehouse_service"));
        let suppliers_logger = base_logger.new(slog::o!("component" => "supplier_service"));
        let notes_logger = base_logger.new(slog::o!("component" => "note_service"));
        let tokens_logger = base_logger.new(slog::o!("component" => "token_service"));

        let clients = Arc::new(crate::services::clients::ClientService::new(
            db_pool.clone(),
            event_sender.clone(),
            clients_logger,
        ));
        let client_objects = Arc::new(crate::services::client_objects::ClientObjectService::new(
            db_pool.clone(),
            event_sender.clone(),
            objects_logger,
        ));
        let equipment = Arc::new(crate::services::equipment::EquipmentService::new(
            db_pool.clone(),
            event_sender.clone(),
            equipment_logger,
        ));
        let equipment_items = Arc::new(crate::services::equipment_items::EquipmentItemService::new(
            db_pool.clone(),
            event_sender.clone(),
            items_logger,
        ));
        let bid_types = Arc::new(crate::services::bid_types::BidTypeService::new(
            db_pool.clone(),
            event_sender.clone(),
            bid_types_logger,
        ));
        let bids = Arc::new(crate::services::bids::BidService::new(
            db_pool.clone(),
            event_sender.clone(),
            (*bid_types).clone(),
            (*equipment_items).clone(),
            bids_logger,
        ));
        let warehouses = Arc::new(crate::services::warehouses::WarehouseService::new(
            db_pool.clone(),
            event_sender.clone(),
            warehouses_logger,
        ));
        let suppliers = Arc::new(crate::services::suppliers::SupplierService::new(
            db_pool.clone(),
            event_sender.clone(),
            suppliers_logger,
        ));
        let notes = Arc::new(crate::services::notes::NoteService::new(
            db_pool.clone(),
            event_sender.clone(),
            notes_logger,
        ));
        let analytics = Arc::new(crate::services::analytics::AnalyticsService::new(
            db_pool.clone(),
            (*bid_types).clone(),
        ));
        let tokens = Arc::new(crate::services::tokens::TokenService::new(
            db_pool,
            auth_service,
            event_sender,
            tokens_logger,
        ));

        Self {
            clients,
            client_objects,
            equipment,
            equipment_items,
            bid_types,
            bids,
            warehouses,
            suppliers,
            notes,
            analytics,
            tokens,
        }
    }
}
