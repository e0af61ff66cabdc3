//! FleetCRM API Library
//!
//! This crate provides the core functionality for the FleetCRM API
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod workflow;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::consts as perm;
use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::middleware::request_id::current_request_id()
                .map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Enhanced API routes function
pub fn api_v1_routes() -> Router<AppState> {
    // Clients routes with permission gating
    let clients_read = Router::new()
        .route("/clients", get(handlers::clients::list_clients))
        .route("/clients/:id", get(handlers::clients::get_client))
        .route("/clients/:id/bids", get(handlers::clients::get_client_bids))
        .route(
            "/clients/:id/equipment",
            get(handlers::clients::get_client_equipment),
        )
        .route(
            "/clients/:id/objects",
            get(handlers::clients::get_client_objects),
        )
        .route("/objects/:id", get(handlers::client_objects::get_object))
        .with_permission(perm::CLIENTS_READ);

    let clients_write = Router::new()
        .route("/clients", post(handlers::clients::create_client))
        .route("/clients/:id", put(handlers::clients::update_client))
        .route(
            "/clients/:id/archive",
            post(handlers::clients::archive_client),
        )
        .route("/clients/:id", delete(handlers::clients::delete_client))
        .route(
            "/clients/:id/objects",
            post(handlers::clients::create_client_object),
        )
        .route("/objects/:id", put(handlers::client_objects::update_object))
        .route(
            "/objects/:id",
            delete(handlers::client_objects::delete_object),
        )
        .with_permission(perm::CLIENTS_WRITE);

    // Equipment catalog routes
    let equipment_read = Router::new()
        .route("/equipment", get(handlers::equipment::list_equipment))
        .route("/equipment/:id", get(handlers::equipment::get_equipment))
        .with_permission(perm::EQUIPMENT_READ);

    let equipment_write = Router::new()
        .route("/equipment", post(handlers::equipment::create_equipment))
        .route("/equipment/:id", put(handlers::equipment::update_equipment))
        .route(
            "/equipment/:id",
            delete(handlers::equipment::delete_equipment),
        )
        .with_permission(perm::EQUIPMENT_WRITE);

    // Serialized inventory routes
    let items_read = Router::new()
        .route("/equipment-items", get(handlers::equipment_items::list_items))
        .route(
            "/equipment-items/:id",
            get(handlers::equipment_items::get_item),
        )
        .with_permission(perm::EQUIPMENT_READ);

    let items_write = Router::new()
        .route(
            "/equipment-items",
            post(handlers::equipment_items::receive_item),
        )
        .route(
            "/equipment-items/:id",
            put(handlers::equipment_items::update_item),
        )
        .route(
            "/equipment-items/:id",
            delete(handlers::equipment_items::delete_item),
        )
        .route(
            "/equipment-items/:id/assign",
            post(handlers::equipment_items::assign_item),
        )
        .route(
            "/equipment-items/:id/install",
            post(handlers::equipment_items::install_item),
        )
        .route(
            "/equipment-items/:id/release",
            post(handlers::equipment_items::release_item),
        )
        .route(
            "/equipment-items/:id/write-off",
            post(handlers::equipment_items::write_off_item),
        )
        .with_permission(perm::EQUIPMENT_WRITE);

    // Bid type workflow administration
    let bid_types_read = Router::new()
        .route("/bid-types", get(handlers::bid_types::list_bid_types))
        .route("/bid-types/:id", get(handlers::bid_types::get_bid_type))
        .route(
            "/bid-types/:id/workflow",
            get(handlers::bid_types::get_workflow),
        )
        .with_permission(perm::BIDS_READ);

    let bid_types_manage = Router::new()
        .route("/bid-types", post(handlers::bid_types::create_bid_type))
        .route("/bid-types/:id", put(handlers::bid_types::update_bid_type))
        .route(
            "/bid-types/:id",
            delete(handlers::bid_types::delete_bid_type),
        )
        .route(
            "/bid-types/:id/statuses",
            post(handlers::bid_types::add_status),
        )
        .route(
            "/bid-types/:id/statuses/reorder",
            put(handlers::bid_types::reorder_statuses),
        )
        .route(
            "/bid-types/:id/statuses/:key",
            put(handlers::bid_types::update_status),
        )
        .route(
            "/bid-types/:id/statuses/:key",
            delete(handlers::bid_types::remove_status),
        )
        .route(
            "/bid-types/:id/transitions",
            post(handlers::bid_types::add_transition),
        )
        .route(
            "/bid-types/:id/transitions",
            delete(handlers::bid_types::remove_transition),
        )
        .with_permission(perm::WORKFLOW_MANAGE);

    // Bids routes
    let bids_read = Router::new()
        .route("/bids", get(handlers::bids::list_bids))
        .route("/bids/board", get(handlers::bids::get_board))
        .route("/bids/:id", get(handlers::bids::get_bid))
        .route(
            "/bids/by-number/:number",
            get(handlers::bids::get_bid_by_number),
        )
        .route("/bids/:id/equipment", get(handlers::bids::get_bid_equipment))
        .with_permission(perm::BIDS_READ);

    let bids_write = Router::new()
        .route("/bids", post(handlers::bids::create_bid))
        .route("/bids/:id", put(handlers::bids::update_bid))
        .route("/bids/:id/assign", post(handlers::bids::assign_bid))
        .route("/bids/:id/status", put(handlers::bids::update_bid_status))
        .route("/bids/:id", delete(handlers::bids::delete_bid))
        .with_permission(perm::BIDS_WRITE);

    // Warehouses
    let warehouses_read = Router::new()
        .route("/warehouses", get(handlers::warehouses::list_warehouses))
        .route("/warehouses/:id", get(handlers::warehouses::get_warehouse))
        .route(
            "/warehouses/:id/stock",
            get(handlers::warehouses::get_warehouse_stock),
        )
        .with_permission(perm::EQUIPMENT_READ);

    let warehouses_manage = Router::new()
        .route("/warehouses", post(handlers::warehouses::create_warehouse))
        .route(
            "/warehouses/:id",
            put(handlers::warehouses::update_warehouse),
        )
        .route(
            "/warehouses/:id",
            delete(handlers::warehouses::delete_warehouse),
        )
        .with_permission(perm::WAREHOUSES_MANAGE);

    // Suppliers
    let suppliers_read = Router::new()
        .route("/suppliers", get(handlers::suppliers::list_suppliers))
        .route("/suppliers/:id", get(handlers::suppliers::get_supplier))
        .route(
            "/suppliers/:id/items",
            get(handlers::suppliers::get_supplier_items),
        )
        .with_permission(perm::EQUIPMENT_READ);

    let suppliers_manage = Router::new()
        .route("/suppliers", post(handlers::suppliers::create_supplier))
        .route("/suppliers/:id", put(handlers::suppliers::update_supplier))
        .route(
            "/suppliers/:id",
            delete(handlers::suppliers::delete_supplier),
        )
        .with_permission(perm::SUPPLIERS_MANAGE);

    // Kanban notes
    let notes_read = Router::new()
        .route("/notes/board", get(handlers::notes::get_board))
        .route("/notes/:id", get(handlers::notes::get_note))
        .with_permission(perm::NOTES_READ);

    let notes_write = Router::new()
        .route("/notes", post(handlers::notes::create_note))
        .route("/notes/:id", put(handlers::notes::update_note))
        .route("/notes/:id/move", post(handlers::notes::move_note))
        .route("/notes/:id", delete(handlers::notes::delete_note))
        .with_permission(perm::NOTES_WRITE);

    // Analytics
    let analytics = Router::new()
        .route(
            "/analytics/dashboard",
            get(handlers::analytics::get_dashboard_metrics),
        )
        .route(
            "/analytics/bids/by-status",
            get(handlers::analytics::get_bids_by_status),
        )
        .route(
            "/analytics/bids/created",
            get(handlers::analytics::get_bids_created),
        )
        .route(
            "/analytics/equipment/by-warehouse",
            get(handlers::analytics::get_equipment_by_warehouse),
        )
        .with_permission(perm::ANALYTICS_READ);

    // API tokens
    let tokens = Router::new()
        .route("/tokens", post(handlers::tokens::create_token))
        .route("/tokens", get(handlers::tokens::list_tokens))
        .route("/tokens/:id", delete(handlers::tokens::revoke_token))
        .with_permission(perm::TOKENS_MANAGE);

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Clients API
        .merge(clients_read)
        .merge(clients_write)
        // Equipment API
        .merge(equipment_read)
        .merge(equipment_write)
        .merge(items_read)
        .merge(items_write)
        // Workflow API
        .merge(bid_types_read)
        .merge(bid_types_manage)
        // Bids API
        .merge(bids_read)
        .merge(bids_write)
        // Warehouses API
        .merge(warehouses_read)
        .merge(warehouses_manage)
        // Suppliers API
        .merge(suppliers_read)
        .merge(suppliers_manage)
        // Notes API
        .merge(notes_read)
        .merge(notes_write)
        // Analytics API
        .merge(analytics)
        // API tokens
        .merge(tokens)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "service": "fleetcrm-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use crate::middleware::request_id::{scope_request_id, RequestId};
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response = scope_request_id(RequestId::new("meta-123"), async {
            ApiResponse::success("ok")
        })
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response = scope_request_id(RequestId::new("meta-err"), async {
            ApiResponse::<()>::error("oops".into())
        })
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }
}
