//! Shared test harness: in-memory sqlite with migrations applied and a fully
//! wired service container.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use fleetcrm_api::auth::{AuthConfig, AuthService};
use fleetcrm_api::db::{establish_connection_with_config, run_migrations, DbConfig, DbPool};
use fleetcrm_api::events;
use fleetcrm_api::handlers::AppServices;
use fleetcrm_api::logging::discard_logger;

pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
    pub event_sender: events::EventSender,
    // Keeps the event channel open for the lifetime of the test
    _event_rx: tokio::sync::mpsc::Receiver<events::Event>,
}

/// Spin up a fresh in-memory database with the full schema and services.
pub async fn spawn_app() -> TestApp {
    // Single connection: every new in-memory sqlite connection is a fresh DB
    let config = DbConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let db = establish_connection_with_config(&config)
        .await
        .expect("in-memory sqlite should connect");
    run_migrations(&db).await.expect("migrations should apply");
    let db = Arc::new(db);

    let (event_sender, event_rx) = events::channel(256);

    let auth_config = AuthConfig::new(
        "integration-test-secret-key-with-enough-length".into(),
        Duration::from_secs(3600),
        Duration::from_secs(86400),
        "sk_".into(),
    );
    let auth = Arc::new(AuthService::new(auth_config, db.clone()));

    let services = AppServices::new(
        db.clone(),
        event_sender.clone(),
        auth.clone(),
        discard_logger(),
    );

    TestApp {
        db,
        services,
        auth,
        event_sender,
        _event_rx: event_rx,
    }
}

/// Create a client and return its id.
pub async fn seed_client(app: &TestApp, name: &str) -> uuid::Uuid {
    app.services
        .clients
        .create_client(fleetcrm_api::services::clients::CreateClientInput {
            name: name.into(),
            legal_name: None,
            phone: Some("+15550100".into()),
            email: None,
            address: None,
            contact_person: None,
            manager_notes: None,
        })
        .await
        .expect("client should create")
        .id
}

/// Create a warehouse and return its id.
pub async fn seed_warehouse(app: &TestApp, name: &str) -> uuid::Uuid {
    app.services
        .warehouses
        .create_warehouse(fleetcrm_api::services::warehouses::CreateWarehouseInput {
            name: name.into(),
            location: None,
        })
        .await
        .expect("warehouse should create")
        .id
}

/// Create an equipment SKU and return its id.
pub async fn seed_equipment(app: &TestApp, name: &str) -> uuid::Uuid {
    app.services
        .equipment
        .create_equipment(fleetcrm_api::services::equipment::CreateEquipmentInput {
            name: name.into(),
            model: None,
            manufacturer: None,
            unit_price: None,
            description: None,
        })
        .await
        .expect("equipment should create")
        .id
}

/// Create a bid type (with the default workflow) and return its id.
pub async fn seed_bid_type(app: &TestApp, name: &str) -> uuid::Uuid {
    app.services
        .bid_types
        .create_bid_type(fleetcrm_api::services::bid_types::CreateBidTypeInput {
            name: name.into(),
            description: None,
        })
        .await
        .expect("bid type should create")
        .id
}

/// Create a bid in the initial status of the given type.
pub async fn seed_bid(
    app: &TestApp,
    bid_type_id: uuid::Uuid,
    client_id: uuid::Uuid,
    title: &str,
) -> fleetcrm_api::entities::bid::Model {
    app.services
        .bids
        .create_bid(fleetcrm_api::services::bids::CreateBidInput {
            bid_type_id,
            client_id,
            client_object_id: None,
            title: title.into(),
            description: None,
            amount: None,
            scheduled_at: None,
        })
        .await
        .expect("bid should create")
}
