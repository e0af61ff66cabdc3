//! Integration tests for serialized inventory: receiving, IMEI uniqueness,
//! assignment to clients and bids, release back to stock, and write-off.

mod common;

use assert_matches::assert_matches;
use fleetcrm_api::entities::equipment_item::ItemStatus;
use fleetcrm_api::errors::ServiceError;
use fleetcrm_api::services::equipment_items::{
    AssignItemInput, ItemListQuery, ReceiveItemInput, UpdateItemInput,
};

async fn receive(
    app: &common::TestApp,
    equipment_id: uuid::Uuid,
    warehouse_id: uuid::Uuid,
    imei: Option<&str>,
) -> fleetcrm_api::entities::equipment_item::Model {
    app.services
        .equipment_items
        .receive_item(ReceiveItemInput {
            equipment_id,
            warehouse_id,
            imei: imei.map(String::from),
            serial_number: None,
            supplier_id: None,
            notes: None,
        })
        .await
        .expect("item should be received")
}

#[tokio::test]
async fn received_item_lands_in_stock() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;

    let item = receive(&app, equipment_id, warehouse_id, Some("356938035643809")).await;

    assert_eq!(item.status().unwrap(), ItemStatus::InStock);
    assert_eq!(item.warehouse_id, Some(warehouse_id));
    assert!(item.client_id.is_none());
}

#[tokio::test]
async fn imei_is_unique_and_normalized() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;

    let first = receive(&app, equipment_id, warehouse_id, Some("  35a910000000001 ")).await;
    assert_eq!(first.imei.as_deref(), Some("35A910000000001"));

    // Same IMEI with different case and padding collides
    let err = app
        .services
        .equipment_items
        .receive_item(ReceiveItemInput {
            equipment_id,
            warehouse_id,
            imei: Some("35A910000000001".into()),
            serial_number: None,
            supplier_id: None,
            notes: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // Items without an IMEI never collide
    receive(&app, equipment_id, warehouse_id, None).await;
    receive(&app, equipment_id, warehouse_id, None).await;
}

#[tokio::test]
async fn assign_requires_stock_status() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let item = receive(&app, equipment_id, warehouse_id, None).await;
    let assigned = app
        .services
        .equipment_items
        .assign_item(
            item.id,
            AssignItemInput {
                client_id,
                bid_id: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(assigned.status().unwrap(), ItemStatus::Assigned);
    assert_eq!(assigned.client_id, Some(client_id));
    assert!(assigned.warehouse_id.is_none());
    assert!(assigned.assigned_at.is_some());

    // Already assigned; a second assignment is refused
    let err = app
        .services
        .equipment_items
        .assign_item(
            item.id,
            AssignItemInput {
                client_id,
                bid_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn bid_must_belong_to_the_same_client() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let owner = common::seed_client(&app, "Acme Logistics").await;
    let other = common::seed_client(&app, "Globex").await;
    let other_bid = common::seed_bid(&app, type_id, other, "Install for Globex").await;

    let item = receive(&app, equipment_id, warehouse_id, None).await;
    let err = app
        .services
        .equipment_items
        .assign_item(
            item.id,
            AssignItemInput {
                client_id: owner,
                bid_id: Some(other_bid.id),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn release_returns_item_to_stock_and_clears_linkage() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let second_warehouse = common::seed_warehouse(&app, "North").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let item = receive(&app, equipment_id, warehouse_id, None).await;
    app.services
        .equipment_items
        .assign_item(
            item.id,
            AssignItemInput {
                client_id,
                bid_id: None,
            },
        )
        .await
        .unwrap();
    app.services
        .equipment_items
        .install_item(item.id)
        .await
        .unwrap();

    let released = app
        .services
        .equipment_items
        .release_item(item.id, second_warehouse)
        .await
        .unwrap();

    assert_eq!(released.status().unwrap(), ItemStatus::InStock);
    assert_eq!(released.warehouse_id, Some(second_warehouse));
    assert!(released.client_id.is_none());
    assert!(released.assigned_at.is_none());
}

#[tokio::test]
async fn install_requires_assignment_first() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;

    let item = receive(&app, equipment_id, warehouse_id, None).await;
    let err = app
        .services
        .equipment_items
        .install_item(item.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn write_off_is_terminal() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let item = receive(&app, equipment_id, warehouse_id, None).await;
    let gone = app
        .services
        .equipment_items
        .write_off_item(item.id)
        .await
        .unwrap();
    assert_eq!(gone.status().unwrap(), ItemStatus::WrittenOff);
    assert!(gone.warehouse_id.is_none());

    let err = app
        .services
        .equipment_items
        .write_off_item(item.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));

    let err = app
        .services
        .equipment_items
        .assign_item(
            item.id,
            AssignItemInput {
                client_id,
                bid_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn identity_fields_are_frozen_after_assignment() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let item = receive(&app, equipment_id, warehouse_id, None).await;
    app.services
        .equipment_items
        .assign_item(
            item.id,
            AssignItemInput {
                client_id,
                bid_id: None,
            },
        )
        .await
        .unwrap();

    let err = app
        .services
        .equipment_items
        .update_item(
            item.id,
            UpdateItemInput {
                imei: Some(Some("356938035643809".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));

    // Notes stay editable regardless of status
    let updated = app
        .services
        .equipment_items
        .update_item(
            item.id,
            UpdateItemInput {
                notes: Some(Some("antenna damaged".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.notes.as_deref(), Some("antenna damaged"));
}

#[tokio::test]
async fn list_filters_by_status_and_imei() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let tracked = receive(&app, equipment_id, warehouse_id, Some("356938035643809")).await;
    let other = receive(&app, equipment_id, warehouse_id, None).await;
    app.services
        .equipment_items
        .assign_item(
            other.id,
            AssignItemInput {
                client_id,
                bid_id: None,
            },
        )
        .await
        .unwrap();

    let in_stock = app
        .services
        .equipment_items
        .list_items(ItemListQuery {
            status: Some(ItemStatus::InStock),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(in_stock.total, 1);
    assert_eq!(in_stock.items[0].id, tracked.id);

    let by_imei = app
        .services
        .equipment_items
        .list_items(ItemListQuery {
            imei: Some("356938035643809".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_imei.total, 1);
    assert_eq!(by_imei.items[0].id, tracked.id);
}

#[tokio::test]
async fn warehouse_stock_counts_in_stock_items_per_sku() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let tracker = common::seed_equipment(&app, "GPS Tracker X1").await;
    let sensor = common::seed_equipment(&app, "Fuel Sensor F2").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    receive(&app, tracker, warehouse_id, None).await;
    receive(&app, tracker, warehouse_id, None).await;
    receive(&app, sensor, warehouse_id, None).await;
    let assigned = receive(&app, tracker, warehouse_id, None).await;
    app.services
        .equipment_items
        .assign_item(
            assigned.id,
            AssignItemInput {
                client_id,
                bid_id: None,
            },
        )
        .await
        .unwrap();

    let stock = app
        .services
        .warehouses
        .warehouse_stock(warehouse_id)
        .await
        .unwrap();

    // Alphabetical by SKU name; assigned items are excluded
    assert_eq!(stock.len(), 2);
    assert_eq!(stock[0].equipment_name, "Fuel Sensor F2");
    assert_eq!(stock[0].in_stock, 1);
    assert_eq!(stock[1].equipment_name, "GPS Tracker X1");
    assert_eq!(stock[1].in_stock, 2);
}

#[tokio::test]
async fn referenced_catalog_rows_resist_deletion() {
    let app = common::spawn_app().await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    receive(&app, equipment_id, warehouse_id, None).await;

    let err = app
        .services
        .equipment
        .delete_equipment(equipment_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    let err = app
        .services
        .warehouses
        .delete_warehouse(warehouse_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}
