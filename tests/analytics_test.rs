//! Integration tests for the dashboard analytics queries.

mod common;

use fleetcrm_api::services::equipment_items::{AssignItemInput, ReceiveItemInput};

#[tokio::test]
async fn dashboard_counts_reflect_seeded_data() {
    let app = common::spawn_app().await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    let archived = common::seed_client(&app, "Old Co").await;
    app.services
        .clients
        .archive_client(archived)
        .await
        .unwrap();

    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let type_id = common::seed_bid_type(&app, "Installation").await;

    let bid = common::seed_bid(&app, type_id, client_id, "Open bid").await;
    let closing = common::seed_bid(&app, type_id, client_id, "Closed bid").await;
    app.services
        .bids
        .update_bid_status(closing.id, "in_progress")
        .await
        .unwrap();
    app.services
        .bids
        .update_bid_status(closing.id, "done")
        .await
        .unwrap();

    let item = app
        .services
        .equipment_items
        .receive_item(ReceiveItemInput {
            equipment_id,
            warehouse_id,
            imei: None,
            serial_number: None,
            supplier_id: None,
            notes: None,
        })
        .await
        .unwrap();
    app.services
        .equipment_items
        .assign_item(
            item.id,
            AssignItemInput {
                client_id,
                bid_id: Some(bid.id),
            },
        )
        .await
        .unwrap();

    let metrics = app.services.analytics.dashboard().await.unwrap();
    assert_eq!(metrics.active_clients, 1);
    assert_eq!(metrics.archived_clients, 1);
    assert_eq!(metrics.open_bids, 1);
    assert_eq!(metrics.closed_bids, 1);
    assert_eq!(metrics.items_assigned, 1);
    assert_eq!(metrics.items_in_stock, 0);
    assert_eq!(metrics.warehouses, 1);
}

#[tokio::test]
async fn bids_by_status_follows_position_order() {
    let app = common::spawn_app().await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    let type_id = common::seed_bid_type(&app, "Installation").await;

    common::seed_bid(&app, type_id, client_id, "One").await;
    common::seed_bid(&app, type_id, client_id, "Two").await;
    let moved = common::seed_bid(&app, type_id, client_id, "Three").await;
    app.services
        .bids
        .update_bid_status(moved.id, "in_progress")
        .await
        .unwrap();

    let counts = app
        .services
        .analytics
        .bids_by_status(type_id)
        .await
        .unwrap();

    let snapshot: Vec<(&str, u64)> = counts
        .iter()
        .map(|c| (c.status.as_str(), c.count))
        .collect();
    assert_eq!(
        snapshot,
        vec![("new", 2), ("in_progress", 1), ("done", 0)]
    );
}

#[tokio::test]
async fn creation_trend_covers_the_whole_window() {
    let app = common::spawn_app().await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    common::seed_bid(&app, type_id, client_id, "Today").await;

    let series = app.services.analytics.bids_created(Some(7)).await.unwrap();
    assert_eq!(series.len(), 7);
    // Every bid was created today, the last bucket of the window
    assert_eq!(series.last().unwrap().count, 1);
    assert!(series.iter().take(6).all(|d| d.count == 0));

    // Window is clamped
    let series = app
        .services
        .analytics
        .bids_created(Some(100_000))
        .await
        .unwrap();
    assert_eq!(series.len(), 365);
}

#[tokio::test]
async fn equipment_by_warehouse_counts_only_stock() {
    let app = common::spawn_app().await;
    let main = common::seed_warehouse(&app, "Main").await;
    let north = common::seed_warehouse(&app, "North").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    for _ in 0..2 {
        app.services
            .equipment_items
            .receive_item(ReceiveItemInput {
                equipment_id,
                warehouse_id: main,
                imei: None,
                serial_number: None,
                supplier_id: None,
                notes: None,
            })
            .await
            .unwrap();
    }
    let assigned = app
        .services
        .equipment_items
        .receive_item(ReceiveItemInput {
            equipment_id,
            warehouse_id: north,
            imei: None,
            serial_number: None,
            supplier_id: None,
            notes: None,
        })
        .await
        .unwrap();
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

    let counts = app
        .services
        .analytics
        .equipment_by_warehouse()
        .await
        .unwrap();
    let snapshot: Vec<(&str, u64)> = counts
        .iter()
        .map(|c| (c.warehouse_name.as_str(), c.in_stock))
        .collect();
    assert_eq!(snapshot, vec![("Main", 2), ("North", 0)]);
}
