//! Integration tests for the bid lifecycle against the configurable
//! per-type workflow:
//! 1. Create a bid type and inspect its seeded workflow
//! 2. Create bids that start in the initial status
//! 3. Move bids along allowed transitions and reject everything else
//! 4. Close a bid through a terminal status and observe equipment install

mod common;

use assert_matches::assert_matches;
use fleetcrm_api::entities::equipment_item::ItemStatus;
use fleetcrm_api::errors::ServiceError;
use fleetcrm_api::services::bid_types::{AddStatusInput, TransitionInput};
use fleetcrm_api::services::bids::UpdateBidInput;
use fleetcrm_api::services::equipment_items::{AssignItemInput, ReceiveItemInput};
use fleetcrm_api::workflow::StatusAction;

#[tokio::test]
async fn new_bid_type_gets_default_workflow() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;

    let view = app
        .services
        .bid_types
        .workflow_view(type_id)
        .await
        .unwrap();

    assert_eq!(view.initial, "new");
    let keys: Vec<_> = view.statuses.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["new", "in_progress", "done"]);
    assert!(view.statuses.last().unwrap().is_terminal);
}

#[tokio::test]
async fn bid_starts_in_initial_status_with_generated_number() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let first = common::seed_bid(&app, type_id, client_id, "Install tracker").await;
    let second = common::seed_bid(&app, type_id, client_id, "Install second tracker").await;

    assert_eq!(first.status, "new");
    assert!(first.number.starts_with("B-"));
    assert!(first.number.ends_with("0001"));
    assert!(second.number.ends_with("0002"));
    assert!(first.closed_at.is_none());
}

#[tokio::test]
async fn transition_must_follow_the_graph() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    let bid = common::seed_bid(&app, type_id, client_id, "Install tracker").await;

    // done -> new is not an edge of the default workflow
    let moved = app
        .services
        .bids
        .update_bid_status(bid.id, "in_progress")
        .await
        .unwrap();
    assert_eq!(moved.status, "in_progress");

    let err = app
        .services
        .bids
        .update_bid_status(bid.id, "new")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));

    // Unknown statuses are rejected before the edge check
    let err = app
        .services
        .bids
        .update_bid_status(bid.id, "ghost")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
}

#[tokio::test]
async fn closing_a_bid_stamps_closed_at_and_installs_equipment() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
    let bid = common::seed_bid(&app, type_id, client_id, "Install tracker").await;

    let item = app
        .services
        .equipment_items
        .receive_item(ReceiveItemInput {
            equipment_id,
            warehouse_id,
            imei: Some("490154203237518".into()),
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

    app.services
        .bids
        .update_bid_status(bid.id, "in_progress")
        .await
        .unwrap();
    let closed = app
        .services
        .bids
        .update_bid_status(bid.id, "done")
        .await
        .unwrap();

    assert_eq!(closed.status, "done");
    assert!(closed.closed_at.is_some());

    let item = app.services.equipment_items.get_item(item.id).await.unwrap();
    assert_eq!(item.status().unwrap(), ItemStatus::Installed);
    assert_eq!(item.bid_id, Some(bid.id));
}

#[tokio::test]
async fn custom_status_and_transition_shape_the_graph() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Repair").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    // new -> on_hold -> in_progress
    app.services
        .bid_types
        .add_status(
            type_id,
            AddStatusInput {
                key: "On Hold".into(),
                label: "On hold".into(),
                position: None,
                color: None,
                actions: vec![StatusAction::Comment, StatusAction::Edit],
                is_terminal: false,
            },
        )
        .await
        .unwrap();
    app.services
        .bid_types
        .add_transition(
            type_id,
            TransitionInput {
                from: "new".into(),
                to: "on_hold".into(),
            },
        )
        .await
        .unwrap();
    app.services
        .bid_types
        .add_transition(
            type_id,
            TransitionInput {
                from: "on_hold".into(),
                to: "in_progress".into(),
            },
        )
        .await
        .unwrap();

    let bid = common::seed_bid(&app, type_id, client_id, "Fix wiring").await;
    app.services
        .bids
        .update_bid_status(bid.id, "on_hold")
        .await
        .unwrap();
    let resumed = app
        .services
        .bids
        .update_bid_status(bid.id, "in_progress")
        .await
        .unwrap();
    assert_eq!(resumed.status, "in_progress");
}

#[tokio::test]
async fn status_with_bids_in_it_cannot_be_removed() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    common::seed_bid(&app, type_id, client_id, "Install tracker").await;

    let err = app
        .services
        .bid_types
        .remove_status(type_id, "new")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn bid_type_with_bids_cannot_be_deleted() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    common::seed_bid(&app, type_id, client_id, "Install tracker").await;

    let err = app
        .services
        .bid_types
        .delete_bid_type(type_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn editing_is_gated_by_the_status_actions() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    let bid = common::seed_bid(&app, type_id, client_id, "Install tracker").await;

    // The default terminal status only allows comment/close
    app.services
        .bids
        .update_bid_status(bid.id, "in_progress")
        .await
        .unwrap();
    app.services
        .bids
        .update_bid_status(bid.id, "done")
        .await
        .unwrap();

    let err = app
        .services
        .bids
        .update_bid(
            bid.id,
            UpdateBidInput {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn reorder_changes_the_initial_status_for_new_bids() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    app.services
        .bid_types
        .reorder_statuses(
            type_id,
            vec!["in_progress".into(), "new".into(), "done".into()],
        )
        .await
        .unwrap();

    let bid = common::seed_bid(&app, type_id, client_id, "Install tracker").await;
    assert_eq!(bid.status, "in_progress");
}

#[tokio::test]
async fn board_groups_open_bids_per_status() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let a = common::seed_bid(&app, type_id, client_id, "First").await;
    let b = common::seed_bid(&app, type_id, client_id, "Second").await;
    app.services
        .bids
        .update_bid_status(b.id, "in_progress")
        .await
        .unwrap();
    // Closed bids drop off the board
    let c = common::seed_bid(&app, type_id, client_id, "Third").await;
    app.services
        .bids
        .update_bid_status(c.id, "done")
        .await
        .unwrap();

    let board = app.services.bids.board(type_id).await.unwrap();
    let columns: Vec<_> = board.iter().map(|c| c.status.as_str()).collect();
    assert_eq!(columns, vec!["new", "in_progress"]);
    assert_eq!(board[0].bids.len(), 1);
    assert_eq!(board[0].bids[0].id, a.id);
    assert_eq!(board[1].bids.len(), 1);
}

#[tokio::test]
async fn delete_only_from_initial_status() {
    let app = common::spawn_app().await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let deletable = common::seed_bid(&app, type_id, client_id, "Fresh").await;
    app.services.bids.delete_bid(deletable.id).await.unwrap();

    let moved = common::seed_bid(&app, type_id, client_id, "Started").await;
    app.services
        .bids
        .update_bid_status(moved.id, "in_progress")
        .await
        .unwrap();
    let err = app.services.bids.delete_bid(moved.id).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}
