//! Integration tests for client records, their objects, and the
//! delete/archive rules.

mod common;

use assert_matches::assert_matches;
use fleetcrm_api::errors::ServiceError;
use fleetcrm_api::services::client_objects::CreateClientObjectInput;
use fleetcrm_api::services::clients::{ClientListQuery, UpdateClientInput};
use fleetcrm_api::services::equipment_items::{AssignItemInput, ReceiveItemInput};

#[tokio::test]
async fn search_matches_name_phone_and_email() {
    let app = common::spawn_app().await;
    common::seed_client(&app, "Acme Logistics").await;
    common::seed_client(&app, "Globex Haulage").await;

    let hits = app
        .services
        .clients
        .list_clients(ClientListQuery {
            search: Some("acme".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(hits.total, 1);
    assert_eq!(hits.clients[0].name, "Acme Logistics");

    // Phone substring
    let hits = app
        .services
        .clients
        .list_clients(ClientListQuery {
            search: Some("5550100".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(hits.total, 2);
}

#[tokio::test]
async fn archive_is_idempotent_and_filters_apply() {
    let app = common::spawn_app().await;
    let id = common::seed_client(&app, "Acme Logistics").await;
    common::seed_client(&app, "Globex Haulage").await;

    app.services.clients.archive_client(id).await.unwrap();
    let again = app.services.clients.archive_client(id).await.unwrap();
    assert!(again.is_archived);

    let active = app
        .services
        .clients
        .list_clients(ClientListQuery {
            archived: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.total, 1);
    assert_eq!(active.clients[0].name, "Globex Haulage");
}

#[tokio::test]
async fn delete_refused_while_dependencies_exist() {
    let app = common::spawn_app().await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;
    let type_id = common::seed_bid_type(&app, "Installation").await;
    let bid = common::seed_bid(&app, type_id, client_id, "Install tracker").await;

    let err = app
        .services
        .clients
        .delete_client(client_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // Remove the bid; an assigned item still blocks deletion
    app.services.bids.delete_bid(bid.id).await.unwrap();

    let warehouse_id = common::seed_warehouse(&app, "Main").await;
    let equipment_id = common::seed_equipment(&app, "GPS Tracker X1").await;
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
                bid_id: None,
            },
        )
        .await
        .unwrap();

    let err = app
        .services
        .clients
        .delete_client(client_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // Released item unblocks the delete
    app.services
        .equipment_items
        .release_item(item.id, warehouse_id)
        .await
        .unwrap();
    app.services.clients.delete_client(client_id).await.unwrap();

    let err = app.services.clients.get_client(client_id).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn objects_belong_to_their_client() {
    let app = common::spawn_app().await;
    let client_id = common::seed_client(&app, "Acme Logistics").await;

    let object = app
        .services
        .client_objects
        .create_object(
            client_id,
            CreateClientObjectInput {
                name: "Scania R450".into(),
                plate_number: Some("AB 1234 CD".into()),
                vin: None,
                brand: Some("Scania".into()),
                model: Some("R450".into()),
                year: Some(2021),
                notes: None,
            },
        )
        .await
        .unwrap();

    let objects = app.services.clients.client_objects(client_id).await.unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].id, object.id);

    // Bid on the object blocks object deletion
    let type_id = common::seed_bid_type(&app, "Installation").await;
    app.services
        .bids
        .create_bid(fleetcrm_api::services::bids::CreateBidInput {
            bid_type_id: type_id,
            client_id,
            client_object_id: Some(object.id),
            title: "Install on truck".into(),
            description: None,
            amount: None,
            scheduled_at: None,
        })
        .await
        .unwrap();

    let err = app
        .services
        .client_objects
        .delete_object(object.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn bid_rejects_objects_of_other_clients() {
    let app = common::spawn_app().await;
    let owner = common::seed_client(&app, "Acme Logistics").await;
    let other = common::seed_client(&app, "Globex Haulage").await;
    let type_id = common::seed_bid_type(&app, "Installation").await;

    let object = app
        .services
        .client_objects
        .create_object(
            owner,
            CreateClientObjectInput {
                name: "Scania R450".into(),
                plate_number: None,
                vin: None,
                brand: None,
                model: None,
                year: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let err = app
        .services
        .bids
        .create_bid(fleetcrm_api::services::bids::CreateBidInput {
            bid_type_id: type_id,
            client_id: other,
            client_object_id: Some(object.id),
            title: "Wrong owner".into(),
            description: None,
            amount: None,
            scheduled_at: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn update_clears_optional_fields_with_explicit_null() {
    let app = common::spawn_app().await;
    let id = common::seed_client(&app, "Acme Logistics").await;

    let updated = app
        .services
        .clients
        .update_client(
            id,
            UpdateClientInput {
                phone: Some(None),
                manager_notes: Some(Some("pays on time".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.phone.is_none());
    assert_eq!(updated.manager_notes.as_deref(), Some("pays on time"));
}
