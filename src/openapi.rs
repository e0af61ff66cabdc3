use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FleetCRM API",
        version = "1.0.0",
        description = r#"
# FleetCRM API

CRM backend for telematics service businesses: clients and their vehicles,
bids (work orders) with configurable per-type status workflows, IMEI-tracked
equipment inventory across warehouses and suppliers, a team kanban board,
and dashboard analytics.

## Authentication

All `/api/v1` endpoints require authentication. Interactive users send a JWT:

```
Authorization: Bearer <access-token>
```

External integrations send an API token minted via `POST /api/v1/tokens`:

```
Authorization: Bearer sk_<token>
```

## Pagination

List endpoints accept `page` (default 1) and `per_page` (default 20, max 100).
"#,
        contact(
            name = "FleetCRM",
            email = "dev@fleetcrm.io"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "Clients", description = "Client and client object management"),
        (name = "Bids", description = "Bid (work order) management"),
        (name = "Bid Types", description = "Workflow configuration per bid type"),
        (name = "Equipment", description = "Equipment catalog and serialized items"),
        (name = "Warehouses", description = "Warehouse management"),
        (name = "Suppliers", description = "Supplier management"),
        (name = "Notes", description = "Team kanban board"),
        (name = "Analytics", description = "Dashboard metrics"),
        (name = "Tokens", description = "API token management")
    ),
    components(
        schemas(
            // Common envelope types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::errors::ErrorResponse,

            // Clients
            crate::services::clients::CreateClientInput,
            crate::services::clients::UpdateClientInput,
            crate::services::client_objects::CreateClientObjectInput,
            crate::services::client_objects::UpdateClientObjectInput,

            // Equipment
            crate::services::equipment::CreateEquipmentInput,
            crate::services::equipment::UpdateEquipmentInput,
            crate::services::equipment_items::ReceiveItemInput,
            crate::services::equipment_items::UpdateItemInput,
            crate::services::equipment_items::AssignItemInput,
            crate::handlers::equipment_items::ReleaseItemRequest,

            // Workflow
            crate::workflow::StatusAction,
            crate::workflow::StatusDef,
            crate::workflow::TransitionDef,
            crate::workflow::StatusView,
            crate::workflow::WorkflowView,
            crate::services::bid_types::CreateBidTypeInput,
            crate::services::bid_types::UpdateBidTypeInput,
            crate::services::bid_types::AddStatusInput,
            crate::services::bid_types::UpdateStatusInput,
            crate::services::bid_types::TransitionInput,
            crate::handlers::bid_types::ReorderRequest,

            // Bids
            crate::services::bids::CreateBidInput,
            crate::services::bids::UpdateBidInput,
            crate::services::bids::BoardColumn,
            crate::handlers::bids::AssignBidRequest,
            crate::handlers::bids::UpdateBidStatusRequest,

            // Warehouses and suppliers
            crate::services::warehouses::CreateWarehouseInput,
            crate::services::warehouses::UpdateWarehouseInput,
            crate::services::warehouses::StockLine,
            crate::services::suppliers::CreateSupplierInput,
            crate::services::suppliers::UpdateSupplierInput,

            // Notes
            crate::services::notes::CreateNoteInput,
            crate::services::notes::UpdateNoteInput,
            crate::services::notes::MoveNoteInput,
            crate::services::notes::NoteLane,

            // Analytics
            crate::services::analytics::DashboardMetrics,
            crate::services::analytics::StatusCount,
            crate::services::analytics::DailyCount,
            crate::services::analytics::WarehouseStockCount,

            // Tokens and auth
            crate::services::tokens::CreateTokenInput,
            crate::services::tokens::MintedToken,
            crate::auth::TokenPair,
            crate::auth::LoginCredentials,
            crate::auth::RefreshTokenRequest,
            crate::auth::CreateUserRequest,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
