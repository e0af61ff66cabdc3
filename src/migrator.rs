use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_clients_table::Migration),
            Box::new(m20250301_000002_create_client_objects_table::Migration),
            Box::new(m20250301_000003_create_warehouses_table::Migration),
            Box::new(m20250301_000004_create_suppliers_table::Migration),
            Box::new(m20250301_000005_create_equipment_tables::Migration),
            Box::new(m20250301_000006_create_bid_types_table::Migration),
            Box::new(m20250301_000007_create_bids_table::Migration),
            Box::new(m20250301_000008_create_notes_table::Migration),
            Box::new(m20250301_000009_create_users_table::Migration),
            Box::new(m20250301_000010_create_api_tokens_table::Migration),
        ]
    }
}

mod m20250301_000001_create_clients_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_clients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Clients::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Clients::Name).string().not_null())
                        .col(ColumnDef::new(Clients::LegalName).string().null())
                        .col(ColumnDef::new(Clients::Phone).string().null())
                        .col(ColumnDef::new(Clients::Email).string().null())
                        .col(ColumnDef::new(Clients::Address).string().null())
                        .col(ColumnDef::new(Clients::ContactPerson).string().null())
                        .col(ColumnDef::new(Clients::ManagerNotes).text().null())
                        .col(
                            ColumnDef::new(Clients::IsArchived)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Clients::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Clients::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_clients_name")
                        .table(Clients::Table)
                        .col(Clients::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Clients {
        Table,
        Id,
        Name,
        LegalName,
        Phone,
        Email,
        Address,
        ContactPerson,
        ManagerNotes,
        IsArchived,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000002_create_client_objects_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_client_objects_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ClientObjects::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ClientObjects::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ClientObjects::ClientId).uuid().not_null())
                        .col(ColumnDef::new(ClientObjects::Name).string().not_null())
                        .col(ColumnDef::new(ClientObjects::PlateNumber).string().null())
                        .col(ColumnDef::new(ClientObjects::Vin).string().null())
                        .col(ColumnDef::new(ClientObjects::Brand).string().null())
                        .col(ColumnDef::new(ClientObjects::Model).string().null())
                        .col(ColumnDef::new(ClientObjects::Year).integer().null())
                        .col(ColumnDef::new(ClientObjects::Notes).text().null())
                        .col(
                            ColumnDef::new(ClientObjects::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ClientObjects::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_client_objects_client_id")
                        .table(ClientObjects::Table)
                        .col(ClientObjects::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ClientObjects::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ClientObjects {
        Table,
        Id,
        ClientId,
        Name,
        PlateNumber,
        Vin,
        Brand,
        Model,
        Year,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_warehouses_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_warehouses_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(ColumnDef::new(Warehouses::Location).string().null())
                        .col(
                            ColumnDef::new(Warehouses::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Warehouses::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Warehouses::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Warehouses {
        Table,
        Id,
        Name,
        Location,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000004_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::ContactPerson).string().null())
                        .col(ColumnDef::new(Suppliers::Phone).string().null())
                        .col(ColumnDef::new(Suppliers::Email).string().null())
                        .col(ColumnDef::new(Suppliers::Notes).text().null())
                        .col(
                            ColumnDef::new(Suppliers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        ContactPerson,
        Phone,
        Email,
        Notes,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000005_create_equipment_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_equipment_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Equipment::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Equipment::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Equipment::Name).string().not_null())
                        .col(ColumnDef::new(Equipment::Model).string().null())
                        .col(ColumnDef::new(Equipment::Manufacturer).string().null())
                        .col(ColumnDef::new(Equipment::UnitPrice).decimal().null())
                        .col(ColumnDef::new(Equipment::Description).text().null())
                        .col(
                            ColumnDef::new(Equipment::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Equipment::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Equipment::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EquipmentItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EquipmentItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EquipmentItems::EquipmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EquipmentItems::Imei).string().null())
                        .col(ColumnDef::new(EquipmentItems::SerialNumber).string().null())
                        .col(ColumnDef::new(EquipmentItems::Status).string().not_null())
                        .col(ColumnDef::new(EquipmentItems::WarehouseId).uuid().null())
                        .col(ColumnDef::new(EquipmentItems::SupplierId).uuid().null())
                        .col(ColumnDef::new(EquipmentItems::ClientId).uuid().null())
                        .col(ColumnDef::new(EquipmentItems::BidId).uuid().null())
                        .col(
                            ColumnDef::new(EquipmentItems::ReceivedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EquipmentItems::AssignedAt).timestamp().null())
                        .col(ColumnDef::new(EquipmentItems::Notes).text().null())
                        .col(
                            ColumnDef::new(EquipmentItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EquipmentItems::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // IMEI uniqueness; NULLs are exempt in both backends
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_equipment_items_imei")
                        .table(EquipmentItems::Table)
                        .col(EquipmentItems::Imei)
                        .unique()
                        .to_owned(),
                )
                .await?;

            for (name, col) in [
                ("idx_equipment_items_equipment_id", EquipmentItems::EquipmentId),
                ("idx_equipment_items_warehouse_id", EquipmentItems::WarehouseId),
                ("idx_equipment_items_client_id", EquipmentItems::ClientId),
                ("idx_equipment_items_bid_id", EquipmentItems::BidId),
                ("idx_equipment_items_status", EquipmentItems::Status),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(EquipmentItems::Table)
                            .col(col)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(EquipmentItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Equipment::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Equipment {
        Table,
        Id,
        Name,
        Model,
        Manufacturer,
        UnitPrice,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden, Clone, Copy)]
    enum EquipmentItems {
        Table,
        Id,
        EquipmentId,
        Imei,
        SerialNumber,
        Status,
        WarehouseId,
        SupplierId,
        ClientId,
        BidId,
        ReceivedAt,
        AssignedAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000006_create_bid_types_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000006_create_bid_types_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BidTypes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(BidTypes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(BidTypes::Name).string().not_null())
                        .col(ColumnDef::new(BidTypes::Description).text().null())
                        .col(ColumnDef::new(BidTypes::Statuses).json().not_null())
                        .col(ColumnDef::new(BidTypes::Transitions).json().not_null())
                        .col(
                            ColumnDef::new(BidTypes::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(BidTypes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(BidTypes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BidTypes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum BidTypes {
        Table,
        Id,
        Name,
        Description,
        Statuses,
        Transitions,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000007_create_bids_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000007_create_bids_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bids::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Bids::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Bids::Number).string().not_null())
                        .col(ColumnDef::new(Bids::BidTypeId).uuid().not_null())
                        .col(ColumnDef::new(Bids::ClientId).uuid().not_null())
                        .col(ColumnDef::new(Bids::ClientObjectId).uuid().null())
                        .col(ColumnDef::new(Bids::Status).string().not_null())
                        .col(ColumnDef::new(Bids::AssigneeId).uuid().null())
                        .col(ColumnDef::new(Bids::Title).string().not_null())
                        .col(ColumnDef::new(Bids::Description).text().null())
                        .col(ColumnDef::new(Bids::Amount).decimal().null())
                        .col(ColumnDef::new(Bids::ScheduledAt).timestamp().null())
                        .col(ColumnDef::new(Bids::ClosedAt).timestamp().null())
                        .col(ColumnDef::new(Bids::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Bids::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Bids::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bids_number")
                        .table(Bids::Table)
                        .col(Bids::Number)
                        .unique()
                        .to_owned(),
                )
                .await?;

            for (name, col) in [
                ("idx_bids_client_id", Bids::ClientId),
                ("idx_bids_bid_type_id", Bids::BidTypeId),
                ("idx_bids_status", Bids::Status),
                ("idx_bids_assignee_id", Bids::AssigneeId),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(Bids::Table)
                            .col(col)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Bids::Table).to_owned())
                .await
        }
    }

    #[derive(Iden, Clone, Copy)]
    enum Bids {
        Table,
        Id,
        Number,
        BidTypeId,
        ClientId,
        ClientObjectId,
        Status,
        AssigneeId,
        Title,
        Description,
        Amount,
        ScheduledAt,
        ClosedAt,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000008_create_notes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000008_create_notes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Notes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Notes::Title).string().not_null())
                        .col(ColumnDef::new(Notes::Body).text().null())
                        .col(ColumnDef::new(Notes::Lane).string().not_null())
                        .col(ColumnDef::new(Notes::Position).integer().not_null())
                        .col(ColumnDef::new(Notes::Color).string().null())
                        .col(ColumnDef::new(Notes::AuthorId).uuid().null())
                        .col(ColumnDef::new(Notes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Notes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notes_lane_position")
                        .table(Notes::Table)
                        .col(Notes::Lane)
                        .col(Notes::Position)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Notes {
        Table,
        Id,
        Title,
        Body,
        Lane,
        Position,
        Color,
        AuthorId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000009_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000009_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                        .col(ColumnDef::new(Users::FullName).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        FullName,
        Role,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000010_create_api_tokens_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000010_create_api_tokens_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ApiTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ApiTokens::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ApiTokens::Name).string().not_null())
                        .col(ColumnDef::new(ApiTokens::TokenHash).text().not_null())
                        .col(ColumnDef::new(ApiTokens::Prefix).string().not_null())
                        .col(ColumnDef::new(ApiTokens::UserId).uuid().not_null())
                        .col(ColumnDef::new(ApiTokens::Permissions).json().not_null())
                        .col(ColumnDef::new(ApiTokens::ExpiresAt).timestamp().null())
                        .col(ColumnDef::new(ApiTokens::LastUsedAt).timestamp().null())
                        .col(
                            ColumnDef::new(ApiTokens::Revoked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(ApiTokens::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_api_tokens_token_hash")
                        .table(ApiTokens::Table)
                        .col(ApiTokens::TokenHash)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ApiTokens::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ApiTokens {
        Table,
        Id,
        Name,
        TokenHash,
        Prefix,
        UserId,
        Permissions,
        ExpiresAt,
        LastUsedAt,
        Revoked,
        CreatedAt,
    }
}
