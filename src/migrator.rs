use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_customers_table::Migration),
            Box::new(m20240101_000002_create_pets_table::Migration),
            Box::new(m20240101_000003_create_appointments_table::Migration),
            Box::new(m20240101_000004_create_inventory_records_table::Migration),
            Box::new(m20240101_000005_create_invoice_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::FirstName).string().not_null())
                        .col(ColumnDef::new(Customers::LastName).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_last_name")
                        .table(Customers::Table)
                        .col(Customers::LastName)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        FirstName,
        LastName,
        Email,
        Phone,
        Address,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_pets_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_pets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Pets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Pets::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Pets::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Pets::Name).string().not_null())
                        .col(ColumnDef::new(Pets::Species).string().not_null())
                        .col(ColumnDef::new(Pets::Breed).string().null())
                        .col(ColumnDef::new(Pets::BirthDate).date().null())
                        .col(ColumnDef::new(Pets::Sex).string().null())
                        .col(ColumnDef::new(Pets::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Pets::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pets_customer_id")
                        .table(Pets::Table)
                        .col(Pets::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Pets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Pets {
        Table,
        Id,
        CustomerId,
        Name,
        Species,
        Breed,
        BirthDate,
        Sex,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_appointments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_appointments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Appointments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Appointments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Appointments::BranchId).uuid().not_null())
                        .col(ColumnDef::new(Appointments::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Appointments::PetId).uuid().not_null())
                        .col(ColumnDef::new(Appointments::ServiceId).uuid().not_null())
                        .col(ColumnDef::new(Appointments::DoctorId).uuid().null())
                        .col(
                            ColumnDef::new(Appointments::ScheduledAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Appointments::Status)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Appointments::Notes).string().null())
                        .col(
                            ColumnDef::new(Appointments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Appointments::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Availability checks filter on doctor + time
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_appointments_doctor_scheduled_at")
                        .table(Appointments::Table)
                        .col(Appointments::DoctorId)
                        .col(Appointments::ScheduledAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_appointments_customer_id")
                        .table(Appointments::Table)
                        .col(Appointments::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Appointments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Appointments {
        Table,
        Id,
        BranchId,
        CustomerId,
        PetId,
        ServiceId,
        DoctorId,
        ScheduledAt,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_inventory_records_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_inventory_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryRecords::BranchId).uuid().not_null())
                        .col(
                            ColumnDef::new(InventoryRecords::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::QuantityOnHand)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::SellingPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_branch_product")
                        .table(InventoryRecords::Table)
                        .col(InventoryRecords::BranchId)
                        .col(InventoryRecords::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryRecords {
        Table,
        Id,
        BranchId,
        ProductId,
        QuantityOnHand,
        SellingPrice,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_invoice_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_invoice_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Invoices::BranchId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::StaffId).uuid().not_null())
                        .col(
                            ColumnDef::new(Invoices::OriginalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::FinalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Invoices::PaymentMethod).string().not_null())
                        .col(
                            ColumnDef::new(Invoices::PaymentStatus)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_customer_id")
                        .table(Invoices::Table)
                        .col(Invoices::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_branch_created_at")
                        .table(Invoices::Table)
                        .col(Invoices::BranchId)
                        .col(Invoices::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InvoiceServiceLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceServiceLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceServiceLines::InvoiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceServiceLines::LineNo)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceServiceLines::ServiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceServiceLines::AppointmentId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(InvoiceServiceLines::PetId).uuid().null())
                        .col(
                            ColumnDef::new(InvoiceServiceLines::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceServiceLines::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceServiceLines::LineAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceServiceLines::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InvoiceServiceLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_service_lines_invoice")
                                .from(InvoiceServiceLines::Table, InvoiceServiceLines::InvoiceId)
                                .to(Invoices::Table, Invoices::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_service_lines_invoice_line")
                        .table(InvoiceServiceLines::Table)
                        .col(InvoiceServiceLines::InvoiceId)
                        .col(InvoiceServiceLines::LineNo)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InvoiceProductLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceProductLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceProductLines::InvoiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceProductLines::LineNo)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceProductLines::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceProductLines::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceProductLines::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceProductLines::LineAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceProductLines::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InvoiceProductLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_product_lines_invoice")
                                .from(InvoiceProductLines::Table, InvoiceProductLines::InvoiceId)
                                .to(Invoices::Table, Invoices::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_product_lines_invoice_line")
                        .table(InvoiceProductLines::Table)
                        .col(InvoiceProductLines::InvoiceId)
                        .col(InvoiceProductLines::LineNo)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // No unique constraint on (invoice_id, pet_id): duplicate pet ids
            // in a submission are preserved as duplicate rows.
            manager
                .create_table(
                    Table::create()
                        .table(InvoicePets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoicePets::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoicePets::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(InvoicePets::PetId).uuid().not_null())
                        .col(ColumnDef::new(InvoicePets::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_pets_invoice")
                                .from(InvoicePets::Table, InvoicePets::InvoiceId)
                                .to(Invoices::Table, Invoices::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_pets_invoice_id")
                        .table(InvoicePets::Table)
                        .col(InvoicePets::InvoiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InvoicePets::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InvoiceProductLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InvoiceServiceLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Invoices {
        Table,
        Id,
        BranchId,
        CustomerId,
        StaffId,
        OriginalAmount,
        DiscountAmount,
        FinalAmount,
        PaymentMethod,
        PaymentStatus,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum InvoiceServiceLines {
        Table,
        Id,
        InvoiceId,
        LineNo,
        ServiceId,
        AppointmentId,
        PetId,
        Quantity,
        UnitPrice,
        LineAmount,
        DiscountAmount,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum InvoiceProductLines {
        Table,
        Id,
        InvoiceId,
        LineNo,
        ProductId,
        Quantity,
        UnitPrice,
        LineAmount,
        DiscountAmount,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum InvoicePets {
        Table,
        Id,
        InvoiceId,
        PetId,
        CreatedAt,
    }
}
