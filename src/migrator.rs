use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_inventory_tables::Migration),
            Box::new(m20250101_000002_create_documents_tables::Migration),
            Box::new(m20250101_000003_create_purchasing_tables::Migration),
            Box::new(m20250101_000004_create_credits_tables::Migration),
            Box::new(m20250101_000005_create_payments_tables::Migration),
            Box::new(m20250101_000006_create_number_sequences_table::Migration),
        ]
    }
}

mod m20250101_000001_create_inventory_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::AccountId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                        .col(ColumnDef::new(InventoryItems::Sku).string().null())
                        .col(ColumnDef::new(InventoryItems::Unit).string().null())
                        .col(
                            ColumnDef::new(InventoryItems::CurrentStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::TaxRate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_account_id")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::AccountId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryAuditLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryAuditLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAuditLogs::AccountId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryAuditLogs::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(InventoryAuditLogs::Action)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAuditLogs::QuantityBefore)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAuditLogs::QuantityAfter)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAuditLogs::QuantityDelta)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAuditLogs::ReferenceType)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAuditLogs::ReferenceId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAuditLogs::PerformedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAuditLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_audit_logs_item_id")
                                .from(InventoryAuditLogs::Table, InventoryAuditLogs::ItemId)
                                .to(InventoryItems::Table, InventoryItems::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_audit_logs_item_id")
                        .table(InventoryAuditLogs::Table)
                        .col(InventoryAuditLogs::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryAuditLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryItems {
        Table,
        Id,
        AccountId,
        Name,
        Sku,
        Unit,
        CurrentStock,
        UnitPrice,
        TaxRate,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryAuditLogs {
        Table,
        Id,
        AccountId,
        ItemId,
        Action,
        QuantityBefore,
        QuantityAfter,
        QuantityDelta,
        ReferenceType,
        ReferenceId,
        PerformedBy,
        CreatedAt,
    }
}

mod m20250101_000002_create_documents_tables {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_inventory_tables::InventoryItems;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_documents_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Documents::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Documents::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Documents::AccountId).uuid().not_null())
                        .col(ColumnDef::new(Documents::Kind).string().not_null())
                        .col(
                            ColumnDef::new(Documents::DocumentNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Documents::CounterpartyId).uuid().not_null())
                        .col(ColumnDef::new(Documents::Status).string().not_null())
                        .col(
                            ColumnDef::new(Documents::BuyerJurisdiction)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Documents::SellerJurisdiction)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Documents::Subtotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::TaxAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::TotalCgst)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::TotalSgst)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::TotalIgst)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::FreightCharges)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::FreightTaxRate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::FreightTax)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::PaidAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::IssueDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Documents::DueDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Documents::Notes).string().null())
                        .col(ColumnDef::new(Documents::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Documents::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Documents::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_documents_account_kind_status")
                        .table(Documents::Table)
                        .col(Documents::AccountId)
                        .col(Documents::Kind)
                        .col(Documents::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_documents_counterparty_id")
                        .table(Documents::Table)
                        .col(Documents::CounterpartyId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_documents_document_number")
                        .table(Documents::Table)
                        .col(Documents::AccountId)
                        .col(Documents::DocumentNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DocumentLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DocumentLineItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::DocumentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DocumentLineItems::ItemId).uuid().null())
                        .col(
                            ColumnDef::new(DocumentLineItems::ItemName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DocumentLineItems::ItemSku).string().null())
                        .col(
                            ColumnDef::new(DocumentLineItems::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::TaxRate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::BaseAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::CgstRate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::SgstRate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::IgstRate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::CgstAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::SgstAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::IgstAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::TaxAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::LineTotal)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLineItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_document_line_items_document_id")
                                .from(DocumentLineItems::Table, DocumentLineItems::DocumentId)
                                .to(Documents::Table, Documents::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_document_line_items_item_id")
                                .from(DocumentLineItems::Table, DocumentLineItems::ItemId)
                                .to(InventoryItems::Table, InventoryItems::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_document_line_items_document_id")
                        .table(DocumentLineItems::Table)
                        .col(DocumentLineItems::DocumentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DocumentLineItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Documents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Documents {
        Table,
        Id,
        AccountId,
        Kind,
        DocumentNumber,
        CounterpartyId,
        Status,
        BuyerJurisdiction,
        SellerJurisdiction,
        Subtotal,
        DiscountAmount,
        TaxAmount,
        TotalCgst,
        TotalSgst,
        TotalIgst,
        FreightCharges,
        FreightTaxRate,
        FreightTax,
        TotalAmount,
        PaidAmount,
        IssueDate,
        DueDate,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DocumentLineItems {
        Table,
        Id,
        DocumentId,
        ItemId,
        ItemName,
        ItemSku,
        Quantity,
        UnitPrice,
        DiscountAmount,
        TaxRate,
        BaseAmount,
        CgstRate,
        SgstRate,
        IgstRate,
        CgstAmount,
        SgstAmount,
        IgstAmount,
        TaxAmount,
        LineTotal,
        CreatedAt,
    }
}

mod m20250101_000003_create_purchasing_tables {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_inventory_tables::InventoryItems;
    use super::m20250101_000002_create_documents_tables::Documents;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_purchasing_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::DocumentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderItems::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrderItems::QuantityOrdered)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::ReceivedQuantity)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_items_document_id")
                                .from(PurchaseOrderItems::Table, PurchaseOrderItems::DocumentId)
                                .to(Documents::Table, Documents::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_items_item_id")
                                .from(PurchaseOrderItems::Table, PurchaseOrderItems::ItemId)
                                .to(InventoryItems::Table, InventoryItems::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_order_items_document_id")
                        .table(PurchaseOrderItems::Table)
                        .col(PurchaseOrderItems::DocumentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(GoodsReceipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GoodsReceipts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceipts::AccountId).uuid().not_null())
                        .col(
                            ColumnDef::new(GoodsReceipts::ReceiptNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceipts::DocumentId).uuid().not_null())
                        .col(ColumnDef::new(GoodsReceipts::ReceivedBy).uuid().not_null())
                        .col(ColumnDef::new(GoodsReceipts::Notes).string().null())
                        .col(
                            ColumnDef::new(GoodsReceipts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_goods_receipts_document_id")
                                .from(GoodsReceipts::Table, GoodsReceipts::DocumentId)
                                .to(Documents::Table, Documents::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(GoodsReceiptItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GoodsReceiptItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::ReceiptId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::PoItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceiptItems::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(GoodsReceiptItems::QuantityReceived)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::QuantityAccepted)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::QuantityRejected)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::RejectionReason)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_goods_receipt_items_receipt_id")
                                .from(GoodsReceiptItems::Table, GoodsReceiptItems::ReceiptId)
                                .to(GoodsReceipts::Table, GoodsReceipts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_goods_receipt_items_po_item_id")
                                .from(GoodsReceiptItems::Table, GoodsReceiptItems::PoItemId)
                                .to(PurchaseOrderItems::Table, PurchaseOrderItems::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_goods_receipt_items_po_item_id")
                        .table(GoodsReceiptItems::Table)
                        .col(GoodsReceiptItems::PoItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(GoodsReceiptItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(GoodsReceipts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderItems {
        Table,
        Id,
        DocumentId,
        ItemId,
        QuantityOrdered,
        ReceivedQuantity,
        UnitPrice,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum GoodsReceipts {
        Table,
        Id,
        AccountId,
        ReceiptNumber,
        DocumentId,
        ReceivedBy,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum GoodsReceiptItems {
        Table,
        Id,
        ReceiptId,
        PoItemId,
        ItemId,
        QuantityReceived,
        QuantityAccepted,
        QuantityRejected,
        RejectionReason,
        CreatedAt,
    }
}

mod m20250101_000004_create_credits_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_credits_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Credits::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Credits::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Credits::AccountId).uuid().not_null())
                        .col(ColumnDef::new(Credits::CreditNumber).string().not_null())
                        .col(ColumnDef::new(Credits::Party).string().not_null())
                        .col(ColumnDef::new(Credits::CounterpartyId).uuid().not_null())
                        .col(ColumnDef::new(Credits::Origin).string().not_null())
                        .col(
                            ColumnDef::new(Credits::OriginalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Credits::UsedAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Credits::RemainingAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Credits::Status).string().not_null())
                        .col(
                            ColumnDef::new(Credits::IssueDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Credits::ExpiryDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Credits::AutoExpire)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Credits::Reason).string().null())
                        .col(ColumnDef::new(Credits::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Credits::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Credits::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_credits_counterparty_status")
                        .table(Credits::Table)
                        .col(Credits::AccountId)
                        .col(Credits::CounterpartyId)
                        .col(Credits::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CreditTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CreditTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::CreditId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::RunningBalance)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::ReferenceType)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::ReferenceId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(CreditTransactions::Notes).string().null())
                        .col(
                            ColumnDef::new(CreditTransactions::PerformedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_credit_transactions_credit_id")
                                .from(CreditTransactions::Table, CreditTransactions::CreditId)
                                .to(Credits::Table, Credits::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_credit_transactions_credit_id")
                        .table(CreditTransactions::Table)
                        .col(CreditTransactions::CreditId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_credit_transactions_reference")
                        .table(CreditTransactions::Table)
                        .col(CreditTransactions::ReferenceType)
                        .col(CreditTransactions::ReferenceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CreditTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Credits::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Credits {
        Table,
        Id,
        AccountId,
        CreditNumber,
        Party,
        CounterpartyId,
        Origin,
        OriginalAmount,
        UsedAmount,
        RemainingAmount,
        Status,
        IssueDate,
        ExpiryDate,
        AutoExpire,
        Reason,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CreditTransactions {
        Table,
        Id,
        CreditId,
        TransactionType,
        Amount,
        RunningBalance,
        ReferenceType,
        ReferenceId,
        Notes,
        PerformedBy,
        CreatedAt,
    }
}

mod m20250101_000005_create_payments_tables {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000002_create_documents_tables::Documents;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_payments_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::AccountId).uuid().not_null())
                        .col(ColumnDef::new(Payments::PaymentNumber).string().not_null())
                        .col(ColumnDef::new(Payments::CounterpartyId).uuid().not_null())
                        .col(ColumnDef::new(Payments::Direction).string().not_null())
                        .col(ColumnDef::new(Payments::Method).string().not_null())
                        .col(ColumnDef::new(Payments::Status).string().not_null())
                        .col(ColumnDef::new(Payments::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(Payments::CreditApplied)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Payments::PaymentDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::Reference).string().null())
                        .col(ColumnDef::new(Payments::Notes).string().null())
                        .col(ColumnDef::new(Payments::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Payments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payments::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_counterparty_id")
                        .table(Payments::Table)
                        .col(Payments::AccountId)
                        .col(Payments::CounterpartyId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PaymentAllocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentAllocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentAllocations::PaymentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentAllocations::DocumentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentAllocations::AmountAllocated)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentAllocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_allocations_payment_id")
                                .from(PaymentAllocations::Table, PaymentAllocations::PaymentId)
                                .to(Payments::Table, Payments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_allocations_document_id")
                                .from(PaymentAllocations::Table, PaymentAllocations::DocumentId)
                                .to(Documents::Table, Documents::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payment_allocations_payment_id")
                        .table(PaymentAllocations::Table)
                        .col(PaymentAllocations::PaymentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payment_allocations_document_id")
                        .table(PaymentAllocations::Table)
                        .col(PaymentAllocations::DocumentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PaymentAllocations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        AccountId,
        PaymentNumber,
        CounterpartyId,
        Direction,
        Method,
        Status,
        Amount,
        CreditApplied,
        PaymentDate,
        Reference,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PaymentAllocations {
        Table,
        Id,
        PaymentId,
        DocumentId,
        AmountAllocated,
        CreatedAt,
    }
}

mod m20250101_000006_create_number_sequences_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_number_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(NumberSequences::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(NumberSequences::AccountId).uuid().not_null())
                        .col(
                            ColumnDef::new(NumberSequences::SequenceKind)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NumberSequences::Year)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NumberSequences::LastValue)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(NumberSequences::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(NumberSequences::AccountId)
                                .col(NumberSequences::SequenceKind)
                                .col(NumberSequences::Year),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(NumberSequences::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum NumberSequences {
        Table,
        AccountId,
        SequenceKind,
        Year,
        LastValue,
        UpdatedAt,
    }
}
