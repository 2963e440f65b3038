use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum InventoryAction {
    /// Stock deducted when an invoice is created.
    #[sea_orm(string_value = "invoice_deduction")]
    InvoiceDeduction,
    /// Deduction restored when an invoice is deleted.
    #[sea_orm(string_value = "invoice_reversal")]
    InvoiceReversal,
    /// Stock added when a purchase-order receipt is accepted.
    #[sea_orm(string_value = "receipt_addition")]
    ReceiptAddition,
    #[sea_orm(string_value = "manual_adjustment")]
    ManualAdjustment,
}

/// Append-only audit entry; written in the same transaction as every stock
/// mutation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub item_id: Uuid,
    pub action: InventoryAction,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub quantity_delta: Decimal,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub performed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::ItemId",
        to = "super::inventory_item::Column::Id"
    )]
    InventoryItem,
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
