use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-line quantities for one receipt.
///
/// Invariant: `quantity_accepted + quantity_rejected = quantity_received`.
/// Only accepted quantity counts toward the order line and inventory.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goods_receipt_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub po_item_id: Uuid,
    pub item_id: Uuid,
    pub quantity_received: Decimal,
    pub quantity_accepted: Decimal,
    pub quantity_rejected: Decimal,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::goods_receipt::Entity",
        from = "Column::ReceiptId",
        to = "super::goods_receipt::Column::Id"
    )]
    Receipt,
    #[sea_orm(
        belongs_to = "super::purchase_order_item::Entity",
        from = "Column::PoItemId",
        to = "super::purchase_order_item::Column::Id"
    )]
    PurchaseOrderItem,
}

impl Related<super::goods_receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipt.def()
    }
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
