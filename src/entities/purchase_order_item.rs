use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered line on a purchase order.
///
/// `received_quantity` is monotonically non-decreasing and never exceeds
/// `quantity_ordered`; receipts are rejected rather than over-received.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub document_id: Uuid,
    pub item_id: Uuid,
    pub quantity_ordered: Decimal,
    pub received_quantity: Decimal,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::document::Entity",
        from = "Column::DocumentId",
        to = "super::document::Column::Id"
    )]
    Document,
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::ItemId",
        to = "super::inventory_item::Column::Id"
    )]
    InventoryItem,
    #[sea_orm(has_many = "super::goods_receipt_item::Entity")]
    ReceiptItems,
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItem.def()
    }
}

impl Related<super::goods_receipt_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceiptItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the ordered quantity has arrived in full.
    pub fn is_fully_received(&self) -> bool {
        self.received_quantity >= self.quantity_ordered
    }

    pub fn outstanding_quantity(&self) -> Decimal {
        (self.quantity_ordered - self.received_quantity).max(Decimal::ZERO)
    }
}
