use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document kinds sharing the same header shape with different status
/// vocabularies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "bill")]
    Bill,
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
    #[sea_orm(string_value = "sales_return")]
    SalesReturn,
}

impl DocumentKind {
    /// Prefix used in generated document numbers.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::Bill => "BILL",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::SalesReturn => "SRN",
        }
    }

    /// Whether this kind settles through payments (as opposed to receipts).
    pub fn is_payable(&self) -> bool {
        !matches!(self, DocumentKind::PurchaseOrder)
    }
}

/// Closed status vocabulary across all document kinds. Which edges are legal
/// depends on the kind; see [`DocumentStatus::can_transition`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    #[sea_orm(string_value = "settled")]
    Settled,
    #[sea_orm(string_value = "partial_received")]
    PartialReceived,
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Settled | DocumentStatus::Received | DocumentStatus::Cancelled
        )
    }

    /// Explicit transition table, validated on every state change.
    /// A same-state "transition" is a no-op and always allowed.
    pub fn can_transition(kind: DocumentKind, from: DocumentStatus, to: DocumentStatus) -> bool {
        use DocumentStatus::*;

        if from == to {
            return true;
        }
        // Cancellation is reachable from any non-terminal state.
        if to == Cancelled {
            return !from.is_terminal();
        }

        match kind {
            DocumentKind::PurchaseOrder => matches!(
                (from, to),
                (Draft, Sent)
                    | (Sent, Confirmed)
                    | (Confirmed, PartialReceived)
                    | (Confirmed, Received)
                    | (PartialReceived, Received)
            ),
            // Invoice, Bill, SalesReturn settle through payments.
            _ => matches!(
                (from, to),
                (Draft, Sent)
                    | (Sent, PartiallyPaid)
                    | (Sent, Settled)
                    | (PartiallyPaid, Settled)
            ),
        }
    }

    /// Statuses from which a payable document accepts allocations.
    pub fn accepts_payment(&self) -> bool {
        matches!(self, DocumentStatus::Sent | DocumentStatus::PartiallyPaid)
    }

    /// Statuses from which a purchase order accepts goods receipts.
    pub fn accepts_receipt(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Confirmed | DocumentStatus::PartialReceived
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: DocumentKind,
    pub document_number: String,
    /// Customer for invoices/sales returns, vendor for bills/purchase orders.
    pub counterparty_id: Uuid,
    pub status: DocumentStatus,
    /// Place-of-supply pair driving the CGST/SGST vs IGST split.
    pub buyer_jurisdiction: String,
    pub seller_jurisdiction: String,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_cgst: Decimal,
    pub total_sgst: Decimal,
    pub total_igst: Decimal,
    pub freight_charges: Decimal,
    pub freight_tax_rate: Decimal,
    pub freight_tax: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub issue_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::document_line_item::Entity")]
    LineItems,
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    PurchaseOrderItems,
    #[sea_orm(has_many = "super::payment_allocation::Entity")]
    PaymentAllocations,
    #[sea_orm(has_many = "super::goods_receipt::Entity")]
    GoodsReceipts,
}

impl Related<super::document_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderItems.def()
    }
}

impl Related<super::payment_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentAllocations.def()
    }
}

impl Related<super::goods_receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoodsReceipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Outstanding amount, floored at zero.
    pub fn balance_due(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }

    pub fn is_paid(&self) -> bool {
        self.paid_amount >= self.total_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn doc(total: Decimal, paid: Decimal) -> Model {
        Model {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            kind: DocumentKind::Invoice,
            document_number: "INV-0001".into(),
            counterparty_id: Uuid::new_v4(),
            status: DocumentStatus::Sent,
            buyer_jurisdiction: "Tamil Nadu".into(),
            seller_jurisdiction: "Tamil Nadu".into(),
            subtotal: total,
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_cgst: Decimal::ZERO,
            total_sgst: Decimal::ZERO,
            total_igst: Decimal::ZERO,
            freight_charges: Decimal::ZERO,
            freight_tax_rate: Decimal::ZERO,
            freight_tax: Decimal::ZERO,
            total_amount: total,
            paid_amount: paid,
            issue_date: Utc::now(),
            due_date: None,
            notes: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn balance_due_floors_at_zero() {
        assert_eq!(doc(dec!(100), dec!(40)).balance_due(), dec!(60));
        assert_eq!(doc(dec!(100), dec!(120)).balance_due(), Decimal::ZERO);
    }

    #[test]
    fn is_paid_tracks_paid_amount() {
        assert!(!doc(dec!(100), dec!(99.99)).is_paid());
        assert!(doc(dec!(100), dec!(100)).is_paid());
        assert!(doc(dec!(100), dec!(120)).is_paid());
    }

    #[test]
    fn purchase_order_happy_path_transitions() {
        use DocumentStatus::*;
        let kind = DocumentKind::PurchaseOrder;
        for (from, to) in [
            (Draft, Sent),
            (Sent, Confirmed),
            (Confirmed, PartialReceived),
            (PartialReceived, Received),
            (Confirmed, Received),
        ] {
            assert!(DocumentStatus::can_transition(kind, from, to), "{:?}->{:?}", from, to);
        }
    }

    #[test]
    fn purchase_order_rejects_illegal_edges() {
        use DocumentStatus::*;
        let kind = DocumentKind::PurchaseOrder;
        for (from, to) in [
            (Draft, Received),
            (Sent, Received),
            (Received, PartialReceived),
            (Received, Sent),
            (Cancelled, Sent),
            (Draft, PartiallyPaid),
        ] {
            assert!(!DocumentStatus::can_transition(kind, from, to), "{:?}->{:?}", from, to);
        }
    }

    #[test]
    fn cancellation_only_from_non_terminal() {
        use DocumentStatus::*;
        let kind = DocumentKind::Invoice;
        assert!(DocumentStatus::can_transition(kind, Draft, Cancelled));
        assert!(DocumentStatus::can_transition(kind, PartiallyPaid, Cancelled));
        assert!(!DocumentStatus::can_transition(kind, Settled, Cancelled));
    }

    #[test]
    fn invoice_settlement_edges() {
        use DocumentStatus::*;
        let kind = DocumentKind::Invoice;
        assert!(DocumentStatus::can_transition(kind, Sent, Settled));
        assert!(DocumentStatus::can_transition(kind, Sent, PartiallyPaid));
        assert!(DocumentStatus::can_transition(kind, PartiallyPaid, Settled));
        assert!(!DocumentStatus::can_transition(kind, Draft, Settled));
        assert!(!DocumentStatus::can_transition(kind, Settled, PartiallyPaid));
    }
}
