use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        document::{self, DocumentKind, DocumentStatus, Entity as DocumentEntity},
        goods_receipt, goods_receipt_item,
        inventory_audit_log::InventoryAction,
        purchase_order_item::{self, Entity as PurchaseOrderItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::documents::DocumentService,
    services::inventory::InventoryService,
    services::numbering::{self, SequenceKind},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLineRequest {
    pub po_item_id: Uuid,
    pub quantity_received: Decimal,
    pub quantity_accepted: Decimal,
    pub quantity_rejected: Decimal,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReceiptRequest {
    pub account_id: Uuid,
    /// The purchase order being received against.
    pub document_id: Uuid,
    #[validate(length(min = 1, message = "at least one receipt line is required"))]
    pub lines: Vec<ReceiptLineRequest>,
    pub notes: Option<String>,
    pub received_by: Uuid,
}

#[derive(Debug, Clone)]
pub struct ReceiptOutcome {
    pub receipt: goods_receipt::Model,
    pub items: Vec<goods_receipt_item::Model>,
    pub order_status: DocumentStatus,
}

/// Receipt-line conservation: accepted and rejected quantities must account
/// for exactly what arrived.
pub fn validate_receipt_line(line: &ReceiptLineRequest) -> Result<(), ServiceError> {
    if line.quantity_received <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "Received quantity must be positive".to_string(),
        ));
    }
    if line.quantity_accepted < Decimal::ZERO || line.quantity_rejected < Decimal::ZERO {
        return Err(ServiceError::Validation(
            "Accepted and rejected quantities must be non-negative".to_string(),
        ));
    }
    if line.quantity_accepted + line.quantity_rejected != line.quantity_received {
        return Err(ServiceError::Validation(format!(
            "Accepted {} plus rejected {} must equal received {}",
            line.quantity_accepted, line.quantity_rejected, line.quantity_received
        )));
    }
    Ok(())
}

/// Over-receipt guard: the order line never accepts beyond what was ordered.
pub fn check_over_receipt(
    already_received: Decimal,
    quantity_accepted: Decimal,
    quantity_ordered: Decimal,
) -> Result<(), ServiceError> {
    if already_received + quantity_accepted > quantity_ordered {
        return Err(ServiceError::Conflict(format!(
            "Cannot receive more than ordered: ordered {}, already received {}, accepting {}",
            quantity_ordered, already_received, quantity_accepted
        )));
    }
    Ok(())
}

/// Derives a purchase order's status from its lines' receipt progress.
/// The status is computed, never set directly by callers.
pub fn derive_order_status(
    items: &[purchase_order_item::Model],
    current: DocumentStatus,
) -> DocumentStatus {
    let total_items = items.len();
    let received_items = items.iter().filter(|i| i.is_fully_received()).count();
    let any_received = items
        .iter()
        .any(|i| i.received_quantity > Decimal::ZERO);

    if total_items > 0 && received_items == total_items {
        DocumentStatus::Received
    } else if any_received {
        DocumentStatus::PartialReceived
    } else {
        current
    }
}

/// Receives goods against purchase orders: receipt rows, order-line
/// progress, inventory additions, and the derived order status, all in one
/// transaction.
#[derive(Clone)]
pub struct FulfillmentService {
    db: Arc<DatabaseConnection>,
    inventory: Arc<InventoryService>,
    documents: Arc<DocumentService>,
    event_sender: Option<EventSender>,
}

impl FulfillmentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        inventory: Arc<InventoryService>,
        documents: Arc<DocumentService>,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            db,
            inventory,
            documents,
            event_sender,
        }
    }

    /// Processes one delivery. Every line is validated before anything is
    /// written; an over-receipt on any line fails the whole receipt.
    #[instrument(skip(self, request), fields(document_id = %request.document_id))]
    pub async fn create_receipt(
        &self,
        request: CreateReceiptRequest,
    ) -> Result<ReceiptOutcome, ServiceError> {
        request.validate()?;
        for line in &request.lines {
            validate_receipt_line(line)?;
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let now = Utc::now();

        let order = DocumentEntity::find_by_id(request.document_id)
            .filter(document::Column::AccountId.eq(request.account_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Purchase order", request.document_id))?;

        if order.kind != DocumentKind::PurchaseOrder {
            return Err(ServiceError::Conflict(format!(
                "Document {} is not a purchase order",
                request.document_id
            )));
        }
        if !order.status.accepts_receipt() {
            return Err(ServiceError::Conflict(format!(
                "Purchase order {} does not accept receipts in status {:?}",
                request.document_id, order.status
            )));
        }

        let receipt_number = numbering::next_number(
            &txn,
            request.account_id,
            SequenceKind::GoodsReceipt,
            now.year(),
        )
        .await?;

        let receipt_id = Uuid::new_v4();
        let receipt = goods_receipt::ActiveModel {
            id: Set(receipt_id),
            account_id: Set(request.account_id),
            receipt_number: Set(receipt_number.clone()),
            document_id: Set(request.document_id),
            received_by: Set(request.received_by),
            notes: Set(request.notes.clone()),
            created_at: Set(now),
        };
        let receipt = receipt.insert(&txn).await.map_err(ServiceError::db_error)?;

        let mut items = Vec::with_capacity(request.lines.len());
        let mut total_accepted = Decimal::ZERO;

        for line in &request.lines {
            let item = self
                .receive_line(&txn, &request, receipt_id, line, now)
                .await?;
            total_accepted += item.quantity_accepted;
            items.push(item);
        }

        // Re-read the order lines and derive the new status from aggregate
        // progress.
        let order_items = PurchaseOrderItemEntity::find()
            .filter(purchase_order_item::Column::DocumentId.eq(request.document_id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let old_status = order.status;
        let new_status = derive_order_status(&order_items, old_status);
        if new_status != old_status {
            if !DocumentStatus::can_transition(DocumentKind::PurchaseOrder, old_status, new_status)
            {
                return Err(ServiceError::InvalidTransition(format!(
                    "{:?} -> {:?} is not allowed for a purchase order",
                    old_status, new_status
                )));
            }
            let mut active: document::ActiveModel = order.into();
            active.status = Set(new_status);
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(ServiceError::db_error)?;
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::PurchaseOrderReceived {
                    document_id: request.document_id,
                    receipt_id,
                    accepted_quantity: total_accepted,
                })
                .await;
            if new_status != old_status {
                sender
                    .send_or_log(Event::PurchaseOrderStatusChanged {
                        document_id: request.document_id,
                        old_status,
                        new_status,
                    })
                    .await;
            }
        }

        info!(
            document_id = %request.document_id,
            number = %receipt_number,
            lines = items.len(),
            accepted = %total_accepted,
            status = ?new_status,
            "goods receipt processed"
        );

        Ok(ReceiptOutcome {
            receipt,
            items,
            order_status: new_status,
        })
    }

    /// Manual edges of the order machine.
    pub async fn mark_sent(
        &self,
        account_id: Uuid,
        document_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        self.documents
            .transition_status(account_id, document_id, DocumentStatus::Sent)
            .await
    }

    pub async fn confirm_order(
        &self,
        account_id: Uuid,
        document_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        self.documents
            .transition_status(account_id, document_id, DocumentStatus::Confirmed)
            .await
    }

    pub async fn cancel_order(
        &self,
        account_id: Uuid,
        document_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        self.documents
            .transition_status(account_id, document_id, DocumentStatus::Cancelled)
            .await
    }

    /// Receives one line: locks the order line, guards against over-receipt,
    /// advances its progress, and books accepted stock.
    async fn receive_line(
        &self,
        txn: &DatabaseTransaction,
        request: &CreateReceiptRequest,
        receipt_id: Uuid,
        line: &ReceiptLineRequest,
        now: chrono::DateTime<Utc>,
    ) -> Result<goods_receipt_item::Model, ServiceError> {
        let po_item = PurchaseOrderItemEntity::find_by_id(line.po_item_id)
            .filter(purchase_order_item::Column::DocumentId.eq(request.document_id))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Purchase order item", line.po_item_id))?;

        check_over_receipt(
            po_item.received_quantity,
            line.quantity_accepted,
            po_item.quantity_ordered,
        )?;

        let item_id = po_item.item_id;
        let new_received = po_item.received_quantity + line.quantity_accepted;

        let mut active: purchase_order_item::ActiveModel = po_item.into();
        active.received_quantity = Set(new_received);
        active.updated_at = Set(now);
        active.update(txn).await.map_err(ServiceError::db_error)?;

        if line.quantity_accepted > Decimal::ZERO {
            self.inventory
                .adjust_stock_within(
                    txn,
                    request.account_id,
                    item_id,
                    line.quantity_accepted,
                    InventoryAction::ReceiptAddition,
                    Some("goods_receipt"),
                    Some(receipt_id),
                    request.received_by,
                )
                .await?;
        }

        let row = goods_receipt_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            receipt_id: Set(receipt_id),
            po_item_id: Set(line.po_item_id),
            item_id: Set(item_id),
            quantity_received: Set(line.quantity_received),
            quantity_accepted: Set(line.quantity_accepted),
            quantity_rejected: Set(line.quantity_rejected),
            rejection_reason: Set(line.rejection_reason.clone()),
            created_at: Set(now),
        };
        row.insert(txn).await.map_err(ServiceError::db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn po_item(ordered: Decimal, received: Decimal) -> purchase_order_item::Model {
        let now = Utc::now();
        purchase_order_item::Model {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            quantity_ordered: ordered,
            received_quantity: received,
            unit_price: dec!(10),
            created_at: now,
            updated_at: now,
        }
    }

    fn line(received: Decimal, accepted: Decimal, rejected: Decimal) -> ReceiptLineRequest {
        ReceiptLineRequest {
            po_item_id: Uuid::new_v4(),
            quantity_received: received,
            quantity_accepted: accepted,
            quantity_rejected: rejected,
            rejection_reason: None,
        }
    }

    #[test]
    fn conservation_must_hold_per_line() {
        assert!(validate_receipt_line(&line(dec!(10), dec!(7), dec!(3))).is_ok());
        let err = validate_receipt_line(&line(dec!(10), dec!(7), dec!(2))).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn zero_or_negative_receipts_are_rejected() {
        assert!(validate_receipt_line(&line(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)).is_err());
        assert!(validate_receipt_line(&line(dec!(5), dec!(6), dec!(-1))).is_err());
    }

    #[test]
    fn over_receipt_is_a_conflict() {
        let err = check_over_receipt(dec!(8), dec!(5), dec!(10)).unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert!(check_over_receipt(dec!(8), dec!(2), dec!(10)).is_ok());
    }

    #[test]
    fn untouched_order_keeps_its_status() {
        let items = vec![po_item(dec!(10), Decimal::ZERO), po_item(dec!(10), Decimal::ZERO)];
        assert_eq!(
            derive_order_status(&items, DocumentStatus::Confirmed),
            DocumentStatus::Confirmed
        );
    }

    #[test]
    fn one_complete_line_of_two_is_partial() {
        // First delivery covers item A in full, item B untouched.
        let items = vec![po_item(dec!(10), dec!(10)), po_item(dec!(10), Decimal::ZERO)];
        assert_eq!(
            derive_order_status(&items, DocumentStatus::Confirmed),
            DocumentStatus::PartialReceived
        );
    }

    #[test]
    fn all_lines_complete_means_received() {
        // Second delivery completes item B.
        let items = vec![po_item(dec!(10), dec!(10)), po_item(dec!(10), dec!(10))];
        assert_eq!(
            derive_order_status(&items, DocumentStatus::PartialReceived),
            DocumentStatus::Received
        );
    }

    #[test]
    fn partially_received_line_is_not_complete() {
        let items = vec![po_item(dec!(10), dec!(9.5))];
        assert_eq!(
            derive_order_status(&items, DocumentStatus::Confirmed),
            DocumentStatus::PartialReceived
        );
    }

    #[test]
    fn empty_order_never_derives_received() {
        assert_eq!(
            derive_order_status(&[], DocumentStatus::Confirmed),
            DocumentStatus::Confirmed
        );
    }
}
