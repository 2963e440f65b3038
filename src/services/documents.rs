use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, ModelTrait, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        document::{self, DocumentKind, DocumentStatus, Entity as DocumentEntity},
        document_line_item::{self, Entity as LineItemEntity},
        inventory_audit_log::InventoryAction,
        inventory_item::{self, Entity as InventoryItemEntity},
        purchase_order_item,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::InventoryService,
    services::numbering::{self, SequenceKind},
    services::tax::{calculate_line_tax, round_money, LineTaxInput, TaxBreakdown},
};

/// One requested line. Name/sku default to the catalog snapshot when
/// `item_id` is given; free-form lines must carry their own name.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItemInput {
    pub item_id: Option<Uuid>,
    #[validate(length(min = 1, max = 256, message = "item name must be 1-256 characters"))]
    pub item_name: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub tax_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    pub account_id: Uuid,
    pub kind: DocumentKind,
    pub counterparty_id: Uuid,
    #[validate(length(min = 1, message = "buyer jurisdiction is required"))]
    pub buyer_jurisdiction: String,
    #[validate(length(min = 1, message = "seller jurisdiction is required"))]
    pub seller_jurisdiction: String,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub freight_charges: Decimal,
    #[serde(default)]
    pub freight_tax_rate: Decimal,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "at least one line item is required"))]
    pub line_items: Vec<LineItemInput>,
    pub created_by: Uuid,
}

/// A line after tax computation, ready to persist and aggregate.
#[derive(Debug, Clone)]
pub struct ComputedLine {
    pub item_id: Option<Uuid>,
    pub item_name: String,
    pub item_sku: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_amount: Decimal,
    pub tax_rate: Decimal,
    pub breakdown: TaxBreakdown,
}

/// Header totals derived from a document's lines plus freight.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_cgst: Decimal,
    pub total_sgst: Decimal,
    pub total_igst: Decimal,
    pub freight_tax: Decimal,
    pub total_amount: Decimal,
}

/// Sums computed lines into header totals. Freight is a single extra charge
/// with its own tax rate, added after the line-item totals.
pub fn aggregate_totals(
    lines: &[ComputedLine],
    freight_charges: Decimal,
    freight_tax_rate: Decimal,
) -> DocumentTotals {
    let subtotal: Decimal = lines.iter().map(|l| l.breakdown.base_amount).sum();
    let discount_amount: Decimal = lines.iter().map(|l| l.discount_amount).sum();
    let total_cgst: Decimal = lines.iter().map(|l| l.breakdown.cgst_amount).sum();
    let total_sgst: Decimal = lines.iter().map(|l| l.breakdown.sgst_amount).sum();
    let total_igst: Decimal = lines.iter().map(|l| l.breakdown.igst_amount).sum();
    let tax_amount: Decimal = lines.iter().map(|l| l.breakdown.tax_amount).sum();
    let freight_tax = round_money(freight_charges * freight_tax_rate / Decimal::ONE_HUNDRED);

    DocumentTotals {
        subtotal,
        discount_amount,
        tax_amount,
        total_cgst,
        total_sgst,
        total_igst,
        freight_tax,
        total_amount: subtotal + tax_amount + freight_charges + freight_tax,
    }
}

/// Document service: creation, atomic line replacement with total
/// recomputation, deletion, and the manual status edges.
#[derive(Clone)]
pub struct DocumentService {
    db: Arc<DatabaseConnection>,
    inventory: Arc<InventoryService>,
    event_sender: Option<EventSender>,
}

impl DocumentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        inventory: Arc<InventoryService>,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            db,
            inventory,
            event_sender,
        }
    }

    /// Creates a document with its lines and computed totals in one
    /// transaction. Invoices deduct stock for catalog-backed lines;
    /// purchase orders additionally get their fulfillment lines.
    #[instrument(skip(self, request), fields(kind = ?request.kind, counterparty_id = %request.counterparty_id))]
    pub async fn create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<document::Model, ServiceError> {
        request.validate()?;
        validate_line_inputs(&request.line_items)?;
        if request.freight_charges < Decimal::ZERO || request.freight_tax_rate < Decimal::ZERO {
            return Err(ServiceError::Validation(
                "Freight charges and tax rate must be non-negative".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let now = Utc::now();
        let document_id = Uuid::new_v4();

        let sequence_kind = match request.kind {
            DocumentKind::Invoice => SequenceKind::Invoice,
            DocumentKind::Bill => SequenceKind::Bill,
            DocumentKind::PurchaseOrder => SequenceKind::PurchaseOrder,
            DocumentKind::SalesReturn => SequenceKind::SalesReturn,
        };
        let document_number =
            numbering::next_number(&txn, request.account_id, sequence_kind, now.year()).await?;

        let computed = self
            .compute_lines(
                &txn,
                request.account_id,
                &request.line_items,
                &request.buyer_jurisdiction,
                &request.seller_jurisdiction,
            )
            .await?;
        let totals = aggregate_totals(&computed, request.freight_charges, request.freight_tax_rate);

        let header = document::ActiveModel {
            id: Set(document_id),
            account_id: Set(request.account_id),
            kind: Set(request.kind),
            document_number: Set(document_number.clone()),
            counterparty_id: Set(request.counterparty_id),
            status: Set(DocumentStatus::Draft),
            buyer_jurisdiction: Set(request.buyer_jurisdiction.clone()),
            seller_jurisdiction: Set(request.seller_jurisdiction.clone()),
            subtotal: Set(totals.subtotal),
            discount_amount: Set(totals.discount_amount),
            tax_amount: Set(totals.tax_amount),
            total_cgst: Set(totals.total_cgst),
            total_sgst: Set(totals.total_sgst),
            total_igst: Set(totals.total_igst),
            freight_charges: Set(request.freight_charges),
            freight_tax_rate: Set(request.freight_tax_rate),
            freight_tax: Set(totals.freight_tax),
            total_amount: Set(totals.total_amount),
            paid_amount: Set(Decimal::ZERO),
            issue_date: Set(now),
            due_date: Set(request.due_date),
            notes: Set(request.notes.clone()),
            created_by: Set(request.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = header.insert(&txn).await.map_err(ServiceError::db_error)?;

        self.insert_lines(&txn, document_id, &computed).await?;

        if request.kind == DocumentKind::PurchaseOrder {
            self.insert_po_lines(&txn, document_id, &computed).await?;
        }

        if request.kind == DocumentKind::Invoice {
            self.deduct_stock_for_lines(
                &txn,
                request.account_id,
                document_id,
                &computed,
                request.created_by,
            )
            .await?;
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::DocumentCreated {
                    document_id,
                    account_id: request.account_id,
                })
                .await;
        }

        info!(%document_id, number = %document_number, total = %created.total_amount, "document created");
        Ok(created)
    }

    /// Replaces a document's line items and recomputes every header total as
    /// one atomic operation. On any failure nothing is persisted and the
    /// prior lines remain intact.
    #[instrument(skip(self, line_items), fields(%document_id))]
    pub async fn replace_line_items(
        &self,
        account_id: Uuid,
        document_id: Uuid,
        line_items: Vec<LineItemInput>,
        performed_by: Uuid,
    ) -> Result<document::Model, ServiceError> {
        if line_items.is_empty() {
            return Err(ServiceError::Validation(
                "At least one line item is required".to_string(),
            ));
        }
        validate_line_inputs(&line_items)?;

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let doc = self.find_document(&txn, account_id, document_id).await?;
        if doc.status.is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "Document {} is finalized and cannot be edited",
                document_id
            )));
        }
        if doc.paid_amount > Decimal::ZERO {
            return Err(ServiceError::Conflict(format!(
                "Document {} has payments applied and cannot be edited",
                document_id
            )));
        }
        if doc.kind == DocumentKind::PurchaseOrder {
            let received = purchase_order_item::Entity::find()
                .filter(purchase_order_item::Column::DocumentId.eq(document_id))
                .all(&txn)
                .await
                .map_err(ServiceError::db_error)?
                .iter()
                .any(|i| i.received_quantity > Decimal::ZERO);
            if received {
                return Err(ServiceError::Conflict(format!(
                    "Purchase order {} has receipts and cannot be edited",
                    document_id
                )));
            }
        }

        let old_lines = doc
            .find_related(LineItemEntity)
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        // Invoices gave up stock at creation; return it before the old lines
        // disappear, then deduct for the replacement set.
        if doc.kind == DocumentKind::Invoice {
            for line in &old_lines {
                if let Some(item_id) = line.item_id {
                    self.inventory
                        .adjust_stock_within(
                            &txn,
                            account_id,
                            item_id,
                            line.quantity,
                            InventoryAction::InvoiceReversal,
                            Some("document"),
                            Some(document_id),
                            performed_by,
                        )
                        .await?;
                }
            }
        }

        LineItemEntity::delete_many()
            .filter(document_line_item::Column::DocumentId.eq(document_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let computed = self
            .compute_lines(
                &txn,
                account_id,
                &line_items,
                &doc.buyer_jurisdiction,
                &doc.seller_jurisdiction,
            )
            .await?;
        self.insert_lines(&txn, document_id, &computed).await?;

        if doc.kind == DocumentKind::PurchaseOrder {
            purchase_order_item::Entity::delete_many()
                .filter(purchase_order_item::Column::DocumentId.eq(document_id))
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;
            self.insert_po_lines(&txn, document_id, &computed).await?;
        }

        if doc.kind == DocumentKind::Invoice {
            self.deduct_stock_for_lines(&txn, account_id, document_id, &computed, performed_by)
                .await?;
        }

        let totals = aggregate_totals(&computed, doc.freight_charges, doc.freight_tax_rate);
        let mut active: document::ActiveModel = doc.into();
        active.subtotal = Set(totals.subtotal);
        active.discount_amount = Set(totals.discount_amount);
        active.tax_amount = Set(totals.tax_amount);
        active.total_cgst = Set(totals.total_cgst);
        active.total_sgst = Set(totals.total_sgst);
        active.total_igst = Set(totals.total_igst);
        active.freight_tax = Set(totals.freight_tax);
        active.total_amount = Set(totals.total_amount);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(%document_id, total = %updated.total_amount, "line items replaced, totals recomputed");
        Ok(updated)
    }

    /// Deletes an unpaid document, its lines, and (for invoices) restores
    /// the stock the document had deducted.
    #[instrument(skip(self), fields(%document_id))]
    pub async fn delete_document(
        &self,
        account_id: Uuid,
        document_id: Uuid,
        performed_by: Uuid,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let doc = self.find_document(&txn, account_id, document_id).await?;
        if doc.paid_amount > Decimal::ZERO {
            return Err(ServiceError::Conflict(format!(
                "Document {} has payments applied and cannot be deleted",
                document_id
            )));
        }

        let lines = doc
            .find_related(LineItemEntity)
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        if doc.kind == DocumentKind::Invoice {
            for line in &lines {
                if let Some(item_id) = line.item_id {
                    self.inventory
                        .adjust_stock_within(
                            &txn,
                            account_id,
                            item_id,
                            line.quantity,
                            InventoryAction::InvoiceReversal,
                            Some("document"),
                            Some(document_id),
                            performed_by,
                        )
                        .await?;
                }
            }
        }

        LineItemEntity::delete_many()
            .filter(document_line_item::Column::DocumentId.eq(document_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        purchase_order_item::Entity::delete_many()
            .filter(purchase_order_item::Column::DocumentId.eq(document_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        DocumentEntity::delete_by_id(document_id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::DocumentDeleted {
                    document_id,
                    account_id,
                })
                .await;
        }

        info!(%document_id, "document deleted");
        Ok(())
    }

    /// Drives one manual status edge through the transition table.
    #[instrument(skip(self), fields(%document_id, ?to))]
    pub async fn transition_status(
        &self,
        account_id: Uuid,
        document_id: Uuid,
        to: DocumentStatus,
    ) -> Result<document::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let doc = self.find_document(&txn, account_id, document_id).await?;
        if !DocumentStatus::can_transition(doc.kind, doc.status, to) {
            return Err(ServiceError::InvalidTransition(format!(
                "{:?} -> {:?} is not allowed for {:?}",
                doc.status, to, doc.kind
            )));
        }

        let mut active: document::ActiveModel = doc.into();
        active.status = Set(to);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;
        Ok(updated)
    }

    pub async fn get_document(
        &self,
        account_id: Uuid,
        document_id: Uuid,
    ) -> Result<(document::Model, Vec<document_line_item::Model>), ServiceError> {
        let doc = DocumentEntity::find_by_id(document_id)
            .filter(document::Column::AccountId.eq(account_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Document", document_id))?;

        let lines = doc
            .find_related(LineItemEntity)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok((doc, lines))
    }

    async fn find_document(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        document_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        DocumentEntity::find_by_id(document_id)
            .filter(document::Column::AccountId.eq(account_id))
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Document", document_id))
    }

    /// Resolves catalog snapshots and runs the tax calculator per line.
    /// A missing catalog item aborts before anything is persisted.
    async fn compute_lines(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        inputs: &[LineItemInput],
        buyer_jurisdiction: &str,
        seller_jurisdiction: &str,
    ) -> Result<Vec<ComputedLine>, ServiceError> {
        let mut computed = Vec::with_capacity(inputs.len());

        for input in inputs {
            let (item_name, item_sku, unit_price, tax_rate) = match input.item_id {
                Some(item_id) => {
                    let item = InventoryItemEntity::find_by_id(item_id)
                        .filter(inventory_item::Column::AccountId.eq(account_id))
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| ServiceError::not_found("Inventory item", item_id))?;
                    (
                        input.item_name.clone().unwrap_or(item.name),
                        item.sku,
                        input.unit_price.unwrap_or(item.unit_price),
                        input.tax_rate.unwrap_or(item.tax_rate),
                    )
                }
                None => {
                    let name = input.item_name.clone().ok_or_else(|| {
                        ServiceError::Validation(
                            "Line items without a catalog item must carry a name".to_string(),
                        )
                    })?;
                    let unit_price = input.unit_price.ok_or_else(|| {
                        ServiceError::Validation(
                            "Line items without a catalog item must carry a unit price"
                                .to_string(),
                        )
                    })?;
                    (name, None, unit_price, input.tax_rate.unwrap_or_default())
                }
            };

            let breakdown = calculate_line_tax(&LineTaxInput {
                quantity: input.quantity,
                unit_price,
                discount_amount: input.discount_amount,
                tax_rate,
                buyer_jurisdiction,
                seller_jurisdiction,
            });

            computed.push(ComputedLine {
                item_id: input.item_id,
                item_name,
                item_sku,
                quantity: input.quantity,
                unit_price,
                discount_amount: input.discount_amount,
                tax_rate,
                breakdown,
            });
        }
        Ok(computed)
    }

    async fn insert_lines(
        &self,
        txn: &DatabaseTransaction,
        document_id: Uuid,
        lines: &[ComputedLine],
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        for line in lines {
            let row = document_line_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                document_id: Set(document_id),
                item_id: Set(line.item_id),
                item_name: Set(line.item_name.clone()),
                item_sku: Set(line.item_sku.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                discount_amount: Set(line.discount_amount),
                tax_rate: Set(line.tax_rate),
                base_amount: Set(line.breakdown.base_amount),
                cgst_rate: Set(line.breakdown.cgst_rate),
                sgst_rate: Set(line.breakdown.sgst_rate),
                igst_rate: Set(line.breakdown.igst_rate),
                cgst_amount: Set(line.breakdown.cgst_amount),
                sgst_amount: Set(line.breakdown.sgst_amount),
                igst_amount: Set(line.breakdown.igst_amount),
                tax_amount: Set(line.breakdown.tax_amount),
                line_total: Set(line.breakdown.line_total),
                created_at: Set(now),
            };
            row.insert(txn).await.map_err(ServiceError::db_error)?;
        }
        Ok(())
    }

    /// Mirrors a purchase order's monetary lines as fulfillment lines.
    async fn insert_po_lines(
        &self,
        txn: &DatabaseTransaction,
        document_id: Uuid,
        lines: &[ComputedLine],
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        for line in lines {
            let item_id = line.item_id.ok_or_else(|| {
                ServiceError::Validation(
                    "Purchase order lines must reference catalog items".to_string(),
                )
            })?;
            let po_line = purchase_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                document_id: Set(document_id),
                item_id: Set(item_id),
                quantity_ordered: Set(line.quantity),
                received_quantity: Set(Decimal::ZERO),
                unit_price: Set(line.unit_price),
                created_at: Set(now),
                updated_at: Set(now),
            };
            po_line.insert(txn).await.map_err(ServiceError::db_error)?;
        }
        Ok(())
    }

    /// Invoices give up stock when their lines are written.
    async fn deduct_stock_for_lines(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        document_id: Uuid,
        lines: &[ComputedLine],
        performed_by: Uuid,
    ) -> Result<(), ServiceError> {
        for line in lines {
            if let Some(item_id) = line.item_id {
                self.inventory
                    .adjust_stock_within(
                        txn,
                        account_id,
                        item_id,
                        -line.quantity,
                        InventoryAction::InvoiceDeduction,
                        Some("document"),
                        Some(document_id),
                        performed_by,
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

fn validate_line_inputs(inputs: &[LineItemInput]) -> Result<(), ServiceError> {
    for input in inputs {
        input.validate()?;
        if input.quantity <= Decimal::ZERO {
            return Err(ServiceError::Validation(
                "Line quantity must be positive".to_string(),
            ));
        }
        if input.unit_price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(ServiceError::Validation(
                "Unit price must be non-negative".to_string(),
            ));
        }
        if input.discount_amount < Decimal::ZERO {
            return Err(ServiceError::Validation(
                "Discount must be non-negative".to_string(),
            ));
        }
        if input.tax_rate.is_some_and(|r| r < Decimal::ZERO) {
            return Err(ServiceError::Validation(
                "Tax rate must be non-negative".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(base: Decimal, cgst: Decimal, sgst: Decimal, igst: Decimal, discount: Decimal) -> ComputedLine {
        let tax = cgst + sgst + igst;
        ComputedLine {
            item_id: None,
            item_name: "widget".into(),
            item_sku: None,
            quantity: dec!(1),
            unit_price: base,
            discount_amount: discount,
            tax_rate: dec!(18),
            breakdown: TaxBreakdown {
                base_amount: base,
                cgst_rate: dec!(9),
                sgst_rate: dec!(9),
                igst_rate: Decimal::ZERO,
                cgst_amount: cgst,
                sgst_amount: sgst,
                igst_amount: igst,
                tax_amount: tax,
                line_total: base + tax,
            },
        }
    }

    #[test]
    fn totals_sum_lines_and_components() {
        let lines = vec![
            line(dec!(200), dec!(18), dec!(18), Decimal::ZERO, Decimal::ZERO),
            line(dec!(100), dec!(9), dec!(9), Decimal::ZERO, dec!(10)),
        ];
        let totals = aggregate_totals(&lines, Decimal::ZERO, Decimal::ZERO);

        assert_eq!(totals.subtotal, dec!(300));
        assert_eq!(totals.tax_amount, dec!(54));
        assert_eq!(totals.total_cgst, dec!(27));
        assert_eq!(totals.total_sgst, dec!(27));
        assert_eq!(totals.total_igst, Decimal::ZERO);
        assert_eq!(totals.discount_amount, dec!(10));
        assert_eq!(totals.total_amount, dec!(354));
    }

    #[test]
    fn freight_is_taxed_separately_and_added_after_lines() {
        let lines = vec![line(dec!(100), dec!(9), dec!(9), Decimal::ZERO, Decimal::ZERO)];
        let totals = aggregate_totals(&lines, dec!(50), dec!(18));

        assert_eq!(totals.freight_tax, dec!(9.00));
        // 100 + 18 + 50 + 9
        assert_eq!(totals.total_amount, dec!(177.00));
        // Line-level tax totals exclude freight tax.
        assert_eq!(totals.tax_amount, dec!(18));
    }

    #[test]
    fn empty_lines_reduce_to_freight_only() {
        let totals = aggregate_totals(&[], dec!(80), dec!(5));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.freight_tax, dec!(4.00));
        assert_eq!(totals.total_amount, dec!(84.00));
    }

    #[test]
    fn rejects_nonpositive_quantity() {
        let inputs = vec![LineItemInput {
            item_id: None,
            item_name: Some("widget".into()),
            quantity: Decimal::ZERO,
            unit_price: Some(dec!(10)),
            discount_amount: Decimal::ZERO,
            tax_rate: None,
        }];
        assert!(validate_line_inputs(&inputs).is_err());
    }

    #[test]
    fn rejects_negative_discount_and_rate() {
        let mut input = LineItemInput {
            item_id: None,
            item_name: Some("widget".into()),
            quantity: dec!(1),
            unit_price: Some(dec!(10)),
            discount_amount: dec!(-1),
            tax_rate: None,
        };
        assert!(validate_line_inputs(std::slice::from_ref(&input)).is_err());

        input.discount_amount = Decimal::ZERO;
        input.tax_rate = Some(dec!(-5));
        assert!(validate_line_inputs(std::slice::from_ref(&input)).is_err());
    }
}
