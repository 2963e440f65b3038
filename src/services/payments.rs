use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
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
        credit::CreditParty,
        credit_transaction::{self, CreditTransactionType},
        document::{self, DocumentKind, DocumentStatus, Entity as DocumentEntity},
        payment::{self, Entity as PaymentEntity, PaymentDirection, PaymentMethod, PaymentStatus},
        payment_allocation::{self, Entity as PaymentAllocationEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::credit_ledger::{CreditLedgerService, CreditReference},
    services::numbering::{self, SequenceKind},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub document_id: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub account_id: Uuid,
    pub counterparty_id: Uuid,
    pub direction: PaymentDirection,
    pub method: PaymentMethod,
    /// Cash amount; zero is allowed for pure credit settlements.
    pub amount: Decimal,
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub allocations: Vec<AllocationRequest>,
    pub credit_to_apply: Option<Decimal>,
    #[validate(length(max = 128, message = "reference too long"))]
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

/// Everything persisted by one `create_payment` call.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment: payment::Model,
    pub allocations: Vec<payment_allocation::Model>,
    pub credit_trail: Vec<credit_transaction::Model>,
    pub settled_documents: Vec<Uuid>,
}

/// Derives a payable document's status from its paid amount.
/// Settlement wins over partial payment; an untouched document keeps its
/// current status.
pub fn payment_driven_status(
    current: DocumentStatus,
    total_amount: Decimal,
    paid_amount: Decimal,
) -> DocumentStatus {
    if paid_amount >= total_amount {
        DocumentStatus::Settled
    } else if paid_amount > Decimal::ZERO {
        DocumentStatus::PartiallyPaid
    } else {
        current
    }
}

/// Allocates payments (and optionally stored credit) across outstanding
/// documents, updating paid amounts and payment-driven statuses atomically.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    credit_ledger: Arc<CreditLedgerService>,
    event_sender: Option<EventSender>,
}

impl PaymentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        credit_ledger: Arc<CreditLedgerService>,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            db,
            credit_ledger,
            event_sender,
        }
    }

    /// Creates a payment and applies its allocations, plus optional FIFO
    /// credit consumption, as one transaction. Any failure (including a
    /// credit shortfall) rolls back the whole call: no payment row, no
    /// allocation rows, no credit mutation.
    #[instrument(skip(self, request), fields(counterparty_id = %request.counterparty_id, amount = %request.amount))]
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentOutcome, ServiceError> {
        request.validate()?;
        let credit_to_apply = request.credit_to_apply.unwrap_or_default();
        validate_payment_shape(&request, credit_to_apply)?;

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let now = Utc::now();
        let payment_id = Uuid::new_v4();

        let payment_number =
            numbering::next_number(&txn, request.account_id, SequenceKind::Payment, now.year())
                .await?;

        let payment_row = payment::ActiveModel {
            id: Set(payment_id),
            account_id: Set(request.account_id),
            payment_number: Set(payment_number.clone()),
            counterparty_id: Set(request.counterparty_id),
            direction: Set(request.direction),
            method: Set(request.method),
            status: Set(PaymentStatus::Completed),
            amount: Set(request.amount),
            credit_applied: Set(credit_to_apply),
            payment_date: Set(request.payment_date.unwrap_or(now)),
            reference: Set(request.reference.clone()),
            notes: Set(request.notes.clone()),
            created_by: Set(request.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created_payment = payment_row.insert(&txn).await.map_err(ServiceError::db_error)?;

        let mut allocation_rows = Vec::with_capacity(request.allocations.len());
        let mut settled_documents = Vec::new();
        let mut credit_trail = Vec::new();

        for (index, allocation) in request.allocations.iter().enumerate() {
            // Credit rides on the sole allocation when present.
            let credit_for_doc = if index == 0 { credit_to_apply } else { Decimal::ZERO };

            let doc = self
                .lock_payable_document(&txn, &request, allocation.document_id)
                .await?;

            let applied = allocation.amount + credit_for_doc;
            if applied > doc.balance_due() {
                return Err(ServiceError::Validation(format!(
                    "Allocation of {} exceeds balance due {} on document {}",
                    applied,
                    doc.balance_due(),
                    doc.id
                )));
            }

            if credit_for_doc > Decimal::ZERO {
                let party = match request.direction {
                    PaymentDirection::Incoming => CreditParty::Customer,
                    PaymentDirection::Outgoing => CreditParty::Vendor,
                };
                let mut trail = self
                    .credit_ledger
                    .consume_fifo_within(
                        &txn,
                        request.account_id,
                        party,
                        request.counterparty_id,
                        credit_for_doc,
                        CreditReference {
                            reference_type: "payment".to_string(),
                            reference_id: Some(payment_id),
                        },
                        request.created_by,
                    )
                    .await?;
                credit_trail.append(&mut trail);
            }

            let new_paid = doc.paid_amount + applied;
            let new_status = payment_driven_status(doc.status, doc.total_amount, new_paid);
            if new_status != doc.status
                && !DocumentStatus::can_transition(doc.kind, doc.status, new_status)
            {
                return Err(ServiceError::InvalidTransition(format!(
                    "{:?} -> {:?} is not allowed for {:?}",
                    doc.status, new_status, doc.kind
                )));
            }
            if new_status == DocumentStatus::Settled {
                settled_documents.push(doc.id);
            }

            let document_id = doc.id;
            let mut active: document::ActiveModel = doc.into();
            active.paid_amount = Set(new_paid);
            active.status = Set(new_status);
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(ServiceError::db_error)?;

            let allocation_row = payment_allocation::ActiveModel {
                id: Set(Uuid::new_v4()),
                payment_id: Set(payment_id),
                document_id: Set(document_id),
                amount_allocated: Set(allocation.amount),
                created_at: Set(now),
            };
            allocation_rows.push(
                allocation_row
                    .insert(&txn)
                    .await
                    .map_err(ServiceError::db_error)?,
            );
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            let allocated: Decimal = allocation_rows.iter().map(|a| a.amount_allocated).sum();
            sender
                .send_or_log(Event::PaymentCreated {
                    payment_id,
                    amount: created_payment.amount,
                    allocated,
                    credit_applied: credit_to_apply,
                })
                .await;
            for document_id in &settled_documents {
                sender
                    .send_or_log(Event::DocumentSettled {
                        document_id: *document_id,
                        settled_at: now,
                    })
                    .await;
            }
        }

        info!(
            %payment_id,
            number = %payment_number,
            allocations = allocation_rows.len(),
            credit_applied = %credit_to_apply,
            "payment created"
        );

        Ok(PaymentOutcome {
            payment: created_payment,
            allocations: allocation_rows,
            credit_trail,
            settled_documents,
        })
    }

    /// Reverses a payment: allocations are unwound from the documents,
    /// consumed credit is refunded, and the payment is marked voided.
    #[instrument(skip(self), fields(%payment_id))]
    pub async fn void_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        performed_by: Uuid,
    ) -> Result<payment::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let now = Utc::now();

        let pay = PaymentEntity::find_by_id(payment_id)
            .filter(payment::Column::AccountId.eq(account_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Payment", payment_id))?;

        if pay.status != PaymentStatus::Completed {
            return Err(ServiceError::Conflict(format!(
                "Payment {} is not in a voidable state",
                payment_id
            )));
        }

        let allocations = PaymentAllocationEntity::find()
            .filter(payment_allocation::Column::PaymentId.eq(payment_id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        // Credit applied rode on the first allocation; unwind it from the
        // same document.
        let mut credit_remaining = pay.credit_applied;
        for allocation in &allocations {
            let doc = DocumentEntity::find_by_id(allocation.document_id)
                .filter(document::Column::AccountId.eq(account_id))
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| ServiceError::not_found("Document", allocation.document_id))?;

            let reversed = allocation.amount_allocated + credit_remaining;
            credit_remaining = Decimal::ZERO;

            let new_paid = doc.paid_amount - reversed;
            if new_paid < Decimal::ZERO {
                return Err(ServiceError::Conflict(format!(
                    "Voiding payment {} would drive document {} paid amount negative",
                    payment_id, doc.id
                )));
            }

            // Void rewinds the payment-driven edges directly; the forward
            // transition table does not describe reversals.
            let new_status = if new_paid.is_zero() {
                DocumentStatus::Sent
            } else {
                DocumentStatus::PartiallyPaid
            };

            let mut active: document::ActiveModel = doc.into();
            active.paid_amount = Set(new_paid);
            active.status = Set(new_status);
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(ServiceError::db_error)?;
        }

        if pay.credit_applied > Decimal::ZERO {
            self.refund_consumed_credit(&txn, account_id, &pay, performed_by)
                .await?;
        }

        let mut active: payment::ActiveModel = pay.into();
        active.status = Set(PaymentStatus::Voided);
        active.updated_at = Set(now);
        let voided = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender.send_or_log(Event::PaymentVoided(payment_id)).await;
        }

        info!(%payment_id, "payment voided");
        Ok(voided)
    }

    pub async fn get_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
    ) -> Result<(payment::Model, Vec<payment_allocation::Model>), ServiceError> {
        let pay = PaymentEntity::find_by_id(payment_id)
            .filter(payment::Column::AccountId.eq(account_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Payment", payment_id))?;

        let allocations = PaymentAllocationEntity::find()
            .filter(payment_allocation::Column::PaymentId.eq(payment_id))
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok((pay, allocations))
    }

    /// Locks one allocation target and verifies it can take this payment.
    async fn lock_payable_document(
        &self,
        txn: &DatabaseTransaction,
        request: &CreatePaymentRequest,
        document_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        let doc = DocumentEntity::find_by_id(document_id)
            .filter(document::Column::AccountId.eq(request.account_id))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Document", document_id))?;

        if doc.counterparty_id != request.counterparty_id {
            return Err(ServiceError::Conflict(format!(
                "Document {} belongs to a different counterparty",
                document_id
            )));
        }
        if !doc.kind.is_payable() {
            return Err(ServiceError::Conflict(format!(
                "Document {} is a purchase order and cannot take payments",
                document_id
            )));
        }
        let direction_matches = match request.direction {
            PaymentDirection::Incoming => doc.kind == DocumentKind::Invoice,
            PaymentDirection::Outgoing => {
                matches!(doc.kind, DocumentKind::Bill | DocumentKind::SalesReturn)
            }
        };
        if !direction_matches {
            return Err(ServiceError::Conflict(format!(
                "Payment direction does not match document {} kind",
                document_id
            )));
        }
        if !doc.status.accepts_payment() {
            return Err(ServiceError::Conflict(format!(
                "Document {} does not accept payments in status {:?}",
                document_id, doc.status
            )));
        }
        Ok(doc)
    }

    /// Refunds every Usage row this payment produced, oldest last so the
    /// trail mirrors consumption order.
    async fn refund_consumed_credit(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        pay: &payment::Model,
        performed_by: Uuid,
    ) -> Result<(), ServiceError> {
        let usages = credit_transaction::Entity::find()
            .filter(credit_transaction::Column::ReferenceType.eq("payment"))
            .filter(credit_transaction::Column::ReferenceId.eq(pay.id))
            .filter(
                credit_transaction::Column::TransactionType.eq(CreditTransactionType::Usage),
            )
            .all(txn)
            .await
            .map_err(ServiceError::db_error)?;

        for usage in usages {
            self.credit_ledger
                .refund_within(
                    txn,
                    account_id,
                    usage.credit_id,
                    usage.amount,
                    CreditReference {
                        reference_type: "payment_void".to_string(),
                        reference_id: Some(pay.id),
                    },
                    performed_by,
                )
                .await?;
        }
        Ok(())
    }
}

fn validate_payment_shape(
    request: &CreatePaymentRequest,
    credit_to_apply: Decimal,
) -> Result<(), ServiceError> {
    if request.amount < Decimal::ZERO {
        return Err(ServiceError::Validation(
            "Payment amount must be non-negative".to_string(),
        ));
    }
    if credit_to_apply < Decimal::ZERO {
        return Err(ServiceError::Validation(
            "Credit to apply must be non-negative".to_string(),
        ));
    }
    if request.amount.is_zero() && credit_to_apply.is_zero() {
        return Err(ServiceError::Validation(
            "Payment must move cash or credit".to_string(),
        ));
    }
    if credit_to_apply > Decimal::ZERO && request.allocations.len() != 1 {
        return Err(ServiceError::Validation(
            "Applying credit requires exactly one allocation".to_string(),
        ));
    }
    for allocation in &request.allocations {
        if allocation.amount < Decimal::ZERO {
            return Err(ServiceError::Validation(
                "Allocation amounts must be non-negative".to_string(),
            ));
        }
        // A zero cash allocation is only meaningful as the carrier for an
        // applied credit.
        if allocation.amount.is_zero() && credit_to_apply.is_zero() {
            return Err(ServiceError::Validation(
                "Allocation amounts must be positive".to_string(),
            ));
        }
    }
    let allocated: Decimal = request.allocations.iter().map(|a| a.amount).sum();
    if allocated > request.amount {
        return Err(ServiceError::Validation(format!(
            "Allocations {} exceed payment amount {}",
            allocated, request.amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_request(amount: Decimal, allocations: Vec<AllocationRequest>) -> CreatePaymentRequest {
        CreatePaymentRequest {
            account_id: Uuid::new_v4(),
            counterparty_id: Uuid::new_v4(),
            direction: PaymentDirection::Incoming,
            method: PaymentMethod::Cash,
            amount,
            payment_date: None,
            allocations,
            credit_to_apply: None,
            reference: None,
            notes: None,
            created_by: Uuid::new_v4(),
        }
    }

    #[test]
    fn full_allocation_settles_the_document() {
        let status =
            payment_driven_status(DocumentStatus::Sent, dec!(500), dec!(500));
        assert_eq!(status, DocumentStatus::Settled);
    }

    #[test]
    fn partial_allocation_marks_partially_paid() {
        let status =
            payment_driven_status(DocumentStatus::Sent, dec!(500), dec!(200));
        assert_eq!(status, DocumentStatus::PartiallyPaid);
    }

    #[test]
    fn untouched_document_keeps_status() {
        let status =
            payment_driven_status(DocumentStatus::Sent, dec!(500), Decimal::ZERO);
        assert_eq!(status, DocumentStatus::Sent);
    }

    #[test]
    fn overpaid_document_still_reads_settled() {
        let status =
            payment_driven_status(DocumentStatus::PartiallyPaid, dec!(500), dec!(600));
        assert_eq!(status, DocumentStatus::Settled);
    }

    #[test]
    fn allocations_may_not_exceed_payment_amount() {
        let request = base_request(
            dec!(100),
            vec![
                AllocationRequest { document_id: Uuid::new_v4(), amount: dec!(80) },
                AllocationRequest { document_id: Uuid::new_v4(), amount: dec!(40) },
            ],
        );
        let err = validate_payment_shape(&request, Decimal::ZERO).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn credit_requires_exactly_one_allocation() {
        let mut request = base_request(
            dec!(100),
            vec![
                AllocationRequest { document_id: Uuid::new_v4(), amount: dec!(50) },
                AllocationRequest { document_id: Uuid::new_v4(), amount: dec!(50) },
            ],
        );
        request.credit_to_apply = Some(dec!(25));
        let err = validate_payment_shape(&request, dec!(25)).unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        request.allocations.truncate(1);
        assert!(validate_payment_shape(&request, dec!(25)).is_ok());
    }

    #[test]
    fn pure_credit_settlement_needs_no_cash() {
        let mut request = base_request(
            Decimal::ZERO,
            vec![AllocationRequest { document_id: Uuid::new_v4(), amount: Decimal::ZERO }],
        );
        request.method = PaymentMethod::CreditApplied;
        request.credit_to_apply = Some(dec!(150));
        assert!(validate_payment_shape(&request, dec!(150)).is_ok());
    }

    #[test]
    fn zero_value_payment_is_rejected() {
        let request = base_request(Decimal::ZERO, vec![]);
        let err = validate_payment_shape(&request, Decimal::ZERO).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }
}
