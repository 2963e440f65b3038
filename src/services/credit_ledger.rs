use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::credit::{self, CreditOrigin, CreditParty, CreditStatus, Entity as CreditEntity},
    entities::credit_transaction::{self, CreditTransactionType},
    errors::ServiceError,
    events::{Event, EventSender},
    services::numbering::{self, SequenceKind},
};

/// What a usage or refund is applied against, recorded on the trail row.
#[derive(Debug, Clone)]
pub struct CreditReference {
    pub reference_type: String,
    pub reference_id: Option<Uuid>,
}

impl CreditReference {
    pub fn document(document_id: Uuid) -> Self {
        Self {
            reference_type: "document".to_string(),
            reference_id: Some(document_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueCreditRequest {
    pub account_id: Uuid,
    pub party: CreditParty,
    pub counterparty_id: Uuid,
    pub origin: CreditOrigin,
    pub amount: Decimal,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_expire: bool,
    #[validate(length(max = 512, message = "reason too long"))]
    pub reason: Option<String>,
    pub created_by: Uuid,
}

/// One planned draw against a specific credit.
#[derive(Debug, Clone, PartialEq)]
pub struct FifoDraw {
    pub credit_id: Uuid,
    pub amount: Decimal,
}

/// Plans FIFO consumption across candidate credits, oldest issue date first.
///
/// Returns the per-credit draw amounts, or `InsufficientBalance` when the
/// usable total falls short, in which case nothing may be consumed at all.
/// Pure; the candidates are filtered and ordered here so callers only need
/// to hand over whatever rows they locked.
pub fn plan_fifo_consumption(
    candidates: &[credit::Model],
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<Vec<FifoDraw>, ServiceError> {
    let mut usable: Vec<&credit::Model> =
        candidates.iter().filter(|c| c.is_usable(now)).collect();
    usable.sort_by_key(|c| c.issue_date);

    let available: Decimal = usable.iter().map(|c| c.remaining_amount).sum();
    if available < amount {
        return Err(ServiceError::InsufficientBalance(format!(
            "Requested credit {} exceeds usable balance {}",
            amount, available
        )));
    }

    let mut draws = Vec::new();
    let mut outstanding = amount;
    for credit in usable {
        if outstanding <= Decimal::ZERO {
            break;
        }
        let draw = credit.remaining_amount.min(outstanding);
        draws.push(FifoDraw {
            credit_id: credit.id,
            amount: draw,
        });
        outstanding -= draw;
    }
    Ok(draws)
}

/// Stored-credit ledger shared by customer and vendor credits: issuance,
/// usage, adjustment, FIFO consumption, cancellation, and expiry, each with
/// an append-only transaction trail.
#[derive(Clone)]
pub struct CreditLedgerService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl CreditLedgerService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Issues a new credit and writes its `Created` trail row.
    #[instrument(skip(self, request), fields(counterparty_id = %request.counterparty_id))]
    pub async fn issue(&self, request: IssueCreditRequest) -> Result<credit::Model, ServiceError> {
        request.validate()?;
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::Validation(
                "Credit amount must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let now = Utc::now();

        let sequence_kind = match request.party {
            CreditParty::Customer => SequenceKind::CustomerCredit,
            CreditParty::Vendor => SequenceKind::VendorCredit,
        };
        let credit_number =
            numbering::next_number(&txn, request.account_id, sequence_kind, now.year()).await?;

        let credit_id = Uuid::new_v4();
        let model = credit::ActiveModel {
            id: Set(credit_id),
            account_id: Set(request.account_id),
            credit_number: Set(credit_number.clone()),
            party: Set(request.party),
            counterparty_id: Set(request.counterparty_id),
            origin: Set(request.origin),
            original_amount: Set(request.amount),
            used_amount: Set(Decimal::ZERO),
            remaining_amount: Set(request.amount),
            status: Set(CreditStatus::Active),
            issue_date: Set(now),
            expiry_date: Set(request.expiry_date),
            auto_expire: Set(request.auto_expire),
            reason: Set(request.reason),
            created_by: Set(request.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&txn).await.map_err(ServiceError::db_error)?;

        self.append_transaction(
            &txn,
            &created,
            CreditTransactionType::Created,
            request.amount,
            None,
            None,
            request.created_by,
        )
        .await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::CreditIssued {
                    credit_id,
                    amount: created.original_amount,
                })
                .await;
        }

        info!(%credit_id, number = %credit_number, amount = %created.original_amount, "credit issued");
        Ok(created)
    }

    /// Records usage against one credit in its own transaction.
    #[instrument(skip(self), fields(%credit_id, %amount))]
    pub async fn record_usage(
        &self,
        account_id: Uuid,
        credit_id: Uuid,
        amount: Decimal,
        reference: CreditReference,
        performed_by: Uuid,
    ) -> Result<credit_transaction::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let credit = self.lock_credit(&txn, account_id, credit_id).await?;
        let trail = self
            .apply_usage(&txn, credit, amount, &reference, performed_by)
            .await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::CreditConsumed {
                    credit_id,
                    amount,
                    remaining: trail.running_balance,
                })
                .await;
        }
        Ok(trail)
    }

    /// Administrative correction of a credit's remaining balance.
    ///
    /// The delta is applied to `original_amount` so the conservation
    /// invariant `remaining = original - used` survives the correction.
    #[instrument(skip(self, notes), fields(%credit_id, %delta))]
    pub async fn adjust(
        &self,
        account_id: Uuid,
        credit_id: Uuid,
        delta: Decimal,
        notes: Option<String>,
        performed_by: Uuid,
    ) -> Result<credit::Model, ServiceError> {
        if delta.is_zero() {
            return Err(ServiceError::Validation(
                "Adjustment delta must be non-zero".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let credit = self.lock_credit(&txn, account_id, credit_id).await?;

        if credit.status != CreditStatus::Active {
            return Err(ServiceError::Conflict(format!(
                "Credit {} is not active and cannot be adjusted",
                credit_id
            )));
        }

        let new_original = credit.original_amount + delta;
        let new_remaining = credit.remaining_amount + delta;
        if new_remaining < Decimal::ZERO || new_original < credit.used_amount {
            return Err(ServiceError::Validation(format!(
                "Adjustment of {} would drive credit {} below zero",
                delta, credit_id
            )));
        }

        let new_status = if new_remaining.is_zero() {
            CreditStatus::Used
        } else {
            CreditStatus::Active
        };

        let mut active: credit::ActiveModel = credit.clone().into();
        active.original_amount = Set(new_original);
        active.remaining_amount = Set(new_remaining);
        active.status = Set(new_status);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        self.append_transaction(
            &txn,
            &updated,
            CreditTransactionType::Adjustment,
            delta,
            None,
            notes,
            performed_by,
        )
        .await?;

        txn.commit().await.map_err(ServiceError::db_error)?;
        info!(%credit_id, %delta, remaining = %updated.remaining_amount, "credit adjusted");
        Ok(updated)
    }

    /// Consumes `amount` across the counterparty's usable credits oldest
    /// first, as one all-or-nothing transaction.
    #[instrument(skip(self), fields(%counterparty_id, %amount))]
    pub async fn consume_fifo(
        &self,
        account_id: Uuid,
        party: CreditParty,
        counterparty_id: Uuid,
        amount: Decimal,
        reference: CreditReference,
        performed_by: Uuid,
    ) -> Result<Vec<credit_transaction::Model>, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let trail = self
            .consume_fifo_within(
                &txn,
                account_id,
                party,
                counterparty_id,
                amount,
                reference,
                performed_by,
            )
            .await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            for row in &trail {
                sender
                    .send_or_log(Event::CreditConsumed {
                        credit_id: row.credit_id,
                        amount: row.amount,
                        remaining: row.running_balance,
                    })
                    .await;
            }
        }
        Ok(trail)
    }

    /// FIFO consumption inside a caller-owned transaction, so a payment can
    /// combine credit application with its allocations atomically.
    ///
    /// Candidate rows are locked FOR UPDATE before balances are read; two
    /// concurrent consumers serialize on the oldest credit instead of
    /// double-spending it. A shortfall fails the whole call; the caller's
    /// rollback discards any partial state.
    pub async fn consume_fifo_within(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        party: CreditParty,
        counterparty_id: Uuid,
        amount: Decimal,
        reference: CreditReference,
        performed_by: Uuid,
    ) -> Result<Vec<credit_transaction::Model>, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::Validation(
                "Credit amount to consume must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let candidates = CreditEntity::find()
            .filter(credit::Column::AccountId.eq(account_id))
            .filter(credit::Column::Party.eq(party))
            .filter(credit::Column::CounterpartyId.eq(counterparty_id))
            .filter(credit::Column::Status.eq(CreditStatus::Active))
            .order_by_asc(credit::Column::IssueDate)
            .lock_exclusive()
            .all(txn)
            .await
            .map_err(ServiceError::db_error)?;

        let draws = plan_fifo_consumption(&candidates, amount, now)?;

        let mut by_id: std::collections::HashMap<Uuid, credit::Model> =
            candidates.into_iter().map(|c| (c.id, c)).collect();

        let mut trail = Vec::with_capacity(draws.len());
        for draw in draws {
            let credit = by_id
                .remove(&draw.credit_id)
                .ok_or_else(|| ServiceError::Internal("planned credit vanished".to_string()))?;
            let row = self
                .apply_usage(txn, credit, draw.amount, &reference, performed_by)
                .await?;
            trail.push(row);
        }
        Ok(trail)
    }

    /// Manually cancels an active or fully used credit.
    #[instrument(skip(self), fields(%credit_id))]
    pub async fn cancel(
        &self,
        account_id: Uuid,
        credit_id: Uuid,
        performed_by: Uuid,
    ) -> Result<credit::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let credit = self.lock_credit(&txn, account_id, credit_id).await?;

        if !matches!(credit.status, CreditStatus::Active | CreditStatus::Used) {
            return Err(ServiceError::InvalidTransition(format!(
                "Credit {} cannot be cancelled from its current status",
                credit_id
            )));
        }

        let mut active: credit::ActiveModel = credit.clone().into();
        active.status = Set(CreditStatus::Cancelled);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        self.append_transaction(
            &txn,
            &updated,
            CreditTransactionType::Adjustment,
            Decimal::ZERO,
            None,
            Some("cancelled".to_string()),
            performed_by,
        )
        .await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender.send_or_log(Event::CreditCancelled(credit_id)).await;
        }
        info!(%credit_id, "credit cancelled");
        Ok(updated)
    }

    /// Returns previously consumed amount to a credit (payment void path).
    pub async fn refund_within(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        credit_id: Uuid,
        amount: Decimal,
        reference: CreditReference,
        performed_by: Uuid,
    ) -> Result<credit_transaction::Model, ServiceError> {
        let credit = self.lock_credit(txn, account_id, credit_id).await?;

        if amount <= Decimal::ZERO || amount > credit.used_amount {
            return Err(ServiceError::Validation(format!(
                "Refund of {} exceeds used amount {} on credit {}",
                amount, credit.used_amount, credit_id
            )));
        }

        let new_used = credit.used_amount - amount;
        let new_remaining = credit.remaining_amount + amount;
        let new_status = match credit.status {
            CreditStatus::Used => CreditStatus::Active,
            other => other,
        };

        let mut active: credit::ActiveModel = credit.clone().into();
        active.used_amount = Set(new_used);
        active.remaining_amount = Set(new_remaining);
        active.status = Set(new_status);
        active.updated_at = Set(Utc::now());
        let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

        self.append_transaction(
            txn,
            &updated,
            CreditTransactionType::Refund,
            amount,
            Some(reference),
            None,
            performed_by,
        )
        .await
    }

    /// Expires every active, auto-expiring credit whose expiry has passed.
    /// Driven by callers on read paths; there are no background sweepers.
    #[instrument(skip(self))]
    pub async fn expire_due_credits(
        &self,
        account_id: Uuid,
        performed_by: Uuid,
    ) -> Result<u64, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let due = CreditEntity::find()
            .filter(credit::Column::AccountId.eq(account_id))
            .filter(credit::Column::Status.eq(CreditStatus::Active))
            .filter(credit::Column::AutoExpire.eq(true))
            .filter(credit::Column::ExpiryDate.lt(now))
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let mut expired_ids = Vec::with_capacity(due.len());
        for credit in due {
            let remaining = credit.remaining_amount;
            let credit_id = credit.id;

            let mut active: credit::ActiveModel = credit.into();
            active.status = Set(CreditStatus::Expired);
            active.updated_at = Set(now);
            let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

            self.append_transaction(
                &txn,
                &updated,
                CreditTransactionType::Expiry,
                remaining,
                None,
                None,
                performed_by,
            )
            .await?;
            expired_ids.push(credit_id);
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            for id in &expired_ids {
                sender.send_or_log(Event::CreditExpired(*id)).await;
            }
        }

        if !expired_ids.is_empty() {
            warn!(count = expired_ids.len(), "credits expired");
        }
        Ok(expired_ids.len() as u64)
    }

    pub async fn get_credit(
        &self,
        account_id: Uuid,
        credit_id: Uuid,
    ) -> Result<credit::Model, ServiceError> {
        CreditEntity::find_by_id(credit_id)
            .filter(credit::Column::AccountId.eq(account_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Credit", credit_id))
    }

    /// Full transaction trail for a credit, oldest first.
    pub async fn get_trail(
        &self,
        credit_id: Uuid,
    ) -> Result<Vec<credit_transaction::Model>, ServiceError> {
        credit_transaction::Entity::find()
            .filter(credit_transaction::Column::CreditId.eq(credit_id))
            .order_by_asc(credit_transaction::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn lock_credit(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        credit_id: Uuid,
    ) -> Result<credit::Model, ServiceError> {
        CreditEntity::find_by_id(credit_id)
            .filter(credit::Column::AccountId.eq(account_id))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Credit", credit_id))
    }

    /// Debits one locked credit and appends its Usage trail row.
    async fn apply_usage(
        &self,
        txn: &DatabaseTransaction,
        credit: credit::Model,
        amount: Decimal,
        reference: &CreditReference,
        performed_by: Uuid,
    ) -> Result<credit_transaction::Model, ServiceError> {
        let now = Utc::now();
        if !credit.is_usable(now) {
            return Err(ServiceError::Conflict(format!(
                "Credit {} is not usable",
                credit.id
            )));
        }
        if amount <= Decimal::ZERO {
            return Err(ServiceError::Validation(
                "Usage amount must be positive".to_string(),
            ));
        }
        if amount > credit.remaining_amount {
            return Err(ServiceError::InsufficientBalance(format!(
                "Usage of {} exceeds remaining balance {} on credit {}",
                amount, credit.remaining_amount, credit.id
            )));
        }

        let new_used = credit.used_amount + amount;
        let new_remaining = credit.remaining_amount - amount;
        let new_status = if new_remaining.is_zero() {
            CreditStatus::Used
        } else {
            CreditStatus::Active
        };

        let mut active: credit::ActiveModel = credit.clone().into();
        active.used_amount = Set(new_used);
        active.remaining_amount = Set(new_remaining);
        active.status = Set(new_status);
        active.updated_at = Set(now);
        let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

        self.append_transaction(
            txn,
            &updated,
            CreditTransactionType::Usage,
            amount,
            Some(reference.clone()),
            None,
            performed_by,
        )
        .await
    }

    async fn append_transaction(
        &self,
        txn: &DatabaseTransaction,
        credit: &credit::Model,
        transaction_type: CreditTransactionType,
        amount: Decimal,
        reference: Option<CreditReference>,
        notes: Option<String>,
        performed_by: Uuid,
    ) -> Result<credit_transaction::Model, ServiceError> {
        let row = credit_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            credit_id: Set(credit.id),
            transaction_type: Set(transaction_type),
            amount: Set(amount),
            running_balance: Set(credit.remaining_amount),
            reference_type: Set(reference.as_ref().map(|r| r.reference_type.clone())),
            reference_id: Set(reference.as_ref().and_then(|r| r.reference_id)),
            notes: Set(notes),
            performed_by: Set(performed_by),
            created_at: Set(Utc::now()),
        };
        row.insert(txn).await.map_err(ServiceError::db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn credit_with(
        issue_offset_days: i64,
        remaining: Decimal,
        status: CreditStatus,
    ) -> credit::Model {
        let now = Utc::now();
        credit::Model {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            credit_number: "CRN-TEST".into(),
            party: CreditParty::Customer,
            counterparty_id: Uuid::new_v4(),
            origin: CreditOrigin::Manual,
            original_amount: remaining,
            used_amount: Decimal::ZERO,
            remaining_amount: remaining,
            status,
            issue_date: now - Duration::days(issue_offset_days),
            expiry_date: None,
            auto_expire: false,
            reason: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fifo_prefers_oldest_credit() {
        let old = credit_with(30, dec!(100), CreditStatus::Active);
        let new = credit_with(1, dec!(100), CreditStatus::Active);
        let candidates = vec![new.clone(), old.clone()];

        let draws = plan_fifo_consumption(&candidates, dec!(150), Utc::now()).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0], FifoDraw { credit_id: old.id, amount: dec!(100) });
        assert_eq!(draws[1], FifoDraw { credit_id: new.id, amount: dec!(50) });
    }

    #[test]
    fn fifo_stops_once_satisfied() {
        let old = credit_with(30, dec!(500), CreditStatus::Active);
        let new = credit_with(1, dec!(500), CreditStatus::Active);

        let draws = plan_fifo_consumption(&[old.clone(), new], dec!(200), Utc::now()).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].credit_id, old.id);
        assert_eq!(draws[0].amount, dec!(200));
    }

    #[test]
    fn fifo_shortfall_fails_whole_plan() {
        let a = credit_with(10, dec!(100), CreditStatus::Active);
        let b = credit_with(5, dec!(50), CreditStatus::Active);

        let err = plan_fifo_consumption(&[a, b], dec!(200), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "insufficient_balance");
    }

    #[test]
    fn fifo_skips_unusable_credits() {
        let expired = {
            let mut c = credit_with(60, dec!(1000), CreditStatus::Active);
            c.auto_expire = true;
            c.expiry_date = Some(Utc::now() - Duration::days(1));
            c
        };
        let cancelled = credit_with(40, dec!(1000), CreditStatus::Cancelled);
        let usable = credit_with(5, dec!(80), CreditStatus::Active);

        let draws =
            plan_fifo_consumption(&[expired, cancelled, usable.clone()], dec!(80), Utc::now())
                .unwrap();
        assert_eq!(draws, vec![FifoDraw { credit_id: usable.id, amount: dec!(80) }]);
    }

    #[test]
    fn fifo_exact_exhaustion_consumes_everything() {
        let a = credit_with(10, dec!(60), CreditStatus::Active);
        let b = credit_with(5, dec!(40), CreditStatus::Active);

        let draws = plan_fifo_consumption(&[b.clone(), a.clone()], dec!(100), Utc::now()).unwrap();
        let total: Decimal = draws.iter().map(|d| d.amount).sum();
        assert_eq!(total, dec!(100));
        assert_eq!(draws[0].credit_id, a.id);
    }
}
