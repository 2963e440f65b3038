use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::number_sequence::{self, Entity as NumberSequenceEntity};
use crate::errors::ServiceError;

/// Scopes for generated numbers; each gets an independent counter per
/// account and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Invoice,
    Bill,
    PurchaseOrder,
    SalesReturn,
    Payment,
    CustomerCredit,
    VendorCredit,
    GoodsReceipt,
}

impl SequenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceKind::Invoice => "invoice",
            SequenceKind::Bill => "bill",
            SequenceKind::PurchaseOrder => "purchase_order",
            SequenceKind::SalesReturn => "sales_return",
            SequenceKind::Payment => "payment",
            SequenceKind::CustomerCredit => "customer_credit",
            SequenceKind::VendorCredit => "vendor_credit",
            SequenceKind::GoodsReceipt => "goods_receipt",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            SequenceKind::Invoice => "INV",
            SequenceKind::Bill => "BILL",
            SequenceKind::PurchaseOrder => "PO",
            SequenceKind::SalesReturn => "SRN",
            SequenceKind::Payment => "PAY",
            SequenceKind::CustomerCredit => "CRN",
            SequenceKind::VendorCredit => "VCN",
            SequenceKind::GoodsReceipt => "GRN",
        }
    }
}

/// Formats `<PREFIX>-<ACCT8>-<year>-<NNNN>`.
pub fn format_number(kind: SequenceKind, account_id: Uuid, year: i32, sequence: i64) -> String {
    let account_short = account_id.simple().to_string()[..8].to_uppercase();
    format!("{}-{}-{}-{:04}", kind.prefix(), account_short, year, sequence)
}

/// Allocates the next number in the (account, kind, year) scope.
///
/// The sequence row is read FOR UPDATE and incremented inside the caller's
/// transaction, so the number is burned only if the surrounding insert
/// commits, and concurrent creators serialize on the row lock instead of
/// racing a read-last-then-increment.
pub async fn next_number(
    txn: &DatabaseTransaction,
    account_id: Uuid,
    kind: SequenceKind,
    year: i32,
) -> Result<String, ServiceError> {
    let existing = NumberSequenceEntity::find()
        .filter(number_sequence::Column::AccountId.eq(account_id))
        .filter(number_sequence::Column::SequenceKind.eq(kind.as_str()))
        .filter(number_sequence::Column::Year.eq(year))
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(ServiceError::db_error)?;

    let next_value = match existing {
        Some(row) => {
            let next = row.last_value + 1;
            let mut active: number_sequence::ActiveModel = row.into();
            active.last_value = Set(next);
            active.updated_at = Set(Utc::now());
            active.update(txn).await.map_err(ServiceError::db_error)?;
            next
        }
        None => {
            let seed = number_sequence::ActiveModel {
                account_id: Set(account_id),
                sequence_kind: Set(kind.as_str().to_string()),
                year: Set(year),
                last_value: Set(1),
                updated_at: Set(Utc::now()),
            };
            seed.insert(txn).await.map_err(ServiceError::db_error)?;
            1
        }
    };

    let number = format_number(kind, account_id, year, next_value);
    debug!(%account_id, kind = kind.as_str(), year, sequence = next_value, "number allocated");
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_prefix_account_year_sequence() {
        let account = Uuid::parse_str("a1b2c3d4-0000-0000-0000-000000000000").unwrap();
        assert_eq!(
            format_number(SequenceKind::Invoice, account, 2026, 1),
            "INV-A1B2C3D4-2026-0001"
        );
        assert_eq!(
            format_number(SequenceKind::Payment, account, 2026, 123),
            "PAY-A1B2C3D4-2026-0123"
        );
    }

    #[test]
    fn wide_sequences_are_not_truncated() {
        let account = Uuid::nil();
        assert_eq!(
            format_number(SequenceKind::CustomerCredit, account, 2026, 12345),
            "CRN-00000000-2026-12345"
        );
    }

    #[test]
    fn each_kind_has_a_distinct_scope() {
        let kinds = [
            SequenceKind::Invoice,
            SequenceKind::Bill,
            SequenceKind::PurchaseOrder,
            SequenceKind::SalesReturn,
            SequenceKind::Payment,
            SequenceKind::CustomerCredit,
            SequenceKind::VendorCredit,
            SequenceKind::GoodsReceipt,
        ];
        let mut names: Vec<_> = kinds.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), kinds.len());
    }
}
