use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether the credit belongs to a customer or a vendor. The FIFO ledger
/// treats the party as data; both sides share one implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CreditParty {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "vendor")]
    Vendor,
}

impl CreditParty {
    pub fn number_prefix(&self) -> &'static str {
        match self {
            CreditParty::Customer => "CRN",
            CreditParty::Vendor => "VCN",
        }
    }
}

/// How the credit came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum CreditOrigin {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "return")]
    Return,
    #[sea_orm(string_value = "promotional")]
    Promotional,
    #[sea_orm(string_value = "goodwill")]
    Goodwill,
}

/// Soft lifecycle: credits are never deleted, only status-transitioned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "snake_case")]
pub enum CreditStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "used")]
    Used,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub credit_number: String,
    pub party: CreditParty,
    pub counterparty_id: Uuid,
    pub origin: CreditOrigin,
    pub original_amount: Decimal,
    pub used_amount: Decimal,
    /// Invariant: `remaining_amount = original_amount - used_amount >= 0`.
    pub remaining_amount: Decimal,
    pub status: CreditStatus,
    pub issue_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub auto_expire: bool,
    pub reason: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::credit_transaction::Entity")]
    Transactions,
}

impl Related<super::credit_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Expiry is evaluated at read time against the caller's clock, never
    /// stored as a materialized flag.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry_date {
            Some(expiry) => self.auto_expire && now > expiry,
            None => false,
        }
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.status == CreditStatus::Active
            && self.remaining_amount > Decimal::ZERO
            && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn credit(remaining: Decimal, status: CreditStatus) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            credit_number: "CRN-0001".into(),
            party: CreditParty::Customer,
            counterparty_id: Uuid::new_v4(),
            origin: CreditOrigin::Manual,
            original_amount: dec!(1000),
            used_amount: dec!(1000) - remaining,
            remaining_amount: remaining,
            status,
            issue_date: now,
            expiry_date: None,
            auto_expire: false,
            reason: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn active_credit_with_balance_is_usable() {
        assert!(credit(dec!(100), CreditStatus::Active).is_usable(Utc::now()));
    }

    #[test]
    fn drained_or_inactive_credit_is_not_usable() {
        let now = Utc::now();
        assert!(!credit(Decimal::ZERO, CreditStatus::Active).is_usable(now));
        assert!(!credit(dec!(100), CreditStatus::Cancelled).is_usable(now));
        assert!(!credit(dec!(100), CreditStatus::Expired).is_usable(now));
    }

    #[test]
    fn expiry_requires_auto_expire_flag() {
        let now = Utc::now();
        let mut c = credit(dec!(100), CreditStatus::Active);
        c.expiry_date = Some(now - Duration::days(1));

        assert!(!c.is_expired(now));
        c.auto_expire = true;
        assert!(c.is_expired(now));
        assert!(!c.is_usable(now));
    }

    #[test]
    fn future_expiry_keeps_credit_usable() {
        let now = Utc::now();
        let mut c = credit(dec!(100), CreditStatus::Active);
        c.expiry_date = Some(now + Duration::days(30));
        c.auto_expire = true;
        assert!(!c.is_expired(now));
        assert!(c.is_usable(now));
    }
}
