use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentDirection {
    /// Money received from a customer.
    #[sea_orm(string_value = "incoming")]
    Incoming,
    /// Money paid out to a vendor.
    #[sea_orm(string_value = "outgoing")]
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "cheque")]
    Cheque,
    #[sea_orm(string_value = "upi")]
    Upi,
    #[sea_orm(string_value = "card")]
    Card,
    /// Settlement made entirely from stored credit, no cash movement.
    #[sea_orm(string_value = "credit_applied")]
    CreditApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "voided")]
    Voided,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub payment_number: String,
    pub counterparty_id: Uuid,
    pub direction: PaymentDirection,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Cash amount moved, excluding any credit applied alongside.
    pub amount: Decimal,
    pub credit_applied: Decimal,
    pub payment_date: DateTime<Utc>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_allocation::Entity")]
    Allocations,
}

impl Related<super::payment_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
