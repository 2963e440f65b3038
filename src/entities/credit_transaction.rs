use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CreditTransactionType {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "usage")]
    Usage,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "expiry")]
    Expiry,
}

/// Append-only trail row per credit.
///
/// Replaying a credit's transactions in order reproduces its current
/// `used_amount`/`remaining_amount`; `running_balance` records the remaining
/// amount immediately after each entry.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub credit_id: Uuid,
    pub transaction_type: CreditTransactionType,
    /// Signed for adjustments, positive otherwise.
    pub amount: Decimal,
    pub running_balance: Decimal,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
    pub performed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credit::Entity",
        from = "Column::CreditId",
        to = "super::credit::Column::Id"
    )]
    Credit,
}

impl Related<super::credit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
