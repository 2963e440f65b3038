use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        inventory_audit_log::{self, InventoryAction},
        inventory_item::{self, Entity as InventoryItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Stock keeper. Every mutation locks the item row, refuses to drive stock
/// negative, and writes an audit entry in the same transaction.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Applies a signed stock delta inside the caller's transaction.
    ///
    /// The item row is locked FOR UPDATE before the new quantity is computed,
    /// so concurrent invoicing and receiving serialize per item.
    pub async fn adjust_stock_within(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        item_id: Uuid,
        delta: Decimal,
        action: InventoryAction,
        reference_type: Option<&str>,
        reference_id: Option<Uuid>,
        performed_by: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        let item = InventoryItemEntity::find_by_id(item_id)
            .filter(inventory_item::Column::AccountId.eq(account_id))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Inventory item", item_id))?;

        let quantity_before = item.current_stock;
        let quantity_after = quantity_before + delta;

        if quantity_after < Decimal::ZERO {
            return Err(ServiceError::InsufficientBalance(format!(
                "Insufficient stock for item {}: available {}, requested {}",
                item_id,
                quantity_before,
                delta.abs()
            )));
        }

        let mut active: inventory_item::ActiveModel = item.into();
        active.current_stock = Set(quantity_after);
        active.updated_at = Set(Utc::now());
        let updated = active.update(txn).await.map_err(|e| {
            error!(error = %e, %item_id, "failed to update stock");
            ServiceError::db_error(e)
        })?;

        let audit = inventory_audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            item_id: Set(item_id),
            action: Set(action),
            quantity_before: Set(quantity_before),
            quantity_after: Set(quantity_after),
            quantity_delta: Set(delta),
            reference_type: Set(reference_type.map(str::to_string)),
            reference_id: Set(reference_id),
            performed_by: Set(performed_by),
            created_at: Set(Utc::now()),
        };
        audit.insert(txn).await.map_err(ServiceError::db_error)?;

        Ok(updated)
    }

    /// Manual stock correction as its own transaction.
    #[instrument(skip(self), fields(%item_id, %delta))]
    pub async fn adjust_stock(
        &self,
        account_id: Uuid,
        item_id: Uuid,
        delta: Decimal,
        performed_by: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let updated = self
            .adjust_stock_within(
                &txn,
                account_id,
                item_id,
                delta,
                InventoryAction::ManualAdjustment,
                None,
                None,
                performed_by,
            )
            .await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::InventoryAdjusted {
                    item_id,
                    quantity_before: updated.current_stock - delta,
                    quantity_after: updated.current_stock,
                })
                .await;
        }

        info!(%item_id, new_stock = %updated.current_stock, "stock adjusted");
        Ok(updated)
    }

    pub async fn get_item(
        &self,
        account_id: Uuid,
        item_id: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        InventoryItemEntity::find_by_id(item_id)
            .filter(inventory_item::Column::AccountId.eq(account_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Inventory item", item_id))
    }
}
