//! Khata API Library
//!
//! Ledger and allocation engine for small-business accounting: tax
//! computation, document totals, stored credits with FIFO consumption,
//! payment allocation, and purchase-order fulfillment.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::services::{
    credit_ledger::CreditLedgerService, documents::DocumentService,
    fulfillment::FulfillmentService, inventory::InventoryService, payments::PaymentService,
};

/// The wired service graph over one database pool.
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<InventoryService>,
    pub documents: Arc<DocumentService>,
    pub credit_ledger: Arc<CreditLedgerService>,
    pub payments: Arc<PaymentService>,
    pub fulfillment: Arc<FulfillmentService>,
}

impl AppServices {
    /// Builds every service over a shared pool and event channel.
    pub fn build(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        let inventory = Arc::new(InventoryService::new(db.clone(), event_sender.clone()));
        let documents = Arc::new(DocumentService::new(
            db.clone(),
            inventory.clone(),
            event_sender.clone(),
        ));
        let credit_ledger = Arc::new(CreditLedgerService::new(db.clone(), event_sender.clone()));
        let payments = Arc::new(PaymentService::new(
            db.clone(),
            credit_ledger.clone(),
            event_sender.clone(),
        ));
        let fulfillment = Arc::new(FulfillmentService::new(
            db,
            inventory.clone(),
            documents.clone(),
            event_sender,
        ));

        Self {
            inventory,
            documents,
            credit_ledger,
            payments,
            fulfillment,
        }
    }
}

/// Application state handed to the embedding layer (HTTP, jobs, tests).
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: EventSender,
    pub services: AppServices,
}

impl AppState {
    /// Connects to storage and wires the full service graph.
    pub async fn from_config(config: config::AppConfig) -> Result<Self, errors::ServiceError> {
        let db = Arc::new(db::establish_connection(&config).await?);
        let (event_sender, receiver) = events::event_channel(config.event_buffer_size);
        tokio::spawn(events::process_events(receiver));

        let services = AppServices::build(db.clone(), Some(event_sender.clone()));
        Ok(Self {
            db,
            config,
            event_sender,
            services,
        })
    }
}
