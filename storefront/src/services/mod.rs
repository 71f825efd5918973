// storefront/src/services/mod.rs

//! Storage and payment collaborators the workflows call into.

pub mod catalog;
pub mod gateway;
pub mod ledger;
pub mod memory_store;
pub mod midtrans;
pub mod mock_gateway;
pub mod pg_store;
pub mod seed;
pub mod signature;
pub mod token;

pub use catalog::{CatalogStore, DecrementOutcome, StockRequest};
pub use gateway::{PaymentGateway, TransactionRedirect, TransactionRequest};
pub use ledger::OrderLedger;
pub use memory_store::MemoryStore;
pub use midtrans::MidtransGateway;
pub use mock_gateway::MockGateway;
pub use pg_store::PgStore;
