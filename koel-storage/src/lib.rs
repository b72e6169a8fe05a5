//! Partitioned Postgres storage for the currency catalog and exchange-rate
//! observations: currency CRUD for the seeder and orchestrator, a
//! conflict-tolerant bulk upsert writer, and the monthly partition
//! lifecycle (create-next-month, retention sweep).

pub mod currency;
pub mod error;
pub mod partition;
pub mod writer;

pub use error::StorageError;
pub use partition::PartitionWindow;
