pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryAuditStore;
pub use postgres::PostgresAuditStore;
pub use traits::AuditStore;
