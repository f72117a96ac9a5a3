pub mod entity;
pub mod identity;
pub mod manager;
pub mod memory;
pub mod models;
pub mod order;
pub mod pg_store;
pub mod query_builder;
pub mod repository;
pub mod store;

pub use entity::{Entity, Table};
pub use identity::{Identity, IdentityStore, NewIdentity};
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use order::{OrderBy, SortDirection};
pub use pg_store::PgStore;
pub use repository::Repository;
pub use store::{RecordStore, Row, Scope, StoreError};
