pub mod database;
pub mod document_store;
pub mod repositories;

pub use database::Database;
pub use document_store::SqliteDocumentStore;
pub use repositories::{DEFAULT_AGENT_COLLECTION, DocumentAgentStateRepository};
