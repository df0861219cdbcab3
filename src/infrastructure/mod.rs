pub mod credentials;
pub mod observability;
pub mod persistence;
pub mod repositories;

pub use credentials::StoreCredentials;
pub use repositories::InMemoryDocumentStore;
