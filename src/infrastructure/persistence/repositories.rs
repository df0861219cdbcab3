mod agent_state_repository;

pub use agent_state_repository::{DEFAULT_AGENT_COLLECTION, DocumentAgentStateRepository};
