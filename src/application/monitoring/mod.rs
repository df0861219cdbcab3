pub mod agent_status;

pub use agent_status::AgentStatusRegistry;
