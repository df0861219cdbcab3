// Agent lifecycle shell shared by analyzer, risk and execution agents
pub mod base_agent;

pub use base_agent::{BaseAgent, BaseAgentOptions};
