// Agent lifecycle
pub mod agents;
pub mod bootstrap;

// Agent health monitoring
pub mod monitoring;
