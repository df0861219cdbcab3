// Agent identity, state snapshots and codec
pub mod agent;

// Domain-specific error types
pub mod errors;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;
