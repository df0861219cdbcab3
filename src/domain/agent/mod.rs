// Agent state snapshot and lifecycle status
pub mod state;

// Store document encoding
pub mod codec;

pub mod capability;
pub mod history;
pub mod identity;

pub use capability::{AgentKind, TradingAgent};
pub use codec::{StoreDocument, decode, encode};
pub use state::{AgentState, AgentStatus};
