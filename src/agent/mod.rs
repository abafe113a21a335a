pub mod fallback;
mod personas;
pub mod registry;

pub use fallback::{FallbackResult, synthesize};
pub use registry::{AgentId, AgentProfile, AgentRegistry};
