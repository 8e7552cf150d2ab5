// Managers Module
//
// Focused manager types, each owning a single concern:
// - EngineLifecycleManager: engine handle creation/destruction and command forwarding

pub mod engine_lifecycle;

pub use engine_lifecycle::{EngineLifecycleManager, EngineState};
