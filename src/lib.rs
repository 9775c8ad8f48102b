pub mod dsp;
pub mod engine; // Master output and audio unlock lifecycle
pub mod error;
pub mod graph; // Signal graph, automation and scheduling
pub mod registry; // Sound descriptors, runtime state and orchestration
pub mod sounds; // Ambient texture recipes

pub use engine::{
    AudioEngine, AudioOutput, ContextState, CpalOutput, EngineConfig, OfflineOutput, OutputBus,
};
pub use error::{EngineError, GraphError};
pub use graph::{Graph, NodeId, ParamId, SharedGraph};
pub use registry::{MemoryStore, SoundDescriptor, SoundRegistry, SoundView, Store};
pub use sounds::SoundNode;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
