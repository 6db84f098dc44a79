//! Season simulation: player pool, selection, timeline and the batch runner

pub mod matching;
pub mod pool;
pub mod population;
pub mod progress;
pub mod simulator;
pub mod timeline;

// Re-export commonly used types
pub use matching::SelectionPolicy;
pub use pool::PlayerPool;
pub use population::{PlayerGenerator, SkillLevelCounts};
pub use progress::{CancellationFlag, NoopProgress, ProgressSink};
pub use simulator::{MatchSimulator, SeasonSummary, SimulatedGame, SimulationRequest};
pub use timeline::GameTimeline;
