//! External move-search engine integration
//!
//! Talks UCI to an engine subprocess such as Stockfish. The rules engine
//! never depends on it being present.

pub mod analysis;
pub mod config;
pub mod stockfish;
pub mod worker;

pub use analysis::{Evaluation, PositionAnalysis, PvLine};
pub use config::EngineConfig;
pub use stockfish::{EngineError, KillSwitch, StockfishEngine};
pub use worker::{EngineHandle, EngineRequest};
