pub mod engine;
pub mod error;
pub mod model;
pub mod registry;
pub mod strategy;

pub use engine::SimulationEngine;
pub use error::{DeviceError, Result};
pub use model::{DeviceType, SimulatedDevice, SimulationConfig, SimulationType};
pub use registry::DeviceRegistry;
pub use strategy::{SignalStrategy, StrategySet};
