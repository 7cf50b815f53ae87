pub mod bus;

pub use bus::{SharedTelemetryBus, TelemetryBus};
