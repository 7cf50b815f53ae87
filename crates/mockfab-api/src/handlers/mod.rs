pub mod device;
pub mod telemetry;

pub use device::*;
pub use telemetry::*;
