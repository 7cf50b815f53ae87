pub mod message;

pub use message::TelemetryMessage;
