use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// 遥测消息
///
/// 每个扫描周期产生一条消息，topic 形如 `telemetry.{device_id}`，
/// payload 为设备的完整快照（JSON）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryMessage {
    pub id: Uuid,
    pub topic: String,
    pub payload: serde_json::Value,
    pub timestamp: i64,
}

impl TelemetryMessage {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
