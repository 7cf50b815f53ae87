use mockfab_device::{DeviceType, SimulationConfig, SimulationType};
use serde::{Deserialize, Serialize};

/// 上线设备请求
///
/// 线上字段和原始快照保持一致（camelCase + 大写枚举），
/// frequencyMs / simulationType 缺省时走默认值。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub min: f64,
    pub max: f64,
    /// 有符号：非正值回退到默认 1000ms，不拒绝请求
    #[serde(default)]
    pub frequency_ms: i64,
    #[serde(default)]
    pub simulation_type: SimulationType,
}

impl From<CommissionRequest> for SimulationConfig {
    fn from(req: CommissionRequest) -> Self {
        SimulationConfig {
            name: req.name,
            device_type: req.device_type,
            min: req.min,
            max: req.max,
            frequency_ms: req.frequency_ms,
            simulation_type: req.simulation_type,
        }
    }
}

/// 遥测 WebSocket 查询参数
#[derive(Debug, Deserialize)]
pub struct TelemetryParams {
    /// 只订阅某个主题（如 `telemetry.A3F09B2C`），缺省订阅全部
    pub topic: Option<String>,
}

/// 设备列表响应
#[derive(Debug, Serialize)]
pub struct DeviceListResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
}
