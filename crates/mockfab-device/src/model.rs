use crate::error::{DeviceError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// 默认扫描周期（毫秒）
pub const DEFAULT_FREQUENCY_MS: u64 = 1000;

/// 模拟工业设备
///
/// 相当于一个虚拟 PLC 寄存器：有位号（id）、工程量程（min/max）和
/// 一个由模拟引擎每个扫描周期更新的过程值（currentVal）。
/// 字段名按线上格式序列化，和前端/订阅者看到的 JSON 一致。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedDevice {
    /// 设备位号（全局唯一，进程内不复用）
    pub id: String,

    /// 设备名称
    pub name: String,

    /// 信号类型（仅用于展示，不影响生成算法）
    #[serde(rename = "type")]
    pub device_type: DeviceType,

    /// 工程量程下限
    pub min: f64,

    /// 工程量程上限
    pub max: f64,

    /// 当前过程值 —— 每个扫描周期由引擎更新
    pub current_val: f64,

    /// 上一个过程值
    ///
    /// 漂移类算法（随机游走）用它推导下一个读数，这也是真实模拟量
    /// 仪表的行为：读数是漂移的，不会瞬移。
    pub last_value: f64,

    /// 驱动该设备信号的生成算法
    pub simulation_type: SimulationType,

    /// 扫描周期（毫秒）
    pub frequency_ms: u64,

    /// 扫描循环是否在运行
    pub active: bool,

    /// 最近一次更新的 epoch 毫秒时间戳
    pub timestamp: i64,
}

impl SimulatedDevice {
    /// 按上线请求创建设备
    ///
    /// 分配新位号，currentVal 和 lastValue 都初始化为量程中点。
    pub fn new(config: &SimulationConfig) -> Self {
        let midpoint = (config.min + config.max) / 2.0;
        Self {
            id: fresh_tag_id(),
            name: config.name.clone(),
            device_type: config.device_type,
            min: config.min,
            max: config.max,
            current_val: midpoint,
            last_value: midpoint,
            simulation_type: config.simulation_type,
            frequency_ms: config.effective_frequency_ms(),
            active: true,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// 生成 8 位大写十六进制位号，类似 PLC 位号地址（如 "A3F09B2C"）
fn fresh_tag_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

/// 工业信号类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    /// 温度
    Temperature,
    /// 压力
    Pressure,
    /// 振动
    Vibration,
    /// 流量
    FlowRate,
}

impl DeviceType {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceType::Temperature => "TEMPERATURE",
            DeviceType::Pressure => "PRESSURE",
            DeviceType::Vibration => "VIBRATION",
            DeviceType::FlowRate => "FLOW_RATE",
        }
    }
}

/// 信号生成算法
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationType {
    /// 布朗运动随机游走 —— 平滑、逼真的漂移
    #[default]
    Realistic,
    /// 有界随机游走 —— 噪声更大，但仍与上一读数相关
    Random,
    /// 平滑正弦振荡
    SineWave,
    /// 大部分时间稳定，5% 概率注入灾难性故障值
    Chaos,
}

impl SimulationType {
    pub fn as_str(&self) -> &str {
        match self {
            SimulationType::Realistic => "REALISTIC",
            SimulationType::Random => "RANDOM",
            SimulationType::SineWave => "SINE_WAVE",
            SimulationType::Chaos => "CHAOS",
        }
    }
}

/// 设备上线请求配置
///
/// 调用方指定要模拟的信号种类（类型 + 量程）、扫描频率和生成策略。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// 设备名称（如 "Boiler-Room Temp Sensor"）
    pub name: String,

    /// 信号类型
    #[serde(rename = "type")]
    pub device_type: DeviceType,

    /// 工程量程下限
    pub min: f64,

    /// 工程量程上限
    pub max: f64,

    /// 扫描周期（毫秒）。有符号：调用方传 0 或负值时按默认 1000ms 处理，
    /// 和拒绝请求相比，这是对线上调用方更宽容的行为
    #[serde(default)]
    pub frequency_ms: i64,

    /// 生成策略，默认布朗运动游走
    #[serde(default)]
    pub simulation_type: SimulationType,
}

impl SimulationConfig {
    /// 校验上线请求
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DeviceError::validation("Device name cannot be empty"));
        }
        if self.name.len() > 255 {
            return Err(DeviceError::validation(
                "Device name too long (max 255 characters)",
            ));
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(DeviceError::validation("Range bounds must be finite"));
        }
        if self.min >= self.max {
            return Err(DeviceError::validation(format!(
                "min must be less than max (got min={}, max={})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// 实际生效的扫描周期：非正值（未指定/0/负数）回退到默认值
    pub fn effective_frequency_ms(&self) -> u64 {
        if self.frequency_ms > 0 {
            self.frequency_ms as u64
        } else {
            DEFAULT_FREQUENCY_MS
        }
    }
}
