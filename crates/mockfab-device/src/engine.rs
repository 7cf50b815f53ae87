use crate::error::{DeviceError, Result};
use crate::model::{SimulatedDevice, SimulationConfig};
use crate::registry::DeviceRegistry;
use crate::strategy::{SignalStrategy, StrategySet};
use mockfab_core::TelemetryBus;
use mockfab_types::TelemetryMessage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 模拟引擎 —— 虚拟车间
///
/// 统一的设备模拟入口：
/// 1. 维护设备注册表（内存，无数据库）；
/// 2. 为每个设备调度一个独立的周期性扫描任务，按所选策略计算新读数；
/// 3. 每个新读数立即发布到遥测总线的 `telemetry.{device_id}` 主题。
///
/// 任务跑在共享的多线程 tokio runtime 上（不是一设备一线程），
/// runtime 的 worker 数量由服务端配置决定。
pub struct SimulationEngine {
    /// 设备注册表
    registry: Arc<DeviceRegistry>,

    /// 策略集合（正弦相位计数器在这里共享）
    strategies: Arc<StrategySet>,

    /// 每个设备一个任务句柄，用于单独取消
    tasks: RwLock<HashMap<String, JoinHandle<()>>>,

    /// 遥测总线
    bus: TelemetryBus,
}

impl SimulationEngine {
    pub fn new(bus: TelemetryBus) -> Self {
        info!("Simulation engine created");
        Self {
            registry: Arc::new(DeviceRegistry::new()),
            strategies: Arc::new(StrategySet::new()),
            tasks: RwLock::new(HashMap::new()),
            bus,
        }
    }

    // ========== 对 CRUD 门面暴露的操作 ==========

    /// 上线一个模拟设备并启动它的扫描循环
    ///
    /// 校验失败或策略解析失败时同步报错，不会留下任何记录。
    pub async fn commission(&self, config: SimulationConfig) -> Result<SimulatedDevice> {
        config.validate()?;

        // 先解析策略再登记：解析失败必须让整个上线请求失败
        let strategy = self.strategies.resolve(config.simulation_type)?;

        let device = SimulatedDevice::new(&config);
        self.registry.insert(device.clone()).await;
        self.start_scan_cycle(&device, strategy).await;

        info!(
            device_id = %device.id,
            device_name = %device.name,
            simulation_type = %device.simulation_type.as_str(),
            frequency_ms = device.frequency_ms,
            "Device commissioned"
        );
        Ok(device)
    }

    /// 下线设备并停止它的扫描循环
    ///
    /// 先从注册表摘除、再取消任务：赶上赛跑的 tick 最多再发布一次
    /// 旧快照，但不可能复活记录，也不会被再次调度。
    pub async fn decommission(&self, device_id: &str) -> Result<SimulatedDevice> {
        let removed = self
            .registry
            .remove(device_id)
            .await
            .ok_or_else(|| DeviceError::NotFound(device_id.to_string()))?;

        if let Some(handle) = self.tasks.write().await.remove(device_id) {
            handle.abort();
        }

        info!(device_id = %device_id, device_name = %removed.name, "Device decommissioned");
        Ok(removed)
    }

    /// 查询单个设备
    pub async fn get(&self, device_id: &str) -> Option<SimulatedDevice> {
        self.registry.get(device_id).await
    }

    /// 所有设备的快照
    pub async fn list(&self) -> Vec<SimulatedDevice> {
        self.registry.list().await
    }

    /// 设备数量
    pub async fn count(&self) -> usize {
        self.registry.count().await
    }

    /// 遥测总线句柄（WebSocket 端从这里订阅）
    pub fn bus(&self) -> &TelemetryBus {
        &self.bus
    }

    /// 进程退出前取消所有扫描任务，尽力而为，不等在途 tick 排空
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.write().await;
        let count = tasks.len();
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
        info!(cancelled = count, "All scan cycles cancelled");
    }

    // ========== 内部：扫描周期调度 ==========

    /// 为一个设备启动周期性扫描任务
    ///
    /// 第一个 tick 立即触发（上线即有读数），之后按 frequency_ms 间隔。
    /// 每个 tick：读当前值 → 策略计算 → 写回注册表 → 发布快照。
    /// 单个 tick 的任何错误只记日志，绝不终止调度。
    async fn start_scan_cycle(&self, device: &SimulatedDevice, strategy: Arc<dyn SignalStrategy>) {
        let device_id = device.id.clone();
        let registry = self.registry.clone();
        let bus = self.bus.clone();
        let period = Duration::from_millis(device.frequency_ms);

        let id = device_id.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;

                // 把上一个读数喂给策略，漂移类算法从它推导下一个值
                let Some(current) = registry.get(&id).await else {
                    debug!(device_id = %id, "Device gone, scan cycle exiting");
                    break;
                };
                let next = strategy.generate(current.current_val, current.min, current.max);

                if !next.is_finite() {
                    warn!(
                        device_id = %id,
                        value = next,
                        "Scan cycle produced a non-finite value, tick skipped"
                    );
                    continue;
                }

                let Some(snapshot) = registry.apply_reading(&id, next).await else {
                    break;
                };

                match serde_json::to_value(&snapshot) {
                    Ok(payload) => {
                        let topic = format!("telemetry.{}", id);
                        // 没有订阅者不算错误，fire-and-forget
                        if let Err(e) = bus.publish(TelemetryMessage::new(topic, payload)) {
                            debug!(device_id = %id, "Telemetry dropped: {}", e);
                        }
                    }
                    Err(e) => {
                        warn!(device_id = %id, "Scan cycle error: {}", e);
                    }
                }
            }
        });

        self.tasks.write().await.insert(device_id, handle);
    }
}
