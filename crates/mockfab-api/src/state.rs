use mockfab_device::SimulationEngine;
use std::sync::Arc;

/// API 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 模拟引擎
    pub engine: Arc<SimulationEngine>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(engine: Arc<SimulationEngine>) -> Self {
        Self { engine }
    }
}
