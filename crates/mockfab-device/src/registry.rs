use crate::model::SimulatedDevice;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 设备注册表
///
/// 内存中的设备位号表，类似 OPC-UA 地址空间 —— "有哪些设备存在"
/// 的唯一事实来源。不落库：模拟器不跨重启持久化。
///
/// 并发模型：上线/下线调用和各设备自己的扫描循环并发访问这张表；
/// 每个设备的可变读数字段只由它自己的扫描循环通过 `apply_reading`
/// 写入（单写者不变量）。
pub struct DeviceRegistry {
    devices: Arc<RwLock<HashMap<String, SimulatedDevice>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 登记设备
    pub async fn insert(&self, device: SimulatedDevice) {
        let mut devices = self.devices.write().await;
        info!(
            device_id = %device.id,
            device_name = %device.name,
            simulation_type = %device.simulation_type.as_str(),
            "Device registered"
        );
        devices.insert(device.id.clone(), device);
    }

    /// 摘除设备，返回摘除时的快照（active 已置为 false）
    ///
    /// 下线流程先调用这里、再取消扫描任务：摘除之后赶上的那个
    /// tick 会在 `apply_reading` 里拿到 None 然后自行退出。
    pub async fn remove(&self, device_id: &str) -> Option<SimulatedDevice> {
        let mut devices = self.devices.write().await;
        let mut removed = devices.remove(device_id)?;
        removed.active = false;
        info!(device_id = %device_id, device_name = %removed.name, "Device unregistered");
        Some(removed)
    }

    /// 查询单个设备
    pub async fn get(&self, device_id: &str) -> Option<SimulatedDevice> {
        let devices = self.devices.read().await;
        devices.get(device_id).cloned()
    }

    /// 所有设备的快照（顺序不保证）
    pub async fn list(&self) -> Vec<SimulatedDevice> {
        let devices = self.devices.read().await;
        devices.values().cloned().collect()
    }

    /// 设备数量
    pub async fn count(&self) -> usize {
        let devices = self.devices.read().await;
        devices.len()
    }

    /// 写入一个扫描周期的新读数，返回更新后的快照
    ///
    /// 只允许设备自己的扫描循环调用。设备已被摘除时返回 None，
    /// 调用方据此结束循环 —— 被删除的记录绝不会被复活。
    pub async fn apply_reading(&self, device_id: &str, next: f64) -> Option<SimulatedDevice> {
        let mut devices = self.devices.write().await;
        let device = match devices.get_mut(device_id) {
            Some(device) => device,
            None => {
                debug!(device_id = %device_id, "Reading dropped, device already removed");
                return None;
            }
        };

        device.last_value = device.current_val;
        device.current_val = next;
        device.timestamp = Utc::now().timestamp_millis();
        Some(device.clone())
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceType, SimulationConfig, SimulationType};

    fn test_device(name: &str) -> SimulatedDevice {
        SimulatedDevice::new(&SimulationConfig {
            name: name.to_string(),
            device_type: DeviceType::Pressure,
            min: 0.0,
            max: 10.0,
            frequency_ms: 1000,
            simulation_type: SimulationType::Realistic,
        })
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = DeviceRegistry::new();
        let device = test_device("主管道压力");
        let id = device.id.clone();

        registry.insert(device).await;

        let found = registry.get(&id).await.unwrap();
        assert_eq!(found.name, "主管道压力");
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_flips_active() {
        let registry = DeviceRegistry::new();
        let device = test_device("临时探头");
        let id = device.id.clone();
        registry.insert(device).await;

        let removed = registry.remove(&id).await.unwrap();
        assert!(!removed.active);
        assert!(registry.get(&id).await.is_none());
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_unknown_is_none() {
        let registry = DeviceRegistry::new();
        assert!(registry.remove("MISSING1").await.is_none());
    }

    #[tokio::test]
    async fn test_apply_reading_chains_values() {
        let registry = DeviceRegistry::new();
        let device = test_device("流量计");
        let id = device.id.clone();
        registry.insert(device).await;

        let snap1 = registry.apply_reading(&id, 6.5).await.unwrap();
        assert_eq!(snap1.last_value, 5.0); // 中点
        assert_eq!(snap1.current_val, 6.5);

        let snap2 = registry.apply_reading(&id, 6.9).await.unwrap();
        assert_eq!(snap2.last_value, 6.5);
        assert_eq!(snap2.current_val, 6.9);
    }

    #[tokio::test]
    async fn test_apply_reading_after_remove_is_noop() {
        let registry = DeviceRegistry::new();
        let device = test_device("已下线");
        let id = device.id.clone();
        registry.insert(device).await;
        registry.remove(&id).await.unwrap();

        // 赛跑中迟到的 tick：不得复活记录
        assert!(registry.apply_reading(&id, 3.3).await.is_none());
        assert!(registry.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_insert_remove() {
        let registry = Arc::new(DeviceRegistry::new());

        let mut ids = Vec::new();
        let mut handles = Vec::new();
        for i in 0..40 {
            let device = test_device(&format!("设备{}", i));
            ids.push(device.id.clone());
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.insert(device).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(registry.count().await, 40);

        // 并发摘除前 15 个
        let mut handles = Vec::new();
        for id in ids.iter().take(15).cloned() {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.remove(&id).await.is_some()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(registry.count().await, 25);

        // 没有丢失、没有重复
        let listed = registry.list().await;
        let unique: std::collections::HashSet<_> = listed.iter().map(|d| d.id.clone()).collect();
        assert_eq!(unique.len(), 25);
    }
}
