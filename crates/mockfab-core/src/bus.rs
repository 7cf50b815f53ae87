use mockfab_types::TelemetryMessage;
use std::sync::Arc;
use tokio::sync::broadcast;

/// 遥测总线
///
/// 进程内的广播通道，模拟引擎在每个扫描周期把设备快照发布到这里，
/// WebSocket 订阅者从这里接收实时数据。发布是非阻塞的：慢订阅者
/// 超出容量后丢弃旧消息（Lagged），不会拖慢扫描周期。
#[derive(Clone)]
pub struct TelemetryBus {
    sender: broadcast::Sender<TelemetryMessage>,
}

impl TelemetryBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 订阅遥测流
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryMessage> {
        self.sender.subscribe()
    }

    /// 发布一条遥测消息，返回接收到它的订阅者数量
    ///
    /// 没有活跃订阅者时返回错误，调用方应当忽略它（fire-and-forget）。
    pub fn publish(
        &self,
        message: TelemetryMessage,
    ) -> Result<usize, broadcast::error::SendError<TelemetryMessage>> {
        self.sender.send(message)
    }

    /// 当前活跃订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

pub type SharedTelemetryBus = Arc<TelemetryBus>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = TelemetryBus::new(16);
        let mut rx = bus.subscribe();

        let msg = TelemetryMessage::new("telemetry.PT1102", json!({"currentVal": 3.7}));
        assert_eq!(bus.publish(msg).unwrap(), 1);

        let received = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout waiting for telemetry")
            .expect("Failed to receive telemetry");
        assert_eq!(received.topic, "telemetry.PT1102");
        assert_eq!(received.payload["currentVal"], 3.7);
    }

    #[tokio::test]
    async fn test_fan_out_to_all_subscribers() {
        let bus = TelemetryBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let mut rx3 = bus.subscribe();

        let msg = TelemetryMessage::new("telemetry.FT2001", json!({"currentVal": 12.0}));
        assert_eq!(bus.publish(msg).unwrap(), 3);

        for rx in [&mut rx1, &mut rx2, &mut rx3] {
            let received = rx.recv().await.expect("Subscriber missed telemetry");
            assert_eq!(received.topic, "telemetry.FT2001");
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_errors() {
        let bus = TelemetryBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);

        // broadcast 在没有订阅者时返回错误，引擎侧将其作为 debug 忽略
        let msg = TelemetryMessage::new("telemetry.TT0001", json!({}));
        assert!(bus.publish(msg).is_err());
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags_instead_of_blocking() {
        let bus = TelemetryBus::new(2);
        let mut rx = bus.subscribe();

        for i in 0..3 {
            bus.publish(TelemetryMessage::new("telemetry.VT3300", json!({"tick": i})))
                .unwrap();
        }

        // 最老的一条被挤掉，订阅者先看到 Lagged，再继续收到剩余消息
        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(n)) => assert_eq!(n, 1),
            other => panic!("Expected Lagged, got {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap().payload["tick"], 1);
        assert_eq!(rx.recv().await.unwrap().payload["tick"], 2);
    }
}
