use crate::{models::TelemetryParams, state::AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// 遥测 WebSocket 端点
///
/// 订阅遥测总线并把每条设备快照作为 JSON 文本帧转发给客户端；
/// `?topic=telemetry.{id}` 只看单个设备的通道。
pub async fn telemetry_ws(
    State(state): State<AppState>,
    Query(params): Query<TelemetryParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_telemetry(socket, state, params.topic))
}

async fn stream_telemetry(mut socket: WebSocket, state: AppState, topic: Option<String>) {
    let mut rx = state.engine.bus().subscribe();
    debug!(topic = ?topic, "Telemetry subscriber connected");

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if let Some(ref wanted) = topic {
                    if &msg.topic != wanted {
                        continue;
                    }
                }
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode telemetry frame: {}", e);
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    // 客户端断开
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                // 慢客户端丢旧帧，继续收新的 —— 绝不反压扫描循环
                warn!(dropped = n, "Telemetry subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    debug!("Telemetry subscriber disconnected");
}
