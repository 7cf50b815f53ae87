use crate::{handlers, state::AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建 API 路由
///
/// 设备 CRUD 是"工程师工作站"：操作员用它把虚拟传感器上线、
/// 查看当前状态、测试结束后下线。遥测走 `/ws/telemetry`。
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 设备管理 API
        .route("/api/devices", post(handlers::commission_device))
        .route("/api/devices", get(handlers::list_devices))
        .route("/api/devices/:device_id", get(handlers::get_device))
        .route("/api/devices/:device_id", delete(handlers::decommission_device))
        // 实时遥测
        .route("/ws/telemetry", get(handlers::telemetry_ws))
        // 添加中间件
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 健康检查
async fn health_check() -> &'static str {
    "OK"
}
