use crate::{error::Result, models::*, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mockfab_device::SimulatedDevice;
use tracing::{debug, info};

/// 上线设备并启动它的遥测流
pub async fn commission_device(
    State(state): State<AppState>,
    Json(req): Json<CommissionRequest>,
) -> Result<(StatusCode, Json<SimulatedDevice>)> {
    info!(name = %req.name, simulation_type = %req.simulation_type.as_str(), "Commissioning device");

    let device = state.engine.commission(req.into()).await?;

    Ok((StatusCode::CREATED, Json(device)))
}

/// 列出虚拟车间里的所有设备
pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<DeviceListResponse<SimulatedDevice>>> {
    debug!("Listing devices");

    let data = state.engine.list().await;
    let total = data.len();

    Ok(Json(DeviceListResponse { data, total }))
}

/// 查看单个设备的最新过程值
pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<SimulatedDevice>> {
    debug!(device_id = %device_id, "Getting device");

    let device = state
        .engine
        .get(&device_id)
        .await
        .ok_or(crate::error::ApiError::DeviceNotFound(device_id))?;

    Ok(Json(device))
}

/// 下线设备 —— 停止扫描循环并从注册表摘除
pub async fn decommission_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<StatusCode> {
    info!(device_id = %device_id, "Decommissioning device");

    state.engine.decommission(&device_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
