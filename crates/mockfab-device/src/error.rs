use thiserror::Error;

/// 设备模拟错误类型
#[derive(Error, Debug)]
pub enum DeviceError {
    /// 设备未找到
    #[error("Device not found: {0}")]
    NotFound(String),

    /// 验证错误（min >= max、名称为空等）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 策略解析失败
    ///
    /// 表示程序不变量被破坏：验证通过的请求却带着未注册的策略到达引擎。
    /// 必须让上线请求失败，绝不允许静默回退到默认策略。
    #[error("No strategy registered for: {0}")]
    StrategyResolution(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 设备模拟结果类型
pub type Result<T> = std::result::Result<T, DeviceError>;

impl DeviceError {
    /// 创建验证错误
    pub fn validation(msg: impl Into<String>) -> Self {
        DeviceError::ValidationError(msg.into())
    }
}
