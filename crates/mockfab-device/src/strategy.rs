use crate::error::{DeviceError, Result};
use crate::model::SimulationType;
use rand::Rng;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 信号生成策略
///
/// 每个实现模拟一种车间里真实会遇到的信号形态，从稳态读数到
/// 灾难性传感器故障。`generate` 除了 SineWave 的共享相位计数器外
/// 不允许有副作用。
pub trait SignalStrategy: Send + Sync {
    /// 为一个模拟设备产生下一个过程值
    ///
    /// * `current` - 设备当前读数（漂移类算法以它为基准）
    /// * `min` / `max` - 工程量程
    fn generate(&self, current: f64, min: f64, max: f64) -> f64;

    /// 策略名称（用于日志）
    fn name(&self) -> &str;
}

/// 四舍五入到 2 位小数 —— 只在最终发布值上做，游走和反弹用全精度计算
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 边界反弹：越界的候选值按镜像折回量程内
///
/// 反弹而不是贴边截断，避免信号粘在量程边缘 —— 模拟安全阀、
/// 热保护这类物理限制器的行为。
fn reflect(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min + (min - value)
    } else if value > max {
        max - (value - max)
    } else {
        value
    }
}

/// 有界随机游走一步：±volatility 均匀步长 + 边界反弹 + 保底截断
fn bounded_walk(current: f64, min: f64, max: f64, volatility_factor: f64) -> f64 {
    let mut rng = rand::thread_rng();
    let volatility = (max - min) * volatility_factor;

    let delta = (rng.gen::<f64>() * 2.0 - 1.0) * volatility;
    let mut next = reflect(current + delta, min, max);

    // 步长远大于量程时反弹本身可能再次越界，保底截断兜住
    next = next.clamp(min, max);
    round2(next)
}

/// 布朗运动（随机游走）信号生成器
///
/// 模拟一台读数逐渐漂移、而不是每个扫描周期跳变的真实工业仪表。
/// 1.5% 的量程步长在 1s 周期下足够平滑，是默认策略。
pub struct RealisticStrategy;

impl RealisticStrategy {
    const VOLATILITY_FACTOR: f64 = 0.015;
}

impl SignalStrategy for RealisticStrategy {
    fn generate(&self, current: f64, min: f64, max: f64) -> f64 {
        bounded_walk(current, min, max, Self::VOLATILITY_FACTOR)
    }

    fn name(&self) -> &str {
        "REALISTIC"
    }
}

/// 有界随机游走信号生成器（中等噪声）
///
/// RealisticStrategy 的高噪声版本：±5% 量程步长，读数仍与上一周期
/// 相关（不瞬移），像轴承有旷量的旋转机械上的振动探头。
pub struct RandomStrategy;

impl RandomStrategy {
    const VOLATILITY_FACTOR: f64 = 0.05;
}

impl SignalStrategy for RandomStrategy {
    fn generate(&self, current: f64, min: f64, max: f64) -> f64 {
        bounded_walk(current, min, max, Self::VOLATILITY_FACTOR)
    }

    fn name(&self) -> &str {
        "RANDOM"
    }
}

/// 平滑正弦振荡生成器
///
/// 约 200 个 tick 扫过一个完整周期，在趋势图上一眼可辨。
/// 相位计数器是所有正弦设备共享的：不同扫描频率的设备在墙钟
/// 时间上会彼此错开，但共享同一个相位推进 —— 这是有意保留的行为。
pub struct SineWaveStrategy {
    /// 全局 tick 计数器，每次 generate 调用递增，从不重置
    tick: AtomicU64,
}

impl SineWaveStrategy {
    /// 一个完整正弦周期的 tick 数
    const PERIOD: f64 = 200.0;

    pub fn new() -> Self {
        Self {
            tick: AtomicU64::new(0),
        }
    }
}

impl Default for SineWaveStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalStrategy for SineWaveStrategy {
    fn generate(&self, _current: f64, min: f64, max: f64) -> f64 {
        let t = self.tick.fetch_add(1, Ordering::Relaxed);

        // 把正弦输出 (-1…+1) 映射进工程量程
        let amplitude = (max - min) / 2.0;
        let midpoint = (max + min) / 2.0;
        let raw = midpoint + amplitude * (2.0 * PI * t as f64 / Self::PERIOD).sin();

        round2(raw)
    }

    fn name(&self) -> &str {
        "SINE_WAVE"
    }
}

/// 混沌 / 故障注入信号生成器
///
/// 模拟一个大部分时间稳定、偶尔产生灾难性读数的传感器 ——
/// SCADA 报警系统必须抓住的那种尖峰：
/// * 95% 的 tick：围绕当前值的小幅漂移（正常仪表噪声），贴边截断；
/// * 5% 的 tick：故障值，在断线哨兵 -999 和变送器饱和 max×2 之间
///   抛硬币二选一（不是连续抽取）。
///
/// 故障分支刻意落在量程外，稳定分支永远不会。
pub struct ChaosStrategy;

impl ChaosStrategy {
    /// 故障注入概率（5%）
    const FAULT_PROBABILITY: f64 = 0.05;

    /// 传感器断线 / 开路的哨兵值
    const WIRE_BREAK_VALUE: f64 = -999.0;
}

impl SignalStrategy for ChaosStrategy {
    fn generate(&self, current: f64, min: f64, max: f64) -> f64 {
        let mut rng = rand::thread_rng();

        if rng.gen::<f64>() < Self::FAULT_PROBABILITY {
            return if rng.gen_bool(0.5) {
                Self::WIRE_BREAK_VALUE
            } else {
                max * 2.0
            };
        }

        // 正常运行：±2% 量程的小幅噪声，无反弹，直接截断
        let range = max - min;
        let noise = (rng.gen::<f64>() - 0.5) * range * 0.04;
        let next = (current + noise).clamp(min, max);
        round2(next)
    }

    fn name(&self) -> &str {
        "CHAOS"
    }
}

/// 策略集合
///
/// 按 SimulationType 查找策略实例。变体集合是封闭的（4 个成员），
/// 解析失败意味着程序不变量被破坏，必须响亮地失败而不是静默
/// 回退默认策略。
pub struct StrategySet {
    strategies: HashMap<SimulationType, Arc<dyn SignalStrategy>>,
}

impl StrategySet {
    /// 注册全部内建策略
    pub fn new() -> Self {
        let mut strategies: HashMap<SimulationType, Arc<dyn SignalStrategy>> = HashMap::new();
        strategies.insert(SimulationType::Realistic, Arc::new(RealisticStrategy));
        strategies.insert(SimulationType::Random, Arc::new(RandomStrategy));
        strategies.insert(SimulationType::SineWave, Arc::new(SineWaveStrategy::new()));
        strategies.insert(SimulationType::Chaos, Arc::new(ChaosStrategy));
        Self { strategies }
    }

    /// 解析策略
    pub fn resolve(&self, kind: SimulationType) -> Result<Arc<dyn SignalStrategy>> {
        self.strategies
            .get(&kind)
            .cloned()
            .ok_or_else(|| DeviceError::StrategyResolution(kind.as_str().to_string()))
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::new()
    }
}
