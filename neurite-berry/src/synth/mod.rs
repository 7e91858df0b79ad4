//! 一对多候选合成.
//!
//! 给定缝隙上方的已知碎片, 枚举缝隙下方半径内的所有碎片作为重连候选,
//! 每个候选都被转换为固定点数的点云, 并根据标签对应关系给出真值.

mod candidate;
mod gap;

pub use candidate::{Candidate, CandidateSet, CandidateSynthesizer};
pub use gap::{Gap, GapVolume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CONTEXT_SLICES, DEFAULT_NUM_POINTS, DEFAULT_RADIUS};
use crate::error::ConfigError;
use crate::ops::{Connectivity, SurfaceMode};

/// 候选合成参数.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynthSpec {
    /// 下方候选搜索半径, 以 x/y 体素为单位.
    pub radius: f64,
    /// 缝隙上下各保留的最大上下文切片数.
    pub context_slices: usize,
    /// 每个样本的点数.
    pub num_points: usize,
    /// 表面体素提取方式.
    pub surface: SurfaceMode,
    /// 重标记所用的连通规则.
    pub connectivity: Connectivity,
}

impl Default for SynthSpec {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            context_slices: DEFAULT_CONTEXT_SLICES,
            num_points: DEFAULT_NUM_POINTS,
            surface: SurfaceMode::default(),
            connectivity: Connectivity::default(),
        }
    }
}

impl SynthSpec {
    /// 以默认的表面提取方式与连通规则创建, 并检查参数.
    pub fn new(radius: f64, context_slices: usize, num_points: usize) -> Result<Self, ConfigError> {
        let spec = Self {
            radius,
            context_slices,
            num_points,
            ..Self::default()
        };
        spec.validate()?;
        Ok(spec)
    }

    /// 检查参数合法性.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        if self.context_slices == 0 {
            return Err(ConfigError::ZeroContext);
        }
        if self.num_points == 0 {
            return Err(ConfigError::ZeroPoints);
        }
        Ok(())
    }
}
