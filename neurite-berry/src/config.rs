//! 实验预设.
//!
//! 把常用的数据集参数集中在一处, 并转换为各生成器的参数结构.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::augment::PointAugmentor;
use crate::consts::*;
use crate::error::ConfigError;
use crate::ops::{Connectivity, SurfaceMode};
use crate::pair::PairSpec;
use crate::sequencer::SequencerSpec;
use crate::synth::SynthSpec;

/// 数据集预设.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatasetPreset {
    /// 丢弃的切片数.
    pub num_slices: usize,
    /// 下方候选搜索半径.
    pub radius: f64,
    /// 上下文切片数.
    pub context_slices: usize,
    /// 点云点数.
    pub num_points: usize,
    /// 是否在第一个正样本处 (含) 截断每批候选.
    pub truncate_at_first_positive: bool,
    /// 每批最多保留的候选数.
    pub max_candidates: Option<usize>,
    /// 是否为每个样本附上分组编号.
    pub add_batch_id: bool,
    /// 表面体素提取方式.
    pub surface: SurfaceMode,
    /// 点云增强.
    pub augmentor: PointAugmentor,
    /// 随机种子.
    pub seed: u64,
}

impl Default for DatasetPreset {
    fn default() -> Self {
        Self {
            num_slices: DEFAULT_NUM_SLICES,
            radius: DEFAULT_RADIUS,
            context_slices: DEFAULT_CONTEXT_SLICES,
            num_points: DEFAULT_NUM_POINTS,
            truncate_at_first_positive: true,
            max_candidates: Some(DEFAULT_MAX_CANDIDATES),
            add_batch_id: true,
            surface: SurfaceMode::Open,
            augmentor: PointAugmentor::default(),
            seed: 0,
        }
    }
}

impl DatasetPreset {
    /// 一对一随机样本预设: 每个样本丢弃 1 到 `num_slices` 层, 半径 128.
    pub fn pair() -> Self {
        Self {
            radius: 128.0,
            max_candidates: None,
            ..Self::default()
        }
    }

    /// 候选合成参数.
    pub fn synth_spec(&self) -> Result<SynthSpec, ConfigError> {
        let spec = SynthSpec {
            radius: self.radius,
            context_slices: self.context_slices,
            num_points: self.num_points,
            surface: self.surface,
            connectivity: Connectivity::TwentySix,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// 缝隙游标参数.
    pub fn sequencer_spec(&self) -> Result<SequencerSpec, ConfigError> {
        let spec = SequencerSpec {
            num_slices: self.num_slices,
            synth: self.synth_spec()?,
            truncate_at_first_positive: self.truncate_at_first_positive,
            max_candidates: self.max_candidates,
            add_batch_id: self.add_batch_id,
            seed: self.seed,
            ..SequencerSpec::default()
        };
        spec.validate()?;
        Ok(spec)
    }

    /// 一对一随机样本参数.
    pub fn pair_spec(&self) -> Result<PairSpec, ConfigError> {
        let spec = PairSpec {
            num_slices: 1..=self.num_slices,
            synth: self.synth_spec()?,
            seed: self.seed,
            ..PairSpec::default()
        };
        spec.validate()?;
        Ok(spec)
    }
}
