//! 通用常量.

use crate::NeuriteId;

/// 背景体素值.
pub const BACKGROUND: NeuriteId = 0;

/// 缝隙游标在开始前清理体数据时, 保留类别所需的最少体素数.
pub const SEQUENCER_MIN_CLASS_VOXELS: usize = 500;

/// 一对一随机样本模式下, 类别参与采样所需的最少体素数.
pub const PAIR_MIN_CLASS_VOXELS: usize = 400;

/// 一对一随机样本模式下, 正样本缝隙上方至少保留的切片数.
pub const PAIR_TOP_MARGIN: usize = 1;

/// 一对一随机样本模式下, 类别的 z 跨度至少要比最大缝隙宽度多出的切片数.
pub const PAIR_SPAN_SLACK: usize = 2;

/// 默认丢弃的切片数.
pub const DEFAULT_NUM_SLICES: usize = 2;

/// 默认的下方候选搜索半径, 以 x/y 体素为单位.
pub const DEFAULT_RADIUS: f64 = 96.0;

/// 默认的上下文切片数.
pub const DEFAULT_CONTEXT_SLICES: usize = 3;

/// 默认的点云点数.
pub const DEFAULT_NUM_POINTS: usize = 2048;

/// 默认每批保留的最大候选数.
pub const DEFAULT_MAX_CANDIDATES: usize = 4;

/// 默认的最大尝试次数.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

/// 合格样本在裁剪并重标记后应恰好包含的取值个数: 背景, 上方碎片, 下方碎片.
pub const PAIR_VOLUME_VALUES: usize = 3;

/// 体素是否是背景?
#[inline]
pub const fn is_background(p: NeuriteId) -> bool {
    p == BACKGROUND
}

/// 体素是否是前景 (属于某个神经突)?
#[inline]
pub const fn is_foreground(p: NeuriteId) -> bool {
    !is_background(p)
}
