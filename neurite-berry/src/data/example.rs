use std::fmt;

use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 同一批候选样本共享的分组编号.
///
/// 同一 (体数据, 缝隙起点, 上方碎片) 三元组生成的所有候选共享同一编号,
/// 下游可据此按组计算排序类指标.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatchId {
    /// 体数据索引.
    pub volume: usize,
    /// 缝隙起点 (z).
    pub gap_start: usize,
    /// 上方碎片在当前缝隙中的访问序号.
    pub fragment: usize,
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.volume, self.gap_start, self.fragment)
    }
}

/// 一条训练样本: 固定点数的点云, 二分类真值, 以及可选的分组编号.
///
/// 点云形状为 `(N, 3)`, 每行依次为 `(z, y, x)`. 点的先后顺序没有意义.
/// 样本一经生成便不可修改.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Example {
    points: Array2<f32>,
    label: u8,
    group: Option<BatchId>,
}

impl Example {
    #[inline]
    pub(crate) fn new(points: Array2<f32>, label: u8) -> Self {
        debug_assert_eq!(points.ncols(), 3);
        debug_assert!(label <= 1);
        Self {
            points,
            label,
            group: None,
        }
    }

    #[inline]
    pub(crate) fn with_group(mut self, id: BatchId) -> Self {
        self.group = Some(id);
        self
    }

    /// 点云, 形状 `(N, 3)`.
    #[inline]
    pub fn points(&self) -> ArrayView2<'_, f32> {
        self.points.view()
    }

    /// 点数 `N`.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// 点云是否为空? 由本 crate 生成的样本永远非空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 真值. `1` 表示上下两个碎片原本属于同一神经突.
    #[inline]
    pub fn label(&self) -> u8 {
        self.label
    }

    /// 是否为正样本?
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.label == 1
    }

    /// 分组编号.
    #[inline]
    pub fn group(&self) -> Option<BatchId> {
        self.group
    }

    /// 通道优先的点云副本, 形状 `(3, N)`.
    pub fn channels_first(&self) -> Array2<f32> {
        self.points.t().to_owned()
    }

    /// 拆解为 (点云, 真值, 分组编号).
    #[inline]
    pub fn into_parts(self) -> (Array2<f32>, u8, Option<BatchId>) {
        (self.points, self.label, self.group)
    }
}
