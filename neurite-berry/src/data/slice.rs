use std::collections::BTreeSet;

use ndarray::iter::Iter;
use ndarray::{ArrayView2, Ix2};

use crate::{Idx2d, Idx2dF, NeuriteId};

/// 不可变、借用的二维水平标签切片.
#[derive(Debug, Clone, Copy)]
pub struct LabelSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::LabelVolume`] 或任意三维标签数组.
    data: ArrayView2<'a, NeuriteId>,
}

impl<'a> LabelSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub fn new(data: ArrayView2<'a, NeuriteId>) -> Self {
        Self { data }
    }

    /// 获取切片形状 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, (h0, w0): &Idx2d) -> bool {
        let (h, w) = self.shape();
        *h0 < h && *w0 < w
    }

    /// 获取按行优先迭代像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, NeuriteId, Ix2> {
        self.data.iter()
    }

    /// 获取切片中出现的所有前景标签, 升序排列.
    pub fn labels(&self) -> BTreeSet<NeuriteId> {
        crate::ops::unique_labels(self.iter())
    }

    /// 获取前景像素的质心 (高, 宽). 全背景时返回 `None`.
    pub fn foreground_center(&self) -> Option<Idx2dF> {
        crate::ops::center_of_mass(self.data)
    }

    /// 获取 `pos` 周围八个点的坐标.
    ///
    /// 在数据范围外的坐标会被过滤掉, 不会包含在返回值中.
    pub fn n8_positions(&self, (h, w): Idx2d) -> Vec<Idx2d> {
        [
            (h.wrapping_sub(1), w.wrapping_sub(1)),
            (h.wrapping_sub(1), w),
            (h.wrapping_sub(1), w.saturating_add(1)),
            (h, w.wrapping_sub(1)),
            (h, w.saturating_add(1)),
            (h.saturating_add(1), w.wrapping_sub(1)),
            (h.saturating_add(1), w),
            (h.saturating_add(1), w.saturating_add(1)),
        ]
        .into_iter()
        .filter(|pos| self.check(pos))
        .collect()
    }
}
