use std::ops::{Index, Range};

use ndarray::{s, Array3, ArrayView, ArrayView3, Axis, Ix3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{is_background, BACKGROUND};
use crate::{Idx2d, Idx3d, NeuriteId};

pub mod example;
pub mod slice;

pub use example::{BatchId, Example};
pub use slice::LabelSlice;

/// 3D 神经突分割标签体数据, 按照 `(z, h, w)` 组织.
///
/// 值 `0` 为背景, 其余值为该体数据内唯一的神经突编号.
/// 本结构只会被读取或复制, 所有派生操作都返回新的数据.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelVolume {
    data: Array3<NeuriteId>,
}

impl Index<Idx3d> for LabelVolume {
    type Output = NeuriteId;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array3<NeuriteId>> for LabelVolume {
    #[inline]
    fn from(data: Array3<NeuriteId>) -> Self {
        Self::new(data)
    }
}

impl LabelVolume {
    /// 根据 `(z, h, w)` 组织的裸标签数据直接创建.
    ///
    /// 非标准内存布局的数据会被复制为标准布局.
    pub fn new(data: Array3<NeuriteId>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());
        Self { data }
    }

    /// 创建给定形状的全背景体数据.
    #[inline]
    pub fn background(shape: Idx3d) -> Self {
        Self {
            data: Array3::from_elem(shape, BACKGROUND),
        }
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取数据水平切片形状大小.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 获取 z 空间的第 `z_index` 层不可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> LabelSlice {
        LabelSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, NeuriteId, Ix3> {
        self.data.view()
    }

    /// 取出底层数据.
    #[inline]
    pub fn into_inner(self) -> Array3<NeuriteId> {
        self.data
    }

    /// 获取 z 方向 `[range.start, range.end)` 范围内的不可变视图.
    ///
    /// 当范围越界时 panic.
    #[inline]
    pub fn section(&self, range: Range<usize>) -> ArrayView3<'_, NeuriteId> {
        self.data.slice(s![range, .., ..])
    }

    /// 获取值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: NeuriteId) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 体数据是否为全背景?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().all(|p| is_background(*p))
    }
}
