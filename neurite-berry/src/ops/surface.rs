use ndarray::{Array3, ArrayView3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::components::FACE_6;
use super::{shift3d, Offset3d};
use crate::consts::{is_background, BACKGROUND};
use crate::NeuriteId;

/// 切片内上下左右四个邻居.
const IN_SLICE_4: [Offset3d; 4] = [(0, -1, 0), (0, 1, 0), (0, 0, -1), (0, 0, 1)];

/// 表面体素提取方式.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurfaceMode {
    /// 每个 z 切片独立处理, 使用 4-邻接. 得到两端开口的管状表面.
    #[default]
    Open,
    /// 在整个体数据上处理, 使用 6-邻接. 得到封闭的外壳.
    Closed,
}

impl SurfaceMode {
    #[inline]
    fn offsets(self) -> &'static [Offset3d] {
        match self {
            Self::Open => &IN_SLICE_4,
            Self::Closed => &FACE_6,
        }
    }
}

/// 只保留表面体素, 返回新数组.
///
/// 前景体素只要有一个邻居的值与其不同 (包括背景) 即为表面体素.
/// 数组范围外的位置视为背景.
pub fn strip_interior_voxels(view: ArrayView3<NeuriteId>, mode: SurfaceMode) -> Array3<NeuriteId> {
    let shape = view.dim();
    let offsets = mode.offsets();
    Array3::from_shape_fn(shape, |pos| {
        let p = view[pos];
        if is_background(p) {
            return BACKGROUND;
        }
        let on_surface = offsets.iter().any(|&d| match shift3d(pos, d, shape) {
            Some(neigh) => view[neigh] != p,
            None => true,
        });
        if on_surface {
            p
        } else {
            BACKGROUND
        }
    })
}
