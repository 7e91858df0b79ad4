//! 标签体数据上的无状态基础操作.
//!
//! 所有操作只读取输入, 派生结果总是新分配的数组.
//! 输入为空 (全背景、单体素碎片等) 时以 `None` 或空集合表示无结果, 不会 panic.

mod classes;
mod components;
mod correspond;
mod geometry;
mod points;
mod surface;

pub use classes::{
    classes_spanning_at_least, classes_with_volume_at_least, distinct_values, label_extent,
    has_classes_below, unique_labels, voxel_counts, zero_small_classes,
};
pub use components::{connected_components, Connectivity};
pub use correspond::{correspond_labels, LabelCorrespondence};
pub use geometry::{
    center_of_mass, circular_mask, crop_to_nonzero, footprint_distance, labels_in_mask,
    nonzero_bounds, BoundingBox,
};
pub use points::{resample_points, to_point_cloud};
pub use surface::{strip_interior_voxels, SurfaceMode};

use crate::Idx3d;

/// 三维偏移量.
pub(crate) type Offset3d = (isize, isize, isize);

/// 将 `pos` 沿 `offset` 平移. 结果越出 `shape` 时返回 `None`.
#[inline]
pub(crate) fn shift3d(
    (z, h, w): Idx3d,
    (dz, dh, dw): Offset3d,
    (lz, lh, lw): Idx3d,
) -> Option<Idx3d> {
    let z = z.checked_add_signed(dz)?;
    let h = h.checked_add_signed(dh)?;
    let w = w.checked_add_signed(dw)?;
    (z < lz && h < lh && w < lw).then_some((z, h, w))
}
