use std::collections::BTreeSet;
use std::f64::consts::SQRT_2;
use std::ops::Range;

use binary_heap_plus::BinaryHeap;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::consts::{is_background, is_foreground};
use crate::{Idx2d, Idx2dF, LabelSlice, NeuriteId};

/// 二维前景像素的质心 (行, 列). 全背景时返回 `None`.
pub fn center_of_mass(slice: ArrayView2<NeuriteId>) -> Option<Idx2dF> {
    let (mut sh, mut sw, mut cnt) = (0.0, 0.0, 0usize);
    for ((h, w), _) in slice.indexed_iter().filter(|(_, p)| is_foreground(**p)) {
        sh += h as f64;
        sw += w as f64;
        cnt += 1;
    }
    (cnt > 0).then(|| (sh / cnt as f64, sw / cnt as f64))
}

/// 以 `center` 为圆心、`radius` 为半径的闭圆盘掩膜, 形状为 `(height, width)`.
pub fn circular_mask((height, width): Idx2d, (ch, cw): Idx2dF, radius: f64) -> Array2<bool> {
    let r2 = radius * radius;
    Array2::from_shape_fn((height, width), |(h, w)| {
        let (dh, dw) = (h as f64 - ch, w as f64 - cw);
        dh * dh + dw * dw <= r2
    })
}

/// 切片中落在掩膜内的所有前景标签, 升序排列.
///
/// 两者形状不同时返回 `None`.
pub fn labels_in_mask(
    slice: ArrayView2<NeuriteId>,
    mask: ArrayView2<bool>,
) -> Option<BTreeSet<NeuriteId>> {
    if slice.dim() != mask.dim() {
        return None;
    }
    let ans = slice
        .iter()
        .zip(mask.iter())
        .filter_map(|(&p, &inside)| (inside && is_foreground(p)).then_some(p))
        .collect();
    Some(ans)
}

/// 三维包围盒, 各维均为左闭右开区间.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    /// z 方向.
    pub z: Range<usize>,
    /// 高方向.
    pub h: Range<usize>,
    /// 宽方向.
    pub w: Range<usize>,
}

impl BoundingBox {
    /// 包围盒形状.
    #[inline]
    pub fn shape(&self) -> crate::Idx3d {
        (self.z.len(), self.h.len(), self.w.len())
    }
}

/// 沿 `axis` 方向含有前景的下标范围.
fn nonzero_range(view: &ArrayView3<NeuriteId>, axis: usize) -> Option<Range<usize>> {
    let mut present = view
        .axis_iter(Axis(axis))
        .enumerate()
        .filter_map(|(i, sub)| sub.iter().any(|p| is_foreground(*p)).then_some(i));
    let first = present.next()?;
    let last = present.last().unwrap_or(first);
    Some(first..last + 1)
}

/// 包含所有前景体素的最小包围盒. 全背景时返回 `None`.
pub fn nonzero_bounds(view: ArrayView3<NeuriteId>) -> Option<BoundingBox> {
    Some(BoundingBox {
        z: nonzero_range(&view, 0)?,
        h: nonzero_range(&view, 1)?,
        w: nonzero_range(&view, 2)?,
    })
}

/// 裁剪到包含所有前景体素的最小包围盒. 全背景时返回 `None`.
pub fn crop_to_nonzero(view: ArrayView3<NeuriteId>) -> Option<Array3<NeuriteId>> {
    let bb = nonzero_bounds(view)?;
    Some(view.slice(s![bb.z, bb.h, bb.w]).to_owned())
}

/// 切片上每个像素到标签 `label` 足迹的 8-邻接倒角距离.
///
/// 直邻步长为 1, 斜邻步长为 √2. 这是欧氏距离的近似: 沿轴向和对角方向精确,
/// 其余方向偏大, 最多约 8.2% (如偏移 `(1, 2)` 处为 `1 + √2`, 欧氏距离为 `√5`).
/// 切片中不存在 `label` 时返回 `None`.
pub fn footprint_distance(slice: ArrayView2<NeuriteId>, label: NeuriteId) -> Option<Array2<f64>> {
    debug_assert!(!is_background(label));
    let view = LabelSlice::new(slice);
    let mut dist = Array2::from_elem(view.shape(), f64::INFINITY);
    // 堆顶距离最小.
    let mut heap: BinaryHeap<(f64, Idx2d), _> =
        BinaryHeap::new_by(|a: &(f64, Idx2d), b: &(f64, Idx2d)| b.0.total_cmp(&a.0));
    heap.reserve(64);

    for (pos, _) in slice.indexed_iter().filter(|(_, p)| **p == label) {
        dist[pos] = 0.0;
        heap.push((0.0, pos));
    }
    if heap.is_empty() {
        return None;
    }

    while let Some((d, pos)) = heap.pop() {
        if d > dist[pos] {
            continue;
        }
        for neigh in view.n8_positions(pos) {
            let step = if neigh.0 != pos.0 && neigh.1 != pos.1 {
                SQRT_2
            } else {
                1.0
            };
            let nd = d + step;
            if nd < dist[neigh] {
                dist[neigh] = nd;
                heap.push((nd, neigh));
            }
        }
    }
    Some(dist)
}
