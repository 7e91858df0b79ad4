use std::collections::{BTreeSet, HashMap};

use ndarray::{Array3, ArrayView3, Axis};

use crate::consts::{is_foreground, BACKGROUND};
use crate::NeuriteId;

/// 收集迭代器中出现的所有前景标签, 升序排列.
pub fn unique_labels<'a, I>(pixels: I) -> BTreeSet<NeuriteId>
where
    I: IntoIterator<Item = &'a NeuriteId>,
{
    pixels
        .into_iter()
        .copied()
        .filter(|p| is_foreground(*p))
        .collect()
}

/// 收集数组中出现的所有取值 (**包括背景**), 升序排列.
pub fn distinct_values(view: ArrayView3<NeuriteId>) -> BTreeSet<NeuriteId> {
    view.iter().copied().collect()
}

/// 统计每个前景标签的体素个数.
pub fn voxel_counts(view: ArrayView3<NeuriteId>) -> HashMap<NeuriteId, usize> {
    let mut counts = HashMap::new();
    for p in view.iter().copied().filter(|p| is_foreground(*p)) {
        *counts.entry(p).or_insert(0usize) += 1;
    }
    counts
}

/// 出现在至少 `min_span` 个不同 z 切片中的标签. 背景永远不是类别.
pub fn classes_spanning_at_least(view: ArrayView3<NeuriteId>, min_span: usize) -> BTreeSet<NeuriteId> {
    let mut spans: HashMap<NeuriteId, usize> = HashMap::new();
    for sli in view.axis_iter(Axis(0)) {
        for label in unique_labels(sli.iter()) {
            *spans.entry(label).or_insert(0) += 1;
        }
    }
    spans
        .into_iter()
        .filter_map(|(label, span)| (span >= min_span).then_some(label))
        .collect()
}

/// 体素个数至少为 `min_voxels` 的标签.
pub fn classes_with_volume_at_least(
    view: ArrayView3<NeuriteId>,
    min_voxels: usize,
) -> BTreeSet<NeuriteId> {
    let mut counts: Vec<_> = voxel_counts(view).into_iter().collect();
    // 按体素个数降序, 个数相同时按标签升序.
    counts.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts
        .into_iter()
        .take_while(|&(_, cnt)| cnt >= min_voxels)
        .map(|(label, _)| label)
        .collect()
}

/// 是否存在体素个数不足 `min_voxels` 的前景标签?
pub fn has_classes_below(view: ArrayView3<NeuriteId>, min_voxels: usize) -> bool {
    min_voxels > 1 && voxel_counts(view).values().any(|&cnt| cnt < min_voxels)
}

/// 将体素个数不足 `min_voxels` 的标签全部置为背景, 返回新数组.
pub fn zero_small_classes(view: ArrayView3<NeuriteId>, min_voxels: usize) -> Array3<NeuriteId> {
    let keep = classes_with_volume_at_least(view, min_voxels);
    view.mapv(|p| if keep.contains(&p) { p } else { BACKGROUND })
}

/// 标签 `label` 出现的第一个和最后一个 z 切片 (闭区间). 不存在时返回 `None`.
pub fn label_extent(view: ArrayView3<NeuriteId>, label: NeuriteId) -> Option<(usize, usize)> {
    let mut present = view
        .axis_iter(Axis(0))
        .enumerate()
        .filter_map(|(z, sli)| sli.iter().any(|p| *p == label).then_some(z));
    let first = present.next()?;
    Some((first, present.last().unwrap_or(first)))
}
