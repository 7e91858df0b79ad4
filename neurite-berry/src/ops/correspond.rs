use std::collections::{BTreeSet, HashMap};

use log::warn;
use ndarray::ArrayView3;

use crate::NeuriteId;

/// 重标记碎片编号到原始神经突编号的对应关系.
///
/// 在一个缝隙内构建一次, 供该缝隙的所有候选查询真值.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCorrespondence {
    map: HashMap<NeuriteId, NeuriteId>,
    ambiguous: BTreeSet<NeuriteId>,
}

impl LabelCorrespondence {
    /// 重标记编号 `relabeled` 对应的原始编号.
    #[inline]
    pub fn get(&self, relabeled: NeuriteId) -> Option<NeuriteId> {
        self.map.get(&relabeled).copied()
    }

    /// 两个重标记碎片是否来自同一原始神经突?
    ///
    /// 任一方没有对应关系时返回 `false`.
    pub fn same_origin(&self, a: NeuriteId, b: NeuriteId) -> bool {
        matches!((self.get(a), self.get(b)), (Some(x), Some(y)) if x == y)
    }

    /// 有对应关系的碎片个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// 是否没有任何对应关系?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 碎片 `relabeled` 下是否观察到了多个不同的原始编号?
    #[inline]
    pub fn is_ambiguous(&self, relabeled: NeuriteId) -> bool {
        self.ambiguous.contains(&relabeled)
    }

    /// 所有对应关系不唯一的碎片, 升序排列.
    #[inline]
    pub fn ambiguous(&self) -> impl Iterator<Item = NeuriteId> + '_ {
        self.ambiguous.iter().copied()
    }
}

/// 构建重标记数组 `relabeled` 与原数组 `original` 之间的标签对应关系.
///
/// 对每个重标记碎片, 记录其下方的原始前景编号; 以扫描顺序最后观察到的为准.
/// 同一碎片下出现多个不同原始编号时输出警告, 并记录在返回值中.
///
/// 两个数组形状不同时返回 `None`.
pub fn correspond_labels(
    relabeled: ArrayView3<NeuriteId>,
    original: ArrayView3<NeuriteId>,
    background: NeuriteId,
) -> Option<LabelCorrespondence> {
    if relabeled.dim() != original.dim() {
        return None;
    }
    let mut ans = LabelCorrespondence::default();
    for (&r, &o) in relabeled.iter().zip(original.iter()) {
        if r == background || o == background {
            continue;
        }
        if let Some(prev) = ans.map.insert(r, o) {
            if prev != o {
                ans.ambiguous.insert(r);
            }
        }
    }
    for id in ans.ambiguous.iter() {
        warn!(
            "fragment {id} overlaps several original labels, keeping {:?}",
            ans.map.get(id)
        );
    }
    Some(ans)
}
