use std::num::NonZeroUsize;
use std::ops::Range;

use ndarray::{s, Array3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::BACKGROUND;
use crate::ops::{connected_components, correspond_labels, Connectivity, LabelCorrespondence};
use crate::{LabelVolume, NeuriteId};

/// z 方向上被丢弃的切片区间 `[start, end)`. 总满足 `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gap {
    start: usize,
    end: usize,
}

impl Gap {
    /// 创建区间 `[start, end)`. `end <= start` 时返回 `None`.
    #[inline]
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// 创建从 `start` 开始、长度为 `len` 的区间.
    #[inline]
    pub fn from_len(start: usize, len: NonZeroUsize) -> Self {
        Self {
            start,
            end: start + len.get(),
        }
    }

    /// 第一个被丢弃的切片.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// 缝隙下方第一个保留的切片.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// 被丢弃的切片数.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// 缝隙上方紧邻的切片. 缝隙从第 0 层开始时返回 `None`.
    #[inline]
    pub fn top_border(&self) -> Option<usize> {
        self.start.checked_sub(1)
    }

    /// 缝隙上方最多 `context` 层上下文切片, 不越过第 0 层.
    #[inline]
    pub fn above(&self, context: usize) -> Range<usize> {
        self.start.saturating_sub(context)..self.start
    }

    /// 缝隙下方最多 `context` 层上下文切片, 不越过 `depth`.
    #[inline]
    pub fn below(&self, context: usize, depth: usize) -> Range<usize> {
        self.end.min(depth)..self.end.saturating_add(context).min(depth)
    }
}

/// 一个缝隙对应的重标记体数据.
///
/// 只保留缝隙上下各 `context` 层切片, 其余置为背景后做连通分量重标记.
/// 同时给出重标记碎片与原始编号的对应关系, 以及缝隙上方紧邻切片中的所有碎片.
#[derive(Debug, Clone)]
pub struct GapVolume {
    relabeled: LabelVolume,
    correspondence: LabelCorrespondence,
    gap: Gap,
    top_fragments: Vec<NeuriteId>,
}

impl GapVolume {
    /// 为 `volume` 上的缝隙 `gap` 构建重标记体数据.
    pub fn build(
        volume: &LabelVolume,
        gap: Gap,
        context: usize,
        connectivity: Connectivity,
    ) -> Self {
        let depth = volume.len_z();
        let mut carved = Array3::from_elem(volume.shape(), BACKGROUND);
        for range in [gap.above(context), gap.below(context, depth)] {
            carved
                .slice_mut(s![range.clone(), .., ..])
                .assign(&volume.section(range));
        }
        // 重标记不会改变背景.
        let relabeled = LabelVolume::new(connected_components(carved.view(), connectivity));
        // 两者形状相同, 不会返回 `None`.
        let correspondence =
            correspond_labels(relabeled.data(), volume.data(), BACKGROUND).unwrap_or_default();
        let top_fragments = gap
            .top_border()
            .filter(|z| *z < depth)
            .map(|z| relabeled.slice_at(z).labels().into_iter().collect())
            .unwrap_or_default();
        Self {
            relabeled,
            correspondence,
            gap,
            top_fragments,
        }
    }

    /// 重标记后的体数据. 形状与原体数据相同.
    #[inline]
    pub fn relabeled(&self) -> &LabelVolume {
        &self.relabeled
    }

    /// 重标记碎片与原始编号的对应关系.
    #[inline]
    pub fn correspondence(&self) -> &LabelCorrespondence {
        &self.correspondence
    }

    /// 缝隙.
    #[inline]
    pub fn gap(&self) -> Gap {
        self.gap
    }

    /// 缝隙上方紧邻切片中的所有碎片, 升序排列.
    #[inline]
    pub fn top_fragments(&self) -> &[NeuriteId] {
        &self.top_fragments
    }
}
