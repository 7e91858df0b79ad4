use std::collections::BTreeMap;

use log::trace;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;

use super::{Gap, GapVolume, SynthSpec};
use crate::augment::Augment;
use crate::consts::{is_background, BACKGROUND, PAIR_VOLUME_VALUES};
use crate::ops::{
    circular_mask, connected_components, crop_to_nonzero, distinct_values, footprint_distance,
    label_extent, resample_points, strip_interior_voxels, to_point_cloud, LabelCorrespondence,
};
use crate::{Example, LabelSlice, LabelVolume, NeuriteId};

/// 一个重连候选.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    fragment: NeuriteId,
    mean_distance: f64,
    example: Example,
}

impl Candidate {
    /// 下方碎片编号.
    #[inline]
    pub fn fragment(&self) -> NeuriteId {
        self.fragment
    }

    /// 下方碎片在搜索圆内的像素到上方碎片足迹的平均距离.
    #[inline]
    pub fn mean_distance(&self) -> f64 {
        self.mean_distance
    }

    /// 对应的样本.
    #[inline]
    pub fn example(&self) -> &Example {
        &self.example
    }

    /// 取出样本.
    #[inline]
    pub fn into_example(self) -> Example {
        self.example
    }
}

/// 一个已知碎片的全部候选, 按平均距离由近及远排列.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
    rejected: usize,
}

impl CandidateSet {
    /// 候选列表.
    #[inline]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// 候选个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// 是否没有候选?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// 因裁剪重标记后取值个数不为 3 等原因被拒绝的候选数.
    #[inline]
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// 正样本个数.
    #[inline]
    pub fn num_positive(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.example.is_positive())
            .count()
    }

    /// 第一个正样本的位置.
    #[inline]
    pub fn first_positive(&self) -> Option<usize> {
        self.candidates.iter().position(|c| c.example.is_positive())
    }

    /// 取出候选列表.
    #[inline]
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

/// 候选合成器. 借用参数与增强能力, 本身不保存状态.
pub struct CandidateSynthesizer<'a> {
    spec: &'a SynthSpec,
    augment: &'a dyn Augment,
}

impl<'a> CandidateSynthesizer<'a> {
    /// 直接初始化.
    #[inline]
    pub fn new(spec: &'a SynthSpec, augment: &'a dyn Augment) -> Self {
        Self { spec, augment }
    }

    /// 为 `gap_volume` 中的上方碎片 `known` 合成全部候选.
    #[inline]
    pub fn synthesize_gap(
        &self,
        gap_volume: &GapVolume,
        known: NeuriteId,
        rng: &mut StdRng,
    ) -> CandidateSet {
        self.synthesize(
            gap_volume.relabeled(),
            known,
            gap_volume.gap(),
            gap_volume.correspondence(),
            rng,
        )
    }

    /// 为缝隙 `gap` 上方的已知标签 `known` 合成全部候选.
    ///
    /// `correspondence` 将 `volume` 中的编号映射为原始编号, 用于计算真值.
    /// 任何几何上的退化情形都只会得到空集合.
    pub fn synthesize(
        &self,
        volume: &LabelVolume,
        known: NeuriteId,
        gap: Gap,
        correspondence: &LabelCorrespondence,
        rng: &mut StdRng,
    ) -> CandidateSet {
        let mut ans = CandidateSet::default();
        let data = volume.data();
        let (sz, sh, sw) = volume.shape();
        if is_background(known) || gap.end() >= sz {
            return ans;
        }
        let Some((zmin, _)) = label_extent(data, known) else {
            return ans;
        };
        if gap.start() <= zmin {
            return ans;
        }
        let top_len = self.spec.context_slices.min(gap.start() - zmin);
        let bottom_len = self.spec.context_slices.min(sz - gap.end());

        let top = data
            .slice(s![gap.start() - top_len..gap.start(), .., ..])
            .mapv(|p| if p == known { p } else { BACKGROUND });
        let top_border = top.index_axis(Axis(0), top_len - 1);
        let Some((ch, cw)) = LabelSlice::new(top_border).foreground_center() else {
            return ans;
        };
        let mask = circular_mask((sh, sw), (ch.round(), cw.round()), self.spec.radius);
        let bottom_border = data.index_axis(Axis(0), gap.end());
        let ranked = rank_by_distance(top_border, known, bottom_border, mask.view());

        let mut stitched = Array3::from_elem((top_len + gap.len() + bottom_len, sh, sw), BACKGROUND);
        stitched.slice_mut(s![..top_len, .., ..]).assign(&top);
        let bottom_src = data.slice(s![gap.end()..gap.end() + bottom_len, .., ..]);

        for (fragment, mean_distance) in ranked {
            let mut current = stitched.clone();
            current
                .slice_mut(s![top_len + gap.len().., .., ..])
                .zip_mut_with(&bottom_src, |dst, &src| {
                    if src == fragment {
                        *dst = fragment;
                    }
                });
            let Some(points) = self.finish(current.view(), rng) else {
                trace!("rejected candidate {fragment} of {known} at gap {gap:?}");
                ans.rejected += 1;
                continue;
            };
            let label = correspondence.same_origin(known, fragment) as u8;
            ans.candidates.push(Candidate {
                fragment,
                mean_distance,
                example: Example::new(points, label),
            });
        }
        ans
    }

    /// 裁剪, 重标记并检查, 提取表面, 转换为点云并重采样, 最后施加增强.
    ///
    /// 裁剪重标记后取值个数不为 3 时返回 `None`.
    pub(crate) fn finish(&self, stitched: ArrayView3<NeuriteId>, rng: &mut StdRng) -> Option<Array2<f32>> {
        let cropped = crop_to_nonzero(stitched)?;
        let relabeled = connected_components(cropped.view(), self.spec.connectivity);
        if distinct_values(relabeled.view()).len() != PAIR_VOLUME_VALUES {
            return None;
        }
        let surface = strip_interior_voxels(relabeled.view(), self.spec.surface);
        let cloud = to_point_cloud(surface.view(), BACKGROUND);
        let points = resample_points(cloud.view(), self.spec.num_points, rng)?;
        Some(self.augment.transform(points, rng))
    }
}

/// 按平均距离由近及远排列下方边界切片上搜索圆内的所有碎片.
///
/// 平均距离为碎片在圆内的像素到上方足迹的倒角距离的均值. 距离相同时编号小者在前.
/// 倒角距离在非轴向、非对角方向上略大于欧氏距离, 平均距离极为接近的候选可能因此换序.
fn rank_by_distance(
    top_border: ArrayView2<NeuriteId>,
    known: NeuriteId,
    bottom_border: ArrayView2<NeuriteId>,
    mask: ArrayView2<bool>,
) -> Vec<(NeuriteId, f64)> {
    let Some(dist) = footprint_distance(top_border, known) else {
        return Vec::new();
    };
    let mut acc: BTreeMap<NeuriteId, (f64, usize)> = BTreeMap::new();
    for ((pos, &p), &inside) in bottom_border.indexed_iter().zip(mask.iter()) {
        if !inside || is_background(p) {
            continue;
        }
        let entry = acc.entry(p).or_insert((0.0, 0));
        entry.0 += dist[pos];
        entry.1 += 1;
    }
    let mut ranked: Vec<_> = acc
        .into_iter()
        .map(|(label, (sum, cnt))| (label, sum / cnt as f64))
        .collect();
    // 稳定排序, 且 `BTreeMap` 已按编号升序.
    ranked.sort_by_key(|&(_, d)| OrderedFloat(d));
    ranked
}
