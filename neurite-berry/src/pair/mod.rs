//! 一对一随机样本.
//!
//! 每个合格类别贡献一个正样本和一个负样本, 偶数索引为正样本, 奇数索引为负样本.
//! 单次生成可能因为几何退化而失败, 此时以随机索引有界重试.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use log::{debug, info};
use ndarray::{s, Array3, ArrayView3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::augment::{Augment, Identity};
use crate::consts::{
    BACKGROUND, DEFAULT_MAX_ATTEMPTS, PAIR_MIN_CLASS_VOXELS, PAIR_SPAN_SLACK, PAIR_TOP_MARGIN,
};
use crate::error::{ConfigError, GenerateError};
use crate::ops::{
    circular_mask, classes_spanning_at_least, classes_with_volume_at_least,
    connected_components, label_extent, labels_in_mask,
};
use crate::synth::{CandidateSynthesizer, SynthSpec};
use crate::{Example, LabelSlice, LabelVolume, NeuriteId};

/// 一对一随机样本参数.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairSpec {
    /// 每个样本丢弃的切片数, 闭区间, 每个样本在其中均匀抽取.
    pub num_slices: RangeInclusive<usize>,
    /// 半径, 上下文, 点数等合成参数.
    pub synth: SynthSpec,
    /// 失败时是否以随机索引重试.
    pub retry: bool,
    /// 单次请求的最大尝试次数.
    pub max_attempts: u32,
    /// 每个 epoch 重复遍历类别的次数.
    pub epoch_multiplier: usize,
    /// 构造时是否打乱类别顺序.
    pub shuffle: bool,
    /// 类别参与采样所需的最少体素数.
    pub min_class_voxels: usize,
    /// 随机种子.
    pub seed: u64,
}

impl Default for PairSpec {
    fn default() -> Self {
        Self {
            num_slices: crate::consts::DEFAULT_NUM_SLICES..=crate::consts::DEFAULT_NUM_SLICES,
            synth: SynthSpec::default(),
            retry: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            epoch_multiplier: 1,
            shuffle: false,
            min_class_voxels: PAIR_MIN_CLASS_VOXELS,
            seed: 0,
        }
    }
}

impl PairSpec {
    /// 检查参数合法性.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = (*self.num_slices.start(), *self.num_slices.end());
        if lo == 0 {
            return Err(ConfigError::ZeroSlices);
        }
        if lo > hi {
            return Err(ConfigError::InvalidSliceRange(lo, hi));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        self.synth.validate()
    }

    /// 类别所需的最小 z 跨度.
    #[inline]
    pub fn min_span(&self) -> usize {
        self.num_slices.end() + PAIR_SPAN_SLACK
    }
}

/// 一对一随机样本生成器.
pub struct PairExampleBuilder<'a> {
    volumes: &'a [LabelVolume],
    spec: PairSpec,
    /// (体数据索引, 类别).
    classes: Vec<(usize, NeuriteId)>,
    augment: Box<dyn Augment>,
    rng: StdRng,
}

impl<'a> PairExampleBuilder<'a> {
    /// 以恒等增强创建.
    #[inline]
    pub fn new(volumes: &'a [LabelVolume], spec: PairSpec) -> Result<Self, ConfigError> {
        Self::with_augment(volumes, spec, Box::new(Identity))
    }

    /// 创建生成器, 并在此时选定所有合格类别.
    ///
    /// 类别需同时满足: z 跨度不少于最大丢弃切片数加 2, 体素数不少于给定阈值.
    pub fn with_augment(
        volumes: &'a [LabelVolume],
        spec: PairSpec,
        augment: Box<dyn Augment>,
    ) -> Result<Self, ConfigError> {
        spec.validate()?;
        if volumes.is_empty() {
            return Err(ConfigError::NoVolumes);
        }
        let mut rng = StdRng::seed_from_u64(spec.seed);
        let mut classes = Vec::new();
        for (i, v) in volumes.iter().enumerate() {
            let spanning = classes_spanning_at_least(v.data(), spec.min_span());
            let large = classes_with_volume_at_least(v.data(), spec.min_class_voxels);
            let selected: BTreeSet<_> = spanning.intersection(&large).copied().collect();
            debug!("volume {i}: {} classes qualify", selected.len());
            classes.extend(selected.into_iter().map(|c| (i, c)));
        }
        if classes.is_empty() {
            return Err(ConfigError::NoClasses);
        }
        if spec.shuffle {
            classes.shuffle(&mut rng);
        }
        info!(
            "pair builder over {} volumes with {} classes",
            volumes.len(),
            classes.len()
        );
        Ok(Self {
            volumes,
            spec,
            classes,
            augment,
            rng,
        })
    }

    /// 一个 epoch 内的样本数 (未乘 epoch 倍数).
    #[inline]
    pub fn true_len(&self) -> usize {
        self.classes.len() * 2
    }

    /// 样本总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.true_len() * self.spec.epoch_multiplier
    }

    /// 是否没有样本? 仅当 epoch 倍数为 0 时成立.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 所有合格的 (体数据索引, 类别).
    #[inline]
    pub fn classes(&self) -> &[(usize, NeuriteId)] {
        &self.classes
    }

    /// 参数.
    #[inline]
    pub fn spec(&self) -> &PairSpec {
        &self.spec
    }

    /// 索引对应的 (体数据索引, 类别, 真值).
    pub fn target(&self, index: usize) -> (usize, NeuriteId, u8) {
        let index = index % self.true_len();
        let label = (index % 2 == 0) as u8;
        let (vol, class) = self.classes[index / 2];
        (vol, class, label)
    }

    /// 生成第 `index` 个样本.
    ///
    /// 失败时若开启重试, 则以随机索引重试, 至多尝试 `max_attempts` 次.
    pub fn example(&mut self, index: usize) -> Result<Example, GenerateError> {
        let mut current = index;
        for attempt in 1..=self.spec.max_attempts {
            if let Some(ex) = self.try_example(current) {
                return Ok(ex);
            }
            if !self.spec.retry {
                return Err(GenerateError::Degenerate(index));
            }
            current = self.rng.gen_range(0..self.true_len());
            debug!("attempt {attempt} failed, redo on index {current}");
        }
        Err(GenerateError::AttemptsExhausted {
            index,
            attempts: self.spec.max_attempts,
        })
    }

    /// 尝试生成第 `index` 个样本, 不重试.
    pub fn try_example(&mut self, index: usize) -> Option<Example> {
        let (vol, class, label) = self.target(index);
        let num_slices = self.rng.gen_range(self.spec.num_slices.clone());
        let stitched = self.build_volumetric(vol, class, label, num_slices)?;
        let synth = CandidateSynthesizer::new(&self.spec.synth, self.augment.as_ref());
        let points = synth.finish(stitched.view(), &mut self.rng)?;
        Some(Example::new(points, label))
    }

    /// 拼接一个上下碎片对, 缝隙内为背景. 任一步骤找不到对象时返回 `None`.
    fn build_volumetric(
        &mut self,
        vol: usize,
        class: NeuriteId,
        label: u8,
        num_slices: usize,
    ) -> Option<Array3<NeuriteId>> {
        let volumes = self.volumes;
        let data = volumes[vol].data();
        let (sz, sh, sw) = volumes[vol].shape();
        let conn = self.spec.synth.connectivity;
        let context = self.spec.synth.context_slices;

        let (zmin, zmax) = label_extent(data, class)?;
        let upper = if label == 1 {
            // 正样本缝隙之下还需要保留至少一层该类别.
            (zmax + 1).checked_sub(PAIR_TOP_MARGIN + num_slices)?
        } else {
            zmax + 1
        };
        // 缝隙之下必须存在边界切片.
        let upper = upper.min(sz.checked_sub(num_slices + 1)?);
        let lower = zmin + PAIR_TOP_MARGIN;
        if lower > upper {
            return None;
        }
        let drop_start = self.rng.gen_range(lower..=upper);
        let drop_end = drop_start + num_slices;
        let top_len = context.min(drop_start - zmin);
        let bottom_len = context.min(sz - drop_end);

        let mut top = relabel_masked(
            data.slice(s![drop_start - top_len..drop_start, .., ..]),
            class,
            conn,
        );
        let top_choices: Vec<_> = LabelSlice::new(top.index_axis(Axis(0), top_len - 1))
            .labels()
            .into_iter()
            .collect();
        let &top_fragment = top_choices.choose(&mut self.rng)?;
        keep_only(&mut top, top_fragment);

        let (ch, cw) = LabelSlice::new(top.index_axis(Axis(0), top_len - 1)).foreground_center()?;
        let mask = circular_mask((sh, sw), (ch.round(), cw.round()), self.spec.synth.radius);
        let bottom_class = if label == 1 {
            class
        } else {
            let mut mismatch = labels_in_mask(data.index_axis(Axis(0), drop_end), mask.view())?;
            mismatch.remove(&class);
            let mismatch: Vec<_> = mismatch.into_iter().collect();
            let Some(&c) = mismatch.choose(&mut self.rng) else {
                debug!("no mismatched class near {class} in volume {vol}");
                return None;
            };
            c
        };

        let mut bottom = relabel_masked(
            data.slice(s![drop_end..drop_end + bottom_len, .., ..]),
            bottom_class,
            conn,
        );
        let bottom_choices: Vec<_> = labels_in_mask(bottom.index_axis(Axis(0), 0), mask.view())?
            .into_iter()
            .collect();
        let Some(&bottom_fragment) = bottom_choices.choose(&mut self.rng) else {
            debug!("no fragment of {bottom_class} within radius in volume {vol}");
            return None;
        };
        keep_only(&mut bottom, bottom_fragment);

        let mut stitched = Array3::from_elem((top_len + num_slices + bottom_len, sh, sw), BACKGROUND);
        stitched.slice_mut(s![..top_len, .., ..]).assign(&top);
        stitched
            .slice_mut(s![top_len + num_slices.., .., ..])
            .assign(&bottom);
        Some(stitched)
    }
}

/// 只保留值为 `class` 的体素, 并做连通分量重标记.
fn relabel_masked(
    section: ArrayView3<NeuriteId>,
    class: NeuriteId,
    conn: crate::ops::Connectivity,
) -> Array3<NeuriteId> {
    let masked = section.mapv(|p| if p == class { p } else { BACKGROUND });
    connected_components(masked.view(), conn)
}

#[inline]
fn keep_only(arr: &mut Array3<NeuriteId>, id: NeuriteId) {
    arr.mapv_inplace(|p| if p == id { p } else { BACKGROUND });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 两个紧挨着的长方体神经突 1, 2 贯穿全部切片, 以及一个过小的神经突 3.
    fn volumes() -> Vec<LabelVolume> {
        vec![LabelVolume::new(Array3::from_shape_fn(
            (12, 30, 30),
            |(z, h, w)| match (z, h, w) {
                (_, 5..=14, 5..=14) => 1,
                (_, 5..=14, 17..=26) => 2,
                (0..=1, 20..=21, 20..=21) => 3,
                _ => 0,
            },
        ))]
    }

    fn spec() -> PairSpec {
        PairSpec {
            num_slices: 1..=3,
            synth: SynthSpec::new(40.0, 2, 64).unwrap(),
            seed: 42,
            ..PairSpec::default()
        }
    }

    #[test]
    fn test_validate() {
        let vols = volumes();
        let bad = PairSpec {
            num_slices: 0..=2,
            ..spec()
        };
        assert_eq!(
            PairExampleBuilder::new(&vols, bad).err(),
            Some(ConfigError::ZeroSlices)
        );
        #[allow(clippy::reversed_empty_ranges)]
        let bad = PairSpec {
            num_slices: 3..=2,
            ..spec()
        };
        assert_eq!(
            PairExampleBuilder::new(&vols, bad).err(),
            Some(ConfigError::InvalidSliceRange(3, 2))
        );
        let bad = PairSpec {
            max_attempts: 0,
            ..spec()
        };
        assert_eq!(
            PairExampleBuilder::new(&vols, bad).err(),
            Some(ConfigError::ZeroAttempts)
        );
        assert_eq!(
            PairExampleBuilder::new(&[], spec()).err(),
            Some(ConfigError::NoVolumes)
        );
    }

    #[test]
    fn test_classes_and_len() {
        let vols = volumes();
        let b = PairExampleBuilder::new(&vols, spec()).unwrap();
        assert_eq!(b.classes(), &[(0, 1), (0, 2)]);
        assert_eq!(b.true_len(), 4);
        assert_eq!(b.len(), 4);
        assert_eq!(b.target(0), (0, 1, 1));
        assert_eq!(b.target(1), (0, 1, 0));
        assert_eq!(b.target(2), (0, 2, 1));
        assert_eq!(b.target(7), (0, 2, 0));

        let b = PairExampleBuilder::new(
            &vols,
            PairSpec {
                epoch_multiplier: 3,
                ..spec()
            },
        )
        .unwrap();
        assert_eq!(b.len(), 12);
    }

    #[test]
    fn test_no_classes() {
        let vols = vec![LabelVolume::background((6, 8, 8))];
        assert_eq!(
            PairExampleBuilder::new(&vols, spec()).err(),
            Some(ConfigError::NoClasses)
        );
    }

    #[test]
    fn test_examples_alternate() {
        let vols = volumes();
        let mut b = PairExampleBuilder::new(&vols, spec()).unwrap();
        for index in 0..8 {
            let ex = b.example(index).unwrap();
            assert_eq!(ex.points().dim(), (64, 3));
            assert_eq!(ex.label(), b.target(index).2);
            assert_eq!(ex.group(), None);
        }
    }

    #[test]
    fn test_negative_without_neighbour() {
        // 只有一个神经突, 负样本永远找不到.
        let vols = vec![LabelVolume::new(Array3::from_shape_fn(
            (10, 20, 20),
            |(_, h, w)| if (4..12).contains(&h) && (4..12).contains(&w) { 1 } else { 0 },
        ))];
        let mut b = PairExampleBuilder::new(
            &vols,
            PairSpec {
                retry: false,
                ..spec()
            },
        )
        .unwrap();
        assert!(b.example(0).is_ok());
        assert_eq!(b.example(1), Err(GenerateError::Degenerate(1)));

        let mut b = PairExampleBuilder::new(
            &vols,
            PairSpec {
                num_slices: 2..=2,
                max_attempts: 64,
                ..spec()
            },
        )
        .unwrap();
        // 随机重试总会落到正样本上.
        assert!(b.example(1).unwrap().is_positive());
    }

    #[test]
    fn test_attempts_exhausted() {
        // 神经突在奇偶层间来回跳动. 丢弃两层时缝隙上下的碎片总是相距很远,
        // 加上很小的半径, 正负样本都无法生成.
        let vols = vec![LabelVolume::new(Array3::from_shape_fn(
            (8, 40, 40),
            |(z, h, w)| match (z % 2, h, w) {
                (0, 2..=9, 2..=9) => 1,
                (1, 30..=37, 30..=37) => 1,
                _ => 0,
            },
        ))];
        let mut b = PairExampleBuilder::new(
            &vols,
            PairSpec {
                num_slices: 2..=2,
                synth: SynthSpec::new(1.0, 2, 16).unwrap(),
                max_attempts: 5,
                ..spec()
            },
        )
        .unwrap();
        assert_eq!(
            b.example(0),
            Err(GenerateError::AttemptsExhausted {
                index: 0,
                attempts: 5
            })
        );
    }

    #[test]
    fn test_reproducible() {
        let vols = volumes();
        let mut a = PairExampleBuilder::new(&vols, spec()).unwrap();
        let mut b = PairExampleBuilder::new(&vols, spec()).unwrap();
        for index in 0..4 {
            assert_eq!(a.example(index), b.example(index));
        }
    }
}
