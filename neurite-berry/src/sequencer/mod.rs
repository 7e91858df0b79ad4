//! 缝隙游标.
//!
//! 逐体数据、逐缝隙起点推进. 每到一个新缝隙, 先构建重标记体数据和标签对应关系,
//! 再依次为缝隙上方的每个碎片合成一批候选.
//!
//! 并行时每个 worker 持有自己的游标, 负责每个体数据缝隙起点范围中互不重叠的一段.

mod partition;
mod stats;

use std::borrow::Cow;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::ops::Range;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use partition::{gap_start_range, partition_gap_starts, split_range, Partition};
pub use stats::GenerationStats;

use crate::augment::{Augment, Identity};
use crate::consts::{DEFAULT_NUM_SLICES, SEQUENCER_MIN_CLASS_VOXELS};
use crate::dataset::{clean_volumes_with, min_depth};
use crate::error::ConfigError;
use crate::ops::has_classes_below;
use crate::synth::{CandidateSet, CandidateSynthesizer, Gap, GapVolume, SynthSpec};
use crate::{BatchId, Example, LabelVolume, NeuriteId};

/// 缝隙游标参数.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SequencerSpec {
    /// 丢弃的切片数.
    pub num_slices: usize,
    /// 半径, 上下文, 点数等合成参数.
    pub synth: SynthSpec,
    /// 是否在第一个正样本处 (含) 截断每批候选.
    pub truncate_at_first_positive: bool,
    /// 每批最多保留的候选数.
    pub max_candidates: Option<usize>,
    /// 是否为每个样本附上分组编号.
    pub add_batch_id: bool,
    /// 是否打乱每个缝隙上方碎片的访问顺序.
    pub shuffle_fragments: bool,
    /// 随机模式: 每次推进都随机选择体数据和缝隙起点, 永不耗尽.
    pub randomize: bool,
    /// 体素数不足该值的类别在构建游标时被置为背景.
    pub min_class_voxels: usize,
    /// 随机种子. 分区 `i` 的游标使用 `seed + i`.
    pub seed: u64,
}

impl Default for SequencerSpec {
    fn default() -> Self {
        Self {
            num_slices: DEFAULT_NUM_SLICES,
            synth: SynthSpec::default(),
            truncate_at_first_positive: false,
            max_candidates: None,
            add_batch_id: false,
            shuffle_fragments: true,
            randomize: false,
            min_class_voxels: SEQUENCER_MIN_CLASS_VOXELS,
            seed: 0,
        }
    }
}

impl SequencerSpec {
    /// 检查参数合法性.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_slices == 0 {
            return Err(ConfigError::ZeroSlices);
        }
        self.synth.validate()
    }

    /// 体数据所需的最小切片数.
    #[inline]
    pub fn min_depth(&self) -> usize {
        min_depth(self.num_slices, self.synth.context_slices)
    }
}

/// 游标状态.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequencerState {
    /// 正在移向下一个体数据.
    AdvancingVolume,
    /// 正在进入当前体数据的下一个缝隙.
    AdvancingGap,
    /// 正在为当前缝隙的上方碎片逐个输出候选.
    EmittingCandidates,
    /// 已耗尽. 这是正常的序列结束.
    Exhausted,
}

/// 游标位置. 只能由所属的 [`GapSequencer`] 修改.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    volume: Option<usize>,
    gap_start: usize,
    gap_volume: Option<GapVolume>,
    top_fragments: Vec<NeuriteId>,
    fragment: usize,
    pending: VecDeque<Example>,
}

impl Cursor {
    /// 当前体数据索引. 尚未开始时返回 `None`.
    #[inline]
    pub fn volume(&self) -> Option<usize> {
        self.volume
    }

    /// 当前缝隙起点.
    #[inline]
    pub fn gap_start(&self) -> usize {
        self.gap_start
    }

    /// 当前缝隙中尚未访问的上方碎片数.
    #[inline]
    pub fn remaining_fragments(&self) -> usize {
        self.top_fragments.len().saturating_sub(self.fragment)
    }

    /// 当前批次中尚未被迭代器取走的样本数.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// 一批候选: 同一 (体数据, 缝隙, 上方碎片) 的全部样本, 按距离由近及远排列.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBatch {
    id: BatchId,
    examples: Vec<Example>,
}

impl CandidateBatch {
    /// 批次编号.
    #[inline]
    pub fn id(&self) -> BatchId {
        self.id
    }

    /// 样本.
    #[inline]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// 样本数.
    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// 是否为空批次?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// 取出样本.
    #[inline]
    pub fn into_examples(self) -> Vec<Example> {
        self.examples
    }
}

/// 缝隙游标.
///
/// 借用只读的体数据列表, 游标状态与随机数生成器归自身所有, 不与其他 worker 共享.
/// 含有过小类别的体数据会先被清理, 此时游标持有清理后的副本.
pub struct GapSequencer<'a> {
    volumes: Cow<'a, [LabelVolume]>,
    spec: SequencerSpec,
    num_slices: NonZeroUsize,
    partition: Partition,
    augment: Box<dyn Augment>,
    rng: StdRng,
    state: SequencerState,
    cursor: Cursor,
    stats: GenerationStats,
}

impl<'a> GapSequencer<'a> {
    /// 不切分、恒等增强的游标.
    #[inline]
    pub fn whole(volumes: &'a [LabelVolume], spec: SequencerSpec) -> Result<Self, ConfigError> {
        Self::new(volumes, spec, Partition::whole(), Box::new(Identity))
    }

    /// 创建游标.
    ///
    /// 每个体数据至少需要 `num_slices + 2 * context_slices + 1` 层切片.
    /// 体素数不足 `spec.min_class_voxels` 的类别会被置为背景.
    pub fn new(
        volumes: &'a [LabelVolume],
        spec: SequencerSpec,
        partition: Partition,
        augment: Box<dyn Augment>,
    ) -> Result<Self, ConfigError> {
        spec.validate()?;
        let num_slices = NonZeroUsize::new(spec.num_slices).ok_or(ConfigError::ZeroSlices)?;
        if volumes.is_empty() {
            return Err(ConfigError::NoVolumes);
        }
        let required = spec.min_depth();
        if let Some((index, v)) = volumes.iter().enumerate().find(|(_, v)| v.len_z() < required) {
            return Err(ConfigError::VolumeTooShallow {
                index,
                depth: v.len_z(),
                required,
            });
        }
        let volumes = if volumes
            .iter()
            .any(|v| has_classes_below(v.data(), spec.min_class_voxels))
        {
            debug!("zeroing classes under {} voxels", spec.min_class_voxels);
            Cow::Owned(clean_volumes_with(volumes, spec.min_class_voxels))
        } else {
            Cow::Borrowed(volumes)
        };
        let rng = StdRng::seed_from_u64(spec.seed.wrapping_add(partition.index() as u64));
        info!(
            "sequencer {}/{} over {} volumes, dropping {} slices",
            partition.index(),
            partition.count(),
            volumes.len(),
            spec.num_slices
        );
        Ok(Self {
            volumes,
            spec,
            num_slices,
            partition,
            augment,
            rng,
            state: SequencerState::AdvancingVolume,
            cursor: Cursor::default(),
            stats: GenerationStats::default(),
        })
    }

    /// 当前状态.
    #[inline]
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// 游标位置.
    #[inline]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// 到目前为止的统计.
    #[inline]
    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// 参数.
    #[inline]
    pub fn spec(&self) -> &SequencerSpec {
        &self.spec
    }

    /// 分区.
    #[inline]
    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// 本分区在第 `volume` 个体数据上负责的缝隙起点.
    pub fn gap_starts(&self, volume: usize) -> Range<usize> {
        let range = gap_start_range(
            self.volumes[volume].len_z(),
            self.spec.num_slices,
            self.spec.synth.context_slices,
        );
        self.partition.apply(range)
    }

    /// 推进游标并返回下一批候选. 耗尽时返回 `None`.
    ///
    /// 没有候选的上方碎片也会产生一个空批次. 随机模式下, 上方没有碎片的缝隙
    /// 同样产生一个空批次, 因此每次调用都会返回.
    pub fn next_batch(&mut self) -> Option<CandidateBatch> {
        loop {
            match self.state {
                SequencerState::Exhausted => return None,
                SequencerState::AdvancingVolume => self.advance_volume(),
                SequencerState::AdvancingGap => self.enter_gap(),
                SequencerState::EmittingCandidates => {
                    if let Some(batch) = self.emit() {
                        return Some(batch);
                    }
                }
            }
        }
    }

    fn advance_volume(&mut self) {
        if self.spec.randomize {
            self.pick_random_gap();
            return;
        }
        let mut next = self.cursor.volume.map_or(0, |v| v + 1);
        while next < self.volumes.len() {
            let starts = self.gap_starts(next);
            if !starts.is_empty() {
                debug!("entering volume {next}, gap starts {starts:?}");
                self.cursor.volume = Some(next);
                self.cursor.gap_start = starts.start;
                self.state = SequencerState::AdvancingGap;
                return;
            }
            next += 1;
        }
        info!("sequencer {} exhausted: {}", self.partition.index(), self.stats);
        self.cursor.volume = Some(self.volumes.len());
        self.cursor.gap_volume = None;
        self.state = SequencerState::Exhausted;
    }

    fn pick_random_gap(&mut self) {
        let candidates: Vec<usize> = (0..self.volumes.len())
            .filter(|&v| !self.gap_starts(v).is_empty())
            .collect();
        let Some(&volume) = candidates.choose(&mut self.rng) else {
            self.state = SequencerState::Exhausted;
            return;
        };
        let starts = self.gap_starts(volume);
        self.cursor.volume = Some(volume);
        self.cursor.gap_start = self.rng.gen_range(starts);
        self.state = SequencerState::AdvancingGap;
    }

    fn enter_gap(&mut self) {
        let Some(volume) = self.cursor.volume else {
            self.state = SequencerState::AdvancingVolume;
            return;
        };
        let gap = Gap::from_len(self.cursor.gap_start, self.num_slices);
        let gap_volume = GapVolume::build(
            &self.volumes[volume],
            gap,
            self.spec.synth.context_slices,
            self.spec.synth.connectivity,
        );
        let mut fragments = gap_volume.top_fragments().to_vec();
        if self.spec.shuffle_fragments {
            fragments.shuffle(&mut self.rng);
        }
        debug!(
            "volume {volume}, gap {}..{}: {} top fragments",
            gap.start(),
            gap.end(),
            fragments.len()
        );
        self.cursor.gap_volume = Some(gap_volume);
        self.cursor.top_fragments = fragments;
        self.cursor.fragment = 0;
        self.stats.gaps += 1;
        self.state = SequencerState::EmittingCandidates;
    }

    fn advance_gap(&mut self) {
        self.cursor.gap_volume = None;
        self.cursor.top_fragments.clear();
        self.cursor.fragment = 0;
        if self.spec.randomize {
            self.state = SequencerState::AdvancingVolume;
            return;
        }
        let Some(volume) = self.cursor.volume else {
            self.state = SequencerState::AdvancingVolume;
            return;
        };
        self.cursor.gap_start += 1;
        self.state = if self.cursor.gap_start < self.gap_starts(volume).end {
            SequencerState::AdvancingGap
        } else {
            SequencerState::AdvancingVolume
        };
    }

    fn emit(&mut self) -> Option<CandidateBatch> {
        let fragment = self.cursor.fragment;
        let (Some(volume), Some(gap_volume)) = (self.cursor.volume, self.cursor.gap_volume.as_ref())
        else {
            self.advance_gap();
            return None;
        };
        let Some(&known) = self.cursor.top_fragments.get(fragment) else {
            let id = BatchId {
                volume,
                gap_start: self.cursor.gap_start,
                fragment,
            };
            let empty = self.spec.randomize && fragment == 0;
            self.advance_gap();
            return empty.then(|| self.finish_batch(id, CandidateSet::default()));
        };
        let synth = CandidateSynthesizer::new(&self.spec.synth, self.augment.as_ref());
        let set = synth.synthesize_gap(gap_volume, known, &mut self.rng);
        let id = BatchId {
            volume,
            gap_start: self.cursor.gap_start,
            fragment,
        };
        self.cursor.fragment += 1;
        Some(self.finish_batch(id, set))
    }

    /// 截断, 打分组编号并更新统计.
    fn finish_batch(&mut self, id: BatchId, set: CandidateSet) -> CandidateBatch {
        self.stats.rejected += set.rejected();
        let mut candidates = set.into_candidates();
        let before = candidates.len();
        self.stats.candidates += before;

        let num_true = candidates
            .iter()
            .filter(|c| c.example().is_positive())
            .count();
        match num_true {
            0 => self.stats.no_true += 1,
            1 => {}
            _ => self.stats.multi_true += 1,
        }

        if self.spec.truncate_at_first_positive {
            if let Some(i) = candidates.iter().position(|c| c.example().is_positive()) {
                candidates.truncate(i + 1);
            }
        }
        if let Some(k) = self.spec.max_candidates {
            candidates.truncate(k);
        }
        self.stats.truncated += before - candidates.len();

        let add_id = self.spec.add_batch_id;
        let examples: Vec<Example> = candidates
            .into_iter()
            .map(|c| {
                let ex = c.into_example();
                if add_id {
                    ex.with_group(id)
                } else {
                    ex
                }
            })
            .collect();
        self.stats.num_true += examples.iter().filter(|e| e.is_positive()).count();
        self.stats.total_examples += examples.len();
        self.stats.batches += 1;
        CandidateBatch { id, examples }
    }
}

impl Iterator for GapSequencer<'_> {
    type Item = Example;

    /// 逐个输出样本, 跳过空批次.
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ex) = self.cursor.pending.pop_front() {
                return Some(ex);
            }
            let batch = self.next_batch()?;
            self.cursor.pending.extend(batch.into_examples());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 两个长方体标签: 1 贯穿 z 0..10, 2 仅在 z 5..10 且位于 1 的右侧.
    fn two_cuboids() -> LabelVolume {
        LabelVolume::new(Array3::from_shape_fn((10, 50, 50), |(z, h, w)| {
            match (z, h, w) {
                (_, 10..=19, 10..=19) => 1,
                (5..=9, 10..=19, 24..=33) => 2,
                _ => 0,
            }
        }))
    }

    fn spec(num_slices: usize, context: usize) -> SequencerSpec {
        SequencerSpec {
            num_slices,
            synth: SynthSpec::new(30.0, context, 32).unwrap(),
            min_class_voxels: 50,
            ..SequencerSpec::default()
        }
    }

    #[test]
    fn test_validate() {
        let vols = vec![two_cuboids()];
        assert_eq!(
            GapSequencer::whole(&vols, spec(0, 1)).err(),
            Some(ConfigError::ZeroSlices)
        );
        assert_eq!(
            GapSequencer::whole(&[], spec(2, 1)).err(),
            Some(ConfigError::NoVolumes)
        );
        assert_eq!(
            GapSequencer::whole(&vols, spec(2, 4)).err(),
            Some(ConfigError::VolumeTooShallow {
                index: 0,
                depth: 10,
                required: 11
            })
        );
        assert!(GapSequencer::whole(&vols, spec(2, 3)).is_ok());
    }

    #[test]
    fn test_single_gap_two_candidates() {
        // 深度 5 的体数据, 丢弃两层, 上下各一层上下文: 只有一个缝隙.
        let vols = vec![LabelVolume::new(
            two_cuboids().data().slice(ndarray::s![2..7, .., ..]).to_owned(),
        )];
        let mut seq = GapSequencer::whole(&vols, spec(2, 1)).unwrap();
        assert_eq!(seq.gap_starts(0), 1..2);

        let batch = seq.next_batch().unwrap();
        assert_eq!(
            batch.id(),
            BatchId {
                volume: 0,
                gap_start: 1,
                fragment: 0
            }
        );
        let labels: Vec<u8> = batch.examples().iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec![1, 0]);
        assert!(batch.examples().iter().all(|e| e.points().dim() == (32, 3)));

        assert_eq!(seq.next_batch(), None);
        assert_eq!(seq.state(), SequencerState::Exhausted);
        assert_eq!(seq.next_batch(), None);

        let stats = *seq.stats();
        assert_eq!(stats.gaps, 1);
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.candidates, 2);
        assert_eq!(stats.num_true, 1);
        assert_eq!(stats.total_examples, 2);
        assert_eq!(stats.no_true, 0);
        assert_eq!(stats.multi_true, 0);
    }

    #[test]
    fn test_truncate_and_group() {
        let vols = vec![two_cuboids()];
        let mut seq = GapSequencer::whole(
            &vols,
            SequencerSpec {
                truncate_at_first_positive: true,
                add_batch_id: true,
                ..spec(2, 1)
            },
        )
        .unwrap();
        let mut batches = Vec::new();
        while let Some(b) = seq.next_batch() {
            batches.push(b);
        }
        // 缝隙起点 1..7. 起点 6 的上方边界切片 z 5 同时有神经突 1 和 2.
        assert_eq!(batches.len(), 7);
        for b in batches.iter() {
            assert_eq!(b.len(), 1);
            let ex = &b.examples()[0];
            assert!(ex.is_positive());
            assert_eq!(ex.group(), Some(b.id()));
        }
        let starts: Vec<usize> = batches.iter().map(|b| b.id().gap_start).collect();
        assert_eq!(starts, vec![1, 2, 3, 4, 5, 6, 6]);

        let stats = seq.stats();
        assert_eq!(stats.gaps, 6);
        assert_eq!(stats.batches, 7);
        assert_eq!(stats.total_examples, 7);
        assert_eq!(stats.num_true, 7);
        assert_eq!(stats.no_true, 0);
        // 下方边界切片同时有神经突 1 和 2 的批次会多出一个候选.
        assert_eq!(stats.truncated, stats.candidates - 7);
        assert!(stats.truncated > 0);
    }

    #[test]
    fn test_iterator_skips_empty_batches() {
        // 神经突 1 只存在于 z 0..4, 之后的缝隙上方碎片都没有候选.
        let vols = vec![LabelVolume::new(Array3::from_shape_fn(
            (10, 20, 20),
            |(z, h, w)| match (z, h, w) {
                (0..=3, 5..=9, 5..=9) => 1,
                _ => 0,
            },
        ))];
        let mut seq = GapSequencer::whole(&vols, spec(2, 1)).unwrap();
        let examples: Vec<Example> = seq.by_ref().collect();
        assert_eq!(seq.state(), SequencerState::Exhausted);
        let stats = *seq.stats();
        assert_eq!(examples.len(), stats.total_examples);
        assert_eq!(stats.num_true, examples.iter().filter(|e| e.is_positive()).count());
        // 起点 1..5 上方有碎片, 但只有起点 1 的下方边界切片 (z 3) 仍有神经突 1.
        // 缝隙起点为 1..7.
        assert_eq!(stats.gaps, 6);
        assert_eq!(stats.batches, 4);
        assert_eq!(stats.total_examples, 1);
        assert_eq!(stats.no_true, 3);
        assert!(examples[0].is_positive());
    }

    #[test]
    fn test_partitions_cover_whole_walk() {
        let vols = vec![two_cuboids(), two_cuboids()];
        let mut whole = GapSequencer::whole(&vols, spec(2, 1)).unwrap();
        let mut all: Vec<BatchId> = Vec::new();
        while let Some(b) = whole.next_batch() {
            all.push(b.id());
        }

        for workers in 1..5 {
            let mut merged = Vec::new();
            let mut stats = GenerationStats::default();
            for index in 0..workers {
                let part = Partition::new(index, workers).unwrap();
                let mut seq =
                    GapSequencer::new(&vols, spec(2, 1), part, Box::new(Identity)).unwrap();
                while let Some(b) = seq.next_batch() {
                    merged.push(b.id());
                }
                stats += *seq.stats();
            }
            merged.sort();
            assert_eq!(merged, all);
            assert_eq!(stats.gaps, whole.stats().gaps);
            assert_eq!(stats.candidates, whole.stats().candidates);
        }
    }

    #[test]
    fn test_randomized_never_exhausts() {
        let vols = vec![two_cuboids()];
        let mut seq = GapSequencer::whole(
            &vols,
            SequencerSpec {
                randomize: true,
                seed: 3,
                ..spec(2, 1)
            },
        )
        .unwrap();
        let batches: Vec<CandidateBatch> = (0..40).map_while(|_| seq.next_batch()).collect();
        assert_eq!(batches.len(), 40);
        assert!(batches.iter().all(|b| (1..7).contains(&b.id().gap_start)));
        assert_ne!(seq.state(), SequencerState::Exhausted);
    }

    #[test]
    fn test_randomized_without_fragments_returns() {
        let vols = vec![LabelVolume::background((10, 20, 20))];
        let mut seq = GapSequencer::whole(
            &vols,
            SequencerSpec {
                randomize: true,
                ..spec(2, 1)
            },
        )
        .unwrap();
        for _ in 0..5 {
            let batch = seq.next_batch().unwrap();
            assert!(batch.is_empty());
            assert!((1..7).contains(&batch.id().gap_start));
        }
        let stats = seq.stats();
        assert_eq!(stats.gaps, 5);
        assert_eq!(stats.batches, 5);
        assert_eq!(stats.no_true, 5);
        assert_eq!(stats.total_examples, 0);

        // 顺序模式下同样的体数据直接耗尽.
        let mut seq = GapSequencer::whole(&vols, spec(2, 1)).unwrap();
        assert_eq!(seq.next_batch(), None);
        assert_eq!(seq.stats().batches, 0);
    }

    #[test]
    fn test_small_classes_are_zeroed() {
        // 在下方边界切片 z 3 旁加入只有两个体素的神经突 9.
        let mut data = two_cuboids().data().slice(ndarray::s![2..7, .., ..]).to_owned();
        data[(3, 22, 12)] = 9;
        data[(4, 22, 12)] = 9;
        let vols = vec![LabelVolume::new(data)];

        let mut seq = GapSequencer::whole(&vols, spec(2, 1)).unwrap();
        let batch = seq.next_batch().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(seq.stats().candidates, 2);

        let mut seq = GapSequencer::whole(
            &vols,
            SequencerSpec {
                min_class_voxels: 0,
                ..spec(2, 1)
            },
        )
        .unwrap();
        let batch = seq.next_batch().unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.examples().iter().filter(|e| e.is_positive()).count(), 1);
    }

    #[test]
    fn test_rejected_candidates_are_counted() {
        // 已知标签 5 在上方边界切片上分成两块, 裁剪重标记后有 4 个取值.
        let v = LabelVolume::new(Array3::from_shape_fn((5, 20, 20), |(z, h, w)| {
            match (z, h, w) {
                (0..=1, 4..=6, 4..=6) | (0..=1, 4..=6, 12..=14) => 5,
                (3..=4, 4..=6, 8..=10) => 6,
                _ => 0,
            }
        }));
        let synth_spec = SynthSpec::new(10.0, 1, 16).unwrap();
        let synth = CandidateSynthesizer::new(&synth_spec, &Identity);
        let correspondence = crate::ops::correspond_labels(v.data(), v.data(), 0).unwrap();
        let gap = Gap::new(2, 3).unwrap();
        let set = synth.synthesize(&v, 5, gap, &correspondence, &mut StdRng::seed_from_u64(0));
        assert!(set.is_empty());
        assert_eq!(set.rejected(), 1);

        let vols = vec![two_cuboids()];
        let mut seq = GapSequencer::whole(&vols, spec(2, 1)).unwrap();
        let id = BatchId {
            volume: 0,
            gap_start: 2,
            fragment: 0,
        };
        let batch = seq.finish_batch(id, set);
        assert!(batch.is_empty());
        let stats = seq.stats();
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.candidates, 0);
        assert_eq!(stats.no_true, 1);
        assert_eq!(stats.batches, 1);
    }

    #[test]
    fn test_reproducible() {
        let vols = vec![two_cuboids()];
        let sp = SequencerSpec {
            seed: 17,
            ..spec(2, 1)
        };
        let a: Vec<Example> = GapSequencer::whole(&vols, sp.clone()).unwrap().collect();
        let b: Vec<Example> = GapSequencer::whole(&vols, sp).unwrap().collect();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }
}
