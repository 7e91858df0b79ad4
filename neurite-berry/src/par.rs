//! 借助 `rayon` 的多分区并行生成.

use rayon::prelude::*;

use crate::augment::Augment;
use crate::error::ConfigError;
use crate::ops::zero_small_classes;
use crate::sequencer::{CandidateBatch, GapSequencer, GenerationStats, Partition, SequencerSpec};
use crate::LabelVolume;

/// 每个分区一个游标, 在 `rayon` 线程池上并行遍历全部缝隙.
///
/// 返回按分区顺序排列的各分区批次, 以及汇总后的统计. `augment` 为每个分区构造一个增强实例.
/// 随机模式的游标永不耗尽, 因此会被拒绝. 过小类别只在这里并行清理一次,
/// 各分区的游标直接借用清理后的体数据.
pub fn generate_partitioned<F>(
    volumes: &[LabelVolume],
    spec: &SequencerSpec,
    workers: usize,
    augment: F,
) -> Result<(Vec<Vec<CandidateBatch>>, GenerationStats), ConfigError>
where
    F: Fn() -> Box<dyn Augment> + Sync,
{
    if spec.randomize {
        return Err(ConfigError::Unbounded);
    }
    let cleaned: Vec<LabelVolume> = volumes
        .par_iter()
        .map(|v| LabelVolume::new(zero_small_classes(v.data(), spec.min_class_voxels)))
        .collect();
    let sequencers = (0..workers)
        .map(|index| {
            let partition = Partition::new(index, workers)?;
            GapSequencer::new(&cleaned, spec.clone(), partition, augment())
        })
        .collect::<Result<Vec<_>, _>>()?;
    if sequencers.is_empty() {
        return Err(ConfigError::InvalidPartition {
            index: 0,
            count: workers,
        });
    }

    let results: Vec<(Vec<CandidateBatch>, GenerationStats)> = sequencers
        .into_par_iter()
        .map(|mut seq| {
            let batches: Vec<_> = std::iter::from_fn(|| seq.next_batch()).collect();
            (batches, *seq.stats())
        })
        .collect();

    let stats = results.iter().map(|(_, s)| *s).sum();
    Ok((results.into_iter().map(|(b, _)| b).collect(), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::Identity;
    use crate::synth::SynthSpec;
    use ndarray::Array3;

    fn volumes() -> Vec<LabelVolume> {
        (0..3)
            .map(|i| {
                LabelVolume::new(Array3::from_shape_fn((12, 30, 30), |(z, h, w)| {
                    match (z, h, w) {
                        (_, 5..=12, 5..=12) => 1,
                        (4..=11, 5..=12, 15..=22) if i % 2 == 0 => 2,
                        _ => 0,
                    }
                }))
            })
            .collect()
    }

    fn spec() -> SequencerSpec {
        SequencerSpec {
            num_slices: 2,
            synth: SynthSpec::new(30.0, 2, 24).unwrap(),
            ..SequencerSpec::default()
        }
    }

    #[test]
    fn test_partitioned_matches_single() {
        let vols = volumes();
        let (single, single_stats) =
            generate_partitioned(&vols, &spec(), 1, || Box::new(Identity)).unwrap();
        assert_eq!(single.len(), 1);

        let (parts, stats) = generate_partitioned(&vols, &spec(), 4, || Box::new(Identity)).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(stats.batches, single_stats.batches);
        assert_eq!(stats.candidates, single_stats.candidates);
        assert_eq!(stats.total_examples, single_stats.total_examples);

        let mut ids: Vec<_> = parts.iter().flatten().map(|b| b.id()).collect();
        ids.sort();
        let single_ids: Vec<_> = single[0].iter().map(|b| b.id()).collect();
        assert_eq!(ids, single_ids);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let vols = volumes();
        let randomized = SequencerSpec {
            randomize: true,
            ..spec()
        };
        assert_eq!(
            generate_partitioned(&vols, &randomized, 2, || Box::new(Identity)).err(),
            Some(ConfigError::Unbounded)
        );
        assert!(generate_partitioned(&vols, &spec(), 0, || Box::new(Identity)).is_err());
    }

    #[test]
    fn test_small_classes_cleaned_once() {
        let mut vols = volumes();
        // 只有一个体素的神经突 5 紧挨神经突 1.
        let mut data = vols[1].data().to_owned();
        data[(6, 8, 14)] = 5;
        vols[1] = LabelVolume::new(data);
        let (_, stats) = generate_partitioned(&vols, &spec(), 3, || Box::new(Identity)).unwrap();
        let (_, clean_stats) =
            generate_partitioned(&volumes(), &spec(), 3, || Box::new(Identity)).unwrap();
        assert_eq!(stats, clean_stats);
    }
}
