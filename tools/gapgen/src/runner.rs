//! 程序运行函数.

use std::error::Error;
use std::thread;

use log::info;
use neurite_berry::augment::Augment;
use neurite_berry::dataset::{self, VolumeSplit};
use neurite_berry::prelude::*;
use utils::loader;

use crate::result::GenerationReport;

/// 对一个数据集, 每个分区开一个线程遍历全部缝隙.
fn generate(
    volumes: &[LabelVolume],
    spec: &SequencerSpec,
    augmentor: PointAugmentor,
    workers: usize,
) -> Result<GenerationStats, ConfigError> {
    let mut sequencers = Vec::with_capacity(workers);
    for index in 0..workers {
        let augment: Box<dyn Augment> = Box::new(augmentor);
        sequencers.push(GapSequencer::new(
            volumes,
            spec.clone(),
            Partition::new(index, workers)?,
            augment,
        )?);
    }
    let stats = thread::scope(|s| {
        let handles: Vec<_> = sequencers
            .into_iter()
            .map(|mut seq| {
                s.spawn(move || {
                    while seq.next_batch().is_some() {}
                    *seq.stats()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|th| th.join().expect("Thread joining error"))
            .sum()
    });
    Ok(stats)
}

/// 实际运行.
pub fn run() -> Result<GenerationReport, Box<dyn Error>> {
    let path = loader::archive_path_from_env_or_home().ok_or("cannot locate the label archive")?;
    let workers = utils::cpus();
    let archive = loader::archive(&path, workers)?;
    info!("loading {} volumes from {}", archive.volume_len(), path.display());
    let volumes = archive.volumes()?;

    let preset = DatasetPreset::default();
    let spec = preset.sequencer_spec()?;
    let split = VolumeSplit::from_volumes(&volumes, spec.num_slices, spec.synth.context_slices);

    println!("Generating candidates...");
    let mut report = GenerationReport::default();
    for (name, group) in [
        ("train", &split.train),
        ("validation", &split.validation),
        ("test", &split.test),
    ] {
        if group.is_empty() {
            info!("{name}: no volume is deep enough, skipped");
            continue;
        }
        // 每个数据集只清理一次, 各线程的游标直接借用.
        let group = dataset::clean_volumes_with(group, spec.min_class_voxels);
        let stats = generate(&group, &spec, preset.augmentor, workers)?;
        report.push(name, group.len(), stats);
    }
    Ok(report)
}
