//! 数据集操作.

use std::path::{Path, PathBuf};

use ndarray::s;

use crate::consts::SEQUENCER_MIN_CLASS_VOXELS;
use crate::ops::zero_small_classes;
use crate::LabelVolume;

mod npz_database;

pub use npz_database::{NpzArchive, OpenArchiveError};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

/// 丢弃 `num_slices` 层且上下各保留 `context_slices` 层时, 体数据所需的最小切片数.
#[inline]
pub const fn min_depth(num_slices: usize, context_slices: usize) -> usize {
    num_slices + 2 * context_slices + 1
}

/// 将每个体数据中体素数不足 `min_voxels` 的类别置为背景.
pub fn clean_volumes_with(volumes: &[LabelVolume], min_voxels: usize) -> Vec<LabelVolume> {
    volumes
        .iter()
        .map(|v| LabelVolume::new(zero_small_classes(v.data(), min_voxels)))
        .collect()
}

/// 以缝隙游标的默认阈值清理体数据.
#[inline]
pub fn clean_volumes(volumes: &[LabelVolume]) -> Vec<LabelVolume> {
    clean_volumes_with(volumes, SEQUENCER_MIN_CLASS_VOXELS)
}

/// 沿 z 轴切分得到的训练/验证/测试集.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSplit {
    /// 训练集.
    pub train: Vec<LabelVolume>,
    /// 验证集.
    pub validation: Vec<LabelVolume>,
    /// 测试集.
    pub test: Vec<LabelVolume>,
}

/// 沿 z 轴把 `volume` 切分为训练/验证/测试三段.
///
/// 测试集为最后 `held_out` 层, 验证集为其前面的 `held_out` 层, 其余为训练集.
/// 训练集为空时返回 `None`.
pub fn split_z(volume: &LabelVolume, held_out: usize) -> Option<(LabelVolume, LabelVolume, LabelVolume)> {
    let depth = volume.len_z();
    let train_end = depth.checked_sub(2 * held_out).filter(|e| *e > 0)?;
    let data = volume.data();
    let cut = |a: usize, b: usize| LabelVolume::new(data.slice(s![a..b, .., ..]).to_owned());
    Some((
        cut(0, train_end),
        cut(train_end, train_end + held_out),
        cut(train_end + held_out, depth),
    ))
}

impl VolumeSplit {
    /// 对每个体数据执行 [`split_z`], 跳过太浅的体数据.
    ///
    /// 验证集和测试集的深度取为 [`min_depth`], 恰好能放下一个缝隙.
    pub fn from_volumes(volumes: &[LabelVolume], num_slices: usize, context_slices: usize) -> Self {
        let held_out = min_depth(num_slices, context_slices);
        let mut ans = Self {
            train: Vec::new(),
            validation: Vec::new(),
            test: Vec::new(),
        };
        for (train, validation, test) in volumes.iter().filter_map(|v| split_z(v, held_out)) {
            ans.train.push(train);
            ans.validation.push(validation);
            ans.test.push(test);
        }
        ans
    }
}
