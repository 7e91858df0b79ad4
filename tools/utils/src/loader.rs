//! 对 `neurite-berry::dataset` 的更一层封装. 提供更直接的标签体数据加载器.

use std::env;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use neurite_berry::dataset::{self, NpzArchive, OpenArchiveError};

/// 指定标签体数据归档路径的环境变量.
pub const ARCHIVE_ENV: &str = "NEURITE_ARCHIVE";

/// 获取标签体数据归档路径.
///
/// 1. 若环境变量 `$NEURITE_ARCHIVE` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/cremi/labels.npz`.
///
/// 两者都无法确定时返回 `None`.
pub fn archive_path_from_env_or_home() -> Option<PathBuf> {
    match env::var(ARCHIVE_ENV) {
        Ok(p) if !p.is_empty() => Some(PathBuf::from(p)),
        _ => dataset::home_dataset_dir_with(["cremi", "labels.npz"]),
    }
}

/// 以 `workers` 个工作通道打开归档.
pub fn archive<P: AsRef<Path>>(path: P, workers: usize) -> Result<NpzArchive, OpenArchiveError> {
    let workers = NonZeroUsize::new(workers.clamp(1, 64)).unwrap_or(NonZeroUsize::MIN);
    NpzArchive::new(workers, path)
}
