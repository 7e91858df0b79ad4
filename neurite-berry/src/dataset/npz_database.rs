use std::fs::{File, OpenOptions};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ndarray::{Ix3, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};
use thiserror::Error;

use crate::{LabelVolume, NeuriteId};

/// 打开 `NpzArchive` 错误.
#[derive(Debug, Error)]
pub enum OpenArchiveError {
    /// workers 太大. 最多支持 64.
    #[error("too many workers, at most {0} are supported")]
    TooManyWorkers(u32),

    /// 打开 npz 文件错误.
    #[error("cannot read npz archive: {0}")]
    ReadNpzError(#[from] ReadNpzError),

    /// 其他底层 I/O 错误.
    #[error("cannot open npz archive: {0}")]
    IoError(#[from] std::io::Error),
}

/// Npz 文件归档.
///
/// 该结构可用于建模硬盘上已存储的多个 3D 神经突标签体数据的压缩文件.
/// 每个条目都必须是 `(z, y, x)` 组织的 `u64` 数组.
pub struct NpzArchive {
    entries: Vec<Mutex<NpzReader<File>>>,
    turn: AtomicUsize,
}

impl NpzArchive {
    /// 初始化.
    ///
    /// `workers` 指定了底层工作通道的个数, 最大为 64. 系统会从路径 `p` 打开文件
    /// `workers` 次, 并为每个打开通道指定一个排他入口点.
    pub fn new<P: AsRef<Path>>(workers: NonZeroUsize, p: P) -> Result<Self, OpenArchiveError> {
        let workers = workers.get();
        if workers > 64 {
            return Err(OpenArchiveError::TooManyWorkers(64));
        }
        let mut v = Vec::with_capacity(workers);
        for _ in 0..workers {
            let file = OpenOptions::new().read(true).open(p.as_ref())?;
            v.push(Mutex::new(NpzReader::new(file)?));
        }
        Ok(Self {
            entries: v,
            turn: AtomicUsize::new(0),
        })
    }

    /// 通过 npz 索引文件名 `name` 获取标签体数据.
    pub fn volume_by_name(&self, name: &str) -> Result<LabelVolume, ReadNpzError> {
        let data = self
            .next_entry()
            .by_name::<OwnedRepr<NeuriteId>, Ix3>(name)?;
        Ok(LabelVolume::new(data))
    }

    /// 通过 npz 数值索引获取标签体数据.
    pub fn volume_by_index(&self, index: usize) -> Result<LabelVolume, ReadNpzError> {
        let data = self
            .next_entry()
            .by_index::<OwnedRepr<NeuriteId>, Ix3>(index)?;
        Ok(LabelVolume::new(data))
    }

    /// 按索引顺序读取全部标签体数据.
    pub fn volumes(&self) -> Result<Vec<LabelVolume>, ReadNpzError> {
        (0..self.volume_len()).map(|i| self.volume_by_index(i)).collect()
    }

    /// 获取底层 npz 文件包含的所有文件名.
    pub fn volume_names(&self) -> Result<Vec<String>, ReadNpzError> {
        self.next_entry().names()
    }

    /// 工作通道个数.
    #[inline]
    pub fn worker_len(&self) -> usize {
        self.entries.len()
    }

    /// 获取底层 npz 文件的标签体数据个数.
    pub fn volume_len(&self) -> usize {
        self.next_entry().len()
    }

    fn next_entry(&self) -> MutexGuard<'_, NpzReader<File>> {
        let slot = self.turn.fetch_add(1, Ordering::Relaxed) % self.worker_len();
        // 读取器不持有跨调用的不变量, 中毒后仍可继续使用.
        self.entries[slot]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
