use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 缝隙游标的生成统计.
///
/// 每个被丢弃的候选都会体现在某个计数器上.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationStats {
    /// 没有任何正样本的批次数.
    pub no_true: usize,
    /// 含有多个正样本的批次数.
    pub multi_true: usize,
    /// 输出的正样本数.
    pub num_true: usize,
    /// 输出的样本数.
    pub total_examples: usize,
    /// 批次数, 即访问过的 (体数据, 缝隙, 上方碎片) 三元组个数.
    pub batches: usize,
    /// 访问过的缝隙数.
    pub gaps: usize,
    /// 截断前的候选数.
    pub candidates: usize,
    /// 被截断的候选数.
    pub truncated: usize,
    /// 裁剪重标记检查失败而被拒绝的候选数.
    pub rejected: usize,
}

impl GenerationStats {
    /// 输出样本中正样本的比例. 没有样本时返回 `None`.
    pub fn positive_ratio(&self) -> Option<f64> {
        (self.total_examples > 0).then(|| self.num_true as f64 / self.total_examples as f64)
    }
}

impl AddAssign for GenerationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.no_true += rhs.no_true;
        self.multi_true += rhs.multi_true;
        self.num_true += rhs.num_true;
        self.total_examples += rhs.total_examples;
        self.batches += rhs.batches;
        self.gaps += rhs.gaps;
        self.candidates += rhs.candidates;
        self.truncated += rhs.truncated;
        self.rejected += rhs.rejected;
    }
}

impl Add for GenerationStats {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Sum for GenerationStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no_true: {}, multi_true: {}, num_true: {}, total: {}, batches: {}, gaps: {}, \
             candidates: {}, truncated: {}, rejected: {}",
            self.no_true,
            self.multi_true,
            self.num_true,
            self.total_examples,
            self.batches,
            self.gaps,
            self.candidates,
            self.truncated,
            self.rejected
        )
    }
}
