use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 一个体数据上所有合法的缝隙起点 `[context, depth - num_slices - context)`.
///
/// 体数据太浅时返回空区间.
#[inline]
pub fn gap_start_range(depth: usize, num_slices: usize, context: usize) -> Range<usize> {
    let end = depth.saturating_sub(num_slices + context).max(context);
    context..end
}

/// 将 `range` 切分为 `workers` 个连续、互不重叠且恰好铺满原区间的子区间.
///
/// 前 `len % workers` 个子区间各多一个元素. `workers` 多于元素个数时,
/// 末尾的子区间为空. `workers` 为 0 时返回空列表.
pub fn split_range(range: Range<usize>, workers: usize) -> Vec<Range<usize>> {
    (0..workers).map(|i| nth_part(&range, i, workers)).collect()
}

/// 将一个体数据的缝隙起点范围切分给 `workers` 个 worker.
#[inline]
pub fn partition_gap_starts(
    depth: usize,
    num_slices: usize,
    context: usize,
    workers: usize,
) -> Vec<Range<usize>> {
    split_range(gap_start_range(depth, num_slices, context), workers)
}

/// `range` 均分为 `workers` 份后的第 `index` 份.
fn nth_part(range: &Range<usize>, index: usize, workers: usize) -> Range<usize> {
    debug_assert!(index < workers);
    let len = range.len();
    let (base, extra) = (len / workers, len % workers);
    let start = range.start + index * base + index.min(extra);
    let end = start + base + usize::from(index < extra);
    start..end
}

/// worker 分区, 即 "共 `count` 份中的第 `index` 份".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Partition {
    index: usize,
    count: usize,
}

impl Default for Partition {
    #[inline]
    fn default() -> Self {
        Self::whole()
    }
}

impl Partition {
    /// 创建分区. 要求 `index < count`.
    pub fn new(index: usize, count: usize) -> Result<Self, ConfigError> {
        if index >= count {
            return Err(ConfigError::InvalidPartition { index, count });
        }
        Ok(Self { index, count })
    }

    /// 不切分.
    #[inline]
    pub const fn whole() -> Self {
        Self { index: 0, count: 1 }
    }

    /// 分区索引.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 分区总数.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// 本分区在 `range` 上负责的子区间.
    #[inline]
    pub fn apply(&self, range: Range<usize>) -> Range<usize> {
        nth_part(&range, self.index, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 检查子区间连续、互不重叠且恰好铺满 `range`.
    fn assert_tiles(range: &Range<usize>, parts: &[Range<usize>]) {
        let mut cursor = range.start;
        for p in parts {
            assert_eq!(p.start, cursor, "{range:?} -> {parts:?}");
            assert!(p.end >= p.start);
            cursor = p.end;
        }
        assert_eq!(cursor, range.end.max(range.start), "{range:?} -> {parts:?}");
        assert_eq!(
            parts.iter().map(|p| p.len()).sum::<usize>(),
            range.len()
        );
    }

    #[test]
    fn test_gap_start_range() {
        assert_eq!(gap_start_range(20, 2, 3), 3..15);
        assert_eq!(gap_start_range(9, 2, 3), 3..4);
        assert_eq!(gap_start_range(8, 2, 3), 3..3);
        assert!(gap_start_range(2, 2, 3).is_empty());
    }

    #[test]
    fn test_tiling_grid() {
        for depth in 0..40 {
            for num_slices in 1..5 {
                for context in 1..5 {
                    let range = gap_start_range(depth, num_slices, context);
                    for workers in 1..12 {
                        let parts = partition_gap_starts(depth, num_slices, context, workers);
                        assert_eq!(parts.len(), workers);
                        assert_tiles(&range, &parts);
                        // 各子区间长度至多相差 1.
                        let lens: Vec<_> = parts.iter().map(|p| p.len()).collect();
                        let (lo, hi) = (lens.iter().min().unwrap(), lens.iter().max().unwrap());
                        assert!(hi - lo <= 1);
                        for (i, p) in parts.iter().enumerate() {
                            let part = Partition::new(i, workers).unwrap();
                            assert_eq!(&part.apply(range.clone()), p);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_split_examples() {
        assert_eq!(split_range(3..10, 3), vec![3..6, 6..8, 8..10]);
        assert_eq!(split_range(0..2, 4), vec![0..1, 1..2, 2..2, 2..2]);
        assert!(split_range(0..5, 0).is_empty());
    }

    #[test]
    fn test_partition_new() {
        assert!(Partition::new(0, 1).is_ok());
        assert_eq!(
            Partition::new(2, 2),
            Err(ConfigError::InvalidPartition { index: 2, count: 2 })
        );
        assert!(Partition::new(0, 0).is_err());
        assert_eq!(Partition::default(), Partition::whole());
        assert_eq!(Partition::whole().apply(4..9), 4..9);
    }
}
