//! 运行时错误.

use thiserror::Error;

/// 构造生成器时的配置错误.
///
/// 该类错误代表调用方或配置本身的问题, 而不是数据问题, 因此在构造时立即返回.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// 要丢弃的切片数为 0.
    #[error("number of dropped slices must be positive")]
    ZeroSlices,

    /// 丢弃切片数范围非法. 两个参数分别为下界和上界 (闭区间).
    #[error("invalid dropped slice range [{0}, {1}]")]
    InvalidSliceRange(usize, usize),

    /// 上下文切片数为 0.
    #[error("context slices must be positive")]
    ZeroContext,

    /// 点云点数为 0.
    #[error("point count must be positive")]
    ZeroPoints,

    /// 半径不是有限非负数.
    #[error("radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),

    /// 最大尝试次数为 0.
    #[error("max attempts must be positive")]
    ZeroAttempts,

    /// 没有给出任何体数据.
    #[error("no volumes given")]
    NoVolumes,

    /// 体数据太浅, 放不下一个缝隙和两侧的上下文.
    #[error("volume {index} has depth {depth}, at least {required} slices are needed")]
    VolumeTooShallow {
        /// 体数据索引.
        index: usize,
        /// 实际切片数.
        depth: usize,
        /// 所需切片数.
        required: usize,
    },

    /// 分区参数非法.
    #[error("partition {index} is out of range for {count} workers")]
    InvalidPartition {
        /// 分区索引.
        index: usize,
        /// worker 总数.
        count: usize,
    },

    /// 随机模式的游标永远不会耗尽, 不能用于分区遍历.
    #[error("randomized sequencers never exhaust and cannot be partitioned")]
    Unbounded,

    /// 没有任何类别满足一对一采样条件.
    #[error("no class in any volume qualifies for pair sampling")]
    NoClasses,
}

/// 一对一随机样本生成错误.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// 未开启重试, 且给定索引无法生成样本.
    #[error("could not build an example for index {0}")]
    Degenerate(usize),

    /// 重试次数用尽.
    #[error("gave up on index {index} after {attempts} attempts")]
    AttemptsExhausted {
        /// 最初请求的索引.
        index: usize,
        /// 已尝试的次数.
        attempts: u32,
    },
}
