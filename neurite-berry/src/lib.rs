#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 从 3D 电镜神经突分割标签体数据中人工制造 "断裂", 并为神经突合并分类器
//! 生成带真值的点云训练样本.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 标签体数据统一按照 `(z, y, x)` (即 `(z, h, w)`) 组织, 值 `0` 代表背景,
//!   其余值代表在该体数据内唯一的神经突编号.
//! 2. 所有用到随机性的操作都显式接受 [`rand::rngs::StdRng`],
//!   因此给定种子时生成结果可复现.
//! 3. 非法配置在构造时返回 [`error::ConfigError`]; 几何上的退化情形
//!   (半径内没有候选、重标记后类别数不为 3 等) 以 `None` 或空集合表示, 不会 panic.
//!
//! # 开发计划
//!
//! ### 标签体基础操作 ✅
//!
//! 类别枚举与过滤, 26-连通分量重标记, 标签对应, 质心/圆形掩膜/裁剪,
//! 表面体素提取, 点云转换与重采样.
//!
//! 实现位于 `neurite-berry/src/ops`.
//!
//! ### 一对多候选合成 ✅
//!
//! 给定缝隙上方的已知碎片, 按距离顺序枚举缝隙下方半径内的所有碎片,
//! 并通过标签对应关系给出真值.
//!
//! 实现位于 `neurite-berry/src/synth`.
//!
//! ### 一对一随机样本 ✅
//!
//! 正负样本交替, 失败时以有界次数重试.
//!
//! 实现位于 `neurite-berry/src/pair`.
//!
//! ### 缝隙游标 ✅
//!
//! 逐体数据、逐缝隙位置推进的生成器, 支持将缝隙起点范围切分给多个 worker.
//!
//! 实现位于 `neurite-berry/src/sequencer`. 基于 `rayon`
//! 的多分区并行入口位于 `neurite-berry/src/par.rs`.
//!
//! ### 点云增强 ✅
//!
//! 注入式的点云变换能力, 默认为恒等变换.
//!
//! 实现位于 `neurite-berry/src/augment.rs`.
//!
//! ### 数据来源 ✅
//!
//! npz 标签体归档读取, 沿 z 轴切分训练/验证/测试集.
//!
//! 实现位于 `neurite-berry/src/dataset`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 高精度通用索引 / 向量.
pub type Idx2dF = (f64, f64);

/// 神经突编号. `0` 为背景.
pub type NeuriteId = u64;

/// 标签体数据及样本结构.
mod data;

pub use data::{BatchId, Example, LabelSlice, LabelVolume};

pub mod augment;

pub mod config;

pub mod consts;

pub mod dataset;

pub mod error;

pub mod ops;

pub mod pair;

pub mod sequencer;

pub mod synth;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        pub mod par;

        pub use par::generate_partitioned;
    }
}

pub mod prelude;
