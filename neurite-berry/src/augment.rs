//! 点云增强.
//!
//! 增强在点云转换与重采样之后施加, 输入输出形状均为 `(N, 3)`.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 注入式的点云变换能力.
pub trait Augment: Send + Sync {
    /// 变换点云. 实现必须保持形状 `(N, 3)` 不变.
    fn transform(&self, points: Array2<f32>, rng: &mut StdRng) -> Array2<f32>;
}

/// 恒等变换.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Augment for Identity {
    #[inline]
    fn transform(&self, points: Array2<f32>, _rng: &mut StdRng) -> Array2<f32> {
        points
    }
}

/// 常用的点云增强组合.
///
/// 依次进行: 中心化, 逐轴归一化, 逐轴随机缩放, 打乱点的顺序.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointAugmentor {
    /// 是否减去点云均值.
    pub center: bool,
    /// 是否打乱点的顺序.
    pub shuffle: bool,
    /// 逐轴 `(z, y, x)` 除数.
    pub normalize: Option<[f32; 3]>,
    /// 是否施加逐轴随机缩放, 缩放因子取自 [`Self::SCALE_RANGE`].
    pub random_scale: bool,
}

impl Default for PointAugmentor {
    fn default() -> Self {
        Self {
            center: true,
            shuffle: true,
            normalize: Some([125.0, 1250.0, 1250.0]),
            random_scale: false,
        }
    }
}

impl PointAugmentor {
    /// 随机缩放因子的取值范围 (闭区间).
    pub const SCALE_RANGE: (f32, f32) = (0.9, 1.1);
}

impl Augment for PointAugmentor {
    fn transform(&self, mut points: Array2<f32>, rng: &mut StdRng) -> Array2<f32> {
        if self.center {
            if let Some(mean) = points.mean_axis(Axis(0)) {
                points -= &mean;
            }
        }
        if let Some(scale) = self.normalize {
            points /= &Array1::from(scale.to_vec());
        }
        if self.random_scale {
            let (lo, hi) = Self::SCALE_RANGE;
            let factors: Array1<f32> = (0..3).map(|_| rng.gen_range(lo..=hi)).collect();
            points *= &factors;
        }
        if self.shuffle {
            let mut rows: Vec<usize> = (0..points.nrows()).collect();
            rows.shuffle(rng);
            points = points.select(Axis(0), &rows);
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn f32_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_identity() {
        let pts = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let out = Identity.transform(pts.clone(), &mut StdRng::seed_from_u64(0));
        assert_eq!(out, pts);
    }

    #[test]
    fn test_center_and_normalize() {
        let aug = PointAugmentor {
            center: true,
            shuffle: false,
            normalize: Some([2.0, 10.0, 100.0]),
            random_scale: false,
        };
        let pts = array![[0.0, 0.0, 0.0], [4.0, 40.0, 400.0]];
        let out = aug.transform(pts, &mut StdRng::seed_from_u64(0));
        assert!(f32_eq(out[(0, 0)], -1.0));
        assert!(f32_eq(out[(0, 1)], -2.0));
        assert!(f32_eq(out[(0, 2)], -2.0));
        assert!(f32_eq(out[(1, 2)], 2.0));
    }

    #[test]
    fn test_shuffle_keeps_rows() {
        let aug = PointAugmentor {
            center: false,
            shuffle: true,
            normalize: None,
            random_scale: true,
        };
        let pts = Array2::from_shape_fn((50, 3), |(i, _)| i as f32 + 1.0);
        let out = aug.transform(pts, &mut StdRng::seed_from_u64(11));
        assert_eq!(out.dim(), (50, 3));
        let (lo, hi) = PointAugmentor::SCALE_RANGE;
        let mut firsts: Vec<f32> = out.column(0).to_vec();
        firsts.sort_by(|a, b| a.total_cmp(b));
        for (i, v) in firsts.iter().enumerate() {
            let orig = i as f32 + 1.0;
            assert!(*v >= orig * lo - 1e-4 && *v <= orig * hi + 1e-4);
        }
    }
}
