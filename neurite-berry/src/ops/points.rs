use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::Rng;

use crate::NeuriteId;

/// 值大于 `threshold` 的所有体素坐标, 每行为 `(z, y, x)`, 按扫描顺序排列.
pub fn to_point_cloud(view: ArrayView3<NeuriteId>, threshold: NeuriteId) -> Array2<f32> {
    let coords: Vec<f32> = view
        .indexed_iter()
        .filter(|(_, p)| **p > threshold)
        .flat_map(|((z, h, w), _)| [z as f32, h as f32, w as f32])
        .collect();
    let n = coords.len() / 3;
    // 该操作不会生成 `Err`, 可直接 unwrap.
    Array2::from_shape_vec((n, 3), coords).unwrap()
}

/// 均匀重采样到恰好 `target` 个点.
///
/// 点数不足时有放回采样, 否则无放回采样. 输入为空或 `target` 为 0 时返回 `None`.
pub fn resample_points(
    points: ArrayView2<f32>,
    target: usize,
    rng: &mut StdRng,
) -> Option<Array2<f32>> {
    let n = points.nrows();
    if n == 0 || target == 0 {
        return None;
    }
    let rows: Vec<usize> = if n < target {
        (0..target).map(|_| rng.gen_range(0..n)).collect()
    } else {
        sample(rng, n, target).into_vec()
    };
    Some(points.select(Axis(0), &rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_point_cloud_order() {
        let mut v = Array3::<NeuriteId>::zeros((2, 3, 4));
        v[(0, 1, 2)] = 5;
        v[(1, 0, 3)] = 1;
        let pc = to_point_cloud(v.view(), 0);
        assert_eq!(pc.dim(), (2, 3));
        assert_eq!(pc.row(0).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(pc.row(1).to_vec(), vec![1.0, 0.0, 3.0]);
        assert_eq!(to_point_cloud(v.view(), 1).nrows(), 1);
        assert_eq!(to_point_cloud(Array3::zeros((2, 2, 2)).view(), 0).nrows(), 0);
    }

    #[test]
    fn test_resample_exact_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [1usize, 3, 64, 200, 511] {
            let pts = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f32);
            for target in [1usize, 2, 64, 256] {
                let out = resample_points(pts.view(), target, &mut rng).unwrap();
                assert_eq!(out.dim(), (target, 3));
                if n >= target {
                    // 无放回: 行互不相同.
                    let rows: HashSet<i64> = out.rows().into_iter().map(|r| r[0] as i64).collect();
                    assert_eq!(rows.len(), target);
                }
            }
        }
    }

    #[test]
    fn test_resample_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = Array2::<f32>::zeros((0, 3));
        assert_eq!(resample_points(empty.view(), 16, &mut rng), None);
    }

    #[test]
    fn test_resample_reproducible() {
        let pts = Array2::from_shape_fn((100, 3), |(i, j)| (i + j) as f32);
        let a = resample_points(pts.view(), 10, &mut StdRng::seed_from_u64(3));
        let b = resample_points(pts.view(), 10, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
