use std::collections::VecDeque;

use itertools::iproduct;
use ndarray::{Array3, ArrayView3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{shift3d, Offset3d};
use crate::consts::{is_background, BACKGROUND};
use crate::NeuriteId;

/// 前后上下左右六个面邻居.
pub(crate) const FACE_6: [Offset3d; 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// 体素连通规则.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Connectivity {
    /// 共面相邻.
    Six,
    /// 共面、共棱或共点相邻.
    #[default]
    TwentySix,
}

impl Connectivity {
    /// 该规则下的所有邻居偏移量.
    pub(crate) fn offsets(self) -> Vec<Offset3d> {
        match self {
            Self::Six => FACE_6.to_vec(),
            Self::TwentySix => iproduct!(-1..=1, -1..=1, -1..=1)
                .filter(|&d| d != (0, 0, 0))
                .collect(),
        }
    }
}

/// 连通分量重标记.
///
/// 每个极大的同值相邻前景体素集合获得一个新编号, 编号从 1 开始按扫描顺序分配.
/// 背景保持为背景. 不同原标签即使相邻也属于不同分量.
pub fn connected_components(
    view: ArrayView3<NeuriteId>,
    connectivity: Connectivity,
) -> Array3<NeuriteId> {
    let shape = view.dim();
    let offsets = connectivity.offsets();
    let mut out = Array3::<NeuriteId>::from_elem(shape, BACKGROUND);
    let mut next_id: NeuriteId = BACKGROUND;
    let mut bfs_q = VecDeque::with_capacity(64);

    for (pos, &label) in view.indexed_iter() {
        if is_background(label) || out[pos] != BACKGROUND {
            continue;
        }
        next_id += 1;
        out[pos] = next_id;
        bfs_q.push_back(pos);
        while let Some(cur) = bfs_q.pop_front() {
            for &d in offsets.iter() {
                let Some(neigh) = shift3d(cur, d, shape) else {
                    continue;
                };
                if view[neigh] == label && out[neigh] == BACKGROUND {
                    out[neigh] = next_id;
                    bfs_q.push_back(neigh);
                }
            }
        }
        debug_assert!(bfs_q.is_empty());
    }
    out
}
