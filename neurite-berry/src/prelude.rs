//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{BatchId, Example, LabelSlice, LabelVolume};
pub use crate::{Idx2d, Idx3d, NeuriteId};

pub use crate::augment::{Augment, Identity, PointAugmentor};
pub use crate::config::DatasetPreset;
pub use crate::consts::{BACKGROUND, SEQUENCER_MIN_CLASS_VOXELS};
pub use crate::error::{ConfigError, GenerateError};

pub use crate::ops::{Connectivity, LabelCorrespondence, SurfaceMode};

pub use crate::pair::{PairExampleBuilder, PairSpec};
pub use crate::sequencer::{
    CandidateBatch, GapSequencer, GenerationStats, Partition, SequencerSpec, SequencerState,
};
pub use crate::synth::{CandidateSynthesizer, Gap, GapVolume, SynthSpec};

pub use crate::dataset::{self, home_dataset_dir_with, NpzArchive};

#[cfg(feature = "rayon")]
pub use crate::generate_partitioned;
