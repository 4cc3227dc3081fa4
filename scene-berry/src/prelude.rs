//! 🫐欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, InstanceId};

pub use crate::{CompactRaster, ImgWriteRaw, ImgWriteVis, InstanceMask, InstanceRaster, MaskedCrop};

pub use crate::anno::{SceneAnnotation, SegGroup};
pub use crate::consts::{LabelSet, DEFAULT_TOP_K, NO_INSTANCE};
pub use crate::crop::extract_crop;
pub use crate::pose::PoseTable;
pub use crate::ranking::{select_top_k, RankedViews};
pub use crate::visibility::{image_visibility, scene_visibility, VisibilityRecord};

pub use crate::dataset::{self, DatasetLayout};
pub use crate::pipeline::{CropPass, MaskPass};
