//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{
    extract, extract_at, FuncVolume, LoadError, NiftiHeaderAttr, ScanSlice, ShapeError, SliceId,
};

pub use crate::consts::{DEFAULT_BINS, DEFAULT_SCANS_PER_RUN};

pub use crate::metric::{
    correlation, joint_histogram, measure, mutual_information, JointHistogram, Metric,
    MetricError, MetricKind,
};

pub use crate::batch::{
    aggregate, BatchConfig, BatchError, BatchResult, NiftiSource, ReportRow, Run, RunAggregate,
    VolumeSource,
};

#[cfg(feature = "rayon")]
pub use crate::batch::aggregate_par;

pub use crate::compare::{compare, ttest_ind, ComparisonResult, KindComparison, TTest};

pub use crate::dataset::home_dataset_dir_with;
pub use crate::dataset::{self, Strategy, SubjectLayout};
