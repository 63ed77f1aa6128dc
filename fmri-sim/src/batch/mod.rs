//! 批量汇总: 参考切片对一个被试所有 run 的所有扫描逐一求相似度,
//! 并按 run 累积.
//!
//! run 按名称字典序处理, run 内扫描按文件名字典序处理.
//! 处理顺序是可观测契约的一部分: 总体列表按 "先 run, 后扫描" 排列.

use crate::consts::{DEFAULT_BINS, DEFAULT_SCANS_PER_RUN};
use crate::data::{FuncVolume, LoadError};
use std::path::{Path, PathBuf};

mod aggregate;
mod error;
mod result;

pub use aggregate::aggregate;
pub use error::{BatchError, CountMismatchError};
pub use result::{BatchResult, ReportRow, RunAggregate};

#[cfg(feature = "rayon")]
pub use aggregate::aggregate_par;

/// 批量汇总参数.
///
/// 该对象是只读的. 若要修改参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    bins: usize,
    scans_per_run: usize,
}

impl BatchConfig {
    /// 构建参数. `bins` 与 `scans_per_run` 均必须大于 0, 否则返回 `None`.
    pub fn new(bins: usize, scans_per_run: usize) -> Option<Self> {
        (bins > 0 && scans_per_run > 0).then_some(Self {
            bins,
            scans_per_run,
        })
    }

    /// 联合直方图每轴分箱数.
    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// 每个 run 应有的扫描个数.
    #[inline]
    pub fn scans_per_run(&self) -> usize {
        self.scans_per_run
    }
}

impl Default for BatchConfig {
    /// 20 个分箱, 每 run 187 个扫描.
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            scans_per_run: DEFAULT_SCANS_PER_RUN,
        }
    }
}

/// 一个 run: 名称 + 扫描文件列表.
///
/// 列表顺序无关紧要, 汇总时会按文件名重新排序.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    id: String,
    scans: Vec<PathBuf>,
}

impl Run {
    /// 直接初始化.
    pub fn new<I, P>(id: impl Into<String>, scans: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            id: id.into(),
            scans: scans.into_iter().map(Into::into).collect(),
        }
    }

    /// run 名称.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 扫描文件列表.
    #[inline]
    pub fn scans(&self) -> &[PathBuf] {
        &self.scans
    }

    /// 扫描个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// 是否没有扫描.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// 按文件名字典序排列扫描.
    fn sort_scans(&mut self) {
        self.scans
            .sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
    }
}

/// 体数据来源. 给定扫描路径, 返回解码后的 3D 扫描.
pub trait VolumeSource {
    /// 加载 `scan`.
    fn load(&self, scan: &Path) -> Result<FuncVolume, LoadError>;
}

/// 从本地 nii 文件加载.
#[derive(Copy, Clone, Debug, Default)]
pub struct NiftiSource;

impl VolumeSource for NiftiSource {
    #[inline]
    fn load(&self, scan: &Path) -> Result<FuncVolume, LoadError> {
        FuncVolume::open(scan)
    }
}

impl<F> VolumeSource for F
where
    F: Fn(&Path) -> Result<FuncVolume, LoadError>,
{
    #[inline]
    fn load(&self, scan: &Path) -> Result<FuncVolume, LoadError> {
        self(scan)
    }
}
