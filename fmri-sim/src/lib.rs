#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 度量两个 3D 功能像扫描 (nifti) 之间的相似度, 并按 run 批量汇总,
//! 以便对两种配准策略做统计比较.
//!
//! 该 crate 仅提供 `safe` 接口. 所有致命错误都以 `Result::Err` 交给调用方,
//! 不会返回部分结果.
//!
//! # 流程
//!
//! 体素文件 -> [`extract`] -> 二维切片 -> [`metric`] (与同一张参考切片两两比较)
//! -> [`batch::aggregate`] (按 run 累积) -> 两份 [`BatchResult`]
//! -> [`compare::compare`] -> 检验统计量.
//!
//! ### 切片提取 ✅
//!
//! 取最后一维 (z) 的中间层 `floor(Z / 2)`, 并把 NaN 置 0.
//!
//! 实现位于 `fmri-sim/src/data/slice`.
//!
//! ### 相似度度量 ✅
//!
//! 皮尔逊相关系数, 联合直方图与互信息.
//!
//! 实现位于 `fmri-sim/src/metric`.
//!
//! ### 批量汇总 ✅
//!
//! run 按名称字典序, run 内扫描按文件名字典序处理. 每个 run 的扫描数必须严格等于配置值.
//!
//! 实现位于 `fmri-sim/src/batch`.
//!
//! ### 双样本比较 ✅
//!
//! 等方差独立双样本 t 检验.
//!
//! 实现位于 `fmri-sim/src/compare`.
//!
//! ### 被试目录 ✅
//!
//! run 子目录与扫描文件的发现, 以及两种配准策略 (rtf / rtm) 的参考扫描定位.
//!
//! 实现位于 `fmri-sim/src/dataset`.
//!
//! # 数值约定
//!
//! 1. 任一输入方差为 0 时相关系数为 `NaN`, 不视为错误.
//! 2. 互信息不做非负截断, 浮点误差可能使其略小于 0.

/// 二维索引 (x, y).
pub type Idx2d = (usize, usize);

/// 三维索引 (x, y, z).
pub type Idx3d = (usize, usize, usize);

/// 3D 功能像 nii 文件基础数据结构.
mod data;

pub use data::{
    extract, extract_at, FuncVolume, LoadError, NiftiHeaderAttr, ScanSlice, ShapeError, SliceId,
};

pub mod batch;
pub mod compare;
pub mod consts;
pub mod dataset;
pub mod metric;
pub mod prelude;

pub use batch::{BatchConfig, BatchResult, RunAggregate};
pub use compare::ComparisonResult;
pub use metric::{Metric, MetricKind};
