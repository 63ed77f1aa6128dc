//! 批量汇总运行时错误. 任一错误都会使整个批次作废.

use crate::data::LoadError;
use crate::metric::MetricError;
use std::path::PathBuf;
use thiserror::Error;

/// 某个 run 的扫描文件个数与配置不符.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("total scan files found ({actual}) do not match {expected} for run `{run}`")]
pub struct CountMismatchError {
    /// run 名称.
    pub run: String,

    /// 配置的每 run 扫描数.
    pub expected: usize,

    /// 实际找到的扫描数.
    pub actual: usize,
}

/// 批量汇总错误.
#[derive(Debug, Error)]
pub enum BatchError {
    /// 没有任何 run.
    #[error("no runs to aggregate")]
    NoRuns,

    /// 同一个 run 名称出现了多次.
    #[error("run `{0}` appears more than once")]
    DuplicateRun(String),

    /// 扫描数不符.
    #[error(transparent)]
    CountMismatch(#[from] CountMismatchError),

    /// 扫描文件加载失败.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// 切片提取或度量计算失败 (例如与参考切片形状不一致).
    #[error("run `{run}`, scan `{}`: {source}", scan.display())]
    Measure {
        /// run 名称.
        run: String,

        /// 扫描文件.
        scan: PathBuf,

        /// 底层错误.
        #[source]
        source: MetricError,
    },
}
