//! 两份批量汇总结果 (例如两种配准策略) 之间的双样本比较.
//!
//! 每种度量独立检验, 不做多重比较校正.

use crate::batch::BatchResult;
use crate::metric::MetricKind;
use std::collections::BTreeMap;
use thiserror::Error;

mod ttest;

pub use ttest::{ttest_ind, TTest};

/// 两份结果的汇总样本量不一致.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pooled {kind} samples differ in size: {left} vs {right}")]
pub struct SampleSizeError {
    /// 度量种类.
    pub kind: MetricKind,

    /// 左侧样本量.
    pub left: usize,

    /// 右侧样本量.
    pub right: usize,
}

/// 单一度量的比较结果.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KindComparison {
    /// 检验结果.
    pub ttest: TTest,

    /// 左侧样本均值.
    pub mean_left: f64,

    /// 右侧样本均值.
    pub mean_right: f64,

    /// 每侧样本量.
    pub n: usize,
}

/// 每种度量各自的比较结果.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonResult {
    by_kind: BTreeMap<MetricKind, KindComparison>,
}

impl ComparisonResult {
    /// 获取 `kind` 度量的比较结果.
    #[inline]
    pub fn get(&self, kind: MetricKind) -> Option<&KindComparison> {
        self.by_kind.get(&kind)
    }

    /// 按 [`MetricKind::ALL`] 顺序迭代.
    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, &KindComparison)> {
        self.by_kind.iter().map(|(k, v)| (*k, v))
    }
}

/// 对 `left` 与 `right` 的每种度量汇总列表做等方差独立双样本 t 检验.
///
/// 两份结果应使用相同的 run 结构与每 run 扫描数; 任一度量的汇总样本量不一致时
/// 返回 `Err`. 样本中的 `NaN` 会传播到对应度量的检验结果中.
pub fn compare(left: &BatchResult, right: &BatchResult) -> Result<ComparisonResult, SampleSizeError> {
    let mut by_kind = BTreeMap::new();
    for kind in MetricKind::ALL {
        let (a, b) = (left.pooled(kind), right.pooled(kind));
        if a.len() != b.len() {
            return Err(SampleSizeError {
                kind,
                left: a.len(),
                right: b.len(),
            });
        }

        let t = ttest_ind(&a, &b);
        log::info!(
            "{kind}: t = {:.6}, p = {:.6} (n = {})",
            t.statistic,
            t.p_value,
            a.len()
        );
        by_kind.insert(
            kind,
            KindComparison {
                ttest: t,
                mean_left: ttest::mean_var(&a).0,
                mean_right: ttest::mean_var(&b).0,
                n: a.len(),
            },
        );
    }
    Ok(ComparisonResult { by_kind })
}
