//! 批量汇总结果.

use crate::data::SliceId;
use crate::metric::{Metric, MetricKind};
use std::collections::BTreeMap;

/// 一个 run 中某一种度量的全部结果, 按扫描顺序排列.
///
/// 不变式: 长度等于 [`BatchResult::scans_per_run`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunAggregate {
    run: String,
    kind: MetricKind,
    metrics: Vec<Metric>,
}

impl RunAggregate {
    pub(crate) fn new(run: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            run: run.into(),
            kind,
            metrics: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, metric: Metric) {
        debug_assert_eq!(metric.kind(), self.kind);
        self.metrics.push(metric);
    }

    /// run 名称.
    #[inline]
    pub fn run(&self) -> &str {
        &self.run
    }

    /// 度量种类.
    #[inline]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// 按扫描顺序排列的度量.
    #[inline]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// 按扫描顺序迭代度量值.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.metrics.iter().map(Metric::value)
    }

    /// 扫描个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// 度量值之和. 任一值为 `NaN` 时结果为 `NaN`.
    pub fn sum(&self) -> f64 {
        self.values().sum()
    }

    /// 度量值的均值.
    pub fn mean(&self) -> f64 {
        self.sum() / self.len() as f64
    }
}

/// 报表中的一行 `(label, value)`. `value` 为 `None` 时该行是分组标题.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportRow {
    /// 行标签.
    pub label: String,

    /// 行数值.
    pub value: Option<f64>,
}

impl ReportRow {
    fn value(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
        }
    }

    fn heading(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
        }
    }
}

/// 一个被试 (或一种配准策略) 的完整汇总结果.
///
/// 由 [`super::aggregate`] 一次完整运行产生, 要么完整, 要么不存在.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchResult {
    reference: SliceId,
    scans_per_run: usize,
    runs: BTreeMap<MetricKind, BTreeMap<String, RunAggregate>>,
}

impl BatchResult {
    pub(crate) fn new(reference: SliceId, scans_per_run: usize) -> Self {
        Self {
            reference,
            scans_per_run,
            runs: MetricKind::ALL
                .into_iter()
                .map(|k| (k, BTreeMap::new()))
                .collect(),
        }
    }

    pub(crate) fn insert(&mut self, aggregate: RunAggregate) {
        debug_assert_eq!(aggregate.len(), self.scans_per_run);
        self.runs
            .entry(aggregate.kind())
            .or_default()
            .insert(aggregate.run().to_owned(), aggregate);
    }

    /// 参考切片.
    #[inline]
    pub fn reference(&self) -> &SliceId {
        &self.reference
    }

    /// 每个 run 的扫描个数.
    #[inline]
    pub fn scans_per_run(&self) -> usize {
        self.scans_per_run
    }

    /// run 个数.
    pub fn run_count(&self) -> usize {
        self.runs
            .get(&MetricKind::Correlation)
            .map_or(0, BTreeMap::len)
    }

    /// 按字典序迭代 run 名称.
    pub fn run_ids(&self) -> impl Iterator<Item = &str> {
        self.runs
            .get(&MetricKind::Correlation)
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }

    /// 获取 run `id` 中 `kind` 度量的结果.
    pub fn run(&self, kind: MetricKind, id: &str) -> Option<&RunAggregate> {
        self.runs.get(&kind)?.get(id)
    }

    /// 按 run 名称字典序迭代 `kind` 度量的各 run 结果.
    pub fn runs(&self, kind: MetricKind) -> impl Iterator<Item = &RunAggregate> {
        self.runs.get(&kind).into_iter().flat_map(|m| m.values())
    }

    /// 各 run 的 `kind` 度量均值.
    pub fn run_means(&self, kind: MetricKind) -> Vec<(String, f64)> {
        self.runs(kind)
            .map(|r| (r.run().to_owned(), r.mean()))
            .collect()
    }

    /// 所有 run `kind` 度量值之和.
    pub fn grand_sum(&self, kind: MetricKind) -> f64 {
        self.runs(kind).map(RunAggregate::sum).sum()
    }

    /// 总均值: 所有值之和除以 `scans_per_run * run 个数`.
    pub fn grand_mean(&self, kind: MetricKind) -> f64 {
        self.grand_sum(kind) / (self.scans_per_run * self.run_count()) as f64
    }

    /// 所有 run 的 `kind` 度量值汇总列表, 先按 run, 再按扫描排列.
    pub fn pooled(&self, kind: MetricKind) -> Vec<f64> {
        self.runs(kind).flat_map(|r| r.values()).collect()
    }

    /// 生成报表行:
    ///
    /// ```text
    /// avg cc       <总均值>
    /// avg mi       <总均值>
    /// cc by runs
    /// cc_<run>     <run 均值>  ...
    /// mi by runs
    /// mi_<run>     <run 均值>  ...
    /// ```
    pub fn report_rows(&self) -> Vec<ReportRow> {
        let mut rows: Vec<ReportRow> = MetricKind::ALL
            .iter()
            .map(|k| ReportRow::value(format!("avg {}", k.short_name()), self.grand_mean(*k)))
            .collect();

        for kind in MetricKind::ALL {
            let name = kind.short_name();
            rows.push(ReportRow::heading(format!("{name} by runs")));
            rows.extend(
                self.run_means(kind)
                    .into_iter()
                    .map(|(run, mean)| ReportRow::value(format!("{name}_{run}"), mean)),
            );
        }
        rows
    }
}
