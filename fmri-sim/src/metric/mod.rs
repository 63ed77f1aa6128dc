//! 两张同形状二维切片之间的相似度度量.
//!
//! 两个度量都只依赖原始二维数组:
//!
//! 1. [`correlation`]: 行优先展平后的皮尔逊相关系数.
//! 2. [`mutual_information`]: 基于 [`JointHistogram`] 的互信息 (自然对数).

use crate::data::{ScanSlice, ShapeError, SliceId};
use std::fmt;
use thiserror::Error;

mod correlation;
mod histogram;
mod mutual_information;

pub use correlation::correlation;
pub use histogram::{joint_histogram, JointHistogram};
pub use mutual_information::mutual_information;

/// 度量计算错误.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    /// 两张切片形状不一致.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// 分箱数为 0.
    #[error("histogram needs at least one bin")]
    ZeroBins,

    /// 切片中没有任何像素, 无法确定取值范围.
    #[error("cannot bin an empty slice")]
    Empty,

    /// 某一轴的取值范围不是有限值 (切片中含 inf).
    #[error("range [{min}, {max}] of axis {axis} is not finite")]
    NonFiniteRange {
        /// 0 为参考切片, 1 为目标切片.
        axis: usize,

        /// 观测到的最小值.
        min: f64,

        /// 观测到的最大值.
        max: f64,
    },
}

/// 度量种类.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetricKind {
    /// 皮尔逊相关系数.
    Correlation,

    /// 互信息.
    MutualInformation,
}

impl MetricKind {
    /// 所有度量种类, 按报表顺序排列.
    pub const ALL: [MetricKind; 2] = [MetricKind::Correlation, MetricKind::MutualInformation];

    /// 报表中使用的缩写.
    #[inline]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Correlation => "cc",
            Self::MutualInformation => "mi",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Correlation => "correlation",
            Self::MutualInformation => "mutual_information",
        })
    }
}

/// 一次度量的结果, 标记了参与计算的两张切片.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metric {
    kind: MetricKind,
    value: f64,
    reference: SliceId,
    target: SliceId,
}

impl Metric {
    /// 直接初始化.
    #[inline]
    pub fn new(kind: MetricKind, value: f64, reference: SliceId, target: SliceId) -> Self {
        Self {
            kind,
            value,
            reference,
            target,
        }
    }

    /// 度量种类.
    #[inline]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// 度量值. 可能为 `NaN`.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// 参考切片.
    #[inline]
    pub fn reference(&self) -> &SliceId {
        &self.reference
    }

    /// 目标切片.
    #[inline]
    pub fn target(&self) -> &SliceId {
        &self.target
    }
}

/// 同时计算 `reference` 与 `target` 之间的相关系数和互信息,
/// 顺序与 [`MetricKind::ALL`] 一致.
pub fn measure(
    reference: &ScanSlice,
    target: &ScanSlice,
    bins: usize,
) -> Result<[Metric; 2], MetricError> {
    let (a, b) = (reference.data(), target.data());
    let cc = correlation(a, b)?;
    let mi = mutual_information(a, b, bins)?;

    let tag = |kind, value| Metric::new(kind, value, reference.id().clone(), target.id().clone());
    Ok([
        tag(MetricKind::Correlation, cc),
        tag(MetricKind::MutualInformation, mi),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, ArrayView2};

    fn slice(name: &str, data: Array2<f32>) -> ScanSlice {
        ScanSlice::new(SliceId::new(name, 0), data)
    }

    fn entropy_of_marginal(a: ArrayView2<f32>, bins: usize) -> f64 {
        let h = joint_histogram(a, a, bins).unwrap();
        let (px, _) = h.marginals();
        -px.iter()
            .filter(|p| **p > 0.0)
            .map(|p| p * p.ln())
            .sum::<f64>()
    }

    #[test]
    fn test_all_zero_slices() {
        let a = slice("ref", Array2::zeros((10, 10)));
        let b = slice("tgt", Array2::zeros((10, 10)));
        let [cc, mi] = measure(&a, &b, 20).unwrap();
        assert!(cc.value().is_nan());
        assert_eq!(mi.value(), 0.0);
    }

    #[test]
    fn test_identical_non_constant_4x4() {
        let data = Array2::from_shape_fn((4, 4), |(i, j)| (i * 4 + j) as f32);
        let a = slice("ref", data.clone());
        let b = slice("tgt", data);

        let [cc, mi] = measure(&a, &b, 20).unwrap();
        assert_eq!(cc.kind(), MetricKind::Correlation);
        assert_eq!(cc.value(), 1.0);

        let h = entropy_of_marginal(a.data(), 20);
        assert!((mi.value() - h).abs() < 1e-12);
        // 16 个不同取值, 分箱宽度 0.75 < 1, 各占一箱.
        assert!((mi.value() - 16f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_metric_tags() {
        let a = ScanSlice::new(SliceId::new("r.nii", 3), Array2::eye(3));
        let b = ScanSlice::new(SliceId::new("t.nii", 4), Array2::ones((3, 3)));
        let [cc, mi] = measure(&a, &b, 5).unwrap();
        assert_eq!(cc.reference(), a.id());
        assert_eq!(mi.target(), b.id());
        assert_eq!(mi.kind(), MetricKind::MutualInformation);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = slice("ref", Array2::zeros((3, 4)));
        let b = slice("tgt", Array2::zeros((4, 3)));
        assert!(matches!(
            measure(&a, &b, 20),
            Err(MetricError::Shape(ShapeError::Mismatch { .. }))
        ));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(MetricKind::Correlation.short_name(), "cc");
        assert_eq!(MetricKind::MutualInformation.to_string(), "mutual_information");
    }
}
