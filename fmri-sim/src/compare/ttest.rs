//! 等方差独立双样本 t 检验.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// t 检验结果.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TTest {
    /// t 统计量.
    pub statistic: f64,

    /// 双侧 p 值.
    pub p_value: f64,

    /// 自由度 `n1 + n2 - 2`.
    pub df: f64,
}

/// 样本均值与无偏方差 (ddof = 1).
pub(crate) fn mean_var(x: &[f64]) -> (f64, f64) {
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    let ss = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
    (mean, ss / (n - 1.0))
}

/// 对 `a` 与 `b` 做合并方差 (等方差) 的独立双样本 t 检验.
///
/// 语义与 `scipy.stats.ttest_ind(a, b)` 一致. 自由度不足
/// (`n1 + n2 <= 2`) 或样本含 `NaN` 时, 统计量与 p 值为 `NaN`.
/// 两样本方差均为 0 且均值不同时统计量为 ±inf, p 值为 0.
pub fn ttest_ind(a: &[f64], b: &[f64]) -> TTest {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let df = n1 + n2 - 2.0;
    let nan = TTest {
        statistic: f64::NAN,
        p_value: f64::NAN,
        df,
    };
    if a.is_empty() || b.is_empty() || df <= 0.0 {
        return nan;
    }

    let (m1, v1) = mean_var(a);
    let (m2, v2) = mean_var(b);
    // 单个样本时该组方差不贡献自由度, 视作 0.
    let v1 = if a.len() > 1 { v1 } else { 0.0 };
    let v2 = if b.len() > 1 { v2 } else { 0.0 };

    let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
    let statistic = (m1 - m2) / (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    if statistic.is_nan() {
        return nan;
    }

    let p_value = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * dist.sf(statistic.abs()),
        Err(_) => f64::NAN,
    };
    TTest {
        statistic,
        p_value: p_value.min(1.0),
        df,
    }
}
