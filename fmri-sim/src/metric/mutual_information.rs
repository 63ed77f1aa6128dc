use super::{joint_histogram, JointHistogram, MetricError};
use itertools::iproduct;
use ndarray::ArrayView2;

/// 计算 `a` 与 `b` 的互信息 (以 nat 为单位), `bins` 为每个轴的分箱数.
///
/// 只对联合概率严格大于 0 的箱求和, 以避开 `ln(0)`. 不做非负截断:
/// 近似独立的两张图在浮点误差下可能得到略小于 0 的值.
pub fn mutual_information(
    a: ArrayView2<f32>,
    b: ArrayView2<f32>,
    bins: usize,
) -> Result<f64, MetricError> {
    Ok(joint_histogram(a, b, bins)?.mutual_information())
}

impl JointHistogram {
    /// 由该直方图计算互信息:
    /// `Σ pxy[i, j] · ln(pxy[i, j] / (px[i] · py[j]))`, 仅对 `pxy > 0` 的箱求和.
    pub fn mutual_information(&self) -> f64 {
        let pxy = self.probabilities();
        let (px, py) = self.marginals();
        let bins = self.bins();

        iproduct!(0..bins, 0..bins)
            .map(|(i, j)| (pxy[[i, j]], px[i] * py[j]))
            .filter(|(p, _)| *p > 0.0)
            .map(|(p, q)| p * (p / q).ln())
            .sum()
    }
}
