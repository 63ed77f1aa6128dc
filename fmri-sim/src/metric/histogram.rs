use super::MetricError;
use crate::data::slice::same_shape;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// 两张切片的联合直方图 (特征空间).
///
/// `counts[[i, j]]` 为参考切片强度落在第 `i` 箱、同时目标切片强度落在第 `j`
/// 箱的像素对个数. 两个轴的分箱各自独立, 覆盖各自切片的观测最小/最大值.
///
/// 不变式: 所有计数之和等于像素对个数.
#[derive(Debug, Clone)]
pub struct JointHistogram {
    counts: Array2<u64>,
    x_edges: Vec<f64>,
    y_edges: Vec<f64>,
}

/// 计算 `a` 与 `b` 的 `bins × bins` 联合直方图.
///
/// 分箱与 numpy `histogram2d` 一致: 每个轴 `bins + 1` 个等距边界,
/// 区间左闭右开, 最后一箱右闭. 若某轴的所有值相同, 该轴范围扩展为
/// `[v - 0.5, v + 0.5]`.
pub fn joint_histogram(
    a: ArrayView2<f32>,
    b: ArrayView2<f32>,
    bins: usize,
) -> Result<JointHistogram, MetricError> {
    same_shape(a, b)?;
    if bins == 0 {
        return Err(MetricError::ZeroBins);
    }

    let x_edges = edges(a, 0, bins)?;
    let y_edges = edges(b, 1, bins)?;

    let mut counts = Array2::<u64>::zeros((bins, bins));
    for (&va, &vb) in a.iter().zip(b.iter()) {
        let i = bin_of(&x_edges, va as f64);
        let j = bin_of(&y_edges, vb as f64);
        counts[[i, j]] += 1;
    }

    Ok(JointHistogram {
        counts,
        x_edges,
        y_edges,
    })
}

/// 等距分箱边界. 与 `numpy.linspace` 相同, 末端点精确等于最大值.
fn edges(values: ArrayView2<f32>, axis: usize, bins: usize) -> Result<Vec<f64>, MetricError> {
    let (min, max) = values
        .iter()
        .map(|v| *v as f64)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(MetricError::Empty)?;

    if !min.is_finite() || !max.is_finite() {
        return Err(MetricError::NonFiniteRange { axis, min, max });
    }
    let (min, max) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };

    let step = (max - min) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| min + i as f64 * step).collect();
    edges.push(max);
    Ok(edges)
}

/// 值 `v` 所在箱的索引. `v` 必须位于 `[edges[0], edges[last]]` 内.
#[inline]
fn bin_of(edges: &[f64], v: f64) -> usize {
    let bins = edges.len() - 1;
    // 右闭的最后一箱.
    if v >= edges[bins] {
        return bins - 1;
    }
    edges.partition_point(|e| *e <= v).saturating_sub(1).min(bins - 1)
}

impl JointHistogram {
    /// 每个轴的分箱数.
    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.nrows()
    }

    /// 原始计数.
    #[inline]
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// 参考切片轴 (第 0 轴) 的分箱边界, 长度为 `bins + 1`.
    #[inline]
    pub fn x_edges(&self) -> &[f64] {
        &self.x_edges
    }

    /// 目标切片轴 (第 1 轴) 的分箱边界, 长度为 `bins + 1`.
    #[inline]
    pub fn y_edges(&self) -> &[f64] {
        &self.y_edges
    }

    /// 计数总和, 即像素对个数.
    #[inline]
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// 归一化为联合概率 `pxy`. 各元素之和为 1.
    pub fn probabilities(&self) -> Array2<f64> {
        let total = self.total() as f64;
        self.counts.mapv(|c| c as f64 / total)
    }

    /// 边缘概率 `(px, py)`: `px[i] = Σ_j pxy[i, j]`, `py[j] = Σ_i pxy[i, j]`.
    pub fn marginals(&self) -> (Array1<f64>, Array1<f64>) {
        let pxy = self.probabilities();
        (pxy.sum_axis(Axis(1)), pxy.sum_axis(Axis(0)))
    }

    /// 对数尺度计数: 非零计数取自然对数, 零计数保持为 0.
    ///
    /// 大计数箱会压制其他箱的对比度, 作图时通常使用该形式.
    pub fn log_counts(&self) -> Array2<f64> {
        self.counts
            .mapv(|c| if c == 0 { 0.0 } else { (c as f64).ln() })
    }
}
