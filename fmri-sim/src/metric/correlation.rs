use crate::data::slice::same_shape;
use crate::data::ShapeError;
use itertools::Itertools;
use ndarray::ArrayView2;

/// 计算 `a` 与 `b` 行优先展平后的皮尔逊相关系数.
///
/// 任一输入为常量 (方差为 0) 时结果为 `NaN`. 结果截断到 `[-1, 1]`,
/// 以吸收开方带来的舍入误差, 因此 `correlation(a, a)` 恰为 `1.0`.
///
/// 形状不一致时返回 `Err`.
pub fn correlation(a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<f64, ShapeError> {
    same_shape(a, b)?;
    Ok(pearson(a.iter().map(|v| *v as f64), b.iter().map(|v| *v as f64)))
}

/// 两遍扫描: 先求均值, 再求离差积和.
fn pearson<I, J>(x: I, y: J) -> f64
where
    I: Iterator<Item = f64> + Clone,
    J: Iterator<Item = f64> + Clone,
{
    let n = x.clone().count();
    if n == 0 {
        return f64::NAN;
    }
    let mean_x = x.clone().sum::<f64>() / n as f64;
    let mean_y = y.clone().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.zip_eq(y) {
        let (dx, dy) = (xi - mean_x, yi - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
