//! 二维切片对象及其提取.

mod extract;

pub use extract::{extract, extract_at};

use crate::data::ShapeError;
use crate::Idx2d;
use ndarray::iter::Iter;
use ndarray::{Array2, ArrayView2, Ix2};
use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};

/// 切片身份: 来源扫描 + z 方向索引.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SliceId {
    origin: PathBuf,
    z_index: usize,
}

impl SliceId {
    /// 直接初始化.
    #[inline]
    pub fn new(origin: impl Into<PathBuf>, z_index: usize) -> Self {
        Self {
            origin: origin.into(),
            z_index,
        }
    }

    /// 来源扫描.
    #[inline]
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// z 方向索引.
    #[inline]
    pub fn z_index(&self) -> usize {
        self.z_index
    }
}

impl fmt::Display for SliceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[z={}]", self.origin.display(), self.z_index)
    }
}

/// 从 3D 扫描中取出的二维切片, 形状为 `(x, y)`.
///
/// 不变式: 不含 NaN. 切片独占其数据, 创建后不可修改.
#[derive(Debug, Clone)]
pub struct ScanSlice {
    id: SliceId,
    data: Array2<f32>,
}

impl Index<Idx2d> for ScanSlice {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl ScanSlice {
    /// 用给定数据直接创建切片. NaN 会被替换为 0.
    pub fn new(id: SliceId, mut data: Array2<f32>) -> Self {
        data.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
        Self { id, data }
    }

    /// 切片身份.
    #[inline]
    pub fn id(&self) -> &SliceId {
        &self.id
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 按行优先序迭代像素.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 获取给定位置的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f32> {
        self.data.get(pos)
    }

    /// 切片形状 `(x, y)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 检查 `other` 与 `self` 形状一致.
    pub fn check_same_shape(&self, other: &ScanSlice) -> Result<(), ShapeError> {
        same_shape(self.data(), other.data())
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<f32> {
        self.data
    }
}

/// 检查两个二维数组形状一致.
pub(crate) fn same_shape(a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<(), ShapeError> {
    if a.dim() == b.dim() {
        Ok(())
    } else {
        Err(ShapeError::Mismatch {
            left: a.dim(),
            right: b.dim(),
        })
    }
}
