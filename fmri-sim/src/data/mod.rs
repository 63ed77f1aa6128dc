use std::path::{Path, PathBuf};

use ndarray::{Array3, ArrayD, ArrayView, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::Idx3d;

mod error;
pub mod slice;

pub use error::{LoadError, ShapeError};
pub use slice::{extract, extract_at, ScanSlice, SliceId};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// nii 格式 3D 功能像扫描, 包括 header 和体素强度. 强度值以 `f32` 保存.
///
/// 数据按 nifti 惯例以 `(x, y, z)` 访问, 不做轴变换.
/// 加载后不可变.
#[derive(Debug, Clone)]
pub struct FuncVolume {
    header: BoxedHeader,
    origin: PathBuf,
    data: Array3<f32>,
}

/// `dim` 字段: `[ndim, x, y, z, ..]`.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    let [_, x, y, z, ..] = h.dim;
    (x as usize, y as usize, z as usize)
}

/// 为内存中直接构造的体数据生成一个最小 header: 三维, 体素大小均为 1mm.
fn synthetic_header((x, y, z): Idx3d) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    header.dim = [3, x as _, y as _, z as _, 1, 1, 1, 1];
    header.pixdim = [1.0; 8];
    header.intent_name[..4].copy_from_slice(b"mem\0");
    header
}

/// 3D nii 文件 header 的共用属性.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小 `(x, y, z)`.
    #[inline]
    fn shape(&self) -> Idx3d {
        get_shape_from_header(self.header())
    }

    /// 获取 z 方向切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().2
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (x, y, z) = self.shape();
        x * y * z
    }

    /// 获取单个体素分辨率 `[x, y, z]`, 以毫米为单位.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, x, y, z, ..] = self.header().pixdim;
        [x as f64, y as f64, z as f64]
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }
}

impl NiftiHeaderAttr for FuncVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl FuncVolume {
    /// 打开 nii (或 nii.gz) 文件格式的 3D 扫描. `path` 为文件的本地路径.
    ///
    /// 文件无法读取时返回 [`LoadError::Nifti`]; 文件中的数据不是三维时返回
    /// [`LoadError::Shape`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let nifti_err = |source| LoadError::Nifti {
            path: path.to_owned(),
            source,
        };

        let obj = ReaderOptions::new().read_file(path).map_err(nifti_err)?;
        let header = Box::new(obj.header().clone());
        let data = obj
            .into_volume()
            .into_ndarray::<f32>()
            .map_err(nifti_err)?;

        let data = into_3d(data).map_err(|source| LoadError::Shape {
            path: path.to_owned(),
            source,
        })?;
        debug_assert_eq!(data.dim(), get_shape_from_header(&header));

        Ok(Self {
            header,
            origin: path.to_owned(),
            data,
        })
    }

    /// 根据内存中的三维数据直接创建扫描. `origin` 仅用于标识切片来源.
    pub fn from_array(data: Array3<f32>, origin: impl Into<PathBuf>) -> Self {
        Self {
            header: synthetic_header(data.dim()),
            origin: origin.into(),
            data,
        }
    }

    /// 同 [`Self::from_array`], 但接受任意维度的数据. 非三维时返回 `Err`.
    pub fn from_dyn(data: ArrayD<f32>, origin: impl Into<PathBuf>) -> Result<Self, ShapeError> {
        Ok(Self::from_array(into_3d(data)?, origin))
    }

    /// 该扫描的来源 (文件路径, 或构造时给出的标识).
    #[inline]
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// 判断该结构是否是由 `from_*` 方法在内存中构造的.
    pub fn is_synthetic(&self) -> bool {
        self.header.intent_name.starts_with(b"mem\0")
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }
}

/// 检查维度并转换为三维数组.
fn into_3d(data: ArrayD<f32>) -> Result<Array3<f32>, ShapeError> {
    let shape = data.shape().to_vec();
    data.into_dimensionality::<Ix3>()
        .map_err(|_| ShapeError::NotThreeDimensional(shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_synthetic_header_attr() {
        let v = FuncVolume::from_array(Array3::zeros((4, 5, 6)), "mem://a");
        assert_eq!(v.shape(), (4, 5, 6));
        assert_eq!(v.len_z(), 6);
        assert_eq!(v.size(), 120);
        assert_eq!(v.pix_dim(), [1.0, 1.0, 1.0]);
        assert_eq!(v.voxel(), 1.0);
        assert!(v.is_synthetic());
        assert_eq!(v.origin(), Path::new("mem://a"));
    }

    #[test]
    fn test_from_dyn_rejects_non_3d() {
        let d4 = ArrayD::<f32>::zeros(IxDyn(&[2, 2, 2, 2]));
        assert_eq!(
            FuncVolume::from_dyn(d4, "x").unwrap_err(),
            ShapeError::NotThreeDimensional(vec![2, 2, 2, 2])
        );

        let d2 = ArrayD::<f32>::zeros(IxDyn(&[3, 3]));
        assert!(matches!(
            FuncVolume::from_dyn(d2, "x"),
            Err(ShapeError::NotThreeDimensional(_))
        ));

        let d3 = ArrayD::<f32>::zeros(IxDyn(&[3, 2, 1]));
        assert_eq!(FuncVolume::from_dyn(d3, "x").unwrap().shape(), (3, 2, 1));
    }

    #[test]
    fn test_open_missing_file() {
        let err = FuncVolume::open("/definitely/not/here/func1_00001.nii").unwrap_err();
        assert!(matches!(err, LoadError::Nifti { .. }));
        assert_eq!(
            err.path(),
            Path::new("/definitely/not/here/func1_00001.nii")
        );
    }
}
