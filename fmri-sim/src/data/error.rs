//! 形状与加载错误.

use crate::Idx2d;
use std::path::PathBuf;
use thiserror::Error;

/// 数据形状不符合要求.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// 体数据不是三维的. 参数为实际形状.
    #[error("volume must have exactly 3 dimensions, got shape {0:?}")]
    NotThreeDimensional(Vec<usize>),

    /// 参与比较的两张切片形状不一致.
    #[error("slice shapes differ: {left:?} vs {right:?}")]
    Mismatch {
        /// 左侧 (参考) 切片形状.
        left: Idx2d,

        /// 右侧 (目标) 切片形状.
        right: Idx2d,
    },

    /// z 方向索引越界.
    #[error("slice index {index} out of range for z length {len}")]
    IndexOutOfRange {
        /// 请求的 z 索引.
        index: usize,

        /// z 方向长度.
        len: usize,
    },
}

/// 打开体数据文件时的错误.
///
/// 与 [`ShapeError`] 区分开, 调用方可以据此判断是文件本身损坏/不存在,
/// 还是文件正常但维度不对.
#[derive(Debug, Error)]
pub enum LoadError {
    /// nifti 解码或底层 I/O 错误.
    #[error("cannot read `{}`: {source}", path.display())]
    Nifti {
        /// 文件路径.
        path: PathBuf,

        /// 底层错误.
        #[source]
        source: nifti::NiftiError,
    },

    /// 文件可读, 但其中的体数据维度不符合要求.
    #[error("`{}`: {source}", path.display())]
    Shape {
        /// 文件路径.
        path: PathBuf,

        /// 形状错误.
        #[source]
        source: ShapeError,
    },
}

impl LoadError {
    /// 出错文件的路径.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Nifti { path, .. } | Self::Shape { path, .. } => path,
        }
    }
}
