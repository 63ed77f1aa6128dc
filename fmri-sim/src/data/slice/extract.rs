use super::{ScanSlice, SliceId};
use crate::data::{FuncVolume, NiftiHeaderAttr, ShapeError};
use ndarray::Axis;

/// 提取扫描 z 方向的中间层切片, 索引为 `floor(Z / 2)`.
///
/// `Z` 为偶数时取两个中心层中靠前的一个. 返回的切片中 NaN 已被置 0,
/// 其余值 (包括 inf 与负值) 原样保留. 源扫描不受影响.
///
/// `FuncVolume` 总是三维的; 维度检查发生在其构造阶段.
/// `Z == 0` 时没有可取的层, 返回 `ShapeError::IndexOutOfRange`.
pub fn extract(volume: &FuncVolume) -> Result<ScanSlice, ShapeError> {
    let z_index = volume.len_z() / 2;
    log::trace!("{}: slice index {z_index}", volume.origin().display());
    extract_at(volume, z_index)
}

/// 提取扫描 z 方向第 `z_index` 层切片. 越界时返回 `Err`.
pub fn extract_at(volume: &FuncVolume, z_index: usize) -> Result<ScanSlice, ShapeError> {
    let len = volume.len_z();
    if z_index >= len {
        return Err(ShapeError::IndexOutOfRange {
            index: z_index,
            len,
        });
    }

    let plane = volume.data().index_axis(Axis(2), z_index).to_owned();
    Ok(ScanSlice::new(
        SliceId::new(volume.origin(), z_index),
        plane,
    ))
}
