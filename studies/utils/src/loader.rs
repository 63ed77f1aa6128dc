//! 对 `fmri-sim::dataset` 的更一层封装. 提供更直接的被试目录定位.

use fmri_sim::dataset::{self, SubjectLayout};
use std::env;
use std::path::{Path, PathBuf};

/// 功能像目录环境变量.
pub const FUNC_DIR_ENV: &str = "FMRI_FUNC_DIR";

/// 结果目录环境变量.
pub const RESULT_DIR_ENV: &str = "FMRI_RESULT_DIR";

/// 读取非空环境变量.
fn non_empty_var(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// 获取被试 `subject` 的功能像目录.
///
/// 1. 若环境变量 `$FMRI_FUNC_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/{subject}/images/func`.
///
/// 无法确定用户主目录时返回 `None`.
pub fn func_dir_from_env_or_home(subject: &str) -> Option<PathBuf> {
    non_empty_var(FUNC_DIR_ENV)
        .or_else(|| dataset::home_dataset_dir_with([subject, "images", "func"]))
}

/// 获取结果报表目录.
///
/// 1. 若环境变量 `$FMRI_RESULT_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/results`.
pub fn result_dir_from_env_or_home() -> Option<PathBuf> {
    non_empty_var(RESULT_DIR_ENV).or_else(|| dataset::home_dataset_dir_with(["results"]))
}

/// 获取被试目录布局.
#[inline]
pub fn subject_layout<P: AsRef<Path>>(func_dir: P) -> SubjectLayout {
    SubjectLayout::new(func_dir.as_ref())
}

/// 从 `$FMRI_FUNC_DIR` 或者 `$HOME/dataset/{subject}/images/func` 获取被试目录布局.
#[inline]
pub fn subject_layout_from_env_or_home(subject: &str) -> Option<SubjectLayout> {
    func_dir_from_env_or_home(subject).map(subject_layout)
}
