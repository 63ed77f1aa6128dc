//! 单个被试的功能像目录布局.
//!
//! ```text
//! <func_dir>/
//!     func1/
//!         func1_00001.nii
//!         func1_00002.nii
//!         ...
//!         meanfunc1_00001.nii
//!     func2/
//!         ...
//! ```

use crate::batch::Run;
use crate::consts::naming::{FIRST_SCAN_SUFFIX, MEAN_PREFIX, SCAN_SUFFIX, SCAN_TAG};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 遍历被试目录时出现的错误.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// 目录无法读取.
    #[error("cannot read directory {}", path.display())]
    Io {
        /// 出错的目录.
        path: PathBuf,

        /// 底层 IO 错误.
        #[source]
        source: io::Error,
    },

    /// 目录下没有任何 run 子目录.
    #[error("no run directory under {}", .0.display())]
    NoRuns(PathBuf),
}

/// 配准策略, 决定使用哪个文件作为参考扫描.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// 配准到第一个扫描: 参考为第一个 run 的 `<run>_00001.nii`.
    RegisterToFirst,

    /// 配准到均值像: 参考为第一个 run 的 `mean<run>_00001.nii`.
    RegisterToMean,
}

impl Strategy {
    /// 所有策略.
    pub const ALL: [Strategy; 2] = [Strategy::RegisterToFirst, Strategy::RegisterToMean];

    /// 缩写.
    #[inline]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::RegisterToFirst => "rtf",
            Self::RegisterToMean => "rtm",
        }
    }

    /// run `run` 下该策略的参考文件名.
    pub fn reference_file_name(&self, run: &str) -> String {
        match self {
            Self::RegisterToFirst => format!("{run}{FIRST_SCAN_SUFFIX}"),
            Self::RegisterToMean => format!("{MEAN_PREFIX}{run}{FIRST_SCAN_SUFFIX}"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// 一个被试的功能像目录.
///
/// 该对象只保存路径, 每次查询都会重新读取目录.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectLayout {
    func_dir: PathBuf,
    tag: String,
    suffix: String,
}

impl SubjectLayout {
    /// 以默认文件名约定 (前缀 `func`, 后缀 `nii`) 创建.
    pub fn new(func_dir: impl Into<PathBuf>) -> Self {
        Self::with_naming(func_dir, SCAN_TAG, SCAN_SUFFIX)
    }

    /// 以自定义的扫描文件名前缀与后缀创建.
    pub fn with_naming(
        func_dir: impl Into<PathBuf>,
        tag: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            func_dir: func_dir.into(),
            tag: tag.into(),
            suffix: suffix.into(),
        }
    }

    /// 功能像根目录.
    #[inline]
    pub fn func_dir(&self) -> &Path {
        &self.func_dir
    }

    /// 按字典序列出所有 run 子目录名.
    pub fn run_ids(&self) -> Result<Vec<String>, DatasetError> {
        let mut ids = Vec::new();
        for entry in read_dir(&self.func_dir)? {
            let entry = entry.map_err(|e| io_err(&self.func_dir, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| io_err(&self.func_dir, e))?
                .is_dir();
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_owned());
            } else {
                log::warn!("skip non-utf8 run directory {:?}", entry.path());
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// 按文件名字典序列出 run `run` 下所有扫描文件.
    ///
    /// 只有文件名以前缀开头、以后缀结尾的文件才算作扫描, 因此均值像
    /// (`mean` 开头) 不在其中.
    pub fn scans(&self, run: &str) -> Result<Vec<PathBuf>, DatasetError> {
        let dir = self.func_dir.join(run);
        let mut scans = Vec::new();
        for entry in read_dir(&dir)? {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(self.tag.as_str()) && name.ends_with(self.suffix.as_str()) {
                scans.push(entry.path());
            }
        }
        scans.sort_unstable_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(scans)
    }

    /// 列出所有 run 及其扫描.
    ///
    /// 不检查各 run 的扫描个数, 该检查在 [`crate::batch::aggregate`] 中进行.
    pub fn runs(&self) -> Result<Vec<Run>, DatasetError> {
        let ids = self.run_ids()?;
        if ids.is_empty() {
            return Err(DatasetError::NoRuns(self.func_dir.clone()));
        }
        ids.into_iter()
            .map(|id| -> Result<Run, DatasetError> {
                let scans = self.scans(&id)?;
                log::debug!("found run {id} with {} scans", scans.len());
                Ok(Run::new(id, scans))
            })
            .collect()
    }

    /// 给定策略的参考扫描路径. 参考总是取自第一个 run.
    ///
    /// 只拼接路径, 不检查文件是否存在.
    pub fn reference_path(&self, strategy: Strategy) -> Result<PathBuf, DatasetError> {
        let first = self
            .run_ids()?
            .into_iter()
            .next()
            .ok_or_else(|| DatasetError::NoRuns(self.func_dir.clone()))?;
        let mut path = self.func_dir.join(&first);
        path.push(strategy.reference_file_name(&first));
        Ok(path)
    }
}

#[inline]
fn io_err(path: &Path, source: io::Error) -> DatasetError {
    DatasetError::Io {
        path: path.to_owned(),
        source,
    }
}

fn read_dir(path: &Path) -> Result<fs::ReadDir, DatasetError> {
    fs::read_dir(path).map_err(|e| io_err(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(p: PathBuf) {
        File::create(p).unwrap();
    }

    /// 两个 run (倒序创建), 每个 3 个扫描, 外加均值像与杂项文件.
    fn layout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for run in ["func2", "func1"] {
            let d = dir.path().join(run);
            fs::create_dir(&d).unwrap();
            for s in [3, 1, 2] {
                touch(d.join(format!("{run}_{s:05}.nii")));
            }
            touch(d.join(format!("mean{run}_00001.nii")));
            touch(d.join(format!("{run}_00001.mat")));
            touch(d.join("rp_func.txt"));
        }
        touch(dir.path().join("notes.txt"));
        dir
    }

    #[test]
    fn test_run_ids_sorted_dirs_only() {
        let dir = layout();
        let s = SubjectLayout::new(dir.path());
        assert_eq!(s.run_ids().unwrap(), ["func1", "func2"]);
    }

    #[test]
    fn test_scans_filtered_and_sorted() {
        let dir = layout();
        let s = SubjectLayout::new(dir.path());
        let names: Vec<_> = s
            .scans("func2")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["func2_00001.nii", "func2_00002.nii", "func2_00003.nii"]);
    }

    #[test]
    fn test_runs() {
        let dir = layout();
        let runs = SubjectLayout::new(dir.path()).runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id(), "func1");
        assert_eq!(runs[1].len(), 3);
        assert_eq!(runs[1].scans()[0], dir.path().join("func2").join("func2_00001.nii"));
    }

    #[test]
    fn test_reference_paths() {
        let dir = layout();
        let s = SubjectLayout::new(dir.path());
        assert_eq!(
            s.reference_path(Strategy::RegisterToFirst).unwrap(),
            dir.path().join("func1").join("func1_00001.nii")
        );
        assert_eq!(
            s.reference_path(Strategy::RegisterToMean).unwrap(),
            dir.path().join("func1").join("meanfunc1_00001.nii")
        );
        assert_eq!(Strategy::RegisterToMean.to_string(), "rtm");
    }

    #[test]
    fn test_custom_naming() {
        let dir = layout();
        let s = SubjectLayout::with_naming(dir.path(), "mean", "nii");
        assert_eq!(s.scans("func1").unwrap().len(), 1);
    }

    #[test]
    fn test_errors() {
        let dir = tempfile::tempdir().unwrap();
        let s = SubjectLayout::new(dir.path());
        assert!(matches!(s.runs(), Err(DatasetError::NoRuns(_))));
        assert!(matches!(
            s.reference_path(Strategy::RegisterToFirst),
            Err(DatasetError::NoRuns(_))
        ));

        let missing = SubjectLayout::new(dir.path().join("nope"));
        assert!(matches!(missing.run_ids(), Err(DatasetError::Io { .. })));
        assert!(matches!(s.scans("func9"), Err(DatasetError::Io { .. })));
    }
}
