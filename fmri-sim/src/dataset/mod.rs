//! 数据集操作.

use std::path::{Path, PathBuf};

mod subject;

pub use subject::{DatasetError, Strategy, SubjectLayout};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_dataset_dir_with() {
        if let Some(base) = home_dataset_dir() {
            let p = home_dataset_dir_with(["sub01", "images", "func"]).unwrap();
            assert_eq!(p, base.join("sub01").join("images").join("func"));
            assert!(base.ends_with("dataset"));
        }
    }
}
