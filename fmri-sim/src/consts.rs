//! 通用常量.

/// 联合直方图每个轴的默认分箱数.
pub const DEFAULT_BINS: usize = 20;

/// 每个 run 默认应有的扫描文件个数.
pub const DEFAULT_SCANS_PER_RUN: usize = 187;

/// 文件名相关约定.
pub mod naming {
    /// 扫描文件名前缀. run 目录下只有以它开头的文件才算作扫描.
    pub const SCAN_TAG: &str = "func";

    /// 扫描文件名后缀.
    pub const SCAN_SUFFIX: &str = "nii";

    /// 每个 run 第一个扫描文件名中, run 名之后的部分.
    pub const FIRST_SCAN_SUFFIX: &str = "_00001.nii";

    /// 均值像文件名前缀.
    pub const MEAN_PREFIX: &str = "mean";
}
