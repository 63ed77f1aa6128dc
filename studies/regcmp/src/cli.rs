//! 命令行参数.

use clap::Parser;
use fmri_sim::consts::{DEFAULT_BINS, DEFAULT_SCANS_PER_RUN};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "regcmp",
    version,
    about = "Compare register-to-first and register-to-mean by slice similarity"
)]
pub struct Cli {
    /// 被试编号, 用于定位默认目录与命名报表.
    pub subject: String,

    #[arg(long, default_value_t = DEFAULT_SCANS_PER_RUN, help = "Scans expected in every run")]
    pub scans: usize,

    #[arg(long, default_value_t = DEFAULT_BINS, help = "Joint histogram bins per axis")]
    pub bins: usize,

    #[arg(long, default_value_t = false, help = "Save each report table as text")]
    pub save: bool,

    #[arg(long, help = "Functional image directory (default: $FMRI_FUNC_DIR)")]
    pub func_dir: Option<PathBuf>,

    #[arg(long, help = "Report directory (default: $FMRI_RESULT_DIR)")]
    pub out: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Measure scans one by one")]
    pub sequential: bool,

    #[arg(long, default_value_t = false, help = "Dump results as JSON to stdout")]
    pub json: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "-v: per-scan progress, -vv: trace")]
    pub verbose: u8,
}

impl Cli {
    /// 根据 `-v` 个数决定日志级别.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["regcmp", "sub01"]).unwrap();
        assert_eq!(cli.subject, "sub01");
        assert_eq!((cli.scans, cli.bins), (187, 20));
        assert!(!cli.save && !cli.json && !cli.sequential);
        assert_eq!(cli.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "regcmp", "sub02", "--scans", "10", "--bins", "8", "--save", "--out", "/tmp/r", "-vv",
        ])
        .unwrap();
        assert_eq!((cli.scans, cli.bins), (10, 8));
        assert!(cli.save);
        assert_eq!(cli.out.as_deref(), Some(std::path::Path::new("/tmp/r")));
        assert_eq!(cli.log_level(), log::LevelFilter::Trace);
    }
}
