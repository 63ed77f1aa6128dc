//! 实验结果.

use crate::cli::Cli;
use anyhow::{Context, Result};
use fmri_sim::batch::ReportRow;
use fmri_sim::dataset::Strategy;
use fmri_sim::{BatchResult, ComparisonResult};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 一种策略的汇总结果.
pub struct StrategyRun {
    pub strategy: Strategy,
    pub reference: PathBuf,
    pub result: BatchResult,
}

/// 报表文件名: `{subject}_mi_{参考文件名}.txt`.
fn report_file_name(subject: &str, reference: &Path) -> String {
    let name = reference
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    format!("{subject}_mi_{name}.txt")
}

/// 将报表行写成两列对齐的表格.
fn describe_into<W: Write>(rows: &[ReportRow], w: &mut W) -> io::Result<()> {
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    for row in rows {
        match row.value {
            Some(v) => writeln!(w, "{:<width$}  {v:.6}", row.label)?,
            None => writeln!(w, "{:<width$}  -----", row.label)?,
        }
    }
    Ok(())
}

/// 将两种策略的比较结果写进 `w` 中.
fn describe_comparison_into<W: Write>(
    left: Strategy,
    right: Strategy,
    cmp: &ComparisonResult,
    w: &mut W,
) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Two-sample t-test `{left}` vs `{right}`:")?;
    for (kind, c) in cmp.iter() {
        writeln!(w, "{S4}{kind} (n = {} each):", c.n)?;
        writeln!(w, "{S4}{S4}mean {left}: {:.6}", c.mean_left)?;
        writeln!(w, "{S4}{S4}mean {right}: {:.6}", c.mean_right)?;
        writeln!(w, "{S4}{S4}t = {:.6}, df = {}", c.ttest.statistic, c.ttest.df)?;
        writeln!(w, "{S4}{S4}p = {:.6e}", c.ttest.p_value)?;
    }
    Ok(())
}

/// 研究程序最终结果.
pub struct Outcome {
    subject: String,
    runs: Vec<StrategyRun>,
    comparison: ComparisonResult,
}

impl Outcome {
    pub fn new(subject: String, runs: Vec<StrategyRun>, comparison: ComparisonResult) -> Self {
        Self {
            subject,
            runs,
            comparison,
        }
    }

    /// 分析运行结果: 打印报表, 按需保存, 按需输出 JSON.
    pub fn analyze(&self, cli: &Cli) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        utils::sep_to(&mut out)?;
        for run in self.runs.iter() {
            writeln!(out, "[{}] reference {}", run.strategy, run.reference.display())?;
            describe_into(&run.result.report_rows(), &mut out)?;
            utils::sep_to(&mut out)?;
        }
        if let [a, b] = self.runs.as_slice() {
            describe_comparison_into(a.strategy, b.strategy, &self.comparison, &mut out)?;
            utils::sep_to(&mut out)?;
        }

        if cli.save {
            let dir = match &cli.out {
                Some(d) => d.clone(),
                None => utils::loader::result_dir_from_env_or_home()
                    .context("cannot locate home directory, use --out")?,
            };
            for run in self.runs.iter() {
                let path = self.save(&dir, run)?;
                log::info!("saved the table report to {}", path.display());
            }
        }

        if cli.json {
            let strategies: Vec<_> = self
                .runs
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "strategy": r.strategy,
                        "reference": r.reference,
                        "result": r.result,
                    })
                })
                .collect();
            let value = serde_json::json!({
                "subject": self.subject,
                "strategies": strategies,
                "comparison": self.comparison,
            });
            serde_json::to_writer_pretty(&mut out, &value)?;
            writeln!(out)?;
        }
        Ok(())
    }

    /// 保存一种策略的报表, 返回文件路径.
    fn save(&self, dir: &Path, run: &StrategyRun) -> Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("cannot create `{}`", dir.display()))?;
        let path = dir.join(report_file_name(&self.subject, &run.reference));
        let file = File::create(&path).with_context(|| format!("cannot create `{}`", path.display()))?;

        let mut w = BufWriter::new(file);
        describe_into(&run.result.report_rows(), &mut w)?;
        w.flush()?;
        Ok(path)
    }
}
