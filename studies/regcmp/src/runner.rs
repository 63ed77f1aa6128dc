//! 程序运行函数.

use crate::cli::Cli;
use crate::result::{Outcome, StrategyRun};
use anyhow::{anyhow, ensure, Context, Result};
use fmri_sim::prelude::*;
use utils::loader;

/// 实际运行: 对两种配准策略分别做批量汇总, 再比较二者.
pub fn run(cli: &Cli) -> Result<Outcome> {
    let func_dir = match &cli.func_dir {
        Some(d) => d.clone(),
        None => loader::func_dir_from_env_or_home(&cli.subject)
            .ok_or_else(|| anyhow!("cannot locate home directory, use --func-dir"))?,
    };
    ensure!(func_dir.is_dir(), "`{}` is not a directory", func_dir.display());

    let config = BatchConfig::new(cli.bins, cli.scans)
        .ok_or_else(|| anyhow!("--bins and --scans must both be positive"))?;
    let layout = loader::subject_layout(&func_dir);

    log::info!(
        "subject {}: {} (bins = {}, scans per run = {}, {} cpus)",
        cli.subject,
        func_dir.display(),
        config.bins(),
        config.scans_per_run(),
        utils::cpus()
    );

    let runs = Strategy::ALL
        .into_iter()
        .map(|s| run_strategy(&layout, s, &config, cli.sequential))
        .collect::<Result<Vec<_>>>()?;

    let comparison = compare(&runs[0].result, &runs[1].result)?;
    Ok(Outcome::new(cli.subject.clone(), runs, comparison))
}

/// 以 `strategy` 选择参考扫描, 汇总所有 run.
fn run_strategy(
    layout: &SubjectLayout,
    strategy: Strategy,
    config: &BatchConfig,
    sequential: bool,
) -> Result<StrategyRun> {
    let reference = layout.reference_path(strategy)?;
    log::info!("[{strategy}] reference {}", reference.display());

    let volume = FuncVolume::open(&reference)?;
    let slice = extract(&volume)
        .with_context(|| format!("cannot slice reference `{}`", reference.display()))?;
    let runs = layout.runs()?;

    let result = if sequential {
        aggregate(&slice, runs, config, &NiftiSource)?
    } else {
        aggregate_par(&slice, runs, config, &NiftiSource)?
    };
    Ok(StrategyRun {
        strategy,
        reference,
        result,
    })
}
