use super::{BatchConfig, BatchError, BatchResult, CountMismatchError, Run, RunAggregate, VolumeSource};
use crate::data::{extract, ScanSlice};
use crate::metric::{self, Metric, MetricKind};
use itertools::Itertools;
use std::path::Path;

/// 将 `reference` 与 `runs` 中每个扫描的中间层切片逐一比较, 按 run 汇总.
///
/// 1. run 按名称字典序处理, run 内扫描按文件名字典序处理.
/// 2. 在加载任何扫描之前, 先检查每个 run 的扫描数都等于
///    `config.scans_per_run()`, 否则返回 [`BatchError::CountMismatch`].
/// 3. 任一扫描加载失败、形状与参考切片不一致, 整个批次作废, 不返回部分结果.
pub fn aggregate<S, I>(
    reference: &ScanSlice,
    runs: I,
    config: &BatchConfig,
    source: &S,
) -> Result<BatchResult, BatchError>
where
    S: VolumeSource + ?Sized,
    I: IntoIterator<Item = Run>,
{
    let runs = prepare(runs, config)?;
    let mut result = BatchResult::new(reference.id().clone(), config.scans_per_run());

    for run in runs.iter() {
        log::info!("{}: {} scans", run.id(), run.len());
        let measured = run
            .scans()
            .iter()
            .enumerate()
            .map(|(j, scan)| measure_scan(reference, run.id(), j, scan, config, source))
            .collect::<Result<Vec<_>, _>>()?;
        accumulate(&mut result, run.id(), measured);
    }
    Ok(result)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

        /// 借助 `rayon`, 并行地计算 run 内各扫描的度量.
        ///
        /// 结果按原扫描顺序合并后再求和, 因此与 [`aggregate`] 逐位一致.
        /// 多个扫描同时出错时, 返回哪一个错误是不确定的.
        pub fn aggregate_par<S, I>(
            reference: &ScanSlice,
            runs: I,
            config: &BatchConfig,
            source: &S,
        ) -> Result<BatchResult, BatchError>
        where
            S: VolumeSource + Sync + ?Sized,
            I: IntoIterator<Item = Run>,
        {
            let runs = prepare(runs, config)?;
            let mut result = BatchResult::new(reference.id().clone(), config.scans_per_run());

            for run in runs.iter() {
                log::info!("{}: {} scans (parallel)", run.id(), run.len());
                let measured = run
                    .scans()
                    .par_iter()
                    .enumerate()
                    .map(|(j, scan)| measure_scan(reference, run.id(), j, scan, config, source))
                    .collect::<Result<Vec<_>, _>>()?;
                accumulate(&mut result, run.id(), measured);
            }
            Ok(result)
        }
    }
}

/// 排序并检查 run: 非空, 名称唯一, 扫描数符合配置.
fn prepare<I>(runs: I, config: &BatchConfig) -> Result<Vec<Run>, BatchError>
where
    I: IntoIterator<Item = Run>,
{
    let mut runs: Vec<Run> = runs.into_iter().collect();
    if runs.is_empty() {
        return Err(BatchError::NoRuns);
    }
    runs.sort_by(|a, b| a.id().cmp(b.id()));

    if let Some(dup) = runs.iter().map(Run::id).duplicates().next() {
        return Err(BatchError::DuplicateRun(dup.to_owned()));
    }

    for run in runs.iter_mut() {
        if run.len() != config.scans_per_run() {
            return Err(CountMismatchError {
                run: run.id().to_owned(),
                expected: config.scans_per_run(),
                actual: run.len(),
            }
            .into());
        }
        run.sort_scans();
    }
    Ok(runs)
}

/// 加载单个扫描, 取中间层切片, 与参考切片比较.
fn measure_scan<S>(
    reference: &ScanSlice,
    run: &str,
    j: usize,
    scan: &Path,
    config: &BatchConfig,
    source: &S,
) -> Result<[Metric; 2], BatchError>
where
    S: VolumeSource + ?Sized,
{
    log::debug!("starting {run} | scan {}", j + 1);
    let measure_err = |source| BatchError::Measure {
        run: run.to_owned(),
        scan: scan.to_owned(),
        source,
    };

    let volume = source.load(scan)?;
    let slice = extract(&volume).map_err(|e| measure_err(e.into()))?;
    metric::measure(reference, &slice, config.bins()).map_err(measure_err)
}

/// 按扫描顺序把一个 run 的度量写入结果.
fn accumulate(result: &mut BatchResult, run: &str, measured: Vec<[Metric; 2]>) {
    let [mut cc, mut mi] = MetricKind::ALL.map(|k| RunAggregate::new(run, k));
    for [c, m] in measured {
        cc.push(c);
        mi.push(m);
    }
    log::debug!("{run}: mean cc {:.6}, mean mi {:.6}", cc.mean(), mi.mean());
    result.insert(cc);
    result.insert(mi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FuncVolume, LoadError, ShapeError, SliceId};
    use crate::metric::MetricError;
    use ndarray::{Array2, Array3};
    use std::path::PathBuf;

    /// 扫描文件名 `funcR_000SS.nii` 编码了 run 号与扫描号,
    /// 由此生成确定的体数据, 无需磁盘.
    fn synthetic(scan: &Path) -> Result<FuncVolume, LoadError> {
        let name = scan.file_stem().unwrap().to_str().unwrap();
        let (run, idx) = name.trim_start_matches("func").split_once('_').unwrap();
        let (run, idx): (f32, f32) = (run.parse().unwrap(), idx.parse().unwrap());
        let data = Array3::from_shape_fn((6, 5, 4), |(x, y, z)| {
            (x as f32 + 1.0) * (y as f32 + 1.0) + z as f32 + 0.3 * run * ((x + idx as usize) % 3) as f32
        });
        Ok(FuncVolume::from_array(data, scan))
    }

    fn reference() -> ScanSlice {
        let v = synthetic(Path::new("func1_00001.nii")).unwrap();
        extract(&v).unwrap()
    }

    fn make_runs(n_runs: usize, n_scans: usize) -> Vec<Run> {
        // 倒序构造, 检验排序.
        (1..=n_runs)
            .rev()
            .map(|r| {
                Run::new(
                    format!("func{r}"),
                    (1..=n_scans).rev().map(|s| PathBuf::from(format!("func{r}/func{r}_{s:05}.nii"))),
                )
            })
            .collect()
    }

    #[test]
    fn test_pooled_len_and_order() {
        let cfg = BatchConfig::new(20, 4).unwrap();
        let res = aggregate(&reference(), make_runs(3, 4), &cfg, &synthetic).unwrap();

        assert_eq!(res.run_count(), 3);
        assert_eq!(res.pooled(MetricKind::Correlation).len(), 12);
        assert_eq!(res.pooled(MetricKind::MutualInformation).len(), 12);

        let targets: Vec<_> = res
            .runs(MetricKind::Correlation)
            .flat_map(|r| r.metrics().iter().map(|m| m.target().origin().to_owned()))
            .collect();
        assert_eq!(targets[0], PathBuf::from("func1/func1_00001.nii"));
        assert_eq!(targets[3], PathBuf::from("func1/func1_00004.nii"));
        assert_eq!(targets[4], PathBuf::from("func2/func2_00001.nii"));
        assert_eq!(targets[11], PathBuf::from("func3/func3_00004.nii"));

        // 参考切片与 func1 第一个扫描相同.
        let first = &res.run(MetricKind::Correlation, "func1").unwrap().metrics()[0];
        assert_eq!(first.value(), 1.0);
        assert_eq!(first.reference(), &SliceId::new("func1_00001.nii", 2));
    }

    #[test]
    fn test_grand_mean_matches_pooled() {
        let cfg = BatchConfig::new(20, 3).unwrap();
        let res = aggregate(&reference(), make_runs(2, 3), &cfg, &synthetic).unwrap();
        for kind in MetricKind::ALL {
            let pooled = res.pooled(kind);
            let mean = pooled.iter().sum::<f64>() / 6.0;
            assert!((res.grand_mean(kind) - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn test_count_mismatch() {
        let cfg = BatchConfig::new(20, 187).unwrap();
        let mut runs = make_runs(2, 187);
        runs[0] = make_runs(2, 186).remove(0);
        let err = aggregate(&reference(), runs, &cfg, &synthetic).unwrap_err();
        match err {
            BatchError::CountMismatch(e) => {
                assert_eq!(e.run, "func2");
                assert_eq!((e.expected, e.actual), (187, 186));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_count_checked_before_loading() {
        let cfg = BatchConfig::new(20, 2).unwrap();
        let runs = vec![
            Run::new("func1", ["missing/func1_00001.nii", "missing/func1_00002.nii"]),
            Run::new("func2", ["missing/func2_00001.nii"]),
        ];
        let err = aggregate(&reference(), runs, &cfg, &crate::batch::NiftiSource).unwrap_err();
        assert!(matches!(err, BatchError::CountMismatch(_)));
    }

    #[test]
    fn test_load_failure_aborts() {
        let cfg = BatchConfig::new(20, 2).unwrap();
        let runs = vec![Run::new("func1", ["nowhere/func1_00001.nii", "nowhere/func1_00002.nii"])];
        let err = aggregate(&reference(), runs, &cfg, &crate::batch::NiftiSource).unwrap_err();
        assert!(matches!(err, BatchError::Load(LoadError::Nifti { .. })));
    }

    #[test]
    fn test_shape_mismatch_aborts() {
        let cfg = BatchConfig::new(20, 1).unwrap();
        let odd = |p: &Path| -> Result<FuncVolume, LoadError> {
            Ok(FuncVolume::from_array(Array3::zeros((5, 6, 4)), p))
        };
        let err = aggregate(&reference(), vec![Run::new("func1", ["func1_00001.nii"])], &cfg, &odd)
            .unwrap_err();
        match err {
            BatchError::Measure { run, source, .. } => {
                assert_eq!(run, "func1");
                assert_eq!(
                    source,
                    MetricError::Shape(ShapeError::Mismatch {
                        left: (6, 5),
                        right: (5, 6)
                    })
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_duplicate_runs() {
        let cfg = BatchConfig::new(20, 1).unwrap();
        assert!(matches!(
            aggregate(&reference(), Vec::new(), &cfg, &synthetic),
            Err(BatchError::NoRuns)
        ));

        let runs = vec![
            Run::new("func1", ["func1_00001.nii"]),
            Run::new("func1", ["func1_00002.nii"]),
        ];
        assert!(matches!(
            aggregate(&reference(), runs, &cfg, &synthetic),
            Err(BatchError::DuplicateRun(id)) if id == "func1"
        ));
    }

    #[test]
    fn test_zero_reference_gives_nan_cc() {
        let cfg = BatchConfig::new(20, 2).unwrap();
        let zero = ScanSlice::new(SliceId::new("zero", 0), Array2::zeros((6, 5)));
        let res = aggregate(&zero, make_runs(1, 2), &cfg, &synthetic).unwrap();
        assert!(res.grand_mean(MetricKind::Correlation).is_nan());
        assert!(res.grand_mean(MetricKind::MutualInformation).abs() < 1e-12);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_is_bitwise_identical() {
        let cfg = BatchConfig::new(20, 9).unwrap();
        let seq = aggregate(&reference(), make_runs(4, 9), &cfg, &synthetic).unwrap();
        let par = aggregate_par(&reference(), make_runs(4, 9), &cfg, &synthetic).unwrap();
        assert_eq!(seq, par);
        for kind in MetricKind::ALL {
            let (a, b) = (seq.grand_mean(kind), par.grand_mean(kind));
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
