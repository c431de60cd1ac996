use anyhow::Result;
use clap::{Parser, Subcommand};
use ndarray::{array, Array1, Array2};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

use pwarp_align::{LossBound, LossReport, SquaredError, WarpLossEvaluator, WarpLossInputs};
use pwarp_core::{DenseResampler, Parallelism, SparseEvaluator, WarpKnots};

mod synthetic;

use synthetic::{shift_candidate, SyntheticShape, SyntheticTrials};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Developer tasks for the pwarp workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference scenarios and print their outputs
    Scenarios,

    /// Time a shift search over synthetic trials
    Bench {
        /// Number of trials
        #[arg(long, default_value_t = 200)]
        trials: usize,

        /// Timepoints per trial
        #[arg(long, default_value_t = 500)]
        timepoints: usize,

        /// Features per timepoint
        #[arg(long, default_value_t = 8)]
        features: usize,

        /// Knots per warp
        #[arg(long, default_value_t = 4)]
        knots: usize,

        /// Candidate warps to score
        #[arg(long, default_value_t = 200)]
        candidates: usize,

        /// Score trials on the rayon pool
        #[arg(short, long)]
        parallel: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scenarios => run_scenarios()?,
        Commands::Bench {
            trials,
            timepoints,
            features,
            knots,
            candidates,
            parallel,
        } => {
            let shape = SyntheticShape {
                trials,
                timepoints,
                features,
                knots,
            };
            bench(shape, candidates, Parallelism::from_flag(parallel))?;
        }
    }

    Ok(())
}

fn run_scenarios() -> Result<()> {
    info!("Running reference scenarios");

    let tent = WarpKnots::single(&[0.0, 0.5, 1.0], &[0.0, 1.0, 0.0])?;
    let xtst = array![0.0, 0.25, 0.5, 0.75, 1.0];
    let trials = Array1::<usize>::zeros(xtst.len());
    let ytst = SparseEvaluator::new().evaluate(tent.view(), trials.view(), xtst.view())?;
    println!("sparse tent warp");
    println!("  xtst = {}", xtst);
    println!("  ytst = {}", ytst);
    println!();

    let identity = WarpKnots::single(&[0.0, 1.0], &[0.0, 1.0])?;
    let data = array![[10.0, 20.0, 30.0, 40.0]];
    let out = DenseResampler::new().resample(identity.view(), data.view())?;
    println!("dense identity resampling");
    println!("  data = {}", data);
    println!("  out  = {}", out);
    println!();

    let shifted = WarpKnots::single(&[0.0, 1.0], &[0.25, 1.25])?;
    let out = DenseResampler::new().resample(shifted.view(), data.view())?;
    println!("dense shift past the end (missing samples are NaN)");
    println!("  out  = {}", out);

    Ok(())
}

fn bench(shape: SyntheticShape, candidates: usize, parallelism: Parallelism) -> Result<()> {
    anyhow::ensure!(candidates > 0, "Need at least one candidate warp");
    anyhow::ensure!(
        shape.timepoints >= 2,
        "Need at least 2 timepoints, got {}",
        shape.timepoints
    );
    info!(
        "Generating {} trials x {} timepoints x {} features",
        shape.trials, shape.timepoints, shape.features
    );
    let synthetic = SyntheticTrials::generate(shape);
    let inputs = WarpLossInputs::new(synthetic.xtst.view(), synthetic.template.view(), synthetic.data.view())?;
    let candidate_set = (0..candidates)
        .into_par_iter()
        .map(|c| shift_candidate(c, shape))
        .collect::<Result<Vec<_>>>()?;

    let evaluator = WarpLossEvaluator::new().with_parallelism(parallelism);
    let mut bound = LossBound::new(shape.trials);
    let mut best_knots = WarpKnots::identity(shape.trials, shape.knots)?;
    let mut best_shift = Array1::<f64>::zeros(shape.trials);
    let mut warps = Array2::zeros((shape.trials, shape.timepoints));
    let mut new_loss = Array1::zeros(shape.trials);
    let mut scratch = Array2::zeros((shape.trials, shape.features));
    let mut report = LossReport::new(shape.trials, shape.timepoints);
    let mut processed = 0.0;

    let start = Instant::now();
    for (shift, candidate) in &candidate_set {
        evaluator.evaluate_into(
            &inputs,
            candidate.view(),
            bound.view(),
            &SquaredError,
            warps.view_mut(),
            new_loss.view_mut(),
            scratch.view_mut(),
            &mut report,
        )?;
        processed += report.processed_fraction();

        for trial in bound.accept(&report)? {
            let (mut x, mut y) = best_knots.rows_mut(trial);
            x.assign(&candidate.x().row(trial));
            y.assign(&candidate.y().row(trial));
            best_shift[trial] = *shift;
        }
    }
    let elapsed = start.elapsed();

    info!(
        "Scored {} candidates in {:.3}s ({:.1} us per candidate)",
        candidates,
        elapsed.as_secs_f64(),
        elapsed.as_secs_f64() * 1e6 / candidates as f64
    );
    info!(
        "Mean fraction of timepoints evaluated: {:.3} | bound updates: {}",
        processed / candidates as f64,
        bound.updates()
    );
    let best_loss = bound.into_inner();
    info!(
        "Best loss: mean {:.6}, worst {:.6}",
        best_loss.mean().unwrap_or(f64::NAN),
        best_loss.fold(f64::NEG_INFINITY, |a, &b| a.max(b))
    );

    let shift_error = (&best_shift - &synthetic.shifts).mapv(f64::abs).mean().unwrap_or(f64::NAN);
    info!("Mean absolute shift error: {:.4}", shift_error);

    let start = Instant::now();
    let aligned = DenseResampler::new()
        .with_parallelism(parallelism)
        .resample(best_knots.view(), synthetic.first_feature().view())?;
    let missing = aligned.iter().filter(|v| v.is_nan()).count();
    info!(
        "Resampled {} trials in {:.3}s, {:.2}% samples missing",
        shape.trials,
        start.elapsed().as_secs_f64(),
        100.0 * missing as f64 / aligned.len() as f64
    );
    if missing == aligned.len() {
        warn!("Every aligned sample is missing; the fitted warps leave [0, 1] entirely");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(timepoints: usize) -> SyntheticShape {
        SyntheticShape {
            trials: 3,
            timepoints,
            features: 1,
            knots: 2,
        }
    }

    #[test]
    fn test_bench_rejects_short_grid() {
        for timepoints in [0, 1] {
            let err = bench(shape(timepoints), 4, Parallelism::Serial).unwrap_err();
            assert!(err.to_string().contains("timepoints"), "{err}");
        }
    }

    #[test]
    fn test_bench_small_run() {
        assert!(bench(shape(16), 4, Parallelism::Rayon).is_ok());
    }
}
