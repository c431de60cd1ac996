//! Warp scoring with early abandonment.
//!
//! This is the hot path of a warp search: every candidate knot set is scored
//! against the template, and a trial's accumulation stops as soon as its
//! running loss reaches the best loss known for that trial.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayView3, ArrayViewMut1, ArrayViewMut2, Axis, Zip};

use pwarp_core::interpolation::sample_rows_into;
use pwarp_core::validation::{
    validate_ascending, validate_grid_len, validate_knots, validate_shape, ValidationConfig,
};
use pwarp_core::{KnotsView, Parallelism, Result, TrialKnots, WarpError};

use crate::loss::PointwiseLoss;

/// The inputs that stay fixed over a whole search: query times, template
/// and data. Their shapes are checked once, at construction.
#[derive(Debug, Clone, Copy)]
pub struct WarpLossInputs<'a> {
    xtst: ArrayView1<'a, f64>,
    template: ArrayView2<'a, f64>,
    data: ArrayView3<'a, f64>,
}

impl<'a> WarpLossInputs<'a> {
    /// # Arguments
    /// * `xtst` - Ascending query times `[T]`
    /// * `template` - Template on the uniform output grid `[T, features]`
    /// * `data` - Observations `[trials, T, features]`
    pub fn new(
        xtst: ArrayView1<'a, f64>,
        template: ArrayView2<'a, f64>,
        data: ArrayView3<'a, f64>,
    ) -> Result<Self> {
        Self::with_validation(xtst, template, data, &ValidationConfig::default())
    }

    /// Like [`new`](Self::new) with explicit validation settings.
    pub fn with_validation(
        xtst: ArrayView1<'a, f64>,
        template: ArrayView2<'a, f64>,
        data: ArrayView3<'a, f64>,
        config: &ValidationConfig,
    ) -> Result<Self> {
        let (_, n_time, n_features) = data.dim();
        // The sweep indexes data and template by query index.
        validate_shape("template", &[xtst.len(), n_features], template.shape(), &ValidationConfig::default())?;
        validate_shape("data timepoints", &[xtst.len()], &[n_time], &ValidationConfig::default())?;
        validate_grid_len("query times", xtst.len())?;
        if n_features == 0 {
            return Err(WarpError::invalid_configuration("data must have at least one feature"));
        }
        validate_ascending(xtst, config)?;
        Ok(Self { xtst, template, data })
    }

    pub fn n_trials(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn n_timepoints(&self) -> usize {
        self.xtst.len()
    }

    pub fn n_features(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Normalizing divisor that makes losses comparable across data of
    /// different dimensionality.
    pub fn denominator(&self) -> f64 {
        (self.n_timepoints() * self.n_features()) as f64
    }
}

/// Result of scoring one trial.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrialOutcome {
    /// Timepoints written to the warp row. Entries past this are stale.
    pub processed: usize,
    /// Value written to `new_loss`. A lower bound on the full loss when the
    /// trial stopped early.
    pub loss: f64,
    /// `loss` beat the trial's bound. Implies all timepoints were processed.
    pub improved: bool,
}

/// Per-trial outcomes of one [`WarpLossEvaluator::evaluate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct LossReport {
    outcomes: Vec<TrialOutcome>,
    n_timepoints: usize,
}

impl LossReport {
    /// Report buffer for [`WarpLossEvaluator::evaluate_into`], reused across
    /// candidates.
    pub fn new(n_trials: usize, n_timepoints: usize) -> Self {
        Self {
            outcomes: vec![TrialOutcome::default(); n_trials],
            n_timepoints,
        }
    }

    pub fn outcomes(&self) -> &[TrialOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, trial: usize) -> TrialOutcome {
        self.outcomes[trial]
    }

    pub fn n_trials(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether trial `trial` was scored over every timepoint.
    pub fn completed(&self, trial: usize) -> bool {
        self.outcomes[trial].processed == self.n_timepoints
    }

    /// Number of trials whose candidate warp improved on the bound.
    pub fn n_improved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.improved).count()
    }

    /// Fraction of all trial timepoints actually evaluated.
    pub fn processed_fraction(&self) -> f64 {
        let total = self.outcomes.len() * self.n_timepoints;
        if total == 0 {
            return 0.0;
        }
        let processed: usize = self.outcomes.iter().map(|o| o.processed).sum();
        processed as f64 / total as f64
    }
}

/// Scores candidate warps against a template.
///
/// For trial `i` the warp is swept over `xtst` with a segment cursor. Each
/// warped value `z` is clamped to `[0, 1]` and written to `warps[i, m]`; the
/// prediction is the template interpolated at `z * (T - 1)`, or its first or
/// last sample when `z` was clamped. The pointwise loss against
/// `data[i, m]`, divided by `features * T`, is added to `new_loss[i]`, and
/// the sweep stops once `new_loss[i] >= last_loss[i]`.
#[derive(Debug, Clone, Default)]
pub struct WarpLossEvaluator {
    validation: ValidationConfig,
    parallelism: Parallelism,
}

impl WarpLossEvaluator {
    /// Create a new evaluator with default validation, running serially.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Score `knots` against `inputs`.
    ///
    /// # Arguments
    /// * `inputs` - Query times, template and data
    /// * `knots` - Candidate knots `[trials, knots]`
    /// * `last_loss` - Best loss so far per trial `[trials]`; `+inf` scores fully
    /// * `loss` - Pointwise loss
    /// * `warps` - Output warp values `[trials, T]`, filled up to each stop index
    /// * `new_loss` - Output accumulated loss `[trials]`
    pub fn evaluate<L: PointwiseLoss>(
        &self,
        inputs: &WarpLossInputs<'_>,
        knots: KnotsView<'_>,
        last_loss: ArrayView1<'_, f64>,
        loss: &L,
        warps: ArrayViewMut2<'_, f64>,
        new_loss: ArrayViewMut1<'_, f64>,
    ) -> Result<LossReport> {
        let mut report = LossReport::new(inputs.n_trials(), inputs.n_timepoints());
        let mut scratch = Array2::zeros((inputs.n_trials(), inputs.n_features()));
        self.evaluate_into(
            inputs,
            knots,
            last_loss,
            loss,
            warps,
            new_loss,
            scratch.view_mut(),
            &mut report,
        )?;
        Ok(report)
    }

    /// Like [`evaluate`](Self::evaluate), writing into caller-owned buffers
    /// so a search loop allocates nothing per candidate.
    ///
    /// `scratch` (`[trials, features]`) holds each trial's interpolated
    /// template row; `report` must have been created for the same number of
    /// trials and timepoints as `inputs`.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate_into<L: PointwiseLoss>(
        &self,
        inputs: &WarpLossInputs<'_>,
        knots: KnotsView<'_>,
        last_loss: ArrayView1<'_, f64>,
        loss: &L,
        mut warps: ArrayViewMut2<'_, f64>,
        new_loss: ArrayViewMut1<'_, f64>,
        mut scratch: ArrayViewMut2<'_, f64>,
        report: &mut LossReport,
    ) -> Result<()> {
        let n_trials = inputs.n_trials();
        let n_timepoints = inputs.n_timepoints();
        // Indexing below relies on these regardless of configuration.
        let always = ValidationConfig::default();
        validate_shape("knot trials", &[n_trials], &[knots.n_trials()], &always)?;
        validate_shape("loss bound", &[n_trials], last_loss.shape(), &always)?;
        validate_shape("warp output", &[n_trials, n_timepoints], warps.shape(), &always)?;
        validate_shape("loss output", &[n_trials], new_loss.shape(), &always)?;
        validate_shape("prediction scratch", &[n_trials, inputs.n_features()], scratch.shape(), &always)?;
        validate_shape(
            "loss report",
            &[n_trials, n_timepoints],
            &[report.n_trials(), report.n_timepoints],
            &always,
        )?;
        if let Some(trial) = last_loss.iter().position(|b| b.is_nan()) {
            return Err(WarpError::NanLossBound { trial });
        }
        validate_knots(knots, &self.validation)?;

        tracing::debug!(
            trials = n_trials,
            timepoints = n_timepoints,
            features = inputs.n_features(),
            loss = loss.name(),
            "scoring candidate warps"
        );

        let outcomes = ArrayViewMut1::from(&mut report.outcomes[..]);
        let zip = Zip::indexed(warps.rows_mut())
            .and(new_loss)
            .and(scratch.rows_mut())
            .and(outcomes);
        let score = |i, warp_row, slot: &mut f64, prediction, outcome: &mut TrialOutcome| {
            *outcome = score_trial(inputs, knots.trial(i), last_loss[i], i, loss, warp_row, prediction);
            *slot = outcome.loss;
        };
        match self.parallelism {
            Parallelism::Serial => zip.for_each(score),
            Parallelism::Rayon => zip.par_for_each(score),
        }
        Ok(())
    }
}

/// Sweep one trial until its loss reaches `bound` or the queries run out.
#[inline]
fn score_trial<L: PointwiseLoss>(
    inputs: &WarpLossInputs<'_>,
    warp: TrialKnots<'_>,
    bound: f64,
    trial: usize,
    loss: &L,
    mut warp_row: ArrayViewMut1<'_, f64>,
    mut prediction: ArrayViewMut1<'_, f64>,
) -> TrialOutcome {
    let xtst = inputs.xtst;
    let template = inputs.template;
    let observations = inputs.data.index_axis(Axis(0), trial);
    let last = template.nrows() - 1;
    let denom = inputs.denominator();

    let mut cursor = warp.cursor();
    let mut acc = 0.0;
    let mut m = 0;

    while m < xtst.len() && acc < bound {
        let z = cursor.eval(xtst[m]);
        let observed = observations.row(m);

        let value = if z < 0.0 {
            warp_row[m] = 0.0;
            loss.loss(template.row(0), observed)
        } else if z > 1.0 {
            warp_row[m] = 1.0;
            loss.loss(template.row(last), observed)
        } else {
            warp_row[m] = z;
            sample_rows_into(template, z, prediction.view_mut());
            loss.loss(prediction.view(), observed)
        };

        acc += value / denom;
        m += 1;
    }

    TrialOutcome {
        processed: m,
        loss: acc,
        improved: acc < bound,
    }
}
