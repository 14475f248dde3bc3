//! Multi-restart search per k and elbow selection across a k range.

use std::collections::HashSet;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::config::ClusterConfig;
use super::context::{CancelToken, ClusteringContext};
use super::lloyd::{self, LloydParams, LloydRun};
use super::result::ClusteringResult;
use crate::metric::DistanceMetric;
use crate::types::{ClusterError, ClusterResult, FeatureVector};

/// Best run for every candidate k plus the elbow choice.
#[derive(Debug, Clone)]
pub struct KSweep {
    /// Best-of-restarts run per candidate, in increasing k.
    pub candidates: Vec<LloydRun>,
    /// Index into `candidates` picked by the elbow heuristic.
    pub chosen: usize,
}

impl KSweep {
    /// The selected cluster count.
    pub fn chosen_k(&self) -> usize {
        self.candidates[self.chosen].k
    }

    /// The selected run.
    pub fn chosen_run(&self) -> &LloydRun {
        &self.candidates[self.chosen]
    }

    /// `(k, distortion)` for every candidate.
    pub fn distortions(&self) -> Vec<(usize, f64)> {
        self.candidates.iter().map(|r| (r.k, r.distortion)).collect()
    }
}

/// Pick the candidate right after the steepest distortion drop.
///
/// `diff[i] = d[i] - d[i + 1]`; returns `argmax(diff) + 1`, first maximum on ties.
/// A heuristic: it assumes distortion decreases with k. `None` with fewer than two values.
pub fn elbow(distortions: &[f64]) -> Option<usize> {
    if distortions.len() < 2 {
        return None;
    }
    let mut best = 0;
    let mut best_drop = f64::NEG_INFINITY;
    for (i, pair) in distortions.windows(2).enumerate() {
        let drop = pair[0] - pair[1];
        if drop > best_drop {
            best_drop = drop;
            best = i;
        }
    }
    Some(best + 1)
}

/// Drives Lloyd runs: best-of-restarts per k, and elbow selection of k.
pub struct KSearch<'a> {
    points: &'a [FeatureVector],
    config: ClusterConfig,
    base_seed: u64,
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl<'a> KSearch<'a> {
    /// Validate the input and prepare a search.
    pub fn new(points: &'a [FeatureVector], config: ClusterConfig) -> ClusterResult<Self> {
        if points.is_empty() {
            return Err(ClusterError::EmptyInput);
        }
        for point in points {
            if let Some((name, _)) = point.features().iter().find(|(_, v)| !v.is_finite()) {
                return Err(ClusterError::NonFiniteFeature {
                    identity: point.identity().unwrap_or_default().to_string(),
                    feature: name.clone(),
                });
            }
        }
        let mut seen = HashSet::with_capacity(points.len());
        for identity in points.iter().filter_map(FeatureVector::identity) {
            if !seen.insert(identity) {
                return Err(ClusterError::DuplicateIdentity(identity.to_string()));
            }
        }
        let base_seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let deadline = config.deadline().and_then(|d| Instant::now().checked_add(d));
        Ok(Self {
            points,
            config,
            base_seed,
            deadline,
            cancel: CancelToken::new(),
        })
    }

    /// Use an externally owned cancel token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels this search.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The configuration in use.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Seed all restarts derive from.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Best of `1 + restarts` Lloyd runs for `k`, by minimal distortion.
    ///
    /// Accepts `1 <= k <= points.len()`. Ties keep the earliest restart.
    pub fn best_of(&self, k: usize) -> ClusterResult<LloydRun> {
        let n = self.points.len();
        if k == 0 || k > n {
            return Err(ClusterError::InvalidK { k, min: 1, max: n });
        }
        let runs = 0..=self.config.restarts;
        let runs: Vec<LloydRun> = if self.config.parallel {
            runs.into_par_iter()
                .map(|restart| self.restart(k, restart))
                .collect::<ClusterResult<_>>()?
        } else {
            runs.map(|restart| self.restart(k, restart))
                .collect::<ClusterResult<_>>()?
        };

        let mut best: Option<LloydRun> = None;
        for run in runs {
            match &best {
                Some(current) if run.distortion >= current.distortion => {}
                _ => best = Some(run),
            }
        }
        let best = best.ok_or(ClusterError::EmptyInput)?;
        log::info!(
            "k = {}: best distortion {:.6} over {} runs",
            k,
            best.distortion,
            self.config.restarts + 1
        );
        Ok(best)
    }

    fn restart(&self, k: usize, restart: usize) -> ClusterResult<LloydRun> {
        self.cancel.check()?;
        let mut ctx = ClusteringContext::new(self.config.metric)
            .with_mean_denominator(self.config.mean_denominator)
            .with_deadline(self.deadline);
        let params = LloydParams {
            k,
            iterations: self.config.iterations,
            early_stop: self.config.early_stop,
        };
        let mut rng = StdRng::seed_from_u64(restart_seed(self.base_seed, k, restart));
        let run = lloyd::run(&mut ctx, self.points, &params, &mut rng)?;
        log::debug!(
            "k = {} restart {}: distortion {:.6} after {} iterations ({} cache hits)",
            k,
            restart,
            run.distortion,
            run.iterations_run,
            ctx.cache().hits()
        );
        Ok(run)
    }

    /// Best run for every candidate k and the elbow choice among them.
    pub fn sweep(&self) -> ClusterResult<KSweep> {
        let ks = self.config.k_candidates(self.points.len());
        if ks.len() < 2 {
            return Err(ClusterError::KRangeTooSmall {
                candidates: ks.len(),
            });
        }
        let mut candidates = Vec::with_capacity(ks.len());
        for k in ks {
            self.cancel.check()?;
            candidates.push(self.best_of(k)?);
        }
        let distortions: Vec<f64> = candidates.iter().map(|r| r.distortion).collect();
        let chosen = elbow(&distortions).ok_or(ClusterError::KRangeTooSmall {
            candidates: distortions.len(),
        })?;
        log::info!(
            "Based on change in distortion, chosen k = {}",
            candidates[chosen].k
        );
        Ok(KSweep { candidates, chosen })
    }

    /// Cluster with the configured fixed k (`2 <= k <= n`), or select k by elbow.
    pub fn run(&self) -> ClusterResult<ClusteringResult> {
        log::info!(
            "Clustering {} points using {} distance",
            self.points.len(),
            self.config.metric
        );
        let run = match self.config.k {
            Some(k) => {
                let n = self.points.len();
                if k < 2 || k > n {
                    return Err(ClusterError::InvalidK { k, min: 2, max: n });
                }
                self.best_of(k)?
            }
            None => {
                let sweep = self.sweep()?;
                sweep.candidates.into_iter().nth(sweep.chosen).ok_or(
                    ClusterError::KRangeTooSmall { candidates: 0 },
                )?
            }
        };
        Ok(ClusteringResult::from_run(
            &run,
            self.points,
            self.config.metric,
        ))
    }
}

/// Seed for one restart; stable across sequential and parallel execution.
fn restart_seed(base: u64, k: usize, restart: usize) -> u64 {
    base.wrapping_add((k as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(restart as u64)
}

/// Cluster `points` under `metric` with default settings.
///
/// With `k = None` the cluster count is chosen from 2..=5 by the elbow heuristic.
pub fn cluster(
    points: &[FeatureVector],
    metric: DistanceMetric,
    k: Option<usize>,
) -> ClusterResult<ClusteringResult> {
    let config = ClusterConfig::default().with_metric(metric).with_k(k);
    KSearch::new(points, config)?.run()
}
