//! Mean-Reversion Model (AR(1) -> Ornstein-Uhlenbeck)
//!
//! Keeps a fixed-size sliding window of a scalar series and refits
//! `x_t = alpha + beta * x_{t-1} + eps` by ordinary least squares every
//! time an observation slides out of the window, so the first fit happens
//! on update `window_size + 1`. A stationary fit (0 < beta < 1) is mapped onto
//! continuous-time OU parameters with a unit time step:
//!
//! - theta = -ln(beta)                        (reversion speed)
//! - mu    = alpha / (1 - beta)               (equilibrium level)
//! - sigma = sqrt(s^2 * 2 * theta / (1 - beta^2))
//!
//! and deviations are scored against the stationary standard deviation
//! sqrt(sigma^2 / (2 * theta)).
//!
//! Each update is one time step regardless of wall-clock spacing between
//! observations.

use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::ports::SpreadModel;

/// Regressor dispersion below this fraction of mean^2 is treated as constant
const MIN_RELATIVE_VARIANCE: f64 = 1e-20;

/// Continuous-time parameters of the last accepted fit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OuParams {
    /// Equilibrium level
    pub mu: f64,
    /// Mean reversion speed per update
    pub theta: f64,
    /// Volatility of the process
    pub sigma: f64,
}

impl OuParams {
    /// Theoretical standard deviation of the stationary process
    pub fn stationary_std(&self) -> f64 {
        (self.sigma * self.sigma / (2.0 * self.theta)).sqrt()
    }

    /// Updates needed to halve a deviation from mu
    pub fn half_life(&self) -> f64 {
        std::f64::consts::LN_2 / self.theta
    }
}

/// Raw least-squares result in discrete time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ar1Fit {
    pub alpha: f64,
    pub beta: f64,
    /// Sum of squared residuals over degrees of freedom
    pub residual_variance: f64,
}

impl Ar1Fit {
    /// Regress each value on its predecessor
    ///
    /// Returns `None` when there are fewer than two pairs or the regressor
    /// has no dispersion.
    pub fn estimate(series: &[f64]) -> Option<Self> {
        if series.len() < 3 {
            return None;
        }
        let x = &series[..series.len() - 1];
        let y = &series[1..];
        let n = x.len();
        let m = n as f64;

        let x_mean = x.iter().sum::<f64>() / m;
        let y_mean = y.iter().sum::<f64>() / m;

        let (sxx, sxy) = x.iter().zip(y).fold((0.0, 0.0), |(sxx, sxy), (xi, yi)| {
            let dx = xi - x_mean;
            (sxx + dx * dx, sxy + dx * (yi - y_mean))
        });

        let floor = MIN_RELATIVE_VARIANCE * (x_mean * x_mean) * m;
        if !sxx.is_finite() || sxx <= floor || sxx <= 0.0 {
            return None;
        }

        let beta = sxy / sxx;
        let alpha = y_mean - beta * x_mean;

        let rss: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| {
                let eps = yi - (alpha + beta * xi);
                eps * eps
            })
            .sum();
        // Two pairs fit exactly; keep the variance defined (zero) there.
        let dof = n.saturating_sub(2).max(1) as f64;

        Some(Self {
            alpha,
            beta,
            residual_variance: rss / dof,
        })
    }

    /// Map onto OU parameters, rejecting non-stationary fits
    pub fn to_ou(&self) -> Option<OuParams> {
        let beta = self.beta;
        if !(beta > 0.0 && beta < 1.0) {
            return None;
        }
        let theta = -beta.ln();
        let mu = self.alpha / (1.0 - beta);
        let sigma = (self.residual_variance * 2.0 * theta / (1.0 - beta * beta)).sqrt();

        if !(theta.is_finite() && mu.is_finite() && sigma.is_finite()) {
            return None;
        }
        Some(OuParams { mu, theta, sigma })
    }
}

/// Sliding-window AR(1) model of the pair ratio
#[derive(Debug, Clone)]
pub struct MeanReversionModel {
    window: VecDeque<f64>,
    window_size: usize,
    /// Last accepted parameters; untouched by rejected fits
    params: OuParams,
    calibrated: bool,
    /// Successful calibrations since creation
    fits: u64,
}

impl MeanReversionModel {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(window_size + 1),
            window_size,
            params: OuParams::default(),
            calibrated: false,
            fits: 0,
        }
    }

    /// Append an observation, evict the oldest past `window_size`, and
    /// recalibrate whenever something was evicted
    pub fn update(&mut self, value: f64) {
        self.window.push_back(value);
        let mut evicted = false;
        while self.window.len() > self.window_size {
            self.window.pop_front();
            evicted = true;
        }

        if evicted {
            self.calibrate();
        }
    }

    fn calibrate(&mut self) {
        let fitted = Ar1Fit::estimate(self.window.make_contiguous())
            .and_then(|fit| fit.to_ou());

        match fitted {
            Some(params) => {
                self.params = params;
                self.calibrated = true;
                self.fits += 1;
            }
            None => {
                self.calibrated = false;
            }
        }
    }

    /// Deviation of `value` from mu in stationary standard deviations
    ///
    /// 0.0 when uncalibrated or when sigma is zero; that means "no signal",
    /// not "at equilibrium".
    pub fn zscore(&self, value: f64) -> f64 {
        if !self.calibrated || self.params.sigma == 0.0 {
            return 0.0;
        }
        let std = self.params.stationary_std();
        if !std.is_finite() || std == 0.0 {
            return 0.0;
        }
        (value - self.params.mu) / std
    }

    pub fn is_ready(&self) -> bool {
        self.calibrated
    }

    pub fn mu(&self) -> f64 {
        self.params.mu
    }

    pub fn theta(&self) -> f64 {
        self.params.theta
    }

    pub fn sigma(&self) -> f64 {
        self.params.sigma
    }

    pub fn params(&self) -> &OuParams {
        &self.params
    }

    pub fn window(&self) -> &VecDeque<f64> {
        &self.window
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn fit_count(&self) -> u64 {
        self.fits
    }
}

impl SpreadModel for MeanReversionModel {
    fn update(&mut self, value: f64) {
        MeanReversionModel::update(self, value)
    }

    fn zscore(&self, value: f64) -> f64 {
        MeanReversionModel::zscore(self, value)
    }

    fn is_ready(&self) -> bool {
        MeanReversionModel::is_ready(self)
    }

    fn mu(&self) -> f64 {
        MeanReversionModel::mu(self)
    }

    fn theta(&self) -> f64 {
        MeanReversionModel::theta(self)
    }
}
