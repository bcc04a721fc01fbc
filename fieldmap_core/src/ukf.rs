//! Unscented Kalman Filter with a constant-velocity motion model.
//!
//! State x = [px, py, vx, vy]ᵀ, measurement z = [px, py]ᵀ. Sigma points use
//! the Merwe scaled construction; both predict and update propagate the full
//! sigma set, so swapping in a non-linear motion model later only means
//! changing `fx`.
//!
//! One filter instance is shared across every identity of a class: the cache
//! loads the per-object state before each predict/update and stores it back
//! after, avoiding per-object filter setup cost.

use crate::types::{MeasCov, MeasVec, StateCov, StateVec};
use nalgebra::Matrix4;
use tracing::warn;

/// State dimension.
const N: usize = 4;
/// Number of sigma points (2N + 1).
const N_SIGMA: usize = 2 * N + 1;

/// Filter tuning. The noise scales are fixed diagonals — not adaptively tuned.
#[derive(Clone, Debug)]
pub struct UkfConfig {
    /// Sigma point spread (small positive)
    pub alpha: f64,
    /// Prior distribution shape parameter (2.0 is optimal for Gaussians)
    pub beta: f64,
    /// Secondary scaling parameter
    pub kappa: f64,
    /// Process noise diagonal scale for Q
    pub process_noise: f64,
    /// Measurement noise diagonal scale for R
    pub measurement_noise: f64,
}

impl Default for UkfConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            beta: 2.0,
            kappa: 0.0,
            process_noise: 0.01,
            measurement_noise: 0.01,
        }
    }
}

/// Constant-velocity UKF. Working state lives on the struct and is swapped
/// through the Kalman cache between objects.
#[derive(Clone, Debug)]
pub struct MotionFilter {
    pub config: UkfConfig,
    pub state: StateVec,
    pub cov: StateCov,
    q: StateCov,
    r: MeasCov,
    lambda: f64,
    w_mean: [f64; N_SIGMA],
    w_cov: [f64; N_SIGMA],
}

impl MotionFilter {
    pub fn new(config: UkfConfig) -> Self {
        let n = N as f64;
        let lambda = config.alpha * config.alpha * (n + config.kappa) - n;
        let w0m = lambda / (n + lambda);
        let w0c = w0m + (1.0 - config.alpha * config.alpha + config.beta);
        let wi = 1.0 / (2.0 * (n + lambda));
        let mut w_mean = [wi; N_SIGMA];
        let mut w_cov = [wi; N_SIGMA];
        w_mean[0] = w0m;
        w_cov[0] = w0c;

        Self {
            q: StateCov::identity() * config.process_noise,
            r: MeasCov::identity() * config.measurement_noise,
            state: StateVec::zeros(),
            cov: StateCov::identity(),
            lambda,
            w_mean,
            w_cov,
            config,
        }
    }

    /// Load working state — used by the cache on both cold start and cache hit.
    pub fn set_state(&mut self, state: StateVec, cov: StateCov) {
        self.state = state;
        self.cov = cov;
    }

    /// Constant-velocity transition.
    fn fx(x: &StateVec, dt: f64) -> StateVec {
        StateVec::new(x[0] + x[2] * dt, x[1] + x[3] * dt, x[2], x[3])
    }

    /// Position observation.
    fn hx(x: &StateVec) -> MeasVec {
        MeasVec::new(x[0], x[1])
    }

    /// Merwe scaled sigma points around the current state. A covariance that
    /// has lost positive-definiteness degrades to a scaled-identity spread
    /// instead of panicking — this filter runs unattended.
    fn sigma_points(&self) -> [StateVec; N_SIGMA] {
        let scaled = self.cov * (N as f64 + self.lambda);
        let spread = match scaled.cholesky() {
            Some(chol) => chol.l(),
            None => {
                warn!("covariance not positive definite, regenerating sigma spread");
                Matrix4::identity() * (N as f64 + self.lambda).sqrt()
            }
        };

        let mut points = [self.state; N_SIGMA];
        for i in 0..N {
            let col: StateVec = spread.column(i).into_owned();
            points[1 + i] = self.state + col;
            points[1 + N + i] = self.state - col;
        }
        points
    }

    /// Advance the state estimate by `dt` seconds with no measurement.
    pub fn predict(&mut self, dt: f64) {
        let sigmas = self.sigma_points();
        let mut propagated = [StateVec::zeros(); N_SIGMA];
        for (out, sp) in propagated.iter_mut().zip(&sigmas) {
            *out = Self::fx(sp, dt);
        }

        let mut mean = StateVec::zeros();
        for (w, sp) in self.w_mean.iter().zip(&propagated) {
            mean += sp * *w;
        }
        let mut cov = self.q;
        for (w, sp) in self.w_cov.iter().zip(&propagated) {
            let d = sp - mean;
            cov += d * d.transpose() * *w;
        }

        self.state = mean;
        self.cov = cov;
    }

    /// Standard unscented correction with a position measurement.
    pub fn update(&mut self, z: &MeasVec) {
        let sigmas = self.sigma_points();
        let mut z_sigmas = [MeasVec::zeros(); N_SIGMA];
        for (out, sp) in z_sigmas.iter_mut().zip(&sigmas) {
            *out = Self::hx(sp);
        }

        let mut z_mean = MeasVec::zeros();
        for (w, zp) in self.w_mean.iter().zip(&z_sigmas) {
            z_mean += zp * *w;
        }

        let mut s = self.r;
        let mut pxz = nalgebra::Matrix4x2::<f64>::zeros();
        for i in 0..N_SIGMA {
            let dz = z_sigmas[i] - z_mean;
            let dx = sigmas[i] - self.state;
            s += dz * dz.transpose() * self.w_cov[i];
            pxz += dx * dz.transpose() * self.w_cov[i];
        }

        let Some(s_inv) = s.try_inverse() else {
            warn!("innovation covariance singular, skipping update");
            return;
        };
        let k = pxz * s_inv;
        let innovation = z - z_mean;
        self.state += k * innovation;
        self.cov -= k * s * k.transpose();
    }

    /// The per-object, per-cycle entry point: predict forward by `dt`, then
    /// correct with the measurement. Returns the new state estimate.
    pub fn predict_and_update(&mut self, z: &MeasVec, dt: f64) -> StateVec {
        self.predict(dt);
        self.update(z);
        self.state
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
