use nalgebra::SVector;

use crate::dynamics::OdeSystem;
use crate::sim::config::Tolerances;
use crate::sim::trajectory::{Breakdown, SolverStats};

// ---------------------------------------------------------------------------
// Dormand-Prince 5(4) tableau
// ---------------------------------------------------------------------------

const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0, 0.0],
    [9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0],
];

const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

// Difference between the 5th and embedded 4th order weights (7 stages, FSAL).
const E: [f64; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

// Continuous extension: y(t_old + x h) = y_old + h * sum_j (K^T P)_j x^(j+1).
const P: [[f64; 4]; 7] = [
    [
        1.0,
        -8048581381.0 / 2820520608.0,
        8663915743.0 / 2820520608.0,
        -12715105075.0 / 11282082432.0,
    ],
    [0.0, 0.0, 0.0, 0.0],
    [
        0.0,
        131558114200.0 / 32700410799.0,
        -68118460800.0 / 10900136933.0,
        87487479700.0 / 32700410799.0,
    ],
    [
        0.0,
        -1754552775.0 / 470086768.0,
        14199869525.0 / 1410260304.0,
        -10690763975.0 / 1880347072.0,
    ],
    [
        0.0,
        127303824393.0 / 49829197408.0,
        -318862633887.0 / 49829197408.0,
        701980252875.0 / 199316789632.0,
    ],
    [
        0.0,
        -282668133.0 / 205662961.0,
        2019193451.0 / 616988883.0,
        -1453857185.0 / 822651844.0,
    ],
    [
        0.0,
        40617522.0 / 29380423.0,
        -110615467.0 / 29380423.0,
        69997945.0 / 29380423.0,
    ],
];

// Step size control
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rms_norm<const D: usize>(v: &SVector<f64, D>) -> f64 {
    (v.norm_squared() / D as f64).sqrt()
}

fn all_finite<const D: usize>(v: &SVector<f64, D>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Distance from `t` to the next representable float away from zero.
fn spacing(t: f64) -> f64 {
    let a = t.abs();
    f64::from_bits(a.to_bits() + 1) - a
}

/// Starting step from the local scale of the solution and its derivatives
/// (Hairer, Norsett & Wanner, II.4).
fn select_initial_step<S, const D: usize>(
    system: &S,
    t0: f64,
    y0: &SVector<f64, D>,
    f0: &SVector<f64, D>,
    interval: f64,
    tol: &Tolerances,
) -> f64
where
    S: OdeSystem<D>,
{
    let scale = y0.map(|y| tol.atol + y.abs() * tol.rtol);
    let d0 = rms_norm(&y0.component_div(&scale));
    let d1 = rms_norm(&f0.component_div(&scale));

    let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
    let h0 = h0.min(interval);

    let y1 = y0 + f0 * h0;
    let f1 = system.rhs(t0 + h0, &y1);
    let d2 = rms_norm(&(f1 - f0).component_div(&scale)) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(-ERROR_EXPONENT)
    };

    (100.0 * h0).min(h1).min(interval)
}

// ---------------------------------------------------------------------------
// Dense step
// ---------------------------------------------------------------------------

/// An accepted step together with its interpolant over `[t_old, t_new]`.
#[derive(Debug, Clone)]
pub struct DenseStep<const D: usize> {
    pub t_old: f64,
    pub t_new: f64,
    pub y_old: SVector<f64, D>,
    pub y_new: SVector<f64, D>,
    q: [SVector<f64, D>; 4],
}

impl<const D: usize> DenseStep<D> {
    /// Interpolated state at `t` inside the step. The right end returns the
    /// stepped value itself.
    pub fn eval(&self, t: f64) -> SVector<f64, D> {
        if t == self.t_new {
            return self.y_new;
        }
        let h = self.t_new - self.t_old;
        let x = (t - self.t_old) / h;

        let mut acc = SVector::<f64, D>::zeros();
        let mut power = x;
        for q in &self.q {
            acc += q * power;
            power *= x;
        }
        self.y_old + acc * h
    }
}

// ---------------------------------------------------------------------------
// Adaptive integrator
// ---------------------------------------------------------------------------

/// Explicit Dormand-Prince 5(4) integrator with error control and dense output.
pub struct Dopri5<'a, S, const D: usize> {
    system: &'a S,
    tol: Tolerances,
    t: f64,
    t_bound: f64,
    y: SVector<f64, D>,
    f: SVector<f64, D>,
    h_abs: f64,
    stats: SolverStats,
}

impl<'a, S, const D: usize> Dopri5<'a, S, D>
where
    S: OdeSystem<D>,
{
    /// Prepare integration of `system` from `(t0, y0)` up to `t_bound > t0`.
    ///
    /// Fails immediately if the derivative at the initial state is not finite,
    /// since no step size can be chosen from it.
    pub fn new(
        system: &'a S,
        t0: f64,
        y0: SVector<f64, D>,
        t_bound: f64,
        tol: Tolerances,
    ) -> Result<Self, Breakdown> {
        let f0 = system.rhs(t0, &y0);
        if !all_finite(&f0) {
            return Err(Breakdown::NonFiniteDerivative);
        }
        let h_abs = select_initial_step(system, t0, &y0, &f0, t_bound - t0, &tol);

        Ok(Self {
            system,
            tol,
            t: t0,
            t_bound,
            y: y0,
            f: f0,
            h_abs,
            stats: SolverStats {
                accepted_steps: 0,
                rejected_steps: 0,
                fn_evals: 2,
            },
        })
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn y(&self) -> &SVector<f64, D> {
        &self.y
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.t >= self.t_bound
    }

    /// Take one accepted step, retrying with smaller sizes as error control
    /// demands. Returns the breakdown reason if no acceptable step exists.
    pub fn advance(&mut self) -> Result<DenseStep<D>, Breakdown> {
        if let Some(max) = self.tol.max_steps {
            if self.stats.accepted_steps >= max {
                return Err(Breakdown::MaxStepsExceeded);
            }
        }

        let min_step = 10.0 * spacing(self.t);
        let mut h_abs = self.h_abs.max(min_step);
        let mut step_rejected = false;
        let mut saw_non_finite = false;

        loop {
            if h_abs < min_step {
                return Err(if saw_non_finite {
                    Breakdown::NonFiniteDerivative
                } else {
                    Breakdown::StepSizeUnderflow
                });
            }

            let t_new = (self.t + h_abs).min(self.t_bound);
            let h = t_new - self.t;
            h_abs = h;

            let (y_new, k) = rk_stages(self.system, self.t, &self.y, &self.f, h);
            self.stats.fn_evals += 6;

            let mut err = SVector::<f64, D>::zeros();
            for (ki, ei) in k.iter().zip(E.iter()) {
                err += ki * *ei;
            }
            err *= h;

            let scale = self.y.zip_map(&y_new, |a, b| self.tol.atol + a.abs().max(b.abs()) * self.tol.rtol);
            let err_norm = rms_norm(&err.component_div(&scale));

            if err_norm.is_finite() && all_finite(&y_new) && err_norm < 1.0 {
                let mut factor = if err_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err_norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
                };
                if step_rejected {
                    factor = factor.min(1.0);
                }

                let mut q = [SVector::<f64, D>::zeros(); 4];
                for (j, qj) in q.iter_mut().enumerate() {
                    for (ki, pi) in k.iter().zip(P.iter()) {
                        *qj += ki * pi[j];
                    }
                }

                let step = DenseStep {
                    t_old: self.t,
                    t_new,
                    y_old: self.y,
                    y_new,
                    q,
                };

                self.t = t_new;
                self.y = y_new;
                self.f = k[6];
                self.h_abs = h_abs * factor;
                self.stats.accepted_steps += 1;
                return Ok(step);
            }

            if err_norm.is_finite() && all_finite(&y_new) {
                h_abs *= (SAFETY * err_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR);
            } else {
                saw_non_finite = true;
                h_abs *= MIN_FACTOR;
            }
            step_rejected = true;
            self.stats.rejected_steps += 1;
        }
    }
}

/// Evaluate all seven stages of one Dormand-Prince step from `(t, y)` with
/// `f = f(t, y)`. The last stage is `f(t + h, y_new)` and seeds the next step.
fn rk_stages<S, const D: usize>(
    system: &S,
    t: f64,
    y: &SVector<f64, D>,
    f: &SVector<f64, D>,
    h: f64,
) -> (SVector<f64, D>, [SVector<f64, D>; 7])
where
    S: OdeSystem<D>,
{
    let mut k = [SVector::<f64, D>::zeros(); 7];
    k[0] = *f;

    for s in 1..6 {
        let mut dy = SVector::<f64, D>::zeros();
        for (kj, aj) in k[..s].iter().zip(A[s].iter()) {
            dy += kj * *aj;
        }
        k[s] = system.rhs(t + C[s] * h, &(y + dy * h));
    }

    let mut dy = SVector::<f64, D>::zeros();
    for (kj, bj) in k[..6].iter().zip(B.iter()) {
        dy += kj * *bj;
    }
    let y_new = y + dy * h;
    k[6] = system.rhs(t + h, &y_new);

    (y_new, k)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
