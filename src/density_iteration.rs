use crate::cubic::Mixture;
use crate::errors::{EosError, EosResult};

const MAX_ITER: usize = 100;
const TOL: f64 = 1e-10;
/// First step of the root search relative to the initial density.
const SEARCH_STEP: f64 = 1e-2;

/// Level of detail in the iteration output.
#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Eq)]
pub enum Verbosity {
    /// Do not print output.
    None,
    /// Print information about the success or failure of the iteration.
    Result,
    /// Print a detailed output for every iteration.
    Iter,
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::None
    }
}

/// Options for the density iteration.
///
/// If the values are [None], the default values of 100 iterations and a relative
/// pressure tolerance of 1e-10 are used.
#[derive(Copy, Clone, Debug, Default)]
pub struct SolverOptions {
    /// Maximum number of iterations.
    pub max_iter: Option<usize>,
    /// Relative tolerance of the pressure.
    pub tol: Option<f64>,
    /// Iteration output indicated by the [Verbosity] enum.
    pub verbosity: Verbosity,
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = Some(tol);
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn unwrap_or(self, max_iter: usize, tol: f64) -> (usize, f64, Verbosity) {
        (
            self.max_iter.unwrap_or(max_iter),
            self.tol.unwrap_or(tol),
            self.verbosity,
        )
    }
}

/// Outcome of a density iteration.
///
/// If the iteration did not converge, `density` is the best estimate found.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DensityIteration {
    /// Mass density in kg/m³
    pub density: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl DensityIteration {
    /// Return the density or [EosError::NotConverged] if the iteration failed.
    pub fn into_result(self) -> EosResult<f64> {
        if self.converged {
            Ok(self.density)
        } else {
            Err(EosError::NotConverged("density_iteration".to_owned()))
        }
    }
}

/// A density with its pressure residual and the pressure derivative.
#[derive(Copy, Clone, Debug)]
struct Point {
    density: f64,
    error: f64,
    dp_drho: f64,
}

/// Interval with a sign change of the pressure residual. `near` is the end closer
/// to the initial density.
#[derive(Copy, Clone, Debug)]
struct Bracket {
    near: Point,
    far: f64,
}

/// Walks from the initial density towards one of the density bounds.
struct Search {
    last: Point,
    bound: f64,
    open: bool,
}

struct Solver<'a> {
    mixture: &'a Mixture,
    pressure: f64,
    temperature: f64,
    max_iter: usize,
    tol: f64,
    verbosity: Verbosity,
    iterations: usize,
    best: (f64, f64),
}

impl Solver<'_> {
    fn budget_left(&self) -> bool {
        self.iterations < self.max_iter
    }

    fn converged(&self, point: &Point) -> bool {
        point.error.abs() <= self.tol * self.pressure
    }

    fn evaluate(&mut self, density: f64) -> EosResult<Point> {
        self.iterations += 1;
        let state = self.mixture.state(density, self.temperature)?;
        let error = state.pressure() - self.pressure;
        if error.abs() < self.best.0 {
            self.best = (error.abs(), density);
        }
        log_iter!(
            self.verbosity,
            " {:4} | {:14.8e} | {:14.8}",
            self.iterations,
            error / self.pressure,
            density
        );
        Ok(Point {
            density,
            error,
            dp_drho: state.dp_drho(),
        })
    }

    /// Step outward from the initial density in both directions with doubling step
    /// length until the pressure residual changes sign.
    ///
    /// Both directions advance by the same distance per step, so the first sign
    /// change encloses the root closest to the initial density. If both directions
    /// find a sign change in the same step, both brackets are returned.
    fn search(&mut self, start: Point, bounds: (f64, f64)) -> EosResult<Vec<Bracket>> {
        let mut directions = [
            Search {
                last: start,
                bound: bounds.1,
                open: start.density < bounds.1,
            },
            Search {
                last: start,
                bound: bounds.0,
                open: start.density > bounds.0,
            },
        ];
        let mut step = SEARCH_STEP * start.density;
        let mut brackets = Vec::with_capacity(2);
        while directions.iter().any(|d| d.open) {
            for d in directions.iter_mut().filter(|d| d.open) {
                if !self.budget_left() {
                    return Ok(brackets);
                }
                let density = if d.bound > start.density {
                    (start.density + step).min(d.bound)
                } else {
                    (start.density - step).max(d.bound)
                };
                let point = self.evaluate(density)?;
                if (point.error > 0.0) != (d.last.error > 0.0) {
                    brackets.push(Bracket {
                        near: d.last,
                        far: density,
                    });
                }
                d.open = density != d.bound;
                d.last = point;
            }
            if !brackets.is_empty() {
                break;
            }
            step *= 2.0;
        }
        Ok(brackets)
    }

    /// Newton iteration safeguarded by bisection within a bracket.
    fn refine(&mut self, bracket: Bracket) -> EosResult<Option<f64>> {
        let mut point = bracket.near;
        let (mut positive, mut negative) = if point.error > 0.0 {
            (point.density, bracket.far)
        } else {
            (bracket.far, point.density)
        };
        while self.budget_left() {
            let (lo, hi) = (positive.min(negative), positive.max(negative));
            // bracket collapsed to a single floating point number
            if hi - lo <= 4.0 * f64::EPSILON * hi {
                break;
            }
            let newton = point.density - point.error / point.dp_drho;
            let density = if newton.is_finite() && newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
            point = self.evaluate(density)?;
            if self.converged(&point) {
                return Ok(Some(density));
            }
            if point.error > 0.0 {
                positive = density;
            } else {
                negative = density;
            }
        }
        Ok(None)
    }
}

/// Find the density of a mixture at given pressure and temperature.
///
/// The solver converges to the root of $p(\rho)-p_\mathrm{target}$ closest to
/// `initial_density`, which can be a vapor like, a liquid like or a mechanically
/// unstable solution. Starting from the seed, the density is varied in both
/// directions with doubling step length until the pressure residual changes sign.
/// The enclosed root is then found with Newton steps that are replaced by bisection
/// whenever they leave the bracket. Two roots lying within the same search step do
/// not change the sign of the residual and are skipped.
///
/// Every pressure evaluation counts as an iteration.
pub fn density_iteration(
    mixture: &Mixture,
    pressure: f64,
    temperature: f64,
    initial_density: f64,
    options: SolverOptions,
) -> EosResult<DensityIteration> {
    if !(pressure.is_finite() && pressure > 0.0) {
        return Err(EosError::InvalidState(
            String::from("density iteration"),
            String::from("pressure"),
            pressure,
        ));
    }
    if !(initial_density.is_finite() && initial_density > 0.0) {
        return Err(EosError::InvalidState(
            String::from("density iteration"),
            String::from("density"),
            initial_density,
        ));
    }
    let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER, TOL);

    let bounds = mixture.density_bounds();
    let rho0 = initial_density.clamp(bounds.0, bounds.1);
    let mut solver = Solver {
        mixture,
        pressure,
        temperature,
        max_iter,
        tol,
        verbosity,
        iterations: 0,
        best: (f64::INFINITY, rho0),
    };

    log_iter!(verbosity, " iter |    residual    |    density");
    log_iter!(verbosity, "{:-<42}", "");

    let mut root = None;
    if max_iter > 0 {
        let start = solver.evaluate(rho0)?;
        if solver.converged(&start) {
            root = Some(rho0);
        } else {
            let mut roots = Vec::with_capacity(2);
            for bracket in solver.search(start, bounds)? {
                if let Some(rho) = solver.refine(bracket)? {
                    roots.push(rho);
                }
            }
            root = roots
                .into_iter()
                .min_by(|r1, r2| (r1 - rho0).abs().total_cmp(&(r2 - rho0).abs()));
        }
    }

    let iterations = solver.iterations;
    match root {
        Some(density) => {
            log_result!(
                verbosity,
                "density_iteration: calculation converged in {} step(s)\n",
                iterations
            );
            Ok(DensityIteration {
                density,
                iterations,
                converged: true,
            })
        }
        None => {
            log_result!(
                verbosity,
                "density_iteration: no convergence after {} step(s), best estimate {} kg/m³\n",
                iterations,
                solver.best.1
            );
            Ok(DensityIteration {
                density: solver.best.1,
                iterations,
                converged: false,
            })
        }
    }
}
