//! Cubic equations of state for real-gas mixtures.
//!
//! The crate evaluates the generalized two-parameter cubic equation of state
//!
//! $$p=\frac{RT}{v-b}-\frac{a(T)}{(v+\delta_1b)(v+\delta_2b)}$$
//!
//! for mixtures of species described by their critical properties. It provides
//! * per-species attraction and covolume parameters ([cubic::Species]),
//! * a one-fluid van der Waals mixing rule with binary interaction parameters and a
//!   temperature stamped coefficient cache ([cubic::Mixture]),
//! * closed-form pressure derivatives and departure integrals ([cubic::CubicState]),
//! * a bracketed Newton density iteration ([density_iteration()]).
//!
//! All quantities are SI with molar amounts in kmol: temperatures in K, pressures in Pa,
//! mass densities in kg/m³, molar volumes in m³/kmol and molar weights in kg/kmol.
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

/// Print messages with level `Verbosity::Iter` or higher.
#[macro_export]
macro_rules! log_iter {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Iter {
            println!($($arg)*);
        }
    }
}

/// Print messages with level `Verbosity::Result` or higher.
#[macro_export]
macro_rules! log_result {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Result {
            println!($($arg)*);
        }
    }
}

pub mod cubic;
mod density_iteration;
mod errors;
pub mod parameter;

pub use cubic::{
    BinaryTable, Coefficients, CubicKind, CubicRecord, CubicState, Mixture, MixtureBuilder,
    MixtureRecord, Species,
};
pub use density_iteration::{density_iteration, DensityIteration, SolverOptions, Verbosity};
pub use errors::{EosError, EosResult};

/// Universal gas constant in J/(kmol K).
pub const RGAS: f64 = 8314.462618;

/// Standard pressure in Pa.
pub const P_STD: f64 = 1.0e5;

/// Standard temperature in K.
pub const T_STD: f64 = 298.15;
