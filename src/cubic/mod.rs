//! Generalized two-parameter cubic equations of state.
//!
//! All variants share the pressure explicit form
//!
//! $$p=\frac{RT}{v-b}-\frac{a(T)}{(v+\delta_1b)(v+\delta_2b)}$$
//!
//! and differ in the universal constants $\delta_1$, $\delta_2$ and in the temperature
//! dependence of the attraction parameter $a(T)$.
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;
use std::fmt;

mod cache;
mod mixing_rules;
mod mixture;
mod properties;
mod species;

pub use cache::Coefficients;
pub use mixing_rules::BinaryTable;
pub use mixture::{ComponentRecord, Mixture, MixtureBuilder, MixtureRecord};
pub use properties::CubicState;
pub use species::{CubicRecord, Species};

/// Universal constants of a cubic equation of state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta {
    pub d1: f64,
    pub d2: f64,
    pub d12: f64,
}

impl From<(f64, f64)> for Delta {
    fn from(value: (f64, f64)) -> Self {
        Delta {
            d1: value.0,
            d2: value.1,
            d12: value.0 - value.1,
        }
    }
}

impl Delta {
    // Calculate universal critical constants from universal cubic parameters.
    //
    // See https://doi.org/10.1016/j.fluid.2012.05.008
    pub fn critical_constants(&self) -> (f64, f64) {
        let (r1, r2) = (-self.d1, -self.d2);
        let eta_c = 1.0
            / (((1.0 - r1) * (1.0 - r2).powi(2)).cbrt()
                + ((1.0 - r2) * (1.0 - r1).powi(2)).cbrt()
                + 1.0);
        let omega_a = (1.0 - eta_c * r1) * (1.0 - eta_c * r2) / (1.0 - eta_c)
            * (2.0 - eta_c * (r1 + r2))
            / (3.0 - eta_c * (1.0 + r1 + r2)).powi(2);
        let omega_b = eta_c / (3.0 - eta_c * (1.0 + r1 + r2));
        (omega_a, omega_b)
    }
}

/// Available cubic equations of state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CubicKind {
    /// Redlich & Kwong (1949): $a(T)=a_0\sqrt{T_c/T}$.
    RedlichKwong,
    /// Soave (1972): $a(T)=a_0\left(1+n\left(1-\sqrt{T/T_c}\right)\right)^2$.
    #[default]
    SoaveRedlichKwong,
    /// Peng & Robinson (1976) with the Soave type alpha function.
    PengRobinson,
}

impl CubicKind {
    pub fn delta(&self) -> Delta {
        match self {
            Self::RedlichKwong | Self::SoaveRedlichKwong => (1.0, 0.0).into(),
            Self::PengRobinson => (1.0 + SQRT_2, 1.0 - SQRT_2).into(),
        }
    }

    /// Shape exponent $n$ of the alpha function as function of the acentric factor.
    pub fn shape_exponent(&self, acentric_factor: f64) -> f64 {
        let w = acentric_factor;
        match self {
            Self::RedlichKwong => 0.0,
            Self::SoaveRedlichKwong => 0.48 + w * (1.574 - w * 0.176),
            Self::PengRobinson => 0.37464 + w * (1.54226 - w * 0.26992),
        }
    }

    /// Whether the mixing sums depend on temperature.
    ///
    /// For Redlich-Kwong the temperature dependence factors out of the mixing rule.
    pub fn temperature_dependent_mixing(&self) -> bool {
        !matches!(self, Self::RedlichKwong)
    }
}

impl fmt::Display for CubicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedlichKwong => write!(f, "Redlich-Kwong"),
            Self::SoaveRedlichKwong => write!(f, "Soave-Redlich-Kwong"),
            Self::PengRobinson => write!(f, "Peng-Robinson"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn critical_constants() {
        let (omega_a, omega_b) = CubicKind::SoaveRedlichKwong.delta().critical_constants();
        assert_relative_eq!(omega_a, 0.42748, max_relative = 1e-4);
        assert_relative_eq!(omega_b, 0.08664, max_relative = 1e-4);

        let (omega_a, omega_b) = CubicKind::PengRobinson.delta().critical_constants();
        assert_relative_eq!(omega_a, 0.45724, max_relative = 1e-4);
        assert_relative_eq!(omega_b, 0.07780, max_relative = 1e-4);
    }

    #[test]
    fn kind_from_json() {
        let kind: CubicKind = serde_json::from_str("\"peng_robinson\"").unwrap();
        assert_eq!(kind, CubicKind::PengRobinson);
        assert_eq!(CubicKind::default(), CubicKind::SoaveRedlichKwong);
    }
}
