use super::CubicKind;
use crate::errors::{EosError, EosResult};
use crate::parameter::{Identifier, IdentifierOption, ModelRecord, PureRecord};
use crate::RGAS;
use num_dual::DualNum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Lower bound of the density iteration in kmol/m³ if not given in the record.
const MIN_MOLAR_DENSITY: f64 = 1e-6;
/// Upper bound of the density iteration relative to the close packed density 1/b.
const MAX_PACKING: f64 = 0.9;

/// Cubic parameters for a single substance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CubicRecord {
    /// critical temperature in Kelvin
    pub tc: f64,
    /// critical pressure in Pascal
    pub pc: f64,
    /// acentric factor
    pub acentric_factor: f64,
    /// equation of state the parameters are used with
    #[serde(default)]
    pub kind: CubicKind,
    /// attraction parameter at the critical temperature in Pa m⁶/kmol²
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a0: Option<f64>,
    /// covolume in m³/kmol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
    /// lower bound of the density iteration in kg/m³
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rho_min: Option<f64>,
    /// upper bound of the density iteration in kg/m³
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rho_max: Option<f64>,
}

impl CubicRecord {
    /// Create a new pure substance record for the Soave-Redlich-Kwong equation of state.
    pub fn new(tc: f64, pc: f64, acentric_factor: f64) -> Self {
        Self {
            tc,
            pc,
            acentric_factor,
            kind: CubicKind::default(),
            a0: None,
            b: None,
            rho_min: None,
            rho_max: None,
        }
    }

    /// Use the record with a different cubic equation of state.
    pub fn with_kind(mut self, kind: CubicKind) -> Self {
        self.kind = kind;
        self
    }
}

impl ModelRecord for CubicRecord {
    const REQUIRED_KEYS: &'static [&'static str] = &["tc", "pc", "acentric_factor"];
}

impl fmt::Display for CubicRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CubicRecord({}", self.kind)?;
        write!(f, ", tc={} K", self.tc)?;
        write!(f, ", pc={} Pa", self.pc)?;
        write!(f, ", acentric factor={}", self.acentric_factor)?;
        if let Some(a0) = self.a0 {
            write!(f, ", a0={}", a0)?;
        }
        if let Some(b) = self.b {
            write!(f, ", b={}", b)?;
        }
        write!(f, ")")
    }
}

fn positive(quantity: &str, value: f64) -> EosResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EosError::IncompatibleParameters(format!(
            "{} has to be positive and finite, got {}.",
            quantity, value
        )))
    }
}

/// Attraction and covolume parameters of a single species.
///
/// The parameters are derived once from the critical data; afterwards the species is
/// immutable and is shared between mixtures via [Arc].
#[derive(Debug, Clone)]
pub struct Species {
    record: PureRecord<CubicRecord>,
    a0: f64,
    b: f64,
    n: f64,
    rho_min: f64,
    rho_max: f64,
}

impl Species {
    /// Derive the cubic parameters from a pure substance record.
    pub fn new(record: PureRecord<CubicRecord>) -> EosResult<Self> {
        let r = &record.model_record;
        let tc = positive("critical temperature", r.tc)?;
        let pc = positive("critical pressure", r.pc)?;
        let molarweight = positive("molar weight", record.molarweight)?;
        if !r.acentric_factor.is_finite() {
            return Err(EosError::IncompatibleParameters(format!(
                "acentric factor has to be finite, got {}.",
                r.acentric_factor
            )));
        }

        let (omega_a, omega_b) = r.kind.delta().critical_constants();
        let a0 = match r.a0 {
            Some(a0) => positive("a0", a0)?,
            None => omega_a * (RGAS * tc).powi(2) / pc,
        };
        let b = match r.b {
            Some(b) => positive("b", b)?,
            None => omega_b * RGAS * tc / pc,
        };
        let n = r.kind.shape_exponent(r.acentric_factor);

        let rho_min = positive("rho_min", r.rho_min.unwrap_or(MIN_MOLAR_DENSITY * molarweight))?;
        let rho_max = positive("rho_max", r.rho_max.unwrap_or(MAX_PACKING * molarweight / b))?;
        if rho_min >= rho_max {
            return Err(EosError::IncompatibleParameters(format!(
                "rho_min ({}) has to be smaller than rho_max ({}).",
                rho_min, rho_max
            )));
        }

        Ok(Self {
            record,
            a0,
            b,
            n,
            rho_min,
            rho_max,
        })
    }

    /// Read a species from the json representation of its [PureRecord].
    pub fn from_json_str(json: &str) -> EosResult<Self> {
        Self::new(PureRecord::from_json_str(json)?)
    }

    /// Read the species `substances` from a parameter file.
    pub fn from_json<P: AsRef<Path>>(
        substances: &[&str],
        file: P,
        identifier_option: IdentifierOption,
    ) -> EosResult<Vec<Arc<Self>>> {
        PureRecord::from_json(substances, file, identifier_option)?
            .into_iter()
            .map(|record| Self::new(record).map(Arc::new))
            .collect()
    }

    /// Write the record the species was created from.
    pub fn to_json(&self) -> EosResult<String> {
        self.record.to_json()
    }

    pub fn record(&self) -> &PureRecord<CubicRecord> {
        &self.record
    }

    pub fn identifier(&self) -> &Identifier {
        &self.record.identifier
    }

    pub fn kind(&self) -> CubicKind {
        self.record.model_record.kind
    }

    /// Molar weight in kg/kmol.
    pub fn molarweight(&self) -> f64 {
        self.record.molarweight
    }

    /// Critical temperature in K.
    pub fn tc(&self) -> f64 {
        self.record.model_record.tc
    }

    /// Critical pressure in Pa.
    pub fn pc(&self) -> f64 {
        self.record.model_record.pc
    }

    /// Attraction parameter at the critical temperature.
    pub fn a0(&self) -> f64 {
        self.a0
    }

    /// Covolume in m³/kmol.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Shape exponent of the alpha function.
    pub fn n(&self) -> f64 {
        self.n
    }

    /// Bounds of the density iteration in kg/m³.
    pub fn density_bounds(&self) -> (f64, f64) {
        (self.rho_min, self.rho_max)
    }

    /// Dimensionless alpha function $a(T)/a_0$ for arbitrary dual numbers.
    pub fn alpha<D: DualNum<f64> + Copy>(&self, temperature: D) -> D {
        let sqrt_tr = (temperature / self.tc()).sqrt();
        match self.kind() {
            CubicKind::RedlichKwong => sqrt_tr.recip(),
            CubicKind::SoaveRedlichKwong | CubicKind::PengRobinson => {
                let f = (D::one() - sqrt_tr) * self.n + 1.0;
                f * f
            }
        }
    }

    /// Attraction parameter in Pa m⁶/kmol². Requires `temperature > 0`.
    pub fn a(&self, temperature: f64) -> f64 {
        debug_assert!(temperature > 0.0);
        match self.kind() {
            CubicKind::RedlichKwong => self.a0 * (self.tc() / temperature).sqrt(),
            CubicKind::SoaveRedlichKwong | CubicKind::PengRobinson => {
                let f = 1.0 + self.n * (1.0 - (temperature / self.tc()).sqrt());
                self.a0 * f * f
            }
        }
    }

    /// First temperature derivative of the attraction parameter.
    pub fn da_dt(&self, temperature: f64) -> f64 {
        debug_assert!(temperature > 0.0);
        match self.kind() {
            CubicKind::RedlichKwong => -0.5 * self.a(temperature) / temperature,
            CubicKind::SoaveRedlichKwong | CubicKind::PengRobinson => {
                let s = (temperature / self.tc()).sqrt();
                let f = 1.0 + self.n * (1.0 - s);
                -self.a0 * self.n * f * s / temperature
            }
        }
    }

    /// Second temperature derivative of the attraction parameter.
    pub fn d2a_dt2(&self, temperature: f64) -> f64 {
        debug_assert!(temperature > 0.0);
        match self.kind() {
            CubicKind::RedlichKwong => 0.75 * self.a(temperature) / temperature.powi(2),
            CubicKind::SoaveRedlichKwong | CubicKind::PengRobinson => {
                let s = (temperature / self.tc()).sqrt();
                0.5 * self.a0 * self.n * (1.0 + self.n) * s / temperature.powi(2)
            }
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Species({}, a0={}, b={}, n={})",
            self.record.identifier, self.a0, self.b, self.n
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_dual::second_derivative;

    fn methane(kind: CubicKind) -> Species {
        let record = PureRecord::new(
            Identifier::from_name("methane"),
            16.043,
            CubicRecord::new(190.6, 4.6e6, 0.008).with_kind(kind),
        );
        Species::new(record).unwrap()
    }

    #[test]
    fn critical_attraction() {
        for kind in [
            CubicKind::RedlichKwong,
            CubicKind::SoaveRedlichKwong,
            CubicKind::PengRobinson,
        ] {
            let s = methane(kind);
            assert_relative_eq!(s.a(s.tc()), s.a0(), max_relative = 1e-14);
            assert_relative_eq!(s.alpha(s.tc()), 1.0, max_relative = 1e-14);
        }
    }

    #[test]
    fn soave_constants() {
        let s = methane(CubicKind::SoaveRedlichKwong);
        assert_relative_eq!(
            s.n(),
            0.48 + 1.574 * 0.008 - 0.176 * 0.008f64.powi(2),
            max_relative = 1e-14
        );
        assert_eq!(s.pc(), 4.6e6);
        assert_relative_eq!(s.b(), 0.08664 * RGAS * s.tc() / s.pc(), max_relative = 1e-4);
        assert_relative_eq!(
            s.a0(),
            0.42748 * (RGAS * 190.6f64).powi(2) / 4.6e6,
            max_relative = 1e-4
        );
    }

    #[test]
    fn derivatives_match_dual_numbers() {
        for kind in [
            CubicKind::RedlichKwong,
            CubicKind::SoaveRedlichKwong,
            CubicKind::PengRobinson,
        ] {
            let s = methane(kind);
            for t in [120.0, 190.6, 300.0, 650.0] {
                let (a, da, d2a) = second_derivative(|t| s.alpha(t) * s.a0(), t);
                assert_relative_eq!(s.a(t), a, max_relative = 1e-13);
                assert_relative_eq!(s.da_dt(t), da, max_relative = 1e-12);
                assert_relative_eq!(s.d2a_dt2(t), d2a, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn literal_overrides() {
        let mut record = CubicRecord::new(190.6, 4.6e6, 0.008);
        record.a0 = Some(2.3e5);
        record.b = Some(0.03);
        let s = Species::new(PureRecord::new(Identifier::default(), 16.043, record)).unwrap();
        assert_eq!(s.a0(), 2.3e5);
        assert_eq!(s.b(), 0.03);
        let (rho_min, rho_max) = s.density_bounds();
        assert_relative_eq!(rho_max, 0.9 * 16.043 / 0.03);
        assert!(rho_min > 0.0 && rho_min < rho_max);
    }

    #[test]
    fn invalid_record() {
        let record = PureRecord::new(
            Identifier::default(),
            16.043,
            CubicRecord::new(-190.6, 4.6e6, 0.008),
        );
        assert!(matches!(
            Species::new(record),
            Err(EosError::IncompatibleParameters(_))
        ));
    }

    #[test]
    fn from_json_missing_key() {
        let json = r#"{
            "identifier": {"name": "methane"},
            "molarweight": 16.043,
            "model_record": {"tc": 190.6, "acentric_factor": 0.008}
        }"#;
        assert!(matches!(
            Species::from_json_str(json),
            Err(EosError::MissingParameters(key)) if key == "pc"
        ));
    }

    #[test]
    fn json_round_trip() {
        let s = methane(CubicKind::PengRobinson);
        let json = s.to_json().unwrap();
        let t = Species::from_json_str(&json).unwrap();
        assert_eq!(s.record(), t.record());
        assert_eq!(t.kind(), CubicKind::PengRobinson);
        assert_eq!(s.a(250.0), t.a(250.0));
    }
}
