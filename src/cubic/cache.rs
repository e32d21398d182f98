use crate::errors::EosResult;

/// Mixture parameters of the cubic equation of state at a single temperature.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coefficients {
    /// attraction parameter in Pa m⁶/kmol²
    pub a: f64,
    /// first temperature derivative of the attraction parameter
    pub da_dt: f64,
    /// second temperature derivative of the attraction parameter
    pub d2a_dt2: f64,
    /// covolume in m³/kmol
    pub b: f64,
    pub b2: f64,
}

impl Coefficients {
    pub fn new(a: f64, da_dt: f64, d2a_dt2: f64, b: f64) -> Self {
        Self {
            a,
            da_dt,
            d2a_dt2,
            b,
            b2: b * b,
        }
    }
}

/// Coefficients of the last evaluated temperature.
///
/// A `temperature` of `None` marks the cache as invalid.
#[derive(Clone, Debug, Default)]
pub(crate) struct Cache {
    temperature: Option<f64>,
    coefficients: Coefficients,
    pub hit: u64,
    pub miss: u64,
}

impl Cache {
    pub fn invalidate(&mut self) {
        self.temperature = None;
    }

    pub fn get_or_insert_with<F: FnOnce() -> EosResult<Coefficients>>(
        &mut self,
        temperature: f64,
        f: F,
    ) -> EosResult<Coefficients> {
        if self.temperature == Some(temperature) {
            self.hit += 1;
            return Ok(self.coefficients);
        }
        self.miss += 1;
        let coefficients = f()?;
        self.temperature = Some(temperature);
        self.coefficients = coefficients;
        Ok(coefficients)
    }
}
