use super::cache::Coefficients;
use super::Delta;
use crate::RGAS;

/// Thermodynamic state of a mixture at given temperature and density.
///
/// States are created by [Mixture::state](super::Mixture::state) which validates the
/// inputs, so all properties can be evaluated without further checks. Molar
/// quantities refer to kmol, volumes to m³.
#[derive(Debug, Clone, Copy)]
pub struct CubicState {
    /// Temperature in K
    pub temperature: f64,
    /// Mass density in kg/m³
    pub density: f64,
    /// Molar volume in m³/kmol
    pub molar_volume: f64,
    /// Molar weight of the mixture in kg/kmol
    pub molarweight: f64,
    delta: Delta,
    coefficients: Coefficients,
}

/// # Pressure and its derivatives
impl CubicState {
    pub(super) fn new(
        temperature: f64,
        density: f64,
        molarweight: f64,
        delta: Delta,
        coefficients: Coefficients,
    ) -> Self {
        Self {
            temperature,
            density,
            molar_volume: molarweight / density,
            molarweight,
            delta,
            coefficients,
        }
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Denominator of the attractive term $(v+\delta_1b)(v+\delta_2b)$.
    fn q(&self) -> f64 {
        let Delta { d1, d2, .. } = self.delta;
        let v = self.molar_volume;
        v * v + (d1 + d2) * self.coefficients.b * v + d1 * d2 * self.coefficients.b2
    }

    fn dq_dv(&self) -> f64 {
        2.0 * self.molar_volume + (self.delta.d1 + self.delta.d2) * self.coefficients.b
    }

    fn repulsion_volume(&self) -> f64 {
        self.molar_volume - self.coefficients.b
    }

    /// Pressure in Pa.
    pub fn pressure(&self) -> f64 {
        RGAS * self.temperature / self.repulsion_volume() - self.coefficients.a / self.q()
    }

    pub fn dp_dv(&self) -> f64 {
        let q = self.q();
        -RGAS * self.temperature / self.repulsion_volume().powi(2)
            + self.coefficients.a * self.dq_dv() / (q * q)
    }

    pub fn dp_dt(&self) -> f64 {
        RGAS / self.repulsion_volume() - self.coefficients.da_dt / self.q()
    }

    /// Pressure derivative with respect to the mass density.
    pub fn dp_drho(&self) -> f64 {
        -self.molar_volume / self.density * self.dp_dv()
    }

    pub fn d2p_dt2(&self) -> f64 {
        -self.coefficients.d2a_dt2 / self.q()
    }

    pub fn d2p_dv2(&self) -> f64 {
        let q = self.q();
        let dq = self.dq_dv();
        2.0 * RGAS * self.temperature / self.repulsion_volume().powi(3)
            - self.coefficients.a * (2.0 * dq * dq - 2.0 * q) / q.powi(3)
    }

    pub fn d2p_dvdt(&self) -> f64 {
        let q = self.q();
        -RGAS / self.repulsion_volume().powi(2) + self.coefficients.da_dt * self.dq_dv() / (q * q)
    }
}

/// # Volume derivatives
impl CubicState {
    /// Temperature derivative of the molar volume at constant pressure.
    pub fn dv_dt(&self) -> f64 {
        -self.dp_dt() / self.dp_dv()
    }

    /// Pressure derivative of the molar volume at constant temperature.
    pub fn dv_dp(&self) -> f64 {
        self.dp_dv().recip()
    }

    /// Second temperature derivative of the molar volume at constant pressure.
    pub fn d2v_dt2(&self) -> f64 {
        let dv = self.dv_dt();
        -(self.d2p_dt2() + 2.0 * self.d2p_dvdt() * dv + self.d2p_dv2() * dv * dv) / self.dp_dv()
    }

    /// Isobaric expansion coefficient $\beta=\frac{1}{v}\left(\frac{\partial v}{\partial T}\right)_p$ in 1/K.
    pub fn isobaric_expansion(&self) -> f64 {
        self.dv_dt() / self.molar_volume
    }

    /// Isothermal compressibility $\kappa=-\frac{1}{v}\left(\frac{\partial v}{\partial p}\right)_T$ in 1/Pa.
    pub fn isothermal_compressibility(&self) -> f64 {
        -self.dv_dp() / self.molar_volume
    }

    /// Compressibility factor $Z=\frac{pv}{RT}$.
    pub fn compressibility(&self) -> f64 {
        self.pressure() * self.molar_volume / (RGAS * self.temperature)
    }

    /// Density derivative with respect to pressure at constant temperature in s²/m².
    pub fn psi(&self) -> f64 {
        -self.molarweight / (self.molar_volume.powi(2) * self.dp_dv())
    }
}

/// # Departure integrals
///
/// Integrals of the residual pressure contributions along an isotherm from the
/// ideal gas limit $v\to\infty$ to the molar volume of the state.
impl CubicState {
    /// $\int_\infty^v\frac{\mathrm{d}v'}{(v'+\delta_1b)(v'+\delta_2b)}$
    fn attraction_integral(&self) -> f64 {
        let Delta { d1, d2, d12 } = self.delta;
        let v = self.molar_volume;
        let b = self.coefficients.b;
        ((v + d2 * b) / (v + d1 * b)).ln() / (d12 * b)
    }

    fn repulsion_integral(&self) -> f64 {
        (self.repulsion_volume() / self.molar_volume).ln()
    }

    /// $\int_\infty^v\left(p-\frac{RT}{v'}\right)\mathrm{d}v'$ in J/kmol.
    pub fn integral_p_dv(&self) -> f64 {
        RGAS * self.temperature * self.repulsion_integral()
            - self.coefficients.a * self.attraction_integral()
    }

    /// $\int_\infty^v\left(\frac{\partial p}{\partial T}-\frac{R}{v'}\right)\mathrm{d}v'$ in J/(kmol K).
    pub fn integral_dpdt_dv(&self) -> f64 {
        RGAS * self.repulsion_integral() - self.coefficients.da_dt * self.attraction_integral()
    }

    /// $\int_\infty^v\frac{\partial^2p}{\partial T^2}\mathrm{d}v'$ in J/(kmol K²).
    pub fn integral_d2pdt2_dv(&self) -> f64 {
        -self.coefficients.d2a_dt2 * self.attraction_integral()
    }

    /// Residual molar internal energy in J/kmol.
    pub fn residual_internal_energy(&self) -> f64 {
        self.temperature * self.integral_dpdt_dv() - self.integral_p_dv()
    }

    /// Residual molar entropy at constant temperature and volume in J/(kmol K).
    pub fn residual_entropy(&self) -> f64 {
        self.integral_dpdt_dv()
    }

    /// Residual molar isochoric heat capacity in J/(kmol K).
    pub fn residual_isochoric_heat_capacity(&self) -> f64 {
        self.temperature * self.integral_d2pdt2_dv()
    }
}
