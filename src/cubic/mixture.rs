use super::cache::{Cache, Coefficients};
use super::mixing_rules::{self, BinaryTable};
use super::properties::CubicState;
use super::species::{CubicRecord, Species};
use super::CubicKind;
use crate::density_iteration::{density_iteration, DensityIteration, SolverOptions, Verbosity};
use crate::errors::{EosError, EosResult};
use crate::parameter::{BinaryRecord, Identifier, IdentifierOption, PureRecord};
use crate::{P_STD, RGAS, T_STD};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A species together with its molar amount in a mixture.
#[derive(Debug, Clone)]
pub(crate) struct Component {
    pub species: Arc<Species>,
    pub weight: f64,
}

impl Component {
    pub fn new(species: Arc<Species>, weight: f64) -> Self {
        Self { species, weight }
    }
}

/// Mixture of species described by the same cubic equation of state.
///
/// The attraction parameter and its temperature derivatives are cached for the
/// temperature of the last evaluation. The cache is invalidated whenever the
/// composition changes.
#[derive(Debug)]
pub struct Mixture {
    components: Vec<Component>,
    binary: Option<Arc<BinaryTable>>,
    k_ij: Array2<f64>,
    kind: CubicKind,
    b: f64,
    rho_min: f64,
    rho_max: f64,
    redlich_kwong_attraction: Option<f64>,
    cache: Mutex<Cache>,
}

impl Clone for Mixture {
    fn clone(&self) -> Self {
        let cache = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self {
            components: self.components.clone(),
            binary: self.binary.clone(),
            k_ij: self.k_ij.clone(),
            kind: self.kind,
            b: self.b,
            rho_min: self.rho_min,
            rho_max: self.rho_max,
            redlich_kwong_attraction: self.redlich_kwong_attraction,
            cache: Mutex::new(cache),
        }
    }
}

fn positive_amount(amount: f64) -> EosResult<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(EosError::InvalidState(
            String::from("mixture composition"),
            String::from("molar amount"),
            amount,
        ))
    }
}

/// # Construction and composition
impl Mixture {
    /// Mixture that only consists of a single species.
    pub fn pure(species: Arc<Species>) -> Self {
        let (rho_min, rho_max) = species.density_bounds();
        let mut mixture = Self {
            kind: species.kind(),
            b: species.b(),
            components: vec![Component::new(species, 1.0)],
            binary: None,
            k_ij: Array2::zeros((1, 1)),
            rho_min,
            rho_max,
            redlich_kwong_attraction: None,
            cache: Mutex::new(Cache::default()),
        };
        mixture.composition_changed();
        mixture
    }

    /// Start building a mixture from its first species.
    pub fn builder(species: Arc<Species>, molar_amount: f64) -> MixtureBuilder {
        MixtureBuilder::new(species, molar_amount)
    }

    /// Append all components of `other` to this mixture.
    ///
    /// Binary interaction parameters of `other` are adopted if this mixture has none.
    pub fn accumulate(&mut self, other: &Mixture) -> EosResult<()> {
        if other.kind != self.kind {
            return Err(EosError::IncompatibleParameters(format!(
                "cannot mix species of the {} and the {} equation of state.",
                self.kind, other.kind
            )));
        }
        self.components.extend(other.components.iter().cloned());
        if self.binary.is_none() {
            self.binary.clone_from(&other.binary);
        }
        self.composition_changed();
        Ok(())
    }

    /// Multiply the molar amount of the most recently added component by `factor`.
    pub fn rescale(&mut self, factor: f64) -> EosResult<()> {
        let factor = positive_amount(factor)?;
        if let Some(last) = self.components.last_mut() {
            last.weight *= factor;
        }
        self.composition_changed();
        Ok(())
    }

    /// Use the binary interaction parameters of `table` for all pairs of components.
    pub fn set_binary_table(&mut self, table: Arc<BinaryTable>) {
        self.binary = Some(table);
        self.composition_changed();
    }

    fn composition_changed(&mut self) {
        let identifiers: Vec<_> = self
            .components
            .iter()
            .map(|c| c.species.identifier())
            .collect();
        let n = identifiers.len();
        self.k_ij = match &self.binary {
            Some(binary) => binary.matrix(&identifiers),
            None => Array2::zeros((n, n)),
        };
        self.b = mixing_rules::covolume(&self.components);
        self.rho_min = self
            .components
            .iter()
            .map(|c| c.species.density_bounds().0)
            .fold(f64::INFINITY, f64::min);
        self.rho_max = self
            .components
            .iter()
            .map(|c| c.species.density_bounds().1)
            .fold(0.0, f64::max);
        self.redlich_kwong_attraction = if self.kind.temperature_dependent_mixing() {
            None
        } else {
            Some(mixing_rules::redlich_kwong_attraction(
                &self.components,
                &self.k_ij,
            ))
        };
        self.cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .invalidate();
    }
}

/// # Mixture parameters
impl Mixture {
    /// Number of components.
    pub fn components(&self) -> usize {
        self.components.len()
    }

    pub fn species(&self) -> impl Iterator<Item = &Arc<Species>> {
        self.components.iter().map(|c| &c.species)
    }

    pub fn molar_amounts(&self) -> Array1<f64> {
        self.components.iter().map(|c| c.weight).collect()
    }

    pub fn molefracs(&self) -> Array1<f64> {
        Array1::from_vec(mixing_rules::mole_fractions(&self.components))
    }

    pub fn kind(&self) -> CubicKind {
        self.kind
    }

    pub fn binary_table(&self) -> Option<&Arc<BinaryTable>> {
        self.binary.as_ref()
    }

    pub fn k_ij(&self) -> &Array2<f64> {
        &self.k_ij
    }

    /// Molar weight of the mixture in kg/kmol.
    pub fn molarweight(&self) -> f64 {
        self.components
            .iter()
            .zip(mixing_rules::mole_fractions(&self.components))
            .map(|(c, x)| x * c.species.molarweight())
            .sum()
    }

    /// Specific gas constant in J/(kg K).
    pub fn specific_gas_constant(&self) -> f64 {
        RGAS / self.molarweight()
    }

    /// Covolume of the mixture in m³/kmol.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Bounds of the density iteration in kg/m³.
    ///
    /// The upper bound stays below the singular density $M/b$.
    pub fn density_bounds(&self) -> (f64, f64) {
        let rho_max = self.rho_max.min(0.99 * self.molarweight() / self.b);
        (self.rho_min.min(rho_max), rho_max)
    }

    /// Attraction and covolume parameters at the given temperature.
    pub fn coefficients(&self, temperature: f64) -> EosResult<Coefficients> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(EosError::InvalidState(
                String::from("mixture coefficients"),
                String::from("temperature"),
                temperature,
            ));
        }
        if let [component] = self.components.as_slice() {
            let (a, da_dt, d2a_dt2) = mixing_rules::attraction(&component.species, temperature)?;
            return Ok(Coefficients::new(a, da_dt, d2a_dt2, self.b));
        }
        if let Some(attraction) = self.redlich_kwong_attraction {
            let a = attraction / temperature.sqrt();
            let t2 = temperature * temperature;
            return Ok(Coefficients::new(a, -0.5 * a / temperature, 0.75 * a / t2, self.b));
        }
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(temperature, || {
                mixing_rules::van_der_waals(&self.components, &self.k_ij, temperature)
            })
    }

    /// Number of evaluations of the temperature dependent mixing rule.
    pub fn mixing_evaluations(&self) -> u64 {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).miss
    }

    /// Number of coefficient requests answered by the cache.
    pub fn cache_hits(&self) -> u64 {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).hit
    }
}

/// # States and densities
impl Mixture {
    /// Thermodynamic state at given mass density in kg/m³ and temperature in K.
    pub fn state(&self, density: f64, temperature: f64) -> EosResult<CubicState> {
        if !(density.is_finite() && density > 0.0) {
            return Err(EosError::InvalidState(
                String::from("Mixture::state"),
                String::from("density"),
                density,
            ));
        }
        let coefficients = self.coefficients(temperature)?;
        let molarweight = self.molarweight();
        let molar_volume = molarweight / density;
        if molar_volume <= coefficients.b {
            return Err(EosError::InvalidState(
                String::from("Mixture::state"),
                String::from("molar volume"),
                molar_volume,
            ));
        }
        Ok(CubicState::new(
            temperature,
            density,
            molarweight,
            self.kind.delta(),
            coefficients,
        ))
    }

    /// Density iteration with explicit solver options.
    pub fn density_iteration(
        &self,
        pressure: f64,
        temperature: f64,
        initial_density: f64,
        options: SolverOptions,
    ) -> EosResult<DensityIteration> {
        density_iteration(self, pressure, temperature, initial_density, options)
    }

    /// Mass density in kg/m³ at given pressure and temperature.
    ///
    /// The root closest to `initial_density` is returned, which may be the mechanically
    /// unstable one for seeds between the spinodals. If the iteration does not converge,
    /// the failure is reported and the best estimate is returned.
    pub fn rho(&self, pressure: f64, temperature: f64, initial_density: f64) -> EosResult<f64> {
        let iteration =
            self.density_iteration(pressure, temperature, initial_density, SolverOptions::default())?;
        if !iteration.converged {
            log_result!(
                Verbosity::Result,
                "Mixture::rho: no convergence at p = {} Pa, T = {} K after {} step(s)",
                pressure,
                temperature,
                iteration.iterations
            );
        }
        Ok(iteration.density)
    }

    /// Mass density in kg/m³ seeded with the ideal gas density.
    pub fn rho_ideal_gas_seeded(&self, pressure: f64, temperature: f64) -> EosResult<f64> {
        let initial_density = pressure / (self.specific_gas_constant() * temperature);
        self.rho(pressure, temperature, initial_density)
    }

    /// Compressibility factor $Z=\frac{p}{\rho R_sT}$ at given pressure and temperature.
    pub fn z(&self, pressure: f64, temperature: f64, initial_density: f64) -> EosResult<f64> {
        let rho = self.rho(pressure, temperature, initial_density)?;
        Ok(pressure / (rho * self.specific_gas_constant() * temperature))
    }

    /// Mass density at standard conditions (1 bar, 298.15 K) in kg/m³.
    pub fn density_std(&self) -> EosResult<f64> {
        self.rho_ideal_gas_seeded(P_STD, T_STD)
    }
}

/// # Serialization
impl Mixture {
    pub fn to_record(&self) -> MixtureRecord {
        let components = self
            .components
            .iter()
            .map(|c| ComponentRecord {
                pure_record: c.species.record().clone(),
                molar_amount: c.weight,
            })
            .collect();
        let (identifier_option, binary_records) = match &self.binary {
            Some(binary) => {
                let identifiers: Vec<&Identifier> = self
                    .components
                    .iter()
                    .map(|c| c.species.identifier())
                    .collect();
                (binary.identifier_option(), binary.subset(&identifiers))
            }
            None => (IdentifierOption::default(), Vec::new()),
        };
        MixtureRecord {
            components,
            identifier_option,
            binary_records,
        }
    }

    pub fn from_record(record: MixtureRecord) -> EosResult<Self> {
        let mut components = record.components.into_iter();
        let first = components.next().ok_or_else(|| {
            EosError::MissingParameters(String::from("components of the mixture"))
        })?;
        let mut builder = MixtureBuilder::new(
            Arc::new(Species::new(first.pure_record)?),
            first.molar_amount,
        );
        for c in components {
            builder = builder.add_component(Arc::new(Species::new(c.pure_record)?), c.molar_amount);
        }
        if !record.binary_records.is_empty() {
            let table = BinaryTable::new(record.binary_records, record.identifier_option)?;
            builder = builder.binary_table(Arc::new(table));
        }
        builder.build()
    }
}

impl fmt::Display for Mixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mixture({}", self.kind)?;
        for (c, x) in self
            .components
            .iter()
            .zip(mixing_rules::mole_fractions(&self.components))
        {
            write!(f, "\n\t{}: x={},", c.species.identifier(), x)?;
        }
        if self.binary.is_some() {
            write!(f, "\nk_ij:\n{}", self.k_ij)?;
        }
        write!(f, "\n)")
    }
}

/// Builder for mixtures of several species.
///
/// # Examples
///
/// ```
/// # use realgas::{CubicRecord, MixtureBuilder, Species};
/// # use realgas::parameter::{Identifier, PureRecord};
/// # use std::sync::Arc;
/// let methane = PureRecord::new(Identifier::from_name("methane"), 16.043, CubicRecord::new(190.6, 4.6e6, 0.008));
/// let ethane = PureRecord::new(Identifier::from_name("ethane"), 30.07, CubicRecord::new(305.32, 4.872e6, 0.099));
/// let mixture = MixtureBuilder::new(Arc::new(Species::new(methane)?), 0.9)
///     .add_component(Arc::new(Species::new(ethane)?), 0.1)
///     .build()?;
/// assert_eq!(mixture.components(), 2);
/// assert!((mixture.molarweight() - 17.4457).abs() < 1e-10);
/// # Ok::<(), realgas::EosError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MixtureBuilder {
    components: Vec<Component>,
    binary: Option<Arc<BinaryTable>>,
}

impl MixtureBuilder {
    pub fn new(species: Arc<Species>, molar_amount: f64) -> Self {
        Self {
            components: vec![Component::new(species, molar_amount)],
            binary: None,
        }
    }

    pub fn add_component(mut self, species: Arc<Species>, molar_amount: f64) -> Self {
        self.components.push(Component::new(species, molar_amount));
        self
    }

    pub fn binary_table(mut self, table: Arc<BinaryTable>) -> Self {
        self.binary = Some(table);
        self
    }

    pub fn build(self) -> EosResult<Mixture> {
        let mut components = self.components.into_iter();
        let first = components.next().ok_or_else(|| {
            EosError::MissingParameters(String::from("components of the mixture"))
        })?;
        let mut mixture = Mixture::pure(first.species);
        mixture.rescale(first.weight)?;
        for c in components {
            let mut other = Mixture::pure(c.species);
            other.rescale(c.weight)?;
            mixture.accumulate(&other)?;
        }
        if let Some(binary) = self.binary {
            mixture.set_binary_table(binary);
        }
        Ok(mixture)
    }
}

/// A pure substance record with its molar amount in a mixture.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComponentRecord {
    pub pure_record: PureRecord<CubicRecord>,
    pub molar_amount: f64,
}

/// Serializable description of a [Mixture].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MixtureRecord {
    pub components: Vec<ComponentRecord>,
    #[serde(default)]
    pub identifier_option: IdentifierOption,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binary_records: Vec<BinaryRecord>,
}

impl MixtureRecord {
    pub fn from_json_str(json: &str) -> EosResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> EosResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
