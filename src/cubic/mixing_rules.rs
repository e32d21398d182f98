use super::cache::Coefficients;
use super::mixture::Component;
use super::species::Species;
use crate::errors::{EosError, EosResult};
use crate::parameter::{BinaryRecord, Identifier, IdentifierOption};
use ndarray::Array2;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Smallest admissible value of the alpha function of a species.
const ALPHA_MIN: f64 = 1e-10;

/// Symmetric binary interaction parameters indexed by unordered pairs of substances.
///
/// Pairs that are not part of the table have a binary interaction parameter of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryTable {
    identifier_option: IdentifierOption,
    records: Vec<BinaryRecord>,
    map: HashMap<(String, String), f64>,
}

fn key(id1: &str, id2: &str) -> (String, String) {
    if id1 <= id2 {
        (id1.to_owned(), id2.to_owned())
    } else {
        (id2.to_owned(), id1.to_owned())
    }
}

impl BinaryTable {
    /// Create a table from binary records matched by `identifier_option`.
    pub fn new(records: Vec<BinaryRecord>, identifier_option: IdentifierOption) -> EosResult<Self> {
        let mut map = HashMap::with_capacity(records.len());
        for record in records.iter() {
            let (id1, id2) = match (
                record.id1.as_str(identifier_option),
                record.id2.as_str(identifier_option),
            ) {
                (Some(id1), Some(id2)) => (id1, id2),
                _ => {
                    return Err(EosError::MissingParameters(format!(
                        "{:?} identifier in {}",
                        identifier_option, record
                    )))
                }
            };
            if id1 == id2 {
                return Err(EosError::IncompatibleParameters(format!(
                    "binary record of {} with itself.",
                    id1
                )));
            }
            if map.insert(key(id1, id2), record.k_ij).is_some() {
                return Err(EosError::IncompatibleParameters(format!(
                    "binary record of {} and {} was defined more than once.",
                    id1, id2
                )));
            }
        }
        Ok(Self {
            identifier_option,
            records,
            map,
        })
    }

    /// Read binary records from a json file.
    pub fn from_json<P: AsRef<Path>>(
        file: P,
        identifier_option: IdentifierOption,
    ) -> EosResult<Self> {
        Self::new(BinaryRecord::from_json(file)?, identifier_option)
    }

    pub fn identifier_option(&self) -> IdentifierOption {
        self.identifier_option
    }

    pub fn records(&self) -> &[BinaryRecord] {
        &self.records
    }

    /// Binary interaction parameter of two substances; zero if the pair is not tabulated.
    pub fn k_ij(&self, id1: &Identifier, id2: &Identifier) -> f64 {
        match (
            id1.as_str(self.identifier_option),
            id2.as_str(self.identifier_option),
        ) {
            (Some(id1), Some(id2)) if id1 != id2 => {
                self.map.get(&key(id1, id2)).copied().unwrap_or(0.0)
            }
            _ => 0.0,
        }
    }

    /// Matrix of binary interaction parameters for the given substances.
    pub fn matrix(&self, identifiers: &[&Identifier]) -> Array2<f64> {
        let n = identifiers.len();
        Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                0.0
            } else {
                self.k_ij(identifiers[i], identifiers[j])
            }
        })
    }

    /// Binary records that are relevant for the given substances.
    pub(crate) fn subset(&self, identifiers: &[&Identifier]) -> Vec<BinaryRecord> {
        let ids: Vec<_> = identifiers
            .iter()
            .filter_map(|id| id.as_str(self.identifier_option))
            .collect();
        self.records
            .iter()
            .filter(|r| {
                matches!(
                    (r.id1.as_str(self.identifier_option), r.id2.as_str(self.identifier_option)),
                    (Some(id1), Some(id2)) if ids.contains(&id1) && ids.contains(&id2)
                )
            })
            .cloned()
            .collect()
    }
}

impl fmt::Display for BinaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryTable(")?;
        for record in self.records.iter() {
            write!(f, "\n\t{},", record)?;
        }
        write!(f, "\n)")
    }
}

pub(super) fn mole_fractions(components: &[Component]) -> Vec<f64> {
    let total: f64 = components.iter().map(|c| c.weight).sum();
    components.iter().map(|c| c.weight / total).collect()
}

/// Linear mixing of the covolume.
pub(super) fn covolume(components: &[Component]) -> f64 {
    components
        .iter()
        .zip(mole_fractions(components))
        .map(|(c, x)| x * c.species.b())
        .sum()
}

/// Temperature independent attraction constant $A$ with $a(T)=A/\sqrt{T}$.
///
/// Only valid for species with the Redlich-Kwong temperature dependence
/// $a_i(T)=a_{0,i}\sqrt{T_{c,i}/T}$.
pub(super) fn redlich_kwong_attraction(components: &[Component], k_ij: &Array2<f64>) -> f64 {
    let x = mole_fractions(components);
    let c: Vec<_> = components
        .iter()
        .map(|c| c.species.a0() * c.species.tc().sqrt())
        .collect();
    let mut a = 0.0;
    for i in 0..c.len() {
        for j in 0..c.len() {
            a += x[i] * x[j] * (1.0 - k_ij[(i, j)]) * (c[i] * c[j]).sqrt();
        }
    }
    a
}

/// Attraction parameter of a species and its temperature derivatives.
///
/// Fails if the alpha function vanishes, which happens for the Soave type
/// correlation at $T=T_c(1+1/n)^2$.
pub(super) fn attraction(species: &Species, temperature: f64) -> EosResult<(f64, f64, f64)> {
    let (a, da, d2a) = (
        species.a(temperature),
        species.da_dt(temperature),
        species.d2a_dt2(temperature),
    );
    let alpha = a / species.a0();
    if !(alpha >= ALPHA_MIN && a.is_finite() && da.is_finite() && d2a.is_finite()) {
        return Err(EosError::InvalidState(
            format!("attraction parameter at T = {} K", temperature),
            format!("alpha of {}", species.identifier()),
            alpha,
        ));
    }
    Ok((a, da, d2a))
}

/// One-fluid van der Waals mixing rule with analytic temperature derivatives.
pub(super) fn van_der_waals(
    components: &[Component],
    k_ij: &Array2<f64>,
    temperature: f64,
) -> EosResult<Coefficients> {
    let x = mole_fractions(components);
    let ai = components
        .iter()
        .map(|c| attraction(&c.species, temperature))
        .collect::<EosResult<Vec<_>>>()?;

    let (mut a, mut da, mut d2a) = (0.0, 0.0, 0.0);
    for (i, &(a_i, da_i, d2a_i)) in ai.iter().enumerate() {
        for (j, &(a_j, da_j, d2a_j)) in ai.iter().enumerate() {
            let f = x[i] * x[j] * (1.0 - k_ij[(i, j)]);
            let g = (a_i * a_j).sqrt();
            let h = da_i * a_j + a_i * da_j;
            a += f * g;
            da += f * h / (2.0 * g);
            d2a += f
                * ((d2a_i * a_j + 2.0 * da_i * da_j + a_i * d2a_j) / (2.0 * g)
                    - h * h / (4.0 * g.powi(3)));
        }
    }

    Ok(Coefficients::new(a, da, d2a, covolume(components)))
}
