use super::{check_keys, Identifier, IdentifierOption};
use crate::errors::{EosError, EosResult};
use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Model specific part of a [PureRecord].
pub trait ModelRecord: Clone + Serialize + DeserializeOwned {
    /// Keys that have to be present in a serialized model record.
    const REQUIRED_KEYS: &'static [&'static str];
}

/// A collection of parameters of a pure substance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PureRecord<M> {
    #[serde(default)]
    pub identifier: Identifier,
    /// Molar weight in kg/kmol
    pub molarweight: f64,
    pub model_record: M,
}

impl<M> PureRecord<M> {
    /// Create a new `PureRecord`.
    pub fn new(identifier: Identifier, molarweight: f64, model_record: M) -> Self {
        Self {
            identifier,
            molarweight,
            model_record,
        }
    }
}

impl<M: ModelRecord> PureRecord<M> {
    /// Deserialize a record after checking that all required keys are present.
    pub fn from_value(value: Value) -> EosResult<Self> {
        check_keys(&value, &["molarweight", "model_record"])?;
        check_keys(&value["model_record"], M::REQUIRED_KEYS)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Read a single record from its json representation.
    pub fn from_json_str(json: &str) -> EosResult<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Write the record in its json representation.
    pub fn to_json(&self) -> EosResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Create pure substance parameters from a json file.
    ///
    /// The records are returned in the order of `substances`.
    pub fn from_json<P: AsRef<Path>>(
        substances: &[&str],
        file: P,
        identifier_option: IdentifierOption,
    ) -> EosResult<Vec<Self>> {
        let queried: IndexSet<&str> = substances.iter().copied().collect();
        // raise error on duplicate detection
        if queried.len() != substances.len() {
            return Err(EosError::IncompatibleParameters(
                "A substance was defined more than once.".to_string(),
            ));
        }

        let reader = BufReader::new(File::open(file)?);
        let file_records: Vec<Value> = serde_json::from_reader(reader)?;
        let mut records: IndexMap<String, Self> = IndexMap::with_capacity(queried.len());

        for value in file_records {
            let identifier: Identifier = match value.get("identifier") {
                Some(id) => serde_json::from_value(id.clone())?,
                None => continue,
            };
            if let Some(id) = identifier.as_str(identifier_option) {
                if queried.contains(id) && !records.contains_key(id) {
                    records.insert(id.to_string(), Self::from_value(value)?);
                }
            }
            // all parameters parsed
            if records.len() == queried.len() {
                break;
            }
        }

        // report missing parameters
        let missing: Vec<_> = queried
            .iter()
            .filter(|s| !records.contains_key(**s))
            .collect();
        if !missing.is_empty() {
            return Err(EosError::ComponentsNotFound(format!("{:?}", missing)));
        }

        Ok(queried
            .iter()
            .filter_map(|s| records.swap_remove(*s))
            .collect())
    }
}

impl<M: std::fmt::Display> std::fmt::Display for PureRecord<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PureRecord(")?;
        write!(f, "\n\tidentifier={},", self.identifier)?;
        write!(f, "\n\tmolarweight={},", self.molarweight)?;
        write!(f, "\n\tmodel_record={},", self.model_record)?;
        write!(f, "\n)")
    }
}

/// Binary interaction parameter of two substances.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BinaryRecord {
    /// Identifier of the first component
    pub id1: Identifier,
    /// Identifier of the second component
    pub id2: Identifier,
    /// Correction of the geometric mean of the attraction parameters
    pub k_ij: f64,
}

impl BinaryRecord {
    /// Crates a new `BinaryRecord`.
    pub fn new(id1: Identifier, id2: Identifier, k_ij: f64) -> Self {
        Self { id1, id2, k_ij }
    }

    /// Deserialize a record after checking that all required keys are present.
    pub fn from_value(value: Value) -> EosResult<Self> {
        check_keys(&value, &["id1", "id2", "k_ij"])?;
        Ok(serde_json::from_value(value)?)
    }

    /// Read a list of `BinaryRecord`s from a json file.
    pub fn from_json<P: AsRef<Path>>(file: P) -> EosResult<Vec<Self>> {
        let reader = BufReader::new(File::open(file)?);
        let values: Vec<Value> = serde_json::from_reader(reader)?;
        values.into_iter().map(Self::from_value).collect()
    }
}

impl std::fmt::Display for BinaryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BinaryRecord(id1={}, id2={}, k_ij={})",
            self.id1, self.id2, self.k_ij
        )
    }
}
