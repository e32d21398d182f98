//! Structures to build species and mixtures from JSON parameter records.
//!
//! Parameter files are lists of [PureRecord]s and [BinaryRecord]s. Before a record is
//! deserialized, its required keys are checked so that incomplete input fails with
//! [EosError::MissingParameters] naming the missing key.
use crate::errors::{EosError, EosResult};
use serde_json::Value;

mod identifier;
mod model_record;

pub use identifier::{Identifier, IdentifierOption};
pub use model_record::{BinaryRecord, ModelRecord, PureRecord};

/// Checks that every key in `keys` is present (and not `null`) in a json object.
pub(crate) fn check_keys(value: &Value, keys: &[&str]) -> EosResult<()> {
    match keys
        .iter()
        .copied()
        .find(|key| value.get(*key).map_or(true, Value::is_null))
    {
        Some(key) => Err(EosError::MissingParameters(key.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys() {
        let value = json!({"tc": 190.6, "pc": null});
        assert!(check_keys(&value, &["tc"]).is_ok());
        assert!(matches!(
            check_keys(&value, &["tc", "pc"]),
            Err(EosError::MissingParameters(key)) if key == "pc"
        ));
        assert!(matches!(
            check_keys(&json!([1.0]), &["tc"]),
            Err(EosError::MissingParameters(key)) if key == "tc"
        ));
    }
}
