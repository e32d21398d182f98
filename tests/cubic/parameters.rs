use realgas::parameter::{Identifier, IdentifierOption, PureRecord};
use realgas::{
    BinaryTable, CubicKind, CubicRecord, EosError, Mixture, MixtureBuilder, MixtureRecord,
    Species,
};
use std::error::Error;
use std::sync::Arc;

const PARAMETERS: &str = "tests/cubic/test_parameters.json";
const BINARY: &str = "tests/cubic/test_binary.json";

#[test]
fn species_from_json() -> Result<(), Box<dyn Error>> {
    let species = Species::from_json(&["propane", "methane"], PARAMETERS, IdentifierOption::Name)?;
    assert_eq!(species.len(), 2);
    assert_eq!(species[0].identifier().name.as_deref(), Some("propane"));
    assert_eq!(species[1].identifier().name.as_deref(), Some("methane"));
    assert_eq!(species[1].tc(), 190.6);
    assert_eq!(species[1].kind(), CubicKind::SoaveRedlichKwong);

    let by_cas = Species::from_json(&["124-38-9"], PARAMETERS, IdentifierOption::Cas)?;
    assert_eq!(by_cas[0].molarweight(), 44.01);

    let pr = Species::from_json(&["methane_pr"], PARAMETERS, IdentifierOption::Name)?;
    assert_eq!(pr[0].kind(), CubicKind::PengRobinson);
    assert!(pr[0].b() < species[1].b());
    Ok(())
}

#[test]
fn missing_components() {
    let result = Species::from_json(&["methane", "helium"], PARAMETERS, IdentifierOption::Name);
    assert!(matches!(result, Err(EosError::ComponentsNotFound(s)) if s.contains("helium")));

    let result = Species::from_json(&["methane", "methane"], PARAMETERS, IdentifierOption::Name);
    assert!(matches!(result, Err(EosError::IncompatibleParameters(_))));

    let result = Species::from_json(&["methane"], "tests/cubic/missing.json", IdentifierOption::Name);
    assert!(matches!(result, Err(EosError::FileIO(_))));
}

#[test]
fn missing_keys() {
    let result = Species::from_json(&["incomplete"], PARAMETERS, IdentifierOption::Name);
    assert!(matches!(result, Err(EosError::MissingParameters(key)) if key == "pc"));

    let result = Species::from_json_str(r#"{"molarweight": 16.043, "model_record": {"tc": 190.6, "pc": }}"#);
    assert!(matches!(result, Err(EosError::Serde(_))));
}

#[test]
fn binary_table_from_json() -> Result<(), Box<dyn Error>> {
    let table = BinaryTable::from_json(BINARY, IdentifierOption::Name)?;
    assert_eq!(table.records().len(), 4);
    let methane = Identifier::from_name("methane");
    let nitrogen = Identifier::from_name("nitrogen");
    let ethane = Identifier::from_name("ethane");
    assert_eq!(table.k_ij(&methane, &nitrogen), 0.0311);
    assert_eq!(table.k_ij(&nitrogen, &methane), 0.0311);
    assert_eq!(table.k_ij(&nitrogen, &ethane), 0.0);

    // identifiers that are not part of the records
    let cas_table = BinaryTable::from_json(BINARY, IdentifierOption::Cas);
    assert!(matches!(cas_table, Err(EosError::MissingParameters(_))));
    Ok(())
}

#[test]
fn mixture_record_round_trip() -> Result<(), Box<dyn Error>> {
    let species = Species::from_json(
        &["methane", "ethane", "propane", "carbon dioxide"],
        PARAMETERS,
        IdentifierOption::Name,
    )?;
    let table = Arc::new(BinaryTable::from_json(BINARY, IdentifierOption::Name)?);
    let mut builder = MixtureBuilder::new(species[0].clone(), 0.85);
    for (s, x) in species[1..].iter().zip([0.08, 0.04, 0.03]) {
        builder = builder.add_component(s.clone(), x);
    }
    let mixture = builder.binary_table(table).build()?;

    let json = mixture.to_record().to_json()?;
    let record = MixtureRecord::from_json_str(&json)?;
    // methane is part of every tabulated pair, nitrogen is not in the mixture
    assert_eq!(record.binary_records.len(), 3);
    let restored = Mixture::from_record(record)?;
    assert_eq!(restored.components(), 4);
    assert_eq!(restored.k_ij(), mixture.k_ij());
    assert_eq!(restored.coefficients(280.0)?, mixture.coefficients(280.0)?);
    Ok(())
}

#[test]
fn record_with_literal_parameters() -> Result<(), Box<dyn Error>> {
    let json = r#"{
        "identifier": {"name": "methane"},
        "molarweight": 16.043,
        "model_record": {
            "tc": 190.6,
            "pc": 4600000.0,
            "acentric_factor": 0.008,
            "kind": "redlich_kwong",
            "b": 0.0298,
            "rho_max": 450.0
        }
    }"#;
    let record: PureRecord<CubicRecord> = PureRecord::from_json_str(json)?;
    assert_eq!(record.model_record.kind, CubicKind::RedlichKwong);
    let species = Species::new(record)?;
    assert_eq!(species.b(), 0.0298);
    assert_eq!(species.density_bounds().1, 450.0);
    assert_eq!(species.a(species.tc()), species.a0());
    Ok(())
}
