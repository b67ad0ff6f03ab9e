//! Tests for converter configuration loading.

use std::collections::HashMap;

use arvak_qmap::second_q::FermionicOp;
use arvak_qmap::{ConfigError, ConverterConfig, MapperKind, Z2Reduction};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[test]
fn yaml_document() {
    let config = ConverterConfig::from_yaml_str(
        "mapper: parity\ntwo_qubit_reduction: true\nz2symmetry_reduction: auto\n",
    )
    .unwrap();
    assert_eq!(config.mapper, MapperKind::Parity);
    assert!(config.two_qubit_reduction);
    assert_eq!(config.z2symmetry_reduction, Z2Reduction::Auto);
}

#[test]
fn yaml_defaults_for_missing_fields() {
    let config = ConverterConfig::from_yaml_str("mapper: bravyi_kitaev\n").unwrap();
    assert_eq!(config.mapper, MapperKind::BravyiKitaev);
    assert!(!config.two_qubit_reduction);
    assert_eq!(config.z2symmetry_reduction, Z2Reduction::None);
}

#[test]
fn json_document_with_fixed_sector() {
    let config = ConverterConfig::from_json_str(
        r#"{"mapper": "jordan_wigner", "z2symmetry_reduction": {"sector": [1, -1, 1]}}"#,
    )
    .unwrap();
    assert_eq!(
        config.z2symmetry_reduction,
        Z2Reduction::Sector(vec![1, -1, 1])
    );
}

#[test]
fn out_of_range_sector_value_is_a_validation_error() {
    let json = ConverterConfig::from_json_str(r#"{"z2symmetry_reduction": {"sector": [-128]}}"#);
    assert!(matches!(json, Err(ConfigError::ValidationError(_))));
    let yaml = ConverterConfig::from_yaml_str("z2symmetry_reduction: !sector [1, -128]\n");
    assert!(matches!(yaml, Err(ConfigError::ValidationError(_))));
    let zero = ConverterConfig::from_json_str(r#"{"z2symmetry_reduction": {"sector": [0]}}"#);
    assert!(matches!(zero, Err(ConfigError::ValidationError(_))));
}

#[test]
fn unknown_mapper_is_a_parse_error() {
    let result = ConverterConfig::from_yaml_str("mapper: superfast\n");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn invalid_combination_is_a_validation_error() {
    let result = ConverterConfig::from_json_str(
        r#"{"mapper": "jordan_wigner", "two_qubit_reduction": true}"#,
    );
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = dir.path().join("converter.yaml");
    let json = dir.path().join("converter.json");
    std::fs::write(&yaml, "mapper: direct\n").unwrap();
    std::fs::write(&json, r#"{"mapper": "parity", "two_qubit_reduction": true}"#).unwrap();

    assert_eq!(ConverterConfig::from_file(&yaml).unwrap().mapper, MapperKind::Direct);
    let from_json = ConverterConfig::from_file(&json).unwrap();
    assert_eq!(from_json.mapper, MapperKind::Parity);
    assert!(from_json.two_qubit_reduction);

    let missing = ConverterConfig::from_file(dir.path().join("absent.yaml"));
    assert!(matches!(missing, Err(ConfigError::IoError(_))));
}

#[test]
fn load_without_file_uses_defaults() {
    // no ARVAK_QMAP_* variables are set by the test harness
    if std::env::vars().any(|(k, _)| k.starts_with("ARVAK_QMAP_")) {
        return;
    }
    assert_eq!(ConverterConfig::load(None).unwrap(), ConverterConfig::default());
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[test]
fn overrides_replace_document_values() {
    let config = ConverterConfig::from_yaml_str("mapper: jordan_wigner\n")
        .unwrap()
        .merge_from(lookup(&[
            ("ARVAK_QMAP_MAPPER", "parity"),
            ("ARVAK_QMAP_TWO_QUBIT_REDUCTION", "true"),
            ("ARVAK_QMAP_Z2_REDUCTION", "-1,1"),
        ]));
    assert_eq!(config.mapper, MapperKind::Parity);
    assert!(config.two_qubit_reduction);
    assert_eq!(config.z2symmetry_reduction, Z2Reduction::Sector(vec![-1, 1]));
    assert!(config.validate().is_ok());
}

#[test]
fn unparseable_overrides_are_ignored() {
    let config = ConverterConfig::default().merge_from(lookup(&[
        ("ARVAK_QMAP_MAPPER", "nonsense"),
        ("ARVAK_QMAP_TWO_QUBIT_REDUCTION", "maybe"),
    ]));
    assert_eq!(config, ConverterConfig::default());
}

// ---------------------------------------------------------------------------
// Built mappers
// ---------------------------------------------------------------------------

#[test]
fn built_converter_reduces_register() {
    let mapper = ConverterConfig {
        mapper: MapperKind::Parity,
        two_qubit_reduction: true,
        z2symmetry_reduction: Z2Reduction::None,
    }
    .build()
    .unwrap();
    let hints = arvak_qmap::ReductionHints {
        num_particles: Some((1, 1)),
        sector_locator: None,
    };
    let reduced = mapper
        .map_main(&FermionicOp::particle_number(4).into(), hints)
        .unwrap();
    assert_eq!(reduced.num_qubits(), 2);
}
