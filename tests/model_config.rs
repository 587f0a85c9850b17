//! Round-trip and validation tests for the group-model configuration file.
use fmriflow::error::ConfigError;
use fmriflow::model_config::{field_spec, FieldKind, FieldValue, ModelConfig, MODEL_FIELDS};
use std::fs;

fn str_value(s: &str) -> FieldValue {
    FieldValue::Str(s.to_string())
}

fn str_list(items: &[&str]) -> FieldValue {
    FieldValue::StrList(items.iter().map(|s| s.to_string()).collect())
}

/// A configuration that passes `validate`.
fn valid_config() -> ModelConfig {
    let mut config = ModelConfig::new();
    config
        .set("subjectListFile", str_value("/data/subjects.txt"))
        .unwrap();
    config
        .set("phenotypicFile", str_value("/data/phenotypes.csv"))
        .unwrap();
    config.set("subjectColumn", str_value("subject_id")).unwrap();
    config
        .set("columnsInModel", str_list(&["age", "diagnosis"]))
        .unwrap();
    config
        .set("categoricalVsDirectional", FieldValue::NumList(vec![0, 1]))
        .unwrap();
    config
        .set("deMean", FieldValue::NumList(vec![1, 0]))
        .unwrap();
    config
        .set("contrastFile", str_value("/data/contrasts.csv"))
        .unwrap();
    config
        .set("modelGroupVariancesSeparately", FieldValue::Num(0))
        .unwrap();
    config.set("groupingVariable", str_value("None")).unwrap();
    config.set("modelName", str_value("group_model")).unwrap();
    config
        .set("outputModelFilesDirectory", str_value("/out/models"))
        .unwrap();
    config
}

#[test]
fn test_schema_declares_every_field_once() {
    assert_eq!(MODEL_FIELDS.len(), 12);
    for spec in &MODEL_FIELDS {
        assert!(field_spec(spec.name).is_some());
        assert!(!spec.help.is_empty());
    }
    assert!(field_spec("numberOfSubjects").is_none());
}

#[test]
fn test_set_rejects_kind_mismatches() {
    let mut config = ModelConfig::new();
    assert!(matches!(
        config.set("subjectListFile", FieldValue::Num(3)),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        config.set("columnsInModel", str_value("age")),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        config.set("madeUpField", str_value("x")),
        Err(ConfigError::UnknownField { .. })
    ));
    // Choice fields only accept their declared codes.
    assert!(matches!(
        config.set("modelGroupVariancesSeparately", FieldValue::Num(2)),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_choice_fields_display_their_label() {
    let mut config = ModelConfig::new();
    config
        .set("modelGroupVariancesSeparately", FieldValue::Num(1))
        .unwrap();
    assert_eq!(
        config.display_value("modelGroupVariancesSeparately"),
        Some("On".to_string())
    );
    config
        .set("modelGroupVariancesSeparately", FieldValue::Num(0))
        .unwrap();
    assert_eq!(
        config.display_value("modelGroupVariancesSeparately"),
        Some("Off".to_string())
    );
    // On disk the code is persisted, not the label.
    let written = config.write_to_string();
    assert!(written.contains("modelGroupVariancesSeparately : 0"));
}

#[test]
fn test_write_then_parse_round_trips() {
    let config = valid_config();
    let written = config.write_to_string();

    // Help text precedes every assignment as comment lines.
    assert!(written.contains("# Specify a name for the new model."));
    assert!(written.contains("columnsInModel : ['age', 'diagnosis']"));
    assert!(written.contains("deMean : [1, 0]"));

    let parsed = ModelConfig::parse(&written).unwrap();
    for spec in &MODEL_FIELDS {
        assert_eq!(parsed.get(spec.name), config.get(spec.name), "{}", spec.name);
    }
    parsed.validate().unwrap();
}

#[test]
fn test_parse_accepts_hand_written_variants() {
    let text = "\
# subjects
subjectListFile : /data/subjects.txt
columnsInModel : age, diagnosis
modelGroupVariancesSeparately : On
";
    let config = ModelConfig::parse(text).unwrap();
    assert_eq!(
        config.get("columnsInModel"),
        Some(&str_list(&["age", "diagnosis"]))
    );
    assert_eq!(
        config.get("modelGroupVariancesSeparately"),
        Some(&FieldValue::Num(1))
    );
}

#[test]
fn test_parse_reports_bad_lines() {
    assert!(matches!(
        ModelConfig::parse("subjectListFile = /data/subjects.txt"),
        Err(ConfigError::MalformedLine { line: 1 })
    ));
    assert!(matches!(
        ModelConfig::parse("# fine\nnoSuchField : 3"),
        Err(ConfigError::UnknownField { .. })
    ));
    assert!(matches!(
        ModelConfig::parse("deMean : [1, x]"),
        Err(ConfigError::InvalidValue { .. })
    ));
    // An assignment with no value leaves the field unset.
    let config = ModelConfig::parse("modelName :").unwrap();
    assert_eq!(config.get("modelName"), None);
}

#[test]
fn test_validate_requires_columns_first() {
    let config = ModelConfig::new();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyField { ref field }) if field == "columnsInModel"
    ));
}

#[test]
fn test_validate_requires_every_required_field() {
    let mut config = valid_config();
    config.set("modelName", str_value("")).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyField { ref field }) if field == "modelName"
    ));
}

#[test]
fn test_validate_rejects_non_binary_flags() {
    let mut config = valid_config();
    config
        .set("categoricalVsDirectional", FieldValue::NumList(vec![0, 2]))
        .unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::BinaryFlagOutOfRange { ref field, value: 2 })
            if field == "categoricalVsDirectional"
    ));
}

#[test]
fn test_validate_rejects_mismatched_flag_lengths() {
    let mut config = valid_config();
    config
        .set("deMean", FieldValue::NumList(vec![1]))
        .unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::LengthMismatch { expected: 2, found: 1, .. })
    ));
}

#[test]
fn test_grouping_variable_rules() {
    // Enabling separate group variances makes the grouping variable required.
    let mut config = valid_config();
    config
        .set("modelGroupVariancesSeparately", FieldValue::Num(1))
        .unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyField { ref field }) if field == "groupingVariable"
    ));

    // And it must name one of the model's EV columns.
    config.set("groupingVariable", str_value("site")).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidGroupingVariable { ref variable }) if variable == "site"
    ));

    config
        .set("groupingVariable", str_value("diagnosis"))
        .unwrap();
    config.validate().unwrap();
}

#[test]
fn test_validate_paths_checks_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let subjects = dir.path().join("subjects.txt");
    fs::write(&subjects, "sub-01\n").unwrap();

    let mut config = ModelConfig::new();
    config
        .set("subjectListFile", str_value(subjects.to_str().unwrap()))
        .unwrap();
    config.validate_paths().unwrap();

    config
        .set(
            "phenotypicFile",
            str_value(dir.path().join("missing.csv").to_str().unwrap()),
        )
        .unwrap();
    assert!(matches!(
        config.validate_paths(),
        Err(ConfigError::MissingPath { ref field, .. }) if field == "phenotypicFile"
    ));

    // Bare names are not path-checked.
    let mut bare = ModelConfig::new();
    bare.set("contrastFile", str_value("contrasts.csv")).unwrap();
    bare.validate_paths().unwrap();
}

#[test]
fn test_field_kind_lookup() {
    assert_eq!(field_spec("columnsInModel").unwrap().kind, FieldKind::TextList);
    assert!(matches!(
        field_spec("modelGroupVariancesSeparately").unwrap().kind,
        FieldKind::Choice(_)
    ));
    assert!(!field_spec("groupingVariable").unwrap().required);
}
