//! The FSL group-model setup file.
//!
//! A line-oriented `key : value` format: each declared field is written with
//! its help text as `#` comment lines above the assignment. String lists are
//! bracketed, numeric flags are bare, and choice fields persist their numeric
//! code while the user-facing surface shows a display label (`On`/`Off`).
//! Parsing round-trips everything the writer emits.

use crate::error::ConfigError;
use ahash::AHashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Declared type of a configuration field, mirroring the persisted format's
/// per-field value syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A bare string (paths, names).
    Text,
    /// A comma-separated list of strings, bracketed on disk.
    TextList,
    /// A bracketed list of integers.
    NumberList,
    /// A numeric code with display labels, e.g. `[("Off", 0), ("On", 1)]`.
    Choice(&'static [(&'static str, i64)]),
}

/// One declared field of the model configuration schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub help: &'static str,
    /// Whether path-like values of this field should exist on disk.
    pub check_path: bool,
    pub required: bool,
}

const ON_OFF: &[(&str, i64)] = &[("Off", 0), ("On", 1)];

/// The model configuration schema, in file order.
pub const MODEL_FIELDS: [FieldSpec; 12] = [
    FieldSpec {
        name: "subjectListFile",
        label: "Subject List",
        kind: FieldKind::Text,
        help: "Full path to a list of subjects to be included in the model.\nThis should be a text file with one subject per line.",
        check_path: true,
        required: true,
    },
    FieldSpec {
        name: "phenotypicFile",
        label: "EV File",
        kind: FieldKind::Text,
        help: "Full path to a .csv file containing EV information for each subject.",
        check_path: true,
        required: true,
    },
    FieldSpec {
        name: "subjectColumn",
        label: "Subjects Column Name",
        kind: FieldKind::Text,
        help: "Name of the subjects column in your EV file.",
        check_path: false,
        required: true,
    },
    FieldSpec {
        name: "columnsInModel",
        label: "EVs to Include",
        kind: FieldKind::TextList,
        help: "Specify the names of columns in your EV file that you would like to include in this model.\nColumn names should be separated by commas and appear exactly as they do in your EV file.",
        check_path: false,
        required: true,
    },
    FieldSpec {
        name: "categoricalVsDirectional",
        label: "EV Type",
        kind: FieldKind::NumberList,
        help: "Specify whether each of the EVs in this model should be treated as categorical or continuous.\nPlace a 1 (categorical) or 0 (continuous) in the same list position as the corresponding EV.",
        check_path: false,
        required: true,
    },
    FieldSpec {
        name: "deMean",
        label: "Demean",
        kind: FieldKind::NumberList,
        help: "Specify whether to demean each of the EVs in this model.\nPlace a 1 (demean) or 0 (don't demean) in the same list position as the corresponding EV.\nNote that only continuous EV's should be demeaned.",
        check_path: false,
        required: true,
    },
    FieldSpec {
        name: "contrastFile",
        label: "Contrast File",
        kind: FieldKind::Text,
        help: "Full path to a .csv file containing contrasts to be applied to this model.",
        check_path: true,
        required: true,
    },
    FieldSpec {
        name: "modelGroupVariancesSeparately",
        label: "Model Group Variances Separately",
        kind: FieldKind::Choice(ON_OFF),
        help: "Specify whether FSL should model the variance for each group separately.\nIf this option is enabled, you must specify a grouping variable below.",
        check_path: false,
        required: true,
    },
    FieldSpec {
        name: "groupingVariable",
        label: "Grouping Variable",
        kind: FieldKind::Text,
        help: "The name of the EV that should be used to group subjects when modeling variances.\nIf you do not wish to model group variances separately, set this value to None.",
        check_path: false,
        required: false,
    },
    FieldSpec {
        name: "modelName",
        label: "Model Name",
        kind: FieldKind::Text,
        help: "Specify a name for the new model.",
        check_path: false,
        required: true,
    },
    FieldSpec {
        name: "outputModelFilesDirectory",
        label: "Output Directory",
        kind: FieldKind::Text,
        help: "Full path to the directory where model files should be placed.",
        check_path: true,
        required: true,
    },
    FieldSpec {
        name: "outputModelFile",
        label: "Model CSV File Name",
        kind: FieldKind::Text,
        help: "In addition to the standard FSL model files, a .csv containing the subjects and EVs specified above will be written.",
        check_path: false,
        required: false,
    },
];

/// Looks up a declared field by name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    MODEL_FIELDS.iter().find(|f| f.name == name)
}

/// A typed value assigned to a configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Num(i64),
    StrList(Vec<String>),
    NumList(Vec<i64>),
}

impl FieldValue {
    fn render(&self) -> String {
        match self {
            FieldValue::Str(s) => s.clone(),
            FieldValue::Num(n) => n.to_string(),
            FieldValue::StrList(items) => {
                let quoted: Vec<String> = items.iter().map(|s| format!("'{}'", s)).collect();
                format!("[{}]", quoted.join(", "))
            }
            FieldValue::NumList(items) => {
                let rendered: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            FieldValue::Str(s) => s.trim().is_empty(),
            FieldValue::Num(_) => false,
            FieldValue::StrList(items) => items.is_empty(),
            FieldValue::NumList(items) => items.is_empty(),
        }
    }
}

/// An in-memory model configuration: assignments for the declared fields.
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    values: AHashMap<String, FieldValue>,
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a value, checking it against the field's declared kind.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigError> {
        let spec = field_spec(name).ok_or_else(|| ConfigError::UnknownField {
            field: name.to_string(),
        })?;
        let compatible = matches!(
            (spec.kind, &value),
            (FieldKind::Text, FieldValue::Str(_))
                | (FieldKind::TextList, FieldValue::StrList(_))
                | (FieldKind::NumberList, FieldValue::NumList(_))
                | (FieldKind::Choice(_), FieldValue::Num(_))
        );
        if !compatible {
            return Err(ConfigError::InvalidValue {
                field: name.to_string(),
                value: value.render(),
                expected: kind_name(spec.kind),
            });
        }
        if let (FieldKind::Choice(choices), FieldValue::Num(n)) = (spec.kind, &value) {
            if !choices.iter().any(|(_, code)| code == n) {
                return Err(ConfigError::InvalidValue {
                    field: name.to_string(),
                    value: n.to_string(),
                    expected: "one of the declared choice codes",
                });
            }
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// The user-facing rendering of a field: choice codes become their
    /// display labels, everything else renders as written to disk.
    pub fn display_value(&self, name: &str) -> Option<String> {
        let value = self.values.get(name)?;
        if let (Some(spec), FieldValue::Num(n)) = (field_spec(name), value) {
            if let FieldKind::Choice(choices) = spec.kind {
                if let Some((label, _)) = choices.iter().find(|(_, code)| code == n) {
                    return Some(label.to_string());
                }
            }
        }
        Some(value.render())
    }

    /// Serializes the configuration: per field, its help text as comment
    /// lines followed by the `name : value` assignment.
    pub fn write_to_string(&self) -> String {
        let mut out = String::new();
        for spec in &MODEL_FIELDS {
            for line in spec.help.lines() {
                writeln!(&mut out, "# {}", line).unwrap();
            }
            let rendered = self
                .values
                .get(spec.name)
                .map(|v| v.render())
                .unwrap_or_default();
            writeln!(&mut out, "{} : {}", spec.name, rendered).unwrap();
            out.push('\n');
        }
        out
    }

    /// Parses a configuration written by [`write_to_string`], or by hand in
    /// the same format. Assignments with empty values are treated as unset.
    ///
    /// [`write_to_string`]: ModelConfig::write_to_string
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        for (index, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, raw_value) =
                line.split_once(':')
                    .ok_or(ConfigError::MalformedLine { line: index + 1 })?;
            let name = name.trim();
            let spec = field_spec(name).ok_or_else(|| ConfigError::UnknownField {
                field: name.to_string(),
            })?;
            let raw_value = raw_value.trim();
            if raw_value.is_empty() {
                continue;
            }
            let value = parse_value(spec, raw_value)?;
            config.set(name, value)?;
        }
        Ok(config)
    }

    /// Checks the assignments against the schema's consistency rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let columns = match self.get("columnsInModel") {
            Some(FieldValue::StrList(columns)) if !columns.is_empty() => columns.clone(),
            _ => {
                return Err(ConfigError::EmptyField {
                    field: "columnsInModel".to_string(),
                });
            }
        };

        for spec in &MODEL_FIELDS {
            if !spec.required {
                continue;
            }
            match self.values.get(spec.name) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    return Err(ConfigError::EmptyField {
                        field: spec.name.to_string(),
                    });
                }
            }
        }

        for field in ["categoricalVsDirectional", "deMean"] {
            if let Some(FieldValue::NumList(flags)) = self.get(field) {
                for flag in flags {
                    if *flag != 0 && *flag != 1 {
                        return Err(ConfigError::BinaryFlagOutOfRange {
                            field: field.to_string(),
                            value: *flag,
                        });
                    }
                }
                if flags.len() != columns.len() {
                    return Err(ConfigError::LengthMismatch {
                        field: field.to_string(),
                        expected: columns.len(),
                        found: flags.len(),
                    });
                }
            }
        }

        if self.get("modelGroupVariancesSeparately") == Some(&FieldValue::Num(1)) {
            let variable = match self.get("groupingVariable") {
                Some(FieldValue::Str(s)) if !s.trim().is_empty() && s != "None" => s.clone(),
                _ => {
                    return Err(ConfigError::EmptyField {
                        field: "groupingVariable".to_string(),
                    });
                }
            };
            if !columns.contains(&variable) {
                return Err(ConfigError::InvalidGroupingVariable { variable });
            }
        }

        Ok(())
    }

    /// Checks that every path-like value of a path-checked field exists.
    /// Kept separate from [`validate`] because it touches the filesystem.
    ///
    /// [`validate`]: ModelConfig::validate
    pub fn validate_paths(&self) -> Result<(), ConfigError> {
        for spec in MODEL_FIELDS.iter().filter(|s| s.check_path) {
            if let Some(FieldValue::Str(value)) = self.get(spec.name) {
                if value.contains('/') && !Path::new(value).exists() {
                    return Err(ConfigError::MissingPath {
                        field: spec.name.to_string(),
                        path: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "a string",
        FieldKind::TextList => "a list of strings",
        FieldKind::NumberList => "a list of integers",
        FieldKind::Choice(_) => "a choice code",
    }
}

fn parse_value(spec: &FieldSpec, raw: &str) -> Result<FieldValue, ConfigError> {
    let invalid = |value: &str| ConfigError::InvalidValue {
        field: spec.name.to_string(),
        value: value.to_string(),
        expected: kind_name(spec.kind),
    };

    match spec.kind {
        FieldKind::Text => Ok(FieldValue::Str(unquote(raw).to_string())),
        FieldKind::TextList => Ok(FieldValue::StrList(
            split_list(raw)
                .map(|item| unquote(item).to_string())
                .collect(),
        )),
        FieldKind::NumberList => split_list(raw)
            .map(|item| item.parse::<i64>().map_err(|_| invalid(item)))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::NumList),
        FieldKind::Choice(choices) => {
            if let Ok(code) = raw.parse::<i64>() {
                if choices.iter().any(|(_, c)| *c == code) {
                    return Ok(FieldValue::Num(code));
                }
            }
            // Accept a display label in place of its code.
            choices
                .iter()
                .find(|(label, _)| *label == raw)
                .map(|(_, code)| FieldValue::Num(*code))
                .ok_or_else(|| invalid(raw))
        }
    }
}

/// Splits `[a, b]` or a bare `a, b` into trimmed, non-empty items.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| {
            trimmed
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
        })
        .unwrap_or(trimmed)
}
