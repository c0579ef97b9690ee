//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject documents that configure nothing, such as a file caught
//!   mid-save after truncation
//! - Reject configured classes that cannot name an output file
//! - Flag level strings that will resolve by fallback
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Unknown level strings are not errors: resolution falls back to the
//!   class or global default, so they are reported separately by `lint_levels`

use std::fmt;

use crate::config::schema::{LogConfig, LogModuleConfig};
use crate::identity::ModuleClass;
use crate::level::LogLevel;

/// Longest accepted rotation period, in hours.
pub const MAX_ROTATION_HOURS: u32 = 24 * 365;

/// A semantic problem that makes a configuration unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A configured class has no output file.
    MissingFilePath(ModuleClass),
    /// A rotation period longer than a year.
    RotationTooLong { class: ModuleClass, hours: u32 },
    /// An override entry with an empty module name.
    EmptyOverrideKey(ModuleClass),
    /// Neither class names a default level or an override.
    Empty,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFilePath(class) => {
                write!(f, "log.{} sets a default level but no file_path", class_name(*class))
            }
            ValidationError::RotationTooLong { class, hours } => write!(
                f,
                "log.{}.rotation_time of {} hours exceeds {} hours",
                class_name(*class),
                hours,
                MAX_ROTATION_HOURS
            ),
            ValidationError::EmptyOverrideKey(class) => {
                write!(f, "log.{}.log_levels has an empty module name", class_name(*class))
            }
            ValidationError::Empty => {
                write!(f, "neither log.request nor log.system sets a level")
            }
        }
    }
}

/// A level string that will be replaced by a fallback at resolve time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLint {
    /// Dotted location, e.g. `log.system.log_levels.auth`.
    pub field: String,
    pub value: String,
}

fn class_name(class: ModuleClass) -> &'static str {
    match class {
        ModuleClass::System => "system",
        ModuleClass::Request => "request",
    }
}

fn sections(config: &LogConfig) -> [(ModuleClass, &LogModuleConfig); 2] {
    [
        (ModuleClass::Request, &config.log.request),
        (ModuleClass::System, &config.log.system),
    ]
}

/// Check a configuration before it is accepted.
pub fn validate_config(config: &LogConfig) -> Result<(), Vec<ValidationError>> {
    let configures_something = sections(config)
        .iter()
        .any(|(_, section)| section.is_configured() || !section.log_levels.is_empty());
    if !configures_something {
        return Err(vec![ValidationError::Empty]);
    }

    let mut errors = Vec::new();

    for (class, section) in sections(config) {
        if section.is_configured() && section.file_path.trim().is_empty() {
            errors.push(ValidationError::MissingFilePath(class));
        }
        if section.rotation_time > MAX_ROTATION_HOURS {
            errors.push(ValidationError::RotationTooLong {
                class,
                hours: section.rotation_time,
            });
        }
        if section.log_levels.keys().any(|k| k.trim().is_empty()) {
            errors.push(ValidationError::EmptyOverrideKey(class));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// List every non-empty level string that does not parse.
pub fn lint_levels(config: &LogConfig) -> Vec<LevelLint> {
    let mut lints = Vec::new();

    for (class, section) in sections(config) {
        let prefix = format!("log.{}", class_name(class));
        let mut check = |field: String, value: &str| {
            if !value.trim().is_empty() && value.parse::<LogLevel>().is_err() {
                lints.push(LevelLint {
                    field,
                    value: value.to_string(),
                });
            }
        };

        check(format!("{prefix}.log_level_default"), &section.log_level_default);
        check(format!("{prefix}.stack_trace_level"), &section.stack_trace_level);

        let mut overrides: Vec<_> = section.log_levels.iter().collect();
        overrides.sort();
        for (module, level) in overrides {
            check(format!("{prefix}.log_levels.{module}"), level);
        }
    }

    lints
}
