use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of reasons a value can fail a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationErrorType {
    TypeMismatch,

    // Combinators
    AllOfNotMet,
    AnyOfNotMet,
    OneOfNotMet,
    NotConditionViolated,

    // Objects
    RequiredPropertyMissing,
    AdditionalPropertyNotAllowed,
    MinPropertiesNotMet,
    MaxPropertiesExceeded,
    PropertyNamesInvalid,
    PropertyValueInvalid,
    PatternPropertyValueInvalid,
    UnevaluatedPropertyNotAllowed,

    // Arrays
    MinItemsNotMet,
    MaxItemsExceeded,
    UniqueItemsViolated,
    ItemInvalid,
    PrefixItemInvalid,
    UnevaluatedItemNotAllowed,

    // Strings
    MinLengthNotMet,
    MaxLengthExceeded,
    PatternMismatch,

    // Numbers
    MinimumNotMet,
    MaximumExceeded,
    ExclusiveMinimumNotMet,
    ExclusiveMaximumExceeded,
    MultipleOfInvalid,
}

impl ValidationErrorType {
    pub const ALL: [ValidationErrorType; 27] = [
        Self::TypeMismatch,
        Self::AllOfNotMet,
        Self::AnyOfNotMet,
        Self::OneOfNotMet,
        Self::NotConditionViolated,
        Self::RequiredPropertyMissing,
        Self::AdditionalPropertyNotAllowed,
        Self::MinPropertiesNotMet,
        Self::MaxPropertiesExceeded,
        Self::PropertyNamesInvalid,
        Self::PropertyValueInvalid,
        Self::PatternPropertyValueInvalid,
        Self::UnevaluatedPropertyNotAllowed,
        Self::MinItemsNotMet,
        Self::MaxItemsExceeded,
        Self::UniqueItemsViolated,
        Self::ItemInvalid,
        Self::PrefixItemInvalid,
        Self::UnevaluatedItemNotAllowed,
        Self::MinLengthNotMet,
        Self::MaxLengthExceeded,
        Self::PatternMismatch,
        Self::MinimumNotMet,
        Self::MaximumExceeded,
        Self::ExclusiveMinimumNotMet,
        Self::ExclusiveMaximumExceeded,
        Self::MultipleOfInvalid,
    ];

    /// Wire name, identical to the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "typeMismatch",
            Self::AllOfNotMet => "allOfNotMet",
            Self::AnyOfNotMet => "anyOfNotMet",
            Self::OneOfNotMet => "oneOfNotMet",
            Self::NotConditionViolated => "notConditionViolated",
            Self::RequiredPropertyMissing => "requiredPropertyMissing",
            Self::AdditionalPropertyNotAllowed => "additionalPropertyNotAllowed",
            Self::MinPropertiesNotMet => "minPropertiesNotMet",
            Self::MaxPropertiesExceeded => "maxPropertiesExceeded",
            Self::PropertyNamesInvalid => "propertyNamesInvalid",
            Self::PropertyValueInvalid => "propertyValueInvalid",
            Self::PatternPropertyValueInvalid => "patternPropertyValueInvalid",
            Self::UnevaluatedPropertyNotAllowed => "unevaluatedPropertyNotAllowed",
            Self::MinItemsNotMet => "minItemsNotMet",
            Self::MaxItemsExceeded => "maxItemsExceeded",
            Self::UniqueItemsViolated => "uniqueItemsViolated",
            Self::ItemInvalid => "itemInvalid",
            Self::PrefixItemInvalid => "prefixItemInvalid",
            Self::UnevaluatedItemNotAllowed => "unevaluatedItemNotAllowed",
            Self::MinLengthNotMet => "minLengthNotMet",
            Self::MaxLengthExceeded => "maxLengthExceeded",
            Self::PatternMismatch => "patternMismatch",
            Self::MinimumNotMet => "minimumNotMet",
            Self::MaximumExceeded => "maximumExceeded",
            Self::ExclusiveMinimumNotMet => "exclusiveMinimumNotMet",
            Self::ExclusiveMaximumExceeded => "exclusiveMaximumExceeded",
            Self::MultipleOfInvalid => "multipleOfInvalid",
        }
    }
}

impl fmt::Display for ValidationErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One violation found while validating data against a schema.
///
/// Equality covers all three fields, so two failures of the same kind at the
/// same location with the same details collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ValidationErrorType,
    /// Property names and array indices from the root to the failing value.
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorType, path: Vec<String>) -> Self {
        Self { kind, path, details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at #root", self.kind)?;
        for segment in &self.path {
            write!(f, "[{segment}]")?;
        }
        if let Some(details) = &self.details {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}

/// Deduplicated, ordered result of one validation run. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeSet<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `false` if an equal error was already recorded.
    pub fn insert(&mut self, error: ValidationError) -> bool {
        self.errors.insert(error)
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.errors.contains(error)
    }

    pub fn contains_kind(&self, kind: ValidationErrorType) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    pub fn of_kind(&self, kind: ValidationErrorType) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors.into_iter().collect()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::collections::btree_set::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::collections::btree_set::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// A schema that cannot be evaluated at all.
///
/// Schemas come from tool authors, so these are faults in the schema, not
/// outcomes of validating data.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("multipleOf must be a positive finite number, got {0}")]
    InvalidMultipleOf(f64),
}
