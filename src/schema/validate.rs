use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde_json::Value;

use super::error::{SchemaError, ValidationError, ValidationErrorType as Kind, ValidationErrors};
use super::model::{
    AdditionalProperties, ArraySchema, CombinedSchema, NumericBounds, ObjectSchema, SchemaMeta,
    SchemaNode, SchemaType, StringSchema,
};

/// Tolerance for `multipleOf` on `number` schemas, where `0.3 / 0.1` is
/// not exactly `3`.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// Validate `data` against `schema`, returning every violation found.
///
/// An empty result means the data conforms. Invalid data never produces an
/// `Err`; only a schema that cannot be evaluated (a malformed `pattern`, a
/// non-positive `multipleOf`) does, and it does so whatever the data.
pub fn validate(schema: &SchemaNode, data: &Value) -> Result<ValidationErrors, SchemaError> {
    let patterns = PatternCache::default();
    patterns.check(schema)?;
    let mut walk = Walk::new(&patterns, Vec::new());
    walk.node(schema, data)?;
    tracing::trace!(errors = walk.errors.len(), "schema validation finished");
    Ok(walk.errors)
}

/// Shorthand for `validate(..)?.is_empty()`.
pub fn is_valid(schema: &SchemaNode, data: &Value) -> Result<bool, SchemaError> {
    Ok(validate(schema, data)?.is_empty())
}

/// Regexes compiled during one `validate` call, keyed by source text.
#[derive(Default)]
struct PatternCache {
    compiled: RefCell<HashMap<String, Regex>>,
}

impl PatternCache {
    fn compile(&self, pattern: &str) -> Result<(), SchemaError> {
        if self.compiled.borrow().contains_key(pattern) {
            return Ok(());
        }

        let re = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.compiled.borrow_mut().insert(pattern.to_string(), re);
        Ok(())
    }

    /// Unanchored search: a match anywhere in `text` counts.
    fn is_match(&self, pattern: &str, text: &str) -> Result<bool, SchemaError> {
        self.compile(pattern)?;
        Ok(self
            .compiled
            .borrow()
            .get(pattern)
            .is_some_and(|re| re.is_match(text)))
    }

    /// Compile every pattern reachable from `schema` and check every
    /// `multipleOf`, before any data is looked at.
    fn check(&self, schema: &SchemaNode) -> Result<(), SchemaError> {
        match schema {
            SchemaNode::Object(s) => self.check_object(s)?,
            SchemaNode::Array(s) => self.check_array(s)?,
            SchemaNode::String(s) => self.check_string(s)?,
            SchemaNode::Number(s) => check_multiple_of(&s.bounds)?,
            SchemaNode::Integer(s) => check_multiple_of(&s.bounds)?,
            SchemaNode::Boolean(_) | SchemaNode::Null(_) => {}
            SchemaNode::Combined(s) => {
                if let Some(object) = &s.object {
                    self.check_object(object)?;
                }
                if let Some(array) = &s.array {
                    self.check_array(array)?;
                }
                if let Some(string) = &s.string {
                    self.check_string(string)?;
                }
                if let Some(bounds) = &s.numeric {
                    check_multiple_of(bounds)?;
                }
            }
        }

        self.check_branches(schema.meta())
    }

    fn check_branches(&self, meta: &SchemaMeta) -> Result<(), SchemaError> {
        for branch in [&meta.all_of, &meta.any_of, &meta.one_of, &meta.not]
            .into_iter()
            .flatten()
            .flatten()
        {
            self.check(branch)?;
        }
        Ok(())
    }

    fn check_object(&self, schema: &ObjectSchema) -> Result<(), SchemaError> {
        for property in schema.properties.iter().flat_map(|p| p.values()) {
            self.check(property)?;
        }
        for (pattern, property) in schema.pattern_properties.iter().flatten() {
            self.compile(pattern)?;
            self.check(property)?;
        }
        if let Some(AdditionalProperties::Schema(extra)) = &schema.additional_properties {
            self.check(extra)?;
        }
        if let Some(names) = &schema.property_names {
            self.check_string(names)?;
            self.check_branches(&names.meta)?;
        }
        Ok(())
    }

    fn check_array(&self, schema: &ArraySchema) -> Result<(), SchemaError> {
        for item in schema.prefix_items.iter().flatten() {
            self.check(item)?;
        }
        if let Some(items) = &schema.items {
            self.check(items)?;
        }
        Ok(())
    }

    fn check_string(&self, schema: &StringSchema) -> Result<(), SchemaError> {
        if let Some(pattern) = &schema.pattern {
            self.compile(pattern)?;
        }
        Ok(())
    }
}

fn check_multiple_of(bounds: &NumericBounds) -> Result<(), SchemaError> {
    match bounds.multiple_of {
        Some(divisor) if !(divisor.is_finite() && divisor > 0.0) => {
            Err(SchemaError::InvalidMultipleOf(divisor))
        }
        _ => Ok(()),
    }
}

/// State of one traversal: the current location and the failures so far.
struct Walk<'p> {
    patterns: &'p PatternCache,
    path: Vec<String>,
    errors: ValidationErrors,
}

impl<'p> Walk<'p> {
    fn new(patterns: &'p PatternCache, path: Vec<String>) -> Self {
        Self {
            patterns,
            path,
            errors: ValidationErrors::new(),
        }
    }

    fn fail(&mut self, kind: Kind, details: Option<String>) {
        self.errors.insert(ValidationError {
            kind,
            path: self.path.clone(),
            details,
        });
    }

    /// Record a failure one segment below the current location.
    fn fail_at(&mut self, segment: &str, kind: Kind, details: String) {
        let mut path = self.path.clone();
        path.push(segment.to_string());
        self.errors.insert(ValidationError {
            kind,
            path,
            details: Some(details),
        });
    }

    fn type_mismatch(&mut self, expected: SchemaType, data: &Value) {
        self.fail(
            Kind::TypeMismatch,
            Some(format!("expected {expected}, got {}", json_type_name(data))),
        );
    }

    /// Run `f` one segment deeper. The segment is popped whatever `f`
    /// returns, so sibling validations never see it.
    fn at_segment<F>(&mut self, segment: &str, f: F) -> Result<(), SchemaError>
    where
        F: FnOnce(&mut Self) -> Result<(), SchemaError>,
    {
        self.path.push(segment.to_string());
        let result = f(self);
        self.path.pop();
        result
    }

    /// Validate into a fresh collector at the current location.
    fn branch(&self, schema: &SchemaNode, data: &Value) -> Result<ValidationErrors, SchemaError> {
        let mut walk = Walk::new(self.patterns, self.path.clone());
        walk.node(schema, data)?;
        Ok(walk.errors)
    }

    fn passes(&self, schema: &SchemaNode, data: &Value) -> Result<bool, SchemaError> {
        Ok(self.branch(schema, data)?.is_empty())
    }

    /// Validate a nested value, keeping its failures and adding a `summary`
    /// error at the current location when there are any.
    fn nested(
        &mut self,
        summary: Kind,
        schema: &SchemaNode,
        data: &Value,
    ) -> Result<(), SchemaError> {
        let found = self.branch(schema, data)?;
        if !found.is_empty() {
            self.errors.extend(found);
            self.fail(summary, None);
        }
        Ok(())
    }

    fn node(&mut self, schema: &SchemaNode, data: &Value) -> Result<(), SchemaError> {
        match schema {
            SchemaNode::Object(s) => self.object(s, data)?,
            SchemaNode::Array(s) => self.array(s, data)?,
            SchemaNode::String(s) => self.string(s, data)?,
            SchemaNode::Number(s) => match data.as_f64() {
                Some(value) => self.bounds(&s.bounds, value, false)?,
                None => self.type_mismatch(SchemaType::Number, data),
            },
            SchemaNode::Integer(s) => match integer_value(data) {
                Some(value) => self.bounds(&s.bounds, value, true)?,
                None => self.type_mismatch(SchemaType::Integer, data),
            },
            SchemaNode::Boolean(_) => {
                if !data.is_boolean() {
                    self.type_mismatch(SchemaType::Boolean, data);
                }
            }
            SchemaNode::Null(_) => {
                if !data.is_null() {
                    self.type_mismatch(SchemaType::Null, data);
                }
            }
            SchemaNode::Combined(s) => self.untyped(s, data)?,
        }

        self.combinators(schema, data)
    }

    /// Keyword groups of a node without `type` apply only to data of the
    /// kind they describe; other data passes them.
    fn untyped(&mut self, schema: &CombinedSchema, data: &Value) -> Result<(), SchemaError> {
        match data {
            Value::Object(_) => {
                if let Some(object) = &schema.object {
                    self.object(object, data)?;
                }
            }
            Value::Array(_) => {
                if let Some(array) = &schema.array {
                    self.array(array, data)?;
                }
            }
            Value::String(_) => {
                if let Some(string) = &schema.string {
                    self.string(string, data)?;
                }
            }
            Value::Number(n) => {
                if let (Some(bounds), Some(value)) = (&schema.numeric, n.as_f64()) {
                    self.bounds(bounds, value, false)?;
                }
            }
            Value::Null | Value::Bool(_) => {}
        }
        Ok(())
    }

    fn object(&mut self, schema: &ObjectSchema, data: &Value) -> Result<(), SchemaError> {
        let Some(map) = data.as_object() else {
            self.type_mismatch(SchemaType::Object, data);
            return Ok(());
        };

        if let Some(min) = schema.min_properties {
            if map.len() < min {
                self.fail(
                    Kind::MinPropertiesNotMet,
                    Some(format!("object has {} properties, minimum is {min}", map.len())),
                );
            }
        }
        if let Some(max) = schema.max_properties {
            if map.len() > max {
                self.fail(
                    Kind::MaxPropertiesExceeded,
                    Some(format!("object has {} properties, maximum is {max}", map.len())),
                );
            }
        }

        for name in schema.required.iter().flatten() {
            if !map.contains_key(name) {
                self.fail(
                    Kind::RequiredPropertyMissing,
                    Some(format!("required property \"{name}\" is missing")),
                );
            }
        }

        let mut evaluated: HashSet<&str> = HashSet::new();

        for (name, property) in schema.properties.iter().flatten() {
            if let Some(value) = map.get(name) {
                evaluated.insert(name);
                self.at_segment(name, |w| w.nested(Kind::PropertyValueInvalid, property, value))?;
            }
        }

        for (pattern, property) in schema.pattern_properties.iter().flatten() {
            for (key, value) in map {
                if self.patterns.is_match(pattern, key)? {
                    evaluated.insert(key);
                    self.at_segment(key, |w| {
                        w.nested(Kind::PatternPropertyValueInvalid, property, value)
                    })?;
                }
            }
        }

        if let Some(names) = &schema.property_names {
            let names = SchemaNode::String((**names).clone());
            for key in map.keys() {
                let candidate = Value::String(key.clone());
                self.at_segment(key, |w| {
                    if !w.passes(&names, &candidate)? {
                        w.fail(
                            Kind::PropertyNamesInvalid,
                            Some(format!(
                                "property name \"{key}\" is not allowed by propertyNames"
                            )),
                        );
                    }
                    Ok(())
                })?;
            }
        }

        for (key, value) in map {
            if evaluated.contains(key.as_str()) {
                continue;
            }
            match &schema.additional_properties {
                Some(AdditionalProperties::Allowed(true)) => {}
                Some(AdditionalProperties::Allowed(false)) => self.fail_at(
                    key,
                    Kind::AdditionalPropertyNotAllowed,
                    format!("additional property \"{key}\" is not allowed"),
                ),
                Some(AdditionalProperties::Schema(extra)) => {
                    self.at_segment(key, |w| {
                        w.nested(Kind::AdditionalPropertyNotAllowed, extra, value)
                    })?;
                }
                None => {
                    if schema.unevaluated_properties == Some(false) {
                        self.fail_at(
                            key,
                            Kind::UnevaluatedPropertyNotAllowed,
                            format!("unevaluated property \"{key}\" is not allowed"),
                        );
                    }
                }
            }
        }

        Ok(())
    }

    fn array(&mut self, schema: &ArraySchema, data: &Value) -> Result<(), SchemaError> {
        let Some(items) = data.as_array() else {
            self.type_mismatch(SchemaType::Array, data);
            return Ok(());
        };

        if let Some(min) = schema.min_items {
            if items.len() < min {
                self.fail(
                    Kind::MinItemsNotMet,
                    Some(format!("list has {} items, minimum is {min}", items.len())),
                );
            }
        }
        if let Some(max) = schema.max_items {
            if items.len() > max {
                self.fail(
                    Kind::MaxItemsExceeded,
                    Some(format!("list has {} items, maximum is {max}", items.len())),
                );
            }
        }

        if schema.unique_items == Some(true) {
            let duplicates = duplicate_values(items);
            if !duplicates.is_empty() {
                let listed: Vec<String> = duplicates.iter().map(|v| v.to_string()).collect();
                self.fail(
                    Kind::UniqueItemsViolated,
                    Some(format!("list contains duplicate items: {}", listed.join(", "))),
                );
            }
        }

        let prefix = schema.prefix_items.as_deref().unwrap_or(&[]);
        for (index, (item_schema, value)) in prefix.iter().zip(items).enumerate() {
            self.at_segment(&index.to_string(), |w| {
                w.nested(Kind::PrefixItemInvalid, item_schema, value)
            })?;
        }

        match &schema.items {
            Some(item_schema) => {
                for (index, value) in items.iter().enumerate().skip(prefix.len()) {
                    self.at_segment(&index.to_string(), |w| {
                        w.nested(Kind::ItemInvalid, item_schema, value)
                    })?;
                }
            }
            // Only the first unevaluated index is reported.
            None if schema.unevaluated_items == Some(false) && items.len() > prefix.len() => {
                let index = prefix.len();
                self.fail_at(
                    &index.to_string(),
                    Kind::UnevaluatedItemNotAllowed,
                    format!("unevaluated item at index {index} is not allowed"),
                );
            }
            None => {}
        }

        Ok(())
    }

    fn string(&mut self, schema: &StringSchema, data: &Value) -> Result<(), SchemaError> {
        let Some(text) = data.as_str() else {
            self.type_mismatch(SchemaType::String, data);
            return Ok(());
        };

        let length = text.chars().count();
        if let Some(min) = schema.min_length {
            if length < min {
                self.fail(
                    Kind::MinLengthNotMet,
                    Some(format!("string has length {length}, minimum is {min}")),
                );
            }
        }
        if let Some(max) = schema.max_length {
            if length > max {
                self.fail(
                    Kind::MaxLengthExceeded,
                    Some(format!("string has length {length}, maximum is {max}")),
                );
            }
        }

        if let Some(pattern) = &schema.pattern {
            if !self.patterns.is_match(pattern, text)? {
                self.fail(
                    Kind::PatternMismatch,
                    Some(format!("string does not match pattern \"{pattern}\"")),
                );
            }
        }

        Ok(())
    }

    /// Range checks shared by `number` and `integer`; `exact` selects exact
    /// rather than epsilon divisibility for `multipleOf`.
    fn bounds(
        &mut self,
        bounds: &NumericBounds,
        value: f64,
        exact: bool,
    ) -> Result<(), SchemaError> {
        if let Some(min) = bounds.minimum {
            if value < min {
                self.fail(Kind::MinimumNotMet, Some(format!("{value} is less than {min}")));
            }
        }
        if let Some(max) = bounds.maximum {
            if value > max {
                self.fail(Kind::MaximumExceeded, Some(format!("{value} is greater than {max}")));
            }
        }
        if let Some(min) = bounds.exclusive_minimum {
            if value <= min {
                self.fail(
                    Kind::ExclusiveMinimumNotMet,
                    Some(format!("{value} is not greater than {min}")),
                );
            }
        }
        if let Some(max) = bounds.exclusive_maximum {
            if value >= max {
                self.fail(
                    Kind::ExclusiveMaximumExceeded,
                    Some(format!("{value} is not less than {max}")),
                );
            }
        }

        check_multiple_of(bounds)?;
        if let Some(divisor) = bounds.multiple_of {
            let divisible = if exact {
                value % divisor == 0.0
            } else {
                let quotient = value / divisor;
                (quotient - quotient.round()).abs() <= MULTIPLE_OF_EPSILON
            };
            if !divisible {
                self.fail(
                    Kind::MultipleOfInvalid,
                    Some(format!("{value} is not a multiple of {divisor}")),
                );
            }
        }

        Ok(())
    }

    /// Every combinator is checked against the node's direct constraints
    /// merged with the branch, so base keywords bind inside each branch.
    fn combinators(&mut self, schema: &SchemaNode, data: &Value) -> Result<(), SchemaError> {
        let meta = schema.meta();
        if !meta.has_combinators() {
            return Ok(());
        }

        if let Some(all_of) = &meta.all_of {
            let mut failures = ValidationErrors::new();
            for branch in all_of {
                failures.extend(self.branch(&schema.merged_with(branch), data)?);
            }
            if !failures.is_empty() {
                self.fail(Kind::AllOfNotMet, None);
                self.errors.extend(failures);
            }
        }

        if let Some(any_of) = &meta.any_of {
            let mut matched = false;
            for branch in any_of {
                if self.passes(&schema.merged_with(branch), data)? {
                    matched = true;
                    break;
                }
            }
            if !matched {
                self.fail(
                    Kind::AnyOfNotMet,
                    Some(format!("value matched none of {} schemas", any_of.len())),
                );
            }
        }

        if let Some(one_of) = &meta.one_of {
            let mut matched = 0usize;
            for branch in one_of {
                if self.passes(&schema.merged_with(branch), data)? {
                    matched += 1;
                }
            }
            if matched != 1 {
                self.fail(
                    Kind::OneOfNotMet,
                    Some(format!(
                        "value matched {matched} of {} schemas, expected exactly 1",
                        one_of.len()
                    )),
                );
            }
        }

        if let Some(not) = &meta.not {
            for branch in not {
                if self.passes(&schema.merged_with(branch), data)? {
                    self.fail(
                        Kind::NotConditionViolated,
                        Some("value matched a schema it must not match".to_string()),
                    );
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Integral numbers, including floats with no fractional part.
fn integer_value(data: &Value) -> Option<f64> {
    match data {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0),
        _ => None,
    }
}

/// Values occurring more than once, each listed once in first-seen order.
fn duplicate_values(items: &[Value]) -> Vec<&Value> {
    let mut duplicates: Vec<&Value> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let repeated = items[..i].iter().any(|earlier| json_equal(earlier, item));
        if repeated && !duplicates.iter().any(|seen| json_equal(seen, item)) {
            duplicates.push(item);
        }
    }
    duplicates
}

/// JSON value equality where `1` and `1.0` are the same number.
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, x)| y.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
