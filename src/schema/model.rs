use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::wire::WireSchema;

/// Primitive type named by a schema's `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys every schema node may carry regardless of its type.
///
/// An absent combinator list is different from an empty one: `anyOf: []`
/// can never be satisfied, while a missing `anyOf` imposes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub all_of: Option<Vec<SchemaNode>>,
    pub any_of: Option<Vec<SchemaNode>>,
    pub one_of: Option<Vec<SchemaNode>>,
    pub not: Option<Vec<SchemaNode>>,
}

impl SchemaMeta {
    pub fn has_combinators(&self) -> bool {
        self.all_of.is_some()
            || self.any_of.is_some()
            || self.one_of.is_some()
            || self.not.is_some()
    }

    fn clear_combinators(&mut self) {
        self.all_of = None;
        self.any_of = None;
        self.one_of = None;
        self.not = None;
    }
}

/// A node of the schema tree.
///
/// Nodes are plain immutable values once built; validation only borrows
/// them, so one schema may be shared across threads and calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSchema", into = "WireSchema")]
pub enum SchemaNode {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(StringSchema),
    Number(NumberSchema),
    Integer(IntegerSchema),
    Boolean(BooleanSchema),
    Null(NullSchema),
    /// No `type` key. Per-type keywords apply only to data of their kind.
    Combined(CombinedSchema),
}

impl SchemaNode {
    /// A schema that accepts every value (`{}` on the wire).
    pub fn any() -> Self {
        Self::Combined(CombinedSchema::default())
    }

    pub fn meta(&self) -> &SchemaMeta {
        match self {
            Self::Object(s) => &s.meta,
            Self::Array(s) => &s.meta,
            Self::String(s) => &s.meta,
            Self::Number(s) => &s.meta,
            Self::Integer(s) => &s.meta,
            Self::Boolean(s) => &s.meta,
            Self::Null(s) => &s.meta,
            Self::Combined(s) => &s.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut SchemaMeta {
        match self {
            Self::Object(s) => &mut s.meta,
            Self::Array(s) => &mut s.meta,
            Self::String(s) => &mut s.meta,
            Self::Number(s) => &mut s.meta,
            Self::Integer(s) => &mut s.meta,
            Self::Boolean(s) => &mut s.meta,
            Self::Null(s) => &mut s.meta,
            Self::Combined(s) => &mut s.meta,
        }
    }

    /// The declared primitive type, `None` for untyped nodes.
    pub fn schema_type(&self) -> Option<SchemaType> {
        match self {
            Self::Object(_) => Some(SchemaType::Object),
            Self::Array(_) => Some(SchemaType::Array),
            Self::String(_) => Some(SchemaType::String),
            Self::Number(_) => Some(SchemaType::Number),
            Self::Integer(_) => Some(SchemaType::Integer),
            Self::Boolean(_) => Some(SchemaType::Boolean),
            Self::Null(_) => Some(SchemaType::Null),
            Self::Combined(_) => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.meta().title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.meta().description.as_deref()
    }

    pub fn has_combinators(&self) -> bool {
        self.meta().has_combinators()
    }

    /// Copy of this node with `allOf`, `anyOf`, `oneOf` and `not` removed.
    pub fn without_combinators(&self) -> SchemaNode {
        let mut base = self.clone();
        base.meta_mut().clear_combinators();
        base
    }

    /// Layer `overlay` on top of this node's combinator-free base.
    ///
    /// Every key the overlay sets replaces the base's value for that key;
    /// keys the overlay leaves absent are inherited. The overlay's own
    /// combinators are kept. When both declare a `type` the overlay's type
    /// wins, and base keys that do not apply to that type are dropped.
    pub fn merged_with(&self, overlay: &SchemaNode) -> SchemaNode {
        let base = WireSchema::from(self.without_combinators());
        let top = WireSchema::from(overlay.clone());
        SchemaNode::from(base.overlay(top))
    }
}

impl Default for SchemaNode {
    fn default() -> Self {
        Self::any()
    }
}

/// `additionalProperties` is either a flat allow/deny or a schema that
/// undeclared property values must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaNode>),
}

impl From<bool> for AdditionalProperties {
    fn from(allowed: bool) -> Self {
        Self::Allowed(allowed)
    }
}

impl From<SchemaNode> for AdditionalProperties {
    fn from(schema: SchemaNode) -> Self {
        Self::Schema(Box::new(schema))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub meta: SchemaMeta,
    pub properties: Option<BTreeMap<String, SchemaNode>>,
    /// Keyed by regex source; a key matches when the pattern is found
    /// anywhere in the property name.
    pub pattern_properties: Option<BTreeMap<String, SchemaNode>>,
    pub required: Option<Vec<String>>,
    pub additional_properties: Option<AdditionalProperties>,
    pub unevaluated_properties: Option<bool>,
    pub property_names: Option<Box<StringSchema>>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}

impl ObjectSchema {
    pub fn property(mut self, name: impl Into<String>, schema: impl Into<SchemaNode>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), schema.into());
        self
    }

    pub fn pattern_property(
        mut self,
        pattern: impl Into<String>,
        schema: impl Into<SchemaNode>,
    ) -> Self {
        self.pattern_properties
            .get_or_insert_with(BTreeMap::new)
            .insert(pattern.into(), schema.into());
        self
    }

    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let required = self.required.get_or_insert_with(Vec::new);
        for name in names {
            let name = name.into();
            if !required.contains(&name) {
                required.push(name);
            }
        }
        self
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(AdditionalProperties::Allowed(allowed));
        self
    }

    pub fn additional_properties_schema(mut self, schema: impl Into<SchemaNode>) -> Self {
        self.additional_properties = Some(AdditionalProperties::Schema(Box::new(schema.into())));
        self
    }

    pub fn unevaluated_properties(mut self, allowed: bool) -> Self {
        self.unevaluated_properties = Some(allowed);
        self
    }

    pub fn property_names(mut self, schema: StringSchema) -> Self {
        self.property_names = Some(Box::new(schema));
        self
    }

    pub fn min_properties(mut self, n: usize) -> Self {
        self.min_properties = Some(n);
        self
    }

    pub fn max_properties(mut self, n: usize) -> Self {
        self.max_properties = Some(n);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    pub meta: SchemaMeta,
    /// Applies to every element past the end of `prefix_items`.
    pub items: Option<Box<SchemaNode>>,
    pub prefix_items: Option<Vec<SchemaNode>>,
    pub unevaluated_items: Option<bool>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: Option<bool>,
}

impl ArraySchema {
    pub fn items(mut self, schema: impl Into<SchemaNode>) -> Self {
        self.items = Some(Box::new(schema.into()));
        self
    }

    pub fn prefix_items<I>(mut self, schemas: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SchemaNode>,
    {
        self.prefix_items = Some(schemas.into_iter().map(Into::into).collect());
        self
    }

    pub fn unevaluated_items(mut self, allowed: bool) -> Self {
        self.unevaluated_items = Some(allowed);
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn unique_items(mut self, unique: bool) -> Self {
        self.unique_items = Some(unique);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub meta: SchemaMeta,
    /// Lengths count Unicode scalar values, not bytes.
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
}

impl StringSchema {
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// Range and divisibility constraints shared by `number` and `integer`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericBounds {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    pub meta: SchemaMeta,
    pub bounds: NumericBounds,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerSchema {
    pub meta: SchemaMeta,
    pub bounds: NumericBounds,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanSchema {
    pub meta: SchemaMeta,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NullSchema {
    pub meta: SchemaMeta,
}

/// A node without `type`.
///
/// Per-type keywords it carries are grouped by the kind of data they
/// describe. Each group applies only when the data is of that kind, and all
/// of them are layered over the base when the node is a combinator branch.
/// The `meta` of the grouped schemas is unused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedSchema {
    pub meta: SchemaMeta,
    pub object: Option<Box<ObjectSchema>>,
    pub array: Option<Box<ArraySchema>>,
    pub string: Option<Box<StringSchema>>,
    pub numeric: Option<NumericBounds>,
}

impl CombinedSchema {
    pub fn object_keywords(mut self, keywords: ObjectSchema) -> Self {
        self.object = Some(Box::new(keywords));
        self
    }

    pub fn array_keywords(mut self, keywords: ArraySchema) -> Self {
        self.array = Some(Box::new(keywords));
        self
    }

    pub fn string_keywords(mut self, keywords: StringSchema) -> Self {
        self.string = Some(Box::new(keywords));
        self
    }

    pub fn numeric_keywords(mut self, bounds: NumericBounds) -> Self {
        self.numeric = Some(bounds);
        self
    }
}

macro_rules! numeric_builders {
    ($($ty:ident),+) => {$(
        impl $ty {
            pub fn minimum(mut self, value: f64) -> Self {
                self.bounds.minimum = Some(value);
                self
            }

            pub fn maximum(mut self, value: f64) -> Self {
                self.bounds.maximum = Some(value);
                self
            }

            pub fn exclusive_minimum(mut self, value: f64) -> Self {
                self.bounds.exclusive_minimum = Some(value);
                self
            }

            pub fn exclusive_maximum(mut self, value: f64) -> Self {
                self.bounds.exclusive_maximum = Some(value);
                self
            }

            pub fn multiple_of(mut self, value: f64) -> Self {
                self.bounds.multiple_of = Some(value);
                self
            }
        }
    )+};
}

numeric_builders!(NumberSchema, IntegerSchema);

macro_rules! meta_builders {
    ($($ty:ident => $variant:ident),+ $(,)?) => {$(
        impl $ty {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn title(mut self, title: impl Into<String>) -> Self {
                self.meta.title = Some(title.into());
                self
            }

            pub fn description(mut self, description: impl Into<String>) -> Self {
                self.meta.description = Some(description.into());
                self
            }

            pub fn all_of<I>(mut self, schemas: I) -> Self
            where
                I: IntoIterator,
                I::Item: Into<SchemaNode>,
            {
                self.meta.all_of = Some(schemas.into_iter().map(Into::into).collect());
                self
            }

            pub fn any_of<I>(mut self, schemas: I) -> Self
            where
                I: IntoIterator,
                I::Item: Into<SchemaNode>,
            {
                self.meta.any_of = Some(schemas.into_iter().map(Into::into).collect());
                self
            }

            pub fn one_of<I>(mut self, schemas: I) -> Self
            where
                I: IntoIterator,
                I::Item: Into<SchemaNode>,
            {
                self.meta.one_of = Some(schemas.into_iter().map(Into::into).collect());
                self
            }

            pub fn not<I>(mut self, schemas: I) -> Self
            where
                I: IntoIterator,
                I::Item: Into<SchemaNode>,
            {
                self.meta.not = Some(schemas.into_iter().map(Into::into).collect());
                self
            }
        }

        impl From<$ty> for SchemaNode {
            fn from(schema: $ty) -> Self {
                SchemaNode::$variant(schema)
            }
        }
    )+};
}

meta_builders!(
    ObjectSchema => Object,
    ArraySchema => Array,
    StringSchema => String,
    NumberSchema => Number,
    IntegerSchema => Integer,
    BooleanSchema => Boolean,
    NullSchema => Null,
    CombinedSchema => Combined,
);
