//! Flat wire shape of a schema node.
//!
//! Every supported keyword sits side by side under its JSON name, the way
//! tool definitions carry `inputSchema`. `SchemaNode` converts to and from
//! this shape. A declared `type` keeps only the keywords of that type; a
//! node without one keeps every keyword, grouped by the kind of data it
//! describes.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::model::{
    AdditionalProperties, ArraySchema, BooleanSchema, CombinedSchema, IntegerSchema, NullSchema,
    NumberSchema, NumericBounds, ObjectSchema, SchemaMeta, SchemaNode, SchemaType, StringSchema,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct WireSchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<BTreeMap<String, SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern_properties: Option<BTreeMap<String, SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_properties: Option<AdditionalProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unevaluated_properties: Option<bool>,
    /// Kept raw so a `propertyNames` without `type` still yields its
    /// string keywords.
    #[serde(skip_serializing_if = "Option::is_none")]
    property_names: Option<Box<WireSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_properties: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_properties: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix_items: Option<Vec<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unevaluated_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unique_items: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusive_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    multiple_of: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    all_of: Option<Vec<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    any_of: Option<Vec<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    one_of: Option<Vec<SchemaNode>>,
    /// Written as a list; a lone schema object is accepted on input too.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "one_or_many"
    )]
    not: Option<Vec<SchemaNode>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<SchemaNode>),
    One(Box<SchemaNode>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<SchemaNode>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(schemas) => schemas,
        OneOrMany::One(schema) => vec![*schema],
    }))
}

impl WireSchema {
    /// Keys set in `top` replace the matching keys of `self`.
    pub(crate) fn overlay(self, top: WireSchema) -> WireSchema {
        WireSchema {
            schema_type: top.schema_type.or(self.schema_type),
            title: top.title.or(self.title),
            description: top.description.or(self.description),
            properties: top.properties.or(self.properties),
            pattern_properties: top.pattern_properties.or(self.pattern_properties),
            required: top.required.or(self.required),
            additional_properties: top.additional_properties.or(self.additional_properties),
            unevaluated_properties: top.unevaluated_properties.or(self.unevaluated_properties),
            property_names: top.property_names.or(self.property_names),
            min_properties: top.min_properties.or(self.min_properties),
            max_properties: top.max_properties.or(self.max_properties),
            items: top.items.or(self.items),
            prefix_items: top.prefix_items.or(self.prefix_items),
            unevaluated_items: top.unevaluated_items.or(self.unevaluated_items),
            min_items: top.min_items.or(self.min_items),
            max_items: top.max_items.or(self.max_items),
            unique_items: top.unique_items.or(self.unique_items),
            min_length: top.min_length.or(self.min_length),
            max_length: top.max_length.or(self.max_length),
            pattern: top.pattern.or(self.pattern),
            minimum: top.minimum.or(self.minimum),
            maximum: top.maximum.or(self.maximum),
            exclusive_minimum: top.exclusive_minimum.or(self.exclusive_minimum),
            exclusive_maximum: top.exclusive_maximum.or(self.exclusive_maximum),
            multiple_of: top.multiple_of.or(self.multiple_of),
            all_of: top.all_of.or(self.all_of),
            any_of: top.any_of.or(self.any_of),
            one_of: top.one_of.or(self.one_of),
            not: top.not.or(self.not),
        }
    }

    fn take_meta(&mut self) -> SchemaMeta {
        SchemaMeta {
            title: self.title.take(),
            description: self.description.take(),
            all_of: self.all_of.take(),
            any_of: self.any_of.take(),
            one_of: self.one_of.take(),
            not: self.not.take(),
        }
    }

    fn put_meta(&mut self, meta: SchemaMeta) {
        self.title = meta.title;
        self.description = meta.description;
        self.all_of = meta.all_of;
        self.any_of = meta.any_of;
        self.one_of = meta.one_of;
        self.not = meta.not;
    }


    fn take_bounds(&mut self) -> NumericBounds {
        NumericBounds {
            minimum: self.minimum.take(),
            maximum: self.maximum.take(),
            exclusive_minimum: self.exclusive_minimum.take(),
            exclusive_maximum: self.exclusive_maximum.take(),
            multiple_of: self.multiple_of.take(),
        }
    }

    fn put_bounds(&mut self, bounds: NumericBounds) {
        self.minimum = bounds.minimum;
        self.maximum = bounds.maximum;
        self.exclusive_minimum = bounds.exclusive_minimum;
        self.exclusive_maximum = bounds.exclusive_maximum;
        self.multiple_of = bounds.multiple_of;
    }

    /// The object keywords of this shape, with an empty `meta`.
    fn take_object(&mut self) -> ObjectSchema {
        ObjectSchema {
            meta: SchemaMeta::default(),
            properties: self.properties.take(),
            pattern_properties: self.pattern_properties.take(),
            required: self.required.take(),
            additional_properties: self.additional_properties.take(),
            unevaluated_properties: self.unevaluated_properties.take(),
            property_names: self
                .property_names
                .take()
                .map(|names| Box::new(names.into_string_schema())),
            min_properties: self.min_properties.take(),
            max_properties: self.max_properties.take(),
        }
    }

    /// Writes everything but `meta`.
    fn put_object(&mut self, object: ObjectSchema) {
        self.properties = object.properties;
        self.pattern_properties = object.pattern_properties;
        self.required = object.required;
        self.additional_properties = object.additional_properties;
        self.unevaluated_properties = object.unevaluated_properties;
        self.property_names = object
            .property_names
            .map(|names| Box::new(WireSchema::from(SchemaNode::String(*names))));
        self.min_properties = object.min_properties;
        self.max_properties = object.max_properties;
    }

    fn take_array(&mut self) -> ArraySchema {
        ArraySchema {
            meta: SchemaMeta::default(),
            items: self.items.take(),
            prefix_items: self.prefix_items.take(),
            unevaluated_items: self.unevaluated_items.take(),
            min_items: self.min_items.take(),
            max_items: self.max_items.take(),
            unique_items: self.unique_items.take(),
        }
    }

    fn put_array(&mut self, array: ArraySchema) {
        self.items = array.items;
        self.prefix_items = array.prefix_items;
        self.unevaluated_items = array.unevaluated_items;
        self.min_items = array.min_items;
        self.max_items = array.max_items;
        self.unique_items = array.unique_items;
    }

    fn take_string(&mut self) -> StringSchema {
        StringSchema {
            meta: SchemaMeta::default(),
            min_length: self.min_length.take(),
            max_length: self.max_length.take(),
            pattern: self.pattern.take(),
        }
    }

    fn put_string(&mut self, string: StringSchema) {
        self.min_length = string.min_length;
        self.max_length = string.max_length;
        self.pattern = string.pattern;
    }

    /// Read the string keywords of this shape, whatever its declared type.
    fn into_string_schema(mut self) -> StringSchema {
        StringSchema {
            meta: self.take_meta(),
            ..self.take_string()
        }
    }
}

/// `None` when no keyword of the group is set.
fn non_empty<T: Default + PartialEq>(keywords: T) -> Option<T> {
    (keywords != T::default()).then_some(keywords)
}

impl From<WireSchema> for SchemaNode {
    fn from(mut wire: WireSchema) -> Self {
        let meta = wire.take_meta();
        match wire.schema_type {
            None => SchemaNode::Combined(CombinedSchema {
                meta,
                object: non_empty(wire.take_object()).map(Box::new),
                array: non_empty(wire.take_array()).map(Box::new),
                string: non_empty(wire.take_string()).map(Box::new),
                numeric: non_empty(wire.take_bounds()),
            }),
            Some(SchemaType::Object) => SchemaNode::Object(ObjectSchema {
                meta,
                ..wire.take_object()
            }),
            Some(SchemaType::Array) => SchemaNode::Array(ArraySchema {
                meta,
                ..wire.take_array()
            }),
            Some(SchemaType::String) => SchemaNode::String(StringSchema {
                meta,
                ..wire.take_string()
            }),
            Some(SchemaType::Number) => SchemaNode::Number(NumberSchema {
                meta,
                bounds: wire.take_bounds(),
            }),
            Some(SchemaType::Integer) => SchemaNode::Integer(IntegerSchema {
                meta,
                bounds: wire.take_bounds(),
            }),
            Some(SchemaType::Boolean) => SchemaNode::Boolean(BooleanSchema { meta }),
            Some(SchemaType::Null) => SchemaNode::Null(NullSchema { meta }),
        }
    }
}

impl From<SchemaNode> for WireSchema {
    fn from(node: SchemaNode) -> Self {
        let mut wire = WireSchema {
            schema_type: node.schema_type(),
            ..WireSchema::default()
        };

        match node {
            SchemaNode::Object(mut s) => {
                wire.put_meta(std::mem::take(&mut s.meta));
                wire.put_object(s);
            }
            SchemaNode::Array(mut s) => {
                wire.put_meta(std::mem::take(&mut s.meta));
                wire.put_array(s);
            }
            SchemaNode::String(mut s) => {
                wire.put_meta(std::mem::take(&mut s.meta));
                wire.put_string(s);
            }
            SchemaNode::Number(s) => {
                wire.put_meta(s.meta);
                wire.put_bounds(s.bounds);
            }
            SchemaNode::Integer(s) => {
                wire.put_meta(s.meta);
                wire.put_bounds(s.bounds);
            }
            SchemaNode::Boolean(BooleanSchema { meta }) | SchemaNode::Null(NullSchema { meta }) => {
                wire.put_meta(meta)
            }
            SchemaNode::Combined(s) => {
                wire.put_meta(s.meta);
                if let Some(object) = s.object {
                    wire.put_object(*object);
                }
                if let Some(array) = s.array {
                    wire.put_array(*array);
                }
                if let Some(string) = s.string {
                    wire.put_string(*string);
                }
                if let Some(bounds) = s.numeric {
                    wire.put_bounds(bounds);
                }
            }
        }

        wire
    }
}
