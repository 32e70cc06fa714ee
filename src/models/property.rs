//! Property data model
//!
//! Typed value nodes, ordered list containers and references.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::PropertyError;

/// Closed set of property types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Boolean,
    Date,
    Double,
    Integer,
    Long,
    Text,
    Xml,
    XPath,
    File,
    Sql,
    List,
}

impl PropertyType {
    /// Get type display name
    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "Boolean",
            PropertyType::Date => "Date",
            PropertyType::Double => "Double",
            PropertyType::Integer => "Integer",
            PropertyType::Long => "Long",
            PropertyType::Text => "Text",
            PropertyType::Xml => "XML",
            PropertyType::XPath => "XPath",
            PropertyType::File => "File",
            PropertyType::Sql => "SQL",
            PropertyType::List => "List",
        }
    }

    /// Whether properties of this type hold child properties
    pub fn is_composite(&self) -> bool {
        matches!(self, PropertyType::List)
    }

    /// Get all property types
    pub fn all() -> Vec<PropertyType> {
        vec![
            PropertyType::Boolean,
            PropertyType::Date,
            PropertyType::Double,
            PropertyType::Integer,
            PropertyType::Long,
            PropertyType::Text,
            PropertyType::Xml,
            PropertyType::XPath,
            PropertyType::File,
            PropertyType::Sql,
            PropertyType::List,
        ]
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "boolean" | "bool" => Some(PropertyType::Boolean),
            "date" => Some(PropertyType::Date),
            "double" => Some(PropertyType::Double),
            "integer" | "int" => Some(PropertyType::Integer),
            "long" => Some(PropertyType::Long),
            "text" | "string" => Some(PropertyType::Text),
            "xml" => Some(PropertyType::Xml),
            "xpath" => Some(PropertyType::XPath),
            "file" => Some(PropertyType::File),
            "sql" => Some(PropertyType::Sql),
            "list" => Some(PropertyType::List),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Value carried by a property, one variant per property type
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    Boolean(Option<bool>),
    Date(Option<NaiveDateTime>),
    Double(Option<f64>),
    Integer(Option<i32>),
    Long(Option<i64>),
    Text(Option<String>),
    Xml(Option<String>),
    XPath(Option<String>),
    File(Option<String>),
    Sql(Option<String>),
    List(PropertyList),
}

impl PropertyValue {
    /// Create an unset value of the given type
    pub fn empty(property_type: PropertyType) -> Self {
        match property_type {
            PropertyType::Boolean => PropertyValue::Boolean(None),
            PropertyType::Date => PropertyValue::Date(None),
            PropertyType::Double => PropertyValue::Double(None),
            PropertyType::Integer => PropertyValue::Integer(None),
            PropertyType::Long => PropertyValue::Long(None),
            PropertyType::Text => PropertyValue::Text(None),
            PropertyType::Xml => PropertyValue::Xml(None),
            PropertyType::XPath => PropertyValue::XPath(None),
            PropertyType::File => PropertyValue::File(None),
            PropertyType::Sql => PropertyValue::Sql(None),
            PropertyType::List => PropertyValue::List(PropertyList::default()),
        }
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Boolean(_) => PropertyType::Boolean,
            PropertyValue::Date(_) => PropertyType::Date,
            PropertyValue::Double(_) => PropertyType::Double,
            PropertyValue::Integer(_) => PropertyType::Integer,
            PropertyValue::Long(_) => PropertyType::Long,
            PropertyValue::Text(_) => PropertyType::Text,
            PropertyValue::Xml(_) => PropertyType::Xml,
            PropertyValue::XPath(_) => PropertyType::XPath,
            PropertyValue::File(_) => PropertyType::File,
            PropertyValue::Sql(_) => PropertyType::Sql,
            PropertyValue::List(_) => PropertyType::List,
        }
    }

    /// Rebuild the value, copying every nested property
    fn deep_copy(&self) -> Self {
        match self {
            PropertyValue::Boolean(v) => PropertyValue::Boolean(*v),
            PropertyValue::Date(v) => PropertyValue::Date(*v),
            PropertyValue::Double(v) => PropertyValue::Double(*v),
            PropertyValue::Integer(v) => PropertyValue::Integer(*v),
            PropertyValue::Long(v) => PropertyValue::Long(*v),
            PropertyValue::Text(v) => PropertyValue::Text(v.clone()),
            PropertyValue::Xml(v) => PropertyValue::Xml(v.clone()),
            PropertyValue::XPath(v) => PropertyValue::XPath(v.clone()),
            PropertyValue::File(v) => PropertyValue::File(v.clone()),
            PropertyValue::Sql(v) => PropertyValue::Sql(v.clone()),
            PropertyValue::List(containers) => PropertyValue::List(PropertyList::reindexed(
                containers.iter().map(|c| c.property().deep_copy()),
            )),
        }
    }
}

/// Native representation of a property value
#[derive(Clone, Debug, PartialEq)]
pub enum NativeValue {
    Boolean(bool),
    Date(NaiveDateTime),
    Double(f64),
    Integer(i32),
    Long(i64),
    Text(String),
    /// Number of children of a property list
    Count(usize),
}

/// A named, typed value node
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// Dotted path of another property whose value is substituted in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,

    #[serde(flatten)]
    value: PropertyValue,
}

impl Property {
    /// Create an unnamed property with an unset value
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            name: None,
            reference: None,
            value: PropertyValue::empty(property_type),
        }
    }

    /// Create an unnamed property whose type follows the given value
    pub fn from_value(value: PropertyValue) -> Self {
        Self {
            name: None,
            reference: None,
            value,
        }
    }

    /// Create a named property with an unset value
    pub fn named(property_type: PropertyType, name: impl Into<String>) -> Self {
        Self::new(property_type).with_name(name)
    }

    /// Create an unnamed property that only carries a reference
    pub fn reference_to(property_type: PropertyType, reference: impl Into<String>) -> Self {
        Self::new(property_type).with_reference(reference)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// A name is set when present and not empty
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn clear_name(&mut self) {
        self.name = None;
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn has_reference(&self) -> bool {
        self.reference.as_deref().is_some_and(|r| !r.is_empty())
    }

    pub fn set_reference(&mut self, reference: impl Into<String>) {
        self.reference = Some(reference.into());
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    pub fn property_type(&self) -> PropertyType {
        self.value.property_type()
    }

    pub fn is_composite(&self) -> bool {
        self.property_type().is_composite()
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Replace the value; the declared type of a property never changes
    pub fn set_value(&mut self, value: PropertyValue) -> Result<(), PropertyError> {
        let expected = self.property_type();
        let found = value.property_type();
        if expected != found {
            return Err(PropertyError::TypeMismatch { expected, found });
        }
        self.value = value;
        Ok(())
    }

    /// Builder variant of [`Property::set_value`]
    pub fn with_value(mut self, value: PropertyValue) -> Result<Self, PropertyError> {
        self.set_value(value)?;
        Ok(self)
    }

    /// Child containers, empty for leaf properties
    pub fn children(&self) -> &[PropertyContainer] {
        match &self.value {
            PropertyValue::List(containers) => containers.as_slice(),
            _ => &[],
        }
    }

    /// Mutable child containers, `None` for leaf properties
    pub(crate) fn containers_mut(&mut self) -> Option<&mut Vec<PropertyContainer>> {
        match &mut self.value {
            PropertyValue::List(containers) => Some(&mut containers.0),
            _ => None,
        }
    }

    /// Mutable access to the child properties of a list
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.containers_mut()
            .into_iter()
            .flat_map(|containers| containers.iter_mut().map(PropertyContainer::property_mut))
    }

    /// Consume a list into its child properties, in order
    pub fn into_children(self) -> Vec<Property> {
        match self.value {
            PropertyValue::List(containers) => containers
                .0
                .into_iter()
                .map(PropertyContainer::into_property)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Explicit recursive copy of the whole subtree
    pub fn deep_copy(&self) -> Property {
        Property {
            name: self.name.clone(),
            reference: self.reference.clone(),
            value: self.value.deep_copy(),
        }
    }
}

impl Clone for Property {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name().unwrap_or("<unnamed>"), self.property_type())?;
        if let Some(reference) = self.reference() {
            write!(f, " -> {reference}")?;
        }
        Ok(())
    }
}

/// Ordered slot around one child property of a list
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyContainer {
    order_index: usize,
    property: Property,
}

impl PropertyContainer {
    pub fn new(order_index: usize, property: Property) -> Self {
        Self {
            order_index,
            property,
        }
    }

    pub fn order_index(&self) -> usize {
        self.order_index
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn property_mut(&mut self) -> &mut Property {
        &mut self.property
    }

    /// Swap the wrapped property, keeping the slot position
    pub fn set_property(&mut self, property: Property) -> Property {
        std::mem::replace(&mut self.property, property)
    }

    pub fn into_property(self) -> Property {
        self.property
    }
}

/// Child slots of a list property
///
/// Written as a plain sequence of properties; order indices are rebuilt
/// densely on load. A missing or null sequence loads as an empty list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyList(Vec<PropertyContainer>);

impl PropertyList {
    /// Wrap properties in containers numbered from zero
    pub fn reindexed(properties: impl IntoIterator<Item = Property>) -> Self {
        Self(
            properties
                .into_iter()
                .enumerate()
                .map(|(index, property)| PropertyContainer::new(index, property))
                .collect(),
        )
    }
}

impl Deref for PropertyList {
    type Target = Vec<PropertyContainer>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PropertyList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Serialize for PropertyList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(PropertyContainer::property))
    }
}

impl<'de> Deserialize<'de> for PropertyList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_option(PropertyListVisitor)
    }
}

struct PropertyListVisitor;

impl<'de> serde::de::Visitor<'de> for PropertyListVisitor {
    type Value = PropertyList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of properties")
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(PropertyList::default())
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(PropertyList::default())
    }

    fn visit_some<D: serde::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let properties = Vec::<Property>::deserialize(deserializer)?;
        Ok(PropertyList::reindexed(properties))
    }

    fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut properties = Vec::new();
        while let Some(property) = seq.next_element::<Property>()? {
            properties.push(property);
        }
        Ok(PropertyList::reindexed(properties))
    }
}
