//! Property helper functions
//!
//! Stateless lookup, construction and projection over the property model.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::context::TestContext;
use crate::error::PropertyError;
use crate::models::{NativeValue, Property, PropertyContainer, PropertyType, PropertyValue};

/// Pattern used to render and parse date properties
pub const DEFAULT_DATE_PATTERN: &str = "%d.%m.%Y %H:%M:%S";

/// Check if a list holds a direct child of the given type
pub fn contains_type(list: &Property, property_type: PropertyType) -> bool {
    first_of_type(list, property_type).is_some()
}

/// Returns the first direct child of the given type
pub fn first_of_type(list: &Property, property_type: PropertyType) -> Option<&Property> {
    list.children()
        .iter()
        .map(PropertyContainer::property)
        .find(|p| p.property_type() == property_type)
}

/// Child properties of a container list, in order
pub fn extract(containers: &[PropertyContainer]) -> Vec<&Property> {
    containers.iter().map(PropertyContainer::property).collect()
}

/// First direct child of a list with the given name
pub fn by_name<'a>(list: &'a Property, name: &str) -> Option<&'a Property> {
    by_name_in_containers(list.children(), name)
}

pub fn by_name_in_containers<'a>(
    containers: &'a [PropertyContainer],
    name: &str,
) -> Option<&'a Property> {
    by_name_in(containers.iter().map(PropertyContainer::property), name)
}

/// First property with the given name in any sequence of properties
pub fn by_name_in<'a, I>(properties: I, name: &str) -> Option<&'a Property>
where
    I: IntoIterator<Item = &'a Property>,
{
    properties.into_iter().find(|p| p.name() == Some(name))
}

/// Create a named boolean property
pub fn create_boolean_property(name: impl Into<String>, value: bool) -> Property {
    named_with(name, PropertyValue::Boolean(Some(value)))
}

/// Create a named date property
pub fn create_date_property(name: impl Into<String>, value: NaiveDateTime) -> Property {
    named_with(name, PropertyValue::Date(Some(value)))
}

/// Create a named 32-bit integer property
pub fn create_integer_property(name: impl Into<String>, value: i32) -> Property {
    named_with(name, PropertyValue::Integer(Some(value)))
}

/// Create a named double property
pub fn create_double_property(name: impl Into<String>, value: f64) -> Property {
    named_with(name, PropertyValue::Double(Some(value)))
}

/// Create a named 64-bit integer property
pub fn create_long_property(name: impl Into<String>, value: i64) -> Property {
    named_with(name, PropertyValue::Long(Some(value)))
}

/// Create a named text property
pub fn create_string_property(name: impl Into<String>, value: impl Into<String>) -> Property {
    named_with(name, PropertyValue::Text(Some(value.into())))
}

/// Create a named XML property
pub fn create_xml_property(name: impl Into<String>, value: impl Into<String>) -> Property {
    named_with(name, PropertyValue::Xml(Some(value.into())))
}

/// Create a named XPath property
pub fn create_xpath_property(name: impl Into<String>, value: impl Into<String>) -> Property {
    named_with(name, PropertyValue::XPath(Some(value.into())))
}

/// Create a named file property holding the file content
pub fn create_file_property(name: impl Into<String>, content: impl Into<String>) -> Property {
    named_with(name, PropertyValue::File(Some(content.into())))
}

/// Create a named SQL property
pub fn create_sql_property(name: impl Into<String>, value: impl Into<String>) -> Property {
    named_with(name, PropertyValue::Sql(Some(value.into())))
}

/// Create an empty named property list
pub fn create_property_list(name: impl Into<String>) -> Property {
    Property::named(PropertyType::List, name)
}

/// Create a named property of any type with an unset value
pub fn create_property(property_type: PropertyType, name: impl Into<String>) -> Property {
    Property::named(property_type, name)
}

fn named_with(name: impl Into<String>, value: PropertyValue) -> Property {
    Property::from_value(value).with_name(name)
}

/// Textual projection of a property
///
/// Lists render as `[v1, v2, ...]`; an unset value yields `None`.
pub fn render(property: &Property) -> Option<String> {
    match property.value() {
        PropertyValue::Boolean(v) => v.map(|b| b.to_string()),
        PropertyValue::Date(v) => v.map(|d| d.format(DEFAULT_DATE_PATTERN).to_string()),
        PropertyValue::Double(v) => v.map(|d| format!("{d:?}")),
        PropertyValue::Integer(v) => v.map(|i| i.to_string()),
        PropertyValue::Long(v) => v.map(|l| l.to_string()),
        PropertyValue::Text(v)
        | PropertyValue::Xml(v)
        | PropertyValue::XPath(v)
        | PropertyValue::File(v)
        | PropertyValue::Sql(v) => v.clone(),
        PropertyValue::List(containers) => Some(render_list(containers)),
    }
}

fn render_list(containers: &[PropertyContainer]) -> String {
    let items: Vec<String> = containers
        .iter()
        .map(|c| render(c.property()).unwrap_or_else(|| "null".to_string()))
        .collect();
    format!("[{}]", items.join(", "))
}

/// Native projection of a property
///
/// Lists yield their child count rather than a rendering.
pub fn native_value(property: &Property) -> Option<NativeValue> {
    match property.value() {
        PropertyValue::Boolean(v) => v.map(NativeValue::Boolean),
        PropertyValue::Date(v) => v.map(NativeValue::Date),
        PropertyValue::Double(v) => v.map(NativeValue::Double),
        PropertyValue::Integer(v) => v.map(NativeValue::Integer),
        PropertyValue::Long(v) => v.map(NativeValue::Long),
        PropertyValue::Text(v)
        | PropertyValue::Xml(v)
        | PropertyValue::XPath(v)
        | PropertyValue::File(v)
        | PropertyValue::Sql(v) => v.clone().map(NativeValue::Text),
        PropertyValue::List(containers) => Some(NativeValue::Count(containers.len())),
    }
}

/// Fill in unnamed children of a list from the properties they reference
///
/// Each child without a name but with a reference receives the value of the
/// referenced context property, and adopts its name.
pub fn resolve_unnamed_references(
    list: &mut Property,
    context: &TestContext,
) -> Result<(), PropertyError> {
    for property in list.children_mut() {
        if property.has_name() || !property.has_reference() {
            continue;
        }

        let reference = property.reference().unwrap_or_default().to_string();
        let referenced = context
            .get_property(&reference)
            .ok_or_else(|| PropertyError::UnresolvedReference(reference.clone()))?;

        copy_referenced_value(property, referenced)?;
        debug!("Resolved unnamed reference '{}' to {}", reference, property);
    }
    Ok(())
}

fn copy_referenced_value(target: &mut Property, source: &Property) -> Result<(), PropertyError> {
    let value = match (target.value(), source.value()) {
        (PropertyValue::List(_), _) => {
            return Err(PropertyError::UnsupportedType(PropertyType::List));
        }
        (PropertyValue::Boolean(_), PropertyValue::Boolean(v)) => PropertyValue::Boolean(*v),
        (PropertyValue::Date(_), PropertyValue::Date(v)) => PropertyValue::Date(*v),
        (PropertyValue::Double(_), PropertyValue::Double(v)) => PropertyValue::Double(*v),
        (PropertyValue::Integer(_), PropertyValue::Integer(v)) => PropertyValue::Integer(*v),
        (PropertyValue::Long(_), PropertyValue::Long(v)) => PropertyValue::Long(*v),
        (PropertyValue::Text(_), PropertyValue::Text(v)) => PropertyValue::Text(v.clone()),
        (PropertyValue::Xml(_), PropertyValue::Xml(v)) => PropertyValue::Xml(v.clone()),
        (PropertyValue::XPath(_), PropertyValue::XPath(v)) => PropertyValue::XPath(v.clone()),
        (PropertyValue::File(_), PropertyValue::File(v)) => PropertyValue::File(v.clone()),
        (PropertyValue::Sql(_), PropertyValue::Sql(v)) => PropertyValue::Sql(v.clone()),
        (expected, found) => {
            return Err(PropertyError::TypeMismatch {
                expected: expected.property_type(),
                found: found.property_type(),
            });
        }
    };

    target.set_value(value)?;
    if !target.has_name() {
        if let Some(name) = source.name() {
            target.set_name(name);
        }
    }
    Ok(())
}

/// Append a property to a list at the next order index
pub fn add(property: Property, list: &mut Property) -> Result<(), PropertyError> {
    let list_name = list.name().unwrap_or_default().to_string();
    let containers = list
        .containers_mut()
        .ok_or(PropertyError::NotAComposite(list_name))?;
    append(containers, property);
    Ok(())
}

pub(crate) fn append(containers: &mut Vec<PropertyContainer>, property: Property) {
    let index = containers.len();
    containers.push(PropertyContainer::new(index, property));
}

/// Replace the child with the same name, or append it when absent
///
/// Returns whether an existing child was replaced.
pub fn replace(list: &mut Property, property: Property) -> Result<bool, PropertyError> {
    let list_name = list.name().unwrap_or_default().to_string();
    let containers = list
        .containers_mut()
        .ok_or_else(|| PropertyError::NotAComposite(list_name.clone()))?;
    Ok(replace_in(containers, &list_name, property))
}

pub(crate) fn replace_in(
    containers: &mut Vec<PropertyContainer>,
    list_name: &str,
    property: Property,
) -> bool {
    let name = property.name().map(str::to_string);
    let mut positions = containers
        .iter()
        .enumerate()
        .filter(|(_, c)| name.is_some() && c.property().name() == name.as_deref())
        .map(|(index, _)| index);

    let Some(position) = positions.next() else {
        append(containers, property);
        return false;
    };
    if positions.next().is_some() {
        warn!(
            "Property list '{}' holds more than one entry named '{}'",
            list_name,
            name.as_deref().unwrap_or_default()
        );
    }
    containers[position].set_property(property);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn list_of(name: &str, children: Vec<Property>) -> Property {
        let mut list = create_property_list(name);
        for child in children {
            add(child, &mut list).unwrap();
        }
        list
    }

    #[test]
    fn test_first_of_type() {
        let list = list_of(
            "l",
            vec![
                create_string_property("a", "x"),
                create_integer_property("b", 1),
                create_integer_property("c", 2),
            ],
        );

        assert_eq!(
            first_of_type(&list, PropertyType::Integer).and_then(|p| p.name()),
            Some("b")
        );
        assert!(first_of_type(&list, PropertyType::Sql).is_none());
        assert!(contains_type(&list, PropertyType::Text));
    }

    #[test]
    fn test_by_name() {
        let list = list_of(
            "l",
            vec![
                create_string_property("a", "first"),
                create_string_property("a", "second"),
            ],
        );

        assert_eq!(by_name(&list, "a").and_then(render), Some("first".to_string()));
        assert!(by_name(&list, "missing").is_none());
        assert!(by_name(&create_property_list("empty"), "a").is_none());
        assert!(by_name_in(Vec::<&Property>::new(), "a").is_none());
        assert_eq!(extract(list.children()).len(), 2);
    }

    #[test]
    fn test_add_assigns_dense_indices() {
        let list = list_of(
            "l",
            vec![
                create_boolean_property("a", true),
                create_long_property("b", 5),
                create_sql_property("c", "SELECT 1"),
            ],
        );

        let indices: Vec<usize> = list.children().iter().map(|c| c.order_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let mut leaf = create_long_property("leaf", 1);
        assert_eq!(
            add(create_long_property("x", 1), &mut leaf),
            Err(PropertyError::NotAComposite("leaf".to_string()))
        );
    }

    #[test]
    fn test_render_round_trip() {
        assert_eq!(render(&create_string_property("s", "hello")), Some("hello".to_string()));
        assert_eq!(render(&create_boolean_property("b", true)), Some("true".to_string()));
        assert_eq!(render(&create_integer_property("i", -42)), Some("-42".to_string()));
        assert_eq!(
            render(&create_long_property("l", 9_000_000_000)),
            Some("9000000000".to_string())
        );
        assert_eq!(render(&create_double_property("d", 1.5)), Some("1.5".to_string()));
        assert_eq!(render(&create_double_property("d", 3.0)), Some("3.0".to_string()));
        assert_eq!(
            render(&create_date_property("t", sample_date())),
            Some("15.03.2024 09:30:00".to_string())
        );
    }

    #[test]
    fn test_render_unset_is_none() {
        assert_eq!(render(&create_property(PropertyType::Text, "s")), None);
        assert_eq!(render(&create_property(PropertyType::Integer, "i")), None);
        assert_eq!(native_value(&create_property(PropertyType::Xml, "x")), None);
    }

    #[test]
    fn test_list_render_and_native_asymmetry() {
        let list = list_of(
            "l",
            vec![
                create_integer_property("a", 1),
                create_string_property("b", "two"),
                create_property(PropertyType::Text, "c"),
            ],
        );

        assert_eq!(render(&list), Some("[1, two, null]".to_string()));
        assert_eq!(native_value(&list), Some(NativeValue::Count(3)));

        let empty = create_property_list("empty");
        assert_eq!(render(&empty), Some("[]".to_string()));
        assert_eq!(native_value(&empty), Some(NativeValue::Count(0)));
    }

    #[test]
    fn test_native_values() {
        assert_eq!(
            native_value(&create_file_property("f", "content")),
            Some(NativeValue::Text("content".to_string()))
        );
        assert_eq!(
            native_value(&create_date_property("d", sample_date())),
            Some(NativeValue::Date(sample_date()))
        );
        assert_eq!(
            native_value(&create_double_property("d", 2.5)),
            Some(NativeValue::Double(2.5))
        );
    }

    #[test]
    fn test_resolve_unnamed_references() {
        let mut context = TestContext::new();
        context.put(create_integer_property("timeout", 30));
        context.put(create_xpath_property("locator", "//div[@id='main']"));

        let mut list = list_of(
            "step",
            vec![
                Property::reference_to(PropertyType::Integer, "timeout"),
                Property::reference_to(PropertyType::XPath, "locator"),
                create_string_property("keep", "as-is").with_reference("timeout"),
            ],
        );

        resolve_unnamed_references(&mut list, &context).unwrap();

        let timeout = by_name(&list, "timeout").unwrap();
        assert_eq!(timeout.value(), &PropertyValue::Integer(Some(30)));
        let locator = by_name(&list, "locator").unwrap();
        assert_eq!(render(locator), Some("//div[@id='main']".to_string()));
        let keep = by_name(&list, "keep").unwrap();
        assert_eq!(render(keep), Some("as-is".to_string()));
    }

    #[test]
    fn test_resolve_unnamed_reference_errors() {
        let mut context = TestContext::new();
        context.put(create_string_property("text", "abc"));
        context.put(create_property_list("nested"));

        let mut missing = list_of("l", vec![Property::reference_to(PropertyType::Text, "nope")]);
        assert_eq!(
            resolve_unnamed_references(&mut missing, &context),
            Err(PropertyError::UnresolvedReference("nope".to_string()))
        );

        let mut mismatch = list_of("l", vec![Property::reference_to(PropertyType::Long, "text")]);
        assert_eq!(
            resolve_unnamed_references(&mut mismatch, &context),
            Err(PropertyError::TypeMismatch {
                expected: PropertyType::Long,
                found: PropertyType::Text,
            })
        );

        let mut unsupported =
            list_of("l", vec![Property::reference_to(PropertyType::List, "nested")]);
        assert_eq!(
            resolve_unnamed_references(&mut unsupported, &context),
            Err(PropertyError::UnsupportedType(PropertyType::List))
        );
    }

    #[test]
    fn test_replace_by_name() {
        let mut list = list_of(
            "l",
            vec![create_integer_property("x", 1), create_integer_property("y", 2)],
        );

        assert_eq!(replace(&mut list, create_integer_property("x", 10)), Ok(true));
        assert_eq!(replace(&mut list, create_integer_property("z", 3)), Ok(false));

        let rendered: Vec<String> = list
            .children()
            .iter()
            .map(|c| format!("{}={}", c.property().name().unwrap(), render(c.property()).unwrap()))
            .collect();
        assert_eq!(rendered, vec!["x=10", "y=2", "z=3"]);
        assert_eq!(list.children()[2].order_index(), 2);
    }
}
