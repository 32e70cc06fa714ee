//! Reference resolution for property lists
//!
//! Children that carry a reference take their value from the referenced
//! context property, converted through its textual rendering.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::context::TestContext;
use crate::error::PropertyError;
use crate::models::{Property, PropertyValue};
use crate::property::{render, DEFAULT_DATE_PATTERN};

/// Resolve every reference in a property list against the context
///
/// Lists referenced by a child are copied wholesale under the child's name.
/// A list child referencing a leaf is a type mismatch.
/// Unreferenced nested lists are resolved recursively, parent first.
/// References must not form cycles.
pub fn resolve_references(list: &mut Property, context: &TestContext) -> Result<(), PropertyError> {
    let list_name = list.name().unwrap_or_default().to_string();
    let containers = list
        .containers_mut()
        .ok_or(PropertyError::NotAComposite(list_name))?;

    for container in containers.iter_mut() {
        let property = container.property_mut();

        let Some(reference) = property.reference().filter(|r| !r.is_empty()) else {
            if property.is_composite() {
                resolve_references(property, context)?;
            }
            continue;
        };
        let reference = reference.to_string();

        let referenced = context
            .get_property(&reference)
            .ok_or_else(|| PropertyError::UnresolvedReference(reference.clone()))?;

        if property.is_composite() {
            if !referenced.is_composite() {
                return Err(PropertyError::TypeMismatch {
                    expected: property.property_type(),
                    found: referenced.property_type(),
                });
            }
            let mut copy = referenced.deep_copy();
            match property.name() {
                Some(name) if !name.is_empty() => copy.set_name(name),
                _ => copy.clear_name(),
            }
            debug!("Resolved list reference '{}'", reference);
            container.set_property(copy);
        } else {
            let rendering = render(referenced);
            apply_rendering(property, rendering)?;
            debug!("Resolved reference '{}' to {}", reference, property);
        }
    }
    Ok(())
}

/// Set a leaf property's value from a textual rendering
fn apply_rendering(property: &mut Property, rendering: Option<String>) -> Result<(), PropertyError> {
    let value = match (property.value(), rendering) {
        (PropertyValue::List(_), _) => {
            return Err(PropertyError::UnsupportedType(property.property_type()));
        }
        (current, None) => PropertyValue::empty(current.property_type()),
        (PropertyValue::Text(_), Some(s)) => PropertyValue::Text(Some(s)),
        (PropertyValue::Xml(_), Some(s)) => PropertyValue::Xml(Some(s)),
        (PropertyValue::XPath(_), Some(s)) => PropertyValue::XPath(Some(s)),
        (PropertyValue::File(_), Some(s)) => PropertyValue::File(Some(s)),
        (PropertyValue::Sql(_), Some(s)) => PropertyValue::Sql(Some(s)),
        (PropertyValue::Boolean(_), Some(s)) => {
            PropertyValue::Boolean(Some(s.trim().eq_ignore_ascii_case("true")))
        }
        (PropertyValue::Integer(_), Some(s)) => {
            let n = parse_whole(&s)?;
            let n = i32::try_from(n).map_err(|_| PropertyError::InvalidNumber(s))?;
            PropertyValue::Integer(Some(n))
        }
        (PropertyValue::Long(_), Some(s)) => PropertyValue::Long(Some(parse_whole(&s)?)),
        (PropertyValue::Double(_), Some(s)) => {
            let d = s
                .trim()
                .parse::<f64>()
                .map_err(|_| PropertyError::InvalidNumber(s.clone()))?;
            PropertyValue::Double(Some(d))
        }
        (PropertyValue::Date(_), Some(s)) => {
            let date = NaiveDateTime::parse_from_str(s.trim(), DEFAULT_DATE_PATTERN)
                .map_err(|_| PropertyError::InvalidDate(s.clone()))?;
            PropertyValue::Date(Some(date))
        }
    };
    property.set_value(value)
}

/// Parse a whole number, accepting integral decimals such as `3.0`
fn parse_whole(s: &str) -> Result<i64, PropertyError> {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n);
    }
    match trimmed.parse::<f64>() {
        Ok(d) if d.fract() == 0.0 && d >= i64::MIN as f64 && d < i64::MAX as f64 => Ok(d as i64),
        _ => Err(PropertyError::InvalidNumber(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;
    use crate::property::helper::{
        add, by_name, create_boolean_property, create_date_property, create_double_property,
        create_integer_property, create_property_list, create_string_property,
    };
    use chrono::NaiveDate;

    fn reference(property_type: PropertyType, name: &str, target: &str) -> Property {
        Property::reference_to(property_type, target).with_name(name)
    }

    fn server_context() -> TestContext {
        let mut context = TestContext::new();
        let mut server = create_property_list("server");
        add(create_integer_property("port", 8080), &mut server).unwrap();
        add(create_string_property("host", "build01"), &mut server).unwrap();
        context.put(server);
        context.put(create_string_property("label", "nightly"));
        context.put(create_string_property("flag", "TRUE"));
        context.put(create_string_property("stamp", "01.02.2024 10:20:30"));
        context.put(create_string_property("broken_stamp", "2024-02-01"));
        context.put(create_double_property("ratio", 3.0));
        context
    }

    #[test]
    fn test_resolves_leaf_references_by_rendering() {
        let context = server_context();
        let mut list = create_property_list("run");
        add(reference(PropertyType::Integer, "port", "server.port"), &mut list).unwrap();
        add(reference(PropertyType::Text, "label", "label"), &mut list).unwrap();
        add(reference(PropertyType::Boolean, "enabled", "flag"), &mut list).unwrap();
        add(reference(PropertyType::Long, "ratio_long", "ratio"), &mut list).unwrap();
        add(reference(PropertyType::Date, "at", "stamp"), &mut list).unwrap();

        resolve_references(&mut list, &context).unwrap();

        assert_eq!(by_name(&list, "port").unwrap().value(), &PropertyValue::Integer(Some(8080)));
        assert_eq!(
            by_name(&list, "label").unwrap().value(),
            &PropertyValue::Text(Some("nightly".to_string()))
        );
        assert_eq!(by_name(&list, "enabled").unwrap().value(), &PropertyValue::Boolean(Some(true)));
        assert_eq!(by_name(&list, "ratio_long").unwrap().value(), &PropertyValue::Long(Some(3)));
        let expected = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap();
        assert_eq!(by_name(&list, "at").unwrap().value(), &PropertyValue::Date(Some(expected)));
    }

    #[test]
    fn test_missing_reference_is_error() {
        let context = server_context();
        let mut list = create_property_list("run");
        add(reference(PropertyType::Text, "x", "missing.prop"), &mut list).unwrap();

        let err = resolve_references(&mut list, &context).unwrap_err();
        assert_eq!(err, PropertyError::UnresolvedReference("missing.prop".to_string()));
    }

    #[test]
    fn test_malformed_date_is_error() {
        let context = server_context();
        let mut list = create_property_list("run");
        add(reference(PropertyType::Date, "at", "broken_stamp"), &mut list).unwrap();

        let err = resolve_references(&mut list, &context).unwrap_err();
        assert!(matches!(err, PropertyError::InvalidDate(_)));
    }

    #[test]
    fn test_non_numeric_rendering_is_error() {
        let context = server_context();
        let mut list = create_property_list("run");
        add(reference(PropertyType::Integer, "n", "label"), &mut list).unwrap();

        let err = resolve_references(&mut list, &context).unwrap_err();
        assert_eq!(err, PropertyError::InvalidNumber("nightly".to_string()));
    }

    #[test]
    fn test_list_reference_is_copied_and_renamed() {
        let context = server_context();
        let mut list = create_property_list("run");
        add(reference(PropertyType::List, "target", "server"), &mut list).unwrap();

        resolve_references(&mut list, &context).unwrap();

        let target = by_name(&list, "target").unwrap();
        assert_eq!(target.children().len(), 2);
        assert_eq!(render(target), Some("[8080, build01]".to_string()));
        assert!(by_name(&list, "server").is_none());
        // the context copy is untouched
        assert_eq!(context.get_property("server").unwrap().name(), Some("server"));
    }

    #[test]
    fn test_nested_lists_are_resolved() {
        let context = server_context();
        let mut inner = create_property_list("inner");
        add(reference(PropertyType::Text, "host", "server.host"), &mut inner).unwrap();
        let mut list = create_property_list("run");
        add(inner, &mut list).unwrap();

        resolve_references(&mut list, &context).unwrap();

        let inner = by_name(&list, "inner").unwrap();
        assert_eq!(by_name(inner, "host").and_then(render), Some("build01".to_string()));
    }

    #[test]
    fn test_absent_rendering_clears_value() {
        let mut context = TestContext::new();
        context.put(Property::named(PropertyType::Text, "empty"));
        let mut list = create_property_list("run");
        let flag = create_boolean_property("flag", true).with_reference("empty");
        add(flag, &mut list).unwrap();

        resolve_references(&mut list, &context).unwrap();

        assert_eq!(by_name(&list, "flag").unwrap().value(), &PropertyValue::Boolean(None));
    }

    #[test]
    fn test_unreferenced_children_untouched() {
        let context = server_context();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut list = create_property_list("run");
        add(create_date_property("fixed", date), &mut list).unwrap();
        let before = list.deep_copy();

        resolve_references(&mut list, &context).unwrap();

        assert_eq!(list, before);
    }

    #[test]
    fn test_parse_whole() {
        assert_eq!(parse_whole("42").unwrap(), 42);
        assert_eq!(parse_whole(" 7.0 ").unwrap(), 7);
        assert!(parse_whole("7.5").is_err());
        assert!(parse_whole("abc").is_err());
    }

    #[test]
    fn test_parse_whole_rejects_values_past_long_range() {
        // 2^63 parses as f64 but does not fit an i64
        assert_eq!(
            parse_whole("9223372036854775808"),
            Err(PropertyError::InvalidNumber("9223372036854775808".to_string()))
        );
        assert_eq!(
            parse_whole("9223372036854775808.0"),
            Err(PropertyError::InvalidNumber("9223372036854775808.0".to_string()))
        );
        assert_eq!(parse_whole("-9223372036854775808.0").unwrap(), i64::MIN);
        assert_eq!(parse_whole("9223372036854775807").unwrap(), i64::MAX);
    }

    #[test]
    fn test_list_referencing_leaf_is_type_mismatch() {
        let context = server_context();
        let mut list = create_property_list("run");
        add(reference(PropertyType::List, "target", "label"), &mut list).unwrap();
        let before = list.deep_copy();

        let err = resolve_references(&mut list, &context).unwrap_err();

        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                expected: PropertyType::List,
                found: PropertyType::Text,
            }
        );
        assert_eq!(by_name(&list, "target").unwrap().property_type(), PropertyType::List);
        assert_eq!(list, before);
    }

    #[test]
    fn test_resolving_leaf_is_error() {
        let context = server_context();
        let mut leaf = create_string_property("x", "y");
        let err = resolve_references(&mut leaf, &context).unwrap_err();
        assert_eq!(err, PropertyError::NotAComposite("x".to_string()));
    }
}
