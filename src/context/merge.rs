//! Composite merge
//!
//! Combines a source property list into an existing destination list.

use tracing::{debug, warn};

use crate::models::{Property, PropertyContainer};
use crate::property::helper;

/// Merge `from` into `to`
///
/// Nested lists are matched by type and name and merged recursively, or
/// appended when the destination has no such list. Leaves replace the
/// destination entry with the same name, or are appended.
pub fn merge_composite(from: Property, to: &mut Property) {
    let list_name = to.name().unwrap_or_default().to_string();
    let Some(destination) = to.containers_mut() else {
        warn!("Cannot merge into leaf property '{}'", list_name);
        return;
    };

    for property in from.into_children() {
        if property.is_composite() {
            let existing = destination
                .iter_mut()
                .map(PropertyContainer::property_mut)
                .find(|p| p.property_type() == property.property_type() && p.name() == property.name());

            match existing {
                Some(existing) => merge_composite(property, existing),
                None => {
                    debug!("Appending list '{}' to '{}'", property, list_name);
                    helper::append(destination, property);
                }
            }
        } else {
            helper::replace_in(destination, &list_name, property);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyValue;
    use crate::property::helper::{
        add, by_name, create_integer_property, create_property_list, create_string_property,
    };
    use crate::property::render;

    fn list_of(name: &str, children: Vec<Property>) -> Property {
        let mut list = create_property_list(name);
        for child in children {
            add(child, &mut list).unwrap();
        }
        list
    }

    #[test]
    fn test_source_leaf_wins() {
        let mut to = list_of(
            "cfg",
            vec![create_integer_property("x", 1), create_string_property("y", "keep")],
        );
        let from = list_of("cfg", vec![create_integer_property("x", 2)]);

        merge_composite(from, &mut to);

        assert_eq!(to.children().len(), 2);
        assert_eq!(
            by_name(&to, "x").unwrap().value(),
            &PropertyValue::Integer(Some(2))
        );
        assert_eq!(by_name(&to, "y").and_then(render), Some("keep".to_string()));
        assert_eq!(to.children()[0].property().name(), Some("x"));
    }

    #[test]
    fn test_new_entries_appended() {
        let mut to = list_of("cfg", vec![create_integer_property("a", 1)]);
        let from = list_of(
            "cfg",
            vec![
                create_integer_property("b", 2),
                list_of("nested", vec![create_integer_property("c", 3)]),
            ],
        );

        merge_composite(from, &mut to);

        let names: Vec<&str> = to
            .children()
            .iter()
            .filter_map(|c| c.property().name())
            .collect();
        assert_eq!(names, vec!["a", "b", "nested"]);
        let indices: Vec<usize> = to.children().iter().map(|c| c.order_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_nested_lists_merge_recursively() {
        let mut to = list_of(
            "cfg",
            vec![list_of(
                "db",
                vec![
                    create_string_property("host", "localhost"),
                    create_integer_property("port", 5432),
                ],
            )],
        );
        let from = list_of(
            "cfg",
            vec![list_of(
                "db",
                vec![
                    create_string_property("host", "db.internal"),
                    create_string_property("user", "admin"),
                ],
            )],
        );

        merge_composite(from, &mut to);

        assert_eq!(to.children().len(), 1);
        let db = by_name(&to, "db").unwrap();
        assert_eq!(render(db), Some("[db.internal, 5432, admin]".to_string()));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut to = list_of(
            "cfg",
            vec![
                create_integer_property("a", 1),
                list_of("inner", vec![create_string_property("b", "two")]),
            ],
        );
        let before = to.deep_copy();

        merge_composite(before.deep_copy(), &mut to);

        assert_eq!(to, before);
    }

    #[test]
    fn test_same_name_different_type_list_is_appended() {
        let mut to = list_of("cfg", vec![create_string_property("item", "leaf")]);
        let from = list_of("cfg", vec![list_of("item", vec![])]);

        merge_composite(from, &mut to);

        assert_eq!(to.children().len(), 2);
    }
}
