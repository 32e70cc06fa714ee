//! Test run context
//!
//! The property store of a running test plus the run-wide state it shares
//! with the engine: proxy configurations, current script pointers, the
//! execution controller and the result tree.

pub mod merge;
pub mod resolve;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::engine::ExecutionController;
use crate::error::PropertyError;
use crate::models::{
    HierarchyLevel, Property, ProxyConfiguration, SubEngineType, TestConfigElement,
    TestConfigurationResult, TestScript, TestScriptElement,
};
use crate::property::helper::by_name;

pub use merge::merge_composite;
pub use resolve::resolve_references;

pub const BRAND: &str = "global_brand";
pub const RELEASE: &str = "global_release";
pub const ENVIRONMENT: &str = "global_environment";
pub const USERNAME: &str = "global_username";
pub const NOTICE: &str = "global_notice";
pub const EMAIL: &str = "global_email";

type ProxyMap = HashMap<SubEngineType, ProxyConfiguration>;
type ConfigElementMap = HashMap<HierarchyLevel, TestConfigElement>;

/// Property context of one test run
///
/// Mutation takes `&mut self`; the pieces shared with duplicates sit behind
/// their own locks.
#[derive(Debug, Default)]
pub struct TestContext {
    properties: HashMap<String, Property>,
    proxy_configurations: Arc<RwLock<ProxyMap>>,
    current_test_config_elements: Arc<RwLock<ConfigElementMap>>,
    current_test_script: Option<TestScript>,
    current_test_script_element: Option<TestScriptElement>,
    execution_controller: Option<Arc<dyn ExecutionController>>,
    test_configuration_result: Option<Arc<Mutex<TestConfigurationResult>>>,
    tracing: bool,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with the configured tracing flag and global properties
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut context = Self::new();
        context.set_tracing(config.tracing);
        context.add_all(config.globals.to_properties());
        context
    }

    /// Store a property under its name, replacing any previous entry
    ///
    /// Properties without a name are ignored.
    pub fn put(&mut self, property: Property) {
        let Some(name) = property.name().filter(|n| !n.is_empty()) else {
            debug!("Ignoring unnamed property {}", property);
            return;
        };
        let name = name.to_string();
        self.properties.insert(name, property);
    }

    pub fn add_all(&mut self, properties: impl IntoIterator<Item = Property>) {
        for property in properties {
            self.put(property);
        }
    }

    /// Merge a property into the context
    ///
    /// A new name is stored as is. When both the stored and the incoming
    /// property are lists they are merged, otherwise the entry is replaced.
    pub fn merge(&mut self, property: Property) {
        let Some(name) = property.name().filter(|n| !n.is_empty()).map(str::to_string) else {
            debug!("Ignoring unnamed property {}", property);
            return;
        };

        match self.properties.get_mut(&name) {
            Some(existing) if existing.is_composite() && property.is_composite() => {
                debug!("Merging property list '{}'", name);
                merge_composite(property, existing);
            }
            _ => {
                self.properties.insert(name, property);
            }
        }
    }

    /// Remove the entry with the property's name
    pub fn remove(&mut self, property: &Property) -> Option<Property> {
        let name = property.name().filter(|n| !n.is_empty())?;
        self.properties.remove(name)
    }

    pub fn remove_by_name(&mut self, name: &str) -> Option<Property> {
        self.properties.remove(name)
    }

    /// Look up a property by plain name or dotted path
    ///
    /// `server.port` finds the child `port` of the top-level list `server`.
    /// A path that runs through a leaf finds nothing.
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        if name.is_empty() {
            return None;
        }
        if !name.contains('.') {
            return self.properties.get(name);
        }

        let mut segments = name.split('.');
        let mut current = self.properties.get(segments.next()?)?;
        for segment in segments {
            current = match by_name(current, segment) {
                Some(property) => property,
                None => {
                    debug!("Property path '{}' stops before '{}'", name, segment);
                    return None;
                }
            };
        }
        Some(current)
    }

    pub fn get_property_mut(&mut self, name: &str) -> Option<&mut Property> {
        if name.is_empty() {
            return None;
        }

        let mut segments = name.split('.');
        let mut current = self.properties.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.children_mut().find(|p| p.name() == Some(segment))?;
        }
        Some(current)
    }

    /// Look up the property a reference points to
    pub fn get_property_by_reference(&self, property: &Property) -> Option<&Property> {
        self.get_property(property.reference()?)
    }

    pub fn get_all(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Resolve the references of a stored property list in place
    ///
    /// Returns `Ok(false)` when no property has that name.
    pub fn resolve_property(&mut self, name: &str) -> Result<bool, PropertyError> {
        let Some(property) = self.get_property(name) else {
            return Ok(false);
        };
        if !property.is_composite() {
            return Err(PropertyError::NotAComposite(name.to_string()));
        }

        let mut resolved = property.deep_copy();
        resolve_references(&mut resolved, self)?;
        if let Some(slot) = self.get_property_mut(name) {
            *slot = resolved;
        }
        Ok(true)
    }

    /// Resolve every top-level property list until the values settle
    ///
    /// Lists are visited in name order and whole passes repeat until one
    /// changes nothing, so chained references resolve whatever order the
    /// lists were stored in. Returns the number of passes run.
    pub fn resolve_all(&mut self) -> Result<usize, PropertyError> {
        let mut names: Vec<String> = self
            .properties
            .iter()
            .filter(|(_, p)| p.is_composite())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();

        let max_passes = names.len() + 1;
        for pass in 1..=max_passes {
            let mut changed = false;
            for name in &names {
                let before = self.properties.get(name).map(Property::deep_copy);
                self.resolve_property(name)?;
                changed |= self.properties.get(name) != before.as_ref();
            }
            if !changed {
                debug!("Resolved {} property lists in {} passes", names.len(), pass);
                return Ok(pass);
            }
        }

        warn!("Property references still changing after {} passes", max_passes);
        Ok(max_passes)
    }

    pub fn add_proxy_configuration(&self, configuration: ProxyConfiguration) {
        let previous = self
            .proxy_configurations
            .write()
            .insert(configuration.sub_engine, configuration);
        if let Some(previous) = previous {
            debug!("Replaced proxy configuration '{}'", previous.name);
        }
    }

    pub fn proxy_configuration(&self, sub_engine: SubEngineType) -> Option<ProxyConfiguration> {
        self.proxy_configurations.read().get(&sub_engine).cloned()
    }

    /// Record the element currently executing at its hierarchy level
    pub fn set_current_test_config_element(&self, element: TestConfigElement) {
        match element.level {
            Some(level) => {
                self.current_test_config_elements.write().insert(level, element);
            }
            None => warn!("Config element '{}' has no hierarchy level", element.name),
        }
    }

    pub fn current_test_config_element(&self, level: HierarchyLevel) -> Option<TestConfigElement> {
        self.current_test_config_elements.read().get(&level).cloned()
    }

    pub fn current_test_script(&self) -> Option<&TestScript> {
        self.current_test_script.as_ref()
    }

    pub fn set_current_test_script(&mut self, script: Option<TestScript>) {
        self.current_test_script = script;
    }

    pub fn current_test_script_element(&self) -> Option<&TestScriptElement> {
        self.current_test_script_element.as_ref()
    }

    pub fn set_current_test_script_element(&mut self, element: Option<TestScriptElement>) {
        self.current_test_script_element = element;
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    pub fn set_tracing(&mut self, tracing: bool) {
        self.tracing = tracing;
    }

    pub fn execution_controller(&self) -> Option<Arc<dyn ExecutionController>> {
        self.execution_controller.clone()
    }

    pub fn set_execution_controller(&mut self, controller: Arc<dyn ExecutionController>) {
        self.execution_controller = Some(controller);
    }

    pub fn test_configuration_result(&self) -> Option<Arc<Mutex<TestConfigurationResult>>> {
        self.test_configuration_result.clone()
    }

    pub fn set_test_configuration_result(&mut self, result: Arc<Mutex<TestConfigurationResult>>) {
        self.test_configuration_result = Some(result);
    }

    /// Copy of this context for an independent sub-run
    ///
    /// Properties are deep-copied. The proxy configurations, current config
    /// elements, controller and result tree stay shared. The current script
    /// and script element are not carried over.
    pub fn duplicate(&self) -> TestContext {
        TestContext {
            properties: self
                .properties
                .iter()
                .map(|(name, property)| (name.clone(), property.deep_copy()))
                .collect(),
            proxy_configurations: Arc::clone(&self.proxy_configurations),
            current_test_config_elements: Arc::clone(&self.current_test_config_elements),
            current_test_script: None,
            current_test_script_element: None,
            execution_controller: self.execution_controller.clone(),
            test_configuration_result: self.test_configuration_result.clone(),
            tracing: self.tracing,
        }
    }
}
