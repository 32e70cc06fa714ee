//! Data models for the test run context
//!
//! Properties, script pointers, proxy configurations and the result tree.

mod property;
mod script;
mod test_result;

pub use property::{
    NativeValue, Property, PropertyContainer, PropertyList, PropertyType, PropertyValue,
};
pub use script::{
    HierarchyLevel, ProxyConfiguration, ScriptElementKind, SubEngineType, TestConfigElement,
    TestScript, TestScriptElement,
};
pub use test_result::{ConfigurationStatus, TestConfigurationResult, TestResult, TestStatus};
