//! Test script and configuration element models
//!
//! Pointers a running interpreter keeps in the context, plus the
//! per-sub-engine proxy configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::property::{Property, PropertyType};

/// Level of a configuration element within the test configuration tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl HierarchyLevel {
    /// Get level number (1-5)
    pub fn number(&self) -> u8 {
        match self {
            HierarchyLevel::One => 1,
            HierarchyLevel::Two => 2,
            HierarchyLevel::Three => 3,
            HierarchyLevel::Four => 4,
            HierarchyLevel::Five => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<HierarchyLevel> {
        match n {
            1 => Some(HierarchyLevel::One),
            2 => Some(HierarchyLevel::Two),
            3 => Some(HierarchyLevel::Three),
            4 => Some(HierarchyLevel::Four),
            5 => Some(HierarchyLevel::Five),
            _ => None,
        }
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}", self.number())
    }
}

/// Element of the test configuration (suite, case, step, ...)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestConfigElement {
    pub id: u64,
    pub name: String,
    /// Level of the schema element this element was built from
    pub level: Option<HierarchyLevel>,
    #[serde(default)]
    pub skipped: bool,
}

impl TestConfigElement {
    pub fn new(id: u64, name: impl Into<String>, level: HierarchyLevel) -> Self {
        Self {
            id,
            name: name.into(),
            level: Some(level),
            skipped: false,
        }
    }

    /// Whether the element is excluded from the run
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn set_skipped(&mut self, skipped: bool) {
        self.skipped = skipped;
    }
}

/// Kind of a script element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptElementKind {
    Action,
    Assertion,
    Condition,
    Loop,
    Lock,
    Logger,
    PropertyAction,
    TextMessage,
    EmbeddedScript,
}

/// A single element of a test script
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestScriptElement {
    pub id: u64,
    pub name: String,
    pub kind: ScriptElementKind,
}

impl TestScriptElement {
    pub fn new(id: u64, name: impl Into<String>, kind: ScriptElementKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

/// A test script interpreted by the engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestScript {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<TestScriptElement>,
}

impl TestScript {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: TestScriptElement) -> Self {
        self.elements.push(element);
        self
    }
}

/// Sub-engines a test run can delegate to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubEngineType {
    Web,
    Swing,
    Database,
    WebService,
    Process,
    FileSystem,
    Mail,
    Script,
}

impl SubEngineType {
    pub fn name(&self) -> &'static str {
        match self {
            SubEngineType::Web => "Web",
            SubEngineType::Swing => "Swing",
            SubEngineType::Database => "Database",
            SubEngineType::WebService => "Web Service",
            SubEngineType::Process => "Process",
            SubEngineType::FileSystem => "File System",
            SubEngineType::Mail => "Mail",
            SubEngineType::Script => "Script",
        }
    }
}

impl fmt::Display for SubEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Connection settings for one sub-engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfiguration {
    pub sub_engine: SubEngineType,
    pub name: String,
    /// Settings as a property list
    pub configuration: Property,
}

impl ProxyConfiguration {
    pub fn new(sub_engine: SubEngineType, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            sub_engine,
            configuration: Property::named(PropertyType::List, name.clone()),
            name,
        }
    }

    pub fn with_configuration(mut self, configuration: Property) -> Self {
        self.configuration = configuration;
        self
    }
}
