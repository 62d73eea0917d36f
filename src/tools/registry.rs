//! Tool Registry
//!
//! Ordered catalog of [`ToolDescriptor`]s with O(1) lookup by wire name.
//!
//! # Example
//!
//! ```rust
//! use eks_mcp::tools::catalog::{Category, ToolName};
//! use eks_mcp::tools::registry::catalog;
//!
//! let descriptor = catalog().find_tool("get_pod_logs").unwrap();
//! assert_eq!(descriptor.name, ToolName::GetPodLogs);
//! assert_eq!(catalog().by_category(Category::Helm).count(), 4);
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

use crate::mcp::protocol::Tool;
use crate::tools::catalog::{Category, ToolName};
use crate::tools::descriptor::ToolDescriptor;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool registered more than once: {0}")]
    DuplicateTool(ToolName),
}

#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

/// Built-in catalog, constructed once per process
static CATALOG: LazyLock<ToolRegistry> = LazyLock::new(ToolRegistry::builtin);

pub fn catalog() -> &'static ToolRegistry {
    &CATALOG
}

impl ToolRegistry {
    /// Every built-in tool in [`ToolName::ALL`] order
    pub fn builtin() -> Self {
        let tools: Vec<ToolDescriptor> =
            ToolName::ALL.into_iter().map(ToolDescriptor::builtin).collect();
        let index =
            tools.iter().enumerate().map(|(pos, d)| (d.name.as_str(), pos)).collect();
        Self { tools, index }
    }

    pub fn from_descriptors(tools: Vec<ToolDescriptor>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(tools.len());
        for (pos, descriptor) in tools.iter().enumerate() {
            if index.insert(descriptor.name.as_str(), pos).is_some() {
                return Err(RegistryError::DuplicateTool(descriptor.name));
            }
        }
        Ok(Self { tools, index })
    }

    /// Descriptors in registration order
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn find_tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&pos| &self.tools[pos])
    }

    pub fn get(&self, name: ToolName) -> Option<&ToolDescriptor> {
        self.find_tool(name.as_str())
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().filter(move |d| d.category() == category)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn to_mcp_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_mcp_tool).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tool_returns_listed_descriptor() {
        let registry = ToolRegistry::builtin();
        for descriptor in registry.list_tools() {
            let found = registry.find_tool(descriptor.name.as_str()).unwrap();
            assert!(std::ptr::eq(found, descriptor));
        }
        assert!(registry.find_tool("does_not_exist").is_none());
    }

    #[test]
    fn test_builtin_order_and_size() {
        let registry = catalog();
        assert_eq!(registry.len(), 14);
        let names: Vec<ToolName> = registry.list_tools().iter().map(|d| d.name).collect();
        assert_eq!(names, ToolName::ALL.to_vec());
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let result = ToolRegistry::from_descriptors(vec![
            ToolDescriptor::builtin(ToolName::ListPods),
            ToolDescriptor::builtin(ToolName::Help),
            ToolDescriptor::builtin(ToolName::ListPods),
        ]);
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateTool(ToolName::ListPods));
    }

    #[test]
    fn test_custom_registry_subset() {
        let registry = ToolRegistry::from_descriptors(vec![
            ToolDescriptor::builtin(ToolName::Help),
            ToolDescriptor::builtin(ToolName::ListNamespaces),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get(ToolName::ListPods).is_none());
        assert_eq!(registry.by_category(Category::Cluster).count(), 1);
    }

    #[test]
    fn test_every_tool_in_exactly_one_category() {
        let registry = catalog();
        let categorized: usize =
            Category::ALL.iter().map(|&c| registry.by_category(c).count()).sum();
        assert_eq!(categorized, registry.len());
    }
}
