//! Argument validation properties

use eks_mcp::tools::{self, ToolName};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn test_list_pods_default_namespace_equivalence() {
    let schema = &tools::catalog().get(ToolName::ListPods).unwrap().schema;
    let omitted = schema.validate(&json!({})).unwrap();
    let explicit = schema.validate(&json!({"namespace": "default"})).unwrap();
    assert_eq!(omitted, explicit);
}

proptest! {
    #[test]
    fn prop_defaults_are_deterministic(pod in "[a-z][a-z0-9-]{0,20}") {
        let schema = &tools::catalog().get(ToolName::GetPodLogs).unwrap().schema;
        let first = schema.validate(&json!({"podName": pod})).unwrap();
        let second = schema.validate(&json!({"podName": pod, "namespace": "default", "tailLines": 100})).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.get("tailLines"), Some(&json!(100)));
    }

    #[test]
    fn prop_explicit_namespace_preserved(namespace in "[a-z][a-z0-9-]{0,30}") {
        for tool in [ToolName::ListPods, ToolName::ListServices, ToolName::ListDeployments] {
            let schema = &tools::catalog().get(tool).unwrap().schema;
            let validated = schema.validate(&json!({"namespace": namespace})).unwrap();
            prop_assert_eq!(validated.get("namespace"), Some(&json!(namespace)));
        }
    }

    #[test]
    fn prop_history_max_passthrough(max in 1i64..500) {
        let schema = &tools::catalog().get(ToolName::GetHelmReleaseHistory).unwrap().schema;
        let validated = schema.validate(&json!({"releaseName": "web", "max": max})).unwrap();
        prop_assert_eq!(validated.get("max"), Some(&json!(max)));
    }
}
