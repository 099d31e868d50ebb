//! Static analysis over a parsed plan.
//!
//! Walks every statement, descending into both branches of `IF` and into
//! `FOR` bodies, and collects tool invocations in document order. The
//! required-capability list is that sequence of names with duplicates
//! removed, keeping first appearance.

use crate::ast::{PlanNode, Statement, ToolInvocation};
use indexmap::IndexSet;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub required_capabilities: Vec<String>,
    pub invocations: Vec<ToolInvocation>,
    pub plan: PlanNode,
}

pub fn analyze_plan(plan: PlanNode) -> Analysis {
    let mut invocations = Vec::new();
    collect_invocations(&plan.statements, &mut invocations);

    let required_capabilities = invocations
        .iter()
        .map(|call| call.name.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();

    Analysis {
        required_capabilities,
        invocations,
        plan,
    }
}

fn collect_invocations(statements: &[Statement], out: &mut Vec<ToolInvocation>) {
    for statement in statements {
        match statement {
            Statement::Call(call) => out.push(call.clone()),
            Statement::If {
                then_block,
                else_block,
                ..
            } => {
                collect_invocations(&then_block.statements, out);
                if let Some(else_block) = else_block {
                    collect_invocations(&else_block.statements, out);
                }
            }
            Statement::For { body, .. } => collect_invocations(&body.statements, out),
            Statement::Let { .. } | Statement::Return { .. } | Statement::Empty => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collects_nested_invocations_in_document_order() {
        let source = r#"
CALL fetch id=1 -> a
IF $a == 1: {
  CALL notify
} ELSE: {
  FOR x IN $a: {
    CALL fetch id=$x
    CALL store v=$x
  }
}
CALL notify
"#;
        let analysis = parse(source).unwrap();
        let names: Vec<&str> = analysis
            .invocations
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["fetch", "notify", "fetch", "store", "notify"]);
        assert_eq!(
            analysis.required_capabilities,
            vec!["fetch".to_string(), "notify".to_string(), "store".to_string()]
        );
    }

    #[test]
    fn test_no_calls() {
        let analysis = parse("LET a = 1\nRETURN $a").unwrap();
        assert!(analysis.invocations.is_empty());
        assert!(analysis.required_capabilities.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let analysis = parse("CALL ping -> pong").unwrap();
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["requiredCapabilities"], serde_json::json!(["ping"]));
        assert_eq!(json["invocations"][0]["name"], "ping");
        assert_eq!(json["invocations"][0]["capture"], "pong");
        assert_eq!(json["plan"]["kind"], "script");
        assert_eq!(json["plan"]["statements"][0]["type"], "call");
    }
}
