//! Pure evaluation of value expressions and conditions.
//!
//! A bare word resolves in a fixed order:
//!
//! 1. a bound variable of the same name,
//! 2. the keywords `true`, `false` and `null`,
//! 3. numeric text,
//! 4. otherwise the text itself as a string.
//!
//! Keep that order; the tests below pin it.

use super::environment::Environment;
use crate::ast::{Condition, ValueExpr, VarRef};
use crate::values::{compare, index_value, number_from_text};
use indexmap::IndexMap;
use serde_json::{Map, Value};

pub fn resolve_value(expr: &ValueExpr, env: &Environment) -> Value {
    match expr {
        ValueExpr::Number(n) => Value::Number(n.clone()),
        ValueExpr::Bool(b) => Value::Bool(*b),
        ValueExpr::Null => Value::Null,
        ValueExpr::String(s) => Value::String(s.clone()),
        ValueExpr::Bare(text) => resolve_bare(text, env),
        ValueExpr::Array(items) => {
            Value::Array(items.iter().map(|item| resolve_value(item, env)).collect())
        }
        ValueExpr::Map(entries) => Value::Object(resolve_map(entries, env)),
        ValueExpr::Var(var) => resolve_var(var, env),
    }
}

/// Resolve every entry of an argument or map literal, keeping key order.
pub fn resolve_map(entries: &IndexMap<String, ValueExpr>, env: &Environment) -> Map<String, Value> {
    entries
        .iter()
        .map(|(key, expr)| (key.clone(), resolve_value(expr, env)))
        .collect()
}

pub fn resolve_bare(text: &str, env: &Environment) -> Value {
    if let Some(bound) = env.get(text) {
        return bound.clone();
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => match number_from_text(text) {
            Some(n) => Value::Number(n),
            None => Value::String(text.to_string()),
        },
    }
}

/// An unbound variable is null; indexing into null stays null.
pub fn resolve_var(var: &VarRef, env: &Environment) -> Value {
    let mut current = env.get(&var.name).cloned().unwrap_or(Value::Null);
    for step in &var.path {
        if current.is_null() {
            break;
        }
        current = index_value(&current, step);
    }
    current
}

/// `AND` skips its right side when the left is false, `OR` when it is true.
pub fn evaluate_condition(condition: &Condition, env: &Environment) -> bool {
    match condition {
        Condition::Not { inner } => !evaluate_condition(inner, env),
        Condition::And { left, right } => {
            evaluate_condition(left, env) && evaluate_condition(right, env)
        }
        Condition::Or { left, right } => {
            evaluate_condition(left, env) || evaluate_condition(right, env)
        }
        Condition::Cmp { op, left, right } => {
            let left = resolve_value(left, env);
            let right = resolve_value(right, env);
            compare(*op, &left, &right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CmpOp, IndexStep};
    use serde_json::json;

    fn env_with(pairs: &[(&str, Value)]) -> Environment {
        let mut env = Environment::new();
        for (name, value) in pairs {
            env.define(*name, value.clone());
        }
        env
    }

    #[test]
    fn test_bare_resolution_order() {
        let env = env_with(&[("status", json!("pending")), ("true", json!("shadowed"))]);
        // variable first, even over a keyword spelling
        assert_eq!(resolve_bare("status", &env), json!("pending"));
        assert_eq!(resolve_bare("true", &env), json!("shadowed"));
        // then keywords
        assert_eq!(resolve_bare("false", &env), json!(false));
        assert_eq!(resolve_bare("null", &env), Value::Null);
        // then numbers
        assert_eq!(resolve_bare("12", &env), json!(12));
        assert_eq!(resolve_bare("1.5", &env), json!(1.5));
        // then the text itself
        assert_eq!(resolve_bare("search.web", &env), json!("search.web"));
        assert_eq!(resolve_bare("1.2.3", &env), json!("1.2.3"));
    }

    #[test]
    fn test_structures_resolve_element_wise() {
        let env = env_with(&[("id", json!(7))]);
        let mut entries = IndexMap::new();
        entries.insert("order".to_string(), ValueExpr::Var(VarRef::new("id")));
        entries.insert(
            "tags".to_string(),
            ValueExpr::Array(vec![ValueExpr::Bare("a".into()), ValueExpr::Bool(true)]),
        );
        assert_eq!(
            resolve_value(&ValueExpr::Map(entries), &env),
            json!({"order": 7, "tags": ["a", true]})
        );
    }

    #[test]
    fn test_var_paths() {
        let env = env_with(&[("rows", json!([{"name": "a"}, {"name": "b"}]))]);
        let var = VarRef {
            name: "rows".into(),
            path: vec![IndexStep::Position(1), IndexStep::Key("name".into())],
        };
        assert_eq!(resolve_var(&var, &env), json!("b"));

        let missing = VarRef {
            name: "nope".into(),
            path: vec![IndexStep::Position(0), IndexStep::Key("x".into())],
        };
        assert_eq!(resolve_var(&missing, &env), Value::Null);
    }

    #[test]
    fn test_condition_evaluation() {
        let env = env_with(&[("n", json!(3))]);
        let gt = |value: i64| Condition::Cmp {
            op: CmpOp::Gt,
            left: ValueExpr::Var(VarRef::new("n")),
            right: ValueExpr::Number(value.into()),
        };
        assert!(evaluate_condition(&gt(1), &env));
        assert!(!evaluate_condition(
            &Condition::Not {
                inner: Box::new(gt(1))
            },
            &env
        ));
        assert!(evaluate_condition(
            &Condition::Or {
                left: Box::new(gt(10)),
                right: Box::new(gt(2)),
            },
            &env
        ));
        assert!(!evaluate_condition(
            &Condition::And {
                left: Box::new(gt(10)),
                right: Box::new(gt(2)),
            },
            &env
        ));
    }
}
