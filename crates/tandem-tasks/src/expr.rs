//! Task expressions: scripts combined sequentially or in parallel
//!
//! Tokens are script references separated either by the explicit parallel
//! operator (`a // b`) or by nothing at all (`a b`, run one after the other).
//! Both forms cannot be mixed at the same level and there is no nesting.
//! A token containing spaces is a script followed by its arguments.

use std::fmt;

use crate::error::{PlanError, Result};
use crate::task::GroupOperator;

/// The explicit parallel operator
pub const PARALLEL_OPERATOR: &str = "//";

/// Parsed task expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskExpr {
    /// A single script reference
    Script { script: String, args: Vec<String> },
    /// Several expressions under one operator
    Group {
        operator: GroupOperator,
        children: Vec<TaskExpr>,
    },
}

impl TaskExpr {
    /// Parse command line tokens into an expression
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let mut children = Vec::new();
        let mut expect_term = true;
        let mut parallel = false;
        let mut sequential = false;

        for token in tokens {
            let token = token.as_ref().trim();

            if token == PARALLEL_OPERATOR {
                if expect_term {
                    return Err(syntax(format!(
                        "expected a script before '{}'",
                        PARALLEL_OPERATOR
                    )));
                }
                parallel = true;
                expect_term = true;
                continue;
            }

            if !expect_term {
                sequential = true;
            }
            children.push(Self::leaf(token)?);
            expect_term = false;
        }

        if children.is_empty() {
            return Err(syntax("empty task expression"));
        }
        if expect_term {
            return Err(syntax(format!(
                "expected a script after '{}'",
                PARALLEL_OPERATOR
            )));
        }
        if parallel && sequential {
            return Err(syntax(format!(
                "cannot mix '{}' with sequential scripts at the same level",
                PARALLEL_OPERATOR
            )));
        }

        if children.len() == 1 {
            return Ok(children.remove(0));
        }

        let operator = if parallel {
            GroupOperator::Parallel
        } else {
            GroupOperator::Sequential
        };
        Ok(Self::Group { operator, children })
    }

    fn leaf(token: &str) -> Result<Self> {
        let mut words = token.split_whitespace().map(str::to_string);
        let script = words
            .next()
            .ok_or_else(|| syntax("empty script reference"))?;

        Ok(Self::Script {
            script,
            args: words.collect(),
        })
    }
}

impl fmt::Display for TaskExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script { script, args } => {
                write!(f, "{}", script)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Self::Group { operator, children } => {
                let sep = match operator {
                    GroupOperator::Parallel => " // ",
                    GroupOperator::Sequential => " -> ",
                };
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(sep)?;
                    }
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
        }
    }
}

fn syntax(message: impl Into<String>) -> PlanError {
    PlanError::ExpressionSyntax(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(name: &str) -> TaskExpr {
        TaskExpr::Script {
            script: name.to_string(),
            args: Vec::new(),
        }
    }

    #[test]
    fn test_single_script() {
        assert_eq!(TaskExpr::parse(&["build"]).unwrap(), script("build"));
    }

    #[test]
    fn test_parallel() {
        let expr = TaskExpr::parse(&["a", "//", "b", "//", "c"]).unwrap();
        assert_eq!(
            expr,
            TaskExpr::Group {
                operator: GroupOperator::Parallel,
                children: vec![script("a"), script("b"), script("c")],
            }
        );
        assert_eq!(expr.to_string(), "a // b // c");
    }

    #[test]
    fn test_adjacent_scripts_are_sequential() {
        let expr = TaskExpr::parse(&["a", "b"]).unwrap();
        assert_eq!(
            expr,
            TaskExpr::Group {
                operator: GroupOperator::Sequential,
                children: vec![script("a"), script("b")],
            }
        );
        assert_eq!(expr.to_string(), "a -> b");
    }

    #[test]
    fn test_script_arguments() {
        let expr = TaskExpr::parse(&["test --ci", "//", "lint"]).unwrap();
        let TaskExpr::Group { children, .. } = expr else {
            panic!("expected a group");
        };
        assert_eq!(
            children[0],
            TaskExpr::Script {
                script: "test".to_string(),
                args: vec!["--ci".to_string()],
            }
        );
    }

    #[test]
    fn test_mixed_operators_rejected() {
        let err = TaskExpr::parse(&["a", "b", "//", "c"]).unwrap_err();
        assert!(matches!(err, PlanError::ExpressionSyntax(_)));

        let err = TaskExpr::parse(&["a", "//", "b", "c"]).unwrap_err();
        assert!(matches!(err, PlanError::ExpressionSyntax(_)));
    }

    #[test]
    fn test_malformed_expressions() {
        let empty: [&str; 0] = [];
        for tokens in [
            &empty[..],
            &["//", "a"][..],
            &["a", "//"][..],
            &["a", "//", "//", "b"][..],
            &["  "][..],
        ] {
            assert!(
                matches!(TaskExpr::parse(tokens), Err(PlanError::ExpressionSyntax(_))),
                "{:?} should be rejected",
                tokens
            );
        }
    }
}
