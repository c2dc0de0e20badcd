use super::{parser, BinaryOp, BuiltinFunction, CompileError, Expr, IndexArg, UnaryOp};
use crate::model::{
    context::{ContextError, DecisionContext},
    schema::{VariableDeclaration, VariableSchema},
    TimePeriod,
};
use itertools::Itertools;
use std::sync::Arc;

/// which zone of the decision a zone or matrix lookup reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneRef {
    Origin,
    /// the destination of the decision, or the zone of the alternative
    /// being evaluated when the alternative carries one
    Destination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodRef {
    /// the time period bound to the decision context
    Context,
    Fixed(TimePeriod),
}

/// a variable reference bound to its access strategy.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedVariable {
    Scalar {
        name: Arc<str>,
        slot: usize,
    },
    Alternative {
        name: Arc<str>,
        slot: usize,
    },
    Zone {
        name: Arc<str>,
        zone: ZoneRef,
    },
    Matrix {
        name: Arc<str>,
        origin: ZoneRef,
        destination: ZoneRef,
        period: PeriodRef,
    },
}

impl ResolvedVariable {
    pub fn name(&self) -> &str {
        match self {
            ResolvedVariable::Scalar { name, .. } => name,
            ResolvedVariable::Alternative { name, .. } => name,
            ResolvedVariable::Zone { name, .. } => name,
            ResolvedVariable::Matrix { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Constant(f64),
    Variable(ResolvedVariable),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Conditional(Box<Node>, Box<Node>, Box<Node>),
    Call(BuiltinFunction, Vec<Node>),
}

/// an expression compiled against a [`VariableSchema`]. immutable, and safe to
/// share across threads.
#[derive(Clone, Debug)]
pub struct CompiledExpression {
    source: String,
    root: Node,
}

impl CompiledExpression {
    pub fn compile(text: &str, schema: &VariableSchema) -> Result<CompiledExpression, CompileError> {
        let ast = parser::parse(text)?;
        let root = resolve(&ast, schema)?;
        Ok(CompiledExpression {
            source: text.to_string(),
            root,
        })
    }

    /// an expression that always evaluates to `value`
    pub fn constant(value: f64) -> CompiledExpression {
        CompiledExpression {
            source: value.to_string(),
            root: Node::Constant(value),
        }
    }

    /// the expression text this was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// the value of this expression if it does not depend on any variable.
    pub fn constant_value(&self) -> Option<f64> {
        match self.root {
            Node::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// the distinct variables this expression reads, in order of first appearance
    pub fn variables(&self) -> Vec<&ResolvedVariable> {
        let mut found = vec![];
        self.root.collect_variables(&mut found);
        found.into_iter().unique_by(|v| v.name().to_string()).collect()
    }

    /// evaluates the expression for the alternative at `alternative` (its position
    /// in the model specification). a variable the context cannot serve
    /// stops evaluation with [`ContextError::MissingVariable`].
    pub fn evaluate(
        &self,
        context: &DecisionContext<'_>,
        alternative: usize,
    ) -> Result<f64, ContextError> {
        self.root.evaluate(context, alternative)
    }
}

impl Node {
    fn evaluate(&self, context: &DecisionContext<'_>, alternative: usize) -> Result<f64, ContextError> {
        match self {
            Node::Constant(value) => Ok(*value),
            Node::Variable(variable) => context.resolve(variable, alternative),
            Node::Unary(op, operand) => Ok(op.apply(operand.evaluate(context, alternative)?)),
            Node::Binary(BinaryOp::And, lhs, rhs) => {
                let l = lhs.evaluate(context, alternative)?;
                if l == 0.0 {
                    return Ok(0.0);
                }
                let r = rhs.evaluate(context, alternative)?;
                Ok(BinaryOp::And.apply(l, r))
            }
            Node::Binary(BinaryOp::Or, lhs, rhs) => {
                let l = lhs.evaluate(context, alternative)?;
                if l.is_nan() {
                    return Ok(f64::NAN);
                }
                if l != 0.0 {
                    return Ok(1.0);
                }
                let r = rhs.evaluate(context, alternative)?;
                Ok(BinaryOp::Or.apply(l, r))
            }
            Node::Binary(op, lhs, rhs) => {
                let l = lhs.evaluate(context, alternative)?;
                let r = rhs.evaluate(context, alternative)?;
                Ok(op.apply(l, r))
            }
            Node::Conditional(condition, if_true, if_false) => {
                let c = condition.evaluate(context, alternative)?;
                if c.is_nan() {
                    Ok(f64::NAN)
                } else if c != 0.0 {
                    if_true.evaluate(context, alternative)
                } else {
                    if_false.evaluate(context, alternative)
                }
            }
            Node::Call(function, args) => match args.as_slice() {
                [arg] => {
                    let value = arg.evaluate(context, alternative)?;
                    Ok(function.apply(std::slice::from_ref(&value)))
                }
                _ => {
                    let values = args
                        .iter()
                        .map(|a| a.evaluate(context, alternative))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(function.apply(&values))
                }
            },
        }
    }

    fn collect_variables<'a>(&'a self, found: &mut Vec<&'a ResolvedVariable>) {
        match self {
            Node::Constant(_) => {}
            Node::Variable(v) => found.push(v),
            Node::Unary(_, operand) => operand.collect_variables(found),
            Node::Binary(_, lhs, rhs) => {
                lhs.collect_variables(found);
                rhs.collect_variables(found);
            }
            Node::Conditional(c, t, f) => {
                c.collect_variables(found);
                t.collect_variables(found);
                f.collect_variables(found);
            }
            Node::Call(_, args) => args.iter().for_each(|a| a.collect_variables(found)),
        }
    }
}

/// binds variable references to the schema and folds sub-trees that do not
/// depend on any variable.
fn resolve(expr: &Expr, schema: &VariableSchema) -> Result<Node, CompileError> {
    let node = match expr {
        Expr::Constant(value) => Node::Constant(*value),
        Expr::Variable {
            name,
            indices,
            position,
        } => resolve_variable(name, indices, *position, schema)?,
        Expr::Unary { op, operand } => match resolve(operand, schema)? {
            Node::Constant(value) => Node::Constant(op.apply(value)),
            other => Node::Unary(*op, Box::new(other)),
        },
        Expr::Binary { op, lhs, rhs } => {
            match (resolve(lhs, schema)?, resolve(rhs, schema)?) {
                (Node::Constant(l), Node::Constant(r)) => Node::Constant(op.apply(l, r)),
                (l, r) => Node::Binary(*op, Box::new(l), Box::new(r)),
            }
        }
        Expr::Conditional {
            condition,
            if_true,
            if_false,
        } => {
            let c = resolve(condition, schema)?;
            let t = resolve(if_true, schema)?;
            let f = resolve(if_false, schema)?;
            match c {
                Node::Constant(value) if value.is_nan() => Node::Constant(f64::NAN),
                Node::Constant(value) if value != 0.0 => t,
                Node::Constant(_) => f,
                c => Node::Conditional(Box::new(c), Box::new(t), Box::new(f)),
            }
        }
        Expr::Call { function, args } => {
            let resolved = args
                .iter()
                .map(|a| resolve(a, schema))
                .collect::<Result<Vec<_>, _>>()?;
            let constants = resolved
                .iter()
                .map(|n| match n {
                    Node::Constant(v) => Some(*v),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>();
            match constants {
                Some(values) => Node::Constant(function.apply(&values)),
                None => Node::Call(*function, resolved),
            }
        }
    };
    Ok(node)
}

fn resolve_variable(
    name: &str,
    indices: &[IndexArg],
    position: usize,
    schema: &VariableSchema,
) -> Result<Node, CompileError> {
    let declaration = schema
        .get(name)
        .ok_or_else(|| CompileError::UnknownVariable {
            name: name.to_string(),
            position,
        })?;
    let shared: Arc<str> = Arc::from(name);
    let zone_ref = |index: &IndexArg| match index {
        IndexArg::Origin => Ok(ZoneRef::Origin),
        IndexArg::Destination => Ok(ZoneRef::Destination),
        other => Err(CompileError::syntax(
            position,
            format!("variable '{name}' expects a zone index (orig or dest), found '{other}'"),
        )),
    };
    use VariableDeclaration as D;
    let variable = match (declaration, indices) {
        (D::Constant { value }, []) => return Ok(Node::Constant(*value)),
        (D::Scalar { slot }, []) => ResolvedVariable::Scalar {
            name: shared,
            slot: *slot,
        },
        (D::Alternative { slot }, []) | (D::Alternative { slot }, [IndexArg::Alternative]) => {
            ResolvedVariable::Alternative {
                name: shared,
                slot: *slot,
            }
        }
        (D::Zone, [index]) => ResolvedVariable::Zone {
            name: shared,
            zone: zone_ref(index)?,
        },
        (D::Matrix, [origin, destination]) => ResolvedVariable::Matrix {
            name: shared,
            origin: zone_ref(origin)?,
            destination: zone_ref(destination)?,
            period: PeriodRef::Context,
        },
        (D::Matrix, [origin, destination, period]) => {
            let period = match period {
                IndexArg::Period => PeriodRef::Context,
                IndexArg::Literal(p) => PeriodRef::Fixed(*p),
                other => {
                    return Err(CompileError::syntax(
                        position,
                        format!(
                            "variable '{name}' expects a time period index (period or a number), found '{other}'"
                        ),
                    ))
                }
            };
            ResolvedVariable::Matrix {
                name: shared,
                origin: zone_ref(origin)?,
                destination: zone_ref(destination)?,
                period,
            }
        }
        (declaration, _) => {
            let expected = match declaration {
                D::Scalar { .. } | D::Constant { .. } => "no index",
                D::Alternative { .. } => "no index or [alt]",
                D::Zone => "[orig] or [dest]",
                D::Matrix => "[orig, dest] with an optional time period",
            };
            let found = if indices.is_empty() {
                String::from("no index")
            } else {
                format!("[{}]", indices.iter().join(", "))
            };
            return Err(CompileError::syntax(
                position,
                format!(
                    "{} variable '{name}' expects {expected}, found {found}",
                    declaration.scope()
                ),
            ));
        }
    };
    Ok(Node::Variable(variable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        context::{
            AttributeSet, DecisionContext, InMemoryMatrixProvider, InMemoryZoneData, ModelData,
            SkimMatrix,
        },
        schema::VariableScope,
    };

    fn schema() -> VariableSchema {
        let mut schema = VariableSchema::new();
        schema.declare("ivt", VariableScope::Scalar).expect("test invariant failed");
        schema.declare("cost", VariableScope::Scalar).expect("test invariant failed");
        schema.declare("mode", VariableScope::Scalar).expect("test invariant failed");
        schema.declare("fare", VariableScope::Alternative).expect("test invariant failed");
        schema.declare("parking", VariableScope::Zone).expect("test invariant failed");
        schema.declare("sov_time", VariableScope::Matrix).expect("test invariant failed");
        schema.declare_constant("c_ivt", -0.05).expect("test invariant failed");
        schema
    }

    fn attributes() -> AttributeSet {
        AttributeSet::new()
            .with_scalar("ivt", 20.0)
            .with_scalar("cost", 150.0)
            .with_scalar("mode", 1.0)
    }

    #[test]
    fn test_worked_example() {
        let schema = schema();
        let expr = CompiledExpression::compile(
            "@ivt * -0.05 + @cost * -0.01 + (@mode==1 ? 0.8 : 0)",
            &schema,
        )
        .expect("test invariant failed");
        let data = ModelData::default();
        let attrs = attributes();
        let context = DecisionContext::builder(1).bind_schema(&schema, &attrs, &data);
        let value = expr.evaluate(&context, 0).expect("test invariant failed");
        assert!((value - -1.7).abs() < 1e-12, "found {value}");
    }

    #[test]
    fn test_constant_expression_is_folded() {
        let schema = schema();
        let expr = CompiledExpression::compile("2+2", &schema).expect("test invariant failed");
        assert_eq!(expr.constant_value(), Some(4.0));

        let data = ModelData::default();
        let empty = AttributeSet::new();
        let full = attributes();
        let a = DecisionContext::builder(1).bind_schema(&schema, &empty, &data);
        let b = DecisionContext::builder(2)
            .origin(4)
            .destination(9)
            .bind_schema(&schema, &full, &data);
        assert_eq!(expr.evaluate(&a, 0), Ok(4.0));
        assert_eq!(expr.evaluate(&b, 3), Ok(4.0));
    }

    #[test]
    fn test_named_constants_fold() {
        let schema = schema();
        let expr = CompiledExpression::compile("c_ivt * 10 + max(1, 2)", &schema)
            .expect("test invariant failed");
        let value = expr.constant_value().expect("should fold");
        assert!((value - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_variable() {
        let schema = schema();
        let result = CompiledExpression::compile("@ivt + @walk_time", &schema);
        assert_eq!(
            result.map(|_| ()),
            Err(CompileError::UnknownVariable {
                name: "walk_time".into(),
                position: 7
            })
        );
    }

    #[test]
    fn test_unknown_variable_in_folded_branch_still_fails() {
        let schema = schema();
        let result = CompiledExpression::compile("1 ? 2 : @nope", &schema);
        assert!(matches!(result, Err(CompileError::UnknownVariable { .. })));
    }

    #[test]
    fn test_index_must_fit_scope() {
        let schema = schema();
        for text in ["@ivt[alt]", "@parking", "@sov_time[orig]", "@sov_time[orig, alt]", "@sov_time[orig, dest, orig]"] {
            let result = CompiledExpression::compile(text, &schema);
            assert!(
                matches!(result, Err(CompileError::SyntaxError { position: 0, .. })),
                "expected syntax error for {text}, found {result:?}"
            );
        }
    }

    #[test]
    fn test_missing_variable_is_runtime_error() {
        let schema = schema();
        let expr = CompiledExpression::compile("@ivt * 2", &schema).expect("test invariant failed");
        let data = ModelData::default();
        let attrs = AttributeSet::new().with_scalar("cost", 1.0);
        let context = DecisionContext::builder(7).bind_schema(&schema, &attrs, &data);
        assert_eq!(
            expr.evaluate(&context, 0),
            Err(ContextError::MissingVariable {
                decision_maker_id: 7,
                name: "ivt".into()
            })
        );
    }

    #[test]
    fn test_short_circuit_skips_missing_variable() {
        let schema = schema();
        let data = ModelData::default();
        let attrs = AttributeSet::new().with_scalar("mode", 0.0);
        let context = DecisionContext::builder(1).bind_schema(&schema, &attrs, &data);
        let and = CompiledExpression::compile("@mode && @ivt", &schema).expect("test invariant failed");
        let cond = CompiledExpression::compile("@mode == 1 ? @ivt : 3", &schema).expect("test invariant failed");
        assert_eq!(and.evaluate(&context, 0), Ok(0.0));
        assert_eq!(cond.evaluate(&context, 0), Ok(3.0));
    }

    #[test]
    fn test_matrix_lookup() {
        let schema = schema();
        let mut matrices = InMemoryMatrixProvider::default();
        let skim = SkimMatrix::new(&[1, 2], vec![1.0, 12.0, 21.0, 2.0]).expect("test invariant failed");
        matrices.insert("sov_time", None, skim);
        let data = ModelData::new(Arc::new(matrices), Arc::new(InMemoryZoneData::default()));
        let attrs = AttributeSet::new();
        let context = DecisionContext::builder(1)
            .origin(1)
            .destination(2)
            .bind_schema(&schema, &attrs, &data);
        let outbound = CompiledExpression::compile("@sov_time[orig, dest]", &schema).expect("test invariant failed");
        let inbound = CompiledExpression::compile("@sov_time[dest, orig]", &schema).expect("test invariant failed");
        assert_eq!(outbound.evaluate(&context, 0), Ok(12.0));
        assert_eq!(inbound.evaluate(&context, 0), Ok(21.0));
    }

    #[test]
    fn test_repeated_evaluation_is_identical() {
        let schema = schema();
        let expr = CompiledExpression::compile("ln(@ivt) * exp(-@cost / 100) + abs(@mode - 3)", &schema)
            .expect("test invariant failed");
        let data = ModelData::default();
        let attrs = attributes();
        let context = DecisionContext::builder(1).bind_schema(&schema, &attrs, &data);
        let first = expr.evaluate(&context, 0).expect("test invariant failed");
        let second = expr.evaluate(&context, 0).expect("test invariant failed");
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_variables_listed_once() {
        let schema = schema();
        let expr = CompiledExpression::compile("@ivt + @ivt * @fare[alt] + c_ivt", &schema).expect("test invariant failed");
        let names: Vec<&str> = expr.variables().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["ivt", "fare"]);
    }
}
