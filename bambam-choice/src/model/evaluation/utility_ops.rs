use super::{AlternativeTrace, TermTrace, UtilityTrace, UtilityVector};
use crate::model::{
    context::{ContextError, DecisionContext},
    expression::CompiledExpression,
    spec::{AlternativeSpec, ModelSpec},
};

/// evaluates an expression for the alternative at `alternative`. a variable
/// the context cannot serve is logged and yields NaN, which then propagates
/// through the rest of the expression.
pub fn evaluate(
    expression: &CompiledExpression,
    context: &DecisionContext<'_>,
    alternative: usize,
) -> f64 {
    match expression.evaluate(context, alternative) {
        Ok(value) => value,
        Err(ContextError::MissingVariable {
            decision_maker_id,
            name,
        }) => {
            log::warn!(
                "decision maker {decision_maker_id} is missing variable '{name}' used in `{}`",
                expression.source()
            );
            f64::NAN
        }
        Err(e) => {
            log::warn!(
                "decision maker {} failed evaluating `{}`: {e}",
                context.decision_maker_id(),
                expression.source()
            );
            f64::NAN
        }
    }
}

/// true when the alternative has no availability expression or its expression
/// is non-zero. a NaN availability counts as unavailable.
pub fn evaluate_availability(
    alternative: &AlternativeSpec,
    context: &DecisionContext<'_>,
    position: usize,
) -> bool {
    let Some(expression) = &alternative.availability else {
        return true;
    };
    let value = evaluate(expression, context, position);
    if value.is_nan() {
        log::warn!(
            "availability of alternative '{}' is undefined for decision maker {}, treating as unavailable",
            alternative.name,
            context.decision_maker_id()
        );
        false
    } else {
        value != 0.0
    }
}

/// the sum of coefficient × value over the alternative's utility terms
pub fn evaluate_utility(
    alternative: &AlternativeSpec,
    context: &DecisionContext<'_>,
    position: usize,
) -> f64 {
    alternative
        .terms
        .iter()
        .map(|term| term.coefficient * evaluate(&term.expression, context, position))
        .sum()
}

/// evaluates availability and then utility for every alternative in model
/// order. the utilities of unavailable alternatives are not evaluated, and an
/// alternative whose utility is not finite becomes unavailable.
pub fn evaluate_utilities(spec: &ModelSpec, context: &DecisionContext<'_>) -> UtilityVector {
    let (utilities, _) = evaluate_all(spec, context, false);
    utilities
}

/// as [`evaluate_utilities`], also recording the per-term breakdown.
pub fn trace_utilities(
    spec: &ModelSpec,
    context: &DecisionContext<'_>,
) -> (UtilityVector, UtilityTrace) {
    let (utilities, alternatives) = evaluate_all(spec, context, true);
    let trace = UtilityTrace {
        decision_maker_id: context.decision_maker_id(),
        model: spec.name().to_string(),
        alternatives,
    };
    (utilities, trace)
}

fn evaluate_all(
    spec: &ModelSpec,
    context: &DecisionContext<'_>,
    trace: bool,
) -> (UtilityVector, Vec<AlternativeTrace>) {
    let n = spec.len();
    let mut utilities = Vec::with_capacity(n);
    let mut available = Vec::with_capacity(n);
    let mut traces = Vec::with_capacity(if trace { n } else { 0 });
    for (position, alt) in spec.alternatives().iter().enumerate() {
        if !evaluate_availability(alt, context, position) {
            utilities.push(f64::NAN);
            available.push(false);
            if trace {
                traces.push(AlternativeTrace {
                    id: alt.id,
                    name: alt.name.clone(),
                    available: false,
                    utility: None,
                    terms: vec![],
                });
            }
            continue;
        }
        let (utility, terms) = if trace {
            let terms: Vec<TermTrace> = alt
                .terms
                .iter()
                .map(|term| {
                    let value = evaluate(&term.expression, context, position);
                    TermTrace {
                        description: term.description.clone(),
                        expression: term.expression.source().to_string(),
                        value,
                        coefficient: term.coefficient,
                        contribution: term.coefficient * value,
                    }
                })
                .collect();
            (terms.iter().map(|t| t.contribution).sum::<f64>(), terms)
        } else {
            (evaluate_utility(alt, context, position), vec![])
        };
        let is_finite = utility.is_finite();
        if !is_finite {
            log::warn!(
                "utility of alternative '{}' is {utility} for decision maker {}, treating as unavailable",
                alt.name,
                context.decision_maker_id()
            );
        }
        utilities.push(utility);
        available.push(is_finite);
        if trace {
            traces.push(AlternativeTrace {
                id: alt.id,
                name: alt.name.clone(),
                available: is_finite,
                utility: Some(utility).filter(|u| u.is_finite()),
                terms,
            });
        }
    }
    let vector = UtilityVector::new(context.decision_maker_id(), utilities, available);
    (vector, traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        context::{AttributeSet, ModelData},
        spec::ModelSpecConfig,
    };

    fn spec() -> ModelSpec {
        let config: ModelSpecConfig = toml::from_str(
            r#"
            name = "work_mode"
            [variables]
            ivt = "scalar"
            cost = "scalar"
            mode = "scalar"
            autos = "scalar"
            transit_ivt = "scalar"
            [[alternatives]]
            id = 1
            name = "drive"
            utility = "@ivt * -0.05 + @cost * -0.01 + (@mode==1 ? 0.8 : 0)"
            availability = "@autos > 0"
            [[alternatives]]
            id = 2
            name = "transit"
            terms = [
                { description = "in-vehicle time", expression = "@transit_ivt", coefficient = -0.04 },
                { description = "constant", expression = "1", coefficient = -1.2 },
            ]
            "#,
        )
        .expect("test invariant failed");
        ModelSpec::compile(&config).expect("test invariant failed")
    }

    #[test]
    fn test_utilities() {
        let spec = spec();
        let data = ModelData::default();
        let attrs = AttributeSet::new()
            .with_scalar("ivt", 20.0)
            .with_scalar("cost", 150.0)
            .with_scalar("mode", 1.0)
            .with_scalar("autos", 1.0)
            .with_scalar("transit_ivt", 20.0);
        let context = DecisionContext::builder(1).bind(&spec, &attrs, &data);
        let u = evaluate_utilities(&spec, &context);
        assert!((u.utility(0).expect("available") - -1.7).abs() < 1e-12);
        assert!((u.utility(1).expect("available") - -2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unavailable_and_missing() {
        let spec = spec();
        let data = ModelData::default();
        // no autos, and transit_ivt missing
        let attrs = AttributeSet::new()
            .with_scalar("ivt", 20.0)
            .with_scalar("cost", 150.0)
            .with_scalar("mode", 1.0)
            .with_scalar("autos", 0.0);
        let context = DecisionContext::builder(5).bind(&spec, &attrs, &data);
        let u = evaluate_utilities(&spec, &context);
        assert_eq!(u.available_count(), 0);
        assert!(!u.is_available(0));
        assert!(!u.is_available(1));
    }

    #[test]
    fn test_missing_availability_variable_is_unavailable() {
        let spec = spec();
        let data = ModelData::default();
        let attrs = AttributeSet::new().with_scalar("transit_ivt", 10.0);
        let context = DecisionContext::builder(5).bind(&spec, &attrs, &data);
        assert!(!evaluate_availability(&spec.alternatives()[0], &context, 0));
        assert!(evaluate_availability(&spec.alternatives()[1], &context, 1));
    }

    #[test]
    fn test_trace_matches_utilities() {
        let spec = spec();
        let data = ModelData::default();
        let attrs = AttributeSet::new()
            .with_scalar("autos", 0.0)
            .with_scalar("transit_ivt", 10.0);
        let context = DecisionContext::builder(8).bind(&spec, &attrs, &data);
        let (u, trace) = trace_utilities(&spec, &context);
        let plain = evaluate_utilities(&spec, &context);
        assert_eq!(u.utility(0), plain.utility(0));
        assert_eq!(u.utility(1), plain.utility(1));
        assert_eq!(trace.alternatives.len(), 2);
        assert!(!trace.alternatives[0].available);
        let transit = &trace.alternatives[1];
        assert_eq!(transit.terms.len(), 2);
        assert!((transit.terms[0].contribution - -0.4).abs() < 1e-12);
        assert!((transit.utility.expect("available") - -1.6).abs() < 1e-12);
    }
}
