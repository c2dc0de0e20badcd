use super::{ChoiceError, ChoiceOutputMode, ChoiceResult};
use crate::model::{
    context::DecisionContext,
    evaluation::{self, UtilityTrace, UtilityVector},
    probability,
    simulation::ChoiceSimulator,
    spec::ModelSpec,
    AlternativeId, DecisionMakerId,
};
use std::{collections::HashSet, sync::Arc};

/// a compiled model specification together with the simulator that draws
/// its choices and the set of decision makers whose utilities are traced.
#[derive(Clone, Debug)]
pub struct ChoiceModel {
    spec: Arc<ModelSpec>,
    simulator: ChoiceSimulator,
    trace_ids: HashSet<DecisionMakerId>,
}

impl ChoiceModel {
    pub fn new(spec: ModelSpec, seed: u64) -> ChoiceModel {
        ChoiceModel::from_shared(Arc::new(spec), seed)
    }

    pub fn from_shared(spec: Arc<ModelSpec>, seed: u64) -> ChoiceModel {
        let simulator = ChoiceSimulator::new(seed, spec.name());
        ChoiceModel {
            spec,
            simulator,
            trace_ids: HashSet::new(),
        }
    }

    /// traces the utility breakdown of these decision makers
    pub fn with_trace(mut self, ids: impl IntoIterator<Item = DecisionMakerId>) -> ChoiceModel {
        self.trace_ids.extend(ids);
        self
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn simulator(&self) -> &ChoiceSimulator {
        &self.simulator
    }

    pub fn is_traced(&self, decision_maker_id: DecisionMakerId) -> bool {
        self.trace_ids.contains(&decision_maker_id)
    }

    /// evaluates availability and utilities for a bound decision maker. fails
    /// when no alternative is available.
    pub fn evaluate(&self, context: &DecisionContext<'_>) -> Result<EvaluatedChoice<'_>, ChoiceError> {
        let decision_maker_id = context.decision_maker_id();
        let (utilities, trace) = if self.is_traced(decision_maker_id) {
            let (utilities, trace) = evaluation::trace_utilities(&self.spec, context);
            trace.log();
            (utilities, Some(trace))
        } else {
            (evaluation::evaluate_utilities(&self.spec, context), None)
        };
        if utilities.available_count() == 0 {
            return Err(ChoiceError::NoAvailableAlternatives { decision_maker_id });
        }
        Ok(EvaluatedChoice {
            model: self,
            utilities,
            trace,
        })
    }

    /// evaluates the decision and produces the outputs of `mode`.
    pub fn run(
        &self,
        context: &DecisionContext<'_>,
        mode: ChoiceOutputMode,
    ) -> Result<ChoiceResult, ChoiceError> {
        self.evaluate(context)?.into_result(mode)
    }
}

/// the utilities of one decision with at least one available alternative.
/// probabilities, logsums and choices are derived on request, and the
/// choice may be resampled from the same keyed random stream.
pub struct EvaluatedChoice<'m> {
    model: &'m ChoiceModel,
    utilities: UtilityVector,
    trace: Option<UtilityTrace>,
}

impl EvaluatedChoice<'_> {
    pub fn utilities(&self) -> &UtilityVector {
        &self.utilities
    }

    pub fn trace(&self) -> Option<&UtilityTrace> {
        self.trace.as_ref()
    }

    pub fn decision_maker_id(&self) -> DecisionMakerId {
        self.utilities.decision_maker_id()
    }

    /// probabilities aligned with the model's alternatives, and the root logsum
    pub fn probabilities(&self) -> Result<(Vec<f64>, f64), ChoiceError> {
        probability::probabilities(self.model.spec.nests(), &self.utilities)
    }

    pub fn logsum(&self) -> Result<f64, ChoiceError> {
        probability::logsum(self.model.spec.nests(), &self.utilities)
    }

    /// the simulated choice
    pub fn simulate(&self) -> Result<AlternativeId, ChoiceError> {
        let (probabilities, _) = self.probabilities()?;
        self.choose(&probabilities)
    }

    /// `n` successive draws from the decision maker's stream, the first of
    /// which is the simulated choice.
    pub fn resample(&self, n: usize) -> Result<Vec<AlternativeId>, ChoiceError> {
        let (probabilities, _) = self.probabilities()?;
        self.model
            .simulator
            .resample(&probabilities, self.decision_maker_id(), n)?
            .into_iter()
            .map(|position| self.alternative_id(position, probabilities.len()))
            .collect()
    }

    pub fn into_result(self, mode: ChoiceOutputMode) -> Result<ChoiceResult, ChoiceError> {
        let decision_maker_id = self.decision_maker_id();
        let (chosen, probabilities, logsum) = match mode {
            ChoiceOutputMode::Logsum => (None, None, Some(self.logsum()?)),
            _ => {
                let (probabilities, logsum) = self.probabilities()?;
                let chosen = if mode.includes_choice() {
                    Some(self.choose(&probabilities)?)
                } else {
                    None
                };
                let logsum = mode.includes_logsum().then_some(logsum);
                let probabilities = mode.includes_probabilities().then_some(probabilities);
                (chosen, probabilities, logsum)
            }
        };
        Ok(ChoiceResult {
            decision_maker_id,
            chosen,
            probabilities,
            logsum,
            trace: self.trace,
        })
    }

    fn choose(&self, probabilities: &[f64]) -> Result<AlternativeId, ChoiceError> {
        let position = self
            .model
            .simulator
            .simulate(probabilities, self.decision_maker_id())?;
        self.alternative_id(position, probabilities.len())
    }

    fn alternative_id(&self, position: usize, found: usize) -> Result<AlternativeId, ChoiceError> {
        let ids = self.model.spec.alternative_ids();
        ids.get(position)
            .copied()
            .ok_or(ChoiceError::ProbabilityLengthMismatch {
                expected: ids.len(),
                found,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        context::{AttributeSet, ModelData},
        spec::ModelSpecConfig,
    };

    fn model() -> ChoiceModel {
        let config: ModelSpecConfig = toml::from_str(
            r#"
            name = "work_mode"
            [variables]
            ivt = "scalar"
            cost = "scalar"
            mode = "scalar"
            autos = "scalar"
            [[alternatives]]
            id = 10
            name = "drive"
            utility = "@ivt * -0.05 + @cost * -0.01 + (@mode==1 ? 0.8 : 0)"
            availability = "@autos > 0"
            [[alternatives]]
            id = 20
            name = "transit"
            utility = "-2.0"
            "#,
        )
        .expect("test invariant failed");
        let spec = ModelSpec::compile(&config).expect("test invariant failed");
        ChoiceModel::new(spec, 2024)
    }

    fn attributes(autos: f64) -> AttributeSet {
        AttributeSet::new()
            .with_scalar("ivt", 20.0)
            .with_scalar("cost", 150.0)
            .with_scalar("mode", 1.0)
            .with_scalar("autos", autos)
    }

    #[test]
    fn test_all_outputs() {
        let model = model();
        let data = ModelData::default();
        let attrs = attributes(1.0);
        let context = DecisionContext::builder(1).bind(model.spec(), &attrs, &data);
        let result = model
            .run(&context, ChoiceOutputMode::All)
            .expect("test invariant failed");
        let p = result.probabilities.expect("probabilities requested");
        assert!((p[0] - 0.5744).abs() < 1e-4);
        assert!((p[1] - 0.4256).abs() < 1e-4);
        let expected_logsum = ((-1.7f64).exp() + (-2.0f64).exp()).ln();
        assert!((result.logsum.expect("logsum requested") - expected_logsum).abs() < 1e-12);
        assert!(matches!(result.chosen, Some(10) | Some(20)));
        assert!(result.trace.is_none());
    }

    #[test]
    fn test_mode_selects_outputs() {
        let model = model();
        let data = ModelData::default();
        let attrs = attributes(1.0);
        let context = DecisionContext::builder(1).bind(model.spec(), &attrs, &data);
        let choice = model.run(&context, ChoiceOutputMode::Choice).expect("test invariant failed");
        assert!(choice.chosen.is_some() && choice.probabilities.is_none() && choice.logsum.is_none());
        let logsum = model.run(&context, ChoiceOutputMode::Logsum).expect("test invariant failed");
        assert!(logsum.chosen.is_none() && logsum.probabilities.is_none() && logsum.logsum.is_some());
        let probs = model
            .run(&context, ChoiceOutputMode::Probabilities)
            .expect("test invariant failed");
        assert!(probs.chosen.is_none() && probs.probabilities.is_some());
    }

    #[test]
    fn test_only_alternative_is_chosen() {
        let model = model();
        let data = ModelData::default();
        let attrs = attributes(0.0);
        for id in 0..20 {
            let context = DecisionContext::builder(id).bind(model.spec(), &attrs, &data);
            let result = model.run(&context, ChoiceOutputMode::All).expect("test invariant failed");
            assert_eq!(result.chosen, Some(20));
            assert_eq!(result.probabilities, Some(vec![0.0, 1.0]));
        }
    }

    #[test]
    fn test_repeat_runs_choose_identically() {
        let a = model();
        let b = model();
        let data = ModelData::default();
        let attrs = attributes(1.0);
        for id in 0..100 {
            let ca = DecisionContext::builder(id).bind(a.spec(), &attrs, &data);
            let cb = DecisionContext::builder(id).bind(b.spec(), &attrs, &data);
            let ra = a.run(&ca, ChoiceOutputMode::Choice).expect("test invariant failed");
            let rb = b.run(&cb, ChoiceOutputMode::Choice).expect("test invariant failed");
            assert_eq!(ra.chosen, rb.chosen);
        }
    }

    #[test]
    fn test_resample() {
        let model = model();
        let data = ModelData::default();
        let attrs = attributes(1.0);
        let context = DecisionContext::builder(77).bind(model.spec(), &attrs, &data);
        let evaluated = model.evaluate(&context).expect("test invariant failed");
        let draws = evaluated.resample(25).expect("test invariant failed");
        assert_eq!(draws.len(), 25);
        assert_eq!(Ok(draws[0]), evaluated.simulate());
    }

    #[test]
    fn test_no_available_alternatives() {
        let config: ModelSpecConfig = toml::from_str(
            r#"
            name = "m"
            [[alternatives]]
            id = 1
            name = "never"
            utility = "0"
            availability = "0"
            "#,
        )
        .expect("test invariant failed");
        let model = ChoiceModel::new(ModelSpec::compile(&config).expect("test invariant failed"), 1);
        let data = ModelData::default();
        let attrs = AttributeSet::new();
        let context = DecisionContext::builder(4).bind(model.spec(), &attrs, &data);
        assert_eq!(
            model.run(&context, ChoiceOutputMode::Choice).map(|r| r.chosen),
            Err(ChoiceError::NoAvailableAlternatives {
                decision_maker_id: 4
            })
        );
    }

    #[test]
    fn test_traced_decision_maker() {
        let model = model().with_trace([3]);
        let data = ModelData::default();
        let attrs = attributes(1.0);
        let traced = DecisionContext::builder(3).bind(model.spec(), &attrs, &data);
        let plain = DecisionContext::builder(4).bind(model.spec(), &attrs, &data);
        let result = model.run(&traced, ChoiceOutputMode::Choice).expect("test invariant failed");
        let trace = result.trace.expect("trace requested");
        assert_eq!(trace.alternatives.len(), 2);
        assert_eq!(trace.model, "work_mode");
        let other = model.run(&plain, ChoiceOutputMode::Choice).expect("test invariant failed");
        assert!(other.trace.is_none());
    }
}
