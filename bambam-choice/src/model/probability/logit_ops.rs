use crate::model::{choice::ChoiceError, evaluation::UtilityVector};

/// `ln Σ exp(x)`, shifted by the maximum so large utilities do not overflow.
/// None for an empty input.
pub fn log_sum_exp(values: &[f64]) -> Option<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || !max.is_finite() {
        return None;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    Some(max + sum.ln())
}

/// flat multinomial logit probabilities, aligned with the utility vector.
/// unavailable alternatives get probability 0 and are excluded from the
/// denominator.
pub fn mnl_probabilities(utilities: &UtilityVector) -> Result<Vec<f64>, ChoiceError> {
    let max = utilities
        .iter_available()
        .map(|(_, u)| u)
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return Err(ChoiceError::NoAvailableAlternatives {
            decision_maker_id: utilities.decision_maker_id(),
        });
    }
    let mut probabilities = vec![0.0; utilities.len()];
    let mut total = 0.0;
    for (position, u) in utilities.iter_available() {
        let weight = (u - max).exp();
        probabilities[position] = weight;
        total += weight;
    }
    probabilities.iter_mut().for_each(|p| *p /= total);
    Ok(probabilities)
}

/// `ln Σ exp(V)` over available alternatives.
pub fn mnl_logsum(utilities: &UtilityVector) -> Result<f64, ChoiceError> {
    let available: Vec<f64> = utilities.iter_available().map(|(_, u)| u).collect();
    log_sum_exp(&available).ok_or(ChoiceError::NoAvailableAlternatives {
        decision_maker_id: utilities.decision_maker_id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_alternative_probabilities() {
        let u = UtilityVector::from_utilities(1, vec![-1.7, -2.0]);
        let p = mnl_probabilities(&u).expect("test invariant failed");
        assert!((p[0] - 0.5744).abs() < 1e-4, "found {}", p[0]);
        assert!((p[1] - 0.4256).abs() < 1e-4, "found {}", p[1]);
    }

    #[test]
    fn test_unavailable_excluded() {
        let u = UtilityVector::new(1, vec![0.3, 5.0, -1.0], vec![true, false, true]);
        let p = mnl_probabilities(&u).expect("test invariant failed");
        assert_eq!(p[1], 0.0);
        let expected = 1.0 / (1.0 + (-1.3f64).exp());
        assert!((p[0] - expected).abs() < 1e-12);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_available_alternative() {
        let u = UtilityVector::new(1, vec![-40.0, 2.0], vec![true, false]);
        let p = mnl_probabilities(&u).expect("test invariant failed");
        assert_eq!(p, vec![1.0, 0.0]);
    }

    #[test]
    fn test_large_utilities_are_stable() {
        let u = UtilityVector::from_utilities(1, vec![1000.0, 1000.0, 999.0]);
        let p = mnl_probabilities(&u).expect("test invariant failed");
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        let logsum = mnl_logsum(&u).expect("test invariant failed");
        assert!(logsum.is_finite() && logsum > 1000.0);
    }

    #[test]
    fn test_nothing_available() {
        let u = UtilityVector::new(3, vec![1.0], vec![false]);
        assert_eq!(
            mnl_probabilities(&u),
            Err(ChoiceError::NoAvailableAlternatives {
                decision_maker_id: 3
            })
        );
        assert!(mnl_logsum(&u).is_err());
        assert_eq!(log_sum_exp(&[]), None);
    }
}
