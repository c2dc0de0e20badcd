use std::fmt::Display;

/// the functions callable from a utility expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    Ln,
    Exp,
    Max,
    Min,
    Abs,
    /// `logsum(a, b, ...) = ln(exp(a) + exp(b) + ...)`
    Logsum,
}

impl BuiltinFunction {
    pub fn from_name(name: &str) -> Option<BuiltinFunction> {
        match name {
            "ln" => Some(BuiltinFunction::Ln),
            "exp" => Some(BuiltinFunction::Exp),
            "max" => Some(BuiltinFunction::Max),
            "min" => Some(BuiltinFunction::Min),
            "abs" => Some(BuiltinFunction::Abs),
            "logsum" => Some(BuiltinFunction::Logsum),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinFunction::Ln => "ln",
            BuiltinFunction::Exp => "exp",
            BuiltinFunction::Max => "max",
            BuiltinFunction::Min => "min",
            BuiltinFunction::Abs => "abs",
            BuiltinFunction::Logsum => "logsum",
        }
    }

    /// true if the function takes exactly one argument
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            BuiltinFunction::Ln | BuiltinFunction::Exp | BuiltinFunction::Abs
        )
    }

    /// checks an argument count, returning a description of the expected
    /// arity when it does not match.
    pub fn check_arity(&self, count: usize) -> Result<(), String> {
        if self.is_unary() && count != 1 {
            Err(format!(
                "function '{}' takes exactly 1 argument, found {count}",
                self.name()
            ))
        } else if count == 0 {
            Err(format!(
                "function '{}' takes at least 1 argument, found 0",
                self.name()
            ))
        } else {
            Ok(())
        }
    }

    /// applies the function. any NaN argument yields NaN.
    pub fn apply(&self, args: &[f64]) -> f64 {
        if args.is_empty() || args.iter().any(|a| a.is_nan()) {
            return f64::NAN;
        }
        match self {
            BuiltinFunction::Ln => args[0].ln(),
            BuiltinFunction::Exp => args[0].exp(),
            BuiltinFunction::Abs => args[0].abs(),
            BuiltinFunction::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            BuiltinFunction::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            BuiltinFunction::Logsum => {
                let max = args.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if !max.is_finite() {
                    return max;
                }
                let sum: f64 = args.iter().map(|a| (a - max).exp()).sum();
                max + sum.ln()
            }
        }
    }
}

impl Display for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
