use super::BuiltinFunction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            UnaryOp::Negate => -value,
            UnaryOp::Not if value.is_nan() => f64::NAN,
            UnaryOp::Not => as_f64(value == 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    /// applies the operator to two evaluated operands. comparison and logical
    /// operators return 1.0 or 0.0, or NaN when either operand is NaN.
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        use BinaryOp as B;
        match self {
            B::Add => lhs + rhs,
            B::Subtract => lhs - rhs,
            B::Multiply => lhs * rhs,
            B::Divide => lhs / rhs,
            B::Power => lhs.powf(rhs),
            _ if lhs.is_nan() || rhs.is_nan() => f64::NAN,
            B::Equal => as_f64(lhs == rhs),
            B::NotEqual => as_f64(lhs != rhs),
            B::Less => as_f64(lhs < rhs),
            B::LessEqual => as_f64(lhs <= rhs),
            B::Greater => as_f64(lhs > rhs),
            B::GreaterEqual => as_f64(lhs >= rhs),
            B::And => as_f64(lhs != 0.0 && rhs != 0.0),
            B::Or => as_f64(lhs != 0.0 || rhs != 0.0),
        }
    }
}

fn as_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// an index inside the brackets of a variable reference, such as the
/// `orig` and `dest` in `@sov_time[orig, dest]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexArg {
    Alternative,
    Origin,
    Destination,
    Period,
    Literal(u32),
}

impl IndexArg {
    pub fn from_keyword(keyword: &str) -> Option<IndexArg> {
        match keyword {
            "alt" => Some(IndexArg::Alternative),
            "orig" => Some(IndexArg::Origin),
            "dest" => Some(IndexArg::Destination),
            "period" => Some(IndexArg::Period),
            _ => None,
        }
    }
}

impl std::fmt::Display for IndexArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexArg::Alternative => write!(f, "alt"),
            IndexArg::Origin => write!(f, "orig"),
            IndexArg::Destination => write!(f, "dest"),
            IndexArg::Period => write!(f, "period"),
            IndexArg::Literal(n) => write!(f, "{n}"),
        }
    }
}

/// parsed, unresolved expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Constant(f64),
    Variable {
        name: String,
        indices: Vec<IndexArg>,
        position: usize,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    Call {
        function: BuiltinFunction,
        args: Vec<Expr>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons_propagate_nan() {
        assert!(BinaryOp::Equal.apply(f64::NAN, 1.0).is_nan());
        assert!(BinaryOp::Or.apply(1.0, f64::NAN).is_nan());
        assert!(UnaryOp::Not.apply(f64::NAN).is_nan());
        assert_eq!(BinaryOp::Equal.apply(1.0, 1.0), 1.0);
        assert_eq!(BinaryOp::Less.apply(2.0, 1.0), 0.0);
        assert_eq!(UnaryOp::Not.apply(0.0), 1.0);
        assert_eq!(UnaryOp::Not.apply(-3.0), 0.0);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(BinaryOp::Power.apply(2.0, 10.0), 1024.0);
        assert_eq!(BinaryOp::Divide.apply(1.0, 0.0), f64::INFINITY);
        assert_eq!(BinaryOp::And.apply(2.0, -1.0), 1.0);
        assert_eq!(BinaryOp::And.apply(2.0, 0.0), 0.0);
    }
}
