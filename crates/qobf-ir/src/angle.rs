//! Exact angle expressions for rotation gates.
//!
//! Rewrites never evaluate angles. Inverting `rz(θ)` produces `rz(-(θ))` and
//! splitting it produces `rz(θ/2)`, so a rewritten circuit emits the same
//! literals the input carried and no rounding drift accumulates across layers.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// An angle in radians, kept as an expression tree over literals and π.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Angle {
    /// A literal value in radians.
    Value(f64),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<Angle>),
    /// Addition.
    Add(Box<Angle>, Box<Angle>),
    /// Subtraction.
    Sub(Box<Angle>, Box<Angle>),
    /// Multiplication.
    Mul(Box<Angle>, Box<Angle>),
    /// Division.
    Div(Box<Angle>, Box<Angle>),
}

impl Angle {
    /// A literal angle.
    pub fn value(radians: f64) -> Self {
        Angle::Value(radians)
    }

    /// The constant π.
    pub fn pi() -> Self {
        Angle::Pi
    }

    /// `π / divisor`.
    pub fn pi_over(divisor: u32) -> Self {
        if divisor == 1 {
            return Angle::Pi;
        }
        Angle::Div(Box::new(Angle::Pi), Box::new(Angle::Value(f64::from(divisor))))
    }

    /// Evaluate to radians. `None` if the expression divides by zero or
    /// overflows.
    pub fn radians(&self) -> Option<f64> {
        let v = match self {
            Angle::Value(v) => *v,
            Angle::Pi => PI,
            Angle::Neg(e) => -e.radians()?,
            Angle::Add(a, b) => a.radians()? + b.radians()?,
            Angle::Sub(a, b) => a.radians()? - b.radians()?,
            Angle::Mul(a, b) => a.radians()? * b.radians()?,
            Angle::Div(a, b) => {
                let divisor = b.radians()?;
                if divisor == 0.0 {
                    return None;
                }
                a.radians()? / divisor
            }
        };
        v.is_finite().then_some(v)
    }

    /// The additive inverse. Double negations collapse.
    #[must_use]
    pub fn negated(&self) -> Self {
        match self {
            Angle::Neg(inner) => (**inner).clone(),
            Angle::Value(v) => Angle::Value(-v),
            other => Angle::Neg(Box::new(other.clone())),
        }
    }

    /// Half of this angle.
    #[must_use]
    pub fn halved(&self) -> Self {
        Angle::Div(Box::new(self.clone()), Box::new(Angle::Value(2.0)))
    }

    fn is_atom(&self) -> bool {
        match self {
            Angle::Pi => true,
            Angle::Value(v) => *v >= 0.0,
            _ => false,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_atom() {
            write!(f, "{self}")
        } else {
            write!(f, "({self})")
        }
    }
}

/// Renders the expression in the syntax shared by OpenQASM 2 and Python,
/// e.g. `pi/2`, `-(pi/4)`, `0.3/2`. Literals use the shortest
/// representation that parses back to the same `f64`.
impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Angle::Value(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    #[allow(clippy::cast_possible_truncation)]
                    let whole = *v as i64;
                    write!(f, "{whole}")
                } else {
                    write!(f, "{v}")
                }
            }
            Angle::Pi => write!(f, "pi"),
            Angle::Neg(e) => {
                write!(f, "-")?;
                e.fmt_operand(f)
            }
            Angle::Add(a, b) => {
                a.fmt_operand(f)?;
                write!(f, " + ")?;
                b.fmt_operand(f)
            }
            Angle::Sub(a, b) => {
                a.fmt_operand(f)?;
                write!(f, " - ")?;
                b.fmt_operand(f)
            }
            Angle::Mul(a, b) => {
                a.fmt_operand(f)?;
                write!(f, "*")?;
                b.fmt_operand(f)
            }
            Angle::Div(a, b) => {
                a.fmt_operand(f)?;
                write!(f, "/")?;
                b.fmt_operand(f)
            }
        }
    }
}

impl From<f64> for Angle {
    fn from(value: f64) -> Self {
        Angle::Value(value)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl std::ops::Div for Angle {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Angle::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for Angle {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Angle::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Add for Angle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Angle::Add(Box::new(self), Box::new(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pi_over() {
        assert_eq!(Angle::pi_over(1), Angle::Pi);
        let quarter = Angle::pi_over(4);
        assert!((quarter.radians().unwrap() - PI / 4.0).abs() < 1e-15);
        assert_eq!(quarter.to_string(), "pi/4");
    }

    #[test]
    fn test_negation_is_exact() {
        let theta = Angle::value(0.3);
        assert_eq!(theta.negated(), Angle::value(-0.3));

        let half_pi = Angle::pi_over(2);
        let neg = half_pi.negated();
        assert_eq!(neg.to_string(), "-(pi/2)");
        assert_eq!(neg.negated(), half_pi);
    }

    #[test]
    fn test_halved() {
        let theta = Angle::value(1.5).halved();
        assert_eq!(theta.radians(), Some(0.75));
        assert_eq!(theta.to_string(), "1.5/2");
    }

    #[test]
    fn test_division_by_zero() {
        let bad = Angle::Pi / Angle::value(0.0);
        assert_eq!(bad.radians(), None);
    }

    #[test]
    fn test_negative_literal_is_parenthesised() {
        let e = Angle::value(-0.5).halved();
        assert_eq!(e.to_string(), "(-0.5)/2");
    }
}
