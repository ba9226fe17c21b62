//! Quantum gate types.

use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

use crate::angle::Angle;
use crate::error::{IrError, IrResult};

/// The gates the obfuscator reads, rewrites and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,
    /// Rotation around X axis.
    Rx(Angle),
    /// Rotation around Y axis.
    Ry(Angle),
    /// Rotation around Z axis.
    Rz(Angle),
    /// Phase gate.
    P(Angle),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(Angle, Angle, Angle),
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// Controlled phase gate.
    CP(Angle),
    /// Controlled rotation around Z.
    CRz(Angle),
    /// ZZ rotation gate.
    RZZ(Angle),
    /// Toffoli gate (CCX).
    CCX,
}

impl StandardGate {
    /// Every gate name the parsers accept, in the order `list` prints them.
    pub const NAMES: &'static [&'static str] = &[
        "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "p",
        "u", "cx", "cy", "cz", "swap", "cp", "crz", "rzz", "ccx",
    ];

    /// Number of angles the named gate takes. Unknown names report zero.
    pub fn parameter_count(name: &str) -> usize {
        match name {
            "rx" | "ry" | "rz" | "p" | "u1" | "cp" | "cu1" | "crz" | "rzz" => 1,
            "u" | "u3" => 3,
            _ => 0,
        }
    }

    /// Build a gate from its lowercase name and angle list.
    pub fn from_name(name: &str, mut angles: Vec<Angle>) -> IrResult<Self> {
        let expected = Self::parameter_count(name);
        if angles.len() != expected {
            return Err(IrError::ParameterCountMismatch {
                gate_name: name.to_string(),
                expected,
                got: angles.len(),
            });
        }
        let mut next = || angles.remove(0);
        let gate = match name {
            "id" | "i" => StandardGate::I,
            "x" => StandardGate::X,
            "y" => StandardGate::Y,
            "z" => StandardGate::Z,
            "h" => StandardGate::H,
            "s" => StandardGate::S,
            "sdg" => StandardGate::Sdg,
            "t" => StandardGate::T,
            "tdg" => StandardGate::Tdg,
            "sx" => StandardGate::SX,
            "sxdg" => StandardGate::SXdg,
            "rx" => StandardGate::Rx(next()),
            "ry" => StandardGate::Ry(next()),
            "rz" => StandardGate::Rz(next()),
            "p" | "u1" => StandardGate::P(next()),
            "u" | "u3" => {
                let theta = next();
                let phi = next();
                let lambda = next();
                StandardGate::U(theta, phi, lambda)
            }
            "cx" | "cnot" => StandardGate::CX,
            "cy" => StandardGate::CY,
            "cz" => StandardGate::CZ,
            "swap" => StandardGate::Swap,
            "cp" | "cu1" => StandardGate::CP(next()),
            "crz" => StandardGate::CRz(next()),
            "rzz" => StandardGate::RZZ(next()),
            "ccx" | "toffoli" => StandardGate::CCX,
            other => return Err(IrError::UnknownGate(other.to_string())),
        };
        Ok(gate)
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::CP(_) => "cp",
            StandardGate::CRz(_) => "crz",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::Swap
            | StandardGate::CP(_)
            | StandardGate::CRz(_)
            | StandardGate::RZZ(_) => 2,
            StandardGate::CCX => 3,
            _ => 1,
        }
    }

    /// Get the angles of this gate.
    pub fn angles(&self) -> Vec<&Angle> {
        match self {
            StandardGate::Rx(a)
            | StandardGate::Ry(a)
            | StandardGate::Rz(a)
            | StandardGate::P(a)
            | StandardGate::CP(a)
            | StandardGate::CRz(a)
            | StandardGate::RZZ(a) => vec![a],
            StandardGate::U(theta, phi, lambda) => vec![theta, phi, lambda],
            _ => vec![],
        }
    }

    /// The unitary matrix of this gate.
    ///
    /// Operand `k` of the gate is bit `k` of the row/column index, so for
    /// `cx` the control is the low bit. Returns an error if an angle does not
    /// evaluate to a finite number.
    pub fn matrix(&self) -> IrResult<Array2<Complex64>> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let angle = |a: &Angle| a.radians().ok_or_else(|| IrError::NonFiniteAngle(a.to_string()));

        let m = match self {
            StandardGate::I => array![[one, zero], [zero, one]],
            StandardGate::X => array![[zero, one], [one, zero]],
            StandardGate::Y => array![[zero, -i], [i, zero]],
            StandardGate::Z => array![[one, zero], [zero, -one]],
            StandardGate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                array![[h, h], [h, -h]]
            }
            StandardGate::S => phase_matrix(std::f64::consts::FRAC_PI_2),
            StandardGate::Sdg => phase_matrix(-std::f64::consts::FRAC_PI_2),
            StandardGate::T => phase_matrix(std::f64::consts::FRAC_PI_4),
            StandardGate::Tdg => phase_matrix(-std::f64::consts::FRAC_PI_4),
            StandardGate::SX => {
                let a = Complex64::new(0.5, 0.5);
                let b = Complex64::new(0.5, -0.5);
                array![[a, b], [b, a]]
            }
            StandardGate::SXdg => {
                let a = Complex64::new(0.5, -0.5);
                let b = Complex64::new(0.5, 0.5);
                array![[a, b], [b, a]]
            }
            StandardGate::Rx(theta) => {
                let t = angle(theta)? / 2.0;
                let c = Complex64::new(t.cos(), 0.0);
                let s = Complex64::new(0.0, -t.sin());
                array![[c, s], [s, c]]
            }
            StandardGate::Ry(theta) => {
                let t = angle(theta)? / 2.0;
                let c = Complex64::new(t.cos(), 0.0);
                let s = Complex64::new(t.sin(), 0.0);
                array![[c, -s], [s, c]]
            }
            StandardGate::Rz(theta) => {
                let t = angle(theta)? / 2.0;
                array![
                    [Complex64::from_polar(1.0, -t), zero],
                    [zero, Complex64::from_polar(1.0, t)]
                ]
            }
            StandardGate::P(theta) => phase_matrix(angle(theta)?),
            StandardGate::U(theta, phi, lambda) => {
                let t = angle(theta)? / 2.0;
                let p = angle(phi)?;
                let l = angle(lambda)?;
                array![
                    [
                        Complex64::new(t.cos(), 0.0),
                        -Complex64::from_polar(t.sin(), l)
                    ],
                    [
                        Complex64::from_polar(t.sin(), p),
                        Complex64::from_polar(t.cos(), p + l)
                    ]
                ]
            }
            StandardGate::CX => controlled(&StandardGate::X.matrix()?),
            StandardGate::CY => controlled(&StandardGate::Y.matrix()?),
            StandardGate::CZ => controlled(&StandardGate::Z.matrix()?),
            StandardGate::CP(theta) => controlled(&phase_matrix(angle(theta)?)),
            StandardGate::CRz(theta) => controlled(&StandardGate::Rz(theta.clone()).matrix()?),
            StandardGate::Swap => {
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = one;
                m[[1, 2]] = one;
                m[[2, 1]] = one;
                m[[3, 3]] = one;
                m
            }
            StandardGate::RZZ(theta) => {
                let t = angle(theta)? / 2.0;
                let even = Complex64::from_polar(1.0, -t);
                let odd = Complex64::from_polar(1.0, t);
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = even;
                m[[1, 1]] = odd;
                m[[2, 2]] = odd;
                m[[3, 3]] = even;
                m
            }
            StandardGate::CCX => {
                let mut m = Array2::eye(8);
                // Both controls set (bits 0 and 1): swap target states 0b011 and 0b111.
                m[[3, 3]] = zero;
                m[[7, 7]] = zero;
                m[[3, 7]] = one;
                m[[7, 3]] = one;
                m
            }
        };
        Ok(m)
    }
}

fn phase_matrix(theta: f64) -> Array2<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    array![
        [Complex64::new(1.0, 0.0), zero],
        [zero, Complex64::from_polar(1.0, theta)]
    ]
}

/// Two-qubit controlled version of a 2x2 matrix, control on bit 0.
fn controlled(target: &Array2<Complex64>) -> Array2<Complex64> {
    let mut m = Array2::eye(4);
    // Indices with the control bit set are 0b01 (target 0) and 0b11 (target 1).
    m[[1, 1]] = target[[0, 0]];
    m[[1, 3]] = target[[0, 1]];
    m[[3, 1]] = target[[1, 0]];
    m[[3, 3]] = target[[1, 1]];
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unitary(m: &Array2<Complex64>) -> bool {
        let dagger = m.t().mapv(|c| c.conj());
        let product = dagger.dot(m);
        let n = m.nrows();
        (0..n).all(|r| {
            (0..n).all(|c| {
                let expected = if r == c { 1.0 } else { 0.0 };
                (product[[r, c]] - Complex64::new(expected, 0.0)).norm() < 1e-12
            })
        })
    }

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::Rz(Angle::pi()).angles().len(), 1);
    }

    #[test]
    fn test_from_name_round_trips_names() {
        for name in StandardGate::NAMES {
            let angles = match *name {
                "u" => vec![Angle::pi(), Angle::pi(), Angle::pi()],
                "rx" | "ry" | "rz" | "p" | "cp" | "crz" | "rzz" => vec![Angle::pi_over(3)],
                _ => vec![],
            };
            let gate = StandardGate::from_name(name, angles).unwrap();
            assert_eq!(gate.name(), *name);
        }
    }

    #[test]
    fn test_from_name_errors() {
        assert!(matches!(
            StandardGate::from_name("rx", vec![]),
            Err(IrError::ParameterCountMismatch { expected: 1, got: 0, .. })
        ));
        assert!(matches!(
            StandardGate::from_name("frobnicate", vec![]),
            Err(IrError::UnknownGate(_))
        ));
    }

    #[test]
    fn test_matrices_are_unitary() {
        let theta = Angle::value(0.7);
        let gates = vec![
            StandardGate::H,
            StandardGate::SX,
            StandardGate::Rx(theta.clone()),
            StandardGate::Ry(theta.clone()),
            StandardGate::U(theta.clone(), Angle::pi_over(3), Angle::value(-1.1)),
            StandardGate::CY,
            StandardGate::CRz(theta.clone()),
            StandardGate::RZZ(theta),
            StandardGate::Swap,
            StandardGate::CCX,
        ];
        for gate in gates {
            assert!(is_unitary(&gate.matrix().unwrap()), "{} not unitary", gate.name());
        }
    }

    #[test]
    fn test_cx_control_is_low_bit() {
        let m = StandardGate::CX.matrix().unwrap();
        // |control=1, target=0> (index 1) maps to |1,1> (index 3).
        assert!((m[[3, 1]].re - 1.0).abs() < 1e-12);
        assert!((m[[2, 2]].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sx_squared_is_x() {
        let sx = StandardGate::SX.matrix().unwrap();
        let x = StandardGate::X.matrix().unwrap();
        let sq = sx.dot(&sx);
        assert!((&sq - &x).iter().all(|c| c.norm() < 1e-12));
    }

    #[test]
    fn test_non_finite_angle() {
        let gate = StandardGate::Rz(Angle::Pi / Angle::value(0.0));
        assert!(matches!(gate.matrix(), Err(IrError::NonFiniteAngle(_))));
    }
}
