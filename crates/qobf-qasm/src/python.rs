//! Python builder-script form of a circuit.
//!
//! The writer produces a self-contained script whose
//! `build_obfuscated_circuit()` function rebuilds the circuit with Qiskit
//! calls (`qc.h(0)`, `qc.rz(pi/4, 1)`, `qc.measure(0, 0)`). The reader
//! recognises the same shape without executing anything: it finds the first
//! `<var> = ...QuantumCircuit(n, m, name=...)` assignment and replays every
//! later `<var>.<gate>(...)` call line.

use qobf_ir::{Angle, Circuit, ClbitId, Instruction, InstructionKind, QubitId, StandardGate};

use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;
use crate::parser::{Parser, broadcast};

/// Name of the builder function in emitted scripts.
pub const BUILDER_FN: &str = "build_obfuscated_circuit";

/// Emit a circuit as a Python builder script.
pub fn emit_python(circuit: &Circuit) -> String {
    let mut code = String::new();
    code.push_str("# Auto-generated file to rebuild a quantum circuit.\n");
    code.push_str("import qiskit\n");
    code.push_str("from math import pi\n\n\n");
    code.push_str(&format!("def {BUILDER_FN}():\n"));
    code.push_str(&format!(
        "    \"\"\"Builds and returns the quantum circuit named {}.\"\"\"\n",
        python_string(circuit.name())
    ));
    code.push_str(&emit_python_calls(circuit, "qc", "    "));
    code.push_str("    return qc\n\n\n");
    code.push_str("def get_circuit():\n");
    code.push_str(&format!("    return {BUILDER_FN}()\n"));
    code
}

/// Emit the construction and gate calls for `circuit` into variable `var`,
/// each line prefixed with `indent`. The caller provides `qiskit` and `pi`.
pub fn emit_python_calls(circuit: &Circuit, var: &str, indent: &str) -> String {
    let mut code = format!(
        "{indent}{var} = qiskit.QuantumCircuit({}, {}, name={})\n",
        circuit.num_qubits(),
        circuit.num_clbits(),
        python_string(circuit.name())
    );
    for instruction in circuit.instructions() {
        let qubits = instruction.qubits.iter().map(|q| q.0.to_string());
        let args: Vec<String> = match &instruction.kind {
            InstructionKind::Gate(gate) => gate
                .angles()
                .into_iter()
                .map(ToString::to_string)
                .chain(qubits)
                .collect(),
            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    code.push_str(&format!("{indent}{var}.measure({}, {})\n", q.0, c.0));
                }
                continue;
            }
            InstructionKind::Reset | InstructionKind::Barrier => qubits.collect(),
        };
        code.push_str(&format!(
            "{indent}{var}.{}({})\n",
            instruction.name(),
            args.join(", ")
        ));
    }
    code
}

/// Render `s` as a single-quoted Python string literal.
pub fn python_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Parse a Python builder script into a Circuit.
pub fn parse_python(source: &str) -> ParseResult<Circuit> {
    let mut circuit: Option<(String, Circuit)> = None;

    for (number, raw) in source.lines().enumerate() {
        let line_no = number + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if circuit.is_none() {
            if line.contains("QuantumCircuit(") {
                let mut parser = Parser::starting_at(line, line_no)?;
                circuit = Some(parse_constructor(&mut parser)?);
            }
            continue;
        }
        if let Some((var, c)) = circuit.as_mut() {
            let is_call = line
                .strip_prefix(var.as_str())
                .is_some_and(|rest| rest.starts_with('.'));
            if is_call {
                let mut parser = Parser::starting_at(line, line_no)?;
                parse_call(&mut parser, c)?;
            }
        }
    }

    circuit.map(|(_, c)| c).ok_or(ParseError::MissingCircuit)
}

/// Drop a trailing `# ...` comment, ignoring `#` inside string literals.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, ch) in line.char_indices() {
        match (quote, ch) {
            (None, '#') => return &line[..i],
            (None, '\'' | '"') => quote = Some(ch),
            (Some(q), c) if q == c => quote = None,
            _ => {}
        }
    }
    line
}

/// `var = [module.]QuantumCircuit(n[, m][, name='...'])`
fn parse_constructor(p: &mut Parser) -> ParseResult<(String, Circuit)> {
    let var = p.parse_identifier()?;
    p.expect(Token::Eq)?;
    loop {
        let ident = p.parse_identifier()?;
        if ident == "QuantumCircuit" {
            break;
        }
        p.expect(Token::Dot)?;
    }
    p.expect(Token::LParen)?;

    let mut sizes = Vec::new();
    let mut name = String::from("circuit");
    while !p.check(&Token::RParen) {
        match p.peek() {
            Some(Token::IntLiteral(_)) => sizes.push(p.parse_index()?),
            _ => {
                let key = p.parse_identifier()?;
                p.expect(Token::Eq)?;
                match (key.as_str(), p.advance()) {
                    ("name", Some(Token::StringLiteral(s))) => name = s,
                    (_, found) => {
                        return Err(ParseError::Unsupported {
                            line: p.line(),
                            feature: format!(
                                "QuantumCircuit argument {key}={}",
                                found.map_or_else(String::new, |t| t.to_string())
                            ),
                        });
                    }
                }
            }
        }
        if !p.consume(&Token::Comma) {
            break;
        }
    }
    p.expect(Token::RParen)?;

    let (num_qubits, num_clbits) = match sizes.as_slice() {
        [n] => (*n, 0),
        [n, m] => (*n, *m),
        _ => {
            return Err(ParseError::Unsupported {
                line: p.line(),
                feature: "QuantumCircuit needs one or two integer register sizes".into(),
            });
        }
    };
    Ok((var, Circuit::with_size(name, num_qubits, num_clbits)))
}

/// A positional argument: a scalar or a `[a, b, ...]` list.
enum Arg {
    Scalar(Angle),
    List(Vec<Angle>),
}

/// `var.method(args...)`
fn parse_call(p: &mut Parser, circuit: &mut Circuit) -> ParseResult<()> {
    p.parse_identifier()?;
    p.expect(Token::Dot)?;
    let line = p.line();
    let method = match p.advance() {
        Some(Token::Identifier(name)) => name,
        Some(Token::Measure) => "measure".into(),
        Some(Token::Reset) => "reset".into(),
        Some(Token::Barrier) => "barrier".into(),
        Some(other) => {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: "method name".into(),
                found: other.to_string(),
            });
        }
        None => return Err(ParseError::UnexpectedEof("method name".into())),
    };
    p.expect(Token::LParen)?;
    let mut args = Vec::new();
    while !p.check(&Token::RParen) {
        if p.consume(&Token::LBracket) {
            let mut items = Vec::new();
            while !p.check(&Token::RBracket) {
                items.push(p.parse_expression()?);
                if !p.consume(&Token::Comma) {
                    break;
                }
            }
            p.expect(Token::RBracket)?;
            args.push(Arg::List(items));
        } else {
            args.push(Arg::Scalar(p.parse_expression()?));
        }
        if !p.consume(&Token::Comma) {
            break;
        }
    }
    p.expect(Token::RParen)?;

    apply_call(circuit, &method, args, line)
}

fn apply_call(circuit: &mut Circuit, method: &str, args: Vec<Arg>, line: usize) -> ParseResult<()> {
    match method {
        "measure" => {
            let [qs, cs] = <[Arg; 2]>::try_from(args).map_err(|_| ParseError::Unsupported {
                line,
                feature: "measure takes a qubit and a clbit argument".into(),
            })?;
            let qs = indices(qs, line)?;
            let cs = indices(cs, line)?;
            if qs.len() != cs.len() {
                return Err(ParseError::BroadcastMismatch {
                    statement: "measure".into(),
                    left: qs.len(),
                    right: cs.len(),
                });
            }
            for (q, c) in qs.into_iter().zip(cs) {
                circuit.measure(QubitId(q), ClbitId(c))?;
            }
        }
        "measure_all" => {
            if circuit.num_clbits() < circuit.num_qubits() {
                return Err(ParseError::Unsupported {
                    line,
                    feature: "measure_all needs a classical bit per qubit".into(),
                });
            }
            circuit.measure_all()?;
        }
        "reset" => {
            for arg in args {
                for q in indices(arg, line)? {
                    circuit.reset(QubitId(q))?;
                }
            }
        }
        "barrier" => {
            if args.is_empty() {
                circuit.barrier_all()?;
            } else {
                let mut qubits = Vec::new();
                for arg in args {
                    qubits.extend(indices(arg, line)?.into_iter().map(QubitId));
                }
                circuit.push(Instruction::barrier(qubits))?;
            }
        }
        gate_name => {
            let split = StandardGate::parameter_count(gate_name).min(args.len());
            let mut args = args.into_iter();
            let angles = args
                .by_ref()
                .take(split)
                .map(|arg| match arg {
                    Arg::Scalar(angle) => Ok(angle),
                    Arg::List(_) => Err(ParseError::Unsupported {
                        line,
                        feature: format!("list-valued angle for {gate_name}"),
                    }),
                })
                .collect::<ParseResult<Vec<_>>>()?;
            let gate = StandardGate::from_name(gate_name, angles)?;
            let operands = args
                .map(|arg| indices(arg, line))
                .collect::<ParseResult<Vec<_>>>()?;
            for qubits in broadcast(gate_name, &operands)? {
                circuit.apply(gate.clone(), qubits.into_iter().map(QubitId))?;
            }
        }
    }
    Ok(())
}

/// Read an argument as non-negative integer indices.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn indices(arg: Arg, line: usize) -> ParseResult<Vec<u32>> {
    let items = match arg {
        Arg::Scalar(a) => vec![a],
        Arg::List(items) => items,
    };
    items
        .into_iter()
        .map(|a| match a {
            Angle::Value(v) if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => {
                Ok(v as u32)
            }
            other => Err(ParseError::UnexpectedToken {
                line,
                expected: "bit index".into(),
                found: other.to_string(),
            }),
        })
        .collect()
}
