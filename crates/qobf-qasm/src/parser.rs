//! Parser for `OpenQASM` 2.

use qobf_ir::{Angle, Circuit, ClbitId, Instruction, QubitId, StandardGate};
use rustc_hash::FxHashMap;

use crate::error::{ParseError, ParseResult};
use crate::lexer::{Token, tokenize};

/// Parse an `OpenQASM` 2.0 source string into a Circuit.
///
/// Registers are flattened in declaration order, so `qreg a[2]; qreg b[1];`
/// gives qubits `a[0]=0, a[1]=1, b[0]=2`. Whole-register operands broadcast
/// (`h q;`, `measure q -> c;`). Classically controlled `if` statements and
/// custom `gate` definitions are rejected.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let mut parser = Parser::new(source)?;
    let program = parser.parse_program()?;
    lower(&program)
}

/// Statement of a parsed program.
#[derive(Debug)]
enum Statement {
    Qreg { name: String, size: u32 },
    Creg { name: String, size: u32 },
    Gate {
        name: String,
        params: Vec<Angle>,
        args: Vec<Operand>,
        line: usize,
    },
    Measure {
        qubit: Operand,
        clbit: Operand,
        line: usize,
    },
    Reset(Operand),
    Barrier(Vec<Operand>),
}

/// A register reference, either `q` or `q[i]`.
#[derive(Debug, Clone)]
struct Operand {
    register: String,
    index: Option<u32>,
}

/// Token cursor with line tracking, shared with the Python reader.
pub(crate) struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    last_line: usize,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
impl Parser {
    /// Create a new parser from source.
    pub(crate) fn new(source: &str) -> ParseResult<Self> {
        Self::starting_at(source, 1)
    }

    /// Create a parser whose first source line is `first_line`.
    pub(crate) fn starting_at(source: &str, first_line: usize) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        let mut line = first_line;
        let mut scanned = 0;

        for result in tokenize(source) {
            match result {
                Ok(t) => {
                    line += source[scanned..t.span.start].matches('\n').count();
                    scanned = t.span.start;
                    tokens.push((t.token, line));
                }
                Err((span, msg)) => {
                    return Err(ParseError::LexerError {
                        position: span.start,
                        message: msg,
                    });
                }
            }
        }

        Ok(Self {
            tokens,
            pos: 0,
            last_line: line,
        })
    }

    /// Check if we've reached the end.
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Line of the current token.
    pub(crate) fn line(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.last_line, |t| t.1)
    }

    /// Peek at the current token.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.0)
    }

    /// Advance and return the current token.
    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.0.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(crate) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Check if current token matches.
    pub(crate) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(crate) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str, found: Option<Token>) -> ParseError {
        match found {
            Some(token) => ParseError::UnexpectedToken {
                line: self.line(),
                expected: expected.into(),
                found: token.to_string(),
            },
            None => ParseError::UnexpectedEof(expected.into()),
        }
    }

    /// Parse an identifier.
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            other => Err(self.unexpected("identifier", other)),
        }
    }

    /// Parse an integer literal that fits a register index.
    pub(crate) fn parse_index(&mut self) -> ParseResult<u32> {
        match self.advance() {
            Some(Token::IntLiteral(v)) => u32::try_from(v).map_err(|_| ParseError::UnexpectedToken {
                line: self.line(),
                expected: "32-bit index".into(),
                found: v.to_string(),
            }),
            other => Err(self.unexpected("integer", other)),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parse an angle expression.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Angle> {
        self.parse_binary_expr(0)
    }

    /// Parse binary expression with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<Angle> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek().and_then(binary_op) {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance();

            let right = self.parse_binary_expr(prec + 1)?;
            let (l, r) = (Box::new(left), Box::new(right));
            left = match op {
                BinOp::Add => Angle::Add(l, r),
                BinOp::Sub => Angle::Sub(l, r),
                BinOp::Mul => Angle::Mul(l, r),
                BinOp::Div => Angle::Div(l, r),
            };
        }

        Ok(left)
    }

    /// Parse unary expression.
    fn parse_unary_expr(&mut self) -> ParseResult<Angle> {
        if self.consume(&Token::Minus) {
            let expr = self.parse_unary_expr()?;
            return Ok(match expr {
                Angle::Value(v) => Angle::Value(-v),
                other => Angle::Neg(Box::new(other)),
            });
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary_expr();
        }
        self.parse_primary_expr()
    }

    /// Parse primary expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Angle> {
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(Angle::Value(v as f64)),
            Some(Token::FloatLiteral(v)) => Ok(Angle::Value(v)),
            Some(Token::Pi) => Ok(Angle::Pi),
            // `np.pi`, `math.pi`, `numpy.pi`
            Some(Token::Identifier(module)) if self.check(&Token::Dot) => {
                self.advance();
                match self.advance() {
                    Some(Token::Pi) => Ok(Angle::Pi),
                    other => Err(self.unexpected(&format!("{module}.pi"), other)),
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            other => Err(self.unexpected("expression", other)),
        }
    }

    /// Parse a comma-separated expression list up to (not including) `)`.
    pub(crate) fn parse_expression_list(&mut self) -> ParseResult<Vec<Angle>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_program(&mut self) -> ParseResult<Vec<Statement>> {
        self.parse_version()?;
        let mut statements = Vec::new();
        while !self.is_eof() {
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
        }
        Ok(statements)
    }

    /// Parse the mandatory `OPENQASM 2.x;` header.
    fn parse_version(&mut self) -> ParseResult<()> {
        self.expect(Token::OpenQasm)?;
        let version = match self.advance() {
            Some(Token::FloatLiteral(v)) => v,
            Some(Token::IntLiteral(v)) => v as f64,
            other => return Err(self.unexpected("version number", other)),
        };
        if !(2.0..3.0).contains(&version) {
            return Err(ParseError::InvalidVersion(version.to_string()));
        }
        self.expect(Token::Semicolon)
    }

    fn parse_statement(&mut self) -> ParseResult<Option<Statement>> {
        let line = self.line();
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        let stmt = match token {
            Token::Include => {
                self.advance();
                match self.advance() {
                    Some(Token::StringLiteral(_)) => {}
                    other => return Err(self.unexpected("include path", other)),
                }
                self.expect(Token::Semicolon)?;
                return Ok(None);
            }
            Token::Qreg | Token::Creg => {
                self.advance();
                let name = self.parse_identifier()?;
                self.expect(Token::LBracket)?;
                let size = self.parse_index()?;
                self.expect(Token::RBracket)?;
                self.expect(Token::Semicolon)?;
                if token == Token::Qreg {
                    Statement::Qreg { name, size }
                } else {
                    Statement::Creg { name, size }
                }
            }
            Token::Measure => {
                self.advance();
                let qubit = self.parse_operand()?;
                self.expect(Token::Arrow)?;
                let clbit = self.parse_operand()?;
                self.expect(Token::Semicolon)?;
                Statement::Measure { qubit, clbit, line }
            }
            Token::Reset => {
                self.advance();
                let operand = self.parse_operand()?;
                self.expect(Token::Semicolon)?;
                Statement::Reset(operand)
            }
            Token::Barrier => {
                self.advance();
                let operands = self.parse_operands()?;
                self.expect(Token::Semicolon)?;
                Statement::Barrier(operands)
            }
            Token::If => {
                return Err(ParseError::Unsupported {
                    line,
                    feature: "classically controlled 'if' statements".into(),
                });
            }
            Token::Gate | Token::Opaque => {
                return Err(ParseError::Unsupported {
                    line,
                    feature: "custom gate definitions".into(),
                });
            }
            Token::Identifier(name) => {
                self.advance();
                let params = if self.consume(&Token::LParen) {
                    let p = self.parse_expression_list()?;
                    self.expect(Token::RParen)?;
                    p
                } else {
                    vec![]
                };
                let args = self.parse_operands()?;
                self.expect(Token::Semicolon)?;
                // QASM2 built-ins are uppercase.
                let name = match name.as_str() {
                    "U" => "u".to_string(),
                    "CX" => "cx".to_string(),
                    _ => name,
                };
                Statement::Gate {
                    name,
                    params,
                    args,
                    line,
                }
            }
            other => return Err(self.unexpected("statement", Some(other))),
        };
        Ok(Some(stmt))
    }

    fn parse_operands(&mut self) -> ParseResult<Vec<Operand>> {
        let mut operands = vec![self.parse_operand()?];
        while self.consume(&Token::Comma) {
            operands.push(self.parse_operand()?);
        }
        Ok(operands)
    }

    fn parse_operand(&mut self) -> ParseResult<Operand> {
        let register = self.parse_identifier()?;
        let index = if self.consume(&Token::LBracket) {
            let index = self.parse_index()?;
            self.expect(Token::RBracket)?;
            Some(index)
        } else {
            None
        };
        Ok(Operand { register, index })
    }
}

#[derive(Debug, Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

fn binary_op(token: &Token) -> Option<BinOp> {
    match token {
        Token::Plus => Some(BinOp::Add),
        Token::Minus => Some(BinOp::Sub),
        Token::Star => Some(BinOp::Mul),
        Token::Slash => Some(BinOp::Div),
        _ => None,
    }
}

/// Get operator precedence.
fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
    }
}

// =============================================================================
// Lowering
// =============================================================================

/// Flattened register table: name -> (first index, size).
#[derive(Default)]
struct Registers {
    map: FxHashMap<String, (u32, u32)>,
    total: u32,
}

impl Registers {
    fn declare(&mut self, name: &str, size: u32) -> ParseResult<()> {
        if self.map.contains_key(name) {
            return Err(ParseError::DuplicateDeclaration(name.to_string()));
        }
        self.map.insert(name.to_string(), (self.total, size));
        self.total += size;
        Ok(())
    }

    /// Expand an operand to the flat indices it names.
    fn resolve(&self, operand: &Operand) -> ParseResult<Vec<u32>> {
        let &(start, size) = self
            .map
            .get(&operand.register)
            .ok_or_else(|| ParseError::UndefinedRegister(operand.register.clone()))?;
        match operand.index {
            Some(index) if index >= size => Err(ParseError::IndexOutOfBounds {
                register: operand.register.clone(),
                index: index as usize,
                size: size as usize,
            }),
            Some(index) => Ok(vec![start + index]),
            None => Ok((start..start + size).collect()),
        }
    }
}

/// Zip operands for a broadcast statement. Single-bit operands repeat; whole
/// registers must all have the same size.
pub(crate) fn broadcast(statement: &str, resolved: &[Vec<u32>]) -> ParseResult<Vec<Vec<u32>>> {
    let mut width = 1;
    for operand in resolved.iter().filter(|r| r.len() != 1) {
        if width != 1 && operand.len() != width {
            return Err(ParseError::BroadcastMismatch {
                statement: statement.to_string(),
                left: width,
                right: operand.len(),
            });
        }
        width = operand.len();
    }
    Ok((0..width)
        .map(|i| {
            resolved
                .iter()
                .map(|r| if r.len() == 1 { r[0] } else { r[i] })
                .collect()
        })
        .collect())
}

fn lower(program: &[Statement]) -> ParseResult<Circuit> {
    let mut qregs = Registers::default();
    let mut cregs = Registers::default();
    for stmt in program {
        match stmt {
            Statement::Qreg { name, size } => qregs.declare(name, *size)?,
            Statement::Creg { name, size } => cregs.declare(name, *size)?,
            _ => {}
        }
    }

    let mut circuit = Circuit::with_size("circuit", qregs.total, cregs.total);

    for stmt in program {
        match stmt {
            Statement::Qreg { .. } | Statement::Creg { .. } => {}
            Statement::Gate {
                name,
                params,
                args,
                line,
            } => {
                let gate = StandardGate::from_name(name, params.clone())?;
                let resolved = args
                    .iter()
                    .map(|a| qregs.resolve(a))
                    .collect::<ParseResult<Vec<_>>>()?;
                for qubits in broadcast(name, &resolved)? {
                    circuit
                        .apply(gate.clone(), qubits.into_iter().map(QubitId))
                        .map_err(|e| annotate(e, *line))?;
                }
            }
            Statement::Measure { qubit, clbit, line } => {
                let qs = qregs.resolve(qubit)?;
                let cs = cregs.resolve(clbit)?;
                if qs.len() != cs.len() {
                    return Err(ParseError::BroadcastMismatch {
                        statement: "measure".into(),
                        left: qs.len(),
                        right: cs.len(),
                    });
                }
                for (q, c) in qs.into_iter().zip(cs) {
                    circuit
                        .measure(QubitId(q), ClbitId(c))
                        .map_err(|e| annotate(e, *line))?;
                }
            }
            Statement::Reset(operand) => {
                for q in qregs.resolve(operand)? {
                    circuit.reset(QubitId(q))?;
                }
            }
            Statement::Barrier(operands) => {
                let mut qubits = Vec::new();
                for operand in operands {
                    for q in qregs.resolve(operand)? {
                        if !qubits.contains(&QubitId(q)) {
                            qubits.push(QubitId(q));
                        }
                    }
                }
                circuit.push(Instruction::barrier(qubits))?;
            }
        }
    }

    Ok(circuit)
}

fn annotate(error: qobf_ir::IrError, line: usize) -> ParseError {
    ParseError::Unsupported {
        line,
        feature: error.to_string(),
    }
}
