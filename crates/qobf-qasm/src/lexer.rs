//! Lexer shared by the OpenQASM 2 and Python circuit readers.

use logos::Logos;

/// Tokens for `OpenQASM` 2 and the argument lists of Python builder calls.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token {
    // Keywords
    #[token("OPENQASM")]
    OpenQasm,

    #[token("include")]
    Include,

    #[token("qreg")]
    Qreg,

    #[token("creg")]
    Creg,

    #[token("gate")]
    Gate,

    #[token("opaque")]
    Opaque,

    #[token("if")]
    If,

    #[token("measure")]
    Measure,

    #[token("reset")]
    Reset,

    #[token("barrier")]
    Barrier,

    // Constants
    #[token("pi")]
    Pi,

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    StringLiteral(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Operators and punctuation
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("==")]
    EqEq,

    #[token("=")]
    Eq,

    #[token("->")]
    Arrow,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::OpenQasm => write!(f, "OPENQASM"),
            Token::Include => write!(f, "include"),
            Token::Qreg => write!(f, "qreg"),
            Token::Creg => write!(f, "creg"),
            Token::Gate => write!(f, "gate"),
            Token::Opaque => write!(f, "opaque"),
            Token::If => write!(f, "if"),
            Token::Measure => write!(f, "measure"),
            Token::Reset => write!(f, "reset"),
            Token::Barrier => write!(f, "barrier"),
            Token::Pi => write!(f, "pi"),
            Token::FloatLiteral(v) => write!(f, "{v}"),
            Token::IntLiteral(v) => write!(f, "{v}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::EqEq => write!(f, "=="),
            Token::Eq => write!(f, "="),
            Token::Arrow => write!(f, "->"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
        }
    }
}

/// A token with its span information.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Tokenize a source string.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken, (std::ops::Range<usize>, String)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        if let Ok(token) = result {
            tokens.push(Ok(SpannedToken { token, span }));
        } else {
            let slice = &source[span.clone()];
            tokens.push(Err((span, format!("Invalid token: '{slice}'"))));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_header_tokens() {
        let toks = tokens("OPENQASM 2.0;\ninclude \"qelib1.inc\";");
        assert_eq!(toks[0], Token::OpenQasm);
        assert!(matches!(toks[1], Token::FloatLiteral(v) if (v - 2.0).abs() < 1e-12));
        assert_eq!(toks[2], Token::Semicolon);
        assert_eq!(toks[3], Token::Include);
        assert_eq!(toks[4], Token::StringLiteral("qelib1.inc".into()));
    }

    #[test]
    fn test_register_declaration() {
        let toks = tokens("qreg q[3];");
        assert_eq!(toks[0], Token::Qreg);
        assert_eq!(toks[1], Token::Identifier("q".into()));
        assert_eq!(toks[2], Token::LBracket);
        assert_eq!(toks[3], Token::IntLiteral(3));
        assert_eq!(toks[4], Token::RBracket);
    }

    #[test]
    fn test_measure_arrow() {
        let toks = tokens("measure q[0] -> c[0];");
        assert_eq!(toks[0], Token::Measure);
        assert!(toks.contains(&Token::Arrow));
    }

    #[test]
    fn test_parameterized_gate() {
        let toks = tokens("rz(-pi/4) q[1];");
        assert_eq!(toks[1], Token::LParen);
        assert_eq!(toks[2], Token::Minus);
        assert_eq!(toks[3], Token::Pi);
        assert_eq!(toks[4], Token::Slash);
        assert_eq!(toks[5], Token::IntLiteral(4));
    }

    #[test]
    fn test_python_tokens() {
        let toks = tokens("qc.rx(np.pi/2, 0)");
        assert_eq!(toks[0], Token::Identifier("qc".into()));
        assert_eq!(toks[1], Token::Dot);
        assert_eq!(toks[5], Token::Dot);
        assert_eq!(toks[6], Token::Pi);

        let toks = tokens("name='bell'");
        assert_eq!(toks[2], Token::StringLiteral("bell".into()));
    }

    #[test]
    fn test_invalid_token() {
        let results = tokenize("h q[0] $;");
        assert!(results.iter().any(Result::is_err));
    }
}
