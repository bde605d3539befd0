//! Token definitions for the Vela lexer.

use logos::Logos;
use std::fmt;

/// Represents a token in the Vela language.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

/// Represents the different kinds of tokens in Vela.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
    // Keywords
    #[token("data")]
    Data,

    #[token("def")]
    Def,

    #[token("end")]
    End,

    #[token("let")]
    Let,

    #[token("var")]
    Var,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("while")]
    While,

    #[token("return")]
    Return,

    #[token("del")]
    Del,

    #[token("import")]
    Import,

    #[token("from")]
    From,

    #[token("select")]
    Select,

    #[token("by")]
    By,

    #[token("where")]
    Where,

    #[token("sort")]
    Sort,

    #[token("join")]
    Join,

    #[token("on")]
    On,

    #[token("asof")]
    Asof,

    #[token("strict")]
    Strict,

    #[token("nearest")]
    Nearest,

    #[token("backward")]
    Backward,

    #[token("forward")]
    Forward,

    #[token("within")]
    Within,

    #[token("and")]
    And,

    #[token("or")]
    Or,

    #[token("not")]
    Not,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // Identifiers and literals. A leading `!` marks a Dataframe name.
    #[regex(r"!?[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    /// Integer literal with a user-defined suffix, e.g. `100ms`.
    #[regex(r"[0-9]+[a-zA-Z_][a-zA-Z0-9_]*")]
    IntegerSuffix,

    /// Float literal with a user-defined suffix, e.g. `2.5kg`.
    #[regex(r"[0-9]+\.[0-9]+[a-zA-Z_][a-zA-Z0-9_]*")]
    FloatSuffix,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\]|\\.)'")]
    Char,

    // Operators
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("=")]
    Equal,

    #[token("==")]
    EqualEqual,

    #[token("!=")]
    BangEqual,

    #[token("<")]
    Less,

    #[token("<=")]
    LessEqual,

    #[token(">")]
    Greater,

    #[token(">=")]
    GreaterEqual,

    #[token(":=")]
    ColonEqual,

    #[token("->")]
    Arrow,

    #[token("$")]
    Dollar,

    // Punctuation
    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(".")]
    Dot,

    /// Statement separator; suppressed inside brackets.
    #[token("\n")]
    Newline,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => write!(f, "data"),
            Self::Def => write!(f, "def"),
            Self::End => write!(f, "end"),
            Self::Let => write!(f, "let"),
            Self::Var => write!(f, "var"),
            Self::If => write!(f, "if"),
            Self::Else => write!(f, "else"),
            Self::While => write!(f, "while"),
            Self::Return => write!(f, "return"),
            Self::Del => write!(f, "del"),
            Self::Import => write!(f, "import"),
            Self::From => write!(f, "from"),
            Self::Select => write!(f, "select"),
            Self::By => write!(f, "by"),
            Self::Where => write!(f, "where"),
            Self::Sort => write!(f, "sort"),
            Self::Join => write!(f, "join"),
            Self::On => write!(f, "on"),
            Self::Asof => write!(f, "asof"),
            Self::Strict => write!(f, "strict"),
            Self::Nearest => write!(f, "nearest"),
            Self::Backward => write!(f, "backward"),
            Self::Forward => write!(f, "forward"),
            Self::Within => write!(f, "within"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),

            Self::Identifier => write!(f, "identifier"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::IntegerSuffix => write!(f, "integer literal"),
            Self::FloatSuffix => write!(f, "float literal"),
            Self::String => write!(f, "string"),
            Self::Char => write!(f, "character"),

            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Equal => write!(f, "="),
            Self::EqualEqual => write!(f, "=="),
            Self::BangEqual => write!(f, "!="),
            Self::Less => write!(f, "<"),
            Self::LessEqual => write!(f, "<="),
            Self::Greater => write!(f, ">"),
            Self::GreaterEqual => write!(f, ">="),
            Self::ColonEqual => write!(f, ":="),
            Self::Arrow => write!(f, "->"),
            Self::Dollar => write!(f, "$"),

            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
            Self::Comma => write!(f, ","),
            Self::Colon => write!(f, ":"),
            Self::Semicolon => write!(f, ";"),
            Self::Dot => write!(f, "."),
            Self::Newline => write!(f, "newline"),
        }
    }
}
