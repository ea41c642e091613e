//! Logos-based lexer for Bittle
//!
//! Fast tokenization using the logos crate. Trivia (whitespace, line and
//! block comments) are emitted as ordinary tokens so the CST stays lossless.
//! Lexical errors never abort tokenization: unterminated literals and stray
//! bytes become `ERROR` tokens plus an entry in the error sink.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::{TextRange, TextSize};
use thiserror::Error;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }
}

/// A lexical error with location and category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid character literal")]
    InvalidCharLiteral,
    #[error("unexpected character")]
    UnexpectedCharacter,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (Token<'a>, Option<LexErrorKind>);

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let (kind, error) = match logos_token {
            Ok(LogosToken::UnterminatedString) => {
                (SyntaxKind::ERROR, Some(LexErrorKind::UnterminatedString))
            }
            Ok(LogosToken::UnterminatedChar) => {
                (SyntaxKind::ERROR, Some(LexErrorKind::UnterminatedChar))
            }
            Ok(t) => (t.into(), None),
            Err(()) => (SyntaxKind::ERROR, Some(LexErrorKind::UnexpectedCharacter)),
        };

        Some((Token { kind, text, offset }, error))
    }
}

/// Tokenize an entire string, collecting lexical errors.
///
/// The returned stream always ends with a single `EOF` token.
pub fn tokenize(input: &str) -> (Vec<Token<'_>>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for (token, error) in Lexer::new(input) {
        if let Some(kind) = error {
            errors.push(LexError {
                kind,
                range: token.range(),
            });
        }
        match token.kind {
            SyntaxKind::STRING => check_escapes(&token, &mut errors),
            SyntaxKind::CHAR => {
                check_escapes(&token, &mut errors);
                let content = literal_content(token.text);
                if unescape_lenient(content).len() != 1 {
                    errors.push(LexError {
                        kind: LexErrorKind::InvalidCharLiteral,
                        range: token.range(),
                    });
                }
            }
            _ => {}
        }
        tokens.push(token);
    }
    tokens.push(Token {
        kind: SyntaxKind::EOF,
        text: "",
        offset: TextSize::of(input),
    });
    (tokens, errors)
}

/// Strip the surrounding quotes from a string or character literal.
pub fn literal_content(text: &str) -> &str {
    let text = &text[1..];
    text.strip_suffix(['"', '\'']).unwrap_or(text)
}

/// Decode the escape sequences of a literal's content, keeping going past
/// invalid ones (they decode to nothing).
pub fn unescape_lenient(content: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut bytes = content.bytes();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'0') => out.push(0),
            Some(b'\\') => out.push(b'\\'),
            Some(b'\'') => out.push(b'\''),
            Some(b'"') => out.push(b'"'),
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(b'r') => out.push(b'\r'),
            Some(b'x') => {
                let hi = bytes.next().and_then(hex_digit);
                let lo = bytes.next().and_then(hex_digit);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    out.push(hi * 16 + lo);
                }
            }
            _ => {}
        }
    }
    out
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Report an `InvalidEscape` error for each bad escape in a literal token.
fn check_escapes(token: &Token<'_>, errors: &mut Vec<LexError>) {
    let content = literal_content(token.text);
    let base = u32::from(token.offset) + 1;
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        let start = i;
        let valid = match bytes.get(i + 1) {
            Some(b'0' | b'\\' | b'\'' | b'"' | b'n' | b't' | b'r') => {
                i += 2;
                true
            }
            Some(b'x') => {
                let ok = bytes.get(i + 2).copied().and_then(hex_digit).is_some()
                    && bytes.get(i + 3).copied().and_then(hex_digit).is_some();
                i += if ok { 4 } else { 2 };
                ok
            }
            Some(_) => {
                i += 2;
                false
            }
            None => {
                i += 1;
                false
            }
        };
        if !valid {
            errors.push(LexError {
                kind: LexErrorKind::InvalidEscape,
                range: TextRange::new(
                    TextSize::new(base + start as u32),
                    TextSize::new(base + i as u32),
                ),
            });
        }
    }
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9][0-9_]*")]
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    Integer,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    #[regex(r#""([^"\\\n]|\\[^\n])*"#)]
    UnterminatedString,

    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    Char,

    #[regex(r"'([^'\\\n]|\\[^\n])*")]
    UnterminatedChar,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (longest match wins in logos)
    // =========================================================================
    #[token("...")]
    DotDotDot,
    #[token("..=")]
    DotDotEq,
    #[token("..<")]
    DotDotLt,
    #[token("|=")]
    PipeEq,
    #[token("||")]
    PipePipe,
    #[token("&=")]
    AmpEq,
    #[token("&&")]
    AmpAmp,
    #[token(">>=")]
    ShrEq,
    #[token(">>")]
    Shr,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("=>")]
    FatArrow,
    #[token("!=")]
    BangEq,
    #[token("<<=")]
    ShlEq,
    #[token("<<")]
    Shl,
    #[token("<=")]
    LtEq,
    #[token("<-")]
    LArrow,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("->")]
    ThinArrow,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("^=")]
    CaretEq,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("@")]
    At,
    #[token("~")]
    Tilde,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token("<")]
    Lt,
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
    #[token("^")]
    Caret,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("as")]
    AsKw,
    #[token("break")]
    BreakKw,
    #[token("case")]
    CaseKw,
    #[token("const")]
    ConstKw,
    #[token("continue")]
    ContinueKw,
    #[token("do")]
    DoKw,
    #[token("else")]
    ElseKw,
    #[token("enum")]
    EnumKw,
    #[token("extern")]
    ExternKw,
    #[token("false")]
    FalseKw,
    #[token("for")]
    ForKw,
    #[token("func")]
    FuncKw,
    #[token("if")]
    IfKw,
    #[token("include")]
    IncludeKw,
    #[token("import")]
    ImportKw,
    #[token("is")]
    IsKw,
    #[token("match")]
    MatchKw,
    #[token("module")]
    ModuleKw,
    #[token("mut")]
    MutKw,
    #[token("null")]
    NullKw,
    #[token("return")]
    ReturnKw,
    #[token("sizeof")]
    SizeofKw,
    #[token("struct")]
    StructKw,
    #[token("true")]
    TrueKw,
    #[token("typeof")]
    TypeofKw,
    #[token("union")]
    UnionKw,
    #[token("var")]
    VarKw,
    #[token("while")]
    WhileKw,
    #[token("_", priority = 3)]
    Underscore,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            // Trivia
            Whitespace => SyntaxKind::WHITESPACE,
            LineComment => SyntaxKind::LINE_COMMENT,
            BlockComment => SyntaxKind::BLOCK_COMMENT,

            // Literals
            Ident => SyntaxKind::IDENT,
            Integer => SyntaxKind::INT_NUMBER,
            String => SyntaxKind::STRING,
            Char => SyntaxKind::CHAR,
            UnterminatedString | UnterminatedChar => SyntaxKind::ERROR,

            // Multi-char punctuation
            DotDotDot => SyntaxKind::DOT_DOT_DOT,
            DotDotEq => SyntaxKind::DOT_DOT_EQ,
            DotDotLt => SyntaxKind::DOT_DOT_LT,
            PipeEq => SyntaxKind::PIPE_EQ,
            PipePipe => SyntaxKind::PIPE_PIPE,
            AmpEq => SyntaxKind::AMP_EQ,
            AmpAmp => SyntaxKind::AMP_AMP,
            ShrEq => SyntaxKind::SHR_EQ,
            Shr => SyntaxKind::SHR,
            GtEq => SyntaxKind::GT_EQ,
            EqEq => SyntaxKind::EQ_EQ,
            FatArrow => SyntaxKind::FAT_ARROW,
            BangEq => SyntaxKind::BANG_EQ,
            ShlEq => SyntaxKind::SHL_EQ,
            Shl => SyntaxKind::SHL,
            LtEq => SyntaxKind::LT_EQ,
            LArrow => SyntaxKind::L_ARROW,
            PlusEq => SyntaxKind::PLUS_EQ,
            MinusEq => SyntaxKind::MINUS_EQ,
            ThinArrow => SyntaxKind::THIN_ARROW,
            StarEq => SyntaxKind::STAR_EQ,
            SlashEq => SyntaxKind::SLASH_EQ,
            PercentEq => SyntaxKind::PERCENT_EQ,
            CaretEq => SyntaxKind::CARET_EQ,

            // Single-char punctuation
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            Colon => SyntaxKind::COLON,
            Semicolon => SyntaxKind::SEMICOLON,
            Dot => SyntaxKind::DOT,
            Comma => SyntaxKind::COMMA,
            At => SyntaxKind::AT,
            Tilde => SyntaxKind::TILDE,
            Pipe => SyntaxKind::PIPE,
            Amp => SyntaxKind::AMP,
            Gt => SyntaxKind::GT,
            Eq => SyntaxKind::EQ,
            Bang => SyntaxKind::BANG,
            Question => SyntaxKind::QUESTION,
            Lt => SyntaxKind::LT,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Star => SyntaxKind::STAR,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,
            Caret => SyntaxKind::CARET,

            // Keywords
            AsKw => SyntaxKind::AS_KW,
            BreakKw => SyntaxKind::BREAK_KW,
            CaseKw => SyntaxKind::CASE_KW,
            ConstKw => SyntaxKind::CONST_KW,
            ContinueKw => SyntaxKind::CONTINUE_KW,
            DoKw => SyntaxKind::DO_KW,
            ElseKw => SyntaxKind::ELSE_KW,
            EnumKw => SyntaxKind::ENUM_KW,
            ExternKw => SyntaxKind::EXTERN_KW,
            FalseKw => SyntaxKind::FALSE_KW,
            ForKw => SyntaxKind::FOR_KW,
            FuncKw => SyntaxKind::FUNC_KW,
            IfKw => SyntaxKind::IF_KW,
            IncludeKw => SyntaxKind::INCLUDE_KW,
            ImportKw => SyntaxKind::IMPORT_KW,
            IsKw => SyntaxKind::IS_KW,
            MatchKw => SyntaxKind::MATCH_KW,
            ModuleKw => SyntaxKind::MODULE_KW,
            MutKw => SyntaxKind::MUT_KW,
            NullKw => SyntaxKind::NULL_KW,
            ReturnKw => SyntaxKind::RETURN_KW,
            SizeofKw => SyntaxKind::SIZEOF_KW,
            StructKw => SyntaxKind::STRUCT_KW,
            TrueKw => SyntaxKind::TRUE_KW,
            TypeofKw => SyntaxKind::TYPEOF_KW,
            UnionKw => SyntaxKind::UNION_KW,
            VarKw => SyntaxKind::VAR_KW,
            WhileKw => SyntaxKind::WHILE_KW,
            Underscore => SyntaxKind::UNDERSCORE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        let (tokens, _) = tokenize(input);
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_func_header() {
        assert_eq!(
            kinds("func f();"),
            vec![
                SyntaxKind::FUNC_KW,
                SyntaxKind::WHITESPACE,
                SyntaxKind::IDENT,
                SyntaxKind::L_PAREN,
                SyntaxKind::R_PAREN,
                SyntaxKind::SEMICOLON,
                SyntaxKind::EOF,
            ]
        );
    }

    #[test]
    fn test_lex_maximal_munch() {
        assert_eq!(
            kinds("a <<= b"),
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::WHITESPACE,
                SyntaxKind::SHL_EQ,
                SyntaxKind::WHITESPACE,
                SyntaxKind::IDENT,
                SyntaxKind::EOF,
            ]
        );
        assert_eq!(kinds("...")[0], SyntaxKind::DOT_DOT_DOT);
        assert_eq!(kinds("..=")[0], SyntaxKind::DOT_DOT_EQ);
        assert_eq!(kinds("..<")[0], SyntaxKind::DOT_DOT_LT);
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(kinds("0xFF")[0], SyntaxKind::INT_NUMBER);
        assert_eq!(kinds("0b1010")[0], SyntaxKind::INT_NUMBER);
        assert_eq!(kinds("1_000_000")[0], SyntaxKind::INT_NUMBER);
    }

    #[test]
    fn test_lex_keywords_vs_idents() {
        assert_eq!(kinds("matching")[0], SyntaxKind::IDENT);
        assert_eq!(kinds("match")[0], SyntaxKind::MATCH_KW);
        assert_eq!(kinds("_")[0], SyntaxKind::UNDERSCORE);
        assert_eq!(kinds("_x")[0], SyntaxKind::IDENT);
    }

    #[test]
    fn test_lex_comment() {
        let (tokens, errors) = tokenize("// note\nvar");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, SyntaxKind::LINE_COMMENT);
        assert_eq!(tokens[0].text, "// note");
        assert_eq!(tokens[2].kind, SyntaxKind::VAR_KW);
    }

    #[test]
    fn test_lex_block_comment() {
        let (tokens, errors) = tokenize("/* spans\n   lines */ var");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, SyntaxKind::BLOCK_COMMENT);
        assert_eq!(tokens[0].text, "/* spans\n   lines */");
        assert!(tokens[0].kind.is_trivia());
        assert_eq!(tokens[2].kind, SyntaxKind::VAR_KW);
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = tokenize("\"abc\nvar");
        assert_eq!(tokens[0].kind, SyntaxKind::ERROR);
        assert_eq!(tokens[0].text, "\"abc");
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
        assert_eq!(tokens[2].kind, SyntaxKind::VAR_KW);
    }

    #[test]
    fn test_invalid_escape() {
        let (_, errors) = tokenize(r#""a\qb""#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::InvalidEscape);
    }

    #[test]
    fn test_char_literals() {
        let (_, errors) = tokenize(r"'\x41'");
        assert!(errors.is_empty());
        let (_, errors) = tokenize("'ab'");
        assert_eq!(errors[0].kind, LexErrorKind::InvalidCharLiteral);
    }

    #[test]
    fn test_unexpected_character() {
        let (tokens, errors) = tokenize("var $ x");
        assert_eq!(errors[0].kind, LexErrorKind::UnexpectedCharacter);
        assert_eq!(tokens[2].kind, SyntaxKind::ERROR);
        assert_eq!(tokens[2].text, "$");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_lenient(r"a\nb"), b"a\nb");
        assert_eq!(unescape_lenient(r"\x41\x42"), b"AB");
        assert_eq!(unescape_lenient(r"\0"), vec![0]);
    }

    #[test]
    fn test_eof_is_last_and_unique() {
        let (tokens, _) = tokenize("1 + 2");
        assert_eq!(tokens.last().unwrap().kind, SyntaxKind::EOF);
        let eofs = tokens.iter().filter(|t| t.kind == SyntaxKind::EOF).count();
        assert_eq!(eofs, 1);
    }
}
