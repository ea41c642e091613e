//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! It follows the Bittle grammar: tokens first (trivia, literals,
//! punctuation, keywords), then composite node kinds.

/// All syntax kinds (tokens and nodes) in Bittle
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (declarations, statements, expressions, patterns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,      // identifier
    INT_NUMBER, // 42, 0xFF, 0b1010, 1_000
    STRING,     // "hello"
    CHAR,       // 'c'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_PAREN,     // (
    R_PAREN,     // )
    L_BRACE,     // {
    R_BRACE,     // }
    L_BRACKET,   // [
    R_BRACKET,   // ]
    COLON,       // :
    SEMICOLON,   // ;
    DOT,         // .
    COMMA,       // ,
    DOT_DOT_DOT, // ...
    DOT_DOT_EQ,  // ..=
    DOT_DOT_LT,  // ..<
    AT,          // @
    TILDE,       // ~
    PIPE,        // |
    PIPE_EQ,     // |=
    PIPE_PIPE,   // ||
    AMP,         // &
    AMP_EQ,      // &=
    AMP_AMP,     // &&
    GT,          // >
    SHR,         // >>
    SHR_EQ,      // >>=
    GT_EQ,       // >=
    EQ,          // =
    EQ_EQ,       // ==
    FAT_ARROW,   // =>
    BANG,        // !
    BANG_EQ,     // !=
    QUESTION,    // ?
    LT,          // <
    SHL,         // <<
    SHL_EQ,      // <<=
    LT_EQ,       // <=
    L_ARROW,     // <-
    PLUS,        // +
    PLUS_EQ,     // +=
    MINUS,       // -
    MINUS_EQ,    // -=
    THIN_ARROW,  // ->
    STAR,        // *
    STAR_EQ,     // *=
    SLASH,       // /
    SLASH_EQ,    // /=
    PERCENT,     // %
    PERCENT_EQ,  // %=
    CARET,       // ^
    CARET_EQ,    // ^=

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    AS_KW,
    BREAK_KW,
    CASE_KW,
    CONST_KW,
    CONTINUE_KW,
    DO_KW,
    ELSE_KW,
    ENUM_KW,
    EXTERN_KW,
    FALSE_KW,
    FOR_KW,
    FUNC_KW,
    IF_KW,
    INCLUDE_KW,
    IMPORT_KW,
    IS_KW,
    MATCH_KW,
    MODULE_KW,
    MUT_KW,
    NULL_KW,
    RETURN_KW,
    SIZEOF_KW,
    STRUCT_KW,
    TRUE_KW,
    TYPEOF_KW,
    UNION_KW,
    VAR_KW,
    WHILE_KW,
    UNDERSCORE, // _

    // =========================================================================
    // SPECIAL TOKENS
    // =========================================================================
    ERROR,
    EOF,

    // =========================================================================
    // COMPOSITE NODES - declarations
    // =========================================================================
    ROOT,
    INCLUDE_DECL,
    MODULE_DECL,
    IMPORT_DECL,
    ENUM_DECL,
    ENUM_MEMBER,
    RECORD_DECL,
    RECORD_FIELD,
    FUNC_DECL,
    PARAM,
    GLOBAL_DECL,
    CONST_DECL,

    // =========================================================================
    // COMPOSITE NODES - types
    // =========================================================================
    GROUP_TYPE,
    NAME_TYPE,
    POINTER_TYPE,
    ARRAY_TYPE,
    TYPEOF_TYPE,
    NEVER_TYPE,
    REST_TYPE,

    // =========================================================================
    // COMPOSITE NODES - statements
    // =========================================================================
    BLOCK_STMT,
    LOCAL_DECL,
    IF_STMT,
    MATCH_STMT,
    MATCH_CASE,
    MATCH_GUARD,
    WHILE_STMT,
    FOR_STMT,
    RETURN_STMT,
    BREAK_STMT,
    CONTINUE_STMT,
    EXPR_STMT,

    // =========================================================================
    // COMPOSITE NODES - expressions
    // =========================================================================
    GROUP_EXPR,
    NAME_EXPR,
    LITERAL_EXPR,
    ARRAY_EXPR,
    CALL_EXPR,
    CALL_ARG,
    INDEX_EXPR,
    FIELD_EXPR,
    BINARY_EXPR,
    UNARY_EXPR,
    TERNARY_EXPR,
    CAST_EXPR,
    IS_EXPR,
    SIZEOF_EXPR,
    RECORD_EXPR,
    FIELD_INIT,

    // =========================================================================
    // COMPOSITE NODES - patterns
    // =========================================================================
    GROUP_PAT,
    LITERAL_PAT,
    NAME_PAT,
    WILDCARD_PAT,
    VAR_PAT,
    RANGE_PAT,
    OR_PAT,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE | SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT
        )
    }

    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::AS_KW as u16)
            && (self as u16) <= (SyntaxKind::UNDERSCORE as u16)
    }

    /// Token kinds a literal expression is built from.
    pub fn is_literal_token(self) -> bool {
        matches!(
            self,
            SyntaxKind::INT_NUMBER
                | SyntaxKind::STRING
                | SyntaxKind::CHAR
                | SyntaxKind::TRUE_KW
                | SyntaxKind::FALSE_KW
                | SyntaxKind::NULL_KW
        )
    }
}

/// Convert a SyntaxKind to a human-readable name for error messages
pub fn kind_to_name(kind: SyntaxKind) -> &'static str {
    match kind {
        // Trivia
        SyntaxKind::WHITESPACE => "whitespace",
        SyntaxKind::LINE_COMMENT => "comment",
        SyntaxKind::BLOCK_COMMENT => "comment",

        // Literals
        SyntaxKind::IDENT => "identifier",
        SyntaxKind::INT_NUMBER => "number",
        SyntaxKind::STRING => "string",
        SyntaxKind::CHAR => "character",
        SyntaxKind::ERROR => "error",
        SyntaxKind::EOF => "end of file",

        // Punctuation
        SyntaxKind::L_PAREN => "'('",
        SyntaxKind::R_PAREN => "')'",
        SyntaxKind::L_BRACE => "'{'",
        SyntaxKind::R_BRACE => "'}'",
        SyntaxKind::L_BRACKET => "'['",
        SyntaxKind::R_BRACKET => "']'",
        SyntaxKind::COLON => "':'",
        SyntaxKind::SEMICOLON => "';'",
        SyntaxKind::DOT => "'.'",
        SyntaxKind::COMMA => "','",
        SyntaxKind::DOT_DOT_DOT => "'...'",
        SyntaxKind::DOT_DOT_EQ => "'..='",
        SyntaxKind::DOT_DOT_LT => "'..<'",
        SyntaxKind::AT => "'@'",
        SyntaxKind::TILDE => "'~'",
        SyntaxKind::PIPE => "'|'",
        SyntaxKind::PIPE_EQ => "'|='",
        SyntaxKind::PIPE_PIPE => "'||'",
        SyntaxKind::AMP => "'&'",
        SyntaxKind::AMP_EQ => "'&='",
        SyntaxKind::AMP_AMP => "'&&'",
        SyntaxKind::GT => "'>'",
        SyntaxKind::SHR => "'>>'",
        SyntaxKind::SHR_EQ => "'>>='",
        SyntaxKind::GT_EQ => "'>='",
        SyntaxKind::EQ => "'='",
        SyntaxKind::EQ_EQ => "'=='",
        SyntaxKind::FAT_ARROW => "'=>'",
        SyntaxKind::BANG => "'!'",
        SyntaxKind::BANG_EQ => "'!='",
        SyntaxKind::QUESTION => "'?'",
        SyntaxKind::LT => "'<'",
        SyntaxKind::SHL => "'<<'",
        SyntaxKind::SHL_EQ => "'<<='",
        SyntaxKind::LT_EQ => "'<='",
        SyntaxKind::L_ARROW => "'<-'",
        SyntaxKind::PLUS => "'+'",
        SyntaxKind::PLUS_EQ => "'+='",
        SyntaxKind::MINUS => "'-'",
        SyntaxKind::MINUS_EQ => "'-='",
        SyntaxKind::THIN_ARROW => "'->'",
        SyntaxKind::STAR => "'*'",
        SyntaxKind::STAR_EQ => "'*='",
        SyntaxKind::SLASH => "'/'",
        SyntaxKind::SLASH_EQ => "'/='",
        SyntaxKind::PERCENT => "'%'",
        SyntaxKind::PERCENT_EQ => "'%='",
        SyntaxKind::CARET => "'^'",
        SyntaxKind::CARET_EQ => "'^='",

        // Keywords
        SyntaxKind::AS_KW => "'as'",
        SyntaxKind::BREAK_KW => "'break'",
        SyntaxKind::CASE_KW => "'case'",
        SyntaxKind::CONST_KW => "'const'",
        SyntaxKind::CONTINUE_KW => "'continue'",
        SyntaxKind::DO_KW => "'do'",
        SyntaxKind::ELSE_KW => "'else'",
        SyntaxKind::ENUM_KW => "'enum'",
        SyntaxKind::EXTERN_KW => "'extern'",
        SyntaxKind::FALSE_KW => "'false'",
        SyntaxKind::FOR_KW => "'for'",
        SyntaxKind::FUNC_KW => "'func'",
        SyntaxKind::IF_KW => "'if'",
        SyntaxKind::INCLUDE_KW => "'include'",
        SyntaxKind::IMPORT_KW => "'import'",
        SyntaxKind::IS_KW => "'is'",
        SyntaxKind::MATCH_KW => "'match'",
        SyntaxKind::MODULE_KW => "'module'",
        SyntaxKind::MUT_KW => "'mut'",
        SyntaxKind::NULL_KW => "'null'",
        SyntaxKind::RETURN_KW => "'return'",
        SyntaxKind::SIZEOF_KW => "'sizeof'",
        SyntaxKind::STRUCT_KW => "'struct'",
        SyntaxKind::TRUE_KW => "'true'",
        SyntaxKind::TYPEOF_KW => "'typeof'",
        SyntaxKind::UNION_KW => "'union'",
        SyntaxKind::VAR_KW => "'var'",
        SyntaxKind::WHILE_KW => "'while'",
        SyntaxKind::UNDERSCORE => "'_'",

        // Composite nodes - describe the construct
        SyntaxKind::ROOT => "source file",
        SyntaxKind::INCLUDE_DECL => "include",
        SyntaxKind::MODULE_DECL => "module declaration",
        SyntaxKind::IMPORT_DECL => "import",
        SyntaxKind::ENUM_DECL => "enum",
        SyntaxKind::ENUM_MEMBER => "enum member",
        SyntaxKind::RECORD_DECL => "record",
        SyntaxKind::RECORD_FIELD => "record field",
        SyntaxKind::FUNC_DECL => "function",
        SyntaxKind::PARAM => "parameter",
        SyntaxKind::GLOBAL_DECL => "global variable",
        SyntaxKind::CONST_DECL => "constant",
        SyntaxKind::BLOCK_STMT => "block",
        SyntaxKind::LOCAL_DECL => "variable declaration",
        SyntaxKind::IF_STMT => "if statement",
        SyntaxKind::MATCH_STMT => "match statement",
        SyntaxKind::MATCH_CASE => "match case",
        SyntaxKind::WHILE_STMT => "while statement",
        SyntaxKind::FOR_STMT => "for statement",
        SyntaxKind::RETURN_STMT => "return statement",
        SyntaxKind::EXPR_STMT => "expression statement",

        // Fallback for any remaining cases
        _ => "syntax",
    }
}

/// Language definition hooking [`SyntaxKind`] into rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BittleLanguage {}

impl rowan::Language for BittleLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::OR_PAT as u16);
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        <BittleLanguage as rowan::Language>::kind_to_raw(kind)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<BittleLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<BittleLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<BittleLanguage>;
pub type SyntaxNodePtr = rowan::ast::SyntaxNodePtr<BittleLanguage>;
