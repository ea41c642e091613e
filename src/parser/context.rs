//! Parse context tracking for context-aware error messages
//!
//! The parser maintains a stack of contexts so an error can say which
//! construct it happened in ("expected ';', found '}' while parsing
//! constant declaration").

/// The construct currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseContext {
    IncludeDecl,
    ModuleDecl,
    ImportDecl,
    EnumDecl,
    RecordDecl,
    FuncDecl,
    ParamList,
    GlobalDecl,
    ConstDecl,
    Block,
    IfStmt,
    WhileStmt,
    ForStmt,
    MatchStmt,
    MatchCase,
    ReturnStmt,
    LocalDecl,
    TypeRef,
    Expression,
    ArgumentList,
    RecordLiteral,
    ArrayLiteral,
    Pattern,
}

impl ParseContext {
    /// Human-readable description for error messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::IncludeDecl => "include",
            Self::ModuleDecl => "module declaration",
            Self::ImportDecl => "import",
            Self::EnumDecl => "enum declaration",
            Self::RecordDecl => "record declaration",
            Self::FuncDecl => "function declaration",
            Self::ParamList => "parameter list",
            Self::GlobalDecl => "variable declaration",
            Self::ConstDecl => "constant declaration",
            Self::Block => "block",
            Self::IfStmt => "if statement",
            Self::WhileStmt => "while statement",
            Self::ForStmt => "for statement",
            Self::MatchStmt => "match statement",
            Self::MatchCase => "match case",
            Self::ReturnStmt => "return statement",
            Self::LocalDecl => "variable declaration",
            Self::TypeRef => "type",
            Self::Expression => "expression",
            Self::ArgumentList => "argument list",
            Self::RecordLiteral => "record literal",
            Self::ArrayLiteral => "array literal",
            Self::Pattern => "pattern",
        }
    }
}
