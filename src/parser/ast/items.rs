//! Typed views of top-level declarations.

use smol_str::SmolStr;

use super::{
    AstNode, BlockStmt, Expr, TypeNode, ast_enum, ast_node, children_method, first_child_method,
    has_token_method, token_method,
};
use crate::parser::SyntaxToken;

ast_node!(Root, ROOT);
ast_node!(IncludeDecl, INCLUDE_DECL);
ast_node!(ModuleDecl, MODULE_DECL);
ast_node!(ImportDecl, IMPORT_DECL);
ast_node!(EnumDecl, ENUM_DECL);
ast_node!(EnumMember, ENUM_MEMBER);
ast_node!(RecordDecl, RECORD_DECL);
ast_node!(RecordField, RECORD_FIELD);
ast_node!(FuncDecl, FUNC_DECL);
ast_node!(Param, PARAM);
ast_node!(GlobalDecl, GLOBAL_DECL);
ast_node!(ConstDecl, CONST_DECL);

ast_enum!(
    /// Any top-level declaration.
    Item {
        Include(IncludeDecl),
        Module(ModuleDecl),
        Import(ImportDecl),
        Enum(EnumDecl),
        Record(RecordDecl),
        Func(FuncDecl),
        Global(GlobalDecl),
        Const(ConstDecl),
    }
);

/// Text of a name token, if present.
pub(crate) fn token_text(token: Option<&SyntaxToken>) -> SmolStr {
    token.map(|t| SmolStr::new(t.text())).unwrap_or_default()
}

impl Root {
    children_method!(items, Item);
}

impl IncludeDecl {
    token_method!(path_token, STRING);
}

impl ModuleDecl {
    token_method!(name_token, IDENT);
}

impl ImportDecl {
    token_method!(path_token, STRING);
}

impl EnumDecl {
    token_method!(name_token, IDENT);
    children_method!(members, EnumMember);
}

impl EnumMember {
    token_method!(name_token, IDENT);
    first_child_method!(value, Expr);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl RecordDecl {
    token_method!(name_token, IDENT);
    has_token_method!(is_union, UNION_KW);
    first_child_method!(base_type, TypeNode);
    children_method!(fields, RecordField);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl RecordField {
    token_method!(name_token, IDENT);
    first_child_method!(ty, TypeNode);
    first_child_method!(default_value, Expr);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl FuncDecl {
    token_method!(name_token, IDENT);
    has_token_method!(is_extern, EXTERN_KW);
    children_method!(params, Param);
    /// Return type annotation; parameter types are nested inside `Param`
    /// nodes, so the only direct `TypeNode` child is the return type.
    first_child_method!(return_type, TypeNode);
    first_child_method!(body, BlockStmt);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl Param {
    token_method!(name_token, IDENT);
    first_child_method!(ty, TypeNode);
    first_child_method!(default_value, Expr);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }

    /// A rest parameter carries the `...` type.
    pub fn is_rest(&self) -> bool {
        matches!(self.ty(), Some(TypeNode::Rest(_)))
    }
}

impl GlobalDecl {
    token_method!(name_token, IDENT);
    has_token_method!(is_extern, EXTERN_KW);
    first_child_method!(ty, TypeNode);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl ConstDecl {
    token_method!(name_token, IDENT);
    first_child_method!(ty, TypeNode);
    first_child_method!(value, Expr);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl Item {
    /// The token naming this declaration, when it has one.
    pub fn name_token(&self) -> Option<SyntaxToken> {
        match self {
            Item::Include(_) | Item::Import(_) => None,
            Item::Module(d) => d.name_token(),
            Item::Enum(d) => d.name_token(),
            Item::Record(d) => d.name_token(),
            Item::Func(d) => d.name_token(),
            Item::Global(d) => d.name_token(),
            Item::Const(d) => d.name_token(),
        }
    }
}
