//! Typed views of type references.

use smol_str::SmolStr;

use super::items::token_text;
use super::{AstNode, Expr, ast_enum, ast_node, first_child_method, has_token_method, token_method};

ast_node!(GroupType, GROUP_TYPE);
ast_node!(NameType, NAME_TYPE);
ast_node!(PointerType, POINTER_TYPE);
ast_node!(ArrayType, ARRAY_TYPE);
ast_node!(TypeofType, TYPEOF_TYPE);
ast_node!(NeverType, NEVER_TYPE);
ast_node!(RestType, REST_TYPE);

ast_enum!(
    /// Any type reference.
    TypeNode {
        Group(GroupType),
        Name(NameType),
        Pointer(PointerType),
        Array(ArrayType),
        Typeof(TypeofType),
        Never(NeverType),
        Rest(RestType),
    }
);

impl GroupType {
    first_child_method!(inner, TypeNode);
}

impl NameType {
    token_method!(name_token, IDENT);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl PointerType {
    has_token_method!(is_mut, MUT_KW);
    first_child_method!(pointee, TypeNode);
}

impl ArrayType {
    first_child_method!(elem, TypeNode);
    first_child_method!(size, Expr);
}

impl TypeofType {
    first_child_method!(expr, Expr);
}
