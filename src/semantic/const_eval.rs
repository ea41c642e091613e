//! Compile-time expression evaluation.
//!
//! Works directly on expression nodes, with name resolution and node types
//! supplied by the elaborator through [`ConstEnv`]. Arithmetic runs on
//! `BigInt` and every produced integer is checked against the signed width
//! of its type; an expression without a value (division by zero, overflow,
//! runtime-only constructs) evaluates to `None` and the caller decides
//! whether that is an error.

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::symbol::ConstValue;
use super::ty::{Type, TypeKind};
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxKind, literal_content, unescape_lenient};

/// Resolution callbacks supplied by the elaborator.
pub trait ConstEnv {
    /// Value of a name that resolves to a constant symbol.
    fn constant(&self, name: &str) -> Option<ConstValue>;
    /// Type already recorded for an expression node.
    fn expr_type(&self, expr: &ast::Expr) -> Option<Type>;
    /// Size in bytes of an already-evaluated type node.
    fn sizeof_type(&self, ty: &ast::TypeNode) -> Option<u64>;
}

/// Parse an integer literal: decimal, `0x`, or `0b`, `_` separators allowed.
pub fn parse_int_literal(text: &str) -> Option<BigInt> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        BigInt::parse_bytes(hex.as_bytes(), 16)
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        BigInt::parse_bytes(bin.as_bytes(), 2)
    } else {
        BigInt::parse_bytes(digits.as_bytes(), 10)
    }
}

/// Signed bit width of an integer-valued type (enums count as their
/// underlying 32-bit integer).
fn value_bits(ty: &Type) -> Option<u8> {
    match &**ty {
        TypeKind::Int { bits } => Some(bits.unwrap_or(64)),
        TypeKind::Enum { .. } => Some(32),
        _ => None,
    }
}

/// Produce an integer value iff it fits the signed width of `ty`.
pub fn checked_mk_int(value: BigInt, ty: Type) -> Option<ConstValue> {
    let bits = value_bits(&ty)?;
    let bound = BigInt::one() << ((bits - 1) as usize);
    if value >= -bound.clone() && value < bound {
        Some(ConstValue::Int(value, ty))
    } else {
        None
    }
}

/// Two's-complement truncation into the signed width of `bits`.
fn truncate(value: &BigInt, bits: u8) -> BigInt {
    let modulus = BigInt::one() << (bits as usize);
    let mut v = value % &modulus;
    if v.is_negative() {
        v += &modulus;
    }
    if v >= (BigInt::one() << ((bits - 1) as usize)) {
        v -= &modulus;
    }
    v
}

pub struct ConstEvaluator<'e, E: ConstEnv> {
    env: &'e E,
}

impl<'e, E: ConstEnv> ConstEvaluator<'e, E> {
    pub fn new(env: &'e E) -> Self {
        Self { env }
    }

    pub fn eval(&self, expr: &ast::Expr) -> Option<ConstValue> {
        match expr {
            ast::Expr::Group(group) => self.eval(&group.inner()?),
            ast::Expr::Literal(lit) => self.eval_literal(expr, lit),
            ast::Expr::Name(name) => self.env.constant(&name.name()),
            ast::Expr::Sizeof(sizeof) => {
                let size = self.env.sizeof_type(&sizeof.ty()?)?;
                Some(ConstValue::Int(
                    BigInt::from(size),
                    Rc::new(TypeKind::Int { bits: Some(64) }),
                ))
            }
            ast::Expr::Cast(cast) => self.eval_cast(expr, cast),
            ast::Expr::Unary(unary) => self.eval_unary(unary),
            ast::Expr::Binary(binary) => self.eval_binary(expr, binary),
            ast::Expr::Ternary(ternary) => {
                let cond = self.eval(&ternary.cond()?)?;
                match cond {
                    ConstValue::Bool(true) => self.eval(&ternary.then_expr()?),
                    ConstValue::Bool(false) => self.eval(&ternary.else_expr()?),
                    _ => None,
                }
            }
            // Runtime-only constructs.
            ast::Expr::Call(_)
            | ast::Expr::Index(_)
            | ast::Expr::Field(_)
            | ast::Expr::Record(_)
            | ast::Expr::Array(_)
            | ast::Expr::Is(_) => None,
        }
    }

    fn eval_literal(&self, expr: &ast::Expr, lit: &ast::LiteralExpr) -> Option<ConstValue> {
        let token = lit.token()?;
        match token.kind() {
            SyntaxKind::TRUE_KW => Some(ConstValue::Bool(true)),
            SyntaxKind::FALSE_KW => Some(ConstValue::Bool(false)),
            SyntaxKind::NULL_KW => {
                let ty = self
                    .env
                    .expr_type(expr)
                    .filter(|t| matches!(&**t, TypeKind::Ptr { .. }))
                    .unwrap_or_else(|| {
                        Rc::new(TypeKind::Ptr {
                            pointee: Rc::new(TypeKind::Void),
                            is_mut: false,
                        })
                    });
                Some(ConstValue::Null(ty))
            }
            SyntaxKind::INT_NUMBER => {
                let value = parse_int_literal(token.text())?;
                let ty = self
                    .env
                    .expr_type(expr)
                    .filter(|t| value_bits(t).is_some())
                    .unwrap_or_else(|| Rc::new(TypeKind::Int { bits: Some(64) }));
                checked_mk_int(value, ty)
            }
            SyntaxKind::CHAR => {
                let bytes = unescape_lenient(literal_content(token.text()));
                let byte = *bytes.first()?;
                checked_mk_int(
                    BigInt::from(byte as i8),
                    Rc::new(TypeKind::Int { bits: Some(8) }),
                )
            }
            SyntaxKind::STRING => {
                let bytes = unescape_lenient(literal_content(token.text()));
                Some(ConstValue::Str(bytes))
            }
            _ => None,
        }
    }

    fn eval_cast(&self, expr: &ast::Expr, cast: &ast::CastExpr) -> Option<ConstValue> {
        let value = self.eval(&cast.operand()?)?;
        let target = self.env.expr_type(expr)?;
        let bits = value_bits(&target)?;
        let int = match value {
            ConstValue::Int(v, _) => v,
            ConstValue::Bool(b) => BigInt::from(b as u8),
            _ => return None,
        };
        Some(ConstValue::Int(truncate(&int, bits), target))
    }

    fn eval_unary(&self, unary: &ast::UnaryExpr) -> Option<ConstValue> {
        let operand = self.eval(&unary.operand()?)?;
        match unary.op()? {
            SyntaxKind::BANG => match operand {
                ConstValue::Bool(b) => Some(ConstValue::Bool(!b)),
                _ => None,
            },
            SyntaxKind::MINUS => match operand {
                ConstValue::Int(v, ty) => checked_mk_int(-v, ty),
                _ => None,
            },
            SyntaxKind::TILDE => match operand {
                ConstValue::Int(v, ty) => checked_mk_int(-v - BigInt::one(), ty),
                _ => None,
            },
            _ => None,
        }
    }

    fn eval_binary(&self, expr: &ast::Expr, binary: &ast::BinaryExpr) -> Option<ConstValue> {
        use SyntaxKind::*;
        let op = binary.op()?;

        // Short-circuit forms first.
        if matches!(op, AMP_AMP | PIPE_PIPE) {
            let lhs = self.eval(&binary.lhs()?)?;
            return match (op, lhs) {
                (AMP_AMP, ConstValue::Bool(false)) => Some(ConstValue::Bool(false)),
                (PIPE_PIPE, ConstValue::Bool(true)) => Some(ConstValue::Bool(true)),
                (_, ConstValue::Bool(_)) => match self.eval(&binary.rhs()?)? {
                    ConstValue::Bool(b) => Some(ConstValue::Bool(b)),
                    _ => None,
                },
                _ => None,
            };
        }

        let lhs = self.eval(&binary.lhs()?)?;
        let rhs = self.eval(&binary.rhs()?)?;

        if matches!(op, EQ_EQ | BANG_EQ | LT | LT_EQ | GT | GT_EQ) {
            return eval_comparison(op, &lhs, &rhs);
        }

        let (ConstValue::Int(a, _), ConstValue::Int(b, _)) = (&lhs, &rhs) else {
            return None;
        };
        // Overflow is checked at the width the type checker picked for the
        // whole expression.
        let ty = self.env.expr_type(expr)?;
        let value = match op {
            PLUS => a + b,
            MINUS => a - b,
            STAR => a * b,
            SLASH => {
                if b.is_zero() {
                    return None;
                }
                a / b
            }
            PERCENT => {
                if b.is_zero() {
                    return None;
                }
                a % b
            }
            AMP => a & b,
            PIPE => a | b,
            CARET => a ^ b,
            SHL => {
                let shift = b.to_u64().filter(|s| *s < 64)? as usize;
                a << shift
            }
            SHR => {
                let shift = b.to_u64().filter(|s| *s < 64)? as usize;
                a >> shift
            }
            _ => return None,
        };
        checked_mk_int(value, ty)
    }
}

fn eval_comparison(op: SyntaxKind, lhs: &ConstValue, rhs: &ConstValue) -> Option<ConstValue> {
    use std::cmp::Ordering;
    let ordering = match (lhs, rhs) {
        (ConstValue::Int(a, _), ConstValue::Int(b, _)) => a.cmp(b),
        (ConstValue::Bool(a), ConstValue::Bool(b)) => a.cmp(b),
        _ => return None,
    };
    let result = match op {
        SyntaxKind::EQ_EQ => ordering == Ordering::Equal,
        SyntaxKind::BANG_EQ => ordering != Ordering::Equal,
        SyntaxKind::LT => ordering == Ordering::Less,
        SyntaxKind::LT_EQ => ordering != Ordering::Greater,
        SyntaxKind::GT => ordering == Ordering::Greater,
        SyntaxKind::GT_EQ => ordering != Ordering::Less,
        _ => return None,
    };
    Some(ConstValue::Bool(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_literal() {
        assert_eq!(parse_int_literal("42"), Some(BigInt::from(42)));
        assert_eq!(parse_int_literal("0xFF"), Some(BigInt::from(255)));
        assert_eq!(parse_int_literal("0b101"), Some(BigInt::from(5)));
        assert_eq!(parse_int_literal("1_000"), Some(BigInt::from(1000)));
    }

    #[test]
    fn test_checked_mk_int_bounds() {
        let i8ty: Type = Rc::new(TypeKind::Int { bits: Some(8) });
        assert!(checked_mk_int(BigInt::from(127), i8ty.clone()).is_some());
        assert!(checked_mk_int(BigInt::from(128), i8ty.clone()).is_none());
        assert!(checked_mk_int(BigInt::from(-128), i8ty.clone()).is_some());
        assert!(checked_mk_int(BigInt::from(-129), i8ty).is_none());
    }

    #[test]
    fn test_truncate_two_complement() {
        assert_eq!(truncate(&BigInt::from(255), 8), BigInt::from(-1));
        assert_eq!(truncate(&BigInt::from(130), 8), BigInt::from(-126));
        assert_eq!(truncate(&BigInt::from(5), 8), BigInt::from(5));
    }
}
