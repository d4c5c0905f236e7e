// src/ir/expr.rs
use std::fmt;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

/// Semantic types as resolved by the type checker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Bits {
        width: u32,
        #[serde(default)]
        signed: bool,
    },
    Bool,
    Varbit {
        max_width: u32,
    },
    Header {
        name: String,
        fields: Vec<Field>,
    },
    HeaderUnion {
        name: String,
        fields: Vec<Field>,
    },
    HeaderStack {
        elem: Box<Type>,
        size: u32,
    },
    Struct {
        name: String,
        fields: Vec<Field>,
    },
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Type {
    /// Width of a value that fits in a single runtime field.
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            Type::Bits { width, .. } => Some(*width),
            Type::Bool => Some(1),
            _ => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Type::Bits { signed: true, .. })
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Type::Header { .. })
    }

    pub fn fields(&self) -> &[Field] {
        match self {
            Type::Header { fields, .. }
            | Type::HeaderUnion { fields, .. }
            | Type::Struct { fields, .. } => fields,
            _ => &[],
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bits {
                width,
                signed: false,
            } => write!(f, "bit<{width}>"),
            Type::Bits {
                width,
                signed: true,
            } => write!(f, "int<{width}>"),
            Type::Bool => f.write_str("bool"),
            Type::Varbit { max_width } => write!(f, "varbit<{max_width}>"),
            Type::Header { name, .. } | Type::HeaderUnion { name, .. } | Type::Struct { name, .. } => {
                f.write_str(name)
            }
            Type::HeaderStack { elem, size } => write!(f, "{elem}[{size}]"),
            Type::Error => f.write_str("error"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnOp {
    Not,
    Complement,
    Neg,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Operator name understood by the runtime.
    pub fn symbol(self) -> &'static str {
        use BinOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Shl => "<<",
            Shr => ">>",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            And => "and",
            Or => "or",
        }
    }

    /// Results can carry out of the operand width and need truncation.
    pub fn may_overflow(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Shl)
    }

    pub fn is_comparison(self) -> bool {
        use BinOp::*;
        matches!(self, Eq | Ne | Lt | Le | Gt | Ge)
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ExprKind {
    Constant {
        #[serde_as(as = "DisplayFromStr")]
        value: BigInt,
    },
    Bool {
        value: bool,
    },
    Path {
        name: String,
    },
    Member {
        base: Box<Expr>,
        field: String,
    },
    Index {
        base: Box<Expr>,
        index: u32,
    },
    StackNext {
        base: Box<Expr>,
    },
    StackLast {
        base: Box<Expr>,
    },
    Slice {
        base: Box<Expr>,
        hi: u32,
        lo: u32,
    },
    Unary {
        #[serde(rename = "unop")]
        op: UnOp,
        expr: Box<Expr>,
    },
    Binary {
        #[serde(rename = "binop")]
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Cast {
        expr: Box<Expr>,
    },
    IsValid {
        base: Box<Expr>,
    },
    ErrorConst {
        name: String,
        code: u32,
    },
    /// `packet.lookahead<T>()`; the peeked width is the expression type.
    Lookahead,
    StructLiteral {
        fields: Vec<(String, Expr)>,
    },
}

/// A typed expression node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ExprKind::*;
        match &self.kind {
            Constant { value } => write!(f, "{value}"),
            Bool { value } => write!(f, "{value}"),
            Path { name } => f.write_str(name),
            Member { base, field } => write!(f, "{base}.{field}"),
            Index { base, index } => write!(f, "{base}[{index}]"),
            StackNext { base } => write!(f, "{base}.next"),
            StackLast { base } => write!(f, "{base}.last"),
            Slice { base, hi, lo } => write!(f, "{base}[{hi}:{lo}]"),
            Unary { op, expr } => {
                let sym = match op {
                    UnOp::Not => "!",
                    UnOp::Complement => "~",
                    UnOp::Neg => "-",
                };
                write!(f, "{sym}({expr})")
            }
            Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Cast { expr } => write!(f, "({}){expr}", self.ty),
            IsValid { base } => write!(f, "{base}.isValid()"),
            ErrorConst { name, .. } => write!(f, "error.{name}"),
            Lookahead => write!(f, "lookahead<{}>()", self.ty),
            StructLiteral { fields } => {
                f.write_str("{")?;
                for (i, (name, e)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name} = {e}")?;
                }
                f.write_str("}")
            }
        }
    }
}
