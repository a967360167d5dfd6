//! Expression syntax tree.

use gamehost_ir::Value;

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal: integer, string, boolean or null.
    Literal(Value),
    /// A bare name: parameter, variable, resource or loop variable.
    Ident(String),
    /// Property access, `a.b`.
    Member(Box<Expr>, String),
    /// Index access, `a[0]`.
    Index(Box<Expr>, Box<Expr>),
    /// Built-in function call.
    Call(Function, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `cond ? then : else`; only the taken branch is evaluated.
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Array literal, `[a, b]`.
    Array(Vec<Expr>),
}

impl Expr {
    /// Collect the root names this expression refers to, in first-use order.
    pub fn collect_references(&self, out: &mut Vec<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Ident(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::Member(target, _) => target.collect_references(out),
            Expr::Index(target, index) => {
                target.collect_references(out);
                index.collect_references(out);
            }
            Expr::Call(_, args) | Expr::Array(args) => {
                for arg in args {
                    arg.collect_references(out);
                }
            }
            Expr::Unary(_, operand) => operand.collect_references(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_references(out);
                rhs.collect_references(out);
            }
            Expr::Ternary(cond, then, otherwise) => {
                cond.collect_references(out);
                then.collect_references(out);
                otherwise.collect_references(out);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    ToLower,
    ToUpper,
    Concat,
    Union,
    Join,
    Length,
    Take,
    Contains,
    Empty,
    Replace,
    String,
    Int,
    UniqueString,
    ResourceGroup,
    ResourceId,
    ListKeys,
}

impl Function {
    pub const ALL: &'static [Function] = &[
        Function::ToLower,
        Function::ToUpper,
        Function::Concat,
        Function::Union,
        Function::Join,
        Function::Length,
        Function::Take,
        Function::Contains,
        Function::Empty,
        Function::Replace,
        Function::String,
        Function::Int,
        Function::UniqueString,
        Function::ResourceGroup,
        Function::ResourceId,
        Function::ListKeys,
    ];

    /// Name as written in templates.
    pub fn name(&self) -> &'static str {
        match self {
            Function::ToLower => "toLower",
            Function::ToUpper => "toUpper",
            Function::Concat => "concat",
            Function::Union => "union",
            Function::Join => "join",
            Function::Length => "length",
            Function::Take => "take",
            Function::Contains => "contains",
            Function::Empty => "empty",
            Function::Replace => "replace",
            Function::String => "string",
            Function::Int => "int",
            Function::UniqueString => "uniqueString",
            Function::ResourceGroup => "resourceGroup",
            Function::ResourceId => "resourceId",
            Function::ListKeys => "listKeys",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Accepted argument count as `(min, max)`; `None` means unbounded.
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Function::ResourceGroup => (0, Some(0)),
            Function::ToLower
            | Function::ToUpper
            | Function::Length
            | Function::Empty
            | Function::String
            | Function::Int
            | Function::ResourceId
            | Function::ListKeys => (1, Some(1)),
            Function::Join | Function::Take | Function::Contains => (2, Some(2)),
            Function::Replace => (3, Some(3)),
            Function::Concat | Function::Union | Function::UniqueString => (1, None),
        }
    }
}
