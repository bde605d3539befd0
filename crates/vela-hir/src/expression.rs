//! HIR expression nodes.

use crate::definitions::DataId;
use crate::types::{DataType, Resolved};
use vela_parser::ast::{BinOpKind, JoinDirection, UnaryOpKind};

/// A typed expression.
///
/// Every expression carries its resolved type (`None` only when analysis
/// of the node produced a diagnostic) and a display name, used when the
/// expression becomes a column of a synthesized record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Option<DataType>,
    pub name: String,
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, ty: Option<DataType>, name: impl Into<String>) -> Self {
        Self {
            kind,
            ty,
            name: name.into(),
        }
    }

    /// Expressions are temporary when they do not outlive their immediate
    /// use; temporaries cannot be assigned to.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        !matches!(
            self.kind,
            ExprKind::Member { .. }
                | ExprKind::Subscript { .. }
                | ExprKind::Id { .. }
                | ExprKind::ImpliedMember { .. }
                | ExprKind::OverloadedId { .. }
        )
    }

    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        matches!(self.kind, ExprKind::OverloadedId { .. })
    }
}

/// An optionally renamed column expression (select/by/on clauses).
///
/// The field name an alias contributes to a synthesized record is the
/// analyzer's business (unaliased aggregates are named after callee and
/// argument); HIR only carries the pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub value: Expr,
    /// The explicit `name =` prefix, or empty.
    pub name: String,
}

/// A subscript: a single index or a `lower:upper:step` slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Slice {
    Index(Expr),
    Range {
        lower: Option<Expr>,
        upper: Option<Expr>,
        step: Option<Expr>,
    },
}

/// Expression flavors.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Char(char),

    /// A literal with a user-defined suffix, resolved to `suffix<name>`.
    SuffixedLiteral {
        literal: Box<Expr>,
        suffix: String,
        res: Option<Resolved>,
    },

    /// A name with exactly one resolution (or none, after a diagnostic).
    Id {
        name: String,
        res: Option<Resolved>,
    },

    /// A name that resolved to an overload set; a call site picks one.
    OverloadedId {
        name: String,
        candidates: Vec<Resolved>,
    },

    /// A bare column name resolved against a query operand's record scope.
    ImpliedMember {
        name: String,
        res: Option<Resolved>,
        table: Box<Expr>,
    },

    Member {
        value: Box<Expr>,
        member: String,
        res: Option<Resolved>,
    },

    Subscript {
        value: Box<Expr>,
        slice: Box<Slice>,
    },

    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },

    Unary {
        op: UnaryOpKind,
        operand: Box<Expr>,
        res: Option<Resolved>,
    },

    Binary {
        left: Box<Expr>,
        op: BinOpKind,
        right: Box<Expr>,
        res: Option<Resolved>,
    },

    List(Vec<Expr>),

    Paren(Box<Expr>),

    /// `from table [select cols] [by keys] [where filter]`.
    /// `by_ty` is the Dataframe synthesized for the grouping keys.
    Query {
        table: Box<Expr>,
        cols: Vec<Alias>,
        by: Vec<Alias>,
        filter: Option<Box<Expr>>,
        by_ty: Option<DataType>,
    },

    /// `sort table by keys`; `by_ty` captures the key shape.
    Sort {
        table: Box<Expr>,
        by: Vec<Alias>,
        by_ty: Option<DataType>,
    },

    /// `join left, right on keys [asof key ...]`. The `on` and `asof`
    /// clauses are resolved once per side; `remaining_ty` is the right
    /// table minus the join keys.
    Join {
        left: Box<Expr>,
        right: Box<Expr>,
        left_on: Vec<Alias>,
        right_on: Vec<Alias>,
        left_on_ty: Option<DataType>,
        right_on_ty: Option<DataType>,
        left_asof: Option<Box<Alias>>,
        right_asof: Option<Box<Alias>>,
        strict: bool,
        direction: JoinDirection,
        within: Option<Box<Expr>>,
        remaining_ty: Option<DataType>,
    },

    /// A compile-time template instantiation (`load$("file.csv")`); the
    /// record types synthesized per argument are recorded in `resolutions`.
    TemplateInst {
        func: Box<Expr>,
        args: Vec<Expr>,
        resolutions: Vec<DataId>,
    },
}
