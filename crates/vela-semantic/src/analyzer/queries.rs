//! Relational constructs: query, sort, and join.
//!
//! These synthesize fresh record types for their outputs: the relevant
//! columns are rendered as a field-list string, fed back through the
//! parser as an anonymous `data` definition, and wrapped into a Dataframe.
//! While a clause of the operand table is analyzed, the table's record
//! scope is preferred, so bare column names resolve against it.

use crate::analyzer::Analyzer;
use std::collections::HashSet;
use vela_core::Result;
use vela_hir::{
    Alias, DataType, Expr, ExprKind, data_def_id, is_array, is_boolean, is_dataframe, rettype,
    same_type, underlying_type,
};
use vela_parser::ast;
use vela_parser::ast::JoinDirection;

impl Analyzer {
    /// `from table [select cols] [by keys] [where filter]`
    ///
    /// With grouping keys, every selected column must be a scalar
    /// aggregation; without them, an array projection. The result type is
    /// a synthesized Dataframe of keys plus columns, or the table type
    /// itself for a pure filter.
    pub(crate) fn query(
        &mut self,
        table_ast: &ast::Expr,
        cols_ast: &[ast::Alias],
        by_ast: &[ast::Alias],
        filter_ast: Option<&ast::Expr>,
    ) -> Result<Expr> {
        let table = self.expr(table_ast)?;
        if !is_dataframe(table.ty.as_ref()) {
            let found = self.type_name(table.ty.as_ref());
            self.error(format!("query must be on Dataframe, not {found}"));
        }
        let table_ty = table.ty.clone();
        let table_name = table.name.clone();

        let (by, cols, filter, by_ty, ty) = self.with_preferred(table.clone(), move |a| {
            // the grouping keys get their own Dataframe
            let by = a.aliases(by_ast)?;
            let mut by_ty = None;
            if !by.is_empty() {
                let fields = a.alias_type_string(&by);
                let by_name = a.anon_name();
                a.create_datatype(&by_name, &fields)?;
                by_ty = a.make_dataframe(&format!("!{by_name}"));
            }

            // selected columns determine the result shape
            let mut cols = Vec::new();
            for col in cols_ast {
                let col = a.alias(col)?;
                let array = is_array(col.value.ty.as_ref());
                if by.is_empty() && !array {
                    a.error("resulting column must be an array");
                }
                if !by.is_empty() && array {
                    a.error("resulting column must be a scalar");
                }
                cols.push(col);
            }
            let mut ty = table_ty;
            if !cols.is_empty() {
                let by_part = if by.is_empty() {
                    String::new()
                } else {
                    format!("{}, ", a.alias_type_string(&by))
                };
                let fields = format!("{by_part}{}", a.alias_type_string(&cols));
                let type_name = a.anon_name();
                a.create_datatype(&type_name, &fields)?;
                ty = a.make_dataframe(&format!("!{type_name}"));
            } else if !by.is_empty() {
                a.error("must express aggregation if 'by' is listed");
            }

            let filter = match filter_ast {
                Some(f) => Some(a.expr(f)?),
                None => None,
            };
            if let Some(f) = &filter {
                let valid = matches!(
                    f.ty.as_ref(),
                    Some(DataType::Array(inner)) if is_boolean(Some(inner.as_ref()))
                );
                if !valid {
                    let found = a.type_name(f.ty.as_ref());
                    a.error(format!("'where' must be a boolean array; got type {found}"));
                }
            }
            Ok((by, cols, filter, by_ty, ty))
        })?;

        Ok(Expr::new(
            ExprKind::Query {
                table: Box::new(table),
                cols,
                by,
                filter: filter.map(Box::new),
                by_ty,
            },
            ty,
            table_name,
        ))
    }

    /// `sort table by keys` — the result keeps the table's type; the key
    /// shape is captured in its own synthesized Dataframe.
    pub(crate) fn sort(&mut self, table_ast: &ast::Expr, by_ast: &[ast::Alias]) -> Result<Expr> {
        let table = self.expr(table_ast)?;
        if !is_dataframe(table.ty.as_ref()) {
            let found = self.type_name(table.ty.as_ref());
            self.error(format!("sort must be on Dataframe, not {found}"));
        }
        let ty = table.ty.clone();
        let table_name = table.name.clone();

        let by = self.with_preferred(table.clone(), |a| a.aliases(by_ast))?;

        let fields = self.alias_type_string(&by);
        let by_name = self.anon_name();
        self.create_datatype(&by_name, &fields)?;
        let by_ty = self.make_dataframe(&format!("!{by_name}"));

        Ok(Expr::new(
            ExprKind::Sort {
                table: Box::new(table),
                by,
                by_ty,
            },
            ty,
            table_name,
        ))
    }

    /// `join left, right on keys [asof key ...]`
    pub(crate) fn join(
        &mut self,
        left_ast: &ast::Expr,
        right_ast: &ast::Expr,
        on_ast: &[ast::Alias],
        asof_ast: Option<&ast::Alias>,
        strict: bool,
        direction: JoinDirection,
        within_ast: Option<&ast::Expr>,
    ) -> Result<Expr> {
        let starting = self.error_count();
        let left = self.expr(left_ast)?;
        if left.ty.is_some() && !is_dataframe(left.ty.as_ref()) {
            let found = self.type_name(left.ty.as_ref());
            self.error(format!("join for left must be on Dataframe, not {found}"));
        }
        let right = self.expr(right_ast)?;
        if right.ty.is_some() && !is_dataframe(right.ty.as_ref()) {
            let found = self.type_name(right.ty.as_ref());
            self.error(format!("join for right must be on Dataframe, not {found}"));
        }
        let bad_tables = self.error_count() != starting;

        // the `on` columns are resolved once per side; both key shapes
        // must agree structurally
        let mut left_on = Vec::new();
        let mut right_on = Vec::new();
        let mut left_on_ty = None;
        let mut right_on_ty = None;
        if !bad_tables && !on_ast.is_empty() {
            left_on = self.with_preferred(left.clone(), |a| a.aliases(on_ast))?;
            right_on = self.with_preferred(right.clone(), |a| a.aliases(on_ast))?;

            let left_fields = self.alias_type_string(&left_on);
            let left_name = self.anon_name();
            self.create_datatype(&left_name, &left_fields)?;
            left_on_ty = self.make_dataframe(&format!("!{left_name}"));

            let right_fields = self.alias_type_string(&right_on);
            let right_name = self.anon_name();
            self.create_datatype(&right_name, &right_fields)?;
            right_on_ty = self.make_dataframe(&format!("!{right_name}"));

            if !same_type(&self.defs, left_on_ty.as_ref(), right_on_ty.as_ref()) {
                let l = self.udt_value_string(left_on_ty.as_ref());
                let r = self.udt_value_string(right_on_ty.as_ref());
                self.error(format!("join 'on' types are not compatible: {l} vs {r}"));
            }
        }

        let within = match within_ast {
            Some(w) => Some(self.expr(w)?),
            None => None,
        };
        let mut left_asof = None;
        let mut right_asof = None;
        let mut right_asof_name = String::new();
        if !bad_tables {
            if let Some(asof) = asof_ast {
                let la = self.with_preferred(left.clone(), |a| a.alias(asof))?;
                let ra = self.with_preferred(right.clone(), |a| a.alias(asof))?;
                if !same_type(&self.defs, la.value.ty.as_ref(), ra.value.ty.as_ref()) {
                    let l = self.type_name(la.value.ty.as_ref());
                    let r = self.type_name(ra.value.ty.as_ref());
                    self.error(format!("join 'asof' types are not compatible: {l} vs {r}"));
                }
                right_asof_name = column_name(&ra);

                // inexact matching needs a measurable distance between keys
                if within.is_some() || direction == JoinDirection::Nearest {
                    self.check_subtractable(&la, &ra, within.as_ref())?;
                }
                if strict && direction == JoinDirection::Nearest {
                    self.error("join 'asof' cannot be both 'nearest' and 'strict'");
                }
                left_asof = Some(la);
                right_asof = Some(ra);
            }
        }

        // the right table contributes its columns minus the join keys
        let mut remaining_ty = None;
        let mut remaining_fields = String::new();
        if !bad_tables {
            remaining_fields =
                self.drop_columns(right.ty.as_ref(), right_on_ty.as_ref(), &right_asof_name);
            if !remaining_fields.is_empty() {
                let name = self.anon_name();
                self.create_datatype(&name, &remaining_fields)?;
                remaining_ty = self.make_dataframe(&format!("!{name}"));
            }
        }

        let mut full_ty = None;
        if !bad_tables {
            let left_fields = self.datatype_type_string(left.ty.as_ref());
            let full_fields = match (left_fields.is_empty(), remaining_fields.is_empty()) {
                (false, false) => format!("{left_fields}, {remaining_fields}"),
                (false, true) => left_fields,
                (true, false) => remaining_fields,
                (true, true) => String::new(),
            };
            if !full_fields.is_empty() {
                let name = self.anon_name();
                self.create_datatype(&name, &full_fields)?;
                full_ty = self.make_dataframe(&format!("!{name}"));
            }
        }

        let name = format!("{}{}", left.name, right.name);
        Ok(Expr::new(
            ExprKind::Join {
                left: Box::new(left),
                right: Box::new(right),
                left_on,
                right_on,
                left_on_ty,
                right_on_ty,
                left_asof: left_asof.map(Box::new),
                right_asof: right_asof.map(Box::new),
                strict,
                direction,
                within: within.map(Box::new),
                remaining_ty,
            },
            full_ty,
            name,
        ))
    }

    /// The `asof` columns must support subtraction yielding an array; with
    /// `within`, the element type must match the tolerance.
    fn check_subtractable(
        &mut self,
        left: &Alias,
        right: &Alias,
        within: Option<&Expr>,
    ) -> Result<()> {
        let args = [left.value.clone(), right.value.clone()];
        let minus = self.expr(&ast::Expr::Id("-".to_string()))?;
        let candidates = match &minus.kind {
            ExprKind::OverloadedId { candidates, .. } => candidates.clone(),
            ExprKind::Id { res: Some(res), .. } => vec![res.clone()],
            _ => Vec::new(),
        };

        let mut subtractable = false;
        for res in candidates {
            let func_type = self.get_type(Some(&res));
            if self.match_args(&args, func_type.as_ref()).is_none() {
                let ret = rettype(func_type.as_ref());
                if is_array(ret.as_ref()) {
                    subtractable = true;
                    if let Some(within) = within {
                        let elem = underlying_type(ret.as_ref());
                        if !same_type(&self.defs, elem.as_ref(), within.ty.as_ref()) {
                            let expected = self.type_name(elem.as_ref());
                            let got = self.type_name(within.ty.as_ref());
                            self.error(format!(
                                "join 'asof' types not compatible with 'within': \
                                 expected {expected}, got {got}"
                            ));
                        }
                    }
                }
                break;
            }
        }
        if !subtractable {
            let found = self.type_name(left.value.ty.as_ref());
            self.error(format!(
                "join 'asof' types prohibit 'within' or 'nearest': {found}"
            ));
        }
        Ok(())
    }

    pub(crate) fn aliases(&mut self, nodes: &[ast::Alias]) -> Result<Vec<Alias>> {
        nodes.iter().map(|node| self.alias(node)).collect()
    }

    /// Renders aliases as a `name: type` field list, unwrapping array
    /// types so the fields describe one row.
    pub(crate) fn alias_type_string(&self, aliases: &[Alias]) -> String {
        let fields: Vec<String> = aliases
            .iter()
            .map(|alias| {
                let ty = row_type(alias.value.ty.as_ref());
                format!("{}: {}", column_name(alias), self.type_name(ty.as_ref()))
            })
            .collect();
        fields.join(", ")
    }

    /// Renders a record type's fields as a `name: type` list, unwrapping
    /// array types.
    pub(crate) fn datatype_type_string(&self, ty: Option<&DataType>) -> String {
        let Some(id) = data_def_id(ty) else {
            return String::new();
        };
        let fields: Vec<String> = self
            .defs
            .data(id)
            .body
            .iter()
            .map(|field| {
                let field = self.defs.decl(*field);
                let ty = row_type(field.ty.as_ref());
                format!("{}: {}", field.name, self.type_name(ty.as_ref()))
            })
            .collect();
        fields.join(", ")
    }

    /// Renders a record type's fields minus a dropped key set.
    fn drop_columns(
        &self,
        orig: Option<&DataType>,
        drop: Option<&DataType>,
        extra: &str,
    ) -> String {
        let Some(orig_id) = data_def_id(orig) else {
            return String::new();
        };
        let mut dropped: HashSet<&str> = HashSet::new();
        if let Some(drop_id) = data_def_id(drop) {
            for field in &self.defs.data(drop_id).body {
                dropped.insert(self.defs.decl(*field).name.as_str());
            }
        }
        if !extra.is_empty() {
            dropped.insert(extra);
        }

        let fields: Vec<String> = self
            .defs
            .data(orig_id)
            .body
            .iter()
            .filter_map(|field| {
                let field = self.defs.decl(*field);
                if dropped.contains(field.name.as_str()) {
                    return None;
                }
                let ty = row_type(field.ty.as_ref());
                Some(format!("{}: {}", field.name, self.type_name(ty.as_ref())))
            })
            .collect();
        fields.join(", ")
    }

    /// Renders just the field types of a record, for diagnostics.
    fn udt_value_string(&self, ty: Option<&DataType>) -> String {
        let Some(id) = data_def_id(ty) else {
            return String::new();
        };
        let types: Vec<String> = self
            .defs
            .data(id)
            .body
            .iter()
            .map(|field| self.type_name(self.defs.decl(*field).ty.as_ref()))
            .collect();
        format!("({})", types.join(", "))
    }
}

/// The per-row type of a column: arrays describe one element.
fn row_type(ty: Option<&DataType>) -> Option<DataType> {
    if is_array(ty) {
        underlying_type(ty)
    } else {
        ty.cloned()
    }
}

/// The field name an alias contributes to a synthesized record: the
/// explicit name, or `<callee>_<argument>` for an unaliased aggregate
/// (`avg(price)` becomes `avg_price`), or the value's display name.
fn column_name(alias: &Alias) -> String {
    if !alias.name.is_empty() {
        return alias.name.clone();
    }
    if let ExprKind::Call { func, args } = &alias.value.kind {
        if !args.is_empty() && !func.name.is_empty() && !alias.value.name.is_empty() {
            return format!("{}_{}", func.name, alias.value.name);
        }
    }
    alias.value.name.clone()
}
