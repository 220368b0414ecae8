//! Human-readable rendering of type descriptors.

use crate::db::TypeDatabase;
use crate::types::{ArraySize, RecordShape, TypeData, TypeId};
use rtc_common::Atom;
use std::fmt::Write;
use std::sync::Arc;

/// Nesting beyond this is printed as `...`; anonymous records can refer to
/// themselves.
const MAX_FORMAT_DEPTH: u32 = 8;

pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        TypeFormatter { db }
    }

    pub fn atom(&self, atom: Atom) -> Arc<str> {
        self.db.resolve_atom(atom)
    }

    pub fn format(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id, 0);
        out
    }

    fn write_type(&self, out: &mut String, id: TypeId, depth: u32) {
        if depth > MAX_FORMAT_DEPTH {
            out.push_str("...");
            return;
        }
        let Some(data) = self.db.lookup(id) else {
            let _ = write!(out, "<unknown #{}>", id.0);
            return;
        };
        match data {
            TypeData::Intrinsic(kind) => out.push_str(kind.name()),
            TypeData::Map(constraint) => self.write_constrained(out, "map", constraint, depth),
            TypeData::Future(constraint) => {
                self.write_constrained(out, "future", constraint, depth)
            }
            TypeData::Table(constraint) => match constraint {
                Some(constraint) => self.write_constrained(out, "table", constraint, depth),
                None => out.push_str("table"),
            },
            TypeData::Array(array) => {
                let element_is_union =
                    matches!(self.db.lookup(array.element), Some(TypeData::Union(_)));
                if element_is_union {
                    out.push('(');
                }
                self.write_type(out, array.element, depth + 1);
                if element_is_union {
                    out.push(')');
                }
                match array.size {
                    ArraySize::Open => out.push_str("[]"),
                    ArraySize::Fixed(size) => {
                        let _ = write!(out, "[{size}]");
                    }
                }
            }
            TypeData::Tuple(members) => {
                out.push('[');
                self.write_list(out, &self.db.type_list(members), ", ", depth);
                out.push(']');
            }
            TypeData::Union(members) => {
                self.write_list(out, &self.db.type_list(members), "|", depth);
            }
            TypeData::Finite(values) => {
                let values = self.db.literal_set(values);
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        out.push('|');
                    }
                    let _ = write!(out, "{value}");
                }
            }
            TypeData::Function(shape) => {
                let shape = self.db.function_shape(shape);
                out.push_str("function (");
                self.write_list(out, &shape.params, ", ", depth);
                out.push(')');
                if !shape.returns.is_empty() {
                    out.push_str(" returns (");
                    self.write_list(out, &shape.returns, ", ", depth);
                    out.push(')');
                }
            }
            TypeData::Record(shape) => {
                let shape = self.db.record_shape(shape);
                if shape.name.is_none() {
                    self.write_anonymous_record(out, &shape, depth);
                } else {
                    out.push_str(&self.db.resolve_atom(shape.name));
                }
            }
            TypeData::Object(shape) => {
                let shape = self.db.object_shape(shape);
                if shape.name.is_none() {
                    out.push_str("object");
                } else {
                    out.push_str(&self.db.resolve_atom(shape.name));
                }
            }
        }
    }

    fn write_constrained(&self, out: &mut String, name: &str, constraint: TypeId, depth: u32) {
        out.push_str(name);
        out.push('<');
        self.write_type(out, constraint, depth + 1);
        out.push('>');
    }

    fn write_list(&self, out: &mut String, ids: &[TypeId], separator: &str, depth: u32) {
        for (index, &id) in ids.iter().enumerate() {
            if index > 0 {
                out.push_str(separator);
            }
            self.write_type(out, id, depth + 1);
        }
    }

    /// `record {| int a; string b?; |}` when sealed, `record { int a; string...; }`
    /// when open.
    fn write_anonymous_record(&self, out: &mut String, shape: &RecordShape, depth: u32) {
        out.push_str(if shape.sealed { "record {|" } else { "record {" });
        for field in &shape.fields {
            out.push(' ');
            self.write_type(out, field.type_id, depth + 1);
            let _ = write!(
                out,
                " {}{};",
                self.db.resolve_atom(field.name),
                if field.is_optional() { "?" } else { "" }
            );
        }
        if !shape.sealed && shape.rest_type() != TypeId::ANY {
            out.push(' ');
            self.write_type(out, shape.rest_type(), depth + 1);
            out.push_str("...;");
        }
        out.push_str(if shape.sealed { " |}" } else { " }" });
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
