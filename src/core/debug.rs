//! Deterministic text dumps of data source trees.

use std::fmt::Write;

use super::DataSource;

/// Render a data source tree as indented text.
///
/// Container keys are sorted so two structurally equal trees print the
/// same regardless of how they were composed. Leaves print their value at
/// time zero together with its type.
pub fn debug_print(ds: &DataSource) -> String {
    let mut out = String::new();
    write_node(&mut out, ds, 0);
    out
}

fn write_node(out: &mut String, ds: &DataSource, depth: usize) {
    match ds {
        DataSource::Container(c) => {
            let mut names = c.names();
            names.sort();
            if names.is_empty() {
                out.push_str("{}\n");
                return;
            }
            out.push_str("{\n");
            for name in names {
                let Some(child) = c.get(&name) else { continue };
                indent(out, depth + 1);
                let _ = write!(out, "{:?}: ", name.as_str());
                write_node(out, &child, depth + 1);
            }
            indent(out, depth);
            out.push_str("}\n");
        }
        DataSource::Sampled(s) => {
            let value = s.value(0.0);
            let _ = writeln!(out, "({}) {}", value.type_name(), value);
        }
        DataSource::Vector(v) => {
            out.push_str("[\n");
            for i in 0..v.len() {
                indent(out, depth + 1);
                match v.element(i) {
                    Some(child) => write_node(out, &child, depth + 1),
                    None => out.push_str("null\n"),
                }
            }
            indent(out, depth);
            out.push_str("]\n");
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
