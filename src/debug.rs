//! Debug utilities
//!
//! C-like rendering of descriptors and one-line event summaries for logs.

use crate::descriptor::{Expr, IntValue, OVERFLOW_MARKER};
use crate::destination::Destination;
use crate::event::{Event, EventPayload};

/// Format an expression descriptor
pub fn format_expr(expr: &Expr) -> String {
    match expr {
        Expr::Variable { name } => name.clone(),
        Expr::IntegerConstant { value } => match value {
            IntValue::Exact(v) => v.to_string(),
            IntValue::Overflow => OVERFLOW_MARKER.to_string(),
        },
        Expr::BinaryOp { op, left, right } => format!(
            "({} {} {})",
            format_expr(left),
            op.symbol(),
            format_expr(right)
        ),
        Expr::Cast { inner, .. } => format!("(cast){}", format_expr(inner)),
        Expr::AddressOf { inner } => format!("&{}", format_expr(inner)),
        Expr::Unknown => "<?>".to_string(),
    }
}

/// Format a destination descriptor
pub fn format_destination(dest: &Destination) -> String {
    match dest {
        Destination::Named { name } => name.clone(),
        Destination::Indexed { base, index, .. } => {
            format!("{}[{}]", format_expr(base), format_expr(index))
        }
        Destination::Field {
            base,
            field,
            via_ptr,
        } => {
            let sep = if *via_ptr { "->" } else { "." };
            format!("{}{}{}", format_expr(base), sep, field)
        }
        Destination::Dereferenced { base } => format!("*{}", format_expr(base)),
        Destination::GenericMemory { base, offset } => {
            format!("*({} + {})", format_expr(base), format_expr(offset))
        }
        Destination::Unknown => "<?>".to_string(),
    }
}

/// Format an event as `[memlog site N] file:line:col func: what`
pub fn format_event(event: &Event) -> String {
    let what = match &event.payload {
        EventPayload::Store(record) => match record.bytes {
            Some(bytes) => format!(
                "store {} ({} bytes)",
                format_destination(&record.destination),
                bytes
            ),
            None => format!("store {}", format_destination(&record.destination)),
        },
        EventPayload::Alloc(record) => {
            let lhs = record
                .destination
                .as_ref()
                .map_or_else(|| "<discarded>".to_string(), format_expr);
            format!(
                "alloc {} = {}({})",
                lhs,
                record.callee,
                format_expr(&record.size)
            )
        }
        EventPayload::Free(record) => format!("free {}", format_expr(&record.pointer)),
    };

    format!(
        "[memlog site {}] {}:{}:{} {}: {}",
        event.site,
        event.location.file,
        event.location.line,
        event.location.column,
        event.function,
        what
    )
}
