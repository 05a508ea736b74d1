//! Property-based tests for descriptors and escaping
//!
//! These tests use proptest to generate random inputs and verify that:
//! 1. Arithmetic trees keep their operator structure through the wire format
//! 2. Escaped free text decodes back to the original string
//! 3. Site ids in a session are exactly 1, 2, 3, ...

use memlog::ir::{Location, Statement, Tree, TreeBinOp};
use memlog::json::{escape_json, to_line};
use memlog::{build_expr, parse_line, BinOp, Expr, Sink, TraceOptions, TraceSession};
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Generate arithmetic trees over variables and literals
fn arith_tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        "[a-z_][a-z0-9_]{0,8}".prop_map(|name| Tree::var(&name)),
        any::<i64>().prop_map(|v| Tree::int(v as i128)),
    ];
    leaf.prop_recursive(6, 64, 2, |inner| {
        (
            prop_oneof![
                Just(TreeBinOp::Plus),
                Just(TreeBinOp::Minus),
                Just(TreeBinOp::Mult)
            ],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, lhs, rhs)| Tree::binary(op, lhs, rhs))
    })
}

/// Generate text rich in characters that need escaping
fn awkward_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            (0u8..0x20).prop_map(char::from),
            Just('\\'),
            Just('"'),
            Just('/'),
            Just('\u{7f}'),
            any::<char>(),
        ],
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Whether `expr` mirrors the operator structure of `tree`
fn same_shape(tree: &Tree, expr: &Expr) -> bool {
    match (tree, expr) {
        (Tree::Var(decl), Expr::Variable { name }) => decl.name.as_deref() == Some(name.as_str()),
        (Tree::IntegerCst { value, .. }, Expr::IntegerConstant { value: v }) => {
            v.exact().map(i128::from) == Some(*value)
        }
        (Tree::Binary { op, lhs, rhs, .. }, Expr::BinaryOp { op: b, left, right }) => {
            let same_op = BinOp::from_tree_op(*op) == Some(*b);
            same_op && same_shape(lhs, left) && same_shape(rhs, right)
        }
        _ => false,
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn arithmetic_shape_survives_wire_format(tree in arith_tree()) {
        let expr = build_expr(&tree);
        let line = to_line(&expr).unwrap();
        prop_assert!(!line.contains('\n'));

        let decoded: Expr = serde_json::from_str(&line).unwrap();
        prop_assert_eq!(&decoded, &expr);
        prop_assert!(same_shape(&tree, &decoded));
    }

    #[test]
    fn escaping_round_trips(text in awkward_text()) {
        let escaped = escape_json(&text);
        prop_assert!(!escaped.contains('\n'));
        prop_assert!(!escaped.contains('\r'));

        let decoded: String = serde_json::from_str(&format!("\"{}\"", escaped)).unwrap();
        prop_assert_eq!(decoded, text);
    }

    #[test]
    fn escaped_names_survive_whole_events(
        file in awkward_text(),
        func in awkward_text(),
        var in awkward_text()
    ) {
        let mut session = TraceSession::with_sink(&TraceOptions::default(), Sink::memory());
        session.enter_function(Some(&func));
        let path = format!("src/{}", file);
        let stmt = Statement::assign(Location::new(&path, 1, 1), Tree::var(&var), Tree::int(0));
        prop_assert_eq!(session.process_statement(&stmt), Some(1));

        let text = String::from_utf8(session.captured().unwrap().to_vec()).unwrap();
        prop_assert_eq!(text.matches('\n').count(), 1);
        let event = parse_line(text.trim_end_matches('\n')).unwrap();
        prop_assert_eq!(event.location.file, path);
        prop_assert_eq!(event.function, func);
    }

    #[test]
    fn sites_count_from_one_without_gaps(mask in prop::collection::vec(any::<bool>(), 0..60)) {
        let mut session = TraceSession::with_sink(&TraceOptions::default(), Sink::memory());
        session.enter_function(Some("main"));

        let mut sites = Vec::new();
        for (i, interesting) in mask.iter().enumerate() {
            let loc = Location::new("main.c", i as u32 + 1, 1);
            let stmt = if *interesting {
                Statement::assign(loc, Tree::var("x"), Tree::int(i as i128))
            } else {
                Statement::other(loc, "label")
            };
            if let Some(site) = session.process_statement(&stmt) {
                sites.push(site);
            }
        }

        let expected: Vec<u64> = (1..=sites.len() as u64).collect();
        prop_assert_eq!(sites.len(), mask.iter().filter(|b| **b).count());
        prop_assert_eq!(sites, expected);
    }
}
