// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Unit tests for expression nodes

use sql_typegen_ast::{
    BinaryOp, ColumnRef, Expr, InOperand, Literal, Placeholder, PlaceholderKind, Span,
};

#[test]
fn test_expr_column_ref() {
    let col = Expr::column("id");
    assert!(matches!(col, Expr::Column(_)));
}

#[test]
fn test_column_ref_new() {
    let col = ColumnRef::new("team_id");
    assert_eq!(col.column, "team_id");
    assert!(col.table.is_none());
}

#[test]
fn test_column_ref_with_table() {
    let col = ColumnRef::new("id").with_table("players");
    assert_eq!(col.column, "id");
    assert_eq!(col.table, Some("players".to_string()));
}

#[test]
fn test_expr_literal_integer() {
    let lit = Expr::integer(42);
    assert!(matches!(lit, Expr::Literal(Literal::Integer(42))));
}

#[test]
fn test_expr_literal_null() {
    let lit = Expr::null();
    assert!(matches!(lit, Expr::Literal(Literal::Null)));
}

#[test]
fn test_expr_binary_op() {
    let expr = Expr::binary(Expr::column("score"), BinaryOp::GtEq, Expr::integer(10));
    if let Expr::BinaryOp { left, op, right } = expr {
        assert!(matches!(*left, Expr::Column(_)));
        assert_eq!(op, BinaryOp::GtEq);
        assert!(matches!(*right, Expr::Literal(Literal::Integer(10))));
    } else {
        panic!("expected binary op");
    }
}

#[test]
fn test_placeholder_kinds() {
    assert_eq!(Placeholder::anonymous().kind, PlaceholderKind::Anonymous);
    assert_eq!(Placeholder::indexed(3).kind, PlaceholderKind::Indexed(3));
    assert_eq!(
        Placeholder::named("id").kind,
        PlaceholderKind::Named("id".to_string())
    );
}

#[test]
fn test_placeholder_span() {
    let placeholder = Placeholder::anonymous().with_span(Span::new(4, 17));
    assert_eq!(placeholder.span, Span::new(4, 17));
}

#[test]
fn test_in_operand_variants() {
    let list = InOperand::List(vec![Expr::integer(1), Expr::integer(2)]);
    assert!(matches!(list, InOperand::List(ref items) if items.len() == 2));

    let placeholder = InOperand::Placeholder(Placeholder::anonymous());
    assert!(matches!(placeholder, InOperand::Placeholder(_)));
}

#[test]
fn test_expr_serde_round_trip() {
    let expr = Expr::binary(
        Expr::qualified("players", "name"),
        BinaryOp::Like,
        Expr::named_placeholder("pattern"),
    );
    let json = serde_json::to_string(&expr).unwrap();
    let back: Expr = serde_json::from_str(&json).unwrap();
    assert_eq!(expr, back);
}
