//! Tests for the enclosing-declaration search over hand-built trees

#[cfg(test)]
mod search_tests {
    use crate::position::{PositionRange, SourcePosition};
    use crate::search::{search, SearchResult, ANONYMOUS, DEFAULT_MAX_DEPTH, NOT_FOUND};
    use crate::tree::{NodeKind, SyntaxNode};

    fn node(kind: NodeKind, start: (u32, u32), end: (u32, u32)) -> SyntaxNode {
        SyntaxNode::new(kind, PositionRange::from_coords(start.0, start.1, end.0, end.1))
    }

    fn module(end_line: u32, children: Vec<SyntaxNode>) -> SyntaxNode {
        node(NodeKind::Module, (1, 0), (end_line, 0)).with_children(children)
    }

    fn name_at(root: &SyntaxNode, line: u32, column: u32) -> String {
        search(root, SourcePosition::new(line, column), DEFAULT_MAX_DEPTH).into_display_name()
    }

    #[test]
    fn test_function_declaration_body() {
        // function foo() {
        //     <pos>
        // }
        let root = module(
            4,
            vec![node(NodeKind::FunctionDeclaration, (1, 0), (3, 1))
                .with_name("foo")
                .with_children(vec![node(NodeKind::Other, (1, 15), (3, 1))])],
        );

        assert_eq!(name_at(&root, 2, 4), "foo");
    }

    #[test]
    fn test_arrow_named_by_variable() {
        // const bar = () => { <pos> };
        let arrow = node(NodeKind::ArrowFunction, (1, 12), (1, 30)).as_initializer();
        let root = module(
            2,
            vec![node(NodeKind::Other, (1, 0), (1, 31)).with_children(vec![node(
                NodeKind::VariableDeclaration,
                (1, 6),
                (1, 30),
            )
            .with_name("bar")
            .with_children(vec![arrow])])],
        );

        assert_eq!(name_at(&root, 1, 20), "bar");
    }

    #[test]
    fn test_inner_variable_beats_composition() {
        // function outer() {
        //     const inner = () => { <pos> };
        // }
        let inner = node(NodeKind::VariableDeclaration, (2, 10), (2, 33))
            .with_name("inner")
            .with_children(vec![node(NodeKind::ArrowFunction, (2, 18), (2, 33)).as_initializer()]);
        let root = module(
            4,
            vec![node(NodeKind::FunctionDeclaration, (1, 0), (3, 1))
                .with_name("outer")
                .with_children(vec![node(NodeKind::Other, (1, 17), (3, 1))
                    .with_children(vec![node(NodeKind::Other, (2, 4), (2, 34)).with_children(vec![inner])])])],
        );

        assert_eq!(name_at(&root, 2, 25), "inner");
    }

    #[test]
    fn test_iife_composes_with_enclosing_function() {
        // function outer() {
        //     (() => { <pos> })();
        // }
        let call = node(NodeKind::Other, (2, 4), (2, 23))
            .with_children(vec![node(NodeKind::ArrowFunction, (2, 5), (2, 20))]);
        let root = module(
            4,
            vec![node(NodeKind::FunctionDeclaration, (1, 0), (3, 1))
                .with_name("outer")
                .with_children(vec![node(NodeKind::Other, (1, 17), (3, 1)).with_children(vec![call])])],
        );

        assert_eq!(name_at(&root, 2, 12), "anonymous in outer");
    }

    #[test]
    fn test_top_level_statement_falls_back() {
        // console.log("hi");
        let root = module(2, vec![node(NodeKind::Other, (1, 0), (1, 18))]);

        assert_eq!(name_at(&root, 1, 5), NOT_FOUND);
    }

    #[test]
    fn test_position_outside_root() {
        let root = module(2, vec![]);
        let result = search(&root, SourcePosition::new(9, 0), DEFAULT_MAX_DEPTH);

        assert_eq!(result, SearchResult::NotContaining);
        assert_eq!(result.into_display_name(), NOT_FOUND);
    }

    #[test]
    fn test_search_is_idempotent() {
        let root = module(
            3,
            vec![node(NodeKind::FunctionDeclaration, (1, 0), (2, 1)).with_name("foo")],
        );
        let position = SourcePosition::new(1, 10);

        let first = search(&root, position, DEFAULT_MAX_DEPTH);
        let second = search(&root, position, DEFAULT_MAX_DEPTH);
        assert_eq!(first, second);
    }

    #[test]
    fn test_containment_boundaries() {
        // Function starts at 2:4 and ends at 4:1
        let root = module(
            6,
            vec![node(NodeKind::FunctionDeclaration, (2, 4), (4, 1)).with_name("foo")],
        );

        assert_eq!(name_at(&root, 2, 4), "foo", "exact start is inside");
        assert_eq!(name_at(&root, 2, 3), NOT_FOUND, "one column before start is outside");
        assert_eq!(name_at(&root, 4, 0), "foo");
        assert_eq!(name_at(&root, 4, 60), "foo", "any column on the end line is inside");
        assert_eq!(name_at(&root, 5, 0), NOT_FOUND);
    }

    #[test]
    fn test_overlapping_siblings_prefer_first() {
        let root = module(
            6,
            vec![
                node(NodeKind::FunctionDeclaration, (1, 0), (5, 0)).with_name("first"),
                node(NodeKind::FunctionDeclaration, (2, 0), (4, 0)).with_name("second"),
            ],
        );

        assert_eq!(name_at(&root, 3, 0), "first");
    }

    #[test]
    fn test_unnamed_sibling_does_not_stop_scan() {
        // foo(); function f() { <pos> }
        let root = module(
            2,
            vec![
                node(NodeKind::Other, (1, 0), (1, 6)),
                node(NodeKind::FunctionDeclaration, (1, 7), (1, 24)).with_name("f"),
            ],
        );

        assert_eq!(name_at(&root, 1, 20), "f");
    }

    #[test]
    fn test_composition_applies_once() {
        // function outer() { function inner() { [1].map(() => { <pos> }) } }
        let map_call = node(NodeKind::Other, (3, 8), (3, 40))
            .with_children(vec![node(NodeKind::ArrowFunction, (3, 20), (3, 39))]);
        let inner = node(NodeKind::FunctionDeclaration, (2, 4), (4, 5))
            .with_name("inner")
            .with_children(vec![map_call]);
        let root = module(
            6,
            vec![node(NodeKind::FunctionDeclaration, (1, 0), (5, 1))
                .with_name("outer")
                .with_children(vec![inner])],
        );

        assert_eq!(name_at(&root, 3, 30), "anonymous in inner");
    }

    #[test]
    fn test_anonymous_without_named_ancestor() {
        // setTimeout(() => { <pos> });
        let root = module(
            2,
            vec![node(NodeKind::Other, (1, 0), (1, 28))
                .with_children(vec![node(NodeKind::ArrowFunction, (1, 11), (1, 26))])],
        );

        assert_eq!(name_at(&root, 1, 15), ANONYMOUS);
    }

    #[test]
    fn test_candidate_at_root_is_anonymous() {
        let root = node(NodeKind::ArrowFunction, (1, 0), (1, 10));
        let result = search(&root, SourcePosition::new(1, 3), DEFAULT_MAX_DEPTH);

        assert!(matches!(result, SearchResult::Candidate(_)));
        assert_eq!(result.into_display_name(), ANONYMOUS);
    }

    #[test]
    fn test_destructuring_initializer_is_anonymous() {
        // const { cb } = () => { <pos> };
        let declaration = node(NodeKind::VariableDeclaration, (1, 6), (1, 40))
            .with_children(vec![node(NodeKind::ArrowFunction, (1, 15), (1, 40)).as_initializer()]);
        let root = module(2, vec![declaration]);

        assert_eq!(name_at(&root, 1, 20), ANONYMOUS);
    }

    #[test]
    fn test_non_initializer_child_of_variable_is_anonymous() {
        // const { cb = () => { <pos> } } = options;
        let declaration = node(NodeKind::VariableDeclaration, (1, 6), (1, 40))
            .with_name("handler")
            .with_children(vec![
                node(NodeKind::ArrowFunction, (1, 13), (1, 28)),
                node(NodeKind::Other, (1, 33), (1, 40)).as_initializer(),
            ]);
        let root = module(2, vec![declaration]);

        // Settled at the declaration itself, so it does not compose there
        assert_eq!(name_at(&root, 1, 20), ANONYMOUS);
    }

    #[test]
    fn test_class_property_arrow_composes_with_class() {
        // class Store { reset = () => { <pos> } }
        let property = node(NodeKind::PropertyDeclaration, (2, 4), (4, 5))
            .with_name("reset")
            .with_children(vec![node(NodeKind::ArrowFunction, (2, 12), (4, 5))]);
        let root = module(
            6,
            vec![node(NodeKind::ClassDeclaration, (1, 0), (5, 1))
                .with_name("Store")
                .with_children(vec![property])],
        );

        assert_eq!(name_at(&root, 3, 8), "anonymous in Store");
    }

    #[test]
    fn test_nested_iife_in_class_property_composes_with_property() {
        // class Store { reset = () => { (() => { <pos> })(); } }
        let call = node(NodeKind::Other, (3, 8), (5, 12))
            .with_children(vec![node(NodeKind::ArrowFunction, (3, 9), (5, 9))]);
        let property = node(NodeKind::PropertyDeclaration, (2, 4), (6, 5))
            .with_name("reset")
            .with_children(vec![node(NodeKind::ArrowFunction, (2, 12), (6, 5)).with_children(vec![call])]);
        let root = module(
            8,
            vec![node(NodeKind::ClassDeclaration, (1, 0), (7, 1))
                .with_name("Store")
                .with_children(vec![property])],
        );

        assert_eq!(name_at(&root, 4, 12), "anonymous in reset");
    }

    #[test]
    fn test_named_function_expression_is_composition_target() {
        // items.forEach(function tick() { (() => { <pos> })(); })
        let iife = node(NodeKind::Other, (2, 4), (4, 9))
            .with_children(vec![node(NodeKind::ArrowFunction, (2, 5), (4, 5))]);
        let tick = node(NodeKind::FunctionExpression, (1, 14), (5, 1))
            .with_name("tick")
            .with_children(vec![iife]);
        let root = module(
            6,
            vec![node(NodeKind::Other, (1, 0), (5, 2)).with_children(vec![tick])],
        );

        assert_eq!(name_at(&root, 3, 6), "anonymous in tick");
        // Directly inside the named expression it is still anonymous
        assert_eq!(name_at(&root, 1, 30), ANONYMOUS);
    }

    #[test]
    fn test_variable_declaration_as_innermost() {
        // const answer = 42;
        let root = module(
            2,
            vec![node(NodeKind::VariableDeclaration, (1, 6), (1, 17)).with_name("answer")],
        );

        assert_eq!(name_at(&root, 1, 10), "answer");
    }

    #[test]
    fn test_malformed_range_fails_closed() {
        let root = module(
            6,
            vec![node(NodeKind::FunctionDeclaration, (4, 0), (2, 0)).with_name("broken")],
        );

        assert_eq!(name_at(&root, 3, 0), NOT_FOUND);
    }

    #[test]
    fn test_depth_guard_ignores_deep_subtrees() {
        let mut deepest = node(NodeKind::FunctionDeclaration, (1, 0), (1, 50)).with_name("deep");
        for _ in 0..10 {
            deepest = node(NodeKind::Other, (1, 0), (1, 50)).with_children(vec![deepest]);
        }
        let root = module(2, vec![deepest]);
        let position = SourcePosition::new(1, 5);

        assert_eq!(search(&root, position, 4).into_display_name(), NOT_FOUND);
        assert_eq!(search(&root, position, 64).into_display_name(), "deep");
    }
}
