//! Tests for AST lowering

#[cfg(test)]
mod lower_tests {
    use crate::parser;
    use crate::position::SourcePosition;
    use crate::tree::{NodeKind, SyntaxNode};

    fn lower(src: &str, filename: &str) -> SyntaxNode {
        parser::parse_tree(src, filename).unwrap()
    }

    /// Collect (kind, name) pairs in pre-order, skipping `Other` nodes
    fn declarations(node: &SyntaxNode) -> Vec<(NodeKind, Option<String>)> {
        let mut out = Vec::new();
        collect(node, &mut out);
        out
    }

    fn collect(node: &SyntaxNode, out: &mut Vec<(NodeKind, Option<String>)>) {
        if !matches!(node.kind, NodeKind::Other | NodeKind::Module) {
            out.push((node.kind, node.declared_name.clone()));
        }
        for child in &node.children {
            collect(child, out);
        }
    }

    fn find(node: &SyntaxNode, kind: NodeKind) -> Option<&SyntaxNode> {
        if node.kind == kind {
            return Some(node);
        }
        node.children.iter().find_map(|child| find(child, kind))
    }

    #[test]
    fn test_root_spans_whole_file() {
        let src = "const a = 1;\n\nfunction foo() {\n  return a;\n}\n";
        let root = lower(src, "test.ts");

        assert_eq!(root.kind, NodeKind::Module);
        assert_eq!(root.range.start, SourcePosition::new(1, 0));
        assert_eq!(root.range.end.line, 5);
    }

    #[test]
    fn test_function_declaration_range() {
        let src = "\n  function foo() {\n    return 1;\n  }\n";
        let root = lower(src, "test.ts");
        let function = find(&root, NodeKind::FunctionDeclaration).unwrap();

        assert_eq!(function.declared_name.as_deref(), Some("foo"));
        assert_eq!(function.range.start, SourcePosition::new(2, 2));
        assert_eq!(function.range.end.line, 4);
    }

    #[test]
    fn test_variable_initializer_flagged() {
        let root = lower("const bar = () => 1;", "test.ts");
        let declaration = find(&root, NodeKind::VariableDeclaration).unwrap();

        assert_eq!(declaration.declared_name.as_deref(), Some("bar"));
        let init = declaration.initializer().unwrap();
        assert_eq!(init.kind, NodeKind::ArrowFunction);
    }

    #[test]
    fn test_type_wrappers_are_transparent() {
        let root = lower("const bar = (() => 1) as unknown as Fn;", "test.ts");
        let declaration = find(&root, NodeKind::VariableDeclaration).unwrap();

        assert_eq!(declaration.initializer().map(|n| n.kind), Some(NodeKind::ArrowFunction));
    }

    #[test]
    fn test_call_initializer_is_not_the_function() {
        let root = lower("const memo = useCallback(() => 1, []);", "test.ts");
        let declaration = find(&root, NodeKind::VariableDeclaration).unwrap();
        let init = declaration.initializer().unwrap();

        assert_eq!(init.kind, NodeKind::Other);
        assert!(find(init, NodeKind::ArrowFunction).is_some());
    }

    #[test]
    fn test_class_members() {
        let src = r#"
            class Store {
                count = 0;
                #secret = () => 1;
                constructor() {}
                get total() { return 1; }
                load() {}
                #reset() {}
            }
        "#;
        let root = lower(src, "test.ts");

        assert_eq!(
            declarations(&root),
            vec![
                (NodeKind::ClassDeclaration, Some("Store".to_string())),
                (NodeKind::PropertyDeclaration, Some("count".to_string())),
                (NodeKind::PropertyDeclaration, Some("#secret".to_string())),
                (NodeKind::ArrowFunction, None),
                (NodeKind::MethodDeclaration, Some("constructor".to_string())),
                (NodeKind::MethodDeclaration, Some("total".to_string())),
                (NodeKind::MethodDeclaration, Some("load".to_string())),
                (NodeKind::MethodDeclaration, Some("#reset".to_string())),
            ]
        );
    }

    #[test]
    fn test_object_members() {
        let src = r#"
            const handlers = {
                onPress: () => {},
                "on-close"() {},
                set value(v) {},
            };
        "#;
        let root = lower(src, "test.js");

        assert_eq!(
            declarations(&root),
            vec![
                (NodeKind::VariableDeclaration, Some("handlers".to_string())),
                (NodeKind::PropertyDeclaration, Some("onPress".to_string())),
                (NodeKind::ArrowFunction, None),
                (NodeKind::MethodDeclaration, Some("on-close".to_string())),
                (NodeKind::MethodDeclaration, Some("value".to_string())),
            ]
        );
    }

    #[test]
    fn test_export_default_function_is_declaration() {
        let root = lower("export default function App() { return 1; }", "test.js");
        let function = find(&root, NodeKind::FunctionDeclaration).unwrap();

        assert_eq!(function.declared_name.as_deref(), Some("App"));
    }

    #[test]
    fn test_children_in_document_order() {
        let src = "function a() {}\nfunction b() {}\nfunction c() {}\n";
        let root = lower(src, "test.ts");
        let starts: Vec<_> = root.children.iter().map(|c| c.range.start).collect();

        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(root.children.len(), 3);
    }

    #[test]
    fn test_destructuring_has_no_name() {
        let root = lower("const { a, b } = load();", "test.ts");
        let declaration = find(&root, NodeKind::VariableDeclaration).unwrap();

        assert_eq!(declaration.declared_name, None);
    }
}
