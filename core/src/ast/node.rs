use crate::location;

use super::kind::AstNodeKind;

/// A syntax node with its kind and source position.
///
/// Nodes are produced by the parser and only read by the code generator.
#[derive(Clone, PartialEq)]
pub struct AstNode {
    id: usize,
    pub kind: AstNodeKind,
    pub location: Option<location::Location>,
    pub span: Option<location::Span>,
}

impl AstNode {
    fn create_id() -> usize {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    pub fn new(
        kind: AstNodeKind,
        location: Option<location::Location>,
        span: Option<location::Span>,
    ) -> Self {
        AstNode {
            id: Self::create_id(),
            kind,
            location,
            span,
        }
    }

    /// Node without position info, for trees built by hand.
    pub fn bare(kind: AstNodeKind) -> Self {
        Self::new(kind, None, None)
    }

    pub fn with_location(mut self, location: location::Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_span(mut self, span: location::Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn get_id(&self) -> usize {
        self.id
    }
    pub fn get_kind(&self) -> &AstNodeKind {
        &self.kind
    }
    pub fn get_location(&self) -> Option<&location::Location> {
        self.location.as_ref()
    }
    pub fn get_span(&self) -> Option<&location::Span> {
        self.span.as_ref()
    }

    pub fn children(&self) -> Vec<&AstNode> {
        self.kind.children()
    }

    pub fn text(&self) -> Option<String> {
        self.kind.text()
    }
}

use std::fmt;

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(f: &mut fmt::Formatter<'_>, node: &AstNode, depth: usize) -> fmt::Result {
            for _ in 0..depth {
                write!(f, "  ")?;
            }
            write!(f, "{}", node.kind)?;
            if let Some(text) = node.text() {
                write!(f, " '{}'", text)?;
            }
            match &node.kind {
                AstNodeKind::FunctionDeclaration {
                    params,
                    return_type,
                    ..
                } => {
                    let params: Vec<String> = params
                        .iter()
                        .map(|p| format!("{} {}", p.name, p.type_name))
                        .collect();
                    write!(f, " ({})", params.join(", "))?;
                    if !return_type.is_empty() {
                        write!(f, " -> {}", return_type)?;
                    }
                }
                AstNodeKind::VariableDeclaration { type_name, .. } => {
                    write!(f, " : {}", type_name)?;
                }
                _ => {}
            }
            if let Some(loc) = &node.location {
                write!(f, " @{}:{}", loc.line, loc.column)?;
            }
            writeln!(f)?;
            for child in node.children() {
                write_node(f, child, depth + 1)?;
            }
            Ok(())
        }

        write_node(f, self, 0)
    }
}

impl fmt::Debug for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
