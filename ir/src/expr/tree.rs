//! Rendering of expression trees.
//!
//! `Display` prints the s-expression form used throughout logs and tests:
//! `(+ 1 (* x 2))`, nullary compounds as `(+)`. [`render_tree`] produces an
//! indented ASCII tree with node ids, which is easier to read for large terms.

use std::borrow::Cow;
use std::fmt;
use std::io;
use std::sync::Arc;

use ptree::{Style, TreeItem};

use crate::expr::core::{Expr, ExprKind};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(v) => write!(f, "{v}"),
            ExprKind::Variable(name) => write!(f, "{name}"),
            ExprKind::Compound { op, children } => {
                write!(f, "({}", op.symbol)?;
                for child in children.iter() {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Clone)]
struct ExprTree {
    expr: Arc<Expr>,
}

impl TreeItem for ExprTree {
    type Child = ExprTree;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        write!(f, "{}", format_node(&self.expr))
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Owned(self.expr.children().iter().map(|c| ExprTree { expr: c.clone() }).collect())
    }
}

/// Format a single node: `[id] LABEL`.
fn format_node(expr: &Expr) -> String {
    let label = match &expr.kind {
        ExprKind::Literal(v) => format!("LIT({v})"),
        ExprKind::Variable(name) => format!("VAR({name})"),
        ExprKind::Compound { op, children } => format!("{} /{}", op.symbol, children.len()),
    };
    format!("[{}] {}", expr.id, label)
}

/// Render an expression as an ASCII tree.
///
/// Falls back to the s-expression form if the tree writer fails.
pub fn render_tree(expr: &Arc<Expr>) -> String {
    let tree = ExprTree { expr: expr.clone() };
    let mut buf = Vec::new();
    if ptree::write_tree(&tree, &mut buf).is_err() {
        return expr.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| expr.to_string())
}
