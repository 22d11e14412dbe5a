//! Template parser: token stream → renderable node tree.
//!
//! The substrate is deliberately small — literal text, `{{ var }}`
//! interpolation, and the two tags this crate owns (`editable`, `toolbar`).
//! Anything else the page needs belongs to the host templating system.

use contentious_core::ContentiousError;

use crate::context::Context;
use crate::escape::escape_value;
use crate::expression::Expression;
use crate::lexer::{tokenize, Token};
use crate::source::ContentSource;
use crate::tag::{EditableNode, ToolbarNode};

/// A node in the parsed template tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// A literal text segment, emitted verbatim.
    Text(String),
    /// A `{{ variable }}` interpolation, escaped unless the value is trusted.
    Variable(Expression),
    /// An `{% editable %}` region.
    Editable(EditableNode),
    /// A `{% toolbar %}` block, rendered only in edit mode.
    Toolbar(ToolbarNode),
}

impl Node {
    /// True for editable regions; used to police the nesting rule.
    pub(crate) fn is_editable(&self) -> bool {
        matches!(self, Self::Editable(_))
    }

    /// Renders this node. `is_nested` threads through to editable regions so
    /// a region inside another region marks itself with the nested class.
    pub fn render(&self, context: &Context, source: &dyn ContentSource, is_nested: bool) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Variable(expr) => escape_value(&expr.resolve(context)).to_display_string(),
            Self::Editable(node) => node.render(context, source, is_nested),
            Self::Toolbar(node) => node.render(context, source),
        }
    }
}

/// A compiled template: parsed once, rendered many times.
#[derive(Debug)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parses template source.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for lexing failures, malformed `editable`
    /// declarations, unknown tags, or unbalanced block tags.
    pub fn parse(source: &str) -> Result<Self, ContentiousError> {
        let tokens = tokenize(source)?;
        let mut stream = tokens.into_iter().peekable();
        let nodes = parse_nodes(&mut stream, None)?;
        Ok(Self { nodes })
    }

    /// Renders against a context, pulling override data and the edit-mode
    /// flag from `source`.
    pub fn render(&self, context: &Context, source: &dyn ContentSource) -> String {
        self.nodes
            .iter()
            .map(|node| node.render(context, source, false))
            .collect()
    }
}

fn parse_nodes(
    stream: &mut std::iter::Peekable<std::vec::IntoIter<Token>>,
    until: Option<&str>,
) -> Result<Vec<Node>, ContentiousError> {
    let mut nodes = Vec::new();

    while let Some(token) = stream.next() {
        match token {
            Token::Text(text) => nodes.push(Node::Text(text)),
            Token::Variable(expr) => nodes.push(Node::Variable(Expression::compile(&expr)?)),
            Token::Tag(name, args) => match name.as_str() {
                end if until == Some(end) => return Ok(nodes),
                "editable" => {
                    let mut node = EditableNode::from_args(&args)?;
                    if !node.is_self_closing() {
                        node.nodelist = parse_nodes(stream, Some("endeditable"))?;
                    }
                    nodes.push(Node::Editable(node));
                }
                "toolbar" => {
                    let nodelist = parse_nodes(stream, Some("endtoolbar"))?;
                    nodes.push(Node::Toolbar(ToolbarNode { nodelist }));
                }
                other => {
                    return Err(ContentiousError::syntax(format!("Unknown tag: {other}")));
                }
            },
        }
    }

    if let Some(expected) = until {
        return Err(ContentiousError::syntax(format!(
            "Unexpected end of template: expected {{% {expected} %}}"
        )));
    }
    Ok(nodes)
}
