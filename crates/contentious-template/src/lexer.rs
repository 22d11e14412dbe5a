//! Template tokenizer.
//!
//! Splits template source into literal text, `{{ variable }}` expressions,
//! `{% tag arg ... %}` blocks, and `{# comments #}` (which are dropped).

use contentious_core::ContentiousError;

/// A token produced by [`tokenize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A literal text segment.
    Text(String),
    /// The expression inside `{{ }}`.
    Variable(String),
    /// A block tag: its name and whitespace-split arguments (quote-aware).
    Tag(String, Vec<String>),
}

/// Tokenizes template source.
///
/// # Errors
///
/// Returns a syntax error for a tag, variable, or comment that is opened but
/// never closed.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ContentiousError> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find('{') {
        let (closer, kind) = match rest.as_bytes().get(open + 1) {
            Some(b'{') => ("}}", Kind::Variable),
            Some(b'%') => ("%}", Kind::Tag),
            Some(b'#') => ("#}", Kind::Comment),
            _ => {
                // A lone brace is plain text; keep scanning after it.
                let (head, tail) = rest.split_at(open + 1);
                push_text(&mut tokens, head);
                rest = tail;
                continue;
            }
        };

        push_text(&mut tokens, &rest[..open]);
        let body_start = &rest[open + 2..];
        let Some(end) = body_start.find(closer) else {
            return Err(ContentiousError::syntax(format!(
                "Unclosed tag: expected '{closer}'"
            )));
        };
        let inner = body_start[..end].trim();
        match kind {
            Kind::Variable => tokens.push(Token::Variable(inner.to_string())),
            Kind::Tag => {
                let mut parts = split_args(inner).into_iter();
                let name = parts.next().unwrap_or_default();
                tokens.push(Token::Tag(name, parts.collect()));
            }
            Kind::Comment => {}
        }
        rest = &body_start[end + 2..];
    }
    push_text(&mut tokens, rest);

    Ok(tokens)
}

#[derive(Clone, Copy)]
enum Kind {
    Variable,
    Tag,
    Comment,
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    // Merge with a preceding text token so lone braces don't fragment output.
    if let Some(Token::Text(prev)) = tokens.last_mut() {
        prev.push_str(text);
    } else {
        tokens.push(Token::Text(text.to_string()));
    }
}

/// Splits tag content on whitespace, keeping quoted substrings intact.
fn split_args(content: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;

    for ch in content.chars() {
        match ch {
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_single && !in_double => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
