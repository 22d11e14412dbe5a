//! Expressions compiled at parse time and resolved per render.

use contentious_core::ContentiousError;

use crate::context::{Context, ContextValue};

/// A variable reference or a literal, compiled once per template.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A dot-separated variable path resolved against the context.
    Variable(String),
    /// A literal value.
    Literal(ContextValue),
}

impl Expression {
    /// Compiles an expression string: a quoted string literal, a numeric
    /// literal, or otherwise a variable reference.
    pub fn compile(s: &str) -> Result<Self, ContentiousError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContentiousError::syntax("Empty expression"));
        }

        if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
            || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
        {
            return Ok(Self::Literal(ContextValue::String(
                s[1..s.len() - 1].to_string(),
            )));
        }
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Self::Literal(ContextValue::Integer(i)));
        }
        if let Ok(f) = s.parse::<f64>() {
            return Ok(Self::Literal(ContextValue::Float(f)));
        }
        Ok(Self::Variable(s.to_string()))
    }

    /// Resolves this expression against a context. A missing variable
    /// resolves to [`ContextValue::None`].
    pub fn resolve(&self, context: &Context) -> ContextValue {
        match self {
            Self::Variable(path) => context.get(path).cloned().unwrap_or(ContextValue::None),
            Self::Literal(value) => value.clone(),
        }
    }
}

/// Parses `name=expression` argument tokens into an ordered kwarg list.
///
/// # Errors
///
/// Returns a syntax error for a token without `=` or a duplicated name.
pub fn parse_kwargs(
    args: &[String],
    tag_name: &str,
) -> Result<Vec<(String, Expression)>, ContentiousError> {
    let mut kwargs: Vec<(String, Expression)> = Vec::new();
    for arg in args {
        let Some(eq) = arg.find('=') else {
            return Err(ContentiousError::syntax(format!(
                "{tag_name} tag received non-kwarg: {arg}"
            )));
        };
        let (name, value) = (&arg[..eq], &arg[eq + 1..]);
        if kwargs.iter().any(|(existing, _)| existing == name) {
            return Err(ContentiousError::syntax(format!(
                "{tag_name} tag received kwarg '{name}' twice."
            )));
        }
        kwargs.push((name.to_string(), Expression::compile(value)?));
    }
    Ok(kwargs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_string_literal() {
        let expr = Expression::compile("\"my_key\"").unwrap();
        assert_eq!(expr.resolve(&Context::new()), ContextValue::from("my_key"));
        let expr = Expression::compile("'single'").unwrap();
        assert_eq!(expr.resolve(&Context::new()), ContextValue::from("single"));
    }

    #[test]
    fn test_compile_numeric_literal() {
        let expr = Expression::compile("42").unwrap();
        assert_eq!(expr.resolve(&Context::new()), ContextValue::Integer(42));
        let expr = Expression::compile("3.5").unwrap();
        assert_eq!(expr.resolve(&Context::new()), ContextValue::Float(3.5));
    }

    #[test]
    fn test_compile_variable_resolves_from_context() {
        let mut ctx = Context::new();
        ctx.set("variable", ContextValue::from("variable_value"));
        let expr = Expression::compile("variable").unwrap();
        assert_eq!(expr.resolve(&ctx), ContextValue::from("variable_value"));
    }

    #[test]
    fn test_missing_variable_resolves_to_none() {
        let expr = Expression::compile("missing").unwrap();
        assert_eq!(expr.resolve(&Context::new()), ContextValue::None);
    }

    #[test]
    fn test_compile_empty_is_error() {
        assert!(Expression::compile("  ").is_err());
    }

    #[test]
    fn test_parse_kwargs_order_preserved() {
        let args = vec![
            "title=variable".to_string(),
            "onclick=\"boogie()\"".to_string(),
        ];
        let kwargs = parse_kwargs(&args, "editable").unwrap();
        assert_eq!(kwargs[0].0, "title");
        assert_eq!(kwargs[1].0, "onclick");
    }

    #[test]
    fn test_parse_kwargs_rejects_non_kwarg() {
        let args = vec!["justavalue".to_string()];
        let err = parse_kwargs(&args, "editable").unwrap_err();
        assert!(err.to_string().contains("non-kwarg"));
    }

    #[test]
    fn test_parse_kwargs_rejects_duplicate() {
        let args = vec!["a=1".to_string(), "a=2".to_string()];
        let err = parse_kwargs(&args, "editable").unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_parse_kwargs_empty_value() {
        let args = vec!["editable=\"\"".to_string()];
        let kwargs = parse_kwargs(&args, "editable").unwrap();
        assert_eq!(
            kwargs[0].1.resolve(&Context::new()),
            ContextValue::from("")
        );
    }
}
