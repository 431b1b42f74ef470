//! Named placeholder substitution
//!
//! Templates interpolate `{{ .Key }}` (or Postman-style `{{Key}}`) actions
//! from a flat key/value map. A key that the map does not define renders as
//! an empty string; only malformed syntax is an error. [`expand`] is the
//! lenient form for recorded text, leaving anything it cannot resolve as is.

use std::collections::HashMap;

use crate::{GophermanError, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var(String),
}

/// A compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Compile a template
    ///
    /// # Errors
    ///
    /// Returns `Template` error on an unclosed or malformed action
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or_else(|| template_error(source, "unclosed action"))?;

            let key = parse_action(source, &after_open[..end])?;
            segments.push(Segment::Var(key));

            rest = &after_open[end + CLOSE.len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Render against a variable map; undefined keys render empty
    #[must_use]
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(key) => {
                    if let Some(value) = variables.get(key) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }

    /// Names of the variables this template references, in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Var(key) => Some(key.as_str()),
            Segment::Text(_) => None,
        })
    }
}

/// Compile and render a template in one step
///
/// # Errors
///
/// Returns `Template` error when the template syntax is malformed
pub fn substitute(template: &str, variables: &HashMap<String, String>) -> Result<String> {
    Ok(Template::parse(template)?.render(variables))
}

/// Expand placeholders inside literal text
///
/// Used for recorded values such as URLs and header values, where `{{` may
/// be ordinary content. Only well-formed actions naming a defined key are
/// replaced; anything else, including an unclosed `{{`, is kept verbatim.
#[must_use]
pub fn expand(text: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);

        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };

        let action = &rest[start..start + OPEN.len() + end + CLOSE.len()];
        match parse_action(text, &after_open[..end])
            .ok()
            .and_then(|key| variables.get(&key))
        {
            Some(value) => out.push_str(value),
            None => out.push_str(action),
        }

        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Extract the variable key from the inside of a `{{ ... }}` action
fn parse_action(source: &str, action: &str) -> Result<String> {
    let trimmed = action.trim();
    if trimmed.is_empty() {
        return Err(template_error(source, "empty action"));
    }

    let key = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if key.is_empty() {
        return Err(template_error(source, "missing variable name after '.'"));
    }

    if let Some(bad) = key
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(template_error(
            source,
            &format!("unexpected character {bad:?} in variable name '{key}'"),
        ));
    }

    Ok(key.to_string())
}

fn template_error(source: &str, reason: &str) -> GophermanError {
    GophermanError::Template {
        template: source.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_dot_syntax() {
        let v = vars(&[("Host", "api.local"), ("Port", "8080")]);
        let out = substitute("{{ .Host }}:{{ .Port }}", &v).unwrap();
        assert_eq!(out, "api.local:8080");
    }

    #[test]
    fn test_substitute_postman_syntax() {
        let v = vars(&[("baseUrl", "http://x")]);
        let out = substitute("{{baseUrl}}/users", &v).unwrap();
        assert_eq!(out, "http://x/users");
    }

    #[test]
    fn test_undefined_key_renders_empty() {
        let out = substitute("{{ .Missing }}:3002", &HashMap::new()).unwrap();
        assert_eq!(out, ":3002");
    }

    #[test]
    fn test_plain_text_untouched() {
        let out = substitute("localhost:3002", &HashMap::new()).unwrap();
        assert_eq!(out, "localhost:3002");

        let out = substitute("a }} b", &HashMap::new()).unwrap();
        assert_eq!(out, "a }} b");
    }

    #[test]
    fn test_malformed_templates() {
        let empty = HashMap::new();
        assert!(matches!(
            substitute("{{ .Host", &empty),
            Err(GophermanError::Template { .. })
        ));
        assert!(substitute("{{ }}", &empty).is_err());
        assert!(substitute("{{ . }}", &empty).is_err());
        assert!(substitute("{{ .Host Port }}", &empty).is_err());
        assert!(substitute("{{ .Host | upper }}", &empty).is_err());
    }

    #[test]
    fn test_keys() {
        let template = Template::parse("{{.a}}-{{ b }}-c").unwrap();
        assert_eq!(template.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_expand_keeps_literal_braces() {
        let v = vars(&[("host", "api.local")]);

        assert_eq!(expand("http://{{ .host }}/x", &v), "http://api.local/x");
        assert_eq!(expand("/search?q={{x", &v), "/search?q={{x");
        assert_eq!(expand("{{ a b }}", &v), "{{ a b }}");
        assert_eq!(expand("{{name}}-{{host}}", &v), "{{name}}-api.local");
        assert_eq!(expand("{{}}{{host}}", &v), "{{}}api.local");
    }
}
