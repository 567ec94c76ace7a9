//! URI template expansion.
//!
//! Templates carry placeholders of the form `{{ name }}` (surrounding
//! whitespace allowed). Expansion delegates each placeholder name to a
//! caller-supplied mapper, so the same template can become a JavaScript
//! template literal, a format string, or a concrete URL.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*}}").expect("placeholder pattern is valid")
});

/// Expand every placeholder of `template` through `mapper`, then join `prefix`.
///
/// `mapper` is called once per distinct placeholder token, and every
/// occurrence of that exact token is replaced. The first mapper error is
/// returned as is and no partial output is produced.
pub fn expand_template<F, E>(template: &str, mut mapper: F, prefix: &str) -> Result<String, E>
where
    F: FnMut(&str) -> Result<String, E>,
{
    let mut expanded = template.to_string();
    let mut seen = HashSet::new();

    for captures in PLACEHOLDER.captures_iter(template) {
        let (Some(token), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if !seen.insert(token.as_str()) {
            continue;
        }

        let replacement = mapper(name.as_str())?;
        expanded = expanded.replace(token.as_str(), &replacement);
    }

    Ok(join_prefix(prefix, &expanded))
}

/// Join `prefix` and `path` with exactly one slash. An empty prefix leaves `path` untouched.
pub fn join_prefix(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return prefix.to_string();
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn js_template(name: &str) -> Result<String, Infallible> {
        Ok(format!("${{input.{name}}}"))
    }

    #[test]
    fn test_expand_with_prefix() {
        let url =
            expand_template("/users/{{ userId }}", js_template, "http://localhost:8080").unwrap();
        assert_eq!(url, "http://localhost:8080/users/${input.userId}");
    }

    #[test]
    fn test_expand_without_placeholders() {
        let url = expand_template("/health", js_template, "").unwrap();
        assert_eq!(url, "/health");
    }

    #[test]
    fn test_expand_tolerates_missing_whitespace() {
        let url = expand_template("/a/{{id}}/b/{{  other  }}", js_template, "").unwrap();
        assert_eq!(url, "/a/${input.id}/b/${input.other}");
    }

    #[test]
    fn test_repeated_token_mapped_once_and_replaced_everywhere() {
        let mut calls = Vec::new();
        let url = expand_template(
            "/{{ id }}/copy/{{ id }}",
            |name: &str| -> Result<String, Infallible> {
                calls.push(name.to_string());
                Ok("42".into())
            },
            "",
        )
        .unwrap();
        assert_eq!(url, "/42/copy/42");
        assert_eq!(calls, vec!["id"]);
    }

    #[test]
    fn test_differently_spaced_tokens_are_distinct() {
        let mut calls = 0;
        let url = expand_template(
            "/{{id}}/{{ id }}",
            |_: &str| -> Result<String, Infallible> {
                calls += 1;
                Ok("x".into())
            },
            "",
        )
        .unwrap();
        assert_eq!(url, "/x/x");
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_mapper_error_propagates() {
        let result = expand_template(
            "/users/{{ userId }}/pets/{{ petId }}",
            |name: &str| {
                if name == "petId" {
                    Err(format!("unknown variable {name}"))
                } else {
                    Ok("1".to_string())
                }
            },
            "http://host",
        );
        assert_eq!(result.unwrap_err(), "unknown variable petId");
    }

    #[test]
    fn test_malformed_placeholders_are_left_alone() {
        let url = expand_template("/a/{{ 1bad }}/{ single }", js_template, "").unwrap();
        assert_eq!(url, "/a/{{ 1bad }}/{ single }");
    }

    #[test]
    fn test_join_prefix() {
        assert_eq!(join_prefix("", "/users"), "/users");
        assert_eq!(join_prefix("http://host", "users"), "http://host/users");
        assert_eq!(join_prefix("http://host/", "/users"), "http://host/users");
        assert_eq!(join_prefix("http://host//", "//users"), "http://host/users");
        assert_eq!(join_prefix("http://host", ""), "http://host");
    }
}
