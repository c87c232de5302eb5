//! `{{var}}` prompt templates.
//!
//! `{{config.a.b}}` is looked up in the profile's TOML tree when the prompt is
//! loaded. Any other name is a runtime variable filled in per call. `\{{`
//! produces a literal `{{`.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    /// Escaped `\{{`, emitted as `{{`.
    OpenBraces,
    Var(&'a str),
}

fn segments(template: &str) -> Result<Vec<Segment<'_>>> {
    let mut out = Vec::new();
    let mut rest = template;

    while !rest.is_empty() {
        let escaped = rest.find("\\{{");
        let open = rest.find("{{");

        match (escaped, open) {
            (Some(e), Some(o)) if e < o => {
                if e > 0 {
                    out.push(Segment::Text(&rest[..e]));
                }
                out.push(Segment::OpenBraces);
                rest = &rest[e + 3..];
            }
            (_, Some(o)) => {
                if o > 0 {
                    out.push(Segment::Text(&rest[..o]));
                }
                let after = &rest[o + 2..];
                let Some(close) = after.find("}}") else {
                    bail!("Unclosed template variable: {{{{{}", after);
                };
                out.push(Segment::Var(after[..close].trim()));
                rest = &after[close + 2..];
            }
            (_, None) => {
                out.push(Segment::Text(rest));
                rest = "";
            }
        }
    }

    Ok(out)
}

/// Resolve `{{config.*}}` variables from the TOML value tree at load time.
/// Runtime vars are left as `{{name}}`; escaped braces are kept escaped so a
/// later runtime pass still treats them as literals.
pub fn resolve_config_vars(template: &str, toml_value: &toml::Value) -> Result<String> {
    let mut result = String::with_capacity(template.len());

    for segment in segments(template)? {
        match segment {
            Segment::Text(text) => result.push_str(text),
            Segment::OpenBraces => result.push_str("\\{{"),
            Segment::Var(name) => match name.strip_prefix("config.") {
                Some(path) => {
                    let value = lookup_toml_path(toml_value, path)
                        .with_context(|| format!("Config variable not found: {{{{{name}}}}}"))?;
                    result.push_str(&toml_value_to_string(value));
                }
                None => {
                    result.push_str("{{");
                    result.push_str(name);
                    result.push_str("}}");
                }
            },
        }
    }

    Ok(result)
}

/// Fill runtime `{{var}}` placeholders. Unknown names are left as-is.
pub fn resolve_runtime_vars(template: &str, vars: &HashMap<&str, &str>) -> String {
    let Ok(parsed) = segments(template) else {
        // Malformed templates are rejected at load; emit verbatim if one slips through.
        return template.to_string();
    };

    let mut result = String::with_capacity(template.len());
    for segment in parsed {
        match segment {
            Segment::Text(text) => result.push_str(text),
            Segment::OpenBraces => result.push_str("{{"),
            Segment::Var(name) => match vars.get(name) {
                Some(value) => result.push_str(value),
                None => {
                    result.push_str("{{");
                    result.push_str(name);
                    result.push_str("}}");
                }
            },
        }
    }
    result
}

/// Every `{{...}}` must be a resolvable `config.*` path or an allowed runtime name.
pub fn validate_template(
    template: &str,
    toml_value: &toml::Value,
    allowed_runtime: &[&str],
) -> Result<()> {
    for segment in segments(template)? {
        let Segment::Var(name) = segment else {
            continue;
        };
        if let Some(path) = name.strip_prefix("config.") {
            lookup_toml_path(toml_value, path)
                .with_context(|| format!("Config variable not found: {{{{{name}}}}}"))?;
        } else if !allowed_runtime.contains(&name) {
            bail!(
                "Unknown template variable: {{{{{}}}}}. Allowed runtime vars: {:?}",
                name,
                allowed_runtime
            );
        }
    }
    Ok(())
}

/// Walk the TOML value tree by dotted path (e.g., "report.company").
fn lookup_toml_path<'a>(value: &'a toml::Value, path: &str) -> Option<&'a toml::Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

fn toml_value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Array(arr) => arr
            .iter()
            .map(toml_value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        toml::Value::Table(_) => "[table]".to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
    }
}
