use eyre::{bail, Result, WrapErr};
use packbridge_compiler::Compiler;
use packbridge_config::Settings;
use packbridge_core::Context;
use serde_json::Value;

pub async fn execute(settings: Settings, bundle: &str, pairs: &[String], json: bool) -> Result<()> {
    let context = parse_context(pairs)?;
    let compiler = Compiler::new(settings)?;

    let result = compiler
        .webpack(bundle, (!context.is_empty()).then_some(&context), None)
        .await
        .wrap_err_with(|| format!("failed to build {bundle}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.get_assets())?);
    } else {
        println!("{}", result.render());
    }

    for warning in result.warnings() {
        tracing::warn!("{warning}");
    }

    Ok(())
}

/// Parse `key=value` pairs, reading each value as JSON when it parses
fn parse_context(pairs: &[String]) -> Result<Context> {
    let mut context = Context::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("context value '{pair}' must look like key=value");
        };
        if key.is_empty() {
            bail!("context value '{pair}' has an empty key");
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        context.insert(key.to_string(), value);
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_context_values() {
        let context = parse_context(&[
            "page=home".to_string(),
            "debug=true".to_string(),
            "ids=[1,2]".to_string(),
            "empty=".to_string(),
        ])
        .unwrap();

        assert_eq!(context["page"], json!("home"));
        assert_eq!(context["debug"], json!(true));
        assert_eq!(context["ids"], json!([1, 2]));
        assert_eq!(context["empty"], json!(""));
    }

    #[test]
    fn test_parse_context_rejects_malformed_pairs() {
        assert!(parse_context(&["novalue".to_string()]).is_err());
        assert!(parse_context(&["=value".to_string()]).is_err());
    }
}
