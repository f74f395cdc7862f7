use serde_json::json;

use crate::app::Runtime;
use crate::errors::CliError;
use crate::parse::response::extract_model_names;

pub async fn handle(runtime: &Runtime) -> Result<(), CliError> {
    let api = runtime.api_client()?;
    if !api.has_key() {
        return Err(CliError::Auth(
            "No API key found. Set API_KEY or GEMINI_API_KEY.".to_string(),
        ));
    }

    let query = [("pageSize".to_string(), "1000".to_string())];
    let res = api.get_json("/models", Some(&query)).await?;
    runtime.output.print_verbose(&format!(
        "request_id={:?} elapsed_ms={}",
        res.request_id, res.elapsed_ms
    ));

    let available = extract_model_names(&res.json);
    let models = runtime.config.models();
    let fast_listed = available.contains(&models.fast);
    let pro_listed = available.contains(&models.pro);

    if runtime.output.json {
        return runtime.output.print_json(&json!({
            "ok": true,
            "models": available.len(),
            "fastModel": { "name": models.fast, "listed": fast_listed },
            "proModel": { "name": models.pro, "listed": pro_listed },
        }));
    }

    runtime.output.print_human("ok: true");
    runtime
        .output
        .print_human(&format!("models: {}", available.len()));
    runtime
        .output
        .print_human(&format!("fast: {} ({})", models.fast, listed(fast_listed)));
    runtime
        .output
        .print_human(&format!("pro: {} ({})", models.pro, listed(pro_listed)));
    Ok(())
}

fn listed(found: bool) -> &'static str {
    if found { "listed" } else { "not listed" }
}
