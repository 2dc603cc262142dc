//! CLI Status Command
//!
//! Queries a running gateway's health endpoint.

use std::time::Duration;

use anyhow::{bail, Result};
use serde_json::Value;

use crate::terminal_output::{note_error, note_success, render_table, Column};

pub async fn run(base_url: &str) -> Result<()> {
    let url = format!("{}/api/health", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            note_error(&format!("Prompt Proxy is not reachable at {base_url}: {e}"));
            bail!("gateway unreachable at {base_url}: {e}");
        }
    };

    let status = response.status();
    if !status.is_success() {
        note_error(&format!("Health check returned {status}"));
        bail!("health check at {url} returned {status}");
    }

    let body: Value = response.json().await?;
    note_success(&format!("Prompt Proxy is up at {base_url}"));
    print!("{}", render_table(&[Column::left("Field"), Column::left("Value")], &health_rows(&body)));
    Ok(())
}

fn health_rows(body: &Value) -> Vec<Vec<String>> {
    ["status", "service", "version", "provider", "model", "uptimeSeconds", "timestamp"]
        .iter()
        .filter_map(|field| {
            let value = body.get(*field)?;
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(vec![field.to_string(), shown])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unreachable_gateway_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = run(&format!("http://{addr}")).await.unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn rows_skip_missing_fields() {
        let rows = health_rows(&json!({ "status": "ok", "uptimeSeconds": 12 }));
        assert_eq!(
            rows,
            vec![
                vec!["status".to_string(), "ok".to_string()],
                vec!["uptimeSeconds".to_string(), "12".to_string()],
            ]
        );
    }
}
