use anyhow::Result;
use garden_gate::utils::validation::Validate;
use garden_gate::{build_dispatcher, GatewayConfig};
use httpmock::prelude::*;
use tempfile::TempDir;

fn write_config(temp_dir: &TempDir, server: &MockServer, extra: &str) -> Result<GatewayConfig> {
    let audit_path = temp_dir.path().join("logs").join("rejections.jsonl");
    let content = format!(
        r#"
[upstream]
endpoint = "{}"
model = "garden-test"
api_key = "test-key"

[audit]
sink = "file"
path = "{}"

{}
"#,
        server.url("/v1/messages"),
        audit_path.to_string_lossy().replace('\\', "/"),
        extra
    );

    let config_path = temp_dir.path().join("gateway.toml");
    std::fs::write(&config_path, content)?;
    let config = GatewayConfig::from_file(&config_path)?;
    config.validate()?;
    Ok(config)
}

fn audit_lines(temp_dir: &TempDir) -> Vec<serde_json::Value> {
    let path = temp_dir.path().join("logs").join("rejections.jsonl");
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_grid_plan_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/messages")
            .body_contains("\"max_tokens\":1500")
            .body_contains("garden-test")
            .body_contains("Hardiness zone: 6b");
        then.status(200).json_body(serde_json::json!({
            "content": [{"type": "text", "text": "Row 1: T T B B"}],
            "usage": {"input_tokens": 90, "output_tokens": 12}
        }));
    });

    let config = write_config(&temp_dir, &server, "")?;
    let dispatcher = build_dispatcher(&config)?;

    let response = dispatcher
        .dispatch(
            "POST",
            "/api/grid-plan",
            br#"{"width": 4, "length": "8", "plants": "tomatoes and basil", "zone": "6b"}"#,
        )
        .await;

    api_mock.assert();
    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    assert_eq!(body["response"], "Row 1: T T B B");
    assert_eq!(body["isOffTopic"], false);
    assert!(audit_lines(&temp_dir).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rejections_are_appended_to_audit_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200).json_body(serde_json::json!({"content": []}));
    });

    let config = write_config(&temp_dir, &server, "")?;
    let dispatcher = build_dispatcher(&config)?;

    let vague = dispatcher
        .dispatch("POST", "/api/ask", br#"{"question": "help"}"#)
        .await;
    let off_topic = dispatcher
        .dispatch(
            "POST",
            "/api/plan",
            br#"{"spaceSize": "big", "soilType": "sand", "goals": "pick stocks to invest in", "location": "NYC"}"#,
        )
        .await;

    assert_eq!(api_mock.hits(), 0);
    assert_eq!(vague.body.unwrap()["validationReason"], "too-vague");
    assert_eq!(off_topic.body.unwrap()["validationReason"], "off-topic");

    let lines = audit_lines(&temp_dir);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["operation"], "consult");
    assert_eq!(lines[0]["query"], "help");
    assert_eq!(lines[0]["queryLength"], 4);
    assert_eq!(lines[1]["operation"], "plan");
    assert_eq!(lines[1]["query"], "pick stocks to invest in");
    Ok(())
}

#[tokio::test]
async fn test_lexicon_override_changes_verdicts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200).json_body(serde_json::json!({
            "content": [{"type": "text", "text": "ok"}]
        }));
    });

    let config = write_config(
        &temp_dir,
        &server,
        r#"
[lexicon]
off_topic = ["compost"]
"#,
    )?;
    let dispatcher = build_dispatcher(&config)?;

    // compost 仍在 in-scope 清單中，所以會被放行
    let both = dispatcher
        .dispatch("POST", "/api/ask", br#"{"question": "is compost tea worth it"}"#)
        .await;
    assert_eq!(both.body.unwrap()["isOffTopic"], false);

    // python 不再是 off-topic，長句中性文字預設放行
    let neutral = dispatcher
        .dispatch("POST", "/api/ask", br#"{"question": "what is the python release schedule"}"#)
        .await;
    assert_eq!(neutral.body.unwrap()["isOffTopic"], false);

    assert_eq!(api_mock.hits(), 2);
    Ok(())
}

#[tokio::test]
async fn test_unwritable_audit_path_does_not_break_refusals() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let mut config = write_config(&temp_dir, &server, "")?;
    // 指向目錄，寫入必定失敗
    config.audit.path = Some(temp_dir.path().to_string_lossy().to_string());
    let dispatcher = build_dispatcher(&config)?;

    let response = dispatcher
        .dispatch("POST", "/api/ask", br#"{"question": "write my essay"}"#)
        .await;

    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    assert_eq!(body["isOffTopic"], true);
    assert_eq!(body["validationReason"], "off-topic");
    Ok(())
}
