//! Stdio transport tests over in-memory pipes.

use loyalteez_mcp::clients::ServiceConfig;
use loyalteez_mcp::{serve, McpServer};
use serde_json::Value;
use tokio::io::{duplex, AsyncWriteExt};

async fn run(input: &str) -> Vec<Value> {
    let server = McpServer::from_config(&ServiceConfig::default())
        .await
        .unwrap();

    let (mut client, server_in) = duplex(64 * 1024);
    client.write_all(input.as_bytes()).await.unwrap();
    client.shutdown().await.unwrap();

    let mut output = Vec::new();
    serve(&server, server_in, &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_one_response_per_request_line() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":"r","method":"resources/list"}"#,
        "\n",
    );

    let responses = run(input).await;
    assert_eq!(responses.len(), 3);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 29);
    assert_eq!(responses[2]["id"], "r");
    assert!(!responses[2]["result"]["resources"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_lines_are_answered_and_serving_continues() {
    let input = concat!(
        "this is not json\n",
        r#"{"jsonrpc":"2.0","id":7}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":8,"method":"no/such"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#,
        "\n",
    );

    let responses = run(input).await;
    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[1]["id"], 7);
    assert_eq!(responses[1]["error"]["code"], -32600);
    assert_eq!(responses[2]["error"]["code"], -32601);
    assert_eq!(responses[3]["id"], 9);
    assert!(responses[3].get("error").is_none());
}

#[tokio::test]
async fn test_tool_failure_is_a_result_not_a_protocol_error() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"loyalteez_validate_webhook","arguments":{"payload":"{}","signature":"00","secret":"whsec_test"}}}"#,
        "\n",
    );

    let responses = run(input).await;
    assert_eq!(responses.len(), 1);
    assert!(responses[0].get("error").is_none());

    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    let body: Value = serde_json::from_str(text).unwrap();
    assert_eq!(body["valid"], false);
}
