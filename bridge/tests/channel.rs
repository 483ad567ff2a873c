//! End-to-end runs of the framed stdio channel with no engine installed.

use std::time::Duration;

use bridge::host::Host;
use bridge::resolver::MoveResolver;
use bridge::session::{Session, INITIAL_POSITION};
use engine::{EngineConnection, EngineLocator, EngineSettings};
use serde_json::{json, Value};

fn offline_host() -> Host {
    let settings = EngineSettings {
        settle_delay: Duration::ZERO,
        ..EngineSettings::default()
    };
    let engine = EngineConnection::new(EngineLocator::new(Vec::new()), settings);
    Host::new(Session::new(Vec::new()), MoveResolver::standard(engine, None))
}

fn frame(value: &Value) -> Vec<u8> {
    let payload = serde_json::to_vec(value).unwrap();
    let mut bytes = (payload.len() as u32).to_le_bytes().to_vec();
    bytes.extend(payload);
    bytes
}

fn raw_frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = (payload.len() as u32).to_le_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

fn responses(mut output: &[u8]) -> Vec<Value> {
    let mut values = Vec::new();
    while output.len() >= 4 {
        let len = u32::from_le_bytes([output[0], output[1], output[2], output[3]]) as usize;
        values.push(serde_json::from_slice(&output[4..4 + len]).unwrap());
        output = &output[4 + len..];
    }
    assert!(output.is_empty(), "trailing bytes in output");
    values
}

async fn exchange(host: &mut Host, input: Vec<u8>) -> Vec<Value> {
    let mut reader = input.as_slice();
    let mut output = Vec::new();
    host.run(&mut reader, &mut output).await.unwrap();
    responses(&output)
}

#[tokio::test]
async fn best_move_without_engine_returns_move_token() {
    let mut host = offline_host();
    let input = frame(&json!({
        "command": "get_best_move",
        "opponent_move": "12-16",
        "game_history": []
    }));

    let replies = exchange(&mut host, input).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["type"], "best_move");
    let mv = replies[0]["move"].as_str().unwrap();
    assert!(!mv.is_empty());
    assert!(draughts::is_move_token(mv));
    assert_eq!(replies[0]["confidence"], 0.8);
    assert_eq!(replies[0]["depth"], 12);
}

#[tokio::test]
async fn zero_length_frame_ends_loop() {
    let mut host = offline_host();
    let mut input = 0u32.to_le_bytes().to_vec();
    input.extend(frame(&json!({"command": "initialize"})));

    let replies = exchange(&mut host, input).await;
    assert!(replies.is_empty());
}

#[tokio::test]
async fn new_game_resets_session() {
    let mut host = offline_host();
    let mut input = frame(&json!({
        "command": "get_best_move",
        "opponent_move": "22-18",
        "game_history": ["11-15"]
    }));
    input.extend(frame(&json!({"command": "new_game"})));

    let replies = exchange(&mut host, input).await;
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[1], json!({"type": "status", "status": "game_reset"}));
    assert!(host.session().history().is_empty());
    assert_eq!(host.session().position(), INITIAL_POSITION);
}

#[tokio::test]
async fn unknown_command_gets_error_and_loop_continues() {
    let mut host = offline_host();
    let mut input = frame(&json!({"command": "resign"}));
    input.extend(raw_frame(b"{broken json"));
    input.extend(frame(&json!({"command": "initialize"})));

    let replies = exchange(&mut host, input).await;
    assert_eq!(
        replies,
        vec![
            json!({"type": "error", "message": "Unknown command: resign"}),
            json!({
                "type": "status",
                "status": "initialized",
                "version": "2.0",
                "kingsrow_available": false
            }),
        ]
    );
}

#[tokio::test]
async fn analyze_position_reports_position() {
    let mut host = offline_host();
    let input = frame(&json!({"command": "analyze_position", "position": "W:W21,22:B1,2"}));

    let replies = exchange(&mut host, input).await;
    assert_eq!(replies[0]["type"], "analysis");
    assert_eq!(replies[0]["position"], "W:W21,22:B1,2");
    assert_eq!(replies[0]["evaluation"], "Analysis complete");
    assert!(draughts::is_move_token(replies[0]["best_move"].as_str().unwrap()));
}

#[tokio::test]
async fn truncated_frame_ends_loop_cleanly() {
    let mut host = offline_host();
    let mut input = frame(&json!({"command": "initialize"}));
    input.extend(50u32.to_le_bytes());
    input.extend_from_slice(b"{\"command\"");

    let replies = exchange(&mut host, input).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["status"], "initialized");
}
