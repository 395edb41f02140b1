//! End-to-end agent cycle against an in-process ledger node
//!
//! Real ed25519 signer and JSON-RPC client; only the node is stubbed.

use serde_json::{json, Value};
use stabilizer_core::application::{
    CycleOutcome, CyclePhase, PolicyAgent, StabilizationEngine,
};
use stabilizer_core::domain::{RuleTables, SignedAction, NUMBER_AT_PEG};
use stabilizer_core::port::{ActionSigner, FixedRateProvider};
use stabilizer_core::AgentError;
use stabilizer_infra_crypto::{verify_action, AgentKeyPair, AgentPublicKey, Ed25519ActionSigner};
use stabilizer_infra_rpc::stub::StubLedgerNode;
use stabilizer_infra_rpc::{
    JsonRpcLedgerClient, RpcClient, GET_SUPPLY_METHOD, SUBMIT_ACTION_METHOD,
};
use std::sync::Arc;
use std::time::Duration;

const SEED: [u8; 32] = [11u8; 32];

/// Node answering the supply read with `coins`/`bonds` and accepting every action
async fn node(coins: f64, bonds: f64) -> StubLedgerNode {
    StubLedgerNode::start(move |request: &Value| {
        let body = match request["method"].as_str() {
            Some(GET_SUPPLY_METHOD) => {
                json!({"id": 0, "result": {"coin": coins, "bond": bonds}, "error": null})
            }
            Some(SUBMIT_ACTION_METHOD) => json!({"id": 0, "result": "0xfeed", "error": null}),
            _ => json!({
                "id": 0,
                "result": null,
                "error": {"code": -32601, "message": "method not found"}
            }),
        };
        (200, body.to_string())
    })
    .await
    .unwrap()
}

fn agent(node: &StubLedgerNode, rate: f64) -> PolicyAgent {
    let signer = Ed25519ActionSigner::new(AgentKeyPair::from_seed(&SEED));
    let agent_id = signer.agent_id().to_string();
    let rpc = RpcClient::new(node.url(), Duration::from_secs(5)).unwrap();

    PolicyAgent::new(
        StabilizationEngine::new(Arc::new(RuleTables::default())),
        Arc::new(JsonRpcLedgerClient::new(rpc)),
        Arc::new(FixedRateProvider::new(rate)),
        Arc::new(signer),
        vec![agent_id],
    )
}

fn submitted_action(node: &StubLedgerNode) -> SignedAction {
    let requests = node.requests();
    let submit = requests
        .iter()
        .find(|r| r["method"] == SUBMIT_ACTION_METHOD)
        .expect("no submission recorded");
    serde_json::from_value(submit["params"][0].clone()).unwrap()
}

#[tokio::test]
async fn test_expansion_cycle_end_to_end() {
    let node = node(100.0, 0.0).await;
    let agent = agent(&node, 1.25);

    let outcome = agent.run_cycle().await.unwrap();

    match outcome {
        CycleOutcome::Submitted { tx_hash, .. } => assert_eq!(tx_hash, "0xfeed"),
        other => panic!("expected submission, got {:?}", other),
    }

    let requests = node.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], json!({"method": GET_SUPPLY_METHOD, "params": null, "id": 0}));

    let action = submitted_action(&node);
    assert_eq!(action.action().num_of_coins, 30.0);
    assert_eq!(action.action().num_of_bonds, 0.0);
    assert_eq!(action.action().tax, 0.0);

    let public_key = AgentPublicKey::from_base64(action.agent_id()).unwrap();
    assert!(verify_action(&action, &public_key).is_ok());
}

#[tokio::test]
async fn test_contraction_cycle_end_to_end() {
    let node = node(100.0, 0.0).await;
    let agent = agent(&node, 0.75);

    agent.run_cycle().await.unwrap();

    let action = submitted_action(&node);
    assert_eq!(action.action().num_of_coins, 0.0);
    assert_eq!(action.action().num_of_bonds, NUMBER_AT_PEG);
    assert_eq!(action.action().tax, 75.0);
    let public_key = AgentKeyPair::from_seed(&SEED).public_key();
    assert!(verify_action(&action, &public_key).is_ok());
}

#[tokio::test]
async fn test_noop_cycle_sends_only_the_read() {
    let node = node(100.0, 30.0).await;
    let agent = agent(&node, 1.25);

    let outcome = agent.run_cycle().await.unwrap();

    assert!(matches!(outcome, CycleOutcome::NoOp { .. }));
    let requests = node.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["method"], GET_SUPPLY_METHOD);
}

#[tokio::test]
async fn test_out_of_table_rate_never_submits() {
    let node = node(100.0, 0.0).await;
    let agent = agent(&node, 1.0);

    let failure = agent.run_cycle().await.unwrap_err();

    assert_eq!(failure.phase, CyclePhase::Deciding);
    assert!(matches!(failure.error, AgentError::Decision(_)));
    assert_eq!(node.requests().len(), 1);
}

#[tokio::test]
async fn test_rejected_action_surfaces_domain_error() {
    let node = StubLedgerNode::start(|request: &Value| {
        let body = if request["method"] == GET_SUPPLY_METHOD {
            json!({"id": 0, "result": {"coin": 100.0, "bond": 0.0}, "error": null})
        } else {
            json!({"id": 0, "result": null, "error": {"code": -5, "message": "agent not eligible"}})
        };
        (200, body.to_string())
    })
    .await
    .unwrap();
    let agent = agent(&node, 1.25);

    let failure = agent.run_cycle().await.unwrap_err();

    assert_eq!(failure.phase, CyclePhase::Submitting);
    match failure.error {
        AgentError::Rpc { code, message } => {
            assert_eq!(code, -5);
            assert_eq!(message, "agent not eligible");
        }
        other => panic!("expected RPC error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_supply_is_decode_error() {
    let node = StubLedgerNode::start(|_: &Value| (200, "not json".to_string()))
        .await
        .unwrap();
    let agent = agent(&node, 1.25);

    let failure = agent.run_cycle().await.unwrap_err();

    assert_eq!(failure.phase, CyclePhase::Fetching);
    assert!(matches!(failure.error, AgentError::Decode(_)));
}
