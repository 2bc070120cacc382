use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::{DynProvider, ProviderBuilder},
    rpc::client::RpcClient,
};
use serde_json::json;
use url::Url;
use vault_sdk::{
    error::{GasError, SimulationFailure},
    gas::{
        GasEstimator, GasPriceCache, GasTier, ProviderSimulator,
        fetcher::{PriorityFeeRpc, TieredGasOracle},
    },
    planner::TxPlanner,
    testing::{ScriptedFetcher, ScriptedSimulator},
    types::{GasLimitRequest, GasQuote, TxOverrides},
};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

fn gas_oracle_response(slow: &str, propose: &str, fast: &str) -> serde_json::Value {
    json!({
        "status": "1",
        "message": "OK",
        "result": {
            "LastBlock": "21000000",
            "SafeGasPrice": slow,
            "SlowGasPrice": slow,
            "ProposeGasPrice": propose,
            "FastGasPrice": fast,
            "suggestBaseFee": "8.1",
            "gasUsedRatio": "0.5",
        }
    })
}

/// JSON-RPC node answering `eth_estimateGas` with `outcome`, echoing the
/// request id.
async fn estimate_gas_node(outcome: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_estimateGas" })))
        .respond_with(move |request: &Request| {
            let body: serde_json::Value = request.body_json().unwrap();
            let mut response = json!({ "jsonrpc": "2.0", "id": body["id"] });
            for (key, value) in outcome.as_object().unwrap() {
                response[key] = value.clone();
            }
            ResponseTemplate::new(200).set_body_json(response)
        })
        .mount(&server)
        .await;
    server
}

fn estimator_for(server: &MockServer) -> GasEstimator<ProviderSimulator<DynProvider>> {
    let client = RpcClient::new_http(Url::parse(&server.uri()).unwrap());
    GasEstimator::new(ProviderSimulator::new(DynProvider::new(
        ProviderBuilder::new().connect_client(client),
    )))
}

fn harvest_request() -> GasLimitRequest {
    GasLimitRequest::new(
        Address::repeat_byte(0x11),
        "harvest()",
        Bytes::from_static(&[0x4e, 0x71, 0xd9, 0x2d]),
    )
    .with_caller(Address::repeat_byte(0x22))
    .with_value(U256::from(5))
}

/// Node estimate is buffered and the call context reaches the node.
#[tokio::test]
async fn test_node_estimate_gas() {
    let server = estimate_gas_node(json!({ "result": "0x186a0" })).await;
    let estimator = estimator_for(&server);

    assert_eq!(estimator.estimate(&harvest_request()).await.unwrap(), 120_000);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests
        .iter()
        .map(|r| r.body_json::<serde_json::Value>().unwrap())
        .find(|b| b["method"] == "eth_estimateGas")
        .unwrap();
    let tx = &body["params"][0];
    assert_eq!(tx["to"], json!(format!("{}", Address::repeat_byte(0x11))));
    assert_eq!(tx["from"], json!(format!("{}", Address::repeat_byte(0x22))));
    assert_eq!(tx["value"], json!("0x5"));
    assert_eq!(
        tx.get("input").or_else(|| tx.get("data")),
        Some(&json!("0x4e71d92d"))
    );
}

/// A reverting call falls back to the manual override, or fails with the
/// revert reason without one.
#[tokio::test]
async fn test_node_estimate_gas_reverted() {
    let server = estimate_gas_node(json!({
        "error": { "code": 3, "message": "execution reverted: paused", "data": "0x" }
    }))
    .await;
    let estimator = estimator_for(&server);

    assert_eq!(
        estimator
            .estimate(&harvest_request().with_manual_override(200_000))
            .await
            .unwrap(),
        200_000
    );

    match estimator.estimate(&harvest_request()).await {
        Err(GasError::Estimation { method, failure }) => {
            assert_eq!(method, "harvest()");
            assert_eq!(
                failure,
                SimulationFailure::Reverted("execution reverted: paused".to_string())
            );
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Priority fee served by a node is fetched once per validity window.
#[tokio::test]
async fn test_priority_fee_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_maxPriorityFeePerGas" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x77359400" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = GasPriceCache::new(PriorityFeeRpc::node(Url::parse(&server.uri()).unwrap()));
    for _ in 0..3 {
        assert_eq!(
            cache.get_price().await.unwrap(),
            GasQuote::priority_fee(2_000_000_000)
        );
    }
    assert!(cache.is_valid());
}

/// Switching the tier and purging picks the matching tier on the next fetch.
#[tokio::test]
async fn test_tier_switch_with_purge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("module", "gastracker"))
        .and(query_param("action", "gasoracle"))
        .and(query_param("apikey", "test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gas_oracle_response("10", "20", "30")),
        )
        .expect(3)
        .mount(&server)
        .await;

    let cache = GasPriceCache::new(TieredGasOracle::with_endpoint(
        format!("{}/api", server.uri()),
        Some("test-key".to_string()),
        GasTier::default(),
    ));
    assert_eq!(
        cache.get_price().await.unwrap(),
        GasQuote::legacy(30_000_000_000)
    );

    // Without a purge the cached fast price is still served
    cache.fetcher().set_tier(GasTier::Slow);
    assert_eq!(
        cache.get_price().await.unwrap(),
        GasQuote::legacy(30_000_000_000)
    );

    cache.purge();
    assert_eq!(
        cache.get_price().await.unwrap(),
        GasQuote::legacy(10_000_000_000)
    );

    cache.fetcher().set_tier(GasTier::Average);
    cache.refresh().await.unwrap();
    assert_eq!(
        cache.get_price().await.unwrap(),
        GasQuote::legacy(20_000_000_000)
    );
}

#[tokio::test]
async fn test_upstream_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key",
        })))
        .mount(&server)
        .await;

    let node = GasPriceCache::new(PriorityFeeRpc::node(
        Url::parse(&format!("{}/broken", server.uri())).unwrap(),
    ));
    assert!(matches!(
        node.get_price().await,
        Err(GasError::UpstreamFetch { source_name: "node", .. })
    ));
    assert!(!node.is_valid());

    let etherscan = GasPriceCache::new(TieredGasOracle::with_endpoint(
        format!("{}/api", server.uri()),
        Some("bad-key".to_string()),
        GasTier::Fast,
    ));
    match etherscan.get_price().await {
        Err(GasError::UpstreamFetch {
            source_name,
            reason,
        }) => {
            assert_eq!(source_name, "etherscan");
            assert!(reason.contains("Invalid API Key"));
            assert!(!reason.contains("bad-key"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Concurrent readers of a stale cache share one upstream request.
#[tokio::test]
async fn test_concurrent_readers_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x3b9aca00" }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(GasPriceCache::new(PriorityFeeRpc::node(
        Url::parse(&server.uri()).unwrap(),
    )));
    let readers = (0..8).map(|_| {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_price().await })
    });
    for result in futures::future::join_all(readers).await {
        assert_eq!(
            result.unwrap().unwrap(),
            GasQuote::priority_fee(1_000_000_000)
        );
    }
}

/// Quote expiry and estimate fallback observed through the planner.
#[tokio::test(start_paused = true)]
async fn test_planner_over_time() {
    let cache = Arc::new(GasPriceCache::new(ScriptedFetcher::new(GasQuote::legacy(
        25_000_000_000,
    ))));
    let planner = TxPlanner::new(
        cache.clone(),
        GasEstimator::new(ScriptedSimulator::failing(SimulationFailure::Reverted(
            "execution reverted".to_string(),
        ))),
    );
    let request = GasLimitRequest::new(Address::repeat_byte(0xaa), "harvest()", vec![0x4e, 0x71])
        .with_value(U256::from(1))
        .with_manual_override(300_000);

    let tx = planner
        .prepare(&request, TxOverrides::default())
        .await
        .unwrap();
    assert_eq!(tx.gas, Some(300_000));
    assert_eq!(tx.gas_price, Some(25_000_000_000));
    assert_eq!(tx.value, Some(U256::from(1)));

    cache.fetcher().set_quote(GasQuote::legacy(40_000_000_000));
    tokio::time::advance(Duration::from_millis(9_999)).await;
    let tx = planner
        .prepare(&request, TxOverrides::default())
        .await
        .unwrap();
    assert_eq!(tx.gas_price, Some(25_000_000_000));

    tokio::time::advance(Duration::from_millis(1)).await;
    let tx = planner
        .prepare(&request, TxOverrides::default())
        .await
        .unwrap();
    assert_eq!(tx.gas_price, Some(40_000_000_000));
    assert_eq!(cache.fetcher().calls(), 2);
    assert_eq!(planner.estimator().simulator().calls(), 3);
}
