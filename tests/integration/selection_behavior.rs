use std::sync::Arc;

use smart_order_router::config::RoutingConfig;
use smart_order_router::models::pool::FeeTier;
use smart_order_router::models::route::TradeType;
use smart_order_router::models::tokens::Token;
use smart_order_router::services::selection::CandidatePoolSelector;

use crate::support::*;

fn selector_for(
    universe: Vec<smart_order_router::models::pool::SubgraphPool>,
    tokens: &[Token],
) -> CandidatePoolSelector {
    CandidatePoolSelector::new(
        Arc::new(MockSubgraph { pools: universe }),
        Arc::new(MockPoolStates),
        registry_with(tokens),
    )
}

/// The second-hop slice on the tokenOut side is seeded from the tokenIn
/// pools and reads endpoints relative to tokenOut, so it routinely lands
/// on tokenIn-touching pools. Deployed behavior; changing the seed set
/// changes routing output.
#[tokio::test]
async fn token_out_second_hops_are_seeded_from_token_in_pools() {
    let token_in = test_token(0x01, "INN");
    let mid = test_token(0x02, "MID");
    let token_out = test_token(0x03, "OUT");
    let q = test_token(0x04, "QQQ");
    let r = test_token(0x05, "RRR");
    let s = test_token(0x06, "SSS");

    let in_mid = universe_pool(&token_in, &mid, FeeTier::Low, 100.0);
    let mid_q = universe_pool(&mid, &q, FeeTier::Low, 90.0);
    let direct = universe_pool(&token_in, &token_out, FeeTier::Low, 80.0);
    let out_s = universe_pool(&token_out, &s, FeeTier::Low, 70.0);
    let in_r = universe_pool(&token_in, &r, FeeTier::Low, 50.0);
    let universe = vec![
        in_mid.clone(),
        mid_q.clone(),
        direct.clone(),
        out_s.clone(),
        in_r.clone(),
    ];

    let selector = selector_for(
        universe,
        &[
            token_in.clone(),
            mid.clone(),
            token_out.clone(),
            q,
            r,
            s,
        ],
    );
    let cfg = RoutingConfig {
        top_n: 0,
        top_n_token_in_out: 1,
        top_n_second_hop: 1,
        ..RoutingConfig::default()
    };
    let (_, selection) = selector
        .select(&token_in, &token_out, TradeType::ExactIn, &cfg, None)
        .await
        .expect("selection succeeds");

    assert_eq!(selection.top_direct.len(), 1);
    assert_eq!(selection.top_direct[0].id, direct.id);
    assert_eq!(selection.top_by_tvl_token_in[0].id, in_mid.id);
    assert_eq!(selection.top_by_tvl_token_out[0].id, out_s.id);
    // The tokenIn second hop walks IN -> MID and picks the MID/Q pool.
    assert_eq!(selection.token_in_second_hops.len(), 1);
    assert_eq!(selection.token_in_second_hops[0].id, mid_q.id);
    // The tokenOut second hop is ALSO seeded from the IN/MID pool; read
    // relative to tokenOut it lands back on a tokenIn-touching pool.
    assert_eq!(selection.token_out_second_hops.len(), 1);
    assert_eq!(selection.token_out_second_hops[0].id, in_r.id);
}

/// The bridge slice matches by address on EXACT_IN but by symbol on
/// EXACT_OUT; a foreign token that merely claims the wrapped-native symbol
/// is picked up only on the EXACT_OUT side.
#[tokio::test]
async fn bridge_slice_diverges_between_address_and_symbol_matching() {
    let token_in = test_token(0x01, "INN");
    let token_out = test_token(0x03, "OUT");
    let decoy = test_token(0x07, "WETH");

    let direct = universe_pool(&token_in, &token_out, FeeTier::Low, 100.0);
    let decoy_bridge = universe_pool(&decoy, &token_in, FeeTier::Low, 90.0);
    let universe = vec![direct, decoy_bridge.clone()];
    let tokens = [token_in.clone(), token_out.clone(), decoy];
    let cfg = RoutingConfig::default();

    let selector = selector_for(universe.clone(), &tokens);
    let (_, exact_in) = selector
        .select(&token_in, &token_out, TradeType::ExactIn, &cfg, None)
        .await
        .expect("selection succeeds");
    // By address the decoy does not pair the real wrapped native token.
    assert!(exact_in.top_native_quote.is_empty());

    let selector = selector_for(universe, &tokens);
    let (_, exact_out) = selector
        .select(&token_in, &token_out, TradeType::ExactOut, &cfg, None)
        .await
        .expect("selection succeeds");
    // By symbol it does.
    assert_eq!(exact_out.top_native_quote.len(), 1);
    assert_eq!(exact_out.top_native_quote[0].id, decoy_bridge.id);
}
