use std::collections::HashSet;

use num_bigint::{BigInt, BigUint};

use smart_order_router::config::RoutingConfig;
use smart_order_router::errors::RouterErrorKind;
use smart_order_router::models::pool::FeeTier;
use smart_order_router::models::route::{SwapPlan, TradeType};
use smart_order_router::models::tokens::Currency;
use smart_order_router::services::router::SwapRouter;
use smart_order_router::services::selection::CandidatePoolSelector;

use crate::support::*;

fn erc20(token: &smart_order_router::models::tokens::Token) -> Currency {
    Currency::Erc20(token.clone())
}

/// The aggregate invariants every emitted plan must satisfy: percentages
/// cover the trade, totals equal component sums and components never share
/// a pool.
fn assert_plan_invariants(plan: &SwapPlan) {
    let percent_total: u32 = plan
        .route_amounts
        .iter()
        .map(|component| component.percent)
        .sum();
    assert_eq!(percent_total, 100);

    let quote_total: BigUint = plan
        .route_amounts
        .iter()
        .map(|component| component.quote.clone())
        .sum();
    assert_eq!(plan.quote, quote_total);

    let adjusted_total: BigInt = plan
        .route_amounts
        .iter()
        .map(|component| component.quote_gas_adjusted.clone())
        .sum();
    assert_eq!(plan.quote_gas_adjusted, adjusted_total);

    let gas_total: u64 = plan
        .route_amounts
        .iter()
        .map(|component| component.gas_estimate)
        .sum();
    assert_eq!(plan.estimated_gas_used, gas_total);

    let mut used = HashSet::new();
    for component in &plan.route_amounts {
        assert!(
            component.route.disjoint_from(&used),
            "plan components share a pool"
        );
        used.extend(component.route.pool_addresses());
    }

    for window in plan.route_amounts.windows(2) {
        assert!(window[0].percent >= window[1].percent);
    }
}

#[tokio::test]
async fn trivial_direct_swap_routes_at_full_size() {
    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let registry = registry_with(&[a.clone(), b.clone()]);
    let universe = vec![universe_pool(&a, &b, FeeTier::Low, 1_000.0)];

    let router = build_router(
        universe,
        registry,
        Box::new(|_route, amount| Some(linear_rate(amount, 99))),
        0,
        RoutingConfig::default(),
    );

    let amount = BigUint::from(1_000_000u64);
    let plan = router
        .route(erc20(&a), erc20(&b), amount.clone(), TradeType::ExactIn)
        .await
        .expect("routing succeeds")
        .expect("plan exists");

    assert_plan_invariants(&plan);
    assert_eq!(plan.route_amounts.len(), 1);
    assert_eq!(plan.route_amounts[0].percent, 100);
    assert_eq!(plan.route_amounts[0].route.pools.len(), 1);
    assert_eq!(plan.quote, linear_rate(&amount, 99));
    assert_eq!(plan.block_number, TEST_BLOCK);
}

#[tokio::test]
async fn disconnected_pair_yields_no_plan() {
    let a = test_token(0x11, "AAA");
    let x = test_token(0x13, "XXX");
    let y = test_token(0x14, "YYY");
    let b = test_token(0x12, "BBB");
    let registry = registry_with(&[a.clone(), x.clone(), y.clone(), b.clone()]);
    let universe = vec![
        universe_pool(&a, &x, FeeTier::Low, 1_000.0),
        universe_pool(&y, &b, FeeTier::Low, 1_000.0),
    ];

    let router = build_router(
        universe,
        registry,
        Box::new(|_route, amount| Some(linear_rate(amount, 99))),
        0,
        RoutingConfig::default(),
    );

    let plan = router
        .route(
            erc20(&a),
            erc20(&b),
            BigUint::from(1_000_000u64),
            TradeType::ExactIn,
        )
        .await
        .expect("routing succeeds");
    assert!(plan.is_none());
}

#[tokio::test]
async fn two_hop_route_beats_thin_direct_pool_gas_adjusted() {
    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let usdc = test_token(0x15, "USDC");
    let weth = smart_order_router::models::tokens::wrapped_native(1).expect("weth");
    let registry = registry_with(&[a.clone(), b.clone(), usdc.clone()]);
    let universe = vec![
        universe_pool(&a, &b, FeeTier::High, 10.0),
        universe_pool(&a, &usdc, FeeTier::Low, 900_000.0),
        universe_pool(&usdc, &b, FeeTier::Low, 800_000.0),
        // Bridge pricing native gas in the quote token.
        universe_pool(&weth, &b, FeeTier::Low, 700_000.0),
    ];

    let router = build_router(
        universe,
        registry,
        Box::new(|route, amount| {
            if route.pools.len() == 1 && route.pools[0].fee == FeeTier::High {
                Some(linear_rate(amount, 90))
            } else if route.pools.len() == 2 {
                Some(linear_rate(amount, 99))
            } else {
                // Any other route shape loses outright.
                Some(linear_rate(amount, 1))
            }
        }),
        1,
        RoutingConfig::default(),
    );

    let amount = BigUint::from(1_000_000_000u64);
    let plan = router
        .route(erc20(&a), erc20(&b), amount.clone(), TradeType::ExactIn)
        .await
        .expect("routing succeeds")
        .expect("plan exists");

    assert_plan_invariants(&plan);
    assert_eq!(plan.route_amounts.len(), 1);
    assert_eq!(plan.route_amounts[0].percent, 100);
    assert_eq!(plan.route_amounts[0].route.pools.len(), 2);
    assert_eq!(plan.quote, BigUint::from(990_000_000u64));
    // One extra hop costs 80k gas on top of the quoter's 100k; at 1 wei
    // gas and a 1:1 bridge price the adjustment is exact.
    assert_eq!(plan.estimated_gas_used, 180_000);
    assert_eq!(plan.quote_gas_adjusted, BigInt::from(989_820_000u64));
}

#[tokio::test]
async fn slippage_past_half_size_forces_an_even_split() {
    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let x = test_token(0x13, "XXX");
    let registry = registry_with(&[a.clone(), b.clone(), x.clone()]);
    let universe = vec![
        universe_pool(&a, &b, FeeTier::Low, 500_000.0),
        universe_pool(&a, &x, FeeTier::Low, 400_000.0),
        universe_pool(&x, &b, FeeTier::Low, 300_000.0),
    ];

    let total = BigUint::from(1_000_000u64);
    let threshold = total.clone();
    let router = build_router(
        universe,
        registry,
        Box::new(move |route, amount| {
            if route.pools.len() == 1 {
                // Profitable to half size, then slippage dominates.
                if amount * 2u8 <= threshold {
                    Some(linear_rate(amount, 99))
                } else {
                    Some(linear_rate(amount, 80))
                }
            } else {
                Some(linear_rate(amount, 95))
            }
        }),
        0,
        RoutingConfig::default(),
    );

    let plan = router
        .route(erc20(&a), erc20(&b), total, TradeType::ExactIn)
        .await
        .expect("routing succeeds")
        .expect("plan exists");

    assert_plan_invariants(&plan);
    assert_eq!(plan.route_amounts.len(), 2);
    assert_eq!(plan.route_amounts[0].percent, 50);
    assert_eq!(plan.route_amounts[1].percent, 50);
    // 99% of one half plus 95% of the other.
    assert_eq!(plan.quote, BigUint::from(970_000u64));
}

#[tokio::test]
async fn quadratic_slippage_rewards_a_three_way_split() {
    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let registry = registry_with(&[a.clone(), b.clone()]);
    // Three parallel fee tiers of the same pair: pool-disjoint direct routes.
    let universe = vec![
        universe_pool(&a, &b, FeeTier::Lowest, 500_000.0),
        universe_pool(&a, &b, FeeTier::Low, 400_000.0),
        universe_pool(&a, &b, FeeTier::Medium, 300_000.0),
    ];

    let total = BigUint::from(1_000_000u64);
    let depth = total.clone();
    let router = build_router(
        universe,
        registry,
        Box::new(move |_route, amount| {
            // out = a - a² / (2·total): constant-product style slippage.
            Some(amount - amount * amount / (&depth * 2u8))
        }),
        0,
        RoutingConfig::default(),
    );

    let plan = router
        .route(erc20(&a), erc20(&b), total, TradeType::ExactIn)
        .await
        .expect("routing succeeds")
        .expect("plan exists");

    assert_plan_invariants(&plan);
    assert_eq!(plan.route_amounts.len(), 3);
    // Best reachable composition at 5% granularity is 35/35/30.
    assert_eq!(plan.quote, BigUint::from(832_500u64));
}

#[tokio::test]
async fn four_way_split_configuration_is_fatal() {
    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let registry = registry_with(&[a.clone(), b.clone()]);
    let universe = vec![universe_pool(&a, &b, FeeTier::Low, 1_000.0)];

    let router = build_router(
        universe,
        registry,
        Box::new(|_route, amount| Some(linear_rate(amount, 99))),
        0,
        RoutingConfig {
            max_splits: 4,
            ..RoutingConfig::default()
        },
    );

    let err = router
        .route(
            erc20(&a),
            erc20(&b),
            BigUint::from(1_000_000u64),
            TradeType::ExactIn,
        )
        .await
        .expect_err("fatal configuration");
    assert_eq!(err.kind(), RouterErrorKind::ConfigInvalid);
}

#[tokio::test]
async fn invalid_quotes_are_dropped_and_the_rest_compose() {
    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let registry = registry_with(&[a.clone(), b.clone()]);
    let universe = vec![
        universe_pool(&a, &b, FeeTier::Low, 500_000.0),
        universe_pool(&a, &b, FeeTier::Medium, 400_000.0),
    ];

    let total = BigUint::from(1_000_000u64);
    let reference = total.clone();
    let router = build_router(
        universe,
        registry,
        Box::new(move |route, amount| {
            let percent = u32::try_from(amount * 100u8 / &reference).expect("fits u32");
            // Roughly a third of all calls revert, deterministically: the
            // low-fee pool drops multiples of 3, the medium pool multiples
            // of 4 (including its 100% slot).
            let reverted = match route.pools[0].fee {
                FeeTier::Low => percent % 3 == 0,
                _ => percent % 4 == 0,
            };
            if reverted {
                None
            } else {
                Some(linear_rate(amount, 98))
            }
        }),
        0,
        RoutingConfig::default(),
    );

    let plan = router
        .route(erc20(&a), erc20(&b), total, TradeType::ExactIn)
        .await
        .expect("routing succeeds")
        .expect("plan exists");

    assert_plan_invariants(&plan);
    // The 100% baseline can only come from the low-fee pool.
    assert_eq!(plan.route_amounts[0].route.pools[0].fee, FeeTier::Low);
}

#[tokio::test]
async fn gas_oracle_failure_is_fatal() {
    use std::sync::Arc;

    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let registry = registry_with(&[a.clone(), b.clone()]);
    let universe = vec![universe_pool(&a, &b, FeeTier::Low, 1_000.0)];

    let selector = CandidatePoolSelector::new(
        Arc::new(MockSubgraph { pools: universe }),
        Arc::new(MockPoolStates),
        registry,
    );
    let router = SwapRouter::new(
        1,
        selector,
        Arc::new(ScriptedQuoter {
            quote_fn: Box::new(|_route, amount| Some(linear_rate(amount, 99))),
        }),
        Arc::new(FailingGasOracle),
        RoutingConfig::default(),
    );

    let err = router
        .route(
            erc20(&a),
            erc20(&b),
            BigUint::from(1_000_000u64),
            TradeType::ExactIn,
        )
        .await
        .expect_err("gas oracle offline");
    assert_eq!(err.kind(), RouterErrorKind::GasPriceUnavailable);
}

#[tokio::test]
async fn exact_out_plan_minimises_input() {
    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let registry = registry_with(&[a.clone(), b.clone()]);
    let universe = vec![
        universe_pool(&a, &b, FeeTier::Low, 500_000.0),
        universe_pool(&a, &b, FeeTier::Medium, 400_000.0),
    ];

    let router = build_router(
        universe,
        registry,
        Box::new(|route, amount| {
            // Required input for the requested output; the medium pool is
            // strictly worse.
            match route.pools[0].fee {
                FeeTier::Low => Some(linear_rate(amount, 101)),
                _ => Some(linear_rate(amount, 105)),
            }
        }),
        0,
        RoutingConfig::default(),
    );

    let amount_out = BigUint::from(1_000_000u64);
    let plan = router
        .route(erc20(&a), erc20(&b), amount_out, TradeType::ExactOut)
        .await
        .expect("routing succeeds")
        .expect("plan exists");

    assert_plan_invariants(&plan);
    assert_eq!(plan.route_amounts.len(), 1);
    assert_eq!(plan.route_amounts[0].route.pools[0].fee, FeeTier::Low);
    assert_eq!(plan.quote, BigUint::from(1_010_000u64));
}
