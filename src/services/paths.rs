use tracing::debug;

use crate::models::pool::Pool;
use crate::models::route::Route;
use crate::models::tokens::Token;

/// All simple paths from `token_in` to `token_out` over `pools`, at most
/// `max_hops` pools long. A route is emitted each time the walk lands on
/// `token_out`, and the search keeps extending past it up to the hop
/// budget; pools are never reused within a path.
pub fn compute_all_routes(
    token_in: &Token,
    token_out: &Token,
    pools: &[Pool],
    max_hops: usize,
) -> Vec<Route> {
    let mut routes = Vec::new();
    let mut used = vec![false; pools.len()];
    let mut current: Vec<usize> = Vec::with_capacity(max_hops);
    walk(
        token_in,
        token_out,
        pools,
        max_hops,
        token_in,
        &mut used,
        &mut current,
        &mut routes,
    );
    debug!(
        routes = routes.len(),
        pools = pools.len(),
        max_hops,
        "Enumerated candidate routes"
    );
    routes
}

#[allow(clippy::too_many_arguments)]
fn walk(
    token_in: &Token,
    token_out: &Token,
    pools: &[Pool],
    max_hops: usize,
    previous_token_out: &Token,
    used: &mut Vec<bool>,
    current: &mut Vec<usize>,
    routes: &mut Vec<Route>,
) {
    if current.len() > max_hops {
        return;
    }
    if !current.is_empty() && previous_token_out == token_out {
        let chain: Vec<Pool> = current.iter().map(|&index| pools[index].clone()).collect();
        if let Some(route) = Route::new(chain, token_in.clone(), token_out.clone()) {
            routes.push(route);
        }
        // No early return: the path may pass through the output token and
        // close back on it within the hop budget.
    }
    for index in 0..pools.len() {
        if used[index] {
            continue;
        }
        let pool = &pools[index];
        let Some(next_token_out) = pool.counterparty(previous_token_out) else {
            continue;
        };
        let next_token_out = next_token_out.clone();
        used[index] = true;
        current.push(index);
        walk(
            token_in,
            token_out,
            pools,
            max_hops,
            &next_token_out,
            used,
            current,
            routes,
        );
        current.pop();
        used[index] = false;
    }
}
