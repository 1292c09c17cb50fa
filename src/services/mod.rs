pub mod amounts;
pub mod chain;
pub mod gas;
pub mod multicall;
pub mod paths;
pub mod pool_provider;
pub mod router;
pub mod selection;
pub mod split;
pub mod subgraph;
