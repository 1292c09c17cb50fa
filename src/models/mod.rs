pub mod messages;
pub mod pool;
pub mod route;
pub mod state;
pub mod tokens;
