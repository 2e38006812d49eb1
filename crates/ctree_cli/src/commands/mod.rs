pub mod config;
pub mod eval;
pub mod limbs;
pub mod martingale;
