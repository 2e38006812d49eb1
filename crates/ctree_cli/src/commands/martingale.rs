//! martingale subcommand: `m(N)` for multiplication trees of size N = 2^k.

use anyhow::{ensure, Result};
use ctree_engine::{martingale_lengths, operands, MulAlgorithm};

use crate::cli::AlgorithmArg;
use crate::config::CtConfig;

/// Largest k accepted; N = 2^k limb trees grow quickly beyond it.
pub const MAX_K: u32 = 12;

/// Largest limb martingale length of `algorithm` on `a0..a{n-1}` × `b0..b{n-1}`.
pub fn max_martingale(algorithm: MulAlgorithm, n: usize) -> Result<u64> {
    let limbs = algorithm.build(&operands("a", n), &operands("b", n))?;
    Ok(martingale_lengths(&limbs)?.into_iter().max().unwrap_or(0))
}

pub fn run(
    algorithm: AlgorithmArg,
    min_k: Option<u32>,
    max_k: Option<u32>,
    config: &CtConfig,
) -> Result<String> {
    let min_k = min_k.unwrap_or(config.min_k);
    let max_k = max_k.unwrap_or(config.max_k);
    ensure!(min_k <= max_k, "min-k ({}) is larger than max-k ({})", min_k, max_k);
    ensure!(max_k <= MAX_K, "max-k is limited to {}", MAX_K);

    let algorithms = algorithm.algorithms();
    let labelled = algorithms.len() > 1;
    let mut lines = Vec::new();
    for algorithm in algorithms {
        for k in min_k..=max_k {
            let n = 1usize << k;
            let m = max_martingale(algorithm, n)?;
            tracing::debug!(algorithm = %algorithm, n, m, "martingale sweep");
            if labelled {
                lines.push(format!("{} m({}) = {}", algorithm, n, m));
            } else {
                lines.push(format!("m({}) = {}", n, m));
            }
        }
    }
    Ok(lines.join("\n"))
}
