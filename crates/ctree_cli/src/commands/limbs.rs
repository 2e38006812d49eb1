//! limbs subcommand: the limb trees of one multiplication, with their
//! martingale lengths.

use anyhow::Result;
use ctree_engine::{martingale_lengths, operands};

use crate::cli::AlgorithmArg;

pub fn run(algorithm: AlgorithmArg, n: usize) -> Result<String> {
    let algorithms = algorithm.algorithms();
    let labelled = algorithms.len() > 1;
    let mut lines = Vec::new();
    for algorithm in algorithms {
        let limbs = algorithm.build(&operands("a", n), &operands("b", n))?;
        if labelled {
            lines.push(format!("# {}", algorithm));
        }
        let lengths = martingale_lengths(&limbs)?;
        for (p, (limb, m)) in limbs.iter().zip(lengths).enumerate() {
            lines.push(format!("[{}] m = {}: {}", p, m, limb));
        }
    }
    Ok(lines.join("\n"))
}
