//! Command-line arguments: top-level `Cli` and the `Commands` enum.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use ctree_engine::MulAlgorithm;
use num_rational::BigRational;

#[derive(Parser, Debug)]
#[command(name = "ctree")]
#[command(about = "Martingale length and condition-number analysis of compute trees")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate one s-expression and print m, v and K
    Eval {
        /// Tree such as "(* (+ x 8) (- x 2))"
        expr: String,

        /// Bind a variable for numeric instantiation (repeatable), e.g. --at x=-2.999
        #[arg(long = "at", value_name = "NAME=VALUE", value_parser = parse_binding)]
        bindings: Vec<(String, BigRational)>,

        /// Skip the symbolic condition bound
        #[arg(long)]
        no_condition: bool,
    },

    /// Largest limb martingale length of multiplication trees for N = 2^k
    Martingale {
        #[arg(long, value_enum, default_value_t = AlgorithmArg::Karatsuba)]
        algorithm: AlgorithmArg,

        /// Smallest k (defaults to the config value)
        #[arg(long)]
        min_k: Option<u32>,

        /// Largest k (defaults to the config value)
        #[arg(long)]
        max_k: Option<u32>,
    },

    /// Print every limb of a multiplication tree with its martingale length
    Limbs {
        #[arg(long, value_enum, default_value_t = AlgorithmArg::Karatsuba)]
        algorithm: AlgorithmArg,

        /// Operand length (a power of two)
        #[arg(short, long, default_value_t = 4)]
        n: usize,
    },

    /// Interactive evaluation loop
    Repl,

    /// Show the configuration, or reset it to defaults
    Config {
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    Karatsuba,
    Naive,
    Both,
}

impl AlgorithmArg {
    pub fn algorithms(self) -> Vec<MulAlgorithm> {
        match self {
            AlgorithmArg::Karatsuba => vec![MulAlgorithm::Karatsuba],
            AlgorithmArg::Naive => vec![MulAlgorithm::Naive],
            AlgorithmArg::Both => vec![MulAlgorithm::Karatsuba, MulAlgorithm::Naive],
        }
    }
}

/// `name=value` with an exact numeric literal on the right.
pub fn parse_binding(s: &str) -> Result<(String, BigRational), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }
    let value = ctree_parser::parse_number_literal(value.trim()).map_err(|e| e.to_string())?;
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_parse_binding() {
        assert_eq!(
            parse_binding("x=-2.999"),
            Ok(("x".to_string(), rat(-2999, 1000)))
        );
        assert_eq!(parse_binding(" y = 1/3 "), Ok(("y".to_string(), rat(1, 3))));
        assert!(parse_binding("x").is_err());
        assert!(parse_binding("=3").is_err());
        assert!(parse_binding("x=abc").is_err());
    }

    #[test]
    fn test_cli_parses_repeated_bindings() {
        let cli = Cli::try_parse_from(["ctree", "eval", "(+ x y)", "--at", "x=1", "--at", "y=2"])
            .unwrap();
        match cli.command {
            Commands::Eval { bindings, .. } => assert_eq!(bindings.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
