use ctree_engine::{EvalOptions, Evaluator};
use ctree_math::Point;
use rustyline::error::ReadlineError;

use crate::cli::parse_binding;
use crate::commands::eval::{format_point, render};
use crate::completer::CtreeHelper;
use crate::config::CtConfig;

const HELP: &str = "\
Enter a compute tree as an s-expression, e.g. (- (* x x) 1)
Commands:
  at NAME=VALUE ...   bind variables for numeric instantiation (bare 'at' clears)
  condition on|off    toggle the symbolic condition bound
  help                show this message
  quit | exit         leave the loop";

pub struct Repl {
    options: EvalOptions,
    point: Point,
}

impl Repl {
    pub fn new(config: &CtConfig) -> Self {
        Self {
            options: config.eval_options(),
            point: Point::new(),
        }
    }

    pub fn run(&mut self) -> rustyline::Result<()> {
        println!("ctree: compute-tree analysis. Type 'help' for commands.");

        let config = rustyline::Config::builder()
            .max_history_size(100)?
            .completion_type(rustyline::CompletionType::List)
            .build();
        let mut rl =
            rustyline::Editor::<CtreeHelper, rustyline::history::DefaultHistory>::with_config(
                config,
            )?;
        rl.set_helper(Some(CtreeHelper::new()));

        let history_path = dirs::home_dir()
            .map(|p| p.join(".ctree_history"))
            .unwrap_or_else(|| std::path::PathBuf::from(".ctree_history"));
        // missing history is fine
        let _ = rl.load_history(&history_path);

        loop {
            match rl.readline("ctree> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line)?;
                    if line == "quit" || line == "exit" {
                        break;
                    }
                    println!("{}", self.handle_command(line));
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        let _ = rl.save_history(&history_path);
        Ok(())
    }

    pub fn handle_command(&mut self, line: &str) -> String {
        if line == "help" {
            return HELP.to_string();
        }
        if let Some(rest) = line.strip_prefix("condition") {
            return match rest.trim() {
                "on" => {
                    self.options.track_condition = true;
                    "condition bound: on".to_string()
                }
                "off" => {
                    self.options.track_condition = false;
                    "condition bound: off".to_string()
                }
                _ => "usage: condition on|off".to_string(),
            };
        }
        if line == "at" || line.starts_with("at ") {
            return self.handle_at(&line[2..]);
        }
        self.handle_eval(line)
    }

    fn handle_at(&mut self, rest: &str) -> String {
        let mut point = Point::new();
        for binding in rest.split_whitespace() {
            match parse_binding(binding) {
                Ok((name, value)) => point.insert(&name, value),
                Err(e) => return format!("Error: {}", e),
            }
        }
        self.point = point;
        if self.point.is_empty() {
            "point cleared".to_string()
        } else {
            format!("point: {}", format_point(&self.point))
        }
    }

    fn handle_eval(&self, line: &str) -> String {
        let tree = match ctree_parser::parse(line) {
            Ok(tree) => tree,
            Err(e) => return format!("Parse error: {}", e),
        };
        let rendered = Evaluator::with_options(self.options.clone())
            .evaluate(&tree)
            .and_then(|result| render(&result, &self.point));
        match rendered {
            Ok(out) => out,
            Err(e) => format!("Error: {}", e),
        }
    }
}
