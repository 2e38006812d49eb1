use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

pub struct CtreeHelper {
    commands: Vec<String>,
}

impl CtreeHelper {
    pub fn new() -> Self {
        Self {
            commands: ["at", "condition on", "condition off", "help", "quit", "exit"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Completer for CtreeHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        // commands are only meaningful at the start of a line
        if line[..pos].starts_with('(') {
            return Ok((pos, Vec::new()));
        }
        let word = &line[..pos];
        let matches = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(word))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, matches))
    }
}

impl Hinter for CtreeHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for CtreeHelper {}

impl Validator for CtreeHelper {}

impl Helper for CtreeHelper {}
