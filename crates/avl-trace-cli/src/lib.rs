//! `avl-trace` — run a script of tree operations and print the snapshot
//! traces.
//!
//! Provides the core logic used by the binary entry point. A script is a list
//! of tokens separated by commas or whitespace:
//! - `K` or `ins:K` — insert integer key `K`
//! - `del:K` — delete key `K`
//! - `clear` — discard the tree

use avl_trace::{parse_key, AvlEngine, KeyError, Trace, TreeSnapshot};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Key(#[from] KeyError),
    #[error("Unknown operation: {0}")]
    UnknownOp(String),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

// ── Script ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Insert(i64),
    Delete(i64),
    Clear,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Insert(k) => write!(f, "insert {k}"),
            Command::Delete(k) => write!(f, "delete {k}"),
            Command::Clear => f.write_str("clear"),
        }
    }
}

/// Parses one script token.
pub fn parse_command(token: &str) -> Result<Command, CliError> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("clear") {
        return Ok(Command::Clear);
    }
    match token.split_once(':') {
        Some((op, key)) => match op.to_ascii_lowercase().as_str() {
            "ins" | "insert" => Ok(Command::Insert(parse_key(key)?)),
            "del" | "delete" => Ok(Command::Delete(parse_key(key)?)),
            _ => Err(CliError::UnknownOp(token.to_string())),
        },
        None => Ok(Command::Insert(parse_key(token)?)),
    }
}

/// Parses a whole script, failing on the first bad token.
pub fn parse_script<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Command>, CliError> {
    tokens
        .iter()
        .flat_map(|t| t.as_ref().split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|t| !t.is_empty())
        .map(parse_command)
        .collect()
}

/// Reads a whole script from `reader`, e.g. stdin.
pub fn read_script<R: std::io::Read>(mut reader: R) -> Result<Vec<Command>, CliError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_script(&[buf])
}

// ── Output ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Text,
}

/// Outcome of one script command.
#[derive(Debug, Serialize)]
pub struct Step {
    pub op: String,
    #[serde(flatten)]
    pub trace: Option<Trace<i64>>,
}

/// Runs `commands` against a fresh engine and renders the result.
pub fn run(commands: &[Command], format: Format, final_only: bool) -> Result<String, CliError> {
    let mut avl = AvlEngine::new();
    let mut steps = Vec::with_capacity(commands.len());
    for &command in commands {
        let trace = match command {
            Command::Insert(k) => Some(avl.insert(k)),
            Command::Delete(k) => Some(avl.remove(k)),
            Command::Clear => {
                avl.clear();
                None
            }
        };
        debug!(%command, frames = trace.as_ref().map_or(0, |t| t.snapshots.len()), "applied");
        steps.push(Step {
            op: command.to_string(),
            trace,
        });
    }
    info!(commands = commands.len(), nodes = avl.len(), "script finished");

    let tree = avl.tree();
    match (format, final_only) {
        (Format::Json, true) => Ok(serde_json::to_string_pretty(&tree)?),
        (Format::Json, false) => Ok(serde_json::to_string_pretty(&steps)?),
        (Format::Text, true) => Ok(render_tree(tree.as_ref())),
        (Format::Text, false) => Ok(render_steps(&steps)),
    }
}

fn render_tree(tree: Option<&TreeSnapshot<i64>>) -> String {
    match tree {
        Some(t) => t.to_string(),
        None => "∅".to_string(),
    }
}

fn render_steps(steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        out.push_str(&format!("== {}\n", step.op));
        match &step.trace {
            Some(trace) => {
                for snapshot in &trace.snapshots {
                    out.push_str(&snapshot.to_string());
                    out.push_str("\n\n");
                }
            }
            None => out.push_str("Cleared\n\n"),
        }
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens() {
        assert_eq!(parse_command("10").unwrap(), Command::Insert(10));
        assert_eq!(parse_command("-7").unwrap(), Command::Insert(-7));
        assert_eq!(parse_command("ins:3").unwrap(), Command::Insert(3));
        assert_eq!(parse_command("DEL:-3").unwrap(), Command::Delete(-3));
        assert_eq!(parse_command("Clear").unwrap(), Command::Clear);
        assert!(matches!(parse_command("mv:3"), Err(CliError::UnknownOp(_))));
        assert!(matches!(
            parse_command("del:x"),
            Err(CliError::Key(KeyError::Invalid { .. }))
        ));
        assert!(matches!(
            parse_command("del:"),
            Err(CliError::Key(KeyError::Empty))
        ));
    }

    #[test]
    fn parses_script_with_mixed_separators() {
        let script = parse_script(&["10,20 30", "del:20", " clear,5"]).unwrap();
        assert_eq!(
            script,
            vec![
                Command::Insert(10),
                Command::Insert(20),
                Command::Insert(30),
                Command::Delete(20),
                Command::Clear,
                Command::Insert(5),
            ]
        );
        assert!(parse_script(&["1 two 3"]).is_err());
    }

    #[test]
    fn reads_multi_line_script() {
        let input = "10\n20, del:10\n\n  clear\n-4\n";
        let script = read_script(input.as_bytes()).unwrap();
        assert_eq!(
            script,
            vec![
                Command::Insert(10),
                Command::Insert(20),
                Command::Delete(10),
                Command::Clear,
                Command::Insert(-4),
            ]
        );
        assert!(read_script("".as_bytes()).unwrap().is_empty());
        assert!(matches!(
            read_script("1\nins:x\n".as_bytes()),
            Err(CliError::Key(KeyError::Invalid { .. }))
        ));
        assert!(matches!(
            read_script(&[0xff, 0xfe][..]),
            Err(CliError::Io(_))
        ));
    }

    #[test]
    fn json_steps() {
        let commands = parse_script(&["10 20 30 clear"]).unwrap();
        let out = run(&commands, Format::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let steps = value.as_array().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0]["op"], "insert 10");
        assert_eq!(steps[2]["snapshots"][2]["rotationKind"], "RR");
        assert_eq!(steps[2]["tree"]["key"], 20);
        assert_eq!(steps[3], serde_json::json!({ "op": "clear" }));
    }

    #[test]
    fn json_final_only() {
        let commands = parse_script(&["30 10 20"]).unwrap();
        let out = run(&commands, Format::Json, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["key"], 20);
        assert_eq!(value["left"]["key"], 10);
        assert_eq!(value["right"]["key"], 30);

        let out = run(&[], Format::Json, true).unwrap();
        assert_eq!(out, "null");
    }

    #[test]
    fn text_output() {
        let commands = parse_script(&["2 1 del:5"]).unwrap();
        let out = run(&commands, Format::Text, false).unwrap();
        assert!(out.starts_with("== insert 2\nBefore insert 2\n∅\n\nInserted 2 (highlight 2)\n2 [h=1, bf=0]"));
        assert!(out.ends_with("== delete 5\nBefore delete 5\n2 [h=2, bf=1]\n├─ 1 [h=1, bf=0]\n└─ ∅\n\nDeleted 5\n2 [h=2, bf=1]\n├─ 1 [h=1, bf=0]\n└─ ∅"));

        let out = run(&commands, Format::Text, true).unwrap();
        assert_eq!(out, "2 [h=2, bf=1]\n├─ 1 [h=1, bf=0]\n└─ ∅");
    }
}
