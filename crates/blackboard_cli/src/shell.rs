//! Executes parsed commands against a registry.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use blackboard::{Blackboard, BlackboardError, Entity, Properties};
use tracing::{debug, warn};

use crate::command::Command;

/// Totals for one script run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Commands executed, including ones that returned an error.
    pub executed: usize,
    /// Lines that failed to parse or commands that returned an error.
    pub failed: usize,
}

/// A command shell bound to one registry.
#[derive(Debug)]
pub struct Shell {
    board: Blackboard<Entity>,
    fail_fast: bool,
}

impl Shell {
    /// Create a shell over `board`.
    #[must_use]
    pub fn new(board: Blackboard<Entity>) -> Self {
        Self {
            board,
            fail_fast: false,
        }
    }

    /// Stop at the first failing line.
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// The registry this shell drives.
    #[must_use]
    pub fn board(&self) -> &Blackboard<Entity> {
        &self.board
    }

    /// Run every line of `input`, writing one result line per command.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, or on the first failing line when
    /// fail-fast is enabled.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<RunStats> {
        let mut stats = RunStats::default();

        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("failed to read line {line_no}"))?;

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    stats.failed += 1;
                    warn!(line = line_no, %e, "parse error");
                    writeln!(output, "error: line {line_no}: {e}")?;
                    if self.fail_fast {
                        anyhow::bail!("line {line_no}: {e}");
                    }
                    continue;
                }
            };

            stats.executed += 1;
            match self.execute(command) {
                Ok(reply) => writeln!(output, "{reply}")?,
                Err(e) => {
                    stats.failed += 1;
                    debug!(line = line_no, %e, "command failed");
                    writeln!(output, "error: {e}")?;
                    if self.fail_fast {
                        anyhow::bail!("line {line_no}: {e}");
                    }
                }
            }
        }

        Ok(stats)
    }

    /// Execute one command and render its reply.
    ///
    /// # Errors
    ///
    /// Returns the registry error for failed mutations.
    pub fn execute(&mut self, command: Command) -> Result<String, BlackboardError> {
        let reply = match command {
            Command::Register {
                key,
                entity,
                properties,
            } => self
                .board
                .register(entity.map(Entity), properties, key)?,
            Command::Exists { key } => self.board.exists(&key).to_string(),
            Command::Get { key } => match self.board.properties(&key) {
                Some(props) => render(props),
                None => return Err(BlackboardError::UnknownKey(key)),
            },
            Command::Update { key, name, value } => {
                self.board.update_property(&key, name, value)?;
                "ok".to_string()
            }
            Command::Add { key, name, value } => {
                if self.board.add_property(&key, (name, value))? {
                    "added".to_string()
                } else {
                    "exists".to_string()
                }
            }
            Command::RemoveProperty { key, name } => {
                match self.board.remove_property(&key, &name)? {
                    Some(old) => format!("removed {name}={old}"),
                    None => "absent".to_string(),
                }
            }
            Command::Match {
                key,
                mode,
                expected,
            } => self.board.matches(&key, &expected, mode).to_string(),
            Command::Find { mode, expected } => {
                join(self.board.find_matches(&expected, mode))
            }
            Command::Remove { key } => self.board.remove_object(&key).to_string(),
            Command::Keys => {
                let mut keys: Vec<_> = self.board.keys().collect();
                keys.sort();
                join(keys)
            }
        };
        Ok(reply)
    }
}

/// Render a property set as sorted `name=value` pairs, or `{}` when empty.
fn render(props: &Properties) -> String {
    if props.is_empty() {
        return "{}".to_string();
    }
    let mut pairs: Vec<String> = props.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    pairs.join(" ")
}

fn join(keys: Vec<&String>) -> String {
    if keys.is_empty() {
        return "(none)".to_string();
    }
    keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &str) -> (String, RunStats) {
        let mut shell = Shell::new(Blackboard::new());
        let mut out = Vec::new();
        let stats = shell.run(script.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_npc_script() {
        let script = "\
# an npc goes on alert
register npc1 state=idle
exists npc1
get npc1
register npc1 state=busy
get npc1
update npc1 state alert
match npc1 --strict state=alert
match npc1 --strict state=alert x=1
remove npc1
exists npc1
";
        let (out, stats) = run(script);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "npc1",
                "true",
                "state=idle",
                "error: key already registered: npc1",
                "state=idle",
                "ok",
                "true",
                "false",
                "true",
                "false",
            ]
        );
        assert_eq!(stats.executed, 10);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_entity_registration_and_find() {
        let script = "\
register - entity=7 team=red
register - entity=7 team=blue
register guard team=red hp=3
add guard hp 5
remove-prop guard hp
find team=red
find --strict team=red
keys
";
        let (out, stats) = run(script);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "7",
                "error: key already registered: 7",
                "guard",
                "exists",
                "removed hp=3",
                "7 guard",
                "7 guard",
                "7 guard",
            ]
        );
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_parse_errors_are_reported_and_skipped() {
        let (out, stats) = run("bogus\nregister - \nkeys\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "error: line 1: unknown command `bogus`");
        assert!(lines[1].starts_with("error: invalid argument"));
        assert_eq!(lines[2], "(none)");
        assert_eq!(stats.executed, 2);
        assert_eq!(stats.failed, 2);
    }

    #[test]
    fn test_fail_fast_stops() {
        let mut shell = Shell::new(Blackboard::new()).with_fail_fast(true);
        let mut out = Vec::new();
        let result = shell.run("update ghost a b\nregister x a=1\n".as_bytes(), &mut out);
        assert!(result.is_err());
        assert!(!shell.board().exists("x"));
    }

    #[test]
    fn test_entity_property_set_after_registration() {
        let (out, _) = run("register npc1 entity=3\nupdate npc1 entity robot\nget npc1\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["npc1", "ok", "entity=robot"]);
    }

    #[test]
    fn test_get_unknown_and_empty() {
        let (out, _) = run("get ghost\nregister flag\nget flag\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["error: unknown key: ghost", "flag", "{}"]);
    }
}
