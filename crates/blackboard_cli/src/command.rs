//! Shell command grammar.
//!
//! One command per line, whitespace separated. Properties are written as
//! `name=value` pairs. A key of `-` means "no key".
//!
//! On a `register` line the name `entity` is reserved: `entity=<id>` names
//! the owning entity, may appear at most once, and never becomes a property.
//! Properties called `entity` can still be set afterwards with `update` or
//! `add`.

use blackboard::{MatchMode, Properties};

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register {
        key: Option<String>,
        entity: Option<u64>,
        properties: Properties,
    },
    Exists {
        key: String,
    },
    Get {
        key: String,
    },
    Update {
        key: String,
        name: String,
        value: String,
    },
    Add {
        key: String,
        name: String,
        value: String,
    },
    RemoveProperty {
        key: String,
        name: String,
    },
    Match {
        key: String,
        mode: MatchMode,
        expected: Properties,
    },
    Find {
        mode: MatchMode,
        expected: Properties,
    },
    Remove {
        key: String,
    },
    Keys,
}

/// Errors produced while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{command}` is missing its {argument} argument")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("expected name=value, got `{0}`")]
    BadPair(String),

    #[error("invalid entity id `{0}`")]
    BadEntity(String),

    #[error("entity given more than once")]
    DuplicateEntity,

    #[error("unexpected argument `{0}`")]
    Unexpected(String),
}

impl Command {
    /// Parse one line. Returns `Ok(None)` for blank lines and `#` comments.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first problem found.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };

        let command = match name {
            "register" => {
                let key = required(&mut words, "register", "key")?;
                let key = (key != "-").then(|| key.to_string());
                let mut entity = None;
                let mut properties = Properties::new();
                for word in words {
                    let (name, value) = split_pair(word)?;
                    if name == "entity" {
                        let id = value
                            .parse::<u64>()
                            .map_err(|_| ParseError::BadEntity(value.to_string()))?;
                        if entity.replace(id).is_some() {
                            return Err(ParseError::DuplicateEntity);
                        }
                    } else {
                        properties.insert(name.to_string(), value.to_string());
                    }
                }
                Self::Register {
                    key,
                    entity,
                    properties,
                }
            }
            "exists" => Self::Exists {
                key: single(&mut words, "exists")?,
            },
            "get" => Self::Get {
                key: single(&mut words, "get")?,
            },
            "update" | "add" => {
                let command = if name == "update" { "update" } else { "add" };
                let key = required(&mut words, command, "key")?.to_string();
                let prop = required(&mut words, command, "name")?.to_string();
                let value = required(&mut words, command, "value")?.to_string();
                no_more(&mut words)?;
                if command == "update" {
                    Self::Update {
                        key,
                        name: prop,
                        value,
                    }
                } else {
                    Self::Add {
                        key,
                        name: prop,
                        value,
                    }
                }
            }
            "remove-prop" => {
                let key = required(&mut words, "remove-prop", "key")?.to_string();
                let name = required(&mut words, "remove-prop", "name")?.to_string();
                no_more(&mut words)?;
                Self::RemoveProperty { key, name }
            }
            "match" => {
                let key = required(&mut words, "match", "key")?.to_string();
                let (mode, expected) = pattern(words)?;
                Self::Match {
                    key,
                    mode,
                    expected,
                }
            }
            "find" => {
                let (mode, expected) = pattern(words)?;
                Self::Find { mode, expected }
            }
            "remove" => Self::Remove {
                key: single(&mut words, "remove")?,
            },
            "keys" => {
                no_more(&mut words)?;
                Self::Keys
            }
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };

        Ok(Some(command))
    }
}

fn required<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, ParseError> {
    words
        .next()
        .ok_or(ParseError::MissingArgument { command, argument })
}

fn single<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<String, ParseError> {
    let key = required(words, command, "key")?.to_string();
    no_more(words)?;
    Ok(key)
}

fn no_more<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<(), ParseError> {
    match words.next() {
        Some(word) => Err(ParseError::Unexpected(word.to_string())),
        None => Ok(()),
    }
}

fn split_pair(word: &str) -> Result<(&str, &str), ParseError> {
    match word.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(ParseError::BadPair(word.to_string())),
    }
}

fn pattern<'a>(
    words: impl Iterator<Item = &'a str>,
) -> Result<(MatchMode, Properties), ParseError> {
    let mut mode = MatchMode::Subset;
    let mut expected = Properties::new();
    for word in words {
        if word == "--strict" {
            mode = MatchMode::Exact;
            continue;
        }
        let (name, value) = split_pair(word)?;
        expected.insert(name.to_string(), value.to_string());
    }
    Ok((mode, expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(Command::parse("# setup"), Ok(None));
    }

    #[test]
    fn test_parse_register() {
        let cmd = Command::parse("register npc1 state=idle hp=10").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Register {
                key: Some("npc1".into()),
                entity: None,
                properties: props(&[("state", "idle"), ("hp", "10")]),
            }
        );
    }

    #[test]
    fn test_parse_register_with_entity_and_no_key() {
        let cmd = Command::parse("register - entity=42 team=red").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Register {
                key: None,
                entity: Some(42),
                properties: props(&[("team", "red")]),
            }
        );
        assert_eq!(
            Command::parse("register - entity=abc"),
            Err(ParseError::BadEntity("abc".into()))
        );
        assert_eq!(
            Command::parse("register npc1 entity=1 entity=2"),
            Err(ParseError::DuplicateEntity)
        );
    }

    #[test]
    fn test_parse_property_commands() {
        assert_eq!(
            Command::parse("update npc1 state alert").unwrap(),
            Some(Command::Update {
                key: "npc1".into(),
                name: "state".into(),
                value: "alert".into(),
            })
        );
        assert_eq!(
            Command::parse("add npc1 hp 10").unwrap(),
            Some(Command::Add {
                key: "npc1".into(),
                name: "hp".into(),
                value: "10".into(),
            })
        );
        assert_eq!(
            Command::parse("remove-prop npc1 hp").unwrap(),
            Some(Command::RemoveProperty {
                key: "npc1".into(),
                name: "hp".into(),
            })
        );
    }

    #[test]
    fn test_parse_match_and_find() {
        assert_eq!(
            Command::parse("match npc1 --strict state=alert").unwrap(),
            Some(Command::Match {
                key: "npc1".into(),
                mode: MatchMode::Exact,
                expected: props(&[("state", "alert")]),
            })
        );
        assert_eq!(
            Command::parse("find team=red").unwrap(),
            Some(Command::Find {
                mode: MatchMode::Subset,
                expected: props(&[("team", "red")]),
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Command::parse("explode npc1"),
            Err(ParseError::UnknownCommand("explode".into()))
        );
        assert_eq!(
            Command::parse("update npc1 state"),
            Err(ParseError::MissingArgument {
                command: "update",
                argument: "value",
            })
        );
        assert_eq!(
            Command::parse("exists a b"),
            Err(ParseError::Unexpected("b".into()))
        );
        assert_eq!(
            Command::parse("match npc1 state"),
            Err(ParseError::BadPair("state".into()))
        );
        assert_eq!(
            Command::parse("register npc1 =x"),
            Err(ParseError::BadPair("=x".into()))
        );
    }
}
