// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Line-oriented command surface over a [`KeyValueStore`].
//!
//! This is the text protocol the `thumbbase` shell speaks. Each line holds one command name
//! (matched case-insensitively) followed by space-separated arguments:
//!
//! | Command             | Reply                                        |
//! |---------------------|----------------------------------------------|
//! | `SET key value`     | empty line                                   |
//! | `GET key`           | the value, or `null` if the key is absent    |
//! | `UNSET key`         | empty line                                   |
//! | `NUMEQUALTO value`  | number of keys holding `value`               |
//! | `BEGIN`             | empty line                                   |
//! | `COMMIT`            | empty line                                   |
//! | `ROLLBACK`          | empty line, or `NO TRANSACTION`              |
//!
//! `end`, `exit`, `q`, `quit` and `close` end the session. Arguments beyond the ones a command
//! takes are ignored, and all values arrive as [`Value::String`].
//!
//! ```
//! use thumbbase::{KeyValueStore, command::Command};
//!
//! let mut store = KeyValueStore::new();
//! for line in ["SET a 10", "set b 10"] {
//!     Command::parse(line)?.unwrap().execute(&mut store)?;
//! }
//! let reply = Command::parse("NUMEQUALTO 10")?.unwrap().execute(&mut store)?;
//! assert_eq!(reply.to_string(), "2");
//! # Ok::<(), thumbbase::Error>(())
//! ```

use crate::{Error, KeyValueStore, Value};
use std::{
    fmt,
    io::{self, BufRead, Write},
};
use tracing::debug;

/// Command names that end a shell session.
pub const QUIT_COMMANDS: [&str; 5] = ["end", "exit", "q", "quit", "close"];

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: Value },
    Get { key: String },
    Unset { key: String },
    NumEqualTo { value: Value },
    Begin,
    Commit,
    Rollback,
    Quit,
}

impl Command {
    /// Parses one line of input. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownCommand`] for an unrecognized command name.
    /// - [`Error::InvalidArgument`] if a required argument is missing.
    pub fn parse(line: &str) -> Result<Option<Self>, Error> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(None);
        };
        let name = name.to_lowercase();
        let mut arg = |missing: &str| {
            tokens
                .next()
                .map(str::to_owned)
                .ok_or_else(|| Error::InvalidArgument(missing.to_owned()))
        };

        let command = match name.as_str() {
            "set" => {
                const MISSING: &str = "Valid keys and values are required";
                let key = arg(MISSING)?;
                let value = arg(MISSING)?;
                Self::Set {
                    key,
                    value: Value::String(value),
                }
            }
            "get" => Self::Get {
                key: arg("A valid key is required")?,
            },
            "unset" => Self::Unset {
                key: arg("A valid key is required")?,
            },
            "numequalto" => Self::NumEqualTo {
                value: Value::String(arg("A valid value is required")?),
            },
            "begin" => Self::Begin,
            "commit" => Self::Commit,
            "rollback" => Self::Rollback,
            quit if QUIT_COMMANDS.contains(&quit) => Self::Quit,
            _ => return Err(Error::UnknownCommand(name)),
        };
        Ok(Some(command))
    }

    /// Runs this command against `store`.
    ///
    /// [`Command::Quit`] does nothing here; ending the session is up to the caller.
    pub fn execute(self, store: &mut KeyValueStore<String>) -> Result<Reply, Error> {
        match self {
            Self::Set { key, value } => store.set(key, value).map(|()| Reply::Done),
            Self::Get { key } => Ok(Reply::Value(store.get(key.as_str()).cloned())),
            Self::Unset { key } => store.unset(key.as_str()).map(|()| Reply::Done),
            Self::NumEqualTo { value } => Ok(Reply::Count(store.num_equal_to(&value))),
            Self::Begin => {
                store.begin();
                Ok(Reply::Done)
            }
            Self::Commit => {
                store.commit();
                Ok(Reply::Done)
            }
            Self::Rollback => store.rollback().map(|()| Reply::Done),
            Self::Quit => Ok(Reply::Done),
        }
    }
}

/// The result of a successfully executed [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The command succeeded and has nothing to report.
    Done,
    /// The value under a key; `None` if absent.
    Value(Option<Value>),
    Count(usize),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Done => Ok(()),
            Reply::Value(Some(value)) => value.fmt(f),
            Reply::Value(None) => f.write_str("null"),
            Reply::Count(count) => count.fmt(f),
        }
    }
}

/// Drives a whole session: reads commands from `input` until a quit word or end of input.
///
/// Replies go to `out`, one line each. Failed commands print their error to `err` and the
/// session continues. `prompt`, if given, is written to `out` before each line is read.
///
/// # Errors
///
/// Only I/O errors end the session early.
pub fn run_session(
    store: &mut KeyValueStore<String>,
    input: impl BufRead,
    mut out: impl Write,
    mut err: impl Write,
    prompt: Option<&str>,
) -> io::Result<()> {
    let mut lines = input.lines();
    loop {
        if let Some(prompt) = prompt {
            write!(out, "{prompt}")?;
            out.flush()?;
        }
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => match command.execute(store) {
                Ok(reply) => writeln!(out, "{reply}")?,
                Err(e) => writeln!(err, "{e}")?,
            },
            Err(e) => writeln!(err, "{e}")?,
        }
    }
    debug!(keys = store.len(), depth = store.depth(), "session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(parse("BEGIN"), Command::Begin);
        assert_eq!(parse("Commit"), Command::Commit);
        assert_eq!(parse("rollback"), Command::Rollback);
        assert_eq!(
            parse("NumEqualTo 3"),
            Command::NumEqualTo {
                value: Value::from("3")
            }
        );
    }

    #[test]
    fn keys_and_values_keep_their_case() {
        assert_eq!(
            parse("set Key VALUE"),
            Command::Set {
                key: "Key".into(),
                value: Value::from("VALUE")
            }
        );
    }

    #[test]
    fn quit_words() {
        for word in QUIT_COMMANDS {
            assert_eq!(parse(word), Command::Quit);
            assert_eq!(parse(&word.to_uppercase()), Command::Quit);
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("   \t"), Ok(None));
    }

    #[test]
    fn extra_arguments_are_ignored() {
        assert_eq!(parse("GET a b c"), Command::Get { key: "a".into() });
    }

    #[test]
    fn missing_arguments() {
        assert_eq!(
            Command::parse("SET a"),
            Err(Error::InvalidArgument(
                "Valid keys and values are required".into()
            ))
        );
        assert!(matches!(
            Command::parse("SET"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Command::parse("GET"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Command::parse("numequalto"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn unknown_command() {
        let err = Command::parse("incr a").unwrap_err();
        assert_eq!(err, Error::UnknownCommand("incr".into()));
        assert_eq!(err.to_string(), "INCR is not a valid command");
    }

    #[test]
    fn replies_render_like_the_shell() {
        assert_eq!(Reply::Done.to_string(), "");
        assert_eq!(Reply::Value(None).to_string(), "null");
        assert_eq!(Reply::Value(Some(Value::from("0"))).to_string(), "0");
        assert_eq!(Reply::Count(2).to_string(), "2");
    }

    #[test]
    fn session_stops_at_quit() {
        let mut store = KeyValueStore::new();
        let input = "SET a 1\nGET a\nbogus\nROLLBACK\nEXIT\nGET a\n";
        let (mut out, mut err) = (Vec::new(), Vec::new());
        run_session(&mut store, input.as_bytes(), &mut out, &mut err, None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\n1\n");
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "BOGUS is not a valid command\nNO TRANSACTION\n"
        );
    }

    #[test]
    fn execute_round_trip() {
        let mut store = KeyValueStore::new();
        assert_eq!(parse("SET a 0").execute(&mut store), Ok(Reply::Done));
        assert_eq!(
            parse("GET a").execute(&mut store),
            Ok(Reply::Value(Some(Value::from("0"))))
        );
        assert_eq!(parse("UNSET a").execute(&mut store), Ok(Reply::Done));
        assert_eq!(parse("GET a").execute(&mut store), Ok(Reply::Value(None)));
        assert_eq!(
            parse("ROLLBACK").execute(&mut store),
            Err(Error::NoTransaction)
        );
    }
}
