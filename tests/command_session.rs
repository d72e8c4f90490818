//! Full shell sessions, compared against recorded transcripts.

use insta::assert_snapshot;
use thumbbase::{KeyValueStore, command::run_session};

/// Runs `input` as a session and interleaves the echoed commands with what they printed.
fn transcript(input: &str) -> String {
    let mut store = KeyValueStore::new();
    let mut transcript = String::new();
    for line in input.lines() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        run_session(&mut store, line.as_bytes(), &mut out, &mut err, None).unwrap();
        transcript.push_str(&format!("> {line}\n"));
        for (stream, bytes) in [("out", out), ("err", err)] {
            for printed in String::from_utf8(bytes).unwrap().lines() {
                let printed = format!("{stream}: {printed}");
                transcript.push_str(printed.trim_end());
                transcript.push('\n');
            }
        }
    }
    transcript
}

#[test]
fn value_counts() {
    assert_snapshot!(transcript("SET a 10\nSET b 10\nNUMEQUALTO 10\nNUMEQUALTO 20\nSET b 30\nNUMEQUALTO 10"), @r"
    > SET a 10
    out:
    > SET b 10
    out:
    > NUMEQUALTO 10
    out: 2
    > NUMEQUALTO 20
    out: 0
    > SET b 30
    out:
    > NUMEQUALTO 10
    out: 1
    ");
}

#[test]
fn nested_rollback() {
    assert_snapshot!(transcript("BEGIN\nSET a 30\nBEGIN\nSET a 40\nGET a\nROLLBACK\nNUMEQUALTO 40\nGET a\nNUMEQUALTO 30\nROLLBACK\nGET a\nROLLBACK"), @r"
    > BEGIN
    out:
    > SET a 30
    out:
    > BEGIN
    out:
    > SET a 40
    out:
    > GET a
    out: 40
    > ROLLBACK
    out:
    > NUMEQUALTO 40
    out: 0
    > GET a
    out: 30
    > NUMEQUALTO 30
    out: 1
    > ROLLBACK
    out:
    > GET a
    out: null
    > ROLLBACK
    err: NO TRANSACTION
    ");
}

#[test]
fn errors_do_not_end_the_session() {
    assert_snapshot!(transcript("set a 0\nincr a\nSET a\nget a\nunset a\nget a"), @r"
    > set a 0
    out:
    > incr a
    err: INCR is not a valid command
    > SET a
    err: Valid keys and values are required
    > get a
    out: 0
    > unset a
    out:
    > get a
    out: null
    ");
}
