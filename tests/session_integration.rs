//! Sessions, history, front-ends and configuration end to end

mod common;

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use common::{dispatcher, run_script};
use nestshell::config::{ConfigLoader, ShellConfig};
use nestshell::history::CommandHistory;
use nestshell::runtime::{LineFrontend, Runtime};
use nestshell::{demo, Session};
use pretty_assertions::assert_eq;

fn session_with_history(capacity: usize) -> Session {
    let mut config = ShellConfig::default();
    config.history.capacity = capacity;
    let history = Arc::new(Mutex::new(CommandHistory::new(capacity)));
    Session::with_config(dispatcher(&config), &config, Some(history))
}

#[test]
fn test_history_eviction_and_navigation() {
    let mut session = session_with_history(3);
    assert_eq!(session.history_capacity(), Some(3));
    for line in ["echo a", "echo b", "echo c", "echo d"] {
        session.submit(line);
    }

    {
        let history = session.history().unwrap().lock().unwrap();
        let retained: Vec<(u64, &str)> = history.entries().collect();
        assert_eq!(retained, vec![(2, "echo b"), (3, "echo c"), (4, "echo d")]);
    }

    assert_eq!(session.history_previous(), "echo d");
    assert_eq!(session.history_previous(), "echo c");
    assert_eq!(session.history_previous(), "echo b");
    assert_eq!(session.history_previous(), "echo b");
}

#[test]
fn test_history_listing_through_pipeline() {
    let mut session = session_with_history(10);
    session.submit("add 1 2");
    session.submit("echo hi");

    assert_eq!(session.perform_command("history | grep -n echo"), "2 echo hi");
    assert_eq!(session.perform_command("history | count"), "2");
}

#[test]
fn test_script_through_line_frontend() {
    let output = run_script("add -f 2 -s 3\nsubshell\nmul 4 5\nexit\nexit\necho unreachable\n");
    assert_eq!(
        output,
        "main> 5\nmain> calculator shell, 'exit' to leave\ncalc> 20\ncalc> main> bye\n"
    );
}

#[test]
fn test_errors_do_not_stop_frontend() {
    let output = run_script("nope\nadd -f 2\necho still here\n");
    assert_eq!(
        output,
        "main> nope: command not found\nmain> missing required parameter [second]\nmain> still here\nmain> \n"
    );
}

#[test]
fn test_runtime_runs_several_frontends() {
    let runtime = Runtime::builder(demo::main_scope().unwrap())
        .frontend(LineFrontend::new("one", Cursor::new("echo one\n".to_string()), Vec::new()))
        .frontend(LineFrontend::new("two", Cursor::new("echo two\n".to_string()), Vec::new()))
        .build();
    assert!(runtime.run().is_ok());
}

#[test]
fn test_shared_dispatcher_shares_scope_stack() {
    let runtime = Runtime::builder(demo::main_scope().unwrap()).build();
    let mut first = runtime.session();
    let second = runtime.session();

    first.submit("subshell");
    assert_eq!(second.prompt(), "calc> ");
}

#[test]
fn test_config_file_drives_session() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "prompt_stop: \"$\"\nprompt_path_separator: \":\"\nhelp:\n  command: \"?\"\n  footer: false\nhistory:\n  command: hist"
    )
    .unwrap();

    let config = ConfigLoader::new(file.path()).load().unwrap();
    let runtime = Runtime::builder(demo::main_scope().unwrap())
        .config(config)
        .build();
    let mut session = runtime.session();

    assert_eq!(session.prompt(), "main$ ");
    session.submit("subshell");
    assert_eq!(session.prompt(), "main:calc$ ");
    assert_eq!(session.submit("?"), "exit\tleave the calculator shell\nmul\tmultiply two numbers");
    assert_eq!(session.submit("help"), "help: command not found");
    assert_eq!(session.submit("hist"), "1 subshell\n2 ?\n3 help\n4 hist");
}

#[test]
fn test_missing_explicit_config_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::new(dir.path().join("absent.yaml")).load().unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}
