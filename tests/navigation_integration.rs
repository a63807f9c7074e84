//! Scope navigation through the demo catalogue

mod common;

use common::{demo_session, separated_session};
use pretty_assertions::assert_eq;

#[test]
fn test_enter_and_exit_subshell() {
    let mut session = demo_session();
    assert_eq!(session.prompt(), "main> ");

    assert_eq!(session.submit("subshell"), "calculator shell, 'exit' to leave");
    assert_eq!(session.prompt(), "calc> ");
    assert_eq!(session.dispatcher().depth(), 2);

    assert_eq!(session.submit("exit"), "");
    assert_eq!(session.prompt(), "main> ");
    assert_eq!(session.dispatcher().depth(), 1);
    assert!(session.is_active());
}

#[test]
fn test_subshell_has_its_own_catalogue() {
    let mut session = demo_session();
    assert_eq!(session.submit("mul -f 6 -s 7"), "mul: command not found");

    session.submit("subshell");
    assert_eq!(session.submit("mul -f 6 -s 7"), "42");
    assert_eq!(session.submit("add 1 2"), "add: command not found");
}

#[test]
fn test_prompt_path_with_separator() {
    let mut session = separated_session();
    session.submit("subshell");
    assert_eq!(session.prompt(), "main/calc> ");
}

#[test]
fn test_enter_two_scopes_at_once() {
    let mut session = separated_session();
    assert_eq!(session.submit("leafshell"), "entered calc and leaf");
    assert_eq!(session.prompt(), "main/calc/leaf> ");
    assert_eq!(session.dispatcher().depth(), 3);

    session.submit("exit");
    assert_eq!(session.prompt(), "main/calc> ");
}

#[test]
fn test_exit_to_main() {
    let mut session = demo_session();
    session.submit("leafshell");
    assert_eq!(session.submit("exitall"), "");
    assert_eq!(session.prompt(), "main> ");
    assert!(session.is_active());
}

#[test]
fn test_exit_at_main_ends_session() {
    let mut session = demo_session();
    assert_eq!(session.submit("exit"), "bye");
    assert!(!session.is_active());
    assert_eq!(session.dispatcher().depth(), 1);
}

#[test]
fn test_completion_follows_active_scope() {
    let mut session = demo_session();
    let names: Vec<String> = session.dispatcher().complete("su").into_iter().collect();
    assert_eq!(names, vec!["sub", "subshell"]);

    session.submit("subshell");
    let names: Vec<String> = session.dispatcher().complete("").into_iter().collect();
    assert_eq!(names, vec!["exit", "help", "mul"]);
}
