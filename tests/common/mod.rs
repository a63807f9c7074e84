//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use nestshell::config::ShellConfig;
use nestshell::demo;
use nestshell::runtime::{Frontend, LineFrontend, Runtime};
use nestshell::{Dispatcher, Session};

pub fn dispatcher(config: &ShellConfig) -> Arc<Dispatcher> {
    let main = demo::main_scope().expect("demo catalogue builds");
    Arc::new(Dispatcher::from_config(main, config))
}

/// Session over the demo catalogue with default configuration
pub fn demo_session() -> Session {
    let config = ShellConfig::default();
    Session::with_config(dispatcher(&config), &config, None)
}

/// Session with a prompt separator so the whole scope path is visible
pub fn separated_session() -> Session {
    let config = ShellConfig {
        prompt_path_separator: Some("/".to_string()),
        ..ShellConfig::default()
    };
    Session::with_config(dispatcher(&config), &config, None)
}

/// Feed `input` through a line front-end and return everything it wrote
pub fn run_script(input: &str) -> String {
    let runtime = Runtime::builder(demo::main_scope().expect("demo catalogue builds")).build();
    let mut frontend = LineFrontend::new("script", Cursor::new(input.to_string()), Vec::new());
    frontend.run(runtime.session()).expect("script runs");
    String::from_utf8(frontend.into_output()).expect("utf-8 output")
}
