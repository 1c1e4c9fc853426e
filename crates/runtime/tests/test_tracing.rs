//! Demonstrates the idiom a host application wires up around this
//! library's `tracing` events; `mote-runtime` itself never initializes
//! a subscriber (§10.3, an application concern, not a library
//! one), so this test does it the way `mote-lsp` does in `main.rs`.

use mote_runtime::Interpreter;

#[test]
fn scripted_run_emits_tracing_events() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut interp = Interpreter::new(4096).unwrap();
    let result = interp.eval("var x = 1\nvar y = 2\nreturn x + y").unwrap();
    assert_eq!(result.as_int(), 3);
}
