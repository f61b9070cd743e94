#![cfg(feature = "gui")]
//! Desktop entrypoint; launches the quiz editor.

fn main() {
    if let Err(err) = eduadmin::run_gui() {
        eprintln!("eduadmin desktop failed: {}", err);
        std::process::exit(1);
    }
}
