use std::io;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "../grammar.rs"]
mod grammar;
#[allow(dead_code)]
#[path = "../peripherals.rs"]
mod peripherals;
#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::{Session, SessionOptions};

const OUTPUT_DIR: &str = "transcripts";

fn main() -> io::Result<()> {
    record("countdown", &["cw 5", "hold", "wait 6s", "click", "status", "log"])?;
    record(
        "editing",
        &["click", "cw 2", "click", "ccw 3", "cw 70", "status"],
    )?;
    record(
        "cancel",
        &["cw 30", "hold", "wait 3s", "hold", "status", "wait 11s", "status"],
    )?;
    Ok(())
}

fn record(name: &str, script: &[&str]) -> io::Result<()> {
    let mut session = Session::new(SessionOptions {
        transcript: Some(PathBuf::from(OUTPUT_DIR).join(format!("{name}.log"))),
        ..SessionOptions::default()
    })?;
    let _ = session.startup()?;
    for line in script {
        let _ = session.handle_command(line)?;
    }
    Ok(())
}
