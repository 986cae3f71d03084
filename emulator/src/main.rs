mod grammar;
mod peripherals;
mod session;

use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use session::{Session, SessionOptions};
use timer_core::countdown::TimeUnit;

fn main() -> io::Result<()> {
    let options = parse_options().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: timer-emulator [--transcript <path>] [--minutes-default]");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(options)?;
    let mut line = String::new();

    writeln!(
        writer,
        "Kitchen Timer Emulator ready. Type `help` for commands or `exit` to quit."
    )?;
    for response in session.startup()? {
        writeln!(writer, "{response}")?;
    }

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        let responses = session.handle_command(trimmed)?;
        for response in responses {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options() -> Result<SessionOptions, String> {
    let mut options = SessionOptions {
        styled: io::stdout().is_terminal(),
        ..SessionOptions::default()
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--transcript=") {
            options.transcript = Some(PathBuf::from(value));
        } else if arg == "--transcript" {
            let value = args
                .next()
                .ok_or_else(|| "Expected value after --transcript".to_string())?;
            options.transcript = Some(PathBuf::from(value));
        } else if arg == "--minutes-default" {
            options.config = options.config.with_default_unit(TimeUnit::Minutes);
        } else {
            return Err(format!("Unknown argument `{arg}`"));
        }
    }

    Ok(options)
}
