use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::style::Stylize;
use timer_core::clock::{Clock, duration_to_millis};
use timer_core::device::{Device, DeviceError};
use timer_core::display::{RenderCommand, Underline};
use timer_core::events::{EventRecorder, TimerEvent};
use timer_core::input::{DEFAULT_DEBOUNCE, DEFAULT_LONG_PRESS, PressConfig};
use timer_core::machine::{TimerConfig, TimerState};

use crate::grammar::{Command, parse_command};
use crate::peripherals::{
    BuzzerAction, HostBuzzer, SimButton, SimClock, SimEncoder, SimPowerManager, TerminalDisplay,
};

const STEP: Duration = Duration::from_millis(1);
/// Polls granted per detent so every queued detent reaches the countdown.
const DETENT_SETTLE: Duration = Duration::from_millis(1);
/// Largest turn a single `cw`/`ccw` may request; enough to sweep 00:00 to 59:59.
const MAX_DETENTS: u32 = 3_600;
const CLICK_HOLD: Duration = Duration::from_millis(200);
const LONG_HOLD: Duration = Duration::from_millis(1_500);
const RELEASE_SETTLE: Duration = Duration::from_millis(150);
/// Longest span a single `wait` may cover.
const MAX_WAIT: Duration = Duration::from_secs(2 * 60 * 60);

pub const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "cw",
        "cw [n]             - turn the knob clockwise by n detents",
    ),
    (
        "ccw",
        "ccw [n]            - turn the knob counter-clockwise by n detents",
    ),
    (
        "click",
        "click              - short press; switches minutes/seconds while off",
    ),
    (
        "hold",
        "hold               - long press; starts or cancels the countdown",
    ),
    (
        "press",
        "press | release    - drive the raw button line",
    ),
    (
        "release",
        "press | release    - drive the raw button line",
    ),
    (
        "wait",
        "wait <n>[ms|s]     - let simulated time pass",
    ),
    (
        "status",
        "status             - show state, value and panel",
    ),
    ("log", "log                - list recent timer events"),
    (
        "help",
        "help [topic]       - show help for a command",
    ),
];

/// Start-up parameters of a console session.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub config: TimerConfig,
    pub transcript: Option<PathBuf>,
    /// Draw the edit marker with terminal underlining.
    pub styled: bool,
}

type EmulatedDevice =
    Device<SimClock, TerminalDisplay, SimEncoder, SimButton, HostBuzzer, SimPowerManager>;

enum Output {
    Text(String),
    Frame(RenderCommand),
}

pub struct Session {
    device: EmulatedDevice,
    clock: SimClock,
    history: EventRecorder,
    transcript: Option<TranscriptLogger>,
    styled: bool,
    boot: Vec<Output>,
}

impl Session {
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        let transcript = options
            .transcript
            .as_deref()
            .map(TranscriptLogger::create)
            .transpose()?;

        let clock = SimClock::new();
        let device = Device::new(
            options.config,
            clock.clone(),
            TerminalDisplay::new(),
            SimEncoder::new(),
            SimButton::new(
                clock.clone(),
                PressConfig::new(DEFAULT_DEBOUNCE, DEFAULT_LONG_PRESS),
            ),
            HostBuzzer::new(),
            SimPowerManager::new(),
        );

        let mut session = Self {
            device,
            clock,
            history: EventRecorder::new(),
            transcript,
            styled: options.styled,
            boot: Vec::new(),
        };

        let mut boot = Vec::new();
        session.poll_once(&mut boot);
        // The first pass only applies the edit field; the second latches the
        // encoder origin.
        session.run_for(STEP, &mut boot);
        session.boot = boot;
        Ok(session)
    }

    /// Output of the power-on passes; empty after the first call.
    pub fn startup(&mut self) -> io::Result<Vec<String>> {
        let boot = std::mem::take(&mut self.boot);
        self.finish(Duration::ZERO, boot)
    }

    #[cfg(test)]
    pub fn machine(&self) -> &timer_core::machine::TimerStateMachine {
        self.device.machine()
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let elapsed = self.elapsed();
        if let Some(transcript) = self.transcript.as_mut() {
            transcript.append_line(elapsed, TranscriptRole::Host, trimmed)?;
        }

        let output = match parse_command(trimmed) {
            Ok(command) => self.execute(command),
            Err(err) => vec![Output::Text(format!("ERR syntax {err}"))],
        };
        self.finish(elapsed, output)
    }

    fn execute(&mut self, command: Command<'_>) -> Vec<Output> {
        let mut out = Vec::new();
        match command {
            Command::Rotate { detents, .. } if detents > MAX_DETENTS => {
                out.push(Output::Text(format!(
                    "ERR range turns are limited to {MAX_DETENTS} detents"
                )));
            }
            Command::Rotate { direction, detents } => {
                self.device.encoder_mut().turn(direction, detents);
                // One extra poll covers a pending edit-field change.
                let settle = DETENT_SETTLE.saturating_mul(detents + 2);
                self.run_for(settle, &mut out);
            }
            Command::Click => self.press_for(CLICK_HOLD, &mut out),
            Command::Hold => self.press_for(LONG_HOLD, &mut out),
            Command::Press => {
                self.device.button_mut().set_pressed(true);
                self.run_for(STEP, &mut out);
            }
            Command::Release => {
                self.device.button_mut().set_pressed(false);
                self.run_for(RELEASE_SETTLE, &mut out);
            }
            Command::Wait(span) if span > MAX_WAIT => {
                out.push(Output::Text(format!(
                    "ERR range wait is limited to {}",
                    format_duration_short(MAX_WAIT)
                )));
            }
            Command::Wait(span) => self.run_for(span, &mut out),
            Command::Status => self.describe_status(&mut out),
            Command::Log => self.describe_log(&mut out),
            Command::Help(topic) => describe_help(topic, &mut out),
        }
        out
    }

    fn press_for(&mut self, held: Duration, out: &mut Vec<Output>) {
        if self.device.button().is_down() {
            out.push(Output::Text(
                "ERR button already pressed; use `release`".to_string(),
            ));
            return;
        }
        self.device.button_mut().set_pressed(true);
        self.run_for(held, out);
        self.device.button_mut().set_pressed(false);
        self.run_for(RELEASE_SETTLE, out);
    }

    /// Advances simulated time in 1 ms steps, polling the device after each.
    fn run_for(&mut self, span: Duration, out: &mut Vec<Output>) {
        for _ in 0..duration_to_millis(span) {
            self.clock.advance(STEP);
            self.poll_once(out);
        }

        let actions = self.device.buzzer_mut().take_actions();
        describe_buzzer(&actions, out);
        if let Some(frame) = self.device.display_mut().take_fresh() {
            out.push(Output::Frame(frame));
        }
    }

    fn poll_once(&mut self, out: &mut Vec<Output>) {
        let outcome = match self.device.poll() {
            Ok(outcome) => outcome,
            Err(DeviceError::Render(never)) => match never {},
        };

        let now = self.clock.now();
        self.history.record_all(now, &outcome.events);
        for event in &outcome.events {
            if matches!(event, TimerEvent::CountdownTick(_)) {
                continue;
            }
            out.push(Output::Text(format!(
                "event {event} at {} ms",
                now.as_u32()
            )));
        }
    }

    fn describe_status(&self, out: &mut Vec<Output>) {
        let machine = self.device.machine();
        let value = RenderCommand::for_countdown(machine.countdown(), Underline::None);
        out.push(Output::Text(format!(
            "state {} value {} editing {}",
            state_label(machine.state()),
            value.text(),
            machine.edit_unit().label()
        )));

        let display = self.device.display();
        match display.frame() {
            Some(frame) if !display.is_power_save() => out.push(Output::Frame(frame)),
            Some(_) => out.push(Output::Text("panel asleep".to_string())),
            None => out.push(Output::Text("panel blank".to_string())),
        }

        out.push(Output::Text(format!(
            "clock {} ms, naps {}",
            self.clock.now().as_u32(),
            self.device.power().naps()
        )));
    }

    fn describe_log(&self, out: &mut Vec<Output>) {
        if self.history.is_empty() {
            out.push(Output::Text("log empty".to_string()));
            return;
        }
        for record in self.history.oldest_first() {
            out.push(Output::Text(format!(
                "{:>8} ms  {}",
                record.at.as_u32(),
                record.event
            )));
        }
    }

    fn finish(&mut self, elapsed: Duration, output: Vec<Output>) -> io::Result<Vec<String>> {
        let mut console = Vec::with_capacity(output.len());
        let mut plain = Vec::with_capacity(output.len());
        for item in output {
            match item {
                Output::Text(line) => {
                    plain.push(line.clone());
                    console.push(line);
                }
                Output::Frame(frame) => {
                    plain.push(frame_line(&frame, false));
                    console.push(frame_line(&frame, self.styled));
                }
            }
        }

        self.record_output(elapsed, &plain)?;
        Ok(console)
    }

    fn record_output(&mut self, elapsed: Duration, lines: &[String]) -> io::Result<()> {
        if let Some(transcript) = self.transcript.as_mut() {
            for line in lines {
                transcript.append_line(elapsed, TranscriptRole::Emulator, line)?;
            }
        }
        Ok(())
    }

    fn elapsed(&self) -> Duration {
        Duration::from_millis(u64::from(self.clock.now().as_u32()))
    }
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header()?;
        Ok(logger)
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.writer, "# Kitchen timer emulator transcript")?;
        writeln!(
            self.writer,
            "# Timestamps are simulated milliseconds since power-on"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(
        &mut self,
        elapsed: Duration,
        role: TranscriptRole,
        line: &str,
    ) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}

fn describe_help(topic: Option<&str>, out: &mut Vec<Output>) {
    match topic {
        Some(target) => {
            if let Some((_, detail)) = HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                out.push(Output::Text((*detail).to_string()));
            } else {
                out.push(Output::Text(format!("No help available for `{target}`.")));
                out.push(Output::Text(format!(
                    "Available topics: {}",
                    help_topic_list()
                )));
            }
        }
        None => {
            out.push(Output::Text("Available commands:".to_string()));
            let mut previous = "";
            for (_, detail) in HELP_TOPICS {
                if *detail != previous {
                    out.push(Output::Text(format!("  {detail}")));
                }
                previous = *detail;
            }
            out.push(Output::Text(
                "Type `help <topic>` for a specific command.".to_string(),
            ));
        }
    }
}

fn help_topic_list() -> String {
    let mut buffer = String::new();
    for (index, (name, _)) in HELP_TOPICS.iter().enumerate() {
        if index > 0 {
            buffer.push_str(", ");
        }
        buffer.push_str(name);
    }
    buffer
}

/// Folds the buzzer requests of one command into a line per distinct tone.
fn describe_buzzer(actions: &[BuzzerAction], out: &mut Vec<Output>) {
    let mut tones: Vec<(u16, Duration, usize)> = Vec::new();
    let mut stopped = false;
    for action in actions {
        match *action {
            BuzzerAction::Tone {
                frequency_hz,
                duration,
            } => {
                if let Some(entry) = tones
                    .iter_mut()
                    .find(|(hz, length, _)| *hz == frequency_hz && *length == duration)
                {
                    entry.2 += 1;
                } else {
                    tones.push((frequency_hz, duration, 1));
                }
            }
            BuzzerAction::Stop => stopped = true,
        }
    }

    for (frequency_hz, duration, count) in tones {
        out.push(Output::Text(format!(
            "buzzer {frequency_hz} Hz {} x{count}",
            format_duration_short(duration)
        )));
    }
    if stopped {
        out.push(Output::Text("buzzer off".to_string()));
    }
}

fn frame_line(frame: &RenderCommand, styled: bool) -> String {
    let minutes = format!("{:02}", frame.minutes);
    let seconds = format!("{:02}", frame.seconds);
    match (frame.underline, styled) {
        (Underline::None, _) => format!("panel {minutes}:{seconds}"),
        (Underline::Minutes, true) => format!("panel {}:{seconds}", minutes.as_str().underlined()),
        (Underline::Seconds, true) => format!("panel {minutes}:{}", seconds.as_str().underlined()),
        (Underline::Minutes, false) => format!("panel {minutes}:{seconds} (minutes underlined)"),
        (Underline::Seconds, false) => format!("panel {minutes}:{seconds} (seconds underlined)"),
    }
}

fn state_label(state: TimerState) -> &'static str {
    match state {
        TimerState::Off => "off",
        TimerState::Active => "active",
        TimerState::Alarm => "alarm",
    }
}

fn format_duration_short(duration: Duration) -> String {
    if duration.as_secs() == 0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}
