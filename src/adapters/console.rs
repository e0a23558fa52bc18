//! Serial console command adapter.
//!
//! A reader thread parses `<command>[ <param>]` lines from the console and
//! offers them to a one-slot `embassy-sync` channel.  The control loop
//! drains at most one request per tick through [`CommandPort::poll`] and
//! writes `<command> <result>` back.
//!
//! ```text
//! ┌──────────────┐  CommandRequest  ┌──────────────┐
//! │ console task │ ───────────────▶ │ control loop │ ──▶ "<cmd> <result>"
//! │  (blocking)  │   depth 1, drop  │   (tick)     │
//! └──────────────┘   when occupied  └──────────────┘
//! ```

use std::io::{self, BufRead, Write};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use crate::app::commands::CommandRequest;
use crate::app::ports::CommandPort;
use crate::drivers::task_pin::{self, Core};

/// Requests waiting for the control loop.  One slot: a command that arrives
/// while another is still pending is dropped.
pub type CommandChannel = Channel<CriticalSectionRawMutex, CommandRequest, 1>;

/// Console → control loop hand-off.
pub static CONSOLE_CHANNEL: CommandChannel = Channel::new();

const READER_PRIORITY: u8 = 5;
const READER_STACK_KB: usize = 4;

/// Parse one console line and offer it to `channel`.
///
/// Returns `true` if a request was queued.  Blank lines are ignored.
pub fn offer_line(channel: &CommandChannel, line: &str) -> bool {
    let Some(request) = CommandRequest::parse_line(line) else {
        return false;
    };
    match channel.try_send(request) {
        Ok(()) => true,
        Err(_) => {
            warn!("Console: command dropped, previous one still pending");
            false
        }
    }
}

/// Start the blocking console reader on the protocol core.
pub fn spawn_reader() -> io::Result<std::thread::JoinHandle<()>> {
    task_pin::spawn_on_core(Core::Pro, READER_PRIORITY, READER_STACK_KB, "console\0", || {
        read_lines(io::stdin().lock(), &CONSOLE_CHANNEL);
    })
}

/// Feed every line from `input` into `channel` until EOF or a read error.
pub fn read_lines(input: impl BufRead, channel: &CommandChannel) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                offer_line(channel, &line);
            }
            Err(e) => {
                warn!("Console: read error ({}), reader stopping", e);
                return;
            }
        }
    }
    debug!("Console: input closed");
}

/// Control-loop side of the console: polls the channel, prints replies.
pub struct ConsoleCommands<'a, W: Write> {
    inbox: &'a CommandChannel,
    out: W,
}

impl ConsoleCommands<'static, io::Stdout> {
    /// Bound to [`CONSOLE_CHANNEL`] and standard output.
    pub fn stdio() -> Self {
        Self::new(&CONSOLE_CHANNEL, io::stdout())
    }
}

impl<'a, W: Write> ConsoleCommands<'a, W> {
    pub fn new(inbox: &'a CommandChannel, out: W) -> Self {
        Self { inbox, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandPort for ConsoleCommands<'_, W> {
    fn poll(&mut self) -> Option<CommandRequest> {
        self.inbox.try_receive().ok()
    }

    fn reply(&mut self, request: &CommandRequest, result: i32) {
        if let Err(e) = writeln!(self.out, "{} {}", request.name, result).and_then(|()| self.out.flush()) {
            debug!("Console: reply not written ({})", e);
        }
    }
}
