use std::io::{self, BufRead, Stdout, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use concierge_core::{update, AppState, AppViewModel, Lifecycle, Msg, Role};
use concierge_engine::AtomicFileWriter;
use engine_logging::{engine_error, engine_info, set_submission};

use super::cli::Args;
use super::config::{load_config, ClientConfig};
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::ui::constants::*;
use super::ui::layout::transcript_page;
use super::ui::render::{render, RenderCursor, TerminalCommand};

/// How long the loop waits for a message before ticking.
const RENDER_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(if args.log_stderr {
        LogDestination::Both
    } else {
        LogDestination::File
    });

    let mut config = load_config(&args.config);
    config.apply_args(&args);
    engine_info!(
        "Backend {} provider={} model={}",
        config.server_url,
        config.llm_provider,
        config.model()
    );

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.settings(), msg_tx.clone());
    let interactive = args.message.is_none();
    let mut app = App::new(runner, args.out.clone(), interactive);
    app.dispatch(Msg::HealthRequested)?;

    let input = Arc::new(InputState::default());
    match args.message {
        Some(message) => {
            let request = config.request(&message);
            if request.message().is_none() {
                bail!("the message is empty");
            }
            app.dispatch(Msg::Submit(request))?;
            input.closed.store(true, Ordering::Release);
        }
        None => {
            spawn_input_thread(config, msg_tx, input.clone());
            app.print_banner()?;
        }
    }
    app.run(&msg_rx, &input)?;

    engine_info!("Exiting");
    Ok(())
}

/// Shared between the main loop and the stdin thread.
#[derive(Debug, Default)]
struct InputState {
    /// No more input will arrive. Work already started still finishes.
    closed: AtomicBool,
    /// The user asked to leave now.
    quit: AtomicBool,
}

/// Whether the loop should keep waiting for messages.
fn has_work(input_closed: bool, state: &AppState) -> bool {
    !input_closed || state.lifecycle() != Lifecycle::Idle || state.backend().is_none()
}

struct App {
    state: AppState,
    runner: EffectRunner,
    cursor: RenderCursor,
    page: Option<AtomicFileWriter>,
    out: Stdout,
    interactive: bool,
}

impl App {
    fn new(runner: EffectRunner, page: Option<PathBuf>, interactive: bool) -> Self {
        Self {
            state: AppState::new(),
            runner,
            cursor: RenderCursor::default(),
            page: page.map(AtomicFileWriter::new),
            out: io::stdout(),
            interactive,
        }
    }

    fn run(&mut self, msg_rx: &Receiver<Msg>, input: &InputState) -> anyhow::Result<()> {
        while !input.quit.load(Ordering::Relaxed) {
            // Read before polling so a message sent just ahead of closing is seen.
            let closed = input.closed.load(Ordering::Acquire);
            let msg = match msg_rx.try_recv() {
                Ok(msg) => msg,
                Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) if !has_work(closed, &self.state) => break,
                Err(TryRecvError::Empty) => match msg_rx.recv_timeout(RENDER_INTERVAL) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => Msg::Tick,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
            };
            self.dispatch(msg)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) -> anyhow::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        set_submission(match state.lifecycle() {
            Lifecycle::InFlight { submission } => submission,
            Lifecycle::Idle => 0,
        });
        self.runner.enqueue(effects);

        let view = state.consume_dirty().then(|| state.view());
        self.state = state;
        if let Some(view) = view {
            self.present(&view).context("writing to the terminal")?;
        }
        Ok(())
    }

    fn present(&mut self, view: &AppViewModel) -> io::Result<()> {
        let cmds = render(view, &mut self.cursor);
        let transcript_changed = cmds.iter().any(|cmd| {
            matches!(
                cmd,
                TerminalCommand::PrintEntry { .. } | TerminalCommand::ClearTranscript
            )
        });
        for cmd in cmds {
            self.execute(cmd)?;
        }
        if transcript_changed {
            self.write_page(view);
        }
        Ok(())
    }

    fn execute(&mut self, cmd: TerminalCommand) -> io::Result<()> {
        let mut out = self.out.lock();
        match cmd {
            TerminalCommand::ClearTranscript => {
                writeln!(out, "\n── new conversation ──\n")?;
                if self.interactive {
                    write!(out, "{PROMPT}")?;
                }
            }
            TerminalCommand::PrintEntry { role, html } => {
                let heading = match role {
                    Role::User => USER_HEADING,
                    Role::Assistant => ASSISTANT_HEADING,
                };
                writeln!(out, "{heading}\n{html}\n")?;
                if self.interactive && role == Role::Assistant {
                    write!(out, "{PROMPT}")?;
                }
            }
            TerminalCommand::ShowProgress(line) => write!(out, "\r\x1b[2K{line}")?,
            TerminalCommand::ClearProgress => write!(out, "\r\x1b[2K")?,
            TerminalCommand::ShowStatus(text) => writeln!(out, "\r\x1b[2K[{text}]")?,
        }
        out.flush()
    }

    fn write_page(&self, view: &AppViewModel) {
        let Some(writer) = &self.page else {
            return;
        };
        let page = match transcript_page(&view.transcript, &Utc::now().to_rfc3339()) {
            Ok(page) => page,
            Err(err) => {
                engine_error!("Failed to render transcript page: {}", err);
                return;
            }
        };
        if let Err(err) = writer.write(&page) {
            engine_error!("Failed to write transcript page {:?}: {}", writer.target(), err);
        }
    }

    fn print_banner(&mut self) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "{HELP_TEXT}")?;
        write!(out, "{PROMPT}")?;
        out.flush()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    NewConversation,
    Health,
    Help,
    Quit,
    Empty,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" => Input::Empty,
        CMD_NEW => Input::NewConversation,
        CMD_HEALTH => Input::Health,
        CMD_HELP => Input::Help,
        CMD_QUIT => Input::Quit,
        text => Input::Message(text.to_string()),
    }
}

fn spawn_input_thread(config: ClientConfig, msg_tx: Sender<Msg>, input: Arc<InputState>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let msg = match parse_input(&line) {
                Input::Quit => {
                    input.quit.store(true, Ordering::Relaxed);
                    break;
                }
                Input::Empty => continue,
                Input::Help => {
                    println!("{HELP_TEXT}");
                    continue;
                }
                Input::NewConversation => Msg::NewConversation,
                Input::Health => Msg::HealthRequested,
                Input::Message(text) => Msg::Submit(config.request(&text)),
            };
            if msg_tx.send(msg).is_err() {
                break;
            }
        }
        input.closed.store(true, Ordering::Release);
    });
}
