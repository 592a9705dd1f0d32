//! Line-oriented front-end over the framework and modal managers.
//!
//! Commands run on the shell's task. Fetches are spawned and report back
//! through a channel, so the prompt stays responsive and a newer `open`
//! supersedes one still in flight.

mod command;
mod render;

pub use command::{Command, CommandError, HELP};
pub use render::{
    render_content, render_frameworks, render_header, render_page_controls, render_stepper,
    render_table,
};

use std::io::{self, Write};

use compass_lib::ApiClient;
use compass_lib::error::Error;
use compass_lib::model::{ControlItem, Framework};
use compass_lib::services::FrameworkService;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::framework_manager::{FrameworkManager, OpenTicket, route_framework_id};
use crate::modal_manager::ModalManager;

const PROMPT: &str = "compass> ";

/// Whether the shell keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Result of a spawned fetch.
#[derive(Debug)]
pub enum ShellEvent {
    Frameworks(Result<Vec<Framework>, Error>),
    Rows {
        ticket: OpenTicket,
        result: Result<Vec<ControlItem>, Error>,
    },
}

pub struct Shell<W: Write> {
    api: ApiClient,
    frameworks: FrameworkService,
    manager: FrameworkManager,
    modal: ModalManager,
    events_tx: UnboundedSender<ShellEvent>,
    events_rx: UnboundedReceiver<ShellEvent>,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(api: ApiClient, page_size: usize, out: W) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            frameworks: FrameworkService::new(api.clone()),
            api,
            manager: FrameworkManager::new(page_size),
            modal: ModalManager::new(),
            events_tx,
            events_rx,
            out,
        }
    }

    pub fn manager(&self) -> &FrameworkManager {
        &self.manager
    }

    pub fn modal(&self) -> &ModalManager {
        &self.modal
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    /// Fetch the framework list in the background.
    pub fn spawn_frameworks(&self) {
        let service = self.frameworks.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.get_frameworks().await;
            let _ = tx.send(ShellEvent::Frameworks(result));
        });
    }

    /// Open a framework by id or `/framework/<id>` route.
    ///
    /// The rows are fetched in the background; the request cancels any
    /// earlier one still in flight.
    pub fn open(&mut self, target: &str) -> io::Result<()> {
        let id = route_framework_id(target).unwrap_or_else(|| target.trim().to_string());
        let Some(ticket) = self.manager.navigate_to_framework(&id, false) else {
            return self.show_page();
        };

        writeln!(self.out, "{}", render_header(self.manager.header()))?;
        writeln!(self.out, "{}", render_content(&self.manager))?;

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.get_framework_rows(ticket.framework_id(), None).await;
            let _ = tx.send(ShellEvent::Rows { ticket, result });
        });
        Ok(())
    }

    /// Wait for the next fetch result.
    pub async fn next_event(&mut self) -> Option<ShellEvent> {
        self.events_rx.recv().await
    }

    pub fn handle_event(&mut self, event: ShellEvent) -> io::Result<()> {
        match event {
            ShellEvent::Frameworks(Ok(frameworks)) => {
                self.manager.set_frameworks(frameworks);
                write!(
                    self.out,
                    "{}",
                    render_frameworks(self.manager.frameworks(), self.manager.active_id())
                )
            }
            ShellEvent::Frameworks(Err(e)) => {
                log::error!("Failed to load frameworks: {}", e);
                writeln!(self.out, "Failed to load frameworks: {}", e)
            }
            ShellEvent::Rows { ticket, result } => {
                if self.manager.complete_open(&ticket, result) {
                    self.show_page()?;
                }
                Ok(())
            }
        }
    }

    pub async fn execute(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::List => {
                writeln!(self.out, "Loading frameworks...")?;
                self.spawn_frameworks();
            }
            Command::Open(target) => self.open(&target)?,
            Command::Search(text) => {
                self.manager.search(&text);
                self.show_content()?;
            }
            Command::Clear => {
                self.manager.clear_search();
                self.show_content()?;
            }
            Command::Sort(key) => {
                self.manager.sort(&key);
                self.show_content()?;
            }
            Command::Page(page) => {
                self.manager.go_to_page(page);
                self.show_content()?;
            }
            Command::Next => {
                self.manager.next_page();
                self.show_content()?;
            }
            Command::Prev => {
                self.manager.prev_page();
                self.show_content()?;
            }
            Command::Size(size) => {
                self.manager.set_page_size(size);
                self.show_content()?;
            }
            Command::New => match self.modal.open_new_framework_modal() {
                Ok(()) => self.show_wizard()?,
                Err(e) => writeln!(self.out, "Cannot open wizard: {}", e)?,
            },
            Command::Set { field, value } => {
                if self.require_wizard()? {
                    if !self.modal.set_field(&field, &value) {
                        writeln!(self.out, "Unknown field '{}'", field)?;
                    }
                    self.show_wizard()?;
                }
            }
            Command::Template(path) => {
                if self.require_wizard()? {
                    match self.modal.attach_template(&path).await {
                        Ok(count) => writeln!(self.out, "Read {} control items", count)?,
                        Err(e) => writeln!(self.out, "{}", e)?,
                    }
                    self.show_wizard()?;
                }
            }
            Command::Step(action) => {
                if self.require_wizard()? {
                    self.modal.step(&action);
                    self.show_wizard()?;
                }
            }
            Command::Submit => {
                if self.require_wizard()? {
                    match self.modal.submit(&self.frameworks).await {
                        Ok(created) => {
                            writeln!(
                                self.out,
                                "Framework created ({})",
                                created.id.as_deref().unwrap_or("no id")
                            )?;
                            self.spawn_frameworks();
                        }
                        Err(e) => {
                            writeln!(self.out, "{}", e)?;
                            self.show_wizard()?;
                        }
                    }
                }
            }
            Command::Cancel => {
                self.modal.close_new_framework_modal();
                writeln!(self.out, "Wizard closed")?;
            }
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => {
                self.api.abort();
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Read commands from `input` until it ends or `quit`, applying fetch
    /// results as they arrive.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> io::Result<()> {
        let mut lines = input.lines();
        self.prompt()?;
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !line.trim().is_empty() {
                        match line.parse::<Command>() {
                            Ok(command) => {
                                if self.execute(command).await? == Flow::Quit {
                                    break;
                                }
                            }
                            Err(e) => writeln!(self.out, "{}", e)?,
                        }
                    }
                    self.prompt()?;
                }
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event)?;
                    self.prompt()?;
                }
            }
        }
        Ok(())
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}", PROMPT)?;
        self.out.flush()
    }

    fn require_wizard(&mut self) -> io::Result<bool> {
        if !self.modal.is_open() {
            writeln!(self.out, "No wizard open, use 'new' first")?;
        }
        Ok(self.modal.is_open())
    }

    fn show_page(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", render_header(self.manager.header()))?;
        self.show_content()
    }

    fn show_content(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", render_content(&self.manager))
    }

    fn show_wizard(&mut self) -> io::Result<()> {
        let modal = &self.modal;
        let text = modal
            .with_stepper(|s| render_stepper(s, &modal.controls()))
            .unwrap_or_default();
        writeln!(self.out, "{}", text)
    }
}
