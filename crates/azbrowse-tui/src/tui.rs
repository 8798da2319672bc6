//! Screen session for the browser.
//!
//! `Tui` owns the ratatui terminal and remembers whether the screen has been
//! taken over, so leaving is idempotent: the explicit `exit`, `Drop` and the
//! panic hook can all run without double-restoring.

use std::io::{self, Stdout, Write, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

pub type Backend = CrosstermBackend<Stdout>;

pub struct Tui {
    terminal: Terminal<Backend>,
    active: bool,
}

impl Tui {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout()))?,
            active: false,
        })
    }

    /// Raw mode, alternate screen and mouse capture (for the wheel).
    pub fn enter(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        self.active = true;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn exit(&mut self) {
        if std::mem::take(&mut self.active) {
            restore_terminal();
        }
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// (cols, rows)
    pub fn size(&self) -> Result<(u16, u16)> {
        let area = self.terminal.size()?;
        Ok((area.width, area.height))
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Queue the escape sequences that undo [`Tui::enter`] and flush them.
fn write_restore(out: &mut impl Write) -> io::Result<()> {
    queue!(out, cursor::Show, DisableMouseCapture, LeaveAlternateScreen)?;
    out.flush()
}

/// Errors are ignored so every step runs.
fn restore_terminal() {
    let _ = write_restore(&mut stdout());
    let _ = terminal::disable_raw_mode();
}

/// color-eyre report and panic hooks. The panic hook puts the terminal back
/// before the report is printed, so a crash mid-draw stays readable.
/// Install before [`Tui::enter`].
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let report = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        report(info);
    }));
    Ok(())
}
