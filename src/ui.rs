//! Terminal output for gh-switch: colour detection, status lines, tables, spinners.
//!
//! Colour is off when any of these hold, checked in order:
//! 1. `--no-color` was passed
//! 2. `NO_COLOR` is set (any value)
//! 3. `TERM=dumb`
//! 4. `--color auto` and stdout is not a terminal

use anstream::{eprintln, println};
use anstyle::{AnsiColor, Color, Style};
use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets};
use indicatif::{ProgressBar, ProgressStyle};
use std::borrow::Cow;
use std::io::IsTerminal;
use std::time::Duration;

/// Value of `--color`
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Always,
    #[default]
    Auto,
    Never,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            other => Err(format!("invalid color mode '{other}' (expected always, auto or never)")),
        }
    }
}

impl ColorMode {
    fn enabled(self, force_off: bool) -> bool {
        let env_off = std::env::var_os("NO_COLOR").is_some()
            || std::env::var("TERM").is_ok_and(|t| t == "dumb");

        !force_off
            && !env_off
            && match self {
                Self::Always => true,
                Self::Never => false,
                Self::Auto => std::io::stdout().is_terminal(),
            }
    }
}

/// Kind of a status line or icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Error,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Info => "INFO",
        }
    }

    fn color(self) -> AnsiColor {
        match self {
            Self::Ok => AnsiColor::Green,
            Self::Warn => AnsiColor::Yellow,
            Self::Error => AnsiColor::Red,
            Self::Info => AnsiColor::Cyan,
        }
    }

    /// (colour glyph, plain fallback)
    fn glyphs(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "[OK]"),
            Self::Warn => ("⚠", "[!]"),
            Self::Error => ("✗", "[X]"),
            Self::Info => ("•", "-"),
        }
    }
}

/// Resolved display settings, passed to every command handler
#[derive(Debug, Clone)]
pub struct Ui {
    pub color_enabled: bool,
    /// Spinners need colour and a terminal
    pub spinner_enabled: bool,
}

impl Default for Ui {
    fn default() -> Self {
        Self::new(ColorMode::Auto, false)
    }
}

impl Ui {
    pub fn new(mode: ColorMode, force_no_color: bool) -> Self {
        let color_enabled = mode.enabled(force_no_color);
        if !color_enabled {
            anstream::ColorChoice::write_global(anstream::ColorChoice::Never);
        }

        Self {
            color_enabled,
            spinner_enabled: color_enabled && std::io::stdout().is_terminal(),
        }
    }

    // -------------------------------------------------------------------------
    // Status lines
    // -------------------------------------------------------------------------

    /// `LABEL message`; errors go to stderr
    pub fn status(&self, status: Status, msg: impl AsRef<str>) {
        let style = if self.color_enabled {
            Style::new().fg_color(Some(Color::Ansi(status.color()))).bold()
        } else {
            Style::new()
        };
        let label = status.label();
        match status {
            Status::Error => eprintln!("{style}{label}{style:#} {}", msg.as_ref()),
            _ => println!("{style}{label}{style:#} {}", msg.as_ref()),
        }
    }

    pub fn ok(&self, msg: impl AsRef<str>) {
        self.status(Status::Ok, msg);
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.status(Status::Warn, msg);
    }

    pub fn err(&self, msg: impl AsRef<str>) {
        self.status(Status::Error, msg);
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.status(Status::Info, msg);
    }

    // -------------------------------------------------------------------------
    // Inline styling
    // -------------------------------------------------------------------------

    fn paint(&self, s: &str, style: Style) -> String {
        if self.color_enabled {
            format!("{style}{s}{style:#}")
        } else {
            s.to_string()
        }
    }

    pub fn dim(&self, s: impl AsRef<str>) -> String {
        self.colored(s, AnsiColor::BrightBlack)
    }

    pub fn bold(&self, s: impl AsRef<str>) -> String {
        self.paint(s.as_ref(), Style::new().bold())
    }

    pub fn colored(&self, s: impl AsRef<str>, color: AnsiColor) -> String {
        self.paint(s.as_ref(), Style::new().fg_color(Some(Color::Ansi(color))))
    }

    // -------------------------------------------------------------------------
    // Icons
    // -------------------------------------------------------------------------

    pub fn icon(&self, status: Status) -> &'static str {
        let (glyph, plain) = status.glyphs();
        if self.color_enabled { glyph } else { plain }
    }

    pub fn icon_ok(&self) -> &'static str {
        self.icon(Status::Ok)
    }

    pub fn icon_warn(&self) -> &'static str {
        self.icon(Status::Warn)
    }

    pub fn icon_err(&self) -> &'static str {
        self.icon(Status::Error)
    }

    pub fn icon_info(&self) -> &'static str {
        self.icon(Status::Info)
    }

    /// Marker shown next to the active profile
    pub fn icon_active(&self) -> &'static str {
        if self.color_enabled { "●" } else { "*" }
    }

    // -------------------------------------------------------------------------
    // Tables
    // -------------------------------------------------------------------------

    /// Bordered table (ASCII markdown without colour)
    pub fn table(&self) -> Table {
        let preset = if self.color_enabled {
            presets::UTF8_FULL_CONDENSED
        } else {
            presets::ASCII_MARKDOWN
        };
        let mut table = Table::new();
        table
            .load_preset(preset)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    /// Borderless table for label/value listings
    pub fn simple_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    pub fn cell(&self, content: impl Into<String>) -> Cell {
        Cell::new(content.into())
    }

    pub fn header_cell(&self, content: impl Into<String>) -> Cell {
        let cell = self.cell(content);
        if self.color_enabled { cell.add_attribute(Attribute::Bold) } else { cell }
    }

    /// Coloured through comfy-table so column widths ignore escape codes
    pub fn colored_cell(&self, content: impl Into<String>, color: comfy_table::Color) -> Cell {
        let cell = self.cell(content);
        if self.color_enabled { cell.fg(color) } else { cell }
    }

    // -------------------------------------------------------------------------
    // Spinners
    // -------------------------------------------------------------------------

    /// Spinner around a blocking git/ssh call; hidden when spinners are off
    pub fn spinner(&self, message: impl Into<Cow<'static, str>>) -> ProgressBar {
        if !self.spinner_enabled {
            let pb = ProgressBar::hidden();
            pb.set_message(message);
            return pb;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn finish(&self, pb: &ProgressBar, status: Status, msg: Cow<'static, str>) {
        if !self.spinner_enabled {
            pb.finish_and_clear();
            self.status(status, msg);
            return;
        }

        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            pb.set_style(style);
        }
        let icon = self.colored(self.icon(status), status.color());
        pb.finish_with_message(format!("{icon} {msg}"));
    }

    pub fn spinner_finish_ok(&self, pb: &ProgressBar, msg: impl Into<Cow<'static, str>>) {
        self.finish(pb, Status::Ok, msg.into());
    }

    pub fn spinner_finish_err(&self, pb: &ProgressBar, msg: impl Into<Cow<'static, str>>) {
        self.finish(pb, Status::Error, msg.into());
    }

    // -------------------------------------------------------------------------
    // Plain lines
    // -------------------------------------------------------------------------

    pub fn println(&self, msg: impl AsRef<str>) {
        println!("{}", msg.as_ref());
    }

    pub fn newline(&self) {
        println!();
    }

    pub fn section(&self, title: impl AsRef<str>) {
        println!("{}", self.bold(title));
    }

    /// Indented `Label: value`
    pub fn field(&self, label: &str, value: impl AsRef<str>) {
        println!("  {label}: {}", value.as_ref());
    }

    /// `Hint:` line pointing at the next command to run
    pub fn hint(&self, msg: impl AsRef<str>) {
        println!("{} {}", self.colored("Hint:", AnsiColor::Cyan), msg.as_ref());
    }

    /// Rule fencing a copy-paste block
    pub fn rule(&self) {
        println!("{}", self.dim("─".repeat(72)));
    }
}
