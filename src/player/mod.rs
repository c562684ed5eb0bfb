//! Player: the live terminal stage.
//!
//! Feeds wall-clock time into the engine, paints the stage through the
//! renderer, and maps key presses onto program edits, play/stop and block
//! clicks. Block semantics stay in the engine; the player only displays.

mod input;
mod palette;
pub mod state;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{cursor, event, execute, queue, style, terminal};

use crate::engine::SpriteHost;
use crate::menubar::print_menu_item;
use crate::renderer::{Grid, StageRenderer, StageScene};
use crate::types::{Cell, Color, NamedColor, Style};
use input::Action;
use state::StageState;

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;
/// Width of the sprite/script panel on the right.
const PANEL_WIDTH: u16 = 30;
/// Upper bound on how long the loop sleeps waiting for input.
const IDLE_POLL: Duration = Duration::from_millis(50);
/// How long the swap banner stays in the status line.
const BANNER_MS: u64 = 2000;

pub struct Player {
    state: StageState,
    grid: Grid,
    canvas: (u16, u16),
    fullscreen: bool,
    last_status: String,
}

impl Player {
    pub fn new(state: StageState) -> Self {
        Self {
            state,
            grid: Vec::new(),
            canvas: (0, 0),
            fullscreen: false,
            last_status: String::new(),
        }
    }

    /// Run the stage in the terminal until the user quits.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.full_redraw(stdout)?;
        let mut last = Instant::now();

        loop {
            let wait = self
                .state
                .engine
                .next_deadline()
                .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));

            if event::poll(wait)? {
                match input::handle_event(&mut self.state, event::read()?) {
                    Action::Continue => {}
                    Action::Redraw => self.full_redraw(stdout)?,
                    Action::ToggleFullscreen => {
                        self.fullscreen = !self.fullscreen;
                        if self.fullscreen {
                            stdout.write_all(b"\x1b[10;1t")?;
                        } else {
                            stdout.write_all(b"\x1b[10;0t")?;
                        }
                        stdout.flush()?;
                        self.full_redraw(stdout)?;
                    }
                    Action::Quit => break,
                }
            }

            let now = Instant::now();
            let state = &mut self.state;
            state.engine.advance(now - last, &mut state.program);
            last = now;

            self.render_stage(stdout, false)?;
            self.render_status(stdout, false)?;
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn full_redraw(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        // +2: one row for menu bar, one row for status bar
        self.canvas = (
            term_w.saturating_sub(PANEL_WIDTH),
            term_h.saturating_sub(CANVAS_OFFSET + 1),
        );
        let (w, h) = StageRenderer::viewport_for(self.canvas.0, self.canvas.1);
        self.state.engine.set_viewport(w, h);

        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
        self.render_menubar(stdout)?;
        self.render_stage(stdout, true)?;
        self.render_panel(stdout)?;
        self.render_status(stdout, true)?;
        stdout.flush()?;
        Ok(())
    }

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let k = &self.state.config.key_bindings;
        let items = [
            format!("[{}] play/stop", k.toggle_play),
            format!("[{}] sprite", k.next_sprite),
            format!("[{}/{}] palette", k.palette_prev, k.palette_next),
            format!("[{}] add", k.add_block),
            format!("[{}] click", k.click_block),
            format!("[{}/{}] value", k.increase, k.decrease),
            format!("[{}] del", k.remove_block),
            format!("[{}] quit", k.quit),
        ];

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            print_menu_item(stdout, item)?;
        }
        Ok(())
    }

    /// Paint the canvas, only changed cells unless `full`.
    fn render_stage(&mut self, stdout: &mut io::Stdout, full: bool) -> Result<()> {
        let (w, h) = self.canvas;
        let views = self.state.engine.views();
        let ops = StageRenderer::compose(&StageScene {
            views: &views,
            sprites: self.state.program.sprites(),
            colliding: self.state.engine.colliding_pair(),
        });
        let grid = StageRenderer::rasterize(&ops, w, h);

        let same_size = self.grid.len() == grid.len()
            && self.grid.first().map(Vec::len) == grid.first().map(Vec::len);
        if full || !same_size {
            for (y, row) in grid.iter().enumerate() {
                queue!(stdout, cursor::MoveTo(0, y as u16 + CANVAS_OFFSET))?;
                for cell in row {
                    print_cell(stdout, cell)?;
                }
            }
        } else {
            for change in StageRenderer::diff(&self.grid, &grid) {
                queue!(stdout, cursor::MoveTo(change.x, change.y + CANVAS_OFFSET))?;
                print_cell(stdout, &change.cell)?;
            }
        }
        stdout.flush()?;
        self.grid = grid;
        Ok(())
    }

    fn render_panel(&self, stdout: &mut io::Stdout) -> Result<()> {
        let x = self.canvas.0;
        let width = PANEL_WIDTH as usize;
        let mut lines: Vec<(String, bool)> = vec![("Sprites".into(), false)];

        for (i, sprite) in self.state.program.sprites().iter().enumerate() {
            let marker = if i == self.state.selected_sprite { '>' } else { ' ' };
            lines.push((format!("{marker} {}", sprite.name), i == self.state.selected_sprite));
        }
        lines.push((String::new(), false));

        match self.state.selected_sprite() {
            Some(sprite) => {
                lines.push((format!("Script: {}", sprite.name), false));
                if sprite.animations.is_empty() {
                    lines.push(("  (empty)".into(), false));
                }
                for (i, block) in sprite.animations.iter().enumerate() {
                    let selected = i == self.state.selected_block;
                    let marker = if selected { '>' } else { ' ' };
                    lines.push((format!("{marker} {}", block.kind.summary()), selected));
                }
            }
            None => lines.push(("No sprites".into(), false)),
        }
        lines.push((String::new(), false));
        if let Some(item) = self.state.palette_item() {
            lines.push((format!("Add: < {} >", item.summary()), false));
        }

        let rows = self.canvas.1 as usize;
        for (row, (text, selected)) in lines.into_iter().take(rows).enumerate() {
            let clipped: String = text.chars().take(width - 1).collect();
            queue!(stdout, cursor::MoveTo(x, row as u16 + CANVAS_OFFSET), style::Print("│"))?;
            if selected {
                queue!(
                    stdout,
                    style::SetAttribute(style::Attribute::Reverse),
                    style::Print(clipped),
                    style::SetAttribute(style::Attribute::Reset),
                )?;
            } else {
                queue!(stdout, style::Print(clipped))?;
            }
        }
        Ok(())
    }

    fn render_status(&mut self, stdout: &mut io::Stdout, force: bool) -> Result<()> {
        let status_y = self.canvas.1 + CANVAS_OFFSET;
        let engine = &self.state.engine;

        let play = if engine.is_running() { "PLAYING" } else { "STOPPED" };
        let banner = engine
            .last_swap()
            .filter(|swap| engine.elapsed().as_millis() as u64 <= swap.timestamp_ms + BANNER_MS)
            .map(|swap| format!(" | {} \u{21c4} {}", swap.left_name, swap.right_name))
            .unwrap_or_default();
        let status = format!(" {play} | tick {}{banner}", engine.ticks());

        if !force && status == self.last_status {
            return Ok(());
        }

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);
        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status.clone())),
        )?;
        stdout.flush()?;
        self.last_status = status;
        Ok(())
    }
}

fn print_cell(stdout: &mut io::Stdout, cell: &Cell) -> Result<()> {
    let cs = to_content_style(&cell.style);
    queue!(
        stdout,
        style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    cs.foreground_color = s.fg.map(to_ct_color);
    cs.background_color = s.bg.map(to_ct_color);
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb { r, g, b },
    }
}
