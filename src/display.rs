//! Rendering layer. All terminal I/O lives here.
//!
//! The simulation hands glyphs at screen-pixel positions to a `Canvas`;
//! `TerminalCanvas` maps those onto character cells.  HUD and menu overlays
//! read the session directly.  No game logic is performed here.

use std::io::{self, Write};

use astral_shards::config::ShopItemDef;
use astral_shards::entities::TextTone;
use astral_shards::inventory::CONSUMABLE_SLOTS;
use astral_shards::render::{Canvas, Glyph};
use astral_shards::session::Session;
use astral_shards::state::{GameStateManager, StateId};
use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;

/// World pixels covered by one terminal cell.
pub const CELL: Vec2 = Vec2::new(16.0, 32.0);

/// Rows taken by the HUD (top) and the inventory bar (bottom).
const PLAY_TOP: u16 = 1;
const PLAY_BOTTOM_MARGIN: u16 = 1;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD: Color = Color::Yellow;
const C_HUD_HP: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_HP_FRIENDLY: Color = Color::Green;
const C_HP_HOSTILE: Color = Color::Red;
const C_BOLT_PLAYER: Color = Color::Cyan;
const C_BOLT_ENEMY: Color = Color::Magenta;
const C_SHARD: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_BUFF: Color = Color::Cyan;
const C_SELECTED: Color = Color::Yellow;

/// Size of the playfield in world pixels for a terminal of `cols`×`rows`.
pub fn screen_size(cols: u16, rows: u16) -> Vec2 {
    let play_rows = rows.saturating_sub(PLAY_TOP + PLAY_BOTTOM_MARGIN);
    Vec2::new(cols as f32 * CELL.x, play_rows as f32 * CELL.y)
}

/// Centre of terminal cell (`col`, `row`) in screen pixels.
pub fn cell_to_screen(col: u16, row: u16) -> Vec2 {
    Vec2::new(
        (col as f32 + 0.5) * CELL.x,
        (row as f32 - PLAY_TOP as f32 + 0.5) * CELL.y,
    )
}

// ── Canvas ────────────────────────────────────────────────────────────────────

/// Queues glyphs onto a crossterm writer.  `Canvas::draw` can't fail, so the
/// first write error is kept and returned by `finish`.
pub struct TerminalCanvas<'w, W: Write> {
    out: &'w mut W,
    cols: u16,
    rows: u16,
    error: Option<io::Error>,
}

impl<'w, W: Write> TerminalCanvas<'w, W> {
    pub fn new(out: &'w mut W, cols: u16, rows: u16) -> Self {
        Self {
            out,
            cols,
            rows,
            error: None,
        }
    }

    pub fn finish(self) -> io::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Print `text` centred on the cell under `at`, clipped to the playfield.
    fn put(&mut self, at: Vec2, color: Color, text: &str) -> io::Result<()> {
        let width = text.chars().count() as i32;
        let col = (at.x / CELL.x).floor() as i32 - width / 2;
        let row = (at.y / CELL.y).floor() as i32 + PLAY_TOP as i32;
        let last_row = self.rows.saturating_sub(PLAY_BOTTOM_MARGIN) as i32;
        if row < PLAY_TOP as i32 || row >= last_row || col < 0 || col + width > self.cols as i32 {
            return Ok(());
        }
        self.out.queue(cursor::MoveTo(col as u16, row as u16))?;
        self.out.queue(style::SetForegroundColor(color))?;
        self.out.queue(Print(text))?;
        Ok(())
    }
}

impl<W: Write> Canvas for TerminalCanvas<'_, W> {
    fn draw(&mut self, glyph: Glyph<'_>, at: Vec2) {
        let result = match glyph {
            Glyph::Player { facing_right } => {
                self.put(at, C_PLAYER, if facing_right { "@>" } else { "<@" })
            }
            Glyph::Enemy { kind, lift, .. } => {
                let mark = kind
                    .chars()
                    .next()
                    .map(|c| c.to_ascii_uppercase())
                    .unwrap_or('?')
                    .to_string();
                self.put(at - Vec2::new(0.0, lift), C_ENEMY, &mark)
            }
            Glyph::HealthBar { fraction, hostile } => {
                let filled = (fraction * 5.0).round() as usize;
                let bar = format!("{}{}", "█".repeat(filled), "░".repeat(5 - filled.min(5)));
                let color = if hostile { C_HP_HOSTILE } else { C_HP_FRIENDLY };
                self.put(at, color, &bar)
            }
            Glyph::Projectile { hostile: true } => self.put(at, C_BOLT_ENEMY, "•"),
            Glyph::Projectile { hostile: false } => self.put(at, C_BOLT_PLAYER, "*"),
            Glyph::Shard => self.put(at, C_SHARD, "◆"),
            Glyph::Item { .. } => self.put(at, C_BUFF, "!"),
            Glyph::Text { text, tone, alpha } => {
                let color = match (tone, alpha > 0.5) {
                    (TextTone::Damage, true) => Color::Red,
                    (TextTone::Damage, false) => Color::DarkRed,
                    (TextTone::Heal, true) => Color::Green,
                    (TextTone::Heal, false) => Color::DarkGreen,
                };
                self.put(at, color, text)
            }
        };
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    session: &Session,
    states: &GameStateManager,
) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let mut canvas = TerminalCanvas::new(out, cols, rows);
    states.render(session, &mut canvas);
    canvas.finish()?;

    match states.current() {
        StateId::Start => draw_start(out, cols, rows)?,
        StateId::Gameplay => {
            draw_hud(out, session, cols)?;
            draw_inventory(out, session, rows)?;
        }
        StateId::Paused => {
            draw_hud(out, session, cols)?;
            draw_box(
                out,
                cols,
                rows,
                &[("PAUSED", Color::Cyan)],
                "ESC - Resume  R - Restart  Q - Quit",
            )?;
        }
        StateId::Shop => {
            draw_hud(out, session, cols)?;
            draw_shop(out, session, cols, rows)?;
        }
        StateId::End => draw_end(out, session, cols, rows)?,
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, session: &Session, cols: u16) -> io::Result<()> {
    let now = session.now();
    let player = &session.player;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HP))?;
    out.queue(Print(format!("HP {:>3.0}/{:<3.0}", player.hp, player.max_hp)))?;
    out.queue(style::SetForegroundColor(C_SHARD))?;
    out.queue(Print(format!("  ◆ {:<4}", player.astral_shards)))?;

    // Wave, centred
    let wave = match (
        session.waves.current_wave_number(),
        session.waves.time_remaining(now),
    ) {
        (Some(number), Some(left)) => format!(
            "[ WAVE {number}/{}  {left:>4.1}s ]",
            session.waves.wave_count()
        ),
        _ => "[ NO WAVE ]".to_string(),
    };
    let wx = (cols / 2).saturating_sub(wave.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(wx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(&wave))?;

    // Active buffs, right-aligned
    let buffs: Vec<String> = player
        .buffs
        .iter()
        .map(|(kind, buff)| {
            format!(
                "{}{:+.1} {:.0}s",
                kind.label(),
                buff.magnitude,
                (buff.expires_at - now).max(0.0)
            )
        })
        .collect();
    if !buffs.is_empty() {
        let tag = buffs.join("  ");
        let bx = cols.saturating_sub(tag.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(bx, 0))?;
        out.queue(style::SetForegroundColor(C_BUFF))?;
        out.queue(Print(&tag))?;
    }
    Ok(())
}

// ── Inventory bar (last row) ──────────────────────────────────────────────────

fn draw_inventory<W: Write>(out: &mut W, session: &Session, rows: u16) -> io::Result<()> {
    let now = session.now();
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    for (slot, item) in session.player.inventory.consumables.iter().enumerate() {
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!("[{}] ", slot + 1)))?;
        match item {
            Some(consumable) if consumable.is_active => {
                out.queue(style::SetForegroundColor(C_BUFF))?;
                out.queue(Print(format!(
                    "{} {:.0}s  ",
                    consumable.name,
                    consumable.time_remaining(now)
                )))?;
            }
            Some(consumable) => {
                out.queue(style::SetForegroundColor(Color::White))?;
                out.queue(Print(format!("{}  ", consumable.name)))?;
            }
            None => {
                out.queue(Print("-  "))?;
            }
        }
    }
    if let Some(weapon) = &session.player.inventory.weapon {
        out.queue(style::SetForegroundColor(C_HUD))?;
        out.queue(Print(format!("| {weapon} ")))?;
    }
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!(
        " WASD move  SPACE/click fire  1-{CONSUMABLE_SLOTS} use  B shop  ESC pause"
    )))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

/// A framed, centred block of lines with a hint underneath.
fn draw_box<W: Write>(
    out: &mut W,
    cols: u16,
    rows: u16,
    lines: &[(&str, Color)],
    hint: &str,
) -> io::Result<()> {
    let inner = lines
        .iter()
        .map(|(text, _)| text.chars().count())
        .max()
        .unwrap_or(0)
        + 4;
    let cx = cols / 2;
    let start_row = (rows / 2).saturating_sub(lines.len() as u16 / 2 + 2);
    let frame_col = cx.saturating_sub(inner as u16 / 2 + 1);

    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(cursor::MoveTo(frame_col, start_row))?;
    out.queue(Print(format!("╔{}╗", "═".repeat(inner))))?;
    for (i, (text, color)) in lines.iter().enumerate() {
        out.queue(cursor::MoveTo(frame_col, start_row + 1 + i as u16))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print("║"))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:^width$}", text, width = inner)))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print("║"))?;
    }
    let bottom = start_row + 1 + lines.len() as u16;
    out.queue(cursor::MoveTo(frame_col, bottom))?;
    out.queue(Print(format!("╚{}╝", "═".repeat(inner))))?;

    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, bottom + 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

fn draw_start<W: Write>(out: &mut W, cols: u16, rows: u16) -> io::Result<()> {
    draw_box(
        out,
        cols,
        rows,
        &[
            ("✦  ASTRAL  SHARDS  ✦", Color::Cyan),
            ("", Color::White),
            ("Survive the waves. Collect the shards.", Color::White),
        ],
        "ENTER - Start  Q - Quit",
    )
}

fn draw_shop<W: Write>(out: &mut W, session: &Session, cols: u16, rows: u16) -> io::Result<()> {
    let shop = &session.shop;
    let lines: Vec<(String, Color)> = shop
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if i == shop.selected { '▶' } else { ' ' };
            let kind = match item {
                ShopItemDef::Buff { .. } => "upgrade",
                ShopItemDef::Consumable { .. } => "item",
            };
            let color = if i == shop.selected { C_SELECTED } else { Color::White };
            (
                format!(
                    "{marker} {:<18} {:>4} ◆  {kind:<7} {}",
                    item.name(),
                    item.cost(),
                    item.description()
                ),
                color,
            )
        })
        .collect();

    let mut rows_out: Vec<(&str, Color)> = vec![("SHOP", Color::Cyan), ("", Color::White)];
    rows_out.extend(lines.iter().map(|(text, color)| (text.as_str(), *color)));
    let balance = format!("You have {} ◆", session.player.astral_shards);
    rows_out.push(("", Color::White));
    rows_out.push((balance.as_str(), C_SHARD));
    if let Some(notice) = &shop.notice {
        rows_out.push((notice.as_str(), Color::Magenta));
    }
    draw_box(out, cols, rows, &rows_out, "↑↓ Select  ENTER Buy  B/ESC Close")
}

fn draw_end<W: Write>(out: &mut W, session: &Session, cols: u16, rows: u16) -> io::Result<()> {
    let wave = match session.waves.current_wave_number() {
        Some(number) => format!("Fell during wave {number}"),
        None => "Fell after the last wave".to_string(),
    };
    let shards = format!("Astral shards: {}", session.player.astral_shards);
    draw_box(
        out,
        cols,
        rows,
        &[
            ("GAME  OVER", Color::Red),
            ("", Color::White),
            (wave.as_str(), Color::White),
            (shards.as_str(), C_SHARD),
        ],
        "R - Play Again  Q - Quit",
    )
}
