use indoc::indoc;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::{PreviewApp, STATUS_ROWS};
use crate::input::RouteOutcome;
use crate::layout::{NormalizedRect, PlayerSlot};

const HELP_INTRO: &str = indoc! {"
    Each bordered region is one player's viewport. Mouse and
    keyboard input goes to the pane under the pointer; a left
    click also moves keyboard/mouse focus there.
"};

const SLOT_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
];

fn slot_color(slot: PlayerSlot) -> Color {
    SLOT_COLORS[slot.index() as usize % SLOT_COLORS.len()]
}

pub fn draw(frame: &mut Frame, app: &PreviewApp) {
    let [panes_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_ROWS)])
            .areas(frame.area());
    draw_panes(frame, app, panes_area);
    draw_status(frame, app, status_area);
    if app.state().help_visible() {
        draw_help(frame, app, panes_area);
    }
}

/// Maps a normalized rect onto terminal cells. Edges are rounded
/// independently so neighbouring panes share a boundary without gaps.
pub fn cell_rect(rect: NormalizedRect, area: Rect) -> Rect {
    let to_cells = |fraction: f32, extent: u16| -> u16 {
        let cells = (fraction * f32::from(extent)).round();
        cells.clamp(0.0, f32::from(extent)) as u16
    };
    let max = rect.max();
    let x0 = to_cells(rect.origin.x, area.width);
    let x1 = to_cells(max.x, area.width);
    let y0 = to_cells(rect.origin.y, area.height);
    let y1 = to_cells(max.y, area.height);
    Rect {
        x: area.x + x0,
        y: area.y + y0,
        width: x1.saturating_sub(x0),
        height: y1.saturating_sub(y0),
    }
}

fn draw_panes(frame: &mut Frame, app: &PreviewApp, area: Rect) {
    let compositor = app.compositor();
    if compositor.state().active_layout().is_none() {
        frame.render_widget(
            Paragraph::new("no layout active; engine default viewports in use")
                .style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let focused = compositor.focused_player();
    let highlight = compositor.is_focus_highlighting_enabled();

    for slot in compositor.player_rects().draw_order() {
        let rect = compositor.player_rect(slot);
        let cells = cell_rect(rect, area);
        if cells.width < 2 || cells.height < 2 {
            continue;
        }
        let is_focused = slot == focused;
        let mut border = Style::default().fg(slot_color(slot));
        if is_focused && highlight {
            border = border.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }

        let mut title = format!(" P{slot}");
        if let Some(pane) = compositor.pane(slot) {
            title.push_str(&format!(" | {}", pane.camera_mode));
            if let Some(hud) = &pane.hud_class {
                title.push_str(&format!(" | {hud}"));
            }
        }
        if is_focused {
            title.push_str(" *");
        }
        title.push(' ');

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border);
        frame.render_widget(Clear, cells);
        frame.render_widget(
            Paragraph::new(pane_body(app, slot)).block(block),
            cells,
        );
    }
}

fn pane_body(app: &PreviewApp, slot: PlayerSlot) -> Vec<Line<'static>> {
    let compositor = app.compositor();
    let mut lines = Vec::new();
    if let Some(pawn) = compositor.pawn(slot) {
        let at = pawn.transform().translation;
        lines.push(Line::from(format!(
            "{} @ ({:.0}, {:.0}, {:.0})",
            pawn.class(),
            at.x,
            at.y,
            at.z
        )));
    }
    if let Some(player) = compositor.host().player(slot) {
        let cursor = match player.cursor_visible {
            Some(true) => "cursor visible",
            Some(false) => "cursor hidden",
            None => "cursor default",
        };
        lines.push(Line::from(format!("{} events | {cursor}", player.delivered)));
        if let Some(last) = player.received.last() {
            lines.push(Line::from(Span::styled(
                format!("last: {}", last.input_key()),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines
}

fn describe_route(outcome: &RouteOutcome) -> String {
    match outcome {
        RouteOutcome::Forwarded { slot, handled: true } => format!("P{slot}"),
        RouteOutcome::Forwarded {
            slot,
            handled: false,
        } => format!("P{slot} (unhandled)"),
        RouteOutcome::Bypassed { .. } => "default dispatch".to_string(),
        RouteOutcome::Swallowed(reason) => format!("swallowed ({reason:?})"),
    }
}

fn draw_status(frame: &mut Frame, app: &PreviewApp, area: Rect) {
    let compositor = app.compositor();
    let layout_name = match (app.state().preset(), compositor.state().active_layout()) {
        (Some(preset), _) => preset.title().to_string(),
        (None, Some(layout)) => layout.display_name().to_string(),
        (None, None) => "none".to_string(),
    };
    let mut spans = vec![
        Span::styled(
            format!(" {layout_name} "),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
        Span::raw(format!(
            " focus P{} | click-to-focus {} ",
            compositor.focused_player(),
            if compositor.is_click_to_focus_enabled() {
                "on"
            } else {
                "off"
            }
        )),
    ];
    if let Some((event, outcome)) = app.last_route() {
        spans.push(Span::raw(format!(
            "| {} -> {} ",
            event.input_key(),
            describe_route(outcome)
        )));
    }
    if let Some(line) = app.latest_log_line() {
        spans.push(Span::styled(
            format!("| {line}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame, app: &PreviewApp, area: Rect) {
    let entries = app.bindings().help_entries();
    let key_width = entries.iter().map(|(keys, _)| keys.len()).max().unwrap_or(0);

    let mut lines: Vec<Line> = HELP_INTRO.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    for (keys, description) in entries {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{keys:<key_width$}  "),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(description),
        ]));
    }

    let width = area.width.min(64);
    let height = area.height.min(lines.len() as u16 + 2);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" Help ").borders(Borders::ALL)),
        popup,
    );
}
