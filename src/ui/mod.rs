use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use regex::Regex;
use time::{macros::format_description, OffsetDateTime};
use unicode_width::UnicodeWidthStr;

use crate::app::state::{AppState, ExportKind, FocusPane, OverlayState};
use crate::config::ThemePalette;
use crate::highlight::build_highlight_regex;
use crate::journaling::AutoSaveStatus;

pub fn draw_app(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let palette = state.theme.palette();

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(vertical[0]);

    let highlight_regex = build_highlight_regex(&state.search.query);
    let highlight_style = Style::default()
        .fg(palette.highlight)
        .add_modifier(Modifier::BOLD);

    draw_note_list(
        frame,
        state,
        list_state,
        columns[0],
        &palette,
        highlight_regex.as_ref(),
        highlight_style,
    );
    draw_detail_pane(
        frame,
        state,
        columns[1],
        &palette,
        highlight_regex.as_ref(),
        highlight_style,
    );

    let status = build_status_line(state, &palette);
    let status_paragraph = Paragraph::new(status).style(Style::default().fg(palette.dim));
    frame.render_widget(status_paragraph, vertical[1]);

    render_overlay(frame, state, &palette);
}

#[allow(clippy::too_many_arguments)]
fn draw_note_list(
    frame: &mut Frame,
    state: &AppState,
    list_state: &mut ListState,
    area: Rect,
    palette: &ThemePalette,
    highlight_regex: Option<&Regex>,
    highlight_style: Style,
) {
    let border_style = if matches!(state.focus, FocusPane::List) {
        Style::default().fg(palette.accent)
    } else {
        Style::default()
    };

    let mut items = Vec::with_capacity(state.notes.len());
    for note in &state.notes {
        let mut title_spans = Vec::new();
        let is_editing = state
            .editor()
            .map(|editor| editor.note_id.as_deref() == Some(note.id.as_str()))
            .unwrap_or(false);
        if is_editing {
            let label = if state.editor().map(|e| e.dirty).unwrap_or(false) {
                "\u{270e}* "
            } else {
                "\u{270e} "
            };
            title_spans.push(Span::styled(
                label,
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        if note.pinned {
            title_spans.push(Span::styled(
                "\u{2605} ",
                Style::default()
                    .fg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        title_spans.extend(highlight_line(
            &note.title,
            highlight_regex,
            highlight_style,
            Style::default().add_modifier(Modifier::BOLD),
        ));

        let mut meta_spans = vec![Span::styled(
            format!("[{}]", note.category),
            Style::default().fg(palette.accent),
        )];
        if let Some(label) = &note.updated_label {
            meta_spans.push(Span::styled(
                format!(" saved {label}"),
                Style::default().fg(palette.dim),
            ));
        } else {
            meta_spans.push(Span::styled(" unsaved", Style::default().fg(palette.dim)));
        }

        let mut lines = vec![Line::from(title_spans), Line::from(meta_spans)];
        for preview in note.preview.lines() {
            lines.push(Line::from(highlight_line(
                preview,
                highlight_regex,
                highlight_style,
                Style::default(),
            )));
        }
        items.push(ListItem::new(lines));
    }
    if items.is_empty() {
        items.push(ListItem::new("No notes yet. Press `a` to create one."));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title("Notes")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .bg(palette.accent)
                .fg(palette.surface)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{25b8} ");
    frame.render_stateful_widget(list, area, list_state);
}

fn draw_detail_pane(
    frame: &mut Frame,
    state: &AppState,
    area: Rect,
    palette: &ThemePalette,
    highlight_regex: Option<&Regex>,
    highlight_style: Style,
) {
    let border_style = if matches!(state.focus, FocusPane::Editor) {
        Style::default().fg(palette.accent)
    } else {
        Style::default()
    };

    let text: Text = if let Some(editor) = state.editor() {
        let mut lines = Vec::new();
        let mode = if editor.dirty { "[EDIT*] " } else { "[EDIT] " };
        lines.push(Line::from(vec![
            Span::styled(
                mode,
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                editor.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  [{}]", editor.category),
                Style::default().fg(palette.accent),
            ),
        ]));
        lines.push(Line::from(""));
        let body_style = Style::default().add_modifier(style_modifiers(editor.style.flags));
        let alignment = match editor.style.alignment {
            crate::format::Alignment::Left => ratatui::layout::Alignment::Left,
            crate::format::Alignment::Center => ratatui::layout::Alignment::Center,
            crate::format::Alignment::Right => ratatui::layout::Alignment::Right,
        };
        if editor.buffer().is_empty() {
            lines.push(Line::from(""));
        } else {
            for line in editor.buffer().lines() {
                lines.push(
                    Line::from(Span::styled(line.to_string(), body_style)).alignment(alignment),
                );
            }
        }
        Text::from(lines)
    } else if let Some(note) = state.selected() {
        let mut lines = Vec::new();
        let mut header_spans = Vec::new();
        if note.pinned {
            header_spans.push(Span::styled(
                "\u{2605} ",
                Style::default()
                    .fg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        header_spans.extend(highlight_line(
            &note.title,
            highlight_regex,
            highlight_style,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        header_spans.push(Span::styled(
            format!("  [{}]", note.category),
            Style::default().fg(palette.accent),
        ));
        lines.push(Line::from(header_spans));
        if let Some(label) = &note.updated_label {
            lines.push(Line::from(Span::styled(
                format!("Saved {label}"),
                Style::default().fg(palette.dim),
            )));
        }
        lines.push(Line::from(""));
        lines.extend(body_lines(&note.content, highlight_regex, highlight_style));
        Text::from(lines)
    } else {
        Text::from("Select a note to see its contents.")
    };

    let title = if state.is_editing() { "Editor" } else { "Preview" };
    let mut detail = Paragraph::new(text).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    if !state.is_editing() {
        // The editor body must stay unwrapped so the cursor cell below can be
        // computed exactly; only the read-only preview wraps.
        detail = detail.wrap(Wrap { trim: false });
    }
    frame.render_widget(Clear, area);
    frame.render_widget(detail, area);

    if let Some(editor) = state.editor() {
        if let Some((cursor_x, cursor_y)) = editor_cursor_screen_position(
            editor.buffer(),
            editor.cursor,
            area,
            editor.style.alignment,
        ) {
            frame.set_cursor(cursor_x, cursor_y);
        }
    }
}

/// Maps the byte cursor in the edit buffer to a terminal cell. The body
/// renders without wrapping, so rows advance only on newlines; aligned lines
/// shift the column by the same offset the renderer applies. Long lines clip
/// at the border, pinning the cursor to the last visible cell.
fn editor_cursor_screen_position(
    buffer: &str,
    cursor: usize,
    area: Rect,
    alignment: crate::format::Alignment,
) -> Option<(u16, u16)> {
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    if inner_width == 0 || inner_height == 0 {
        return None;
    }

    let cursor = cursor.min(buffer.len());
    let line_start = buffer[..cursor].rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let line_end = buffer[cursor..]
        .find('\n')
        .map(|idx| cursor + idx)
        .unwrap_or(buffer.len());

    let width_limit = inner_width as usize;
    let line_width = UnicodeWidthStr::width(&buffer[line_start..line_end]);
    let offset = match alignment {
        crate::format::Alignment::Left => 0,
        crate::format::Alignment::Center => width_limit.saturating_sub(line_width) / 2,
        crate::format::Alignment::Right => width_limit.saturating_sub(line_width),
    };
    let col = offset + UnicodeWidthStr::width(&buffer[line_start..cursor]);
    let col = col.min(width_limit - 1) as u16;

    // Title line plus the blank separator sit above the body.
    let row = 2 + buffer[..cursor].matches('\n').count();
    let row = row.min(inner_height as usize - 1) as u16;
    Some((area.x + 1 + col, area.y + 1 + row))
}

fn build_status_line(state: &AppState, palette: &ThemePalette) -> Text<'static> {
    let counts = state.visible_counts();
    let position = if state.is_empty() {
        "0/0".to_string()
    } else {
        format!("{}/{}", state.selected + 1, state.len())
    };

    let mut spans = vec![
        Span::raw(format!("Words: {} | Chars: {}", counts.words, counts.chars)),
        Span::raw(" | Notes: "),
        Span::styled(position, Style::default().add_modifier(Modifier::BOLD)),
    ];

    if state.is_search_active() || !state.search.query.is_empty() {
        let label_style = if state.is_search_active() {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.dim)
        };
        spans.push(Span::raw(" | Search "));
        spans.push(Span::styled("/", label_style));
        if state.search.query.is_empty() {
            spans.push(Span::styled(
                "(type to search)",
                Style::default().fg(palette.dim),
            ));
        } else {
            spans.push(Span::styled(
                state.search.query.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        if state.is_search_active() {
            spans.push(Span::styled(
                " \u{258c}",
                Style::default().fg(palette.accent),
            ));
        }
    }

    match &state.autosave_status {
        AutoSaveStatus::Disabled => spans.push(Span::raw(" | Autosave: off")),
        AutoSaveStatus::Inactive => spans.push(Span::raw(" | Autosave: idle")),
        AutoSaveStatus::Idle { last_saved_at, .. } => {
            spans.push(Span::raw(" | Autosave: on"));
            if let Some(ts) = last_saved_at {
                spans.push(Span::styled(
                    format!(" {}", format_time_short(*ts)),
                    Style::default().fg(palette.dim),
                ));
            }
        }
        AutoSaveStatus::Error { message, .. } => {
            spans.push(Span::raw(" | Autosave: "));
            spans.push(Span::styled(
                format!("error ({message})"),
                Style::default().fg(palette.danger),
            ));
        }
    }

    if let Some(editor) = state.editor() {
        if !editor.style.is_plain() {
            let flags = editor.style.flags;
            let mut label = String::new();
            if flags.contains(crate::format::StyleFlags::BOLD) {
                label.push('B');
            }
            if flags.contains(crate::format::StyleFlags::ITALIC) {
                label.push('I');
            }
            if flags.contains(crate::format::StyleFlags::UNDERLINE) {
                label.push('U');
            }
            if label.is_empty() {
                label.push('-');
            }
            spans.push(Span::raw(" | Style: "));
            spans.push(Span::styled(
                format!("{label} {}pt {:?}", editor.style.size, editor.style.alignment),
                Style::default().fg(palette.accent),
            ));
        }
    }

    if let Some(message) = &state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(palette.accent),
        ));
    }

    let keys = if state.is_editing() {
        Span::styled(
            "Esc exit \u{2022} Ctrl-s save \u{2022} Ctrl-b bold \u{2022} Ctrl-k italic \u{2022} Ctrl-u underline \u{2022} Ctrl-l align \u{2022} Ctrl-\u{2191}/\u{2193} size",
            Style::default().fg(palette.dim),
        )
    } else {
        Span::styled(
            "j/k move \u{2022} / search \u{2022} R replace \u{2022} a add \u{2022} e edit \u{2022} p pin \u{2022} d delete \u{2022} D delete all \u{2022} o open \u{2022} z zip \u{2022} x pdf \u{2022} t theme \u{2022} q quit",
            Style::default().fg(palette.dim),
        )
    };

    Text::from(vec![Line::from(spans), Line::from(keys)])
}

fn format_time_short(dt: OffsetDateTime) -> String {
    dt.format(&format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| dt.unix_timestamp().to_string())
}

fn highlight_line(
    text: &str,
    regex: Option<&Regex>,
    highlight_style: Style,
    base_style: Style,
) -> Vec<Span<'static>> {
    if let Some(re) = regex {
        let mut spans = Vec::new();
        let mut last = 0;
        for mat in re.find_iter(text) {
            if mat.start() > last {
                spans.push(Span::styled(
                    text[last..mat.start()].to_string(),
                    base_style,
                ));
            }
            spans.push(Span::styled(mat.as_str().to_string(), highlight_style));
            last = mat.end();
        }
        if last < text.len() {
            spans.push(Span::styled(text[last..].to_string(), base_style));
        }
        if spans.is_empty() {
            spans.push(Span::styled(text.to_string(), base_style));
        }
        spans
    } else {
        vec![Span::styled(text.to_string(), base_style)]
    }
}

fn style_modifiers(flags: crate::format::StyleFlags) -> Modifier {
    let mut modifiers = Modifier::empty();
    if flags.contains(crate::format::StyleFlags::BOLD) {
        modifiers |= Modifier::BOLD;
    }
    if flags.contains(crate::format::StyleFlags::ITALIC) {
        modifiers |= Modifier::ITALIC;
    }
    if flags.contains(crate::format::StyleFlags::UNDERLINE) {
        modifiers |= Modifier::UNDERLINED;
    }
    modifiers
}

fn body_lines(body: &str, regex: Option<&Regex>, highlight_style: Style) -> Vec<Line<'static>> {
    if body.is_empty() {
        return vec![Line::from("")];
    }
    body.lines()
        .map(|line| {
            Line::from(highlight_line(
                line,
                regex,
                highlight_style,
                Style::default(),
            ))
        })
        .collect()
}

fn render_overlay(frame: &mut Frame, state: &AppState, palette: &ThemePalette) {
    match state.overlay() {
        Some(OverlayState::NewNote(draft)) => {
            let area = centered_rect(60, 30, frame.size());
            frame.render_widget(Clear, area);
            let mut title_display = draft.title.clone();
            title_display.push('\u{258c}');
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Create New Note",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(title_display),
                Line::from(Span::styled(
                    format!("Category: {} (Tab to change)", draft.category),
                    Style::default().fg(palette.accent),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter to start writing \u{2022} Esc to cancel",
                    Style::default().fg(palette.dim),
                )),
            ])
            .block(
                Block::default()
                    .title("New Note")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent)),
            )
            .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        Some(OverlayState::LoadPath(prompt)) => {
            let area = centered_rect(70, 30, frame.size());
            frame.render_widget(Clear, area);
            let mut input_display = prompt.input.clone();
            input_display.push('\u{258c}');
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Open Note From File",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(input_display),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter to load \u{2022} Esc to cancel",
                    Style::default().fg(palette.dim),
                )),
            ])
            .block(
                Block::default()
                    .title("Open")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent)),
            )
            .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        Some(OverlayState::ConfirmDelete(confirm)) => {
            let area = centered_rect(60, 30, frame.size());
            frame.render_widget(Clear, area);
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Delete Note",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(format!(
                    "Permanently delete '{}'? This cannot be undone.",
                    confirm.title
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter to confirm \u{2022} Esc to cancel",
                    Style::default().fg(palette.dim),
                )),
            ])
            .block(
                Block::default()
                    .title("Confirm Delete")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.danger)),
            )
            .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        Some(OverlayState::ConfirmDeleteAll) => {
            let area = centered_rect(60, 30, frame.size());
            frame.render_widget(Clear, area);
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Delete All Notes",
                    Style::default()
                        .fg(palette.danger)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Permanently delete every note? This cannot be undone.",
                    Style::default().fg(palette.danger),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter to confirm \u{2022} Esc to cancel",
                    Style::default().fg(palette.dim),
                )),
            ])
            .block(
                Block::default()
                    .title("Confirm Delete All")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.danger)),
            );
            frame.render_widget(paragraph, area);
        }
        Some(OverlayState::Export(prompt)) => {
            let (heading, title) = match prompt.kind {
                ExportKind::Archive => ("Export All Notes (zip)", "Export"),
                ExportKind::Pdf => ("Export Selected Note (pdf)", "Export"),
            };
            let area = centered_rect(70, 30, frame.size());
            frame.render_widget(Clear, area);
            let mut input_display = prompt.input.clone();
            input_display.push('\u{258c}');
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    heading,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(input_display),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter to export \u{2022} Esc to cancel",
                    Style::default().fg(palette.dim),
                )),
            ])
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent)),
            )
            .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        Some(OverlayState::Replace(prompt)) => {
            let area = centered_rect(70, 30, frame.size());
            frame.render_widget(Clear, area);
            let mut input_display = prompt.input.clone();
            input_display.push('\u{258c}');
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    format!("Replace '{}' in the selected note", prompt.query),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(input_display),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter to replace all \u{2022} Esc to cancel",
                    Style::default().fg(palette.dim),
                )),
            ])
            .block(
                Block::default()
                    .title("Replace")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent)),
            )
            .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        None => {}
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;

    fn span_texts(spans: &[Span<'static>]) -> Vec<String> {
        spans
            .iter()
            .map(|span| span.content.clone().into_owned())
            .collect()
    }

    #[test]
    fn highlight_splits_around_matches() {
        let regex = build_highlight_regex("note").expect("regex");
        let spans = highlight_line("notebook", Some(&regex), Style::default(), Style::default());
        assert_eq!(
            span_texts(&spans),
            vec![String::from("note"), String::from("book")]
        );
    }

    #[test]
    fn highlight_without_regex_is_a_single_span() {
        let spans = highlight_line("plain text", None, Style::default(), Style::default());
        assert_eq!(span_texts(&spans), vec![String::from("plain text")]);
    }

    #[test]
    fn cursor_tracks_rows_and_columns_without_wrapping() {
        let area = Rect::new(0, 0, 20, 10);
        let pos =
            editor_cursor_screen_position("ab\ncd", 5, area, crate::format::Alignment::Left);
        // Border + two header rows above the body, column after "cd".
        assert_eq!(pos, Some((3, 4)));
    }

    #[test]
    fn cursor_on_a_clipped_line_stays_on_its_row() {
        let area = Rect::new(0, 0, 12, 10);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let pos =
            editor_cursor_screen_position(text, text.len(), area, crate::format::Alignment::Left);
        // Pinned to the last visible cell of the first body row.
        assert_eq!(pos, Some((10, 3)));
    }

    #[test]
    fn centered_lines_offset_the_cursor() {
        let area = Rect::new(0, 0, 12, 10);
        let pos = editor_cursor_screen_position("abcd", 4, area, crate::format::Alignment::Center);
        // 10 inner columns minus a 4-cell line leaves a 3-cell lead-in.
        assert_eq!(pos, Some((8, 3)));
    }
}
