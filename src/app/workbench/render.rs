use super::util;
use super::Workbench;
use crate::app::theme::UiTheme;
use crate::kernel::session::HighlightSpan;
use crate::kernel::{Action as KernelAction, FocusTarget};
use crate::models::slice_to_cow;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const DEFAULT_HINT: &str = "F5 Run/Preview  Ctrl+S Save  Ctrl+N New  Ctrl+W Close  Ctrl+E Files  Ctrl+Q Quit";

pub(super) fn render(workbench: &mut Workbench, frame: &mut Frame, area: Rect) {
    workbench.last_render_area = Some(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(super::HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(super::STATUS_HEIGHT),
        ])
        .split(area);

    render_header(workbench, frame, chunks[0]);
    render_body(workbench, frame, chunks[1]);
    render_status(workbench, frame, chunks[2]);

    let ui = &workbench.store.state().ui;
    if ui.input_dialog.visible {
        render_input_dialog(workbench, frame, area);
    }
    if ui.confirm_dialog.visible {
        render_confirm_dialog(workbench, frame, area);
    }
    if ui.notice.visible {
        render_notice(workbench, frame, area);
    }
}

pub(super) fn cursor_position(workbench: &Workbench) -> Option<(u16, u16)> {
    let ui = &workbench.store.state().ui;
    if ui.notice.visible || ui.confirm_dialog.visible {
        return None;
    }
    if ui.input_dialog.visible {
        return input_dialog_cursor(workbench);
    }
    if ui.focus != FocusTarget::Editor {
        return None;
    }
    editor_cursor(workbench)
}

fn render_header(workbench: &Workbench, frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let title = workbench.store.state().title();
    let line = Line::from(Span::styled(
        format!(" {title}"),
        Style::default()
            .fg(workbench.theme.header_fg)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_body(workbench: &mut Workbench, frame: &mut Frame, area: Rect) {
    let list_width = util::file_list_width(area.width);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(list_width), Constraint::Min(0)])
        .split(area);

    render_file_list(workbench, frame, columns[0]);

    let output_height = if workbench.store.state().output.visible {
        util::output_panel_height(columns[1].height)
    } else {
        0
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(super::TABS_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(output_height),
        ])
        .split(columns[1]);

    render_tabs(workbench, frame, rows[0]);
    render_editor(workbench, frame, rows[1]);
    if output_height > 0 {
        render_output(workbench, frame, rows[2]);
    } else {
        workbench.last_output_area = None;
    }
}

fn border_style(theme: &UiTheme, focused: bool) -> Style {
    let fg = if focused {
        theme.focus_border
    } else {
        theme.inactive_border
    };
    Style::default().fg(fg)
}

fn render_file_list(workbench: &mut Workbench, frame: &mut Frame, area: Rect) {
    if area.width == 0 || area.height == 0 {
        workbench.last_file_list_area = None;
        return;
    }

    let focused = workbench.focus() == FocusTarget::FileList;
    let block = Block::default()
        .title(" Files ")
        .borders(Borders::ALL)
        .border_style(border_style(&workbench.theme, focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    workbench.last_file_list_area = (inner.width > 0 && inner.height > 0).then_some(inner);
    if inner.height == 0 {
        return;
    }
    let _ = workbench.dispatch_kernel(KernelAction::FileListSetViewHeight {
        height: inner.height as usize,
    });

    let state = workbench.store.state();
    let theme = &workbench.theme;
    let list = &state.file_list;
    if list.entries.is_empty() {
        let empty = Line::from(Span::styled(
            "(no files)",
            Style::default().fg(theme.muted_fg),
        ));
        frame.render_widget(Paragraph::new(empty), inner);
        return;
    }

    let current = state.session.current_name();
    let lines: Vec<Line> = list
        .entries
        .iter()
        .enumerate()
        .skip(list.scroll)
        .take(inner.height as usize)
        .map(|(index, name)| {
            let marker = match state.session.buffer(name) {
                Some(buffer) if buffer.is_dirty() => "* ",
                Some(_) => "+ ",
                None => "  ",
            };
            let mut style = Style::default();
            if index == list.selected {
                style = style.bg(theme.selection_bg);
                if focused {
                    style = style.fg(theme.accent_fg);
                }
            }
            if current == Some(name.as_str()) {
                style = style.add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::styled(marker, style.fg(theme.muted_fg)),
                Span::styled(name.as_str(), style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_tabs(workbench: &mut Workbench, frame: &mut Frame, area: Rect) {
    workbench.last_tab_ranges.clear();
    if area.width == 0 || area.height == 0 {
        workbench.last_tabs_area = None;
        return;
    }
    workbench.last_tabs_area = Some(area);

    let state = workbench.store.state();
    let theme = &workbench.theme;
    let current = state.session.current_index();
    let mut spans = Vec::new();
    let mut x = 0u16;
    for (index, buffer) in state.session.buffers().iter().enumerate() {
        let dirty = if buffer.is_dirty() { "*" } else { "" };
        let label = format!(" {}{dirty} ", buffer.filename());
        let width = label.width() as u16;
        workbench.last_tab_ranges.push((x, x.saturating_add(width)));
        x = x.saturating_add(width + 1);

        let style = if current == Some(index) {
            Style::default()
                .bg(theme.tab_active_bg)
                .fg(theme.tab_active_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.tab_inactive_fg)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::styled("│", Style::default().fg(theme.inactive_border)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_editor(workbench: &mut Workbench, frame: &mut Frame, area: Rect) {
    if area.width == 0 || area.height == 0 {
        workbench.last_editor_area = None;
        return;
    }

    let focused = workbench.focus() == FocusTarget::Editor;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(&workbench.theme, focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    workbench.last_editor_area = (inner.width > 0 && inner.height > 0).then_some(inner);
    if inner.height == 0 {
        return;
    }
    let gutter = workbench
        .store
        .state()
        .session
        .current()
        .map_or(0, |b| util::digits(b.text().len_lines()) + 1);
    let _ = workbench.dispatch_kernel(KernelAction::EditorSetViewSize {
        width: inner.width.saturating_sub(gutter) as usize,
        height: inner.height as usize,
    });

    let state = workbench.store.state();
    let theme = &workbench.theme;
    let Some(buffer) = state.session.current() else {
        let hint = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No file open.",
                Style::default().fg(theme.muted_fg),
            )),
            Line::from(Span::styled(
                "  Ctrl+N creates a new file, Ctrl+E focuses the file list.",
                Style::default().fg(theme.muted_fg),
            )),
        ];
        frame.render_widget(Paragraph::new(hint), inner);
        return;
    };

    let tab_width = state.config.tab_size.max(1) as usize;
    let text = buffer.text();
    let number_width = gutter.saturating_sub(1) as usize;
    let first = buffer.scroll();
    let horiz = buffer.horiz_offset();
    let last = (first + inner.height as usize).min(text.len_lines());
    let gutter_style = Style::default().fg(theme.muted_fg);

    let mut lines = Vec::with_capacity(last.saturating_sub(first));
    for row in first..last {
        let Some(slice) = text.line_slice(row) else {
            break;
        };
        let raw = slice_to_cow(slice);
        let content = raw.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let highlights = buffer
            .highlights()
            .get(row)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut spans = vec![Span::styled(format!("{:>number_width$} ", row + 1), gutter_style)];
        spans.extend(skip_columns(
            highlight_line(content, highlights, theme, tab_width),
            horiz,
        ));
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// 按高亮区间切分一行；越界或落在字符中间的区间跳过
fn highlight_line(
    content: &str,
    highlights: &[HighlightSpan],
    theme: &UiTheme,
    tab_width: usize,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut pos = 0usize;
    for span in highlights {
        let start = span.start.min(content.len());
        let end = span.end.min(content.len());
        if start < pos
            || start >= end
            || !content.is_char_boundary(start)
            || !content.is_char_boundary(end)
        {
            continue;
        }
        if start > pos {
            spans.push(Span::raw(expand_tabs(&content[pos..start], tab_width)));
        }
        spans.push(Span::styled(
            expand_tabs(&content[start..end], tab_width),
            theme.syntax_style(span.kind),
        ));
        pos = end;
    }
    if pos < content.len() {
        spans.push(Span::raw(expand_tabs(&content[pos..], tab_width)));
    }
    spans
}

fn expand_tabs(text: &str, tab_width: usize) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    text.replace('\t', &" ".repeat(tab_width))
}

/// 丢弃前 `offset` 个显示列；被切开的宽字符补成空格
fn skip_columns(spans: Vec<Span<'static>>, offset: usize) -> Vec<Span<'static>> {
    if offset == 0 {
        return spans;
    }
    let mut remaining = offset;
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        if remaining == 0 {
            out.push(span);
            continue;
        }
        let mut kept = String::new();
        for g in span.content.graphemes(true) {
            let w = g.width();
            if remaining == 0 {
                kept.push_str(g);
            } else if w > remaining {
                kept.push_str(&" ".repeat(w - remaining));
                remaining = 0;
            } else {
                remaining -= w;
            }
        }
        if !kept.is_empty() {
            out.push(Span::styled(kept, span.style));
        }
    }
    out
}

fn editor_cursor(workbench: &Workbench) -> Option<(u16, u16)> {
    let area = workbench.last_editor_area?;
    let state = workbench.store.state();
    let buffer = state.session.current()?;
    let (row, _) = buffer.cursor();
    let scroll = buffer.scroll();
    if row < scroll || row >= scroll + area.height as usize {
        return None;
    }

    let tab_width = state.config.tab_size.max(1) as usize;
    let column = buffer
        .cursor_display_col(tab_width)
        .saturating_sub(buffer.horiz_offset());
    let column = u16::try_from(column).unwrap_or(u16::MAX);
    let gutter = util::digits(buffer.text().len_lines()) + 1;

    let right = area.x + area.width.saturating_sub(1);
    let x = area
        .x
        .saturating_add(gutter)
        .saturating_add(column)
        .min(right);
    let y = area.y + (row - scroll) as u16;
    Some((x, y))
}

fn render_output(workbench: &mut Workbench, frame: &mut Frame, area: Rect) {
    if area.width == 0 || area.height == 0 {
        workbench.last_output_area = None;
        return;
    }
    workbench.last_output_area = Some(area);

    let state = workbench.store.state();
    let theme = &workbench.theme;
    let output = &state.output;
    let title = if output.is_running() {
        " Output (running) "
    } else {
        " Output "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(theme, false));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    // scroll 表示距末尾的行数：0 时贴住最新输出
    let total = output.len();
    let end = total - output.scroll.min(total);
    let start = end.saturating_sub(inner.height as usize);
    let lines: Vec<Line> = output
        .lines()
        .iter()
        .skip(start)
        .take(end - start)
        .map(|line| Line::from(Span::styled(line.text.as_str(), theme.output_style(line.tag))))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status(workbench: &Workbench, frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let state = workbench.store.state();
    let theme = &workbench.theme;

    let position = state.session.current().map(|buffer| {
        let (row, col) = buffer.cursor();
        let language = buffer
            .language()
            .map(|lang| format!("{lang:?}"))
            .unwrap_or_else(|| "Plain Text".to_string());
        format!("Ln {}, Col {}  {language} ", row + 1, col + 1)
    });
    let right = position.unwrap_or_default();
    let right_width = (right.width() as u16).min(area.width);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_width)])
        .split(area);

    let left = match state.ui.status_message.as_deref() {
        Some(message) => Span::styled(format!(" {message}"), Style::default().fg(theme.accent_fg)),
        None => Span::styled(format!(" {DEFAULT_HINT}"), Style::default().fg(theme.muted_fg)),
    };
    frame.render_widget(Paragraph::new(Line::from(left)), columns[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            right,
            Style::default().fg(theme.muted_fg),
        ))),
        columns[1],
    );
}

fn input_dialog_area(area: Rect) -> Rect {
    util::centered_rect(50, 5, area)
}

fn render_input_dialog(workbench: &Workbench, frame: &mut Frame, area: Rect) {
    let dialog = &workbench.store.state().ui.input_dialog;
    let popup_area = input_dialog_area(area);
    if popup_area.width < 20 || popup_area.height < 5 {
        return;
    }

    frame.render_widget(Clear, popup_area);

    let title = if dialog.title.is_empty() {
        " Input ".to_string()
    } else {
        format!(" {} ", dialog.title)
    };
    let theme = &workbench.theme;
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.focus_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let muted_style = Style::default().fg(theme.muted_fg);
    let mut lines = vec![Line::from(vec![
        Span::styled("> ", muted_style),
        Span::raw(dialog.value.as_str()),
    ])];

    match dialog.error.as_deref() {
        Some(err) => lines.push(Line::from(Span::styled(
            err,
            Style::default().fg(theme.error_fg),
        ))),
        None => lines.push(Line::from("")),
    }

    lines.push(Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(theme.accent_fg)),
        Span::raw(" Save  "),
        Span::styled("[Esc]", muted_style),
        Span::raw(" Cancel"),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn input_dialog_cursor(workbench: &Workbench) -> Option<(u16, u16)> {
    let area = workbench.last_render_area?;
    let dialog = &workbench.store.state().ui.input_dialog;

    let popup_area = input_dialog_area(area);
    if popup_area.width < 20 || popup_area.height < 5 {
        return None;
    }
    let inner_x = popup_area.x.saturating_add(1);
    let inner_y = popup_area.y.saturating_add(1);

    let cursor = dialog.cursor.min(dialog.value.len());
    let prefix_w = 2u16;
    let before = dialog.value.get(..cursor).unwrap_or_default();
    let before_w = u16::try_from(before.width()).unwrap_or(u16::MAX);

    let x = inner_x
        .saturating_add(prefix_w)
        .saturating_add(before_w)
        .min(popup_area.x + popup_area.width.saturating_sub(2));
    Some((x, inner_y))
}

fn render_confirm_dialog(workbench: &Workbench, frame: &mut Frame, area: Rect) {
    let dialog = &workbench.store.state().ui.confirm_dialog;
    let popup_area = util::centered_rect(50, 6, area);
    if popup_area.width < 20 || popup_area.height < 4 {
        return;
    }

    frame.render_widget(Clear, popup_area);

    let theme = &workbench.theme;
    let block = Block::default()
        .title(format!(" {} ", dialog.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.warning_fg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let key_style = Style::default().fg(theme.accent_fg);
    let muted_style = Style::default().fg(theme.muted_fg);
    let hint = if dialog.three_way {
        Line::from(vec![
            Span::styled("[y]", key_style),
            Span::raw(" Save  "),
            Span::styled("[n]", key_style),
            Span::raw(" Don't Save  "),
            Span::styled("[Esc]", muted_style),
            Span::raw(" Cancel"),
        ])
    } else {
        Line::from(vec![
            Span::styled("[Enter]", key_style),
            Span::raw(" Confirm  "),
            Span::styled("[Esc]", muted_style),
            Span::raw(" Cancel"),
        ])
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(dialog.message.as_str()).wrap(Wrap { trim: true }),
        rows[0],
    );
    frame.render_widget(Paragraph::new(hint), rows[1]);
}

fn render_notice(workbench: &Workbench, frame: &mut Frame, area: Rect) {
    let notice = &workbench.store.state().ui.notice;
    let popup_area = util::centered_rect(60, 7, area);
    if popup_area.width < 20 || popup_area.height < 4 {
        return;
    }

    frame.render_widget(Clear, popup_area);

    let theme = &workbench.theme;
    let color = theme.notice_color(notice.level);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", notice.title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(notice.message.as_str()).wrap(Wrap { trim: true }),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(theme.accent_fg)),
            Span::raw(" OK"),
        ])),
        rows[1],
    );
}
