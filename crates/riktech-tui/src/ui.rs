use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use riktech_core::{render as split_segments, Author, Segment};

use crate::app::{App, InputLine, Screen};

const WELCOME_TITLE: &str = "Selamat datang di RikTech AI";
const WELCOME_HINT: &str = "Tulis pertanyaan di bawah lalu tekan Enter.";
const CODE_PLACEHOLDER: &str = "// Kode yang dihasilkan akan muncul di sini";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Code => render_code_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(label, Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        } else {
            Span::styled(label, Style::default().fg(Color::Gray))
        }
    };

    let title = Line::from(vec![
        Span::styled(" RikTech AI ", Style::default().fg(Color::Cyan).bold()),
        tab(" Chat ", app.screen == Screen::Chat),
        Span::raw(" "),
        tab(" Code ", app.screen == Screen::Code),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
    ];
    match app.screen {
        Screen::Chat => hints.extend(vec![
            Span::styled(" ^P ", key_style),
            Span::styled(" provider ", label_style),
            Span::styled(" ^Y ", key_style),
            Span::styled(" copy reply ", label_style),
            Span::styled(" ^L ", key_style),
            Span::styled(" clear ", label_style),
        ]),
        Screen::Code => hints.extend(vec![
            Span::styled(" ^N/^B ", key_style),
            Span::styled(" language ", label_style),
            Span::styled(" ^Y ", key_style),
            Span::styled(" copy code ", label_style),
        ]),
    }
    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" screen ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    if let Some(notice) = &app.notice {
        hints.push(Span::raw(" "));
        hints.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

/// Word-wrap `text` to `width` columns. Words longer than a line are split.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();

        // Break words that can never fit on their own line
        while word_len > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            let split = char_to_byte(word, width);
            lines.push(word[..split].to_string());
            word = &word[split..];
            word_len -= width;
        }

        if word_len == 0 {
            continue;
        }

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut current_line, word.to_string()));
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Hard-split `text` every `width` characters, keeping whitespace (code).
fn split_to_width(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || width == 0 {
        return vec![text.to_string()];
    }
    chars.chunks(width).map(|chunk| chunk.iter().collect()).collect()
}

fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(s.len())
}

/// Lines for one message wrapped to `width`: prose as plain text, fenced code
/// set apart.
fn message_lines(content: &str, width: usize) -> Vec<Line<'static>> {
    let code_style = Style::default().fg(Color::Green).bg(Color::Black);
    let mut lines = Vec::new();

    for segment in split_segments(content) {
        match segment {
            Segment::Prose(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                for l in text.trim_matches('\n').lines() {
                    lines.extend(wrap_text_to_width(l, width).into_iter().map(Line::from));
                }
            }
            Segment::Code(text) => {
                // One column of padding on each side
                let inner = width.saturating_sub(2).max(1);
                for l in text.trim_matches('\n').lines() {
                    for chunk in split_to_width(l, inner) {
                        lines.push(Line::from(Span::styled(format!(" {} ", chunk), code_style)));
                    }
                }
            }
        }
    }

    lines
}

/// The chat transcript, already wrapped to `width` so that one `Line` is one
/// screen row.
fn conversation_text(app: &App, width: usize) -> Text<'static> {
    if app.chat.store().shows_welcome() && !app.chat.is_pending() {
        let title = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let hint = Style::default().fg(Color::DarkGray);
        let mut lines: Vec<Line> = wrap_text_to_width(WELCOME_TITLE, width)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, title)))
            .collect();
        lines.extend(
            wrap_text_to_width(WELCOME_HINT, width)
                .into_iter()
                .map(|l| Line::from(Span::styled(l, hint))),
        );
        return Text::from(lines);
    }

    let user_label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let bot_label = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();

    for entry in app.chat.entries() {
        match entry.author() {
            Author::User => lines.push(Line::from(Span::styled("You:", user_label))),
            Author::Bot => lines.push(Line::from(Span::styled("AI:", bot_label))),
        }
        lines.extend(message_lines(entry.content(), width));
        lines.push(Line::default());
    }

    if app.chat.is_pending() {
        lines.push(Line::from(Span::styled("AI:", bot_label)));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Text::from(lines)
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);

    // Lines are pre-wrapped, so the line count is the row count we scroll over
    let text = conversation_text(app, chat_area.width.saturating_sub(2) as usize);
    let total_rows = text.lines.len().min(u16::MAX as usize) as u16;
    let max_scroll = total_rows.saturating_sub(app.chat_height);
    if app.chat_follow || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.chat_follow = true;
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.provider.display_name()));

    let chat = Paragraph::new(text)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let title = if app.chat.is_pending() {
        " Menunggu balasan... "
    } else {
        " Ketik pesan Anda "
    };
    render_input(frame, input_area, &app.chat_input, title, !app.chat.is_pending());
}

fn render_code_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [language_area, input_area, output_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    app.code_area = Some(output_area);

    let language = Line::from(vec![
        Span::styled(" Bahasa: ", Style::default().fg(Color::Gray)),
        Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.language(), Style::default().fg(Color::Magenta).bold()),
        Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(language), language_area);

    let title = if app.code.is_pending() {
        " Generating... "
    } else {
        " Deskripsikan kode yang Anda inginkan "
    };
    render_input(frame, input_area, &app.code_input, title, !app.code.is_pending());

    let output_text = if app.code.is_pending() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        Text::from(Span::styled(
            format!("Generating{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else if app.code.output().is_none() {
        Text::from(Span::styled(CODE_PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        Text::from(app.code_lines.clone())
    };

    // Title follows the language the shown code was requested in
    let output_language = if app.code.is_pending() || app.code.output().is_some() {
        app.code_language
    } else {
        app.language()
    };

    // Code is shown unwrapped, so the line count is the scroll bound
    let max_scroll = (output_text.lines.len() as u16).saturating_sub(output_area.height.saturating_sub(2));
    app.code_scroll = app.code_scroll.min(max_scroll);

    let output_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(format!(" {} ", output_language));

    let output = Paragraph::new(output_text)
        .block(output_block)
        .scroll((app.code_scroll, 0));
    frame.render_widget(output, output_area);
}

fn render_input(frame: &mut Frame, area: Rect, input: &InputLine, title: &str, enabled: bool) {
    let border_color = if enabled { Color::Yellow } else { Color::DarkGray };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = input.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .text
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let text_color = if enabled { Color::Cyan } else { Color::DarkGray };
    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(input_block);

    frame.render_widget(paragraph, area);

    if enabled {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
