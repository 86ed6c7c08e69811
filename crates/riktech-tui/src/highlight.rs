//! Syntax highlighting for the code-generation output.

use std::sync::OnceLock;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const THEME_NAME: &str = "base16-ocean.dark";

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Map a language selector label to the token syntect knows it by.
fn syntax_token(language: &str) -> String {
    let lang = language.trim().to_ascii_lowercase();
    match lang.as_str() {
        "javascript" => "js".into(),
        "python" => "py".into(),
        "c++" => "cpp".into(),
        "c#" => "cs".into(),
        "rust" => "rs".into(),
        other => other.into(),
    }
}

fn plain_lines(code: &str) -> Vec<Line<'static>> {
    code.lines().map(|l| Line::from(l.to_string())).collect()
}

/// Highlight `code` as `language`. Unknown languages and highlighter errors
/// fall back to unstyled lines.
pub fn highlight_code(language: &str, code: &str) -> Vec<Line<'static>> {
    let ps = syntax_set();
    let Some(theme) = theme_set().themes.get(THEME_NAME) else {
        return plain_lines(code);
    };
    let Some(syntax) = ps.find_syntax_by_token(&syntax_token(language)) else {
        return plain_lines(code);
    };

    let mut h = HighlightLines::new(syntax, theme);
    let mut out: Vec<Line<'static>> = Vec::new();
    for line in LinesWithEndings::from(code) {
        let Ok(ranges) = h.highlight_line(line, ps) else {
            return plain_lines(code);
        };
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .map(|(style, text)| {
                let fg = style.foreground;
                Span::styled(
                    text.trim_end_matches(['\n', '\r']).to_string(),
                    Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                )
            })
            .collect();
        out.push(Line::from(spans));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_token_maps_selector_labels() {
        assert_eq!(syntax_token("JavaScript"), "js");
        assert_eq!(syntax_token("C++"), "cpp");
        assert_eq!(syntax_token("C#"), "cs");
        assert_eq!(syntax_token("Go"), "go");
    }

    #[test]
    fn highlighted_output_keeps_line_count_and_text() {
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        let lines = highlight_code("Rust", code);
        assert_eq!(lines.len(), 3);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "fn main() {");
    }

    #[test]
    fn unknown_language_falls_back_to_plain() {
        let lines = highlight_code("Brainfuck++", "+++\n---");
        assert_eq!(lines, vec![Line::from("+++"), Line::from("---")]);
    }
}
