//! Splits message content into prose and fenced code.

/// Fence marker that toggles between prose and code.
pub const FENCE: &str = "```";

/// A displayable piece of a message, borrowed from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    Code(&'a str),
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Prose(text) | Segment::Code(text) => text,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Segment::Code(_))
    }
}

/// Split `content` on [`FENCE`]. Even pieces are prose and odd pieces are code,
/// so an odd number of fences leaves everything after the last one as code.
/// Empty pieces are kept.
pub fn render(content: &str) -> Vec<Segment<'_>> {
    content
        .split(FENCE)
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 0 {
                Segment::Prose(part)
            } else {
                Segment::Code(part)
            }
        })
        .collect()
}
