use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

/// Width of the key column
const KEY_COLUMN: usize = 16;

static KEYS: &[(&str, &str)] = &[
    ("h, LEFT", "Previous day"),
    ("l, RIGHT", "Next day"),
    ("k, UP", "Same day last week"),
    ("j, DOWN", "Same day next week"),
    ("p, PAGE UP", "Previous month"),
    ("n, PAGE DOWN", "Next month"),
    ("0, HOME", "Jump to today"),
    ("g", "Input month to jump to"),
    ("SPACE", "Select/deselect day"),
    ("b, ENTER", "Block selected days"),
    ("u", "Unblock day"),
    ("c", "Clear selection"),
    ("?", "Show this help"),
    ("q, ESC", "Quit"),
];

static FOOTER: &[&str] = &[
    "",
    "[dd] cursor   * has bookings   _ today",
    "",
    "Press the Any Key to dismiss.",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Help {
    fn text() -> Text<'static> {
        KEYS.iter()
            .map(|(keys, action)| Line::raw(format!("{keys:<KEY_COLUMN$}{action}")))
            .chain(FOOTER.iter().map(|&s| Line::raw(s)))
            .collect()
    }
}

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Help::text();
        // Text plus a border on each side and a column of padding left and
        // right
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .saturating_add(4)
            .min(area.width);
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
            .min(area.height);
        let [popup] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [popup] = Layout::vertical([height]).flex(Flex::Center).areas(popup);
        Clear.render(popup, buf);
        let block = Block::bordered()
            .title(" Commands ")
            .title_alignment(Alignment::Center)
            .style(self.0);
        let inner = block.inner(popup).inner(Margin::new(1, 0));
        block.render(popup, buf);
        Paragraph::new(text).style(self.0).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::BASE_STYLE;

    #[test]
    fn test_key_column() {
        let text = Help::text();
        assert_eq!(text.height(), KEYS.len() + FOOTER.len());
        assert_eq!(text.lines[0].to_string(), "h, LEFT         Previous day");
        assert_eq!(text.lines[13].to_string(), "q, ESC          Quit");
    }

    #[test]
    fn test_render_centered() {
        let area = Rect::new(0, 0, 60, 24);
        let mut buf = Buffer::empty(area);
        Help(BASE_STYLE).render(area, &mut buf);
        let row = |y: u16| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
        };
        // 38 columns of text plus 4 of border and padding, centred in 60
        assert_eq!(row(2).trim_end(), format!("{:9}┌{:─^40}┐", "", " Commands "));
        assert_eq!(
            row(3).trim_end(),
            format!("{:9}│ {:<38} │", "", "h, LEFT         Previous day")
        );
        assert_eq!(row(21).trim_end(), format!("{:9}└{:─<40}┘", "", ""));
    }
}
