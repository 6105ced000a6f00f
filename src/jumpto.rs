use crate::grid::CalendarMonth;
use crate::theme::{
    BASE_STYLE,
    jumpto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};

const OUTER_WIDTH: u16 = 17;
const OUTER_HEIGHT: u16 = 8;
const YEAR_DIGITS: usize = 4;
const ENTER_POS: usize = YEAR_DIGITS + 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JumpTo;

impl StatefulWidget for JumpTo {
    type State = JumpToState;

    /*
     * .................
     * .┌─ Jump To… ──┐.
     * .│             │.
     * .│   YYYY-MM   │.
     * .│             │.
     * .│   [ENTER]   │.
     * .└─────────────┘.
     * .................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Jump To… ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text().render(text_area, buf);
    }
}

/// Digit-by-digit entry of a `YYYY-MM` month
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JumpToState {
    year: [Option<u8>; YEAR_DIGITS],
    month: [Option<u8>; 2],
    pos: usize,
}

impl JumpToState {
    pub(crate) fn new() -> JumpToState {
        JumpToState::default()
    }

    fn to_text(self) -> Text<'static> {
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            self.to_line(),
            Line::styled("", BASE_STYLE),
            // Style a span and convert it to a line rather than creating a
            // styled line directly so that only the "[ENTER]" text and not any
            // of its centering padding will be underlined:
            Line::from(Span::styled(
                "[ENTER]",
                if self.pos == ENTER_POS {
                    READY_ENTER_STYLE
                } else {
                    BASE_STYLE
                },
            )),
        ])
        .centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, (fallback, digits)) in [("Y", self.year.as_slice()), ("M", self.month.as_slice())]
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                spans.push(Span::styled("-", BASE_STYLE));
            }
            for dg in digits {
                spans.push(match dg {
                    Some(d) => Span::styled(d.to_string(), BASE_STYLE),
                    None => Span::styled(fallback, UNFILLED_CELL_STYLE),
                });
            }
        }
        Line::from_iter(spans)
    }

    fn slot(&mut self, pos: usize) -> Option<&mut Option<u8>> {
        if pos < YEAR_DIGITS {
            self.year.get_mut(pos)
        } else {
            self.month.get_mut(pos - YEAR_DIGITS)
        }
    }

    pub(crate) fn handle_input(&mut self, input: JumpToInput) -> JumpToOutput {
        match (input, self.pos) {
            (JumpToInput::Digit(d), 0..ENTER_POS) if d < 10 => {
                if let Some(slot) = self.slot(self.pos) {
                    *slot = Some(d);
                }
                self.pos += 1;
                JumpToOutput::Ok
            }
            (JumpToInput::Backspace, 1..) => {
                self.pos -= 1;
                if let Some(slot) = self.slot(self.pos) {
                    *slot = None;
                }
                JumpToOutput::Ok
            }
            (JumpToInput::Enter, ENTER_POS) => {
                let year = self
                    .year
                    .iter()
                    .flatten()
                    .fold(0i32, |acc, &d| acc * 10 + i32::from(d));
                let month = self.month.iter().flatten().fold(0u8, |acc, &d| acc * 10 + d);
                let Some(index) = month.checked_sub(1) else {
                    return JumpToOutput::Invalid;
                };
                match CalendarMonth::from_index0(year, index) {
                    Ok(month) => JumpToOutput::Jump(month),
                    Err(_) => JumpToOutput::Invalid,
                }
            }
            _ => JumpToOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToInput {
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToOutput {
    Ok,
    Invalid,
    Jump(CalendarMonth),
}
