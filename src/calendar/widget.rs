use crate::grid::{CalendarMonth, DateCell, DayCell};
use crate::theme::{TITLE_STYLE, TODAY_MODIFIER, WEEKDAY_STYLE, status_style};
use ratatui::{prelude::*, widgets::*};
use time::Date;

static HEADER: &str = " Su     Mo     Tu     We     Th     Fr     Sa ";

/// Width of the calendar in columns
const MAIN_WIDTH: u16 = 46;

/// Number of lines taken up by the title, the header, and the header's rule
const HEADER_LINES: u16 = 3;

/// Number of columns per day of week
const DAY_WIDTH: u16 = 7;

const DAYS_IN_WEEK: usize = 7;

const ACS_HLINE: char = '─';

/// Marker drawn after the day number of dates with bookings
const BOOKING_MARK: char = '*';

/// A single month of day cells, laid out Sunday-first, seven to a row
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthView<'a> {
    month: CalendarMonth,
    cells: &'a [DayCell],
    cursor: Date,
    today: Date,
}

impl<'a> MonthView<'a> {
    pub(crate) fn new(
        month: CalendarMonth,
        cells: &'a [DayCell],
        cursor: Date,
        today: Date,
    ) -> MonthView<'a> {
        MonthView {
            month,
            cells,
            cursor,
            today,
        }
    }

    /// Number of lines needed to draw the whole month
    pub(crate) fn height(&self) -> u16 {
        let weeks = self.cells.len().div_ceil(DAYS_IN_WEEK);
        HEADER_LINES.saturating_add(u16::try_from(weeks).unwrap_or(u16::MAX))
    }

    fn show(&self, cell: &DateCell) -> Span<'static> {
        let (open, close) = if cell.date == self.cursor {
            ('[', ']')
        } else {
            (' ', ' ')
        };
        let mark = if cell.has_bookings { BOOKING_MARK } else { ' ' };
        let mut style = status_style(cell.status);
        if cell.date == self.today {
            style = style.add_modifier(TODAY_MODIFIER);
        }
        Span::styled(format!("{open}{:2}{close}{mark}", cell.date.day()), style)
    }
}

impl Widget for MonthView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let left = area.width.saturating_sub(MAIN_WIDTH) / 2;
        let area = Rect {
            x: area.x + left,
            width: area.width.saturating_sub(left).min(MAIN_WIDTH),
            ..area
        };
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_title(self.month);
        canvas.draw_header();
        for (week_no, week) in std::iter::zip(0u16.., self.cells.chunks(DAYS_IN_WEEK)) {
            for (col, cell) in std::iter::zip(0u16.., week) {
                if let DayCell::Date(dc) = cell {
                    canvas.draw_day(week_no, col, &self.show(dc));
                }
            }
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, month: CalendarMonth) {
        let title = format!("{} {}", month.month(), month.year());
        let width = u16::try_from(title.len()).unwrap_or(u16::MAX);
        self.mvprint(0, MAIN_WIDTH.saturating_sub(width) / 2, title, Some(TITLE_STYLE));
    }

    fn draw_header(&mut self) {
        self.mvprint(1, 0, HEADER, Some(WEEKDAY_STYLE));
        self.hline(2, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(&mut self, week_no: u16, col: u16, s: &Span<'_>) {
        self.mvprint(
            week_no + HEADER_LINES,
            DAY_WIDTH * col,
            &s.content,
            Some(s.style),
        );
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}
