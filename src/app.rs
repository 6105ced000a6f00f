use crate::bookings::BookingsByDate;
use crate::calendar::MonthView;
use crate::dayoff::day_name;
use crate::grid::{CalendarMonth, DateCell, DayCell, DayStatus, build_month_grid, iso_date};
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::selection::{Selection, SelectionAction};
use crate::store::VendorStore;
use crate::theme::{BASE_STYLE, MESSAGE_STYLE};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, read};
use ratatui::{
    Terminal,
    backend::Backend,
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{StatefulWidget, Widget},
};
use std::io::{self, Write};
use time::{Date, Duration};
use tracing::{debug, error};

#[derive(Debug)]
pub(crate) struct App {
    store: VendorStore,
    today: Date,
    month: CalendarMonth,
    // Always a day of `month`
    cursor: Date,
    selection: Selection,
    reason: Option<String>,
    message: Option<String>,
    state: AppState,
}

impl App {
    pub(crate) fn new(store: VendorStore, today: Date) -> App {
        App {
            store,
            today,
            month: CalendarMonth::containing(today),
            cursor: today,
            selection: Selection::new(),
            reason: None,
            message: None,
            state: AppState::Calendar,
        }
    }

    pub(crate) fn start_month(mut self, month: CalendarMonth) -> App {
        self.show_month(month);
        self
    }

    /// Set the reason recorded with dates blocked in this session
    pub(crate) fn reason(mut self, reason: Option<String>) -> App {
        self.reason = reason;
        self
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => {
                self.message = None;
                match key {
                    KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1),
                    KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1),
                    KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-7),
                    KeyCode::Char('j') | KeyCode::Down => self.move_cursor(7),
                    KeyCode::Char('p') | KeyCode::PageUp => self.previous_month(),
                    KeyCode::Char('n') | KeyCode::PageDown => self.next_month(),
                    KeyCode::Char('0') | KeyCode::Home => {
                        self.jump_to_today();
                        true
                    }
                    KeyCode::Char(' ') => self.toggle_cursor(),
                    KeyCode::Char('b') | KeyCode::Enter => self.commit_selection(),
                    KeyCode::Char('u') => self.unblock_cursor(),
                    KeyCode::Char('c') => self.clear_selection(),
                    KeyCode::Char('g') => {
                        self.state = AppState::Jumping(JumpToState::new());
                        true
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        self.state = AppState::Quitting;
                        true
                    }
                    KeyCode::Char('?') => {
                        self.state = AppState::Helping;
                        true
                    }
                    _ => false,
                }
            }
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c) => match c.to_digit(10).and_then(|d| u8::try_from(d).ok())
                        {
                            Some(d) => state.handle_input(JumpToInput::Digit(d)),
                            None => JumpToOutput::Invalid,
                        },
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(month) => {
                            self.state = AppState::Calendar;
                            self.show_month(month);
                            true
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn bookings(&self) -> BookingsByDate {
        BookingsByDate::for_month(self.store.bookings(), self.month)
    }

    // Rebuilt from a fresh snapshot of the store on every call
    fn cells(&self, bookings: &BookingsByDate) -> Vec<DayCell> {
        build_month_grid(
            self.month,
            &self.store.blocked_set(),
            self.store.days_off(),
            &self.selection,
            bookings,
        )
    }

    fn dispatch(&mut self, action: SelectionAction) {
        self.selection = std::mem::take(&mut self.selection).apply(action);
    }

    fn set_cursor(&mut self, date: Date) {
        self.cursor = date;
        if !self.month.contains(date) {
            self.show_month(CalendarMonth::containing(date));
        }
    }

    fn show_month(&mut self, month: CalendarMonth) {
        self.month = month;
        self.cursor = month.day_clamped(self.cursor.day());
        debug!(
            %month,
            days = month.days_in_month(),
            bookings = self.bookings().total(),
            "Showing month"
        );
    }

    fn move_cursor(&mut self, days: i64) -> bool {
        match self.cursor.checked_add(Duration::days(days)) {
            Some(date) => {
                self.set_cursor(date);
                true
            }
            None => false,
        }
    }

    fn next_month(&mut self) -> bool {
        match self.month.next() {
            Ok(month) => {
                self.show_month(month);
                true
            }
            Err(_) => false,
        }
    }

    fn previous_month(&mut self) -> bool {
        match self.month.previous() {
            Ok(month) => {
                self.show_month(month);
                true
            }
            Err(_) => false,
        }
    }

    fn jump_to_today(&mut self) {
        self.set_cursor(self.today);
    }

    fn toggle_cursor(&mut self) -> bool {
        let cells = self.cells(&self.bookings());
        let iso = cells
            .iter()
            .filter(|c| c.is_interactable())
            .filter_map(DayCell::as_date)
            .find(|dc| dc.date == self.cursor)
            .map(|dc| dc.iso.clone());
        match iso {
            Some(iso) => {
                self.dispatch(SelectionAction::Toggle(iso));
                true
            }
            None => false,
        }
    }

    fn commit_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        match self
            .store
            .commit_selection(&self.selection, self.reason.as_deref())
        {
            Ok(added) => {
                let already = self.selection.len() - added;
                self.dispatch(SelectionAction::Clear);
                self.message = Some(if already == 0 {
                    format!("Blocked {}", plural(added, "date"))
                } else {
                    format!("Blocked {}; {already} already blocked", plural(added, "date"))
                });
            }
            Err(e) => {
                let e = anyhow::Error::new(e);
                error!(
                    error = %format!("{e:#}"),
                    path = %self.store.path().display(),
                    "Failed to block selected dates"
                );
                self.message = Some(format!("Could not block dates: {e:#}"));
            }
        }
        true
    }

    fn unblock_cursor(&mut self) -> bool {
        let iso = iso_date(self.cursor);
        match self.store.commit_unblock(&iso) {
            Ok(true) => {
                self.message = Some(format!("Unblocked {iso}"));
                true
            }
            Ok(false) => false,
            Err(e) => {
                let e = anyhow::Error::new(e);
                error!(error = %format!("{e:#}"), date = %iso, "Failed to unblock date");
                self.message = Some(format!("Could not unblock {iso}: {e:#}"));
                true
            }
        }
    }

    fn clear_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.dispatch(SelectionAction::Clear);
        self.message = Some(String::from("Selection cleared"));
        true
    }

    fn detail_line(&self, cells: &[DayCell], bookings: &BookingsByDate) -> Line<'static> {
        let Some(cell) = cells
            .iter()
            .filter_map(DayCell::as_date)
            .find(|dc| dc.date == self.cursor)
        else {
            return Line::default();
        };
        let mut parts = vec![
            format!("{} {}", day_name(cell.date.weekday()), cell.iso),
            String::from(status_label(cell)),
        ];
        if let Some(bd) = self.store.blocked(&cell.iso) {
            if cell.status != DayStatus::Blocked {
                parts.push(String::from("already blocked"));
            }
            if let Some(reason) = &bd.reason {
                parts.push(format!("\"{reason}\""));
            }
        }
        let booked = bookings.get(&cell.iso);
        if !booked.is_empty() {
            let clients = booked
                .iter()
                .filter_map(|b| b.client_name.as_deref())
                .collect::<Vec<_>>()
                .join(", ");
            let count = plural(booked.len(), "booking");
            parts.push(if clients.is_empty() {
                count
            } else {
                format!("{count}: {clients}")
            });
        }
        Line::styled(parts.join("  "), BASE_STYLE).centered()
    }

    fn status_line(&self) -> Line<'static> {
        let text = if let Some(msg) = &self.message {
            msg.clone()
        } else if !self.selection.is_empty() {
            format!(
                "{} selected; press b to block",
                plural(self.selection.len(), "date")
            )
        } else {
            String::from("Press ? for help")
        };
        Line::styled(text, MESSAGE_STYLE).centered()
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let bookings = self.bookings();
        let cells = self.cells(&bookings);
        let view = MonthView::new(self.month, &cells, self.cursor, self.today);
        let footer_y = area.y.saturating_add(view.height()).saturating_add(1);
        view.render(area, buf);
        let footer = [self.detail_line(&cells, &bookings), self.status_line()];
        for (y, line) in std::iter::zip(footer_y.., footer) {
            if y < area.bottom() {
                line.render(
                    Rect {
                        y,
                        height: 1,
                        ..area
                    },
                    buf,
                );
            }
        }
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Quitting,
}

fn status_label(cell: &DateCell) -> &'static str {
    match cell.status {
        DayStatus::Available => "available",
        DayStatus::Blocked => "blocked",
        DayStatus::DayOff => "day off",
        DayStatus::Selected => "selected",
    }
}

fn plural(qty: usize, noun: &str) -> String {
    if qty == 1 {
        format!("{qty} {noun}")
    } else {
        format!("{qty} {noun}s")
    }
}
