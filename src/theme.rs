use crate::grid::DayStatus;
use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const AVAILABLE_STYLE: Style = BASE_STYLE;

pub(crate) const BLOCKED_STYLE: Style = Style::new().fg(Color::LightRed).bg(Color::Black);

pub(crate) const DAYOFF_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const SELECTED_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::LightYellow)
    .add_modifier(Modifier::BOLD);

/// Added on top of the status style for today's date
pub(crate) const TODAY_MODIFIER: Modifier = Modifier::UNDERLINED;

pub(crate) const MESSAGE_STYLE: Style = BASE_STYLE.fg(Color::LightCyan);

pub(crate) fn status_style(status: DayStatus) -> Style {
    match status {
        DayStatus::Available => AVAILABLE_STYLE,
        DayStatus::Blocked => BLOCKED_STYLE,
        DayStatus::DayOff => DAYOFF_STYLE,
        DayStatus::Selected => SELECTED_STYLE,
    }
}

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
