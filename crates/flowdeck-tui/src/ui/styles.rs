use ratatui::style::{Color, Modifier, Style};

use flowdeck_core::models::ModeBadge;
use flowdeck_core::workflow::NotificationLevel;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Mode badge colours
pub const BADGE_BLUE: Color = Color::Rgb(59, 130, 246);
pub const BADGE_GREEN: Color = Color::Rgb(34, 197, 94);
pub const BADGE_PURPLE: Color = Color::Rgb(168, 85, 247);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn badge_style(badge: ModeBadge) -> Style {
    match badge {
        ModeBadge::Blue => Style::default().fg(BADGE_BLUE),
        ModeBadge::Green => Style::default().fg(BADGE_GREEN),
        ModeBadge::Purple => Style::default().fg(BADGE_PURPLE),
        ModeBadge::Generic => muted_style(),
    }
}

pub fn notification_style(level: NotificationLevel) -> Style {
    match level {
        NotificationLevel::Info => muted_style(),
        NotificationLevel::Success => success_style(),
        NotificationLevel::Error => error_style(),
    }
}
