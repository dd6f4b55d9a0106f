//! Clinic-themed color palette and styles.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::RiskTier;

/// Clinic theme color palette.
pub struct MedicalTheme;

impl MedicalTheme {
    // === Brand ===

    /// Dark cyan - Primary
    pub const PRIMARY: Color = Color::Rgb(0, 139, 139); // #008B8B

    /// Lighter cyan for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(72, 202, 228); // #48CAE4

    /// Darker cyan for header bars
    pub const PRIMARY_DARK: Color = Color::Rgb(0, 95, 115); // #005F73

    // === Semantic ===

    pub const SUCCESS: Color = Color::Rgb(64, 145, 108); // #40916C

    pub const WARNING: Color = Color::Rgb(247, 127, 0); // #F77F00

    pub const DANGER: Color = Color::Rgb(208, 0, 0); // #D00000

    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    /// Skeleton placeholder blocks
    pub const SKELETON: Color = Color::Rgb(71, 85, 105); // #475569

    // === Text ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    pub const BORDER: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Preset Styles ===

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    #[must_use]
    pub fn skeleton() -> Style {
        Style::default().fg(Self::SKELETON).bg(Self::SKELETON)
    }

    /// Style for the focused row
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Active tab / selected button
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn disabled() -> Style {
        Style::default()
            .fg(Self::TEXT_MUTED)
            .add_modifier(Modifier::DIM)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Colour of a risk tier label.
    #[must_use]
    pub fn risk_tier(tier: RiskTier) -> Style {
        let (r, g, b) = tier.color();
        Style::default().fg(Color::Rgb(r, g, b))
    }

    /// Confidence gauge fill for a tier, keyed by its bar class.
    #[must_use]
    pub fn gauge(tier: RiskTier) -> Style {
        let fill = match tier.bar_class() {
            "bg-success" => Self::SUCCESS,
            "bg-warning" => Self::WARNING,
            _ => Self::DANGER,
        };
        Style::default().fg(fill).bg(Self::SKELETON)
    }
}
