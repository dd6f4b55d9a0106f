//! UI module: View components for the TUI.

pub mod about;
pub mod analyze;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::application::{Alert, AlertKind};
use crate::tui::styles::MedicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![Span::styled(
        "DISCLAIMER: Results are indicative only and are not a medical diagnosis. Consult a dermatologist.",
        MedicalTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Header bar with the screen tabs.
pub fn render_header(f: &mut Frame, area: Rect, about_active: bool) {
    let tab = |label: &'static str, key: &'static str, active: bool| {
        vec![
            Span::styled(format!("[{key}] "), MedicalTheme::key_hint()),
            Span::styled(
                label,
                if active {
                    MedicalTheme::selected()
                } else {
                    MedicalTheme::key_desc()
                },
            ),
            Span::raw("  "),
        ]
    };

    let mut spans = vec![
        Span::styled(" DermaDetect", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
    ];
    spans.extend(tab("Analyze", "F1", !about_active));
    spans.extend(tab("Lesion Types", "F2", about_active));
    spans.push(Span::styled("[Ctrl+Q] ", MedicalTheme::key_hint()));
    spans.push(Span::styled("Quit", MedicalTheme::key_desc()));

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

/// Modal alert box centered over `area`.
pub fn render_alert(f: &mut Frame, area: Rect, alert: &Alert) {
    let popup = centered(area, 60, 7);

    let (title, style) = match alert.kind {
        AlertKind::Validation => (" Check your input ", MedicalTheme::focused()),
        AlertKind::Failure => (" Analysis failed ", MedicalTheme::danger()),
    };

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(alert.message.clone(), MedicalTheme::text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("OK", MedicalTheme::key_desc()),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(title, style))
            .borders(Borders::ALL)
            .border_style(style),
    );

    f.render_widget(Clear, popup);
    f.render_widget(content, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);
    horizontal[1]
}
