//! Lesion types screen: one selector button per type, one detail panel shown.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::application::LesionTypeSelector;
use crate::domain::LesionType;
use crate::tui::styles::MedicalTheme;

/// Render the lesion type selector and the visible detail panel.
pub fn render_about(f: &mut Frame, area: Rect, selector: Option<&LesionTypeSelector>) {
    let Some(selector) = selector else {
        let p = Paragraph::new(Span::styled(
            "No lesion types available.",
            MedicalTheme::text_muted(),
        ))
        .block(
            Block::default()
                .title(Span::styled(" Lesion Types ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        );
        f.render_widget(p, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Buttons
            Constraint::Min(0),    // Detail panel
            Constraint::Length(2), // Key hints
        ])
        .split(area);

    let titles: Vec<Line> = selector
        .buttons()
        .iter()
        .map(|b| Line::from(format!(" {} ", b.key.to_uppercase())))
        .collect();

    let mut tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(Span::styled(" Lesion Types ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .style(MedicalTheme::key_desc())
        .highlight_style(MedicalTheme::selected());
    if let Some(i) = selector.active_index() {
        tabs = tabs.select(i);
    }
    f.render_widget(tabs, chunks[0]);

    render_detail(f, chunks[1], selector);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("[←→] ", MedicalTheme::key_hint()),
        Span::styled("Select type ", MedicalTheme::key_desc()),
        Span::styled("[1-7] ", MedicalTheme::key_hint()),
        Span::styled("Jump to type", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(hints, chunks[2]);
}

fn render_detail(f: &mut Frame, area: Rect, selector: &LesionTypeSelector) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let lesion = selector
        .visible_panel()
        .and_then(|id| id.strip_suffix("-detail"))
        .and_then(LesionType::from_key);

    let Some(lesion) = lesion else {
        let p = Paragraph::new(Span::styled(
            "Select a lesion type to see its description.",
            MedicalTheme::text_muted(),
        ))
        .block(block);
        f.render_widget(p, area);
        return;
    };

    let (class, class_style) = if lesion.is_malignant() {
        ("Malignant / pre-malignant", MedicalTheme::danger())
    } else {
        ("Usually benign", MedicalTheme::info())
    };

    let lines = vec![
        Line::from(Span::styled(lesion.full_name(), MedicalTheme::title())),
        Line::from(vec![
            Span::styled("Code: ", MedicalTheme::text_secondary()),
            Span::styled(lesion.key(), MedicalTheme::text()),
            Span::styled("   Class: ", MedicalTheme::text_secondary()),
            Span::styled(class, class_style),
        ]),
        Line::from(""),
        Line::from(Span::styled(lesion.description(), MedicalTheme::text())),
    ];

    let p = Paragraph::new(lines)
        .block(block.title(Span::styled(
            format!(" {lesion} "),
            MedicalTheme::subtitle(),
        )))
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
