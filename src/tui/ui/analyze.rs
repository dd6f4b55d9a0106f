//! Analyze screen: image intake, questionnaire, and results.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::{AnalysisStage, PreviewState, ResultsRegion, ResultsView, UploadAndAnalyzeFlow};
use crate::domain::{ClinicalFields, MAX_UPLOAD_BYTES};
use crate::tui::styles::MedicalTheme;

const GENDERS: &[&str] = &["Male", "Female", "Other", "Prefer not to say"];
const SKIN_TYPES: &[&str] = &[
    "Type I - Very Fair",
    "Type II - Fair",
    "Type III - Medium",
    "Type IV - Olive",
    "Type V - Brown",
    "Type VI - Dark",
];
const LOCATIONS: &[&str] = &[
    "Face", "Scalp", "Neck", "Chest", "Back", "Abdomen", "Arm", "Hand", "Leg", "Foot", "Other",
];
const LESION_SIZES: &[&str] = &["Small (<5mm)", "Medium (5-10mm)", "Large (>10mm)"];
const DURATIONS: &[&str] = &[
    "Recent (<1 month)",
    "Few months (1-6 months)",
    "Long-term (6-12 months)",
    "Over a year",
];
const YES_NO: &[&str] = &["Yes", "No", "Unknown"];
const SUN_EXPOSURE: &[&str] = &["Low", "Moderate", "High"];

const SYMPTOMS: &[&str] = &[
    "Itching",
    "Bleeding",
    "Pain or tenderness",
    "Changing color",
    "Growing in size",
    "Irregular borders",
    "Crusting or scaling",
];

const MAX_NOTES_CHARS: usize = 500;

/// How a field accepts input.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Number,
    Text,
    Choice(&'static [&'static str]),
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
    pub value: String,
}

impl FormField {
    fn new(label: &'static str, hint: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            hint,
            kind,
            value: String::new(),
        }
    }

    fn input_char(&mut self, c: char) {
        match self.kind {
            FieldKind::Number if c.is_ascii_digit() && self.value.len() < 3 => self.value.push(c),
            FieldKind::Text if !c.is_control() && self.value.chars().count() < MAX_NOTES_CHARS => {
                self.value.push(c)
            }
            FieldKind::Choice(_) if c == ' ' => self.cycle(1),
            _ => {}
        }
    }

    fn delete_char(&mut self) {
        match self.kind {
            FieldKind::Choice(_) => self.value.clear(),
            _ => {
                self.value.pop();
            }
        }
    }

    /// Step through the options of a choice field.
    fn cycle(&mut self, delta: isize) {
        let FieldKind::Choice(options) = self.kind else {
            return;
        };
        let len = options.len() as isize;
        let next = match options.iter().position(|o| *o == self.value) {
            Some(i) => (i as isize + delta).rem_euclid(len),
            None if delta >= 0 => 0,
            None => len - 1,
        };
        self.value = options[next as usize].to_string();
    }
}

/// A symptom checkbox.
#[derive(Debug, Clone)]
pub struct SymptomOption {
    pub label: &'static str,
    pub checked: bool,
}

/// Focusable row of the analyze screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Path,
    Field(usize),
    Symptom(usize),
    Submit,
}

/// Index of the free-text notes field in `AnalyzeFormState::fields`.
pub const NOTES: usize = 8;

/// Questionnaire state
pub struct AnalyzeFormState {
    pub fields: Vec<FormField>,
    pub symptoms: Vec<SymptomOption>,
    focus: usize,
}

impl Default for AnalyzeFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::new("Age", "years", FieldKind::Number),
                FormField::new("Gender", "←/→ to choose", FieldKind::Choice(GENDERS)),
                FormField::new("Skin Type", "←/→ to choose", FieldKind::Choice(SKIN_TYPES)),
                FormField::new("Location", "←/→ to choose", FieldKind::Choice(LOCATIONS)),
                FormField::new("Lesion Size", "←/→ to choose", FieldKind::Choice(LESION_SIZES)),
                FormField::new("Duration", "←/→ to choose", FieldKind::Choice(DURATIONS)),
                FormField::new("Family History", "←/→ to choose", FieldKind::Choice(YES_NO)),
                FormField::new("Sun Exposure", "←/→ to choose", FieldKind::Choice(SUN_EXPOSURE)),
                FormField::new("Additional Notes", "optional", FieldKind::Text),
            ],
            symptoms: SYMPTOMS
                .iter()
                .map(|label| SymptomOption {
                    label,
                    checked: false,
                })
                .collect(),
            focus: 0,
        }
    }
}

impl AnalyzeFormState {
    fn slot_count(&self) -> usize {
        // path + scalar fields + symptoms + notes + submit
        1 + self.fields.len() + self.symptoms.len() + 1
    }

    /// Row that currently has focus.
    #[must_use]
    pub fn slot(&self) -> Slot {
        self.slot_at(self.focus)
    }

    fn slot_at(&self, index: usize) -> Slot {
        let scalars = NOTES;
        let symptoms = self.symptoms.len();
        match index {
            0 => Slot::Path,
            i if i <= scalars => Slot::Field(i - 1),
            i if i <= scalars + symptoms => Slot::Symptom(i - 1 - scalars),
            i if i == scalars + symptoms + 1 => Slot::Field(NOTES),
            _ => Slot::Submit,
        }
    }

    pub fn next(&mut self) {
        self.focus = (self.focus + 1) % self.slot_count();
    }

    pub fn prev(&mut self) {
        self.focus = self.focus.checked_sub(1).unwrap_or(self.slot_count() - 1);
    }

    pub fn input_char(&mut self, c: char) {
        match self.slot() {
            Slot::Field(i) => self.fields[i].input_char(c),
            Slot::Symptom(i) if c == ' ' => self.toggle_symptom(i),
            _ => {}
        }
    }

    /// Insert pasted text into the focused field. Line breaks become spaces;
    /// characters the field does not accept are dropped.
    pub fn paste(&mut self, text: &str) {
        let Slot::Field(i) = self.slot() else {
            return;
        };
        let field = &mut self.fields[i];
        if matches!(field.kind, FieldKind::Choice(_)) {
            return;
        }
        for c in text.trim_end_matches(['\r', '\n']).chars() {
            field.input_char(if c.is_whitespace() { ' ' } else { c });
        }
    }

    pub fn delete_char(&mut self) {
        if let Slot::Field(i) = self.slot() {
            self.fields[i].delete_char();
        }
    }

    pub fn cycle(&mut self, delta: isize) {
        if let Slot::Field(i) = self.slot() {
            self.fields[i].cycle(delta);
        }
    }

    pub fn toggle_symptom(&mut self, index: usize) {
        if let Some(s) = self.symptoms.get_mut(index) {
            s.checked = !s.checked;
        }
    }

    /// Scalar answers as currently entered.
    #[must_use]
    pub fn clinical_fields(&self) -> ClinicalFields {
        let v = |i: usize| self.fields[i].value.clone();
        ClinicalFields {
            age: v(0),
            gender: v(1),
            skin_type: v(2),
            location: v(3),
            lesion_size: v(4),
            duration: v(5),
            family_history: v(6),
            sun_exposure: v(7),
            additional_notes: v(NOTES),
        }
    }

    /// Labels of the checked symptoms.
    #[must_use]
    pub fn checked_symptoms(&self) -> Vec<String> {
        self.symptoms
            .iter()
            .filter(|s| s.checked)
            .map(|s| s.label.to_string())
            .collect()
    }

    /// Fill the questionnaire with a typical example.
    pub fn load_sample_data(&mut self) {
        let sample = [
            "45",
            "Male",
            "Type II - Fair",
            "Back",
            "Medium (5-10mm)",
            "Few months (1-6 months)",
            "Yes",
            "High",
            "Noticed after summer vacation",
        ];
        for (field, value) in self.fields.iter_mut().zip(sample) {
            field.value = value.to_string();
        }
        for s in &mut self.symptoms {
            s.checked = matches!(s.label, "Changing color" | "Growing in size");
        }
    }
}

/// Everything the analyze screen draws from.
pub struct AnalyzeView<'a> {
    pub flow: &'a UploadAndAnalyzeFlow,
    pub form: &'a AnalyzeFormState,
    pub stage: Option<AnalysisStage>,
    pub results_focused: bool,
    pub now: Instant,
}

/// Render the analyze screen
pub fn render_analyze(f: &mut Frame, area: Rect, view: &AnalyzeView<'_>) {
    let results_visible = !matches!(view.flow.results(), ResultsRegion::Hidden);

    if !results_visible {
        render_form_column(f, area, view);
        return;
    }

    // Narrow terminals show one column at a time.
    if area.width < 100 {
        if view.results_focused {
            render_results(f, area, view);
        } else {
            render_form_column(f, area, view);
        }
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_form_column(f, columns[0], view);
    render_results(f, columns[1], view);
}

fn render_form_column(f: &mut Frame, area: Rect, view: &AnalyzeView<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Upload zone
            Constraint::Min(0),    // Questionnaire
            Constraint::Length(2), // Key hints
        ])
        .split(area);

    render_upload_zone(f, chunks[0], view);
    render_questionnaire(f, chunks[1], view);
    render_form_footer(f, chunks[2], view);
}

fn render_upload_zone(f: &mut Frame, area: Rect, view: &AnalyzeView<'_>) {
    let focused = view.form.slot() == Slot::Path && !view.results_focused;
    let block = Block::default()
        .title(Span::styled(" Lesion Image ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if focused {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        });

    let input = view.flow.file_input();
    let path_line = Line::from(vec![
        Span::styled(
            "Path: ",
            if focused {
                MedicalTheme::focused()
            } else {
                MedicalTheme::text_secondary()
            },
        ),
        if input.is_empty() && !focused {
            Span::styled("type a path and press Enter", MedicalTheme::text_muted())
        } else {
            Span::styled(input.to_string(), MedicalTheme::text())
        },
        if focused {
            Span::styled("▌", MedicalTheme::focused())
        } else {
            Span::raw("")
        },
    ]);

    let file_desc = view.flow.file().map(|file| {
        format!(
            "{} · {} · {:.1} KB",
            file.name,
            file.media_type,
            file.size() as f64 / 1024.0
        )
    });

    let preview_lines = match (view.flow.preview(), file_desc) {
        (PreviewState::Placeholder, _) | (_, None) => vec![
            Line::from(Span::styled(
                "Drop an image onto the terminal or enter its path.",
                MedicalTheme::text_secondary(),
            )),
            Line::from(Span::styled(
                format!("JPG or PNG, up to {} MB", MAX_UPLOAD_BYTES / (1024 * 1024)),
                MedicalTheme::text_muted(),
            )),
        ],
        (PreviewState::Loading, Some(desc)) => vec![
            Line::from(Span::styled(desc, MedicalTheme::text())),
            Line::from(Span::styled("Generating preview...", MedicalTheme::text_muted())),
        ],
        (PreviewState::Ready(preview), Some(desc)) => vec![
            Line::from(Span::styled(desc, MedicalTheme::text())),
            Line::from(vec![
                Span::styled(
                    format!("Preview {}×{} px  ", preview.width, preview.height),
                    MedicalTheme::info(),
                ),
                Span::styled("[Ctrl+X] ", MedicalTheme::key_hint()),
                Span::styled("Remove", MedicalTheme::key_desc()),
            ]),
        ],
        (PreviewState::Unavailable(_), Some(desc)) => vec![
            Line::from(Span::styled(desc, MedicalTheme::text())),
            Line::from(vec![
                Span::styled("Preview unavailable  ", MedicalTheme::text_muted()),
                Span::styled("[Ctrl+X] ", MedicalTheme::key_hint()),
                Span::styled("Remove", MedicalTheme::key_desc()),
            ]),
        ],
    };

    let mut lines = vec![path_line, Line::from("")];
    lines.extend(preview_lines);

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_questionnaire(f: &mut Frame, area: Rect, view: &AnalyzeView<'_>) {
    let form = view.form;
    let current = if view.results_focused {
        None
    } else {
        Some(form.slot())
    };

    let mut lines: Vec<Line> = Vec::new();
    let mut focused_line = 0usize;

    let marker = |slot: Slot| {
        if current == Some(slot) {
            Span::styled("› ", MedicalTheme::focused())
        } else {
            Span::raw("  ")
        }
    };

    let field_line = |i: usize, field: &FormField| {
        let slot = Slot::Field(i);
        let label_style = if current == Some(slot) {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };
        let value = if field.value.is_empty() {
            Span::styled(field.hint, MedicalTheme::text_muted())
        } else {
            Span::styled(field.value.clone(), MedicalTheme::text())
        };
        Line::from(vec![
            marker(slot),
            Span::styled(format!("{:<17}", field.label), label_style),
            value,
        ])
    };

    for (i, field) in form.fields.iter().enumerate().take(NOTES) {
        if current == Some(Slot::Field(i)) {
            focused_line = lines.len();
        }
        lines.push(field_line(i, field));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Symptoms (Space to toggle)",
        MedicalTheme::subtitle(),
    )));
    for (i, symptom) in form.symptoms.iter().enumerate() {
        if current == Some(Slot::Symptom(i)) {
            focused_line = lines.len();
        }
        let check = if symptom.checked { "[x] " } else { "[ ] " };
        lines.push(Line::from(vec![
            marker(Slot::Symptom(i)),
            Span::styled(check, MedicalTheme::focused()),
            Span::styled(symptom.label, MedicalTheme::text()),
        ]));
    }

    lines.push(Line::from(""));
    if current == Some(Slot::Field(NOTES)) {
        focused_line = lines.len();
    }
    lines.push(field_line(NOTES, &form.fields[NOTES]));

    lines.push(Line::from(""));
    if current == Some(Slot::Submit) {
        focused_line = lines.len();
    }
    let control = view.flow.submit_control();
    let button_style = if !control.enabled {
        MedicalTheme::disabled()
    } else if current == Some(Slot::Submit) {
        MedicalTheme::selected()
    } else {
        MedicalTheme::header()
    };
    lines.push(Line::from(vec![
        marker(Slot::Submit),
        Span::styled(format!(" {} ", control.label), button_style),
    ]));

    let block = Block::default()
        .title(Span::styled(" Patient Questionnaire ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let visible = block.inner(area).height as usize;
    let offset = focused_line.saturating_sub(visible.saturating_sub(1));

    let p = Paragraph::new(lines)
        .block(block)
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
    f.render_widget(p, area);
}

fn render_form_footer(f: &mut Frame, area: Rect, view: &AnalyzeView<'_>) {
    let mut spans = vec![
        Span::styled("[↑↓] ", MedicalTheme::key_hint()),
        Span::styled("Navigate ", MedicalTheme::key_desc()),
        Span::styled("[←→] ", MedicalTheme::key_hint()),
        Span::styled("Choose ", MedicalTheme::key_desc()),
        Span::styled("[Ctrl+S] ", MedicalTheme::key_hint()),
        Span::styled("Analyze ", MedicalTheme::key_desc()),
        Span::styled("[Ctrl+E] ", MedicalTheme::key_hint()),
        Span::styled("Example ", MedicalTheme::key_desc()),
    ];
    if !matches!(view.flow.results(), ResultsRegion::Hidden) {
        spans.push(Span::styled("[Ctrl+R] ", MedicalTheme::key_hint()));
        spans.push(Span::styled("Results", MedicalTheme::key_desc()));
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(footer, area);
}

fn render_results(f: &mut Frame, area: Rect, view: &AnalyzeView<'_>) {
    let block = Block::default()
        .title(Span::styled(" Analysis Results ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if view.results_focused {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        });

    let inner = block.inner(area);
    f.render_widget(block, area);

    match view.flow.results() {
        ResultsRegion::Hidden => {}
        ResultsRegion::Loading => render_skeleton(f, inner, view.stage),
        ResultsRegion::Ready(results) => render_ready(f, inner, results, view.now),
    }
}

fn render_skeleton(f: &mut Frame, area: Rect, stage: Option<AnalysisStage>) {
    const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];
    let frame = std::time::UNIX_EPOCH
        .elapsed()
        .map_or(0, |d| (d.as_millis() / 150) as usize)
        % SPINNER.len();

    let status = match stage {
        Some(AnalysisStage::Uploading) | None => "Uploading image...",
        Some(AnalysisStage::Pacing) => "Preparing analysis...",
        Some(AnalysisStage::Predicting) => "Running classifier...",
    };

    let bar = |width: usize| Line::from(Span::styled("█".repeat(width), MedicalTheme::skeleton()));
    let w = area.width.saturating_sub(2) as usize;

    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", SPINNER[frame]), MedicalTheme::focused()),
            Span::styled(status, MedicalTheme::text_secondary()),
        ]),
        Line::from(""),
        bar(w * 2 / 3),
        Line::from(""),
        bar(w),
        Line::from(""),
        bar(w),
        bar(w * 4 / 5),
        bar(w * 3 / 5),
    ];

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::NONE));
    f.render_widget(p, area.inner(ratatui::layout::Margin::new(1, 1)));
}

fn render_ready(f: &mut Frame, area: Rect, results: &ResultsView, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Prediction + tier
            Constraint::Length(3), // Confidence bar
            Constraint::Min(0),    // Explanation
            Constraint::Length(2), // Heat-map
        ])
        .margin(1)
        .split(area);

    let tier_style = MedicalTheme::risk_tier(results.tier);

    let mut heading = vec![
        Line::from(vec![
            Span::styled("Prediction: ", MedicalTheme::text_secondary()),
            Span::styled(results.label.clone(), MedicalTheme::title()),
        ]),
        Line::from(vec![
            Span::styled("Risk: ", MedicalTheme::text_secondary()),
            Span::styled(
                results.tier.label(),
                tier_style.add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if let Some(confidence) = &results.confidence {
        heading.push(Line::from(vec![
            Span::styled("Service confidence: ", MedicalTheme::text_secondary()),
            Span::styled(confidence.clone(), MedicalTheme::text()),
        ]));
    }
    f.render_widget(Paragraph::new(heading), chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Confidence ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::gauge(results.tier))
        .ratio((results.bar.width() / 100.0).clamp(0.0, 1.0))
        .label(results.bar.text(now).unwrap_or("").to_string());
    f.render_widget(gauge, chunks[1]);

    let explanation: Vec<Line> = results
        .explanation
        .iter()
        .flat_map(|p| [Line::from(Span::styled(p.clone(), MedicalTheme::text())), Line::from("")])
        .collect();
    let explanation = Paragraph::new(explanation)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(" AI Explanation ", MedicalTheme::text_secondary()))
                .borders(Borders::TOP)
                .border_style(MedicalTheme::border()),
        );
    f.render_widget(explanation, chunks[2]);

    let heatmap = Paragraph::new(Line::from(vec![
        Span::styled("Heat-map: ", MedicalTheme::text_secondary()),
        Span::styled(results.heatmap.clone(), MedicalTheme::info()),
    ]))
    .alignment(Alignment::Left)
    .wrap(Wrap { trim: true });
    f.render_widget(heatmap, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_order_covers_all_rows() {
        let mut form = AnalyzeFormState::default();
        let mut seen = vec![form.slot()];
        for _ in 1..form.slot_count() {
            form.next();
            seen.push(form.slot());
        }

        assert_eq!(seen.first(), Some(&Slot::Path));
        assert_eq!(seen[1], Slot::Field(0));
        assert_eq!(seen[NOTES], Slot::Field(NOTES - 1));
        assert_eq!(seen[NOTES + 1], Slot::Symptom(0));
        assert_eq!(seen[seen.len() - 2], Slot::Field(NOTES));
        assert_eq!(seen.last(), Some(&Slot::Submit));

        form.next();
        assert_eq!(form.slot(), Slot::Path);
        form.prev();
        assert_eq!(form.slot(), Slot::Submit);
    }

    #[test]
    fn test_choice_fields_cycle_and_age_is_numeric() {
        let mut form = AnalyzeFormState::default();
        form.next(); // age
        for c in "4x5a".chars() {
            form.input_char(c);
        }
        form.next(); // gender
        form.cycle(1);
        form.cycle(1);
        form.next(); // skin type
        form.cycle(-1);

        let fields = form.clinical_fields();
        assert_eq!(fields.age, "45");
        assert_eq!(fields.gender, "Female");
        assert_eq!(fields.skin_type, "Type VI - Dark");
    }

    #[test]
    fn test_checked_symptoms_follow_toggles() {
        let mut form = AnalyzeFormState::default();
        form.toggle_symptom(0);
        form.toggle_symptom(3);
        form.toggle_symptom(0);
        assert_eq!(form.checked_symptoms(), ["Changing color"]);
    }

    #[test]
    fn test_paste_goes_to_focused_text_field() {
        let mut form = AnalyzeFormState::default();
        while form.slot() != Slot::Field(NOTES) {
            form.next();
        }
        form.paste("Started after\nsummer\r\n");
        assert_eq!(form.clinical_fields().additional_notes, "Started after summer");

        form.prev();
        form.paste("ignored");
        assert!(form.checked_symptoms().is_empty());

        while form.slot() != Slot::Field(0) {
            form.next();
        }
        form.paste("4 2");
        assert_eq!(form.clinical_fields().age, "42");

        form.next(); // gender
        form.paste("Female");
        assert_eq!(form.clinical_fields().gender, "");
    }

    #[test]
    fn test_sample_data_fills_every_field() {
        let mut form = AnalyzeFormState::default();
        form.load_sample_data();
        assert!(form.fields.iter().all(|f| !f.value.is_empty()));
        assert_eq!(form.checked_symptoms().len(), 2);
    }
}
