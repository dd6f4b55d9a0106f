//! Lesion type selector: mutually exclusive tabs with matching detail panels.
//!
//! A button keyed `mel` reveals the panel named `mel-detail`.

use crate::domain::LesionType;

/// Name of the detail panel belonging to a selector key.
#[must_use]
pub fn panel_id(key: &str) -> String {
    format!("{key}-detail")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorButton {
    pub key: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanel {
    pub id: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LesionTypeSelector {
    buttons: Vec<SelectorButton>,
    panels: Vec<DetailPanel>,
    scroll_to: Option<String>,
}

impl LesionTypeSelector {
    /// Build a selector from the buttons and panels present on a screen.
    ///
    /// Returns `None` when there are no buttons; the behaviour is then inactive.
    #[must_use]
    pub fn detect<B, P>(button_keys: B, panel_ids: P) -> Option<Self>
    where
        B: IntoIterator,
        B::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let buttons: Vec<SelectorButton> = button_keys
            .into_iter()
            .map(|key| SelectorButton {
                key: key.into(),
                active: false,
            })
            .collect();

        if buttons.is_empty() {
            return None;
        }

        let panels = panel_ids
            .into_iter()
            .map(|id| DetailPanel {
                id: id.into(),
                visible: false,
            })
            .collect();

        Some(Self {
            buttons,
            panels,
            scroll_to: None,
        })
    }

    /// Selector over a lesion catalog, first entry selected.
    ///
    /// Each type gets a button; types with a description also get a detail
    /// panel. Returns `None` for an empty catalog.
    #[must_use]
    pub fn for_catalog(types: &[LesionType]) -> Option<Self> {
        let mut selector = Self::detect(
            types.iter().map(|t| t.key()),
            types
                .iter()
                .filter(|t| !t.description().is_empty())
                .map(|t| panel_id(t.key())),
        )?;
        let first = selector.buttons[0].key.clone();
        selector.select(&first);
        selector.scroll_to = None;
        Some(selector)
    }

    /// Activate the button `key` and reveal its panel.
    ///
    /// Returns false (and changes nothing) if no button has that key.
    pub fn select(&mut self, key: &str) -> bool {
        if !self.buttons.iter().any(|b| b.key == key) {
            return false;
        }

        for button in &mut self.buttons {
            button.active = button.key == key;
        }

        let wanted = panel_id(key);
        for panel in &mut self.panels {
            panel.visible = false;
        }
        match self.panels.iter_mut().find(|p| p.id == wanted) {
            Some(panel) => {
                panel.visible = true;
                self.scroll_to = Some(wanted);
            }
            None => {
                tracing::debug!(%key, "No detail panel for selector button");
                self.scroll_to = None;
            }
        }

        true
    }

    /// Move the selection by `delta` buttons, wrapping around.
    pub fn step(&mut self, delta: isize) {
        let len = self.buttons.len() as isize;
        let current = self.active_index().map_or(-1, |i| i as isize);
        let next = (current + delta).rem_euclid(len) as usize;
        let key = self.buttons[next].key.clone();
        self.select(&key);
    }

    #[must_use]
    pub fn buttons(&self) -> &[SelectorButton] {
        &self.buttons
    }

    #[must_use]
    pub fn panels(&self) -> &[DetailPanel] {
        &self.panels
    }

    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.buttons.iter().position(|b| b.active)
    }

    #[must_use]
    pub fn active_key(&self) -> Option<&str> {
        self.buttons
            .iter()
            .find(|b| b.active)
            .map(|b| b.key.as_str())
    }

    #[must_use]
    pub fn visible_panel(&self) -> Option<&str> {
        self.panels
            .iter()
            .find(|p| p.visible)
            .map(|p| p.id.as_str())
    }

    /// Consume the pending scroll request (id of the revealed panel).
    pub fn take_scroll_request(&mut self) -> Option<String> {
        self.scroll_to.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> LesionTypeSelector {
        LesionTypeSelector::for_catalog(&LesionType::ALL).expect("catalog")
    }

    #[test]
    fn test_catalog_starts_on_first_type() {
        let mut selector = catalog();
        assert_eq!(selector.buttons().len(), LesionType::ALL.len());
        assert_eq!(selector.active_key(), Some("akiec"));
        assert_eq!(selector.visible_panel(), Some("akiec-detail"));
        assert_eq!(selector.take_scroll_request(), None);

        assert!(LesionTypeSelector::for_catalog(&[]).is_none());
    }

    #[test]
    fn test_detect_requires_buttons() {
        assert!(LesionTypeSelector::detect(Vec::<String>::new(), ["mel-detail"]).is_none());
        assert!(LesionTypeSelector::detect(["mel"], Vec::<String>::new()).is_some());
    }

    #[test]
    fn test_exactly_one_active_and_one_visible() {
        let mut selector = catalog();
        for key in ["mel", "bcc", "nv", "mel"] {
            assert!(selector.select(key));
            assert_eq!(selector.buttons().iter().filter(|b| b.active).count(), 1);
            assert_eq!(selector.panels().iter().filter(|p| p.visible).count(), 1);
            assert_eq!(selector.active_key(), Some(key));
            assert_eq!(selector.visible_panel(), Some(panel_id(key).as_str()));
            assert_eq!(selector.take_scroll_request(), Some(panel_id(key)));
        }
    }

    #[test]
    fn test_button_without_panel_hides_all() {
        let mut selector =
            LesionTypeSelector::detect(["mel", "orphan"], ["mel-detail"]).expect("detect");
        selector.select("mel");
        selector.take_scroll_request();

        assert!(selector.select("orphan"));
        assert_eq!(selector.active_key(), Some("orphan"));
        assert_eq!(selector.visible_panel(), None);
        assert_eq!(selector.take_scroll_request(), None);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut selector = catalog();
        assert!(!selector.select("zzz"));
        assert_eq!(selector.active_key(), Some("akiec"));
    }

    #[test]
    fn test_step_wraps() {
        let mut selector = catalog();
        selector.step(-1);
        assert_eq!(selector.active_key(), Some("vasc"));
        selector.step(1);
        assert_eq!(selector.active_key(), Some("akiec"));
    }
}
