/// One `data-tab` id with the state of its button and its pane.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tab {
    id: String,
    button_active: bool,
    pane_active: bool,
}

/// Tab buttons and their panes, keyed by the shared `data-tab` id.
/// At most one tab is active, and its button and pane are active together.
#[derive(Debug, Clone)]
pub struct TabBar {
    tabs: Vec<Tab>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("No tab with id {0}")]
pub struct UnknownTab(pub String);

impl TabBar {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tabs: ids
                .into_iter()
                .map(|id| Tab {
                    id: id.into(),
                    button_active: false,
                    pane_active: false,
                })
                .collect(),
        }
    }

    /// Deactivates every button and pane, then activates the clicked pair.
    pub fn select(&mut self, id: &str) -> Result<(), UnknownTab> {
        if !self.tabs.iter().any(|tab| tab.id == id) {
            return Err(UnknownTab(id.to_string()));
        }

        for tab in &mut self.tabs {
            tab.button_active = false;
            tab.pane_active = false;
        }
        for tab in self.tabs.iter_mut().filter(|tab| tab.id == id) {
            tab.button_active = true;
            tab.pane_active = true;
        }
        Ok(())
    }

    pub fn active(&self) -> Option<&str> {
        self.tabs
            .iter()
            .find(|tab| tab.button_active && tab.pane_active)
            .map(|tab| tab.id.as_str())
    }

    pub fn button_is_active(&self, id: &str) -> bool {
        self.tab(id).map(|tab| tab.button_active).unwrap_or(false)
    }

    pub fn pane_is_active(&self, id: &str) -> bool {
        self.tab(id).map(|tab| tab.pane_active).unwrap_or(false)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(|tab| tab.id.as_str())
    }

    fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }
}
