use std::time::Duration;

pub const SKILLS_TAB: &str = "skills";
/// Wait for the tab switch to settle before animating.
pub const TAB_SETTLE_DELAY: Duration = Duration::from_millis(300);
pub const GROW_DELAY: Duration = Duration::from_millis(100);

const COLLAPSED_WIDTH: &str = "0%";

/// A skill progress bar; `target_width` is the CSS width it is drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillBar {
    pub width: String,
    target_width: String,
}

impl SkillBar {
    pub fn new(width: impl Into<String>) -> Self {
        let width = width.into();
        Self {
            target_width: width.clone(),
            width,
        }
    }

    fn collapse(&mut self) {
        self.width = COLLAPSED_WIDTH.into();
    }

    fn grow(&mut self) {
        self.width = self.target_width.clone();
    }
}

/// Snaps every bar to zero width, then restores the stored width after `GROW_DELAY`.
pub async fn animate_skill_bars(bars: &mut [SkillBar]) {
    bars.iter_mut().for_each(SkillBar::collapse);
    tokio::time::sleep(GROW_DELAY).await;
    bars.iter_mut().for_each(SkillBar::grow);
}

/// Runs the animation when the skills tab was the one clicked.
pub async fn on_tab_clicked(tab_id: &str, bars: &mut [SkillBar]) {
    if tab_id != SKILLS_TAB {
        return;
    }
    tokio::time::sleep(TAB_SETTLE_DELAY).await;
    animate_skill_bars(bars).await;
}
