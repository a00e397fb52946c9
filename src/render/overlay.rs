use std::sync::atomic::{AtomicBool, Ordering};

use crate::export::dependencies::OverlayController;

/// Busy indicator for terminal sessions: one line on stderr per job.
#[derive(Debug, Default)]
pub struct ConsoleOverlay {
    visible: AtomicBool,
}

impl ConsoleOverlay {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl OverlayController for ConsoleOverlay {
    fn show_busy(&self, message: &str) {
        if !self.visible.swap(true, Ordering::SeqCst) {
            log::info!("{}", message);
            eprintln!("{}", message);
        }
    }

    fn hide(&self) {
        if self.visible.swap(false, Ordering::SeqCst) {
            log::debug!("Busy overlay hidden");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_and_hide_toggle_visibility() {
        let overlay = ConsoleOverlay::default();
        assert!(!overlay.is_visible());
        overlay.show_busy("Generating PDF...");
        overlay.show_busy("Generating PDF...");
        assert!(overlay.is_visible());
        overlay.hide();
        overlay.hide();
        assert!(!overlay.is_visible());
    }
}
