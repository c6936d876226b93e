//! Presentation state for a rendered diagram

use tracing::trace;

/// Zoom change per step
pub const ZOOM_STEP: f32 = 0.25;

/// Smallest zoom factor
pub const MIN_ZOOM: f32 = 0.25;

/// Largest zoom factor
pub const MAX_ZOOM: f32 = 3.0;

/// Zoom and fullscreen state of the diagram viewer
///
/// Purely presentational: nothing here ever influences the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    zoom: f32,
    fullscreen: bool,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    /// Entering fullscreen resets zoom; leaving it keeps the current zoom.
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        if self.fullscreen {
            self.reset_zoom();
        }
        trace!(fullscreen = self.fullscreen, zoom = self.zoom, "Toggled fullscreen");
    }

    /// Back to `{1.0, windowed}`, used whenever a new source is loaded
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        trace!(zoom = self.zoom, "Zoom changed");
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            fullscreen: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let viewer = ViewerState::new();
        assert_eq!(viewer.zoom(), 1.0);
        assert!(!viewer.is_fullscreen());
    }

    #[test]
    fn test_zoom_steps() {
        let mut viewer = ViewerState::new();
        viewer.zoom_in();
        assert_eq!(viewer.zoom(), 1.25);
        viewer.zoom_out();
        viewer.zoom_out();
        assert_eq!(viewer.zoom(), 0.75);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewer = ViewerState::new();
        for _ in 0..20 {
            viewer.zoom_in();
        }
        assert_eq!(viewer.zoom(), MAX_ZOOM);
        for _ in 0..20 {
            viewer.zoom_out();
        }
        assert_eq!(viewer.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_reset_zoom() {
        let mut viewer = ViewerState::new();
        viewer.zoom_out();
        viewer.reset_zoom();
        assert_eq!(viewer.zoom(), 1.0);
    }

    #[test]
    fn test_fullscreen_entry_resets_zoom() {
        let mut viewer = ViewerState::new();
        viewer.zoom_in();
        viewer.zoom_in();
        viewer.toggle_fullscreen();
        assert!(viewer.is_fullscreen());
        assert_eq!(viewer.zoom(), 1.0);
    }

    #[test]
    fn test_fullscreen_exit_keeps_zoom() {
        let mut viewer = ViewerState::new();
        viewer.toggle_fullscreen();
        viewer.zoom_in();
        viewer.toggle_fullscreen();
        assert!(!viewer.is_fullscreen());
        assert_eq!(viewer.zoom(), 1.25);
    }

    #[test]
    fn test_reset() {
        let mut viewer = ViewerState::new();
        viewer.toggle_fullscreen();
        viewer.zoom_in();
        viewer.reset();
        assert_eq!(viewer, ViewerState::default());
    }
}
