//! Rendering engine boundary
//!
//! The layout engine is a black box: it takes an element identifier and
//! markup, and asynchronously returns SVG or an error message. Process-wide
//! engine configuration is set once, explicitly, at startup.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::core::{DiagramError, EngineError};

/// Default spacing around diagram content, in pixels
pub const DEFAULT_PADDING: u32 = 8;

/// Default font stack handed to the engine
pub const DEFAULT_FONT_FAMILY: &str = "trebuchet ms, verdana, arial, sans-serif";

static ENGINE_SETTINGS: OnceLock<EngineSettings> = OnceLock::new();

/// An external diagram layout engine
///
/// Implementations may cache by `element_id`, so callers pass a fresh one
/// on every render.
pub trait RenderEngine {
    /// Lay out `markup` and return the resulting SVG document
    fn render<'a>(
        &'a self,
        element_id: &'a str,
        markup: &'a str,
    ) -> BoxFuture<'a, Result<String, EngineError>>;
}

impl<E: RenderEngine + ?Sized> RenderEngine for &E {
    fn render<'a>(
        &'a self,
        element_id: &'a str,
        markup: &'a str,
    ) -> BoxFuture<'a, Result<String, EngineError>> {
        (**self).render(element_id, markup)
    }
}

/// Built-in engine color themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Default,
    Neutral,
    Dark,
    Forest,
    Base,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Neutral => "neutral",
            Theme::Dark => "dark",
            Theme::Forest => "forest",
            Theme::Base => "base",
        }
    }

    /// Names accepted by [`Theme::from_str`]
    pub fn variants() -> &'static [&'static str] {
        &["default", "neutral", "dark", "forest", "base"]
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "neutral" => Ok(Theme::Neutral),
            "dark" => Ok(Theme::Dark),
            "forest" => Ok(Theme::Forest),
            "base" => Ok(Theme::Base),
            _ => Err(format!(
                "Invalid theme: {}. Valid options: {}",
                s,
                Self::variants().join(", ")
            )),
        }
    }
}

/// Process-wide engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub theme: Theme,
    pub padding: u32,
    pub font_family: String,
}

impl EngineSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    /// Render the settings as an in-band `%%{init: ...}%%` header
    ///
    /// # Example
    /// ```
    /// use mermend::render::{EngineSettings, Theme};
    ///
    /// let settings = EngineSettings::new().with_theme(Theme::Dark).with_padding(4);
    /// assert!(settings.init_directive().starts_with("%%{init: {\"theme\": \"dark\""));
    /// ```
    pub fn init_directive(&self) -> String {
        let font_family = self.font_family.replace(['"', '\\'], "");
        format!(
            "%%{{init: {{\"theme\": \"{}\", \"themeVariables\": {{\"fontFamily\": \"{}\"}}, \"flowchart\": {{\"diagramPadding\": {}}}}}}}%%",
            self.theme, font_family, self.padding
        )
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            padding: DEFAULT_PADDING,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

/// Install the process-wide engine settings
///
/// Must be called at most once, at startup; later calls fail and leave the
/// first settings in place.
pub fn initialize(settings: EngineSettings) -> Result<&'static EngineSettings, DiagramError> {
    let mut installed = false;
    let current = ENGINE_SETTINGS.get_or_init(|| {
        installed = true;
        settings
    });

    if installed {
        info!(theme = %current.theme, padding = current.padding, "Engine initialized");
        Ok(current)
    } else {
        warn!("Engine initialization attempted twice");
        Err(DiagramError::EngineAlreadyInitialized)
    }
}

/// Settings installed by [`initialize`], if it has been called
pub fn settings() -> Option<&'static EngineSettings> {
    ENGINE_SETTINGS.get()
}
