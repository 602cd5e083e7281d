use serde::Serialize;

use crate::viewport::{
    is_medium_window, is_short_window, ViewportFlags, ViewportMetrics, MOBILE_BREAKPOINT,
};

const HERO_OFFSET_MAX_WIDTH: f64 = 1536.0;
const HERO_OFFSET_MAX_RATIO: f64 = 0.20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Header sits above the content in normal flow.
    Compact,
    /// Header centred vertically over the landing viewport.
    Hero,
    /// Header fixed to the top-left with the nav rail beside the content.
    Pinned,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Hero => "hero",
            Self::Pinned => "pinned",
        }
    }
}

pub fn select_layout(is_mobile: bool, width: f64, height: f64, scrolled: bool) -> LayoutMode {
    if is_mobile || is_short_window(height) || is_medium_window(width, height) {
        LayoutMode::Compact
    } else if scrolled {
        LayoutMode::Pinned
    } else {
        LayoutMode::Hero
    }
}

/// Horizontal offset of the hero header: 0% of the viewport width at the
/// mobile breakpoint, growing linearly to 20% at 1536px and beyond.
pub fn hero_offset(width: f64) -> f64 {
    let progress = ((width - MOBILE_BREAKPOINT) / (HERO_OFFSET_MAX_WIDTH - MOBILE_BREAKPOINT))
        .clamp(0.0, 1.0);
    progress * HERO_OFFSET_MAX_RATIO * width
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderLayout {
    pub mode: LayoutMode,
    pub offset_x: f64,
    pub show_model: bool,
    pub show_nav_rail: bool,
    pub show_description: bool,
    pub pixelate_title: bool,
}

impl HeaderLayout {
    pub fn from_viewport(metrics: &ViewportMetrics) -> Self {
        let flags = metrics.flags();
        let mode = select_layout(flags.mobile, metrics.width, metrics.height, flags.scrolled);
        Self::for_mode(mode, metrics.width, &flags)
    }

    fn for_mode(mode: LayoutMode, width: f64, flags: &ViewportFlags) -> Self {
        Self {
            mode,
            offset_x: match mode {
                LayoutMode::Hero => hero_offset(width),
                LayoutMode::Compact | LayoutMode::Pinned => 0.0,
            },
            show_model: mode == LayoutMode::Hero,
            show_nav_rail: mode == LayoutMode::Pinned,
            show_description: !(flags.scrolled && flags.short_window),
            pixelate_title: mode == LayoutMode::Hero && flags.transitioning,
        }
    }

    pub fn class(&self) -> String {
        format!("site-header site-header--{}", self.mode.as_str())
    }

    pub fn style(&self) -> String {
        match self.mode {
            LayoutMode::Hero => format!("--header-offset-x: {:.2}px;", self.offset_x),
            LayoutMode::Compact | LayoutMode::Pinned => String::new(),
        }
    }
}
