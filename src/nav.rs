pub const TRANSITION_MS: u32 = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavTone {
    Bright,
    Muted,
}

impl NavTone {
    fn as_str(self) -> &'static str {
        match self {
            Self::Bright => "bright",
            Self::Muted => "muted",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavItemVisual {
    pub underline_rem: f64,
    pub underline_opacity: f64,
    pub label_offset_px: f64,
    pub tone: NavTone,
    pub animated: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavItemStatus {
    pub active: bool,
    pub hovered: bool,
    pub just_activated: bool,
    pub programmatic: bool,
}

impl NavItemVisual {
    const EXTENDED: Self = Self {
        underline_rem: 4.0,
        underline_opacity: 1.0,
        label_offset_px: 8.0,
        tone: NavTone::Bright,
        animated: true,
    };

    const IDLE: Self = Self {
        underline_rem: 2.0,
        underline_opacity: 0.7,
        label_offset_px: 0.0,
        tone: NavTone::Muted,
        animated: true,
    };

    pub fn for_status(status: NavItemStatus) -> Self {
        if status.active {
            // A click already moved the highlight; let it land without the slide.
            Self {
                animated: status.just_activated && !status.programmatic,
                ..Self::EXTENDED
            }
        } else if status.hovered {
            Self::EXTENDED
        } else {
            Self::IDLE
        }
    }

    pub fn class(&self) -> String {
        let mut class = format!("nav-item nav-item--{}", self.tone.as_str());
        if self.animated {
            class.push_str(" is-animated");
        }
        class
    }

    pub fn underline_style(&self) -> String {
        format!(
            "width: {}rem; opacity: {}; transition-duration: {TRANSITION_MS}ms;",
            self.underline_rem, self.underline_opacity
        )
    }

    pub fn label_style(&self) -> String {
        format!(
            "transform: translateX({}px); transition-duration: {TRANSITION_MS}ms;",
            self.label_offset_px
        )
    }
}
