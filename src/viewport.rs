use crate::tracker::ScrollState;

const SCROLLED_AFTER_PX: f64 = 100.0;
const TRANSITION_RANGE_PX: (f64, f64) = (50.0, 150.0);
const SHORT_WINDOW_HEIGHT: f64 = 700.0;
const MEDIUM_WINDOW_WIDTH: f64 = 1024.0;
const MEDIUM_WINDOW_HEIGHT: f64 = 900.0;
pub const MOBILE_BREAKPOINT: f64 = 768.0;

pub fn is_mobile(width: f64) -> bool {
    width < MOBILE_BREAKPOINT
}

pub fn is_short_window(height: f64) -> bool {
    height < SHORT_WINDOW_HEIGHT
}

pub fn is_medium_window(width: f64, height: f64) -> bool {
    width < MEDIUM_WINDOW_WIDTH && height < MEDIUM_WINDOW_HEIGHT
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMetrics {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
    pub document_height: f64,
}

impl ViewportMetrics {
    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            scroll_y: self.scroll_y,
            viewport_height: self.height,
            document_height: self.document_height,
        }
    }

    pub fn flags(&self) -> ViewportFlags {
        ViewportFlags {
            scrolled: self.scroll_y > SCROLLED_AFTER_PX,
            transitioning: self.scroll_y > TRANSITION_RANGE_PX.0
                && self.scroll_y < TRANSITION_RANGE_PX.1,
            short_window: is_short_window(self.height),
            medium_window: is_medium_window(self.width, self.height),
            mobile: is_mobile(self.width),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportFlags {
    pub scrolled: bool,
    pub transitioning: bool,
    pub short_window: bool,
    pub medium_window: bool,
    pub mobile: bool,
}

#[cfg(target_arch = "wasm32")]
pub fn read_viewport() -> ViewportMetrics {
    use web_sys::window;

    let Some(win) = window() else {
        return ViewportMetrics {
            scroll_y: 0.0,
            width: 1280.0,
            height: 720.0,
            document_height: 720.0,
        };
    };

    let width = win
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0);
    let height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(720.0);
    let scroll_y = win.scroll_y().unwrap_or(0.0);
    let document_height = win
        .document()
        .and_then(|d| d.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(height);

    ViewportMetrics {
        scroll_y,
        width,
        height,
        document_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(scroll_y: f64, width: f64, height: f64) -> ViewportMetrics {
        ViewportMetrics {
            scroll_y,
            width,
            height,
            document_height: 5_000.0,
        }
    }

    #[test]
    fn scrolled_flag_flips_past_one_hundred_pixels() {
        assert!(!metrics(100.0, 1440.0, 900.0).flags().scrolled);
        assert!(metrics(101.0, 1440.0, 900.0).flags().scrolled);
    }

    #[test]
    fn transition_window_is_exclusive() {
        assert!(!metrics(50.0, 1440.0, 900.0).flags().transitioning);
        assert!(metrics(120.0, 1440.0, 900.0).flags().transitioning);
        assert!(!metrics(150.0, 1440.0, 900.0).flags().transitioning);
    }

    #[test]
    fn window_size_classes() {
        let phone = metrics(0.0, 390.0, 844.0).flags();
        assert!(phone.mobile);
        assert!(phone.medium_window);

        let laptop = metrics(0.0, 1440.0, 650.0).flags();
        assert!(laptop.short_window);
        assert!(!laptop.medium_window);
        assert!(!laptop.mobile);

        let tall_tablet = metrics(0.0, 900.0, 1200.0).flags();
        assert!(!tall_tablet.medium_window);
    }

    #[test]
    fn size_predicates_match_flags_at_the_edges() {
        assert!(is_short_window(699.0));
        assert!(!is_short_window(700.0));
        assert!(is_medium_window(1023.0, 899.0));
        assert!(!is_medium_window(1024.0, 899.0));
        assert!(!is_medium_window(1023.0, 900.0));
        assert!(is_mobile(767.0));
        assert!(!is_mobile(768.0));

        let flags = metrics(0.0, 1000.0, 650.0).flags();
        assert_eq!(flags.short_window, is_short_window(650.0));
        assert_eq!(flags.medium_window, is_medium_window(1000.0, 650.0));
    }
}
