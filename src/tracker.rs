//! Decides which section the navigation highlights.
//!
//! Passive scrolling picks the section whose top edge most recently crossed a
//! line 10% down the viewport. A nav click takes over instead: the clicked
//! section becomes active at once and passive detection stays off until the
//! smooth scroll is assumed finished.

use crate::sections::{SectionId, SectionTop};

const THRESHOLD_RATIO: f64 = 0.10;
const BOTTOM_SNAP_PX: f64 = 100.0;
pub const ACTIVATION_DEBOUNCE_MS: u32 = 100;
pub const PRE_SCROLL_DELAY_MS: u32 = 100;
pub const SCROLL_SETTLE_MS: u32 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollState {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollState {
    fn near_bottom(&self) -> bool {
        self.scroll_y + self.viewport_height >= self.document_height - BOTTOM_SNAP_PX
    }

    fn threshold(&self) -> f64 {
        self.viewport_height * THRESHOLD_RATIO
    }
}

pub fn select_active_section(scroll: &ScrollState, tops: &[SectionTop]) -> SectionId {
    if scroll.near_bottom() {
        return SectionId::last();
    }

    let threshold = scroll.threshold();

    tops.iter()
        .filter_map(|section| section.top.map(|top| (section.id, top)))
        .filter(|(_, top)| *top <= threshold)
        .min_by(|(_, a), (_, b)| (a - threshold).abs().total_cmp(&(b - threshold).abs()))
        .map(|(id, _)| id)
        .unwrap_or_else(SectionId::first)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveSectionState {
    pub current: SectionId,
    pub previous: Option<SectionId>,
    pub last_changed_at: f64,
}

impl ActiveSectionState {
    fn new(now: f64) -> Self {
        Self {
            current: SectionId::first(),
            previous: None,
            last_changed_at: now,
        }
    }

    fn set(&mut self, id: SectionId, now: f64) -> bool {
        if self.current == id {
            return false;
        }
        self.current = id;
        self.last_changed_at = now;
        true
    }

    pub fn just_activated(&self, id: SectionId) -> bool {
        self.current == id && self.previous != Some(id)
    }
}

/// What the caller must do after a nav click: close the overlay if asked,
/// start the smooth scroll after `scroll_delay_ms`, then hand `generation`
/// back to [`ActiveSectionTracker::release`] after a further
/// `release_delay_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: SectionId,
    pub generation: u64,
    pub close_overlay: bool,
    pub scroll_delay_ms: u32,
    pub release_delay_ms: u32,
}

impl ScrollRequest {
    /// Delay from the click to the release timer.
    pub fn release_after_ms(&self) -> u32 {
        self.scroll_delay_ms + self.release_delay_ms
    }

    pub fn release_at(&self, requested_at: f64) -> f64 {
        requested_at + f64::from(self.release_after_ms())
    }
}

#[derive(Clone, Debug)]
pub struct ActiveSectionTracker {
    state: ActiveSectionState,
    programmatic: Option<u64>,
    generation: u64,
}

impl ActiveSectionTracker {
    pub fn new(now: f64) -> Self {
        Self {
            state: ActiveSectionState::new(now),
            programmatic: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &ActiveSectionState {
        &self.state
    }

    pub fn current(&self) -> SectionId {
        self.state.current
    }

    pub fn is_programmatic(&self) -> bool {
        self.programmatic.is_some()
    }

    /// Passive update from a scroll or resize tick. Returns the new section
    /// when the highlight moved.
    pub fn observe(
        &mut self,
        scroll: &ScrollState,
        tops: &[SectionTop],
        now: f64,
    ) -> Option<SectionId> {
        if self.is_programmatic() {
            return None;
        }

        let next = select_active_section(scroll, tops);
        self.state.set(next, now).then_some(next)
    }

    /// Milliseconds until [`settle`](Self::settle) can let `previous` catch
    /// up, or `None` when it already has.
    pub fn settle_due_in(&self, now: f64) -> Option<u32> {
        if self.state.previous == Some(self.state.current) {
            return None;
        }
        let elapsed = now - self.state.last_changed_at;
        let remaining = (f64::from(ACTIVATION_DEBOUNCE_MS) - elapsed).ceil().max(0.0);
        Some(remaining as u32)
    }

    /// Lets `previous` catch up once `current` has been stable for the
    /// debounce window.
    pub fn settle(&mut self, now: f64) -> bool {
        if now - self.state.last_changed_at < f64::from(ACTIVATION_DEBOUNCE_MS) {
            return false;
        }
        if self.state.previous == Some(self.state.current) {
            return false;
        }
        self.state.previous = Some(self.state.current);
        true
    }

    pub fn request_scroll(&mut self, target: SectionId, overlay_open: bool, now: f64) -> ScrollRequest {
        self.generation += 1;
        self.programmatic = Some(self.generation);
        self.state.set(target, now);

        ScrollRequest {
            target,
            generation: self.generation,
            close_overlay: overlay_open,
            scroll_delay_ms: PRE_SCROLL_DELAY_MS,
            release_delay_ms: SCROLL_SETTLE_MS,
        }
    }

    /// Lowers the programmatic flag if `generation` belongs to the latest
    /// request. Stale timers from an earlier click are ignored.
    pub fn release(&mut self, generation: u64) -> bool {
        if self.programmatic != Some(generation) {
            return false;
        }
        self.programmatic = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: f64 = 800.0;

    fn scroll_at(scroll_y: f64) -> ScrollState {
        ScrollState {
            scroll_y,
            viewport_height: VIEWPORT,
            document_height: 5_000.0,
        }
    }

    /// Hero of one viewport, then four sections one viewport tall each.
    fn page_tops(scroll_y: f64) -> Vec<SectionTop> {
        SectionId::ALL
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let offset = VIEWPORT * (index as f64 + 1.0);
                SectionTop::mounted(*id, offset - scroll_y)
            })
            .collect()
    }

    #[test]
    fn defaults_to_first_section_when_nothing_crossed_threshold() {
        let tops = page_tops(0.0);
        assert_eq!(select_active_section(&scroll_at(0.0), &tops), SectionId::About);

        let tops = page_tops(650.0);
        assert_eq!(select_active_section(&scroll_at(650.0), &tops), SectionId::About);
    }

    #[test]
    fn picks_section_closest_to_threshold_among_crossed() {
        let tops = vec![
            SectionTop::mounted(SectionId::About, -900.0),
            SectionTop::mounted(SectionId::Experience, -100.0),
            SectionTop::mounted(SectionId::Education, 60.0),
            SectionTop::mounted(SectionId::Projects, 400.0),
        ];

        assert_eq!(
            select_active_section(&scroll_at(2_000.0), &tops),
            SectionId::Education
        );
    }

    #[test]
    fn section_exactly_on_threshold_qualifies() {
        let tops = vec![
            SectionTop::mounted(SectionId::About, -720.0),
            SectionTop::mounted(SectionId::Experience, 80.0),
        ];

        assert_eq!(
            select_active_section(&scroll_at(1_000.0), &tops),
            SectionId::Experience
        );
    }

    #[test]
    fn unmounted_sections_are_skipped() {
        let tops = vec![
            SectionTop::mounted(SectionId::About, -300.0),
            SectionTop::unmounted(SectionId::Experience),
            SectionTop::unmounted(SectionId::Education),
            SectionTop::mounted(SectionId::Projects, 500.0),
        ];

        assert_eq!(select_active_section(&scroll_at(1_100.0), &tops), SectionId::About);
    }

    #[test]
    fn near_bottom_forces_last_section() {
        let scroll = ScrollState {
            scroll_y: 4_100.0,
            viewport_height: VIEWPORT,
            document_height: 5_000.0,
        };
        let tops = vec![
            SectionTop::mounted(SectionId::About, -3_300.0),
            SectionTop::mounted(SectionId::Experience, -2_500.0),
            SectionTop::mounted(SectionId::Education, -1_700.0),
            SectionTop::mounted(SectionId::Projects, 200.0),
        ];

        assert_eq!(select_active_section(&scroll, &tops), SectionId::Projects);
    }

    #[test]
    fn observe_reports_only_changes() {
        let mut tracker = ActiveSectionTracker::new(0.0);

        assert_eq!(tracker.observe(&scroll_at(0.0), &page_tops(0.0), 10.0), None);
        assert_eq!(
            tracker.observe(&scroll_at(1_700.0), &page_tops(1_700.0), 20.0),
            Some(SectionId::Experience)
        );
        assert_eq!(tracker.observe(&scroll_at(1_710.0), &page_tops(1_710.0), 30.0), None);
        assert_eq!(tracker.state().last_changed_at, 20.0);
    }

    #[test]
    fn previous_lags_until_debounce_elapses() {
        let mut tracker = ActiveSectionTracker::new(0.0);
        tracker.observe(&scroll_at(1_700.0), &page_tops(1_700.0), 1_000.0);

        assert!(tracker.state().just_activated(SectionId::Experience));
        assert!(!tracker.settle(1_050.0));
        assert!(tracker.settle(1_100.0));
        assert_eq!(tracker.state().previous, Some(SectionId::Experience));
        assert!(!tracker.state().just_activated(SectionId::Experience));
        assert!(!tracker.settle(1_500.0));
    }

    #[test]
    fn click_sets_target_immediately_and_suppresses_scroll_updates() {
        let mut tracker = ActiveSectionTracker::new(0.0);
        assert!(!tracker.is_programmatic());

        let request = tracker.request_scroll(SectionId::Projects, false, 500.0);
        assert!(tracker.is_programmatic());
        assert_eq!(tracker.current(), SectionId::Projects);

        for (offset, scroll_y) in [(100.0, 900.0), (400.0, 1_700.0), (900.0, 2_500.0)] {
            assert_eq!(
                tracker.observe(&scroll_at(scroll_y), &page_tops(scroll_y), 500.0 + offset),
                None
            );
            assert_eq!(tracker.current(), SectionId::Projects);
        }

        assert!(tracker.release(request.generation));
        assert!(!tracker.is_programmatic());
    }

    #[test]
    fn flag_lowers_between_one_and_one_point_one_seconds_after_click() {
        let mut tracker = ActiveSectionTracker::new(0.0);
        let clicked_at = 2_000.0;
        let request = tracker.request_scroll(SectionId::Education, false, clicked_at);

        assert!((1_000..=1_100).contains(&request.release_after_ms()));
        assert!(request.release_after_ms() > request.release_delay_ms);
        assert_eq!(request.release_at(clicked_at), clicked_at + 1_100.0);
        assert_eq!(request.scroll_delay_ms, PRE_SCROLL_DELAY_MS);
        assert_eq!(request.release_delay_ms, SCROLL_SETTLE_MS);
    }

    #[test]
    fn previous_catches_up_after_load_and_after_click() {
        let mut tracker = ActiveSectionTracker::new(0.0);
        tracker.observe(&scroll_at(0.0), &page_tops(0.0), 0.0);
        assert_eq!(tracker.settle_due_in(0.0), Some(ACTIVATION_DEBOUNCE_MS));
        assert!(tracker.settle(100.0));
        assert_eq!(tracker.state().previous, Some(SectionId::About));
        assert_eq!(tracker.settle_due_in(200.0), None);

        let request = tracker.request_scroll(SectionId::Education, false, 1_000.0);
        assert_eq!(tracker.settle_due_in(1_000.0), Some(ACTIVATION_DEBOUNCE_MS));
        assert!(tracker.state().just_activated(SectionId::Education));

        // A timer that fires a little early is told how long to wait again.
        assert!(!tracker.settle(1_097.5));
        assert_eq!(tracker.settle_due_in(1_097.5), Some(3));
        assert!(tracker.settle(1_100.0));

        tracker.release(request.generation);
        assert_eq!(
            tracker.observe(&scroll_at(2_400.0), &page_tops(2_400.0), 2_100.0),
            None
        );
        assert_eq!(tracker.state().previous, Some(SectionId::Education));
        assert!(!tracker.state().just_activated(SectionId::Education));
        assert_eq!(tracker.settle_due_in(9_000.0), None);
    }

    #[test]
    fn settle_is_due_immediately_once_window_has_passed() {
        let mut tracker = ActiveSectionTracker::new(0.0);
        tracker.request_scroll(SectionId::Projects, false, 500.0);
        assert_eq!(tracker.settle_due_in(900.0), Some(0));
    }

    #[test]
    fn stale_release_does_not_cut_newer_scroll_short() {
        let mut tracker = ActiveSectionTracker::new(0.0);
        let first = tracker.request_scroll(SectionId::Experience, false, 0.0);
        let second = tracker.request_scroll(SectionId::Projects, true, 600.0);

        assert!(second.close_overlay);
        assert!(!tracker.release(first.generation));
        assert!(tracker.is_programmatic());
        assert!(tracker.release(second.generation));
        assert!(!tracker.is_programmatic());
    }

    #[test]
    fn load_then_programmatic_scroll_to_education() {
        let mut tracker = ActiveSectionTracker::new(0.0);
        tracker.observe(&scroll_at(0.0), &page_tops(0.0), 0.0);
        assert_eq!(tracker.current().dom_id(), "section1");

        let request = tracker.request_scroll(SectionId::Education, false, 1_000.0);
        assert_eq!(tracker.current().dom_id(), "section3");

        let mut now = 1_000.0;
        let mut scroll_y = 0.0;
        while now < request.release_at(1_000.0) {
            now += 16.0;
            scroll_y = (scroll_y + 40.0_f64).min(2_400.0);
            tracker.observe(&scroll_at(scroll_y), &page_tops(scroll_y), now);
            assert_eq!(tracker.current(), SectionId::Education);
        }

        tracker.release(request.generation);
        assert_eq!(
            tracker.observe(&scroll_at(2_400.0), &page_tops(2_400.0), now),
            None
        );
        assert_eq!(tracker.current(), SectionId::Education);
    }
}
