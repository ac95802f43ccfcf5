//! Flip navigator
//!
//! Tracks the current page of the flipbook and its display mode. Narrow
//! viewports show one page at a time; wider ones show spreads of facing
//! pages `(0,1), (2,3), ...` where the current index is the spread's left
//! page.

use thiserror::Error;

/// Viewports narrower than this (CSS `max-width: 991.98px`) show one page
pub const SINGLE_PAGE_BREAKPOINT: f32 = 992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    SinglePage,
    TwoPage,
}

impl DisplayMode {
    pub fn for_viewport_width(width: f32) -> Self {
        if width < SINGLE_PAGE_BREAKPOINT {
            DisplayMode::SinglePage
        } else {
            DisplayMode::TwoPage
        }
    }

    /// Pages advanced by one turn
    fn step(self) -> usize {
        match self {
            DisplayMode::SinglePage => 1,
            DisplayMode::TwoPage => 2,
        }
    }
}

/// Emitted by the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorEvent {
    /// A page turn completed and the current index changed
    Flip { index: usize },
    /// The navigator was rebuilt, e.g. after a breakpoint crossing
    StateChanged { mode: DisplayMode, index: usize },
}

/// Prev/next availability and page counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarState {
    /// 1-based
    pub current_page: usize,
    pub page_count: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigatorError {
    #[error("Document has no pages")]
    NoPages,
}

type Listener = Box<dyn FnMut(&NavigatorEvent) + Send>;

/// Page-turn state machine
pub struct FlipNavigator {
    page_count: usize,
    current: usize,
    mode: DisplayMode,
    rebuilds: u32,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for FlipNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlipNavigator")
            .field("page_count", &self.page_count)
            .field("current", &self.current)
            .field("mode", &self.mode)
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}

impl FlipNavigator {
    /// Build a navigator positioned at `start_index` (clamped)
    pub fn new(
        page_count: usize,
        start_index: usize,
        viewport_width: f32,
    ) -> Result<Self, NavigatorError> {
        if page_count == 0 {
            return Err(NavigatorError::NoPages);
        }

        let mode = DisplayMode::for_viewport_width(viewport_width);
        let mut navigator = Self {
            page_count,
            current: 0,
            mode,
            rebuilds: 0,
            listeners: Vec::new(),
        };
        navigator.current = navigator.normalize(start_index);
        Ok(navigator)
    }

    /// Register an observer for flip and state-change events
    pub fn subscribe(&mut self, listener: impl FnMut(&NavigatorEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Number of teardown/rebuild cycles caused by mode changes
    pub fn rebuilds(&self) -> u32 {
        self.rebuilds
    }

    pub fn turn_next(&mut self) -> Option<NavigatorEvent> {
        let target = self.current + self.mode.step();
        if target >= self.page_count {
            return None;
        }
        self.flip_to(target)
    }

    pub fn turn_prev(&mut self) -> Option<NavigatorEvent> {
        let target = self.current.checked_sub(self.mode.step())?;
        self.flip_to(target)
    }

    /// Turn to the page (or the spread holding it); out-of-range indices clamp
    pub fn turn_to(&mut self, index: usize) -> Option<NavigatorEvent> {
        let target = self.normalize(index);
        self.flip_to(target)
    }

    /// Turn to a page typed by the user (1-based)
    ///
    /// Leading digits are read (`"12abc"` is 12), then clamped to
    /// `[1, page_count]`. Input without digits counts as 1.
    pub fn turn_to_page_input(&mut self, input: &str) -> Option<NavigatorEvent> {
        let page = parse_leading_int(input).unwrap_or(1);
        let page = page.clamp(1, self.page_count as i64) as usize;
        self.turn_to(page - 1)
    }

    /// Re-evaluate the display mode for a new viewport width
    ///
    /// Crossing the breakpoint tears the navigator down and rebuilds it in the
    /// new mode at the same page.
    pub fn on_resize(&mut self, viewport_width: f32) -> Option<NavigatorEvent> {
        let mode = DisplayMode::for_viewport_width(viewport_width);
        if mode == self.mode {
            return None;
        }

        let index = self.current;
        self.mode = mode;
        self.current = self.normalize(index);
        self.rebuilds += 1;

        tracing::debug!(mode = ?mode, index = self.current, "Navigator rebuilt");

        let event = NavigatorEvent::StateChanged {
            mode,
            index: self.current,
        };
        self.emit(&event);
        Some(event)
    }

    /// Toolbar state derived from index, count and mode
    pub fn toolbar(&self) -> ToolbarState {
        let count = self.page_count;
        let idx = self.current + 1;

        let (prev_enabled, next_enabled) = match self.mode {
            DisplayMode::SinglePage => (idx > 1, idx < count),
            DisplayMode::TwoPage => {
                let left = if idx % 2 == 0 { idx - 1 } else { idx };
                let right = (left + 1).min(count);
                (left > 1, right < count)
            }
        };

        ToolbarState {
            current_page: idx,
            page_count: count,
            prev_enabled,
            next_enabled,
        }
    }

    fn flip_to(&mut self, target: usize) -> Option<NavigatorEvent> {
        if target == self.current {
            return None;
        }
        self.current = target;
        let event = NavigatorEvent::Flip { index: target };
        self.emit(&event);
        Some(event)
    }

    /// Clamp into range and, in two-page mode, snap to the spread's left page
    fn normalize(&self, index: usize) -> usize {
        let index = index.min(self.page_count - 1);
        match self.mode {
            DisplayMode::SinglePage => index,
            DisplayMode::TwoPage => index - index % 2,
        }
    }

    fn emit(&mut self, event: &NavigatorEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

/// Optional sign followed by digits, ignoring leading whitespace and any tail
fn parse_leading_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs; they clamp to the last page anyway
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const NARROW: f32 = 600.0;
    const WIDE: f32 = 1280.0;

    #[test]
    fn test_mode_breakpoint() {
        assert_eq!(DisplayMode::for_viewport_width(991.0), DisplayMode::SinglePage);
        assert_eq!(DisplayMode::for_viewport_width(991.98), DisplayMode::SinglePage);
        assert_eq!(DisplayMode::for_viewport_width(992.0), DisplayMode::TwoPage);
    }

    #[test]
    fn test_empty_document_rejected() {
        assert_eq!(FlipNavigator::new(0, 0, WIDE).unwrap_err(), NavigatorError::NoPages);
    }

    #[test]
    fn test_single_page_bounds() {
        let mut nav = FlipNavigator::new(3, 0, NARROW).unwrap();
        assert!(nav.turn_prev().is_none());
        assert_eq!(nav.turn_next(), Some(NavigatorEvent::Flip { index: 1 }));
        assert_eq!(nav.turn_next(), Some(NavigatorEvent::Flip { index: 2 }));
        assert!(nav.turn_next().is_none());
        assert_eq!(nav.current_index(), 2);

        let toolbar = nav.toolbar();
        assert!(!toolbar.next_enabled);
        assert!(toolbar.prev_enabled);
        assert_eq!((toolbar.current_page, toolbar.page_count), (3, 3));
    }

    #[test]
    fn test_two_page_spreads() {
        let mut nav = FlipNavigator::new(5, 0, WIDE).unwrap();
        let toolbar = nav.toolbar();
        assert!(!toolbar.prev_enabled);
        assert!(toolbar.next_enabled);

        assert_eq!(nav.turn_next(), Some(NavigatorEvent::Flip { index: 2 }));
        assert_eq!(nav.turn_next(), Some(NavigatorEvent::Flip { index: 4 }));
        assert!(nav.turn_next().is_none());
        assert!(!nav.toolbar().next_enabled);

        assert_eq!(nav.turn_prev(), Some(NavigatorEvent::Flip { index: 2 }));
        // Pages 3 and 4 share a spread
        assert_eq!(nav.turn_to(3), None);
        assert_eq!(nav.current_index(), 2);
    }

    #[test]
    fn test_two_page_last_spread_with_even_count() {
        let mut nav = FlipNavigator::new(4, 0, WIDE).unwrap();
        nav.turn_next();
        assert_eq!(nav.current_index(), 2);
        let toolbar = nav.toolbar();
        // Spread (3, 4) holds the last page
        assert!(!toolbar.next_enabled);
        assert!(toolbar.prev_enabled);
    }

    #[test]
    fn test_turn_to_clamps() {
        let mut nav = FlipNavigator::new(3, 10, NARROW).unwrap();
        assert_eq!(nav.current_index(), 2);
        assert!(nav.turn_to(99).is_none());
        assert_eq!(nav.turn_to(0), Some(NavigatorEvent::Flip { index: 0 }));
    }

    #[test]
    fn test_page_input() {
        let mut nav = FlipNavigator::new(8, 0, NARROW).unwrap();
        nav.turn_to_page_input("5");
        assert_eq!(nav.current_index(), 4);
        nav.turn_to_page_input("99");
        assert_eq!(nav.current_index(), 7);
        nav.turn_to_page_input("abc");
        assert_eq!(nav.current_index(), 0);
        nav.turn_to_page_input("6th");
        assert_eq!(nav.current_index(), 5);
        nav.turn_to_page_input("-3");
        assert_eq!(nav.current_index(), 0);
        nav.turn_to_page_input("99999999999999999999999");
        assert_eq!(nav.current_index(), 7);
    }

    #[test]
    fn test_index_invariant_under_random_walk() {
        for &width in &[NARROW, WIDE] {
            let mut nav = FlipNavigator::new(7, 0, width).unwrap();
            for step in 0..200usize {
                match step % 5 {
                    0 | 1 => {
                        nav.turn_next();
                    }
                    2 => {
                        nav.turn_prev();
                    }
                    3 => {
                        nav.turn_to(step * 7 % 11);
                    }
                    _ => {
                        nav.on_resize(if step % 2 == 0 { NARROW } else { WIDE });
                    }
                }
                assert!(nav.current_index() < nav.page_count());
            }
        }
    }

    #[test]
    fn test_resize_rebuild_preserves_index() {
        let mut nav = FlipNavigator::new(6, 0, NARROW).unwrap();
        nav.turn_to(3);

        let event = nav.on_resize(WIDE);
        assert_eq!(
            event,
            Some(NavigatorEvent::StateChanged {
                mode: DisplayMode::TwoPage,
                index: 2
            })
        );
        assert_eq!(nav.rebuilds(), 1);

        // Same side of the breakpoint: nothing to rebuild
        assert!(nav.on_resize(1500.0).is_none());
        assert_eq!(nav.rebuilds(), 1);
    }

    #[test]
    fn test_listeners_receive_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut nav = FlipNavigator::new(3, 0, NARROW).unwrap();
        nav.subscribe(move |event| sink.lock().unwrap().push(*event));

        nav.turn_next();
        nav.turn_prev();
        nav.turn_prev();
        nav.on_resize(WIDE);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                NavigatorEvent::Flip { index: 1 },
                NavigatorEvent::Flip { index: 0 },
                NavigatorEvent::StateChanged {
                    mode: DisplayMode::TwoPage,
                    index: 0
                },
            ]
        );
    }
}
