//! Press debounce state machine
//!
//! ```text
//!            tag                       tag = 0
//! UNPRESSED ─────▶ PRESSED(tag) ─────────────▶ DEBOUNCING ──(quiet)──▶ UNPRESSED
//!     │                                         │      ▲
//!     │ screen changed                     tag  │      │ tag = 0
//!     └──────────────▶ IGNORE_UNPRESS ◀─────────┘      │
//!                            └─────────────────────────┘
//! ```
//!
//! Tags read near release are unreliable, so every release passes through a
//! quiet window. A press that navigates away never delivers its touch-end.

use crate::timer::Timer;

/// Tag register value when nothing tagged is touched
pub const NO_TAG: u8 = 0;

/// Press states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressState {
    /// No touch in progress
    #[default]
    Unpressed,
    /// Released, waiting for the tag to stay quiet
    Debouncing,
    /// Touch in progress whose release must not be reported
    IgnoreUnpress,
    /// Touch in progress on a tag
    Pressed(u8),
}

/// Audible feedback requested by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Feedback {
    /// A press was accepted
    Press,
    /// A held press repeated
    Repeat,
    /// The release settled
    Release,
}

/// Receiver of touch events
///
/// Implemented by the UI driver, which forwards to the active screen.
pub trait TouchHandler {
    /// Identity of the active screen
    type ScreenId: Copy + PartialEq;

    fn active_screen(&self) -> Self::ScreenId;

    /// A tag was pressed; returns true if the press was handled
    fn touch_start(&mut self, tag: u8) -> bool;

    /// A tag is still held after the repeat interval
    fn touch_held(&mut self, tag: u8) -> bool;

    /// The tag was released
    fn touch_end(&mut self, tag: u8) -> bool;

    fn feedback(&mut self, feedback: Feedback);
}

impl PressState {
    /// Tag currently pressed, if any
    pub fn pressed_tag(&self) -> Option<u8> {
        match self {
            PressState::Pressed(tag) => Some(*tag),
            _ => None,
        }
    }

    /// Whether a finger is (or may still be) on the panel
    pub fn is_touching(&self) -> bool {
        matches!(self, PressState::Pressed(_) | PressState::IgnoreUnpress)
    }
}

/// Press tracker driven once per tick with the current tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchTracker {
    state: PressState,
    timer: Timer,
    debounce_ms: u32,
    repeat_ms: u32,
}

impl TouchTracker {
    /// Create a tracker with the given debounce window and repeat interval
    pub const fn new(debounce_ms: u32, repeat_ms: u32) -> Self {
        Self {
            state: PressState::Unpressed,
            timer: Timer::started_at(0),
            debounce_ms,
            repeat_ms,
        }
    }

    pub fn state(&self) -> PressState {
        self.state
    }

    pub fn pressed_tag(&self) -> Option<u8> {
        self.state.pressed_tag()
    }

    /// Feed one tag sample taken at `now_ms`
    ///
    /// Returns true when a press started or ended, i.e. when pressed
    /// widgets need to be redrawn.
    pub fn update<H: TouchHandler>(&mut self, handler: &mut H, tag: u8, now_ms: u32) -> bool {
        use PressState::*;

        match self.state {
            Unpressed => {
                if tag == NO_TAG {
                    return false;
                }
                let screen = handler.active_screen();
                let handled = handler.touch_start(tag);
                if handler.active_screen() != screen {
                    // The press navigated away; its release belongs to nobody
                    self.state = IgnoreUnpress;
                } else {
                    self.state = Pressed(tag);
                    self.timer.start(now_ms);
                    if handled {
                        handler.feedback(Feedback::Press);
                    }
                }
                true
            }
            Pressed(pressed) => {
                if tag == NO_TAG {
                    handler.touch_end(pressed);
                    self.timer.start(now_ms);
                    self.state = Debouncing;
                    return true;
                }
                if tag == pressed
                    && self.timer.elapsed(now_ms, self.repeat_ms)
                    && handler.touch_held(pressed)
                {
                    handler.feedback(Feedback::Repeat);
                    self.timer.start(now_ms);
                }
                false
            }
            Debouncing => {
                if tag != NO_TAG {
                    self.state = IgnoreUnpress;
                } else if self.timer.elapsed(now_ms, self.debounce_ms) {
                    self.state = Unpressed;
                    handler.feedback(Feedback::Release);
                }
                false
            }
            IgnoreUnpress => {
                if tag == NO_TAG {
                    self.timer.start(now_ms);
                    self.state = Debouncing;
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Start(u8, u8),
        Held(u8, u8),
        End(u8, u8),
        Sound(Feedback),
    }

    /// Records events per screen; pressing `jump_tag` switches screens
    struct Recorder {
        screen: u8,
        jump_tag: u8,
        held_result: bool,
        events: Vec<Event, 32>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                screen: 0,
                jump_tag: 0xFF,
                held_result: true,
                events: Vec::new(),
            }
        }
    }

    impl TouchHandler for Recorder {
        type ScreenId = u8;

        fn active_screen(&self) -> u8 {
            self.screen
        }

        fn touch_start(&mut self, tag: u8) -> bool {
            self.events.push(Event::Start(self.screen, tag)).unwrap();
            if tag == self.jump_tag {
                self.screen += 1;
            }
            true
        }

        fn touch_held(&mut self, tag: u8) -> bool {
            self.events.push(Event::Held(self.screen, tag)).unwrap();
            self.held_result
        }

        fn touch_end(&mut self, tag: u8) -> bool {
            self.events.push(Event::End(self.screen, tag)).unwrap();
            true
        }

        fn feedback(&mut self, feedback: Feedback) {
            self.events.push(Event::Sound(feedback)).unwrap();
        }
    }

    const DEBOUNCE: u32 = 150;
    const REPEAT: u32 = 250;

    #[test]
    fn test_press_and_release() {
        let mut h = Recorder::new();
        let mut t = TouchTracker::new(DEBOUNCE, REPEAT);

        assert!(t.update(&mut h, 7, 0));
        assert_eq!(t.state(), PressState::Pressed(7));
        assert_eq!(t.pressed_tag(), Some(7));

        assert!(t.update(&mut h, 0, 100));
        assert_eq!(t.state(), PressState::Debouncing);

        // Still inside the quiet window
        t.update(&mut h, 0, 200);
        assert_eq!(t.state(), PressState::Debouncing);

        t.update(&mut h, 0, 250);
        assert_eq!(t.state(), PressState::Unpressed);

        assert_eq!(
            h.events.as_slice(),
            &[
                Event::Start(0, 7),
                Event::Sound(Feedback::Press),
                Event::End(0, 7),
                Event::Sound(Feedback::Release),
            ]
        );
    }

    #[test]
    fn test_held_repeats() {
        let mut h = Recorder::new();
        let mut t = TouchTracker::new(DEBOUNCE, REPEAT);

        t.update(&mut h, 3, 0);
        t.update(&mut h, 3, 100);
        t.update(&mut h, 3, 250);
        t.update(&mut h, 3, 300);
        t.update(&mut h, 3, 500);

        let held = h
            .events
            .iter()
            .filter(|e| matches!(e, Event::Held(..)))
            .count();
        assert_eq!(held, 2);
        assert_eq!(
            h.events.iter().filter(|e| **e == Event::Sound(Feedback::Repeat)).count(),
            2
        );
    }

    #[test]
    fn test_unhandled_hold_retries_every_tick() {
        let mut h = Recorder::new();
        h.held_result = false;
        let mut t = TouchTracker::new(DEBOUNCE, REPEAT);

        t.update(&mut h, 3, 0);
        t.update(&mut h, 3, 260);
        t.update(&mut h, 3, 270);
        let held = h
            .events
            .iter()
            .filter(|e| matches!(e, Event::Held(..)))
            .count();
        assert_eq!(held, 2);
        assert!(!h.events.contains(&Event::Sound(Feedback::Repeat)));
    }

    #[test]
    fn test_screen_change_suppresses_touch_end() {
        let mut h = Recorder::new();
        h.jump_tag = 9;
        let mut t = TouchTracker::new(DEBOUNCE, REPEAT);

        t.update(&mut h, 9, 0);
        assert_eq!(t.state(), PressState::IgnoreUnpress);
        assert!(t.state().is_touching());

        t.update(&mut h, 9, 50);
        t.update(&mut h, 0, 100);
        assert_eq!(t.state(), PressState::Debouncing);
        t.update(&mut h, 0, 300);
        assert_eq!(t.state(), PressState::Unpressed);

        assert!(!h.events.iter().any(|e| matches!(e, Event::End(..))));
        // No press sound for a press that left the screen
        assert!(!h.events.contains(&Event::Sound(Feedback::Press)));
    }

    #[test]
    fn test_glitch_during_debounce_is_ignored() {
        let mut h = Recorder::new();
        let mut t = TouchTracker::new(DEBOUNCE, REPEAT);

        t.update(&mut h, 4, 0);
        t.update(&mut h, 0, 10);
        // Tag flickers back during the quiet window
        t.update(&mut h, 4, 20);
        assert_eq!(t.state(), PressState::IgnoreUnpress);
        t.update(&mut h, 0, 30);
        t.update(&mut h, 0, 200);
        assert_eq!(t.state(), PressState::Unpressed);

        let starts = h
            .events
            .iter()
            .filter(|e| matches!(e, Event::Start(..)))
            .count();
        let ends = h
            .events
            .iter()
            .filter(|e| matches!(e, Event::End(..)))
            .count();
        assert_eq!((starts, ends), (1, 1));
    }

    #[test]
    fn test_slide_to_other_tag_does_not_repeat() {
        let mut h = Recorder::new();
        let mut t = TouchTracker::new(DEBOUNCE, REPEAT);

        t.update(&mut h, 5, 0);
        t.update(&mut h, 6, 500);
        assert_eq!(t.state(), PressState::Pressed(5));
        assert!(!h.events.iter().any(|e| matches!(e, Event::Held(..))));

        t.update(&mut h, 0, 600);
        assert!(h.events.contains(&Event::End(0, 5)));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_touch_end_matches_touch_start(
                samples in proptest::collection::vec((0u8..4, 1u32..200), 1..40),
            ) {
                let mut h = Recorder::new();
                h.jump_tag = 2;
                let mut t = TouchTracker::new(DEBOUNCE, REPEAT);
                let mut now = 0u32;
                let mut open: Option<(u8, u8)> = None;

                for (tag, dt) in samples {
                    now += dt;
                    h.events.clear();
                    t.update(&mut h, tag, now);
                    for e in h.events.iter() {
                        match *e {
                            Event::Start(screen, tag) => {
                                if h.screen == screen {
                                    open = Some((screen, tag));
                                }
                            }
                            Event::End(screen, tag) => {
                                prop_assert_eq!(open, Some((screen, tag)));
                                open = None;
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
    }
}
