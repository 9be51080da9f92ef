//! Screen callback contract and navigator
//!
//! Callbacks receive the whole UI context, so a screen can navigate from
//! inside its own handlers:
//!
//! ```text
//! goto(next):  push(current) → current.on_exit → current = next → next.on_entry
//! go_back():   current = pop() → current.on_entry
//! ```
//!
//! `go_back` does not call `on_exit` on the screen being left.

use super::stack::ScreenStack;

/// Numeric id returned when a screen is not in the table
pub const SCREEN_NOT_FOUND: u8 = 0xFF;

/// A screen of the user interface
///
/// Implemented by a `Copy` enum listing every screen. All callbacks default
/// to doing nothing; touch callbacks return true when they handled the tag.
#[allow(unused_variables)]
pub trait Screen<C: ?Sized>: Copy + PartialEq + 'static {
    /// Every screen; index 0 is the home screen
    const SCREENS: &'static [Self];

    /// Called once for every screen when the UI starts
    fn on_startup(self, cx: &mut C) {}

    fn on_entry(self, cx: &mut C) {}

    fn on_exit(self, cx: &mut C) {}

    /// Called periodically while the screen is active
    fn on_idle(self, cx: &mut C) {}

    /// Build and swap a new display list for this screen
    fn on_redraw(self, cx: &mut C) {}

    fn on_touch_start(self, cx: &mut C, tag: u8) -> bool {
        false
    }

    fn on_touch_held(self, cx: &mut C, tag: u8) -> bool {
        false
    }

    fn on_touch_end(self, cx: &mut C, tag: u8) -> bool {
        false
    }
}

/// Access to the navigator owned by a UI context
pub trait NavContext<S> {
    fn navigator(&mut self) -> &mut Navigator<S>;
}

/// Active screen plus history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Navigator<S> {
    current: S,
    stack: ScreenStack<S>,
}

impl<S: Copy + PartialEq> Navigator<S> {
    /// A navigator showing `home` with empty history
    pub const fn new(home: S) -> Self {
        Self {
            current: home,
            stack: ScreenStack::new(),
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    pub fn history(&self) -> &ScreenStack<S> {
        &self.stack
    }

    /// Drop the most recent history entry without navigating
    ///
    /// Used when a screen opens a modal that should return past it.
    pub fn forget(&mut self) {
        self.stack.forget();
    }

    /// Index of `screen` in the screen table
    pub fn lookup<C: ?Sized>(screen: S) -> Option<u8>
    where
        S: Screen<C>,
    {
        let found = <S as Screen<C>>::SCREENS
            .iter()
            .position(|s| *s == screen)
            .and_then(|i| u8::try_from(i).ok());
        if found.is_none() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Screen not found in table");
        }
        found
    }

    /// Numeric id of `screen`, [`SCREEN_NOT_FOUND`] if it is not in the table
    pub fn screen_id<C: ?Sized>(screen: S) -> u8
    where
        S: Screen<C>,
    {
        Self::lookup(screen).unwrap_or(SCREEN_NOT_FOUND)
    }

    /// Run every screen's startup hook, then enter the current screen
    pub fn start<C>(cx: &mut C)
    where
        C: NavContext<S>,
        S: Screen<C>,
    {
        for screen in <S as Screen<C>>::SCREENS.iter().copied() {
            screen.on_startup(cx);
        }
        let current = cx.navigator().current;
        current.on_entry(cx);
    }

    /// Switch to `next`, remembering the current screen
    pub fn goto<C>(cx: &mut C, next: S)
    where
        C: NavContext<S>,
        S: Screen<C>,
    {
        let nav = cx.navigator();
        let previous = nav.current;
        nav.stack.push(previous);
        previous.on_exit(cx);
        cx.navigator().current = next;
        next.on_entry(cx);
    }

    /// Return to the most recent screen in the history
    ///
    /// An empty history returns to the home screen.
    pub fn go_back<C>(cx: &mut C)
    where
        C: NavContext<S>,
        S: Screen<C>,
    {
        let home = <S as Screen<C>>::SCREENS.first().copied();
        let nav = cx.navigator();
        let next = match nav.stack.pop().or(home) {
            Some(next) => next,
            None => return,
        };
        nav.current = next;
        next.on_entry(cx);
    }

    /// Redraw the active screen
    pub fn redraw<C>(cx: &mut C)
    where
        C: NavContext<S>,
        S: Screen<C>,
    {
        let current = cx.navigator().current;
        current.on_redraw(cx);
    }

    /// Run the active screen's idle hook
    pub fn idle<C>(cx: &mut C)
    where
        C: NavContext<S>,
        S: Screen<C>,
    {
        let current = cx.navigator().current;
        current.on_idle(cx);
    }
}
