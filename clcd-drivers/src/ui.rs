//! UI driver loop
//!
//! [`Ui`] ties the display, the screen navigator and the touch tracker
//! together. Call [`Ui::tick`] from the main loop:
//!
//! ```text
//! tick ─┬─ idle interval elapsed? ─▶ current.on_idle
//!       ├─ coprocessor busy? ─▶ done (tags are unreliable mid-render)
//!       └─ read tag ─▶ TouchTracker ─▶ on_touch_* ─▶ redraw on press/release
//! ```
//!
//! Screen callbacks get `&mut Ui`, so they can draw, navigate and reach the
//! application state in `app`. Bus errors raised inside callbacks are held
//! and returned from the next `start` or `tick`.

use clcd_core::config::UiConfig;
use clcd_core::nav::{NavContext, Navigator, Screen, ScreenStack};
use clcd_core::timer::Timer;
use clcd_core::touch::{Feedback, PressState, TouchHandler, TouchTracker};
use clcd_core::traits::RegisterAccess;
use clcd_hal::Clock;
use clcd_protocol::sound::MIDDLE_C;

use crate::cmd::CommandProcessor;
use crate::fifo::FifoBackend;
use crate::lcd::Lcd;
use crate::sound::SoundPlayer;

/// Display, navigation and touch state of one user interface
pub struct Ui<R: RegisterAccess, B, K, S, A> {
    pub lcd: Lcd<R, B, K>,
    /// Application state shared with the screens
    pub app: A,
    nav: Navigator<S>,
    touch: TouchTracker,
    sound: SoundPlayer,
    config: UiConfig,
    idle_timer: Timer,
    fault: Option<R::Error>,
}

impl<R, B, K, S, A> Ui<R, B, K, S, A>
where
    R: RegisterAccess,
    B: FifoBackend,
    K: Clock,
    S: Screen<Ui<R, B, K, S, A>>,
{
    /// Build a UI showing `home`; nothing is drawn until [`Ui::start`]
    pub fn new(lcd: Lcd<R, B, K>, app: A, home: S, config: UiConfig) -> Self {
        let now = lcd.clock().now_ms();
        let sound = SoundPlayer::new(lcd.map());
        Self {
            lcd,
            app,
            nav: Navigator::new(home),
            touch: TouchTracker::new(config.debounce_ms, config.repeat_interval_ms()),
            sound,
            config,
            idle_timer: Timer::started_at(now),
            fault: None,
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Set the volume, run every screen's startup hook and enter the
    /// current screen
    pub fn start(&mut self) -> Result<(), R::Error> {
        self.sound.set_volume(self.lcd.regs(), self.config.volume)?;
        Navigator::<S>::start(self);
        self.take_fault()
    }

    pub fn current(&self) -> S {
        self.nav.current()
    }

    pub fn history(&self) -> &ScreenStack<S> {
        self.nav.history()
    }

    pub fn goto(&mut self, next: S) {
        Navigator::<S>::goto(self, next);
    }

    pub fn go_back(&mut self) {
        Navigator::<S>::go_back(self);
    }

    /// Drop the most recent history entry
    pub fn forget(&mut self) {
        self.nav.forget();
    }

    /// Redraw the current screen
    pub fn redraw(&mut self) {
        Navigator::<S>::redraw(self);
    }

    /// Tag held down right now, for drawing pressed widgets
    pub fn pressed_tag(&self) -> Option<u8> {
        self.touch.pressed_tag()
    }

    pub fn press_state(&self) -> PressState {
        self.touch.state()
    }

    /// Run one iteration of the UI loop
    pub fn tick(&mut self) -> Result<(), R::Error> {
        let now = self.lcd.clock().now_ms();
        if self.idle_timer.elapsed(now, self.config.idle_interval_ms) {
            self.idle_timer.start(now);
            Navigator::<S>::idle(self);
        }

        if self.lcd.is_idle()? {
            let tag = self.lcd.tag()?;
            let mut touch = self.touch;
            let changed = touch.update(self, tag, now);
            self.touch = touch;
            if changed {
                Navigator::<S>::redraw(self);
            }
        }
        self.take_fault()
    }

    /// Draw a frame with a cached background, see [`Lcd::refresh_cached`]
    ///
    /// A bus error is held until the end of the current `tick`.
    pub fn draw_cached<F, G>(&mut self, slot: u16, reserve: u32, background: F, foreground: G)
    where
        F: FnOnce(&mut CommandProcessor<'_, R, B, K>, &A) -> Result<(), R::Error>,
        G: FnOnce(&mut CommandProcessor<'_, R, B, K>, &A) -> Result<(), R::Error>,
    {
        let app = &self.app;
        let result = self.lcd.refresh_cached(
            slot,
            reserve,
            |cmd| background(cmd, app),
            |cmd| foreground(cmd, app),
        );
        self.check(result);
    }

    /// Draw a frame without the cache
    pub fn draw_uncached<F>(&mut self, draw: F)
    where
        F: FnOnce(&mut CommandProcessor<'_, R, B, K>, &A) -> Result<(), R::Error>,
    {
        let app = &self.app;
        let result = self.lcd.refresh_uncached(|cmd| draw(cmd, app));
        self.check(result);
    }

    /// Play a feedback effect
    pub fn play(&mut self, effect: clcd_protocol::Effect) {
        let result = self.sound.play(self.lcd.regs(), effect, MIDDLE_C);
        self.check(result);
    }

    /// Keep the first error raised from a callback
    pub fn check<T>(&mut self, result: Result<T, R::Error>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                if self.fault.is_none() {
                    self.fault = Some(e);
                }
                None
            }
        }
    }

    fn take_fault(&mut self) -> Result<(), R::Error> {
        match self.fault.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<R: RegisterAccess, B, K, S, A> NavContext<S> for Ui<R, B, K, S, A> {
    fn navigator(&mut self) -> &mut Navigator<S> {
        &mut self.nav
    }
}

impl<R, B, K, S, A> TouchHandler for Ui<R, B, K, S, A>
where
    R: RegisterAccess,
    B: FifoBackend,
    K: Clock,
    S: Screen<Ui<R, B, K, S, A>>,
{
    type ScreenId = S;

    fn active_screen(&self) -> S {
        self.nav.current()
    }

    fn touch_start(&mut self, tag: u8) -> bool {
        let screen = self.nav.current();
        screen.on_touch_start(self, tag)
    }

    fn touch_held(&mut self, tag: u8) -> bool {
        let screen = self.nav.current();
        screen.on_touch_held(self, tag)
    }

    fn touch_end(&mut self, tag: u8) -> bool {
        let screen = self.nav.current();
        screen.on_touch_end(self, tag)
    }

    fn feedback(&mut self, feedback: Feedback) {
        let effect = match feedback {
            Feedback::Press => self.config.press_sound,
            Feedback::Repeat => self.config.repeat_sound,
            Feedback::Release => self.config.unpress_sound,
        };
        self.play(effect);
    }
}
