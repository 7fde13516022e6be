//! Auto-hiding control overlay.
//!
//! Controls are always visible outside full-screen. In full-screen they hide
//! once the idle deadline passes, unless the pointer rests on them. The
//! controller holds no timer itself: the session loop sleeps until
//! [`IdleUiController::deadline`] and then calls
//! [`IdleUiController::on_deadline`].

use crate::config::UiSettings;
use crate::render::RenderSurface;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleState {
    pub controls_visible: bool,
    pub pointer_over_controls: bool,
    pub idle_deadline: Option<Instant>,
}

#[derive(Debug)]
pub struct IdleUiController {
    state: IdleState,
    fullscreen: bool,
    auto_hide: bool,
    timeout: Duration,
}

impl IdleUiController {
    pub fn new(settings: &UiSettings) -> Self {
        Self {
            state: IdleState {
                controls_visible: true,
                pointer_over_controls: false,
                idle_deadline: None,
            },
            fullscreen: false,
            auto_hide: settings.auto_hide_controls,
            timeout: settings.idle_timeout(),
        }
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// When the controls should next be checked for hiding.
    pub fn deadline(&self) -> Option<Instant> {
        self.state.idle_deadline
    }

    pub fn on_pointer_activity(&mut self, now: Instant, render: &mut dyn RenderSurface) {
        self.show(render);
        self.arm(now);
    }

    pub fn on_pointer_enter_controls(&mut self, render: &mut dyn RenderSurface) {
        self.state.pointer_over_controls = true;
        self.state.idle_deadline = None;
        self.show(render);
    }

    pub fn on_pointer_leave_controls(&mut self, now: Instant) {
        self.state.pointer_over_controls = false;
        self.arm(now);
    }

    pub fn on_fullscreen_change(
        &mut self,
        fullscreen: bool,
        now: Instant,
        render: &mut dyn RenderSurface,
    ) {
        if fullscreen == self.fullscreen {
            return;
        }
        self.fullscreen = fullscreen;
        tracing::debug!(fullscreen, "fullscreen changed");
        self.show(render);
        if fullscreen {
            self.arm(now);
        } else {
            self.state.idle_deadline = None;
        }
    }

    /// The pointer left the window entirely.
    pub fn on_pointer_left_window(&mut self, render: &mut dyn RenderSurface) {
        self.state.pointer_over_controls = false;
        if self.fullscreen && self.auto_hide {
            self.state.idle_deadline = None;
            self.hide(render);
        }
    }

    /// Hide visible controls or show hidden ones. Only meaningful in
    /// full-screen.
    pub fn toggle_controls(&mut self, now: Instant, render: &mut dyn RenderSurface) {
        if !self.fullscreen {
            return;
        }
        if self.state.controls_visible {
            self.state.idle_deadline = None;
            self.hide(render);
        } else {
            self.show(render);
            self.arm(now);
        }
    }

    /// Hide the controls if the deadline has passed. Returns true if they
    /// were hidden.
    pub fn on_deadline(&mut self, now: Instant, render: &mut dyn RenderSurface) -> bool {
        match self.state.idle_deadline {
            Some(deadline) if now >= deadline => {}
            _ => return false,
        }
        self.state.idle_deadline = None;
        if !self.fullscreen || self.state.pointer_over_controls {
            return false;
        }
        self.hide(render);
        true
    }

    fn arm(&mut self, now: Instant) {
        if self.fullscreen && self.auto_hide && !self.state.pointer_over_controls {
            self.state.idle_deadline = Some(now + self.timeout);
        }
    }

    fn show(&mut self, render: &mut dyn RenderSurface) {
        if !self.state.controls_visible {
            self.state.controls_visible = true;
            render.set_controls_visible(true);
        }
    }

    fn hide(&mut self, render: &mut dyn RenderSurface) {
        if self.state.controls_visible {
            tracing::debug!("hiding idle controls");
            self.state.controls_visible = false;
            render.set_controls_visible(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSurface;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn fullscreen_controller(render: &mut RecordingSurface, t0: Instant) -> IdleUiController {
        let mut idle = IdleUiController::new(&UiSettings::default());
        idle.on_fullscreen_change(true, t0, render);
        idle
    }

    #[test]
    fn idle_timeout_hides_in_fullscreen() {
        let mut render = RecordingSurface::default();
        let t0 = Instant::now();
        let mut idle = fullscreen_controller(&mut render, t0);

        assert_eq!(idle.deadline(), Some(t0 + ms(3000)));
        assert!(!idle.on_deadline(t0 + ms(2999), &mut render));
        assert!(idle.state().controls_visible);
        assert!(idle.on_deadline(t0 + ms(3000), &mut render));
        assert!(!idle.state().controls_visible);
        assert_eq!(render.controls_visible(), Some(false));
    }

    #[test]
    fn activity_pushes_the_deadline() {
        let mut render = RecordingSurface::default();
        let t0 = Instant::now();
        let mut idle = fullscreen_controller(&mut render, t0);

        idle.on_pointer_activity(t0 + ms(2000), &mut render);
        assert!(!idle.on_deadline(t0 + ms(3000), &mut render));
        assert!(idle.state().controls_visible);
        assert_eq!(idle.deadline(), Some(t0 + ms(5000)));
        assert!(idle.on_deadline(t0 + ms(5000), &mut render));
    }

    #[test]
    fn pointer_over_controls_suppresses_hiding() {
        let mut render = RecordingSurface::default();
        let t0 = Instant::now();
        let mut idle = fullscreen_controller(&mut render, t0);

        idle.on_pointer_enter_controls(&mut render);
        assert_eq!(idle.deadline(), None);
        idle.on_pointer_activity(t0 + ms(100), &mut render);
        assert_eq!(idle.deadline(), None);
        assert!(!idle.on_deadline(t0 + ms(60_000), &mut render));
        assert!(idle.state().controls_visible);

        idle.on_pointer_leave_controls(t0 + ms(60_000));
        assert_eq!(idle.deadline(), Some(t0 + ms(63_000)));
    }

    #[test]
    fn never_hides_outside_fullscreen() {
        let mut render = RecordingSurface::default();
        let t0 = Instant::now();
        let mut idle = IdleUiController::new(&UiSettings::default());

        idle.on_pointer_activity(t0, &mut render);
        assert_eq!(idle.deadline(), None);
        idle.toggle_controls(t0, &mut render);
        idle.on_pointer_left_window(&mut render);
        assert!(idle.state().controls_visible);
        assert_eq!(render.controls_visible(), None);
    }

    #[test]
    fn leaving_fullscreen_shows_and_cancels() {
        let mut render = RecordingSurface::default();
        let t0 = Instant::now();
        let mut idle = fullscreen_controller(&mut render, t0);
        idle.on_deadline(t0 + ms(3000), &mut render);

        idle.on_fullscreen_change(false, t0 + ms(4000), &mut render);
        assert!(idle.state().controls_visible);
        assert_eq!(idle.deadline(), None);
        assert_eq!(render.controls_visible(), Some(true));
    }

    #[test]
    fn toggle_and_window_exit_in_fullscreen() {
        let mut render = RecordingSurface::default();
        let t0 = Instant::now();
        let mut idle = fullscreen_controller(&mut render, t0);

        idle.toggle_controls(t0, &mut render);
        assert!(!idle.state().controls_visible);
        assert_eq!(idle.deadline(), None);
        idle.toggle_controls(t0 + ms(10), &mut render);
        assert!(idle.state().controls_visible);
        assert_eq!(idle.deadline(), Some(t0 + ms(3010)));

        idle.on_pointer_left_window(&mut render);
        assert!(!idle.state().controls_visible);
        assert_eq!(idle.deadline(), None);
    }

    #[test]
    fn auto_hide_disabled_keeps_controls() {
        let mut render = RecordingSurface::default();
        let t0 = Instant::now();
        let settings = UiSettings {
            auto_hide_controls: false,
            ..UiSettings::default()
        };
        let mut idle = IdleUiController::new(&settings);
        idle.on_fullscreen_change(true, t0, &mut render);
        assert_eq!(idle.deadline(), None);
        assert!(!idle.on_deadline(t0 + ms(10_000), &mut render));
    }
}
