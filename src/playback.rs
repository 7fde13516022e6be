//! Playback state machine.
//!
//! The controller owns the deck, the current index and the play/pause phase.
//! Showing a photo is a two-step affair: the picture is preloaded through the
//! [`MediaCache`] (synchronously on a hit, on a spawned task otherwise), then
//! the [`TransitionEngine`] animates it in. Only one advance is in flight at a
//! time. Requests arriving meanwhile are coalesced into a single queued slot,
//! latest wins, and replayed once the role swap completes.

use crate::audio::AudioSynchronizer;
use crate::cache::{display_name, ImageHandle, MediaCache, Slot};
use crate::config::{derived_transition, PlaybackSettings};
use crate::effects::EffectChoice;
use crate::notify::{Notification, Notifier};
use crate::render::{ProgressBar, RenderSurface};
use crate::session::{EventSender, SessionEvent};
use crate::timer::Ticker;
use crate::transition::TransitionEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Shortest advance period accepted.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Stopped,
    Playing,
    Paused,
}

/// A request to move through the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Prev,
    /// Any index; wrapped into the deck.
    To(isize),
}

/// Who asked for an advance. Pausing drops queued scheduler advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    User,
    Scheduler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Preloading { request: u64, index: usize },
    Transitioning { index: usize },
}

/// Collaborators the controller drives while handling one event.
pub struct PlaybackContext<'a> {
    pub render: &'a mut dyn RenderSurface,
    pub audio: &'a mut AudioSynchronizer,
    pub events: &'a EventSender,
}

pub struct PlaybackController {
    deck: Vec<String>,
    current_index: usize,
    phase: PlaybackPhase,
    interval: Duration,
    transition: Duration,
    effect: EffectChoice,
    cache: Arc<MediaCache>,
    engine: TransitionEngine,
    notifier: Arc<dyn Notifier>,
    ticker: Option<Ticker>,
    ticker_generation: u64,
    requests: u64,
    in_flight: Option<InFlight>,
    queued: Option<(Advance, Origin)>,
}

impl PlaybackController {
    pub fn new(
        deck: Vec<String>,
        settings: &PlaybackSettings,
        cache: Arc<MediaCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            deck,
            current_index: 0,
            phase: PlaybackPhase::Stopped,
            interval: settings.interval().max(MIN_INTERVAL),
            transition: settings.transition(),
            effect: EffectChoice::from_name(&settings.effect),
            cache,
            engine: TransitionEngine::new(),
            notifier,
            ticker: None,
            ticker_generation: 0,
            requests: 0,
            in_flight: None,
            queued: None,
        }
    }

    pub fn with_engine(mut self, engine: TransitionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn deck(&self) -> &[String] {
        &self.deck
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn transition_duration(&self) -> Duration {
        self.transition
    }

    pub fn effect(&self) -> EffectChoice {
        self.effect
    }

    /// A preload or transition is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn queued(&self) -> Option<Advance> {
        self.queued.map(|(advance, _)| advance)
    }

    /// When the running transition wants its role swap.
    pub fn swap_due(&self) -> Option<Instant> {
        self.engine.swap_due()
    }

    /// Generation of the armed advance scheduler. Ticks carrying any other
    /// generation are stale.
    pub fn scheduler_generation(&self) -> Option<u64> {
        self.ticker.as_ref().map(Ticker::generation)
    }

    pub fn start(&mut self, cx: &mut PlaybackContext<'_>) {
        if self.deck.is_empty() {
            tracing::warn!("Cannot start playback, the deck is empty");
            self.notifier
                .notify(Notification::warning("No photos to show", 3000));
            cx.render.show_no_content();
            return;
        }
        if self.is_playing() {
            return;
        }

        self.phase = PlaybackPhase::Playing;
        tracing::info!("Playback started, advancing every {:?}", self.interval);
        self.arm_scheduler(cx.events);
        cx.render.set_status("Playing");
        self.restart_progress(cx.render);
        cx.audio.ensure_playing(cx.render);
    }

    pub fn pause(&mut self, cx: &mut PlaybackContext<'_>) {
        if !self.is_playing() {
            return;
        }

        self.phase = PlaybackPhase::Paused;
        tracing::info!("Playback paused");
        self.ticker = None;
        if let Some((advance, Origin::Scheduler)) = self.queued {
            tracing::debug!(?advance, "dropping queued scheduler advance");
            self.queued = None;
        }
        cx.render.set_status("Paused");
        cx.render.set_progress(ProgressBar::Empty);
        cx.audio.silence(cx.render);
    }

    pub fn toggle(&mut self, cx: &mut PlaybackContext<'_>) {
        if self.is_playing() {
            self.pause(cx);
        } else {
            self.start(cx);
        }
    }

    pub fn show_photo(&mut self, index: isize, now: Instant, cx: &mut PlaybackContext<'_>) {
        self.request(Advance::To(index), Origin::User, now, cx);
    }

    pub fn next(&mut self, now: Instant, cx: &mut PlaybackContext<'_>) {
        self.request(Advance::Next, Origin::User, now, cx);
    }

    pub fn prev(&mut self, now: Instant, cx: &mut PlaybackContext<'_>) {
        self.request(Advance::Prev, Origin::User, now, cx);
    }

    /// Change the advance period. The transition length follows the period
    /// and a running scheduler restarts with the new period.
    pub fn set_interval(&mut self, interval: Duration, cx: &mut PlaybackContext<'_>) {
        self.interval = interval.max(MIN_INTERVAL);
        self.transition = derived_transition(self.interval);
        tracing::info!(
            "Interval set to {:?}, transitions last {:?}",
            self.interval,
            self.transition
        );
        if self.is_playing() {
            self.arm_scheduler(cx.events);
            self.restart_progress(cx.render);
        }
    }

    /// Swap in a new deck and rewind to its first photo. Refused while an
    /// advance is in flight.
    pub fn replace_deck(&mut self, deck: Vec<String>) -> bool {
        if self.is_busy() {
            tracing::warn!("Cannot replace the deck while a photo is loading");
            return false;
        }
        tracing::info!("Deck replaced, {} photos", deck.len());
        self.deck = deck;
        self.current_index = 0;
        self.queued = None;
        true
    }

    pub fn select_effect(&mut self, effect: EffectChoice) {
        tracing::info!("Transition effect: {}", effect);
        self.effect = effect;
    }

    /// A scheduler tick arrived.
    pub fn on_advance_tick(&mut self, generation: u64, now: Instant, cx: &mut PlaybackContext<'_>) {
        if !self.is_playing() || self.scheduler_generation() != Some(generation) {
            tracing::trace!(generation, "ignoring stale advance tick");
            return;
        }
        self.request(Advance::Next, Origin::Scheduler, now, cx);
    }

    /// A spawned preload finished.
    pub fn on_preloaded(
        &mut self,
        request: u64,
        index: usize,
        image: ImageHandle,
        now: Instant,
        cx: &mut PlaybackContext<'_>,
    ) {
        match self.in_flight {
            Some(InFlight::Preloading { request: r, index: i }) if r == request && i == index => {}
            _ => {
                tracing::debug!(request, "dropping stale preload result");
                return;
            }
        }
        self.current_index = index;
        self.begin_transition(index, image, now, cx);
    }

    /// The running transition reached its swap point.
    pub fn on_swap_due(&mut self, now: Instant, cx: &mut PlaybackContext<'_>) {
        match self.engine.swap_due() {
            Some(due) if now >= due => {}
            _ => return,
        }
        self.engine.complete(cx.render);
        self.in_flight = None;

        let reference = &self.deck[self.current_index];
        let name = display_name(reference);
        tracing::info!(
            "Showing photo {}/{}: {}",
            self.current_index + 1,
            self.deck.len(),
            reference
        );
        cx.render.set_counter(self.current_index + 1, self.deck.len());
        cx.render.set_caption(&name);

        if let Some((advance, origin)) = self.queued.take() {
            tracing::debug!(?advance, ?origin, "replaying queued advance");
            self.request(advance, origin, now, cx);
        }
    }

    fn request(
        &mut self,
        advance: Advance,
        origin: Origin,
        now: Instant,
        cx: &mut PlaybackContext<'_>,
    ) {
        if self.deck.is_empty() {
            tracing::debug!(?advance, "deck is empty, nothing to show");
            return;
        }
        if self.in_flight.is_some() {
            tracing::debug!(?advance, "advance in flight, queueing");
            self.queued = Some((advance, origin));
            return;
        }

        let index = self.resolve(advance);
        let reference = self.deck[index].clone();
        if let Some(image) = self.cache.cached(&reference) {
            self.current_index = index;
            self.begin_transition(index, image, now, cx);
            return;
        }

        self.requests += 1;
        let request = self.requests;
        self.in_flight = Some(InFlight::Preloading { request, index });

        let cache = Arc::clone(&self.cache);
        let events = cx.events.clone();
        let slot = Slot {
            index,
            total: self.deck.len(),
        };
        tokio::spawn(async move {
            let image = cache.preload(&reference, slot).await;
            events.send(SessionEvent::Preloaded {
                request,
                index,
                image,
            });
        });
    }

    fn resolve(&self, advance: Advance) -> usize {
        let n = self.deck.len();
        let current = self.current_index as isize;
        match advance {
            Advance::Next => wrap(current + 1, n),
            Advance::Prev => wrap(current - 1, n),
            Advance::To(index) => wrap(index, n),
        }
    }

    fn begin_transition(
        &mut self,
        index: usize,
        image: ImageHandle,
        now: Instant,
        cx: &mut PlaybackContext<'_>,
    ) {
        match self
            .engine
            .run(&image, self.effect, self.transition, now, cx.render)
        {
            Ok(state) => {
                tracing::debug!(index, effect = %state.effect, "transition to photo");
                self.in_flight = Some(InFlight::Transitioning { index });
            }
            Err(e) => {
                tracing::warn!("Transition to photo {} not started: {}", index, e);
                self.in_flight = None;
            }
        }
        self.restart_progress(cx.render);
    }

    fn arm_scheduler(&mut self, events: &EventSender) {
        self.ticker_generation += 1;
        // replacing the ticker cancels the previous one
        self.ticker = Some(Ticker::spawn(
            self.interval,
            self.ticker_generation,
            events.clone(),
        ));
    }

    fn restart_progress(&self, render: &mut dyn RenderSurface) {
        render.set_progress(ProgressBar::Empty);
        if self.is_playing() {
            render.set_progress(ProgressBar::Filling(self.interval));
        }
    }
}

/// Wrap any index into `0..len`. `len` must be non-zero.
pub fn wrap(index: isize, len: usize) -> usize {
    index.rem_euclid(len as isize) as usize
}
