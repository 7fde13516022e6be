//! Dual-surface transitions.
//!
//! Two surfaces are stacked. The one in the `Current` role shows the photo on
//! screen and the other stages the incoming one. A transition loads the new
//! photo into the staging surface, runs the effect's enter animation on it and
//! the exit animation on the current surface, then swaps roles shortly before
//! the animation ends.

use crate::cache::ImageHandle;
use crate::effects::{Effect, EffectChoice};
use crate::error::TransitionError;
use crate::render::{RenderSurface, Role, SurfaceId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::time::Instant;

/// How long before the end of the animation the roles are swapped.
pub const SWAP_LEAD: Duration = Duration::from_millis(100);

/// One transition between the two surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionState {
    pub source: SurfaceId,
    pub target: SurfaceId,
    pub effect: Effect,
    pub duration: Duration,
}

#[derive(Debug)]
struct PendingSwap {
    state: TransitionState,
    due: Instant,
}

pub struct TransitionEngine {
    current: SurfaceId,
    lead: Duration,
    pending: Option<PendingSwap>,
    rng: StdRng,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            current: SurfaceId::A,
            lead: SWAP_LEAD,
            pending: None,
            rng,
        }
    }

    /// Surface currently in the `Current` role.
    pub fn current(&self) -> SurfaceId {
        self.current
    }

    /// The transition waiting for its role swap, if any.
    pub fn active(&self) -> Option<&TransitionState> {
        self.pending.as_ref().map(|p| &p.state)
    }

    /// When the pending role swap is due.
    pub fn swap_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Start a transition to `image`. `Random` is resolved here, once per
    /// transition.
    pub fn run(
        &mut self,
        image: &ImageHandle,
        choice: EffectChoice,
        duration: Duration,
        now: Instant,
        render: &mut dyn RenderSurface,
    ) -> Result<TransitionState, TransitionError> {
        if self.pending.is_some() {
            return Err(TransitionError::Busy);
        }

        let effect = choice.resolve(&mut self.rng);
        let variant = effect.animations(&mut self.rng);
        let state = TransitionState {
            source: self.current,
            target: self.current.other(),
            effect,
            duration,
        };

        render.reset(state.source);
        render.reset(state.target);
        render.set_image(state.target, image);
        render.animate(state.target, &variant.enter, duration);
        render.animate(state.source, &variant.exit, duration);

        tracing::debug!(
            effect = %effect,
            enter = variant.enter.name,
            exit = variant.exit.name,
            ?duration,
            "transition started"
        );

        self.pending = Some(PendingSwap {
            state,
            due: now + duration.saturating_sub(self.lead),
        });
        Ok(state)
    }

    /// Swap roles and return both surfaces to a neutral pose. Returns the
    /// finished transition, or `None` if nothing was pending.
    pub fn complete(&mut self, render: &mut dyn RenderSurface) -> Option<TransitionState> {
        let PendingSwap { state, .. } = self.pending.take()?;
        self.current = state.target;

        render.reset(state.source);
        render.reset(state.target);
        render.set_role(state.target, Role::Current);
        render.set_role(state.source, Role::Next);
        Some(state)
    }
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new()
    }
}
