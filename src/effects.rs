//! Transition effects.
//!
//! Each [`Effect`] owns one record in a static table. A record lists one or
//! more variants (slide direction, rotation axis) and every variant pairs an
//! enter animation for the incoming surface with an exit animation for the
//! outgoing one. Animations are keyframe lists sampled with an easing curve
//! applied per segment.

use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Concrete transition effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Fade,
    Slide,
    Zoom,
    Rotate3d,
    Flip,
    Cube,
    Glitch,
    Wave,
    Particles,
    Mosaic,
    Swirl,
    Dreamy,
}

impl Effect {
    /// All concrete effects in table order.
    pub const ALL: [Effect; 12] = [
        Effect::Fade,
        Effect::Slide,
        Effect::Zoom,
        Effect::Rotate3d,
        Effect::Flip,
        Effect::Cube,
        Effect::Glitch,
        Effect::Wave,
        Effect::Particles,
        Effect::Mosaic,
        Effect::Swirl,
        Effect::Dreamy,
    ];

    pub fn as_str(&self) -> &'static str {
        self.record().name
    }

    /// The table record for this effect.
    pub fn record(self) -> &'static EffectRecord {
        &EFFECTS[self as usize]
    }

    /// Pick a variant of this effect. Single-variant effects always return
    /// the same pair.
    pub fn animations<R: Rng + ?Sized>(self, rng: &mut R) -> Variant {
        let variants = self.record().variants;
        let pick = if variants.len() > 1 {
            rng.gen_range(0..variants.len())
        } else {
            0
        };
        variants[pick]
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEffect(pub String);

impl fmt::Display for UnknownEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transition effect `{}`", self.0)
    }
}

impl std::error::Error for UnknownEffect {}

/// The effect selected by the viewer: one concrete effect, or a fresh random
/// pick for every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectChoice {
    Fixed(Effect),
    Random,
}

impl EffectChoice {
    /// Lenient parse used for settings: unknown names fall back to fade.
    pub fn from_name(s: &str) -> Self {
        s.parse().unwrap_or_else(|e: UnknownEffect| {
            tracing::warn!("{}, using fade", e);
            EffectChoice::Fixed(Effect::Fade)
        })
    }

    /// Resolve to a concrete effect. `Random` draws uniformly from
    /// [`Effect::ALL`].
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Effect {
        match self {
            EffectChoice::Fixed(effect) => effect,
            EffectChoice::Random => Effect::ALL[rng.gen_range(0..Effect::ALL.len())],
        }
    }
}

impl Default for EffectChoice {
    fn default() -> Self {
        EffectChoice::Fixed(Effect::Fade)
    }
}

impl FromStr for EffectChoice {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted == "random" {
            return Ok(EffectChoice::Random);
        }
        EFFECTS
            .iter()
            .find(|r| r.name == wanted || r.aliases.contains(&wanted.as_str()))
            .map(|r| EffectChoice::Fixed(r.effect))
            .ok_or(UnknownEffect(s.to_string()))
    }
}

impl fmt::Display for EffectChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectChoice::Fixed(effect) => effect.fmt(f),
            EffectChoice::Random => f.write_str("random"),
        }
    }
}

/// Timing curve applied to each keyframe segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier(f32, f32, f32, f32),
    /// CSS `steps(n, end)`.
    Steps(u32),
}

impl Easing {
    pub const STANDARD: Easing = Easing::CubicBezier(0.4, 0.0, 0.2, 1.0);
    pub const BACK: Easing = Easing::CubicBezier(0.68, -0.55, 0.27, 1.55);
    pub const EASE_IN_OUT: Easing = Easing::CubicBezier(0.42, 0.0, 0.58, 1.0);
    pub const EASE_OUT: Easing = Easing::CubicBezier(0.0, 0.0, 0.58, 1.0);

    pub fn apply(self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,
            Easing::Steps(n) => {
                let n = n.max(1) as f32;
                (t * n).floor() / n
            }
            Easing::CubicBezier(x1, y1, x2, y2) => solve_bezier(t, x1, y1, x2, y2),
        }
    }
}

fn bezier_component(a1: f32, a2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * a1 + 3.0 * inv * s * s * a2 + s * s * s
}

fn bezier_slope(a1: f32, a2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * a1 + 6.0 * inv * s * (a2 - a1) + 3.0 * s * s * (1.0 - a2)
}

/// Find the curve parameter whose x equals `t`, then return its y.
fn solve_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    const EPSILON: f32 = 1e-5;

    let mut s = t;
    for _ in 0..8 {
        let err = bezier_component(x1, x2, s) - t;
        if err.abs() < EPSILON {
            return bezier_component(y1, y2, s);
        }
        let slope = bezier_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    // Newton did not converge; x(s) is monotonic for x1, x2 in [0, 1].
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = t;
    for _ in 0..32 {
        let x = bezier_component(x1, x2, s);
        if (x - t).abs() < EPSILON {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier_component(y1, y2, s)
}

/// Rotation axis for 3D-style effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Visual parameters of a surface at one instant.
///
/// Translations are fractions of the surface size. Clip values are the
/// fraction hidden from the top and from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub axis: Axis,
    pub rotate_deg: f32,
    pub depth_px: f32,
    pub skew_deg: f32,
    pub blur_px: f32,
    pub brightness: f32,
    pub hue_deg: f32,
    pub clip_top: f32,
    pub clip_bottom: f32,
    pub corner_radius: f32,
}

impl Pose {
    /// Neutral pose: fully opaque, untransformed, unfiltered.
    pub const IDENTITY: Pose = Pose {
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        axis: Axis::Z,
        rotate_deg: 0.0,
        depth_px: 0.0,
        skew_deg: 0.0,
        blur_px: 0.0,
        brightness: 1.0,
        hue_deg: 0.0,
        clip_top: 0.0,
        clip_bottom: 0.0,
        corner_radius: 0.0,
    };

    pub fn lerp(a: &Pose, b: &Pose, t: f32) -> Pose {
        let mix = |x: f32, y: f32| x + (y - x) * t;
        Pose {
            opacity: mix(a.opacity, b.opacity),
            translate_x: mix(a.translate_x, b.translate_x),
            translate_y: mix(a.translate_y, b.translate_y),
            scale_x: mix(a.scale_x, b.scale_x),
            scale_y: mix(a.scale_y, b.scale_y),
            axis: a.axis,
            rotate_deg: mix(a.rotate_deg, b.rotate_deg),
            depth_px: mix(a.depth_px, b.depth_px),
            skew_deg: mix(a.skew_deg, b.skew_deg),
            blur_px: mix(a.blur_px, b.blur_px),
            brightness: mix(a.brightness, b.brightness),
            hue_deg: mix(a.hue_deg, b.hue_deg),
            clip_top: mix(a.clip_top, b.clip_top),
            clip_bottom: mix(a.clip_bottom, b.clip_bottom),
            corner_radius: mix(a.corner_radius, b.corner_radius),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Position in the animation, `0.0..=1.0`.
    pub at: f32,
    pub pose: Pose,
}

/// A named keyframe animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub name: &'static str,
    pub keyframes: &'static [Keyframe],
    pub easing: Easing,
}

impl Animation {
    /// Pose at `progress` (clamped to `0.0..=1.0`).
    pub fn sample(&self, progress: f32) -> Pose {
        let Some(first) = self.keyframes.first() else {
            return Pose::IDENTITY;
        };
        let p = progress.clamp(0.0, 1.0);
        let idx = self.keyframes.partition_point(|k| k.at <= p);

        if idx == 0 {
            return first.pose;
        }
        if idx >= self.keyframes.len() {
            return self.keyframes[self.keyframes.len() - 1].pose;
        }

        let a = &self.keyframes[idx - 1];
        let b = &self.keyframes[idx];
        let span = b.at - a.at;
        if span <= f32::EPSILON {
            return b.pose;
        }
        let local = (p - a.at) / span;
        Pose::lerp(&a.pose, &b.pose, self.easing.apply(local))
    }

    /// The pose the animation settles on.
    pub fn final_pose(&self) -> Pose {
        self.keyframes.last().map(|k| k.pose).unwrap_or(Pose::IDENTITY)
    }
}

/// Enter/exit pair applied together during one transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variant {
    pub enter: Animation,
    pub exit: Animation,
}

pub struct EffectRecord {
    pub effect: Effect,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub variants: &'static [Variant],
}

const fn kf(at: f32, pose: Pose) -> Keyframe {
    Keyframe { at, pose }
}

const fn anim(name: &'static str, keyframes: &'static [Keyframe], easing: Easing) -> Animation {
    Animation {
        name,
        keyframes,
        easing,
    }
}

const ID: Pose = Pose::IDENTITY;

// fade
const FADE_IN_FROM: Pose = Pose {
    opacity: 0.0,
    brightness: 0.8,
    scale_x: 1.05,
    scale_y: 1.05,
    ..ID
};
const FADE_OUT_TO: Pose = Pose {
    opacity: 0.0,
    brightness: 1.2,
    scale_x: 0.95,
    scale_y: 0.95,
    ..ID
};
static FADE_IN: [Keyframe; 2] = [kf(0.0, FADE_IN_FROM), kf(1.0, ID)];
static FADE_OUT: [Keyframe; 2] = [kf(0.0, ID), kf(1.0, FADE_OUT_TO)];

// slide
const fn offset(x: f32, y: f32) -> Pose {
    Pose {
        opacity: 0.0,
        translate_x: x,
        translate_y: y,
        ..ID
    }
}
static SLIDE_IN_LEFT: [Keyframe; 2] = [kf(0.0, offset(-1.0, 0.0)), kf(1.0, ID)];
static SLIDE_IN_RIGHT: [Keyframe; 2] = [kf(0.0, offset(1.0, 0.0)), kf(1.0, ID)];
static SLIDE_IN_TOP: [Keyframe; 2] = [kf(0.0, offset(0.0, -1.0)), kf(1.0, ID)];
static SLIDE_IN_BOTTOM: [Keyframe; 2] = [kf(0.0, offset(0.0, 1.0)), kf(1.0, ID)];
static SLIDE_OUT_LEFT: [Keyframe; 2] = [kf(0.0, ID), kf(1.0, offset(-1.0, 0.0))];
static SLIDE_OUT_RIGHT: [Keyframe; 2] = [kf(0.0, ID), kf(1.0, offset(1.0, 0.0))];
static SLIDE_OUT_TOP: [Keyframe; 2] = [kf(0.0, ID), kf(1.0, offset(0.0, -1.0))];
static SLIDE_OUT_BOTTOM: [Keyframe; 2] = [kf(0.0, ID), kf(1.0, offset(0.0, 1.0))];

// zoom
static ZOOM_IN: [Keyframe; 2] = [
    kf(
        0.0,
        Pose {
            opacity: 0.0,
            scale_x: 0.5,
            scale_y: 0.5,
            rotate_deg: -5.0,
            blur_px: 10.0,
            ..ID
        },
    ),
    kf(1.0, ID),
];
static ZOOM_OUT: [Keyframe; 2] = [
    kf(0.0, ID),
    kf(
        1.0,
        Pose {
            opacity: 0.0,
            scale_x: 1.5,
            scale_y: 1.5,
            rotate_deg: 5.0,
            blur_px: 10.0,
            ..ID
        },
    ),
];

// rotate3d
const fn turned(axis: Axis, deg: f32) -> Pose {
    Pose {
        opacity: 0.0,
        axis,
        rotate_deg: deg,
        ..ID
    }
}
const fn upright(axis: Axis) -> Pose {
    Pose { axis, ..ID }
}
static ROTATE_IN_X: [Keyframe; 2] = [kf(0.0, turned(Axis::X, 90.0)), kf(1.0, upright(Axis::X))];
static ROTATE_IN_Y: [Keyframe; 2] = [kf(0.0, turned(Axis::Y, 90.0)), kf(1.0, upright(Axis::Y))];
static ROTATE_IN_Z: [Keyframe; 2] = [kf(0.0, turned(Axis::Z, 90.0)), kf(1.0, upright(Axis::Z))];
static ROTATE_OUT_X: [Keyframe; 2] = [kf(0.0, upright(Axis::X)), kf(1.0, turned(Axis::X, -90.0))];
static ROTATE_OUT_Y: [Keyframe; 2] = [kf(0.0, upright(Axis::Y)), kf(1.0, turned(Axis::Y, -90.0))];
static ROTATE_OUT_Z: [Keyframe; 2] = [kf(0.0, upright(Axis::Z)), kf(1.0, turned(Axis::Z, -90.0))];

// flip
static FLIP_IN: [Keyframe; 2] = [kf(0.0, turned(Axis::Y, -180.0)), kf(1.0, upright(Axis::Y))];
static FLIP_OUT: [Keyframe; 2] = [kf(0.0, upright(Axis::Y)), kf(1.0, turned(Axis::Y, 180.0))];

// cube
static CUBE_IN: [Keyframe; 2] = [
    kf(
        0.0,
        Pose {
            depth_px: 200.0,
            ..turned(Axis::Y, 90.0)
        },
    ),
    kf(1.0, upright(Axis::Y)),
];
static CUBE_OUT: [Keyframe; 2] = [
    kf(0.0, upright(Axis::Y)),
    kf(
        1.0,
        Pose {
            depth_px: 200.0,
            ..turned(Axis::Y, -90.0)
        },
    ),
];

// glitch
const fn jitter(opacity: f32, tx: f32, ty: f32, skew: f32, top: f32, bottom: f32) -> Pose {
    Pose {
        opacity,
        translate_x: tx,
        translate_y: ty,
        skew_deg: skew,
        clip_top: top,
        clip_bottom: bottom,
        ..ID
    }
}
static GLITCH_IN: [Keyframe; 6] = [
    kf(0.0, jitter(0.0, 0.001, 0.0, 0.0, 0.0, 0.0)),
    kf(0.1, jitter(0.2, -0.001, 0.0, 1.0, 0.2, 0.6)),
    kf(0.2, jitter(0.4, 0.0, -0.002, 0.0, 0.6, 0.2)),
    kf(0.3, jitter(0.6, 0.0, 0.002, -1.0, 0.1, 0.8)),
    kf(0.4, jitter(0.8, 0.0, 0.0, 0.0, 0.8, 0.1)),
    kf(0.5, ID),
];
static GLITCH_OUT: [Keyframe; 6] = [
    kf(0.0, ID),
    kf(0.1, jitter(0.8, 0.001, 0.0, 1.0, 0.2, 0.6)),
    kf(0.2, jitter(0.6, -0.001, 0.0, 0.0, 0.6, 0.2)),
    kf(0.3, jitter(0.4, 0.0, -0.002, -1.0, 0.1, 0.8)),
    kf(0.4, jitter(0.2, 0.0, 0.002, 0.0, 0.8, 0.1)),
    kf(0.5, jitter(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
];

// wave
const fn swell(opacity: f32, ty: f32, sy: f32, hue: f32) -> Pose {
    Pose {
        opacity,
        translate_y: ty,
        scale_y: sy,
        hue_deg: hue,
        ..ID
    }
}
static WAVE_IN: [Keyframe; 3] = [
    kf(0.0, swell(0.0, 1.0, 0.5, 0.0)),
    kf(0.5, swell(0.8, 0.0, 1.2, 180.0)),
    kf(1.0, swell(1.0, 0.0, 1.0, 360.0)),
];
static WAVE_OUT: [Keyframe; 3] = [
    kf(0.0, swell(1.0, 0.0, 1.0, 0.0)),
    kf(0.5, swell(0.5, -0.5, 0.8, 180.0)),
    kf(1.0, swell(0.0, -1.0, 0.5, 360.0)),
];

// particles
const fn scatter(opacity: f32, scale: f32, blur: f32) -> Pose {
    Pose {
        opacity,
        scale_x: scale,
        scale_y: scale,
        blur_px: blur,
        ..ID
    }
}
static PARTICLES_IN: [Keyframe; 3] = [
    kf(0.0, scatter(0.0, 0.3, 20.0)),
    kf(0.5, scatter(1.0, 1.1, 5.0)),
    kf(1.0, ID),
];
static PARTICLES_OUT: [Keyframe; 2] = [kf(0.0, ID), kf(1.0, scatter(0.0, 1.5, 20.0))];

// mosaic: the step easing turns the linear reveal into eight bands
const fn reveal(opacity: f32, top: f32, bottom: f32) -> Pose {
    Pose {
        opacity,
        clip_top: top,
        clip_bottom: bottom,
        ..ID
    }
}
static MOSAIC_IN: [Keyframe; 2] = [kf(0.0, reveal(0.0, 0.0, 1.0)), kf(1.0, ID)];
static MOSAIC_OUT: [Keyframe; 2] = [kf(0.0, ID), kf(1.0, reveal(0.0, 1.0, 0.0))];

// swirl
const fn spin(opacity: f32, deg: f32, scale: f32, radius: f32) -> Pose {
    Pose {
        opacity,
        rotate_deg: deg,
        scale_x: scale,
        scale_y: scale,
        corner_radius: radius,
        ..ID
    }
}
static SWIRL_IN: [Keyframe; 3] = [
    kf(0.0, spin(0.0, 720.0, 0.0, 0.5)),
    kf(0.6, spin(0.8, 180.0, 1.2, 0.3)),
    kf(1.0, ID),
];
static SWIRL_OUT: [Keyframe; 3] = [
    kf(0.0, ID),
    kf(0.4, spin(0.6, -180.0, 1.2, 0.3)),
    kf(1.0, spin(0.0, -720.0, 0.0, 0.5)),
];

// dreamy
const fn haze(opacity: f32, blur: f32, brightness: f32, scale: f32) -> Pose {
    Pose {
        opacity,
        blur_px: blur,
        brightness,
        scale_x: scale,
        scale_y: scale,
        ..ID
    }
}
static DREAMY_IN: [Keyframe; 3] = [
    kf(0.0, haze(0.0, 20.0, 2.0, 1.1)),
    kf(0.5, haze(0.5, 10.0, 1.5, 1.05)),
    kf(1.0, ID),
];
static DREAMY_OUT: [Keyframe; 3] = [
    kf(0.0, ID),
    kf(0.5, haze(0.5, 10.0, 1.5, 0.95)),
    kf(1.0, haze(0.0, 20.0, 2.0, 0.9)),
];

const fn pair(enter: Animation, exit: Animation) -> Variant {
    Variant { enter, exit }
}

static FADE_VARIANTS: [Variant; 1] = [pair(
    anim("fade-in", &FADE_IN, Easing::STANDARD),
    anim("fade-out", &FADE_OUT, Easing::STANDARD),
)];
static SLIDE_VARIANTS: [Variant; 4] = [
    pair(
        anim("slide-in-left", &SLIDE_IN_LEFT, Easing::STANDARD),
        anim("slide-out-left", &SLIDE_OUT_LEFT, Easing::STANDARD),
    ),
    pair(
        anim("slide-in-right", &SLIDE_IN_RIGHT, Easing::STANDARD),
        anim("slide-out-right", &SLIDE_OUT_RIGHT, Easing::STANDARD),
    ),
    pair(
        anim("slide-in-top", &SLIDE_IN_TOP, Easing::STANDARD),
        anim("slide-out-top", &SLIDE_OUT_TOP, Easing::STANDARD),
    ),
    pair(
        anim("slide-in-bottom", &SLIDE_IN_BOTTOM, Easing::STANDARD),
        anim("slide-out-bottom", &SLIDE_OUT_BOTTOM, Easing::STANDARD),
    ),
];
static ZOOM_VARIANTS: [Variant; 1] = [pair(
    anim("zoom-in", &ZOOM_IN, Easing::BACK),
    anim("zoom-out", &ZOOM_OUT, Easing::BACK),
)];
static ROTATE_VARIANTS: [Variant; 3] = [
    pair(
        anim("rotate3d-in-x", &ROTATE_IN_X, Easing::STANDARD),
        anim("rotate3d-out-x", &ROTATE_OUT_X, Easing::STANDARD),
    ),
    pair(
        anim("rotate3d-in-y", &ROTATE_IN_Y, Easing::STANDARD),
        anim("rotate3d-out-y", &ROTATE_OUT_Y, Easing::STANDARD),
    ),
    pair(
        anim("rotate3d-in-z", &ROTATE_IN_Z, Easing::STANDARD),
        anim("rotate3d-out-z", &ROTATE_OUT_Z, Easing::STANDARD),
    ),
];
static FLIP_VARIANTS: [Variant; 1] = [pair(
    anim("flip-in", &FLIP_IN, Easing::STANDARD),
    anim("flip-out", &FLIP_OUT, Easing::STANDARD),
)];
static CUBE_VARIANTS: [Variant; 1] = [pair(
    anim("cube-in", &CUBE_IN, Easing::STANDARD),
    anim("cube-out", &CUBE_OUT, Easing::STANDARD),
)];
static GLITCH_VARIANTS: [Variant; 1] = [pair(
    anim("glitch-in", &GLITCH_IN, Easing::Steps(2)),
    anim("glitch-out", &GLITCH_OUT, Easing::Steps(2)),
)];
static WAVE_VARIANTS: [Variant; 1] = [pair(
    anim("wave-in", &WAVE_IN, Easing::EASE_IN_OUT),
    anim("wave-out", &WAVE_OUT, Easing::EASE_IN_OUT),
)];
static PARTICLES_VARIANTS: [Variant; 1] = [pair(
    anim("particles-in", &PARTICLES_IN, Easing::STANDARD),
    anim("particles-out", &PARTICLES_OUT, Easing::STANDARD),
)];
static MOSAIC_VARIANTS: [Variant; 1] = [pair(
    anim("mosaic-in", &MOSAIC_IN, Easing::Steps(8)),
    anim("mosaic-out", &MOSAIC_OUT, Easing::Steps(8)),
)];
static SWIRL_VARIANTS: [Variant; 1] = [pair(
    anim("swirl-in", &SWIRL_IN, Easing::STANDARD),
    anim("swirl-out", &SWIRL_OUT, Easing::STANDARD),
)];
static DREAMY_VARIANTS: [Variant; 1] = [pair(
    anim("dreamy-in", &DREAMY_IN, Easing::EASE_OUT),
    anim("dreamy-out", &DREAMY_OUT, Easing::EASE_OUT),
)];

/// Indexed by `Effect as usize`.
static EFFECTS: [EffectRecord; 12] = [
    EffectRecord {
        effect: Effect::Fade,
        name: "fade",
        aliases: &[],
        variants: &FADE_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Slide,
        name: "slide",
        aliases: &[],
        variants: &SLIDE_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Zoom,
        name: "zoom",
        aliases: &[],
        variants: &ZOOM_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Rotate3d,
        name: "rotate3d",
        aliases: &["rotate-3d", "3d-rotate"],
        variants: &ROTATE_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Flip,
        name: "flip",
        aliases: &[],
        variants: &FLIP_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Cube,
        name: "cube",
        aliases: &[],
        variants: &CUBE_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Glitch,
        name: "glitch",
        aliases: &[],
        variants: &GLITCH_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Wave,
        name: "wave",
        aliases: &[],
        variants: &WAVE_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Particles,
        name: "particles",
        aliases: &["particle-dissolve"],
        variants: &PARTICLES_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Mosaic,
        name: "mosaic",
        aliases: &[],
        variants: &MOSAIC_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Swirl,
        name: "swirl",
        aliases: &[],
        variants: &SWIRL_VARIANTS,
    },
    EffectRecord {
        effect: Effect::Dreamy,
        name: "dreamy",
        aliases: &["soft-blur"],
        variants: &DREAMY_VARIANTS,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn table_matches_enum_order() {
        for (i, effect) in Effect::ALL.iter().enumerate() {
            assert_eq!(EFFECTS[i].effect, *effect);
            assert!(!EFFECTS[i].variants.is_empty());
        }
    }

    #[test]
    fn every_variant_settles_enter_on_identity_and_exit_invisible() {
        for effect in Effect::ALL {
            for variant in effect.record().variants {
                let settled = variant.enter.final_pose();
                assert_eq!(settled.opacity, 1.0, "{}", variant.enter.name);
                assert_eq!(settled.scale_x, 1.0, "{}", variant.enter.name);
                assert_eq!(settled.rotate_deg, 0.0, "{}", variant.enter.name);
                assert_eq!(variant.exit.final_pose().opacity, 0.0, "{}", variant.exit.name);
                assert_eq!(variant.exit.sample(0.0).opacity, 1.0, "{}", variant.exit.name);
            }
        }
    }

    #[test]
    fn names_parse_back() {
        for effect in Effect::ALL {
            assert_eq!(
                effect.as_str().parse::<EffectChoice>(),
                Ok(EffectChoice::Fixed(effect))
            );
        }
        assert_eq!("Random".parse::<EffectChoice>(), Ok(EffectChoice::Random));
        assert_eq!(
            "soft-blur".parse::<EffectChoice>(),
            Ok(EffectChoice::Fixed(Effect::Dreamy))
        );
        assert!("sparkle".parse::<EffectChoice>().is_err());
        assert_eq!(
            EffectChoice::from_name("sparkle"),
            EffectChoice::Fixed(Effect::Fade)
        );
    }

    #[test]
    fn random_choice_covers_the_concrete_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<Effect> = (0..2000)
            .map(|_| EffectChoice::Random.resolve(&mut rng))
            .collect();
        assert_eq!(seen.len(), Effect::ALL.len());
    }

    #[test]
    fn slide_picks_every_direction() {
        let mut rng = StdRng::seed_from_u64(3);
        let names: HashSet<&str> = (0..400)
            .map(|_| Effect::Slide.animations(&mut rng).enter.name)
            .collect();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn easing_endpoints_are_stable() {
        for easing in [
            Easing::Linear,
            Easing::STANDARD,
            Easing::BACK,
            Easing::EASE_IN_OUT,
            Easing::EASE_OUT,
            Easing::Steps(8),
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }

    #[test]
    fn bezier_is_monotonic_for_standard_curve() {
        let samples: Vec<f32> = (1..10).map(|i| Easing::STANDARD.apply(i as f32 / 10.0)).collect();
        assert!(samples.windows(2).all(|w| w[0] < w[1]));
        // symmetric ease-in-out passes through the midpoint
        assert!((Easing::EASE_IN_OUT.apply(0.5) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn back_curve_overshoots() {
        let min = (1..100)
            .map(|i| Easing::BACK.apply(i as f32 / 100.0))
            .fold(f32::MAX, f32::min);
        assert!(min < 0.0);
    }

    #[test]
    fn steps_quantize() {
        assert_eq!(Easing::Steps(2).apply(0.49), 0.0);
        assert_eq!(Easing::Steps(2).apply(0.5), 0.5);
        assert_eq!(Easing::Steps(8).apply(0.3), 0.25);
    }

    #[test]
    fn sampling_interpolates_between_keyframes() {
        let wave = Effect::Wave.animations(&mut StdRng::seed_from_u64(0)).enter;
        assert_eq!(wave.sample(0.0).opacity, 0.0);
        assert_eq!(wave.sample(0.5).opacity, 0.8);
        let quarter = wave.sample(0.25);
        assert!(quarter.opacity > 0.0 && quarter.opacity < 0.8);
        assert_eq!(wave.sample(2.0), wave.final_pose());
    }
}
