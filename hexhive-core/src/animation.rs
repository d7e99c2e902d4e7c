//! Eased keyframe tracks for entity motion
//!
//! A [`Track`] runs a sequence of [`Segment`]s against a value it does not
//! own; callers pass the target into [`Track::update`] each frame. Segments
//! can capture their start value lazily, carry a delay, and interpolate
//! either toward an absolute target or by a relative offset. All durations
//! are in milliseconds.

use crate::metrics::Point;

// Easing formulas from https://easings.net/

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;

/// Interpolation curve applied to a segment's progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubeIn,
    CubeOut,
    CubeInOut,
    SineIn,
    SineOut,
    SineInOut,
    BackIn,
    BackOut,
    BackInOut,
}

impl Easing {
    /// Map linear progress in `0..=1` onto the curve
    ///
    /// The `Back` curves overshoot their endpoints on purpose.
    pub fn ease(self, time: f32) -> f32 {
        let t = time;
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - t * 2.0) * t
                }
            }
            Easing::CubeIn => t * t * t,
            Easing::CubeOut => {
                let f = t - 1.0;
                f * f * f + 1.0
            }
            Easing::CubeInOut => {
                if t < 0.5 {
                    t * t * t * 4.0
                } else {
                    let f = t * 2.0 - 2.0;
                    f * f * f / 2.0 + 1.0
                }
            }
            Easing::SineIn => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
            Easing::SineOut => (t * std::f32::consts::FRAC_PI_2).sin(),
            Easing::SineInOut => -((t * std::f32::consts::PI).cos() - 1.0) / 2.0,
            Easing::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::BackOut => {
                let f = t - 1.0;
                1.0 + BACK_C3 * f * f * f + BACK_C1 * f * f
            }
            Easing::BackInOut => {
                if t < 0.5 {
                    let f = t * 2.0;
                    f * f * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2) / 2.0
                } else {
                    let f = t * 2.0 - 2.0;
                    (f * f * ((BACK_C2 + 1.0) * f + BACK_C2) + 2.0) / 2.0
                }
            }
        }
    }
}

/// Value a [`Track`] can drive
pub trait Lerp: Copy {
    /// `self + t * (other - self)`; `t` may leave `0..=1`
    fn lerp(self, other: Self, t: f32) -> Self;

    /// `self + t * delta`
    fn offset(self, delta: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, other: Self, t: f32) -> Self {
        self + t * (other - self)
    }

    fn offset(self, delta: Self, t: f32) -> Self {
        self + t * delta
    }
}

impl Lerp for Point {
    fn lerp(self, other: Self, t: f32) -> Self {
        Point {
            x: self.x.lerp(other.x, t),
            y: self.y.lerp(other.y, t),
        }
    }

    fn offset(self, delta: Self, t: f32) -> Self {
        Point {
            x: self.x.offset(delta.x, t),
            y: self.y.offset(delta.y, t),
        }
    }
}

// ============================================================================
// SEGMENTS
// ============================================================================

/// One eased leg of a track
#[derive(Clone, Copy, Debug)]
pub struct Segment<T: Lerp> {
    from: T,
    to: T,
    easing: Easing,
    duration: f32,
    delay: f32,
    lazy_start: bool,
    relative: bool,
    elapsed: f32,
    started: bool,
}

impl<T: Lerp> Segment<T> {
    /// Segment with explicit endpoints
    pub fn new(from: T, to: T, easing: Easing, duration: f32) -> Self {
        Self {
            from,
            to,
            easing,
            duration,
            delay: 0.0,
            lazy_start: false,
            relative: false,
            elapsed: 0.0,
            started: false,
        }
    }

    /// Segment that captures its start value from the target when it begins
    pub fn lazy(to: T, easing: Easing, duration: f32) -> Self
    where
        T: Default,
    {
        Self {
            lazy_start: true,
            ..Self::new(T::default(), to, easing, duration)
        }
    }

    /// Hold for `delay` milliseconds before interpolating
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Treat `to` as an offset from the start value instead of a target
    pub fn relative(mut self) -> Self {
        self.relative = true;
        self
    }

    fn value_at(&self, t: f32) -> T {
        if self.relative {
            self.from.offset(self.to, t)
        } else {
            self.from.lerp(self.to, t)
        }
    }
}

// ============================================================================
// TRACKS
// ============================================================================

/// Sequence of segments driven against an external value
///
/// `is_active` is the gate the simulation checks before accepting input: a
/// track is active from [`Track::start`] until its last segment completes.
#[derive(Clone, Debug)]
pub struct Track<T: Lerp> {
    segments: Vec<Segment<T>>,
    current: Option<usize>,
    active: bool,
}

impl<T: Lerp> Track<T> {
    pub fn new(segments: Vec<Segment<T>>) -> Self {
        Self {
            segments,
            current: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin playing from the first segment; a no-op while already playing
    pub fn start(&mut self) {
        self.active = true;

        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    /// Abandon any progress and begin again from the first segment
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Return to idle without touching the target value
    pub fn reset(&mut self) {
        self.active = false;
        self.current = None;

        for segment in &mut self.segments {
            segment.elapsed = 0.0;
            segment.started = false;
        }
    }

    /// Replace the end value of a segment; the next start picks it up
    pub fn set_target(&mut self, index: usize, to: T) {
        if let Some(segment) = self.segments.get_mut(index) {
            segment.to = to;
        } else {
            tracing::warn!(index, "no such segment to retarget");
        }
    }

    /// Replace the start value of a segment (in-flight segments included)
    pub fn set_from(&mut self, index: usize, from: T) {
        if let Some(segment) = self.segments.get_mut(index) {
            segment.from = from;
        } else {
            tracing::warn!(index, "no such segment to rebase");
        }
    }

    /// Change the curve of a segment
    pub fn set_easing(&mut self, index: usize, easing: Easing) {
        if let Some(segment) = self.segments.get_mut(index) {
            segment.easing = easing;
        } else {
            tracing::warn!(index, "no such segment to re-ease");
        }
    }

    /// Advance by `delta_time` milliseconds, writing through `target`
    ///
    /// Leftover time past a segment's end carries into the next segment, so
    /// one large step settles the whole track.
    pub fn update(&mut self, target: &mut T, delta_time: f32) {
        if !self.active {
            return;
        }

        let mut remaining = delta_time;

        while let Some(index) = self.current {
            let segment = &mut self.segments[index];

            if !segment.started {
                if segment.lazy_start {
                    segment.from = *target;
                }
                segment.started = true;
            }

            segment.elapsed += remaining;
            remaining = 0.0;

            let past_delay = segment.elapsed - segment.delay;
            if past_delay <= 0.0 {
                return;
            }

            if past_delay < segment.duration {
                let progress = segment.easing.ease(past_delay / segment.duration);
                *target = segment.value_at(progress);
                return;
            }

            *target = segment.value_at(1.0);
            remaining = past_delay - segment.duration;

            if index + 1 < self.segments.len() {
                self.current = Some(index + 1);
            } else {
                self.reset();
                return;
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
