use std::time::Duration;

use crate::ease::Ease;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RepeatMode {
    /// Jump back to the start of the cycle.
    Restart,
    /// Alternate direction every cycle.
    Mirror,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    pub value: f64,
    /// True exactly once, on the tick where a run-once animator reaches its
    /// end. Looping animators never finish on their own.
    pub just_finished: bool,
}

/// Cooperatively-scheduled progress source.
///
/// The host's frame driver supplies a monotonic `now`; the animator has no
/// clock of its own. The first tick pins the start time, every later tick
/// emits the eased value for the elapsed fraction. Eased output is used
/// as-is, so overshoot curves may leave [0,1].
#[derive(Clone, Debug)]
pub struct ProgressAnimator {
    from: f64,
    to: f64,
    duration: Duration,
    ease: Ease,
    repeat: Option<RepeatMode>,
    started_at: Option<Duration>,
    value: f64,
    finished: bool,
}

impl ProgressAnimator {
    pub fn new(from: f64, to: f64, duration: Duration, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            ease,
            repeat: None,
            started_at: None,
            value: from,
            finished: false,
        }
    }

    /// Infinite 0→1 animator with the given repeat behavior.
    pub fn looping(duration: Duration, ease: Ease, repeat: RepeatMode) -> Self {
        Self {
            repeat: Some(repeat),
            ..Self::new(0.0, 1.0, duration, ease)
        }
    }

    /// Last emitted value (the `from` value before the first tick).
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_looping(&self) -> bool {
        self.repeat.is_some()
    }

    /// True when the animator runs toward a smaller value (a reverse leg).
    pub fn is_reversing(&self) -> bool {
        self.to < self.from
    }

    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        if self.finished {
            return TickOutcome {
                value: self.value,
                just_finished: false,
            };
        }

        let started_at = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_sub(started_at);

        let (fraction, done) = match self.repeat {
            Some(mode) => (loop_fraction(elapsed, self.duration, mode), false),
            None => {
                if self.duration.is_zero() {
                    (1.0, true)
                } else {
                    let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
                    (t.min(1.0), t >= 1.0)
                }
            }
        };

        self.value = self.from + (self.to - self.from) * self.ease.apply(fraction);
        self.finished = done;
        TickOutcome {
            value: self.value,
            just_finished: done,
        }
    }
}

fn loop_fraction(elapsed: Duration, duration: Duration, mode: RepeatMode) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    let t = elapsed.as_secs_f64() / duration.as_secs_f64();
    let cycle = t.floor();
    let frac = t - cycle;
    match mode {
        RepeatMode::Restart => frac,
        RepeatMode::Mirror => {
            if (cycle as u64) % 2 == 0 {
                frac
            } else {
                1.0 - frac
            }
        }
    }
}
