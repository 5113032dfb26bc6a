//! Time-driven interpolation shared by every animated channel.
//!
//! An [`AnimationSlot`] is one channel: it holds at most one task, and
//! starting a new task replaces whatever was running. Consumers call
//! [`AnimationSlot::advance`] once per tick while it yields values and stop
//! once a step reports `finished`.

use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    CubicInOut,
    CubicOut,
}

impl Easing {
    /// Maps a clamped time fraction onto eased progress. Every curve fixes
    /// 0 and 1 and is monotonic in between.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = -2.0 * t + 2.0;
                    1.0 - f * f * f / 2.0
                }
            }
            Easing::CubicOut => {
                let f = 1.0 - t;
                1.0 - f * f * f
            }
        }
    }
}

pub trait Interpolate: Copy {
    fn interpolate(from: Self, to: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Interpolate for Vec3 {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.lerp(to, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.slerp(to, t).normalize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationStep<T> {
    pub task: TaskId,
    pub value: T,
    pub finished: bool,
}

#[derive(Debug, Clone)]
struct AnimationTask<T> {
    id: TaskId,
    start_time: f64,
    duration: f64,
    from: T,
    to: T,
    easing: Easing,
    done: bool,
}

impl<T: Interpolate> AnimationTask<T> {
    fn fraction(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0) as f32
    }
}

#[derive(Debug, Clone)]
pub struct AnimationSlot<T> {
    task: Option<AnimationTask<T>>,
    next_id: u64,
}

impl<T> Default for AnimationSlot<T> {
    fn default() -> Self {
        Self {
            task: None,
            next_id: 0,
        }
    }
}

impl<T: Interpolate> AnimationSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a task, superseding any task already on this channel.
    pub fn start(&mut self, from: T, to: T, duration: f64, easing: Easing, now: f64) -> TaskId {
        if let Some(previous) = self.task.as_mut().filter(|task| !task.done) {
            previous.done = true;
            log::debug!("animation task {:?} superseded", previous.id);
        }
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.task = Some(AnimationTask {
            id,
            start_time: now,
            duration: duration.max(0.0),
            from,
            to,
            easing,
            done: false,
        });
        id
    }

    /// Value of the current task at `now`; `None` once it has finished or
    /// when nothing was started. The finishing step carries the exact end
    /// value.
    pub fn advance(&mut self, now: f64) -> Option<AnimationStep<T>> {
        let task = self.task.as_mut().filter(|task| !task.done)?;
        let fraction = task.fraction(now);
        if fraction >= 1.0 {
            task.done = true;
            return Some(AnimationStep {
                task: task.id,
                value: task.to,
                finished: true,
            });
        }
        let eased = task.easing.apply(fraction);
        Some(AnimationStep {
            task: task.id,
            value: T::interpolate(task.from, task.to, eased),
            finished: false,
        })
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.done)
    }

    pub fn active_task(&self) -> Option<TaskId> {
        self.task
            .as_ref()
            .filter(|task| !task.done)
            .map(|task| task.id)
    }

    /// Target of the running task.
    pub fn end_value(&self) -> Option<T> {
        self.task
            .as_ref()
            .filter(|task| !task.done)
            .map(|task| task.to)
    }
}
