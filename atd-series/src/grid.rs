use atd_utils::dates::floor_to_step;
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone};
use std::mem::replace;

/// A grid iterator that yields each bucket start from `start` through
/// `end` (inclusive) in steps of `step`.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct GridRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub step: TimeDelta,
}

impl GridRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, step: TimeDelta) -> Self {
        GridRange { start, end, step }
    }
}

impl Iterator for GridRange {
    type Item = NaiveDateTime;
    fn next(&mut self) -> Option<Self::Item> {
        if self.start <= self.end && self.step > TimeDelta::zero() {
            let next = self.start + self.step;
            Some(replace(&mut self.start, next))
        } else {
            None
        }
    }
}

/// The forecast reference time: `now` seen in `tz`, floored to the grid.
///
/// The time zone is passed in explicitly so bucketing never depends on
/// the process environment.
pub fn reference_time<From: TimeZone, Tz: TimeZone>(
    now: &DateTime<From>,
    tz: &Tz,
    step_minutes: u32,
) -> NaiveDateTime {
    let local = now.with_timezone(tz).naive_local();
    floor_to_step(local, step_minutes)
}
