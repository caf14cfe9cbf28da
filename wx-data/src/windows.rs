//! Contiguous-window detection over a per-point predicate.

use crate::interpolation::HourlyPoint;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Inclusive index range `[start, end]` into a point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

/// A maximal run of points with `rain_amount > 0`.
pub type RainWindow = Window;

impl Window {
    /// Number of points covered, at least 1.
    pub fn point_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Exact instants bounding a window, taken from the first and last point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Maximal runs of consecutive items matching `predicate`, left to right.
///
/// A run still open at the end of the slice closes on the last index.
pub fn contiguous_regions<T, F>(items: &[T], predicate: F) -> Vec<Window>
where
    F: Fn(&T) -> bool,
{
    let mut windows = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, item) in items.iter().enumerate() {
        match (predicate(item), run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                windows.push(Window { start, end: i - 1 });
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        windows.push(Window {
            start,
            end: items.len() - 1,
        });
    }
    windows
}

/// Points with a strictly positive rain amount; exactly 0 is dry.
pub fn is_raining(point: &HourlyPoint) -> bool {
    point.rain_amount > 0.0
}

pub fn rain_windows(points: &[HourlyPoint]) -> Vec<RainWindow> {
    contiguous_regions(points, is_raining)
}

/// Runs of points at or above `threshold` degrees.
pub fn heat_windows(points: &[HourlyPoint], threshold: i64) -> Vec<Window> {
    contiguous_regions(points, |p| p.temp >= threshold)
}

/// Start and end instants of each window. Windows that do not fit inside
/// `points` are skipped.
pub fn window_spans(points: &[HourlyPoint], windows: &[Window]) -> Vec<WindowSpan> {
    windows
        .iter()
        .filter_map(|w| {
            let start = points.get(w.start)?;
            let end = points.get(w.end)?;
            Some(WindowSpan {
                start: start.time_full,
                end: end.time_full,
            })
        })
        .collect()
}
