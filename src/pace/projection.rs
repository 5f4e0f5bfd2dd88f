use uuid::Uuid;

use crate::library::{SelectionList, Track};

/// Height a track occupies when drawn at `pixels_per_minute`.
///
/// The same rate is used for the pace timeline, so a well-paced selection
/// stacks up to roughly the timeline's total height.
pub fn projected_height(track: &Track, pixels_per_minute: f64) -> f64 {
    pixels_per_minute * (track.duration_ms as f64 / 1000.0 / 60.0)
}

/// Where one selected track lands on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub selection_id: Uuid,
    pub height: f64,
    pub start_px: f64,
    pub end_px: f64,
    pub start_minutes: f64,
    pub end_minutes: f64,
}

/// Lay the selection out back to back, in list order.
pub fn project_selection(list: &SelectionList, pixels_per_minute: f64) -> Vec<Projection> {
    let mut offset_px = 0.0;
    let mut offset_minutes = 0.0;

    list.iter()
        .map(|selected| {
            let height = projected_height(&selected.track, pixels_per_minute);
            let minutes = selected.track.duration_ms as f64 / 60_000.0;
            let projection = Projection {
                selection_id: selected.selection_id,
                height,
                start_px: offset_px,
                end_px: offset_px + height,
                start_minutes: offset_minutes,
                end_minutes: offset_minutes + minutes,
            };
            offset_px += height;
            offset_minutes += minutes;
            projection
        })
        .collect()
}

pub fn stack_height(list: &SelectionList, pixels_per_minute: f64) -> f64 {
    list.iter()
        .map(|s| projected_height(&s.track, pixels_per_minute))
        .sum()
}

/// Positive when the music outlasts the run, negative when it falls short.
pub fn alignment_delta(stack_height: f64, timeline_height: f64) -> f64 {
    stack_height - timeline_height
}
