use super::*;
use crate::config::TimelineSettings;
use crate::library::{Album, SelectionList, Track, add_selection};

fn goal(length: f64, minutes: f64) -> TimelineConfig {
    TimelineConfig {
        unit: Unit::Mi,
        goal_length: length,
        goal_time_minutes: minutes,
        scale: 50.0,
    }
}

fn track(duration_ms: u64) -> Track {
    Track {
        id: format!("t{duration_ms}"),
        name: "Song".into(),
        artists: Vec::new(),
        album: Album::default(),
        duration_ms,
        uri: format!("spotify:track:t{duration_ms}"),
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn segment_count_is_ceil_of_length_and_distances_sum_to_length() {
    let settings = TimelineSettings::default();
    for &length in &[0.3, 1.0, 5.0, 5.5, 13.1, 26.2, 42.195, 100.0] {
        let segments = compute_segments(&goal(length, 60.0), &settings);
        assert_eq!(segments.len(), length.ceil() as usize, "length {length}");

        let covered: f64 = segments.iter().map(|s| s.distance_covered).sum();
        assert!(approx(covered, length), "length {length} covered {covered}");
    }
}

#[test]
fn final_segment_finishes_exactly_at_goal_time() {
    let settings = TimelineSettings::default();
    for &(length, minutes) in &[(13.1, 120.0), (3.0, 17.3), (42.195, 213.7), (0.7, 4.1)] {
        let segments = compute_segments(&goal(length, minutes), &settings);
        let last = segments.last().unwrap();
        assert!(last.is_final);
        assert_eq!(last.cumulative_time_minutes, minutes);
        assert!(segments[..segments.len() - 1].iter().all(|s| !s.is_final));
    }
}

#[test]
fn half_marathon_has_fourteen_segments_with_a_short_tail() {
    let settings = TimelineSettings::default();
    let config = goal(13.1, 120.0);
    let segments = compute_segments(&config, &settings);

    assert_eq!(segments.len(), 14);
    assert!(approx(config.minutes_per_unit(), 9.160305343511450));
    assert_eq!(format_pace(config.minutes_per_unit()), "00:09:09");

    let last = &segments[13];
    assert!(approx(last.distance_covered, 0.1));
    assert_eq!(last.cumulative_time_minutes, 120.0);
    assert_eq!(last.label, "13.1 mi");

    let third = &segments[2];
    assert_eq!(third.label, "3 mi");
    assert!(approx(third.cumulative_time_minutes, 3.0 * 120.0 / 13.1));
    assert!(approx(third.distance_covered, 1.0));
}

#[test]
fn whole_number_goal_ends_with_a_full_segment() {
    let settings = TimelineSettings::default();
    let segments = compute_segments(&goal(5.0, 25.0), &settings);
    assert_eq!(segments.len(), 5);
    assert_eq!(segments[4].distance_covered, 1.0);
    assert_eq!(segments[4].label, "5 mi");
}

#[test]
fn pixel_height_scales_with_pace_scale_and_distance() {
    let settings = TimelineSettings::default();
    let mut config = goal(13.1, 120.0);
    config.unit = Unit::Km;

    // default scale: 50 px per minute
    assert!(approx(config.pixels_per_minute(&settings), 50.0));
    let segments = compute_segments(&config, &settings);
    assert!(approx(segments[0].pixel_height, 120.0 / 13.1 * 50.0));
    assert!(approx(segments[13].pixel_height, 120.0 / 13.1 * 50.0 * 0.1));
    assert_eq!(segments[0].label, "1 km");

    // timeline height equals goal minutes at the current rate
    assert!(approx(total_height(&segments), 120.0 * 50.0));

    config.scale = 25.0;
    assert!(approx(config.pixels_per_minute(&settings), 25.0));
    let halved = compute_segments(&config, &settings);
    assert!(approx(total_height(&halved), 120.0 * 25.0));
}

#[test]
fn degenerate_goals_are_rejected_and_produce_no_segments() {
    let settings = TimelineSettings::default();
    for config in [
        goal(0.0, 120.0),
        goal(-3.0, 120.0),
        goal(10.0, 0.0),
        goal(f64::NAN, 10.0),
        goal(10.0, f64::INFINITY),
    ] {
        assert!(matches!(
            config.validate(),
            Err(TimelineError::DegenerateInput { .. })
        ));
        assert_eq!(config.segment_count(), 0);
        assert!(compute_segments(&config, &settings).is_empty());
    }
    assert!(goal(0.1, 0.5).validate().is_ok());
}

#[test]
fn oversized_goals_are_rejected_and_produce_no_segments() {
    let settings = TimelineSettings::default();
    for config in [
        goal(1e15, 120.0),
        goal(MAX_GOAL_LENGTH + 0.1, 120.0),
        goal(13.1, 1e12),
    ] {
        assert!(matches!(
            config.validate(),
            Err(TimelineError::OutOfRange { .. })
        ));
        assert_eq!(config.segment_count(), 0);
        assert!(compute_segments(&config, &settings).is_empty());
    }

    let longest = goal(MAX_GOAL_LENGTH, MAX_GOAL_TIME_MINUTES);
    assert!(longest.validate().is_ok());
    assert_eq!(compute_segments(&longest, &settings).len(), 1000);
}

#[test]
fn unit_toggles_and_labels() {
    assert_eq!(Unit::default(), Unit::Mi);
    assert_eq!(Unit::Mi.toggle(), Unit::Km);
    assert_eq!(Unit::Km.toggle(), Unit::Mi);
    assert_eq!(Unit::Km.label(), "km");
    assert_eq!(serde_json::to_string(&Unit::Mi).unwrap(), "\"mi\"");
}

#[test]
fn projected_heights_match_duration_at_rate() {
    let heights: Vec<f64> = [200_000, 215_000, 198_000]
        .iter()
        .map(|&ms| projected_height(&track(ms), 50.0))
        .collect();

    assert!((heights[0] - 166.67).abs() < 0.01);
    assert!((heights[1] - 179.17).abs() < 0.01);
    assert!((heights[2] - 165.0).abs() < 0.01);
}

#[test]
fn project_selection_stacks_tracks_back_to_back() {
    let list = [200_000, 215_000, 198_000]
        .iter()
        .fold(SelectionList::new(), |l, &ms| add_selection(&l, track(ms)));

    let projections = project_selection(&list, 50.0);
    assert_eq!(projections.len(), 3);
    assert_eq!(projections[0].start_px, 0.0);
    assert!(approx(projections[1].start_px, projections[0].end_px));
    assert!(approx(projections[2].end_px, stack_height(&list, 50.0)));
    assert!(approx(projections[2].end_minutes, 613.0 / 60.0));
    for (p, s) in projections.iter().zip(list.iter()) {
        assert_eq!(p.selection_id, s.selection_id);
    }

    let delta = alignment_delta(stack_height(&list, 50.0), 50.0 * 10.0);
    assert!(approx(delta, 50.0 * (613.0 / 60.0 - 10.0)));
}

#[test]
fn empty_selection_projects_to_nothing() {
    let list = SelectionList::new();
    assert!(project_selection(&list, 50.0).is_empty());
    assert_eq!(stack_height(&list, 50.0), 0.0);
}

#[test]
fn format_pace_renders_clock_strings() {
    assert_eq!(format_pace(120.0), "02:00:00");
    assert_eq!(format_pace(9.5), "00:09:30");
    assert_eq!(format_pace(0.5), "00:00:30");
    assert_eq!(format_pace(61.0 + 1.0 / 60.0), "01:01:01");
    // the fractional second is dropped, not rounded
    assert_eq!(format_pace(549.9 / 60.0), "00:09:09");
}

#[test]
fn format_pace_tolerates_float_drift() {
    // 3 * (0.1 minutes) is 17.999999999999996 seconds in f64
    assert_eq!(format_pace(3.0 * 0.1), "00:00:18");
}

#[test]
fn format_pace_wraps_like_a_time_of_day() {
    assert_eq!(format_pace(24.0 * 60.0 + 5.0), "00:05:00");
    assert_eq!(format_pace(-1.0 / 60.0), "23:59:59");
    assert_eq!(format_pace(f64::NAN), "--:--:--");
}
