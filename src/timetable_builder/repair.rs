//! Repairs trips whose stop-time sequence is non-monotonic — notably
//! Trenitalia's rolling-stock-rotation trips, where an outbound leg and the
//! next day's return leg are encoded as one trip and the clock appears to
//! jump backward by hours partway through.

use raptor_core::model::StopTime;
use raptor_core::time::Duration;

/// A backward jump bigger than this within one trip is treated as a
/// segment boundary, not ordinary schedule slack.
const BACKWARD_JUMP_THRESHOLD_SECS: i32 = 10 * 60;

/// Sort by feed sequence number, split at backward jumps bigger than the
/// threshold, re-concatenate segments whose boundaries are consistent,
/// keep only the longest segment if several remain irreconcilable, and
/// finally sort the survivors by time rather than by feed sequence.
pub fn repair(mut entries: Vec<(u32, StopTime)>) -> Vec<StopTime> {
    if entries.is_empty() {
        return Vec::new();
    }
    entries.sort_by_key(|(seq, _)| *seq);

    let mut segments: Vec<Vec<StopTime>> = Vec::new();
    let mut current: Vec<StopTime> = Vec::new();
    for (_, st) in entries {
        if let Some(last) = current.last() {
            let backward = last.arrival_time > st.arrival_time
                && (last.arrival_time - st.arrival_time).to_secs() > BACKWARD_JUMP_THRESHOLD_SECS;
            if backward {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push(st);
    }
    if !current.is_empty() {
        segments.push(current);
    }

    if segments.len() == 1 {
        let mut only = segments.remove(0);
        only.sort_by_key(|st| st.arrival_time);
        return only;
    }

    segments.sort_by_key(|seg| seg[0].arrival_time);
    let mut merged: Vec<Vec<StopTime>> = Vec::new();
    for segment in segments {
        let consistent = merged.last().map(|prev: &Vec<StopTime>| {
            let prev_end = prev.last().unwrap().arrival_time;
            let seg_start = segment[0].arrival_time;
            (seg_start - prev_end).to_secs() >= -BACKWARD_JUMP_THRESHOLD_SECS
        });
        match consistent {
            Some(true) => merged.last_mut().unwrap().extend(segment),
            _ => merged.push(segment),
        }
    }

    let mut survivor = if merged.len() > 1 {
        let dropped: usize = merged.iter().map(Vec::len).sum::<usize>()
            - merged.iter().map(Vec::len).max().unwrap_or(0);
        log::warn!("trip repair: {dropped} stop-time entries discarded from irreconcilable segments");
        merged.into_iter().max_by_key(Vec::len).unwrap_or_default()
    } else {
        merged.pop().unwrap_or_default()
    };
    survivor.sort_by_key(|st| st.arrival_time);
    survivor
}
