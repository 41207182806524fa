//! Derived writing-goal state. No IO and no clock of its own.
//!
//! Every function takes `now` explicitly so the UI, the native client and the
//! tests agree on the same instant.

use chrono::{DateTime, Duration, Utc};

use crate::{GoalStatus, WritingGoal};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Percent of the target reached, clamped to `[0, 100]`.
pub fn progress_percent(goal: &WritingGoal) -> f64 {
    if goal.target_words <= 0 {
        return 0.0;
    }
    let pct = 100.0 * goal.current_words as f64 / goal.target_words as f64;
    pct.clamp(0.0, 100.0)
}

/// Whole days left before the goal's deadline, rounded up, never negative.
///
/// Rows written outside the goal form can carry a day count past the end of
/// the calendar; such a deadline counts as the far future.
pub fn days_remaining(goal: &WritingGoal, now: DateTime<Utc>) -> i64 {
    let deadline = Duration::try_days(goal.target_days)
        .and_then(|span| goal.created_at.checked_add_signed(span));
    let Some(deadline) = deadline else {
        if goal.target_days <= 0 {
            return 0;
        }
        let elapsed = (now - goal.created_at).num_days();
        return goal.target_days.saturating_sub(elapsed).max(1);
    };
    let millis_left = (deadline - now).num_milliseconds();
    if millis_left <= 0 {
        return 0;
    }
    div_ceil(millis_left, SECONDS_PER_DAY * 1000)
}

/// Words per day needed to finish on time; 0 once the deadline has passed.
///
/// Goes non-positive when the goal is already exceeded; use
/// [`display_words_per_day`] for UI.
pub fn required_words_per_day(goal: &WritingGoal, now: DateTime<Utc>) -> i64 {
    let days = days_remaining(goal, now);
    if days == 0 {
        return 0;
    }
    div_ceil(goal.target_words.saturating_sub(goal.current_words), days)
}

pub fn display_words_per_day(goal: &WritingGoal, now: DateTime<Utc>) -> i64 {
    required_words_per_day(goal, now).max(0)
}

/// Credit `delta` words to a goal.
///
/// The floor is zero, there is no ceiling. Completion is one-way: a goal
/// that reaches its target flips to `completed` once and stays there even if
/// later deltas shrink `current_words`.
pub fn apply_word_delta(goal: &WritingGoal, delta: i64, now: DateTime<Utc>) -> WritingGoal {
    set_current_words(goal, goal.current_words.saturating_add(delta), now)
}

/// Overwrite the word count (the "Update Progress" dialog), same rules as
/// [`apply_word_delta`].
pub fn set_current_words(goal: &WritingGoal, words: i64, now: DateTime<Utc>) -> WritingGoal {
    let mut updated = goal.clone();
    updated.current_words = words.max(0);
    updated.updated_at = now;
    if updated.current_words >= updated.target_words && goal.status != GoalStatus::Completed {
        updated.status = GoalStatus::Completed;
        updated.completed_at = Some(now);
    }
    updated
}

/// Card indicator colour on the goals page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalHealth {
    Completed,
    Overdue,
    OnTrack,
}

pub fn goal_health(goal: &WritingGoal, now: DateTime<Utc>) -> GoalHealth {
    if progress_percent(goal) >= 100.0 {
        GoalHealth::Completed
    } else if days_remaining(goal, now) == 0 {
        GoalHealth::Overdue
    } else {
        GoalHealth::OnTrack
    }
}

/// "42.0% Complete"
pub fn format_progress(goal: &WritingGoal) -> String {
    format!("{:.1}% Complete", progress_percent(goal))
}

/// Thousands-separated count for progress labels, e.g. `12,500`.
pub fn format_word_count(words: i64) -> String {
    let digits = words.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if words < 0 {
        out.insert(0, '-');
    }
    out
}

fn div_ceil(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    if numerator % denominator != 0 && (numerator > 0) == (denominator > 0) {
        quotient + 1
    } else {
        quotient
    }
}
