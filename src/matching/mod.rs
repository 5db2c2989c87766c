//! Volunteer-to-event matching.
//!
//! A pure, synchronous computation over in-memory data: given one volunteer
//! and a list of candidate events, rank events by skill-overlap ratio and
//! report the best event together with the overlapping, missing, and extra
//! skills and an integer percentage score. No I/O, no shared state, nothing
//! cached; callers recompute whenever their inputs change.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Event, Skill, Volunteer};

/// Error raised by [`compute_match`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The candidate event list was empty.
    NoCandidateEvents,
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::NoCandidateEvents => {
                write!(f, "no candidate events available for matching")
            }
        }
    }
}

impl std::error::Error for MatchError {}

/// The outcome of matching one volunteer against a list of events.
///
/// Derived fresh on every call; never persisted or mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// The event with the highest skill-overlap ratio. Ties go to the
    /// earliest event in the input order.
    pub best: Event,
    /// Percentage of the best event's required skills the volunteer has,
    /// rounded half away from zero. Always in 0..=100.
    pub score: u8,
    /// Required skills the volunteer has.
    pub overlapping_skills: Vec<Skill>,
    /// Required skills the volunteer lacks.
    pub missing_skills: Vec<Skill>,
    /// Volunteer skills the best event does not require.
    pub extra_skills: Vec<Skill>,
}

/// Fraction of `event`'s required skills present in `volunteer_skills`,
/// in [0, 1]. Duplicate required skills count once. An event with no
/// required skills scores 0.
fn score_for(event: &Event, volunteer_skills: &HashSet<Skill>) -> f64 {
    let required: HashSet<Skill> = event.required_skills.iter().copied().collect();
    if required.is_empty() {
        return 0.0;
    }
    let overlap = required
        .iter()
        .filter(|s| volunteer_skills.contains(s))
        .count();
    overlap as f64 / required.len() as f64
}

/// Deduplicate a skill sequence, keeping first-occurrence order.
fn dedup_skills(skills: &[Skill]) -> Vec<Skill> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .copied()
        .filter(|s| seen.insert(*s))
        .collect()
}

/// Pick the best-matching event for a volunteer and break down the skill
/// overlap.
///
/// Ranking is by overlap ratio alone; equally-scored events resolve to the
/// one earliest in `events`. Secondary criteria such as date or urgency are
/// deliberately not considered. Fails only when `events` is empty.
pub fn compute_match(volunteer: &Volunteer, events: &[Event]) -> Result<MatchResult, MatchError> {
    let Some(first) = events.first() else {
        return Err(MatchError::NoCandidateEvents);
    };

    let volunteer_skills: HashSet<Skill> = volunteer.skills.iter().copied().collect();

    // Strict greater-than keeps the earliest event on ties.
    let mut best = first;
    let mut best_score = score_for(first, &volunteer_skills);
    for event in &events[1..] {
        let score = score_for(event, &volunteer_skills);
        if score > best_score {
            best = event;
            best_score = score;
        }
    }

    let required = dedup_skills(&best.required_skills);
    let overlapping_skills: Vec<Skill> = required
        .iter()
        .copied()
        .filter(|s| volunteer_skills.contains(s))
        .collect();
    let missing_skills: Vec<Skill> = required
        .iter()
        .copied()
        .filter(|s| !volunteer_skills.contains(s))
        .collect();
    let required_set: HashSet<Skill> = required.iter().copied().collect();
    let extra_skills: Vec<Skill> = dedup_skills(&volunteer.skills)
        .into_iter()
        .filter(|s| !required_set.contains(s))
        .collect();

    let score = if required.is_empty() {
        0
    } else {
        (100.0 * overlapping_skills.len() as f64 / required.len() as f64).round() as u8
    };

    Ok(MatchResult {
        best: best.clone(),
        score,
        overlapping_skills,
        missing_skills,
        extra_skills,
    })
}
