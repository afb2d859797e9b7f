//! Demo dataset used by `seed` flows and as the cache fallback.
//!
//! Ids are fixed so repeated seeding upserts instead of duplicating.

use crate::model::checkin::{CheckIn, Momentum};
use crate::model::outcome::{Outcome, OutcomeStatus};
use crate::model::story_beat::{Audience, StoryBeat};
use crate::state::AtlasState;
use chrono::NaiveDate;
use uuid::{uuid, Uuid};

const RETENTION_ID: Uuid = uuid!("3f1e7f2c-7fd2-4d98-9fa8-0d0b42751b1a");
const PLACEMENT_ID: Uuid = uuid!("f6f0f9d9-3f0c-4a1d-99dd-1c8b5c6c1a4a");
const GRANTS_ID: Uuid = uuid!("9f5b5d5d-8a24-4d8b-a9de-6f02d05d2149");
const BELONGING_ID: Uuid = uuid!("e58a7bcb-120d-4c2b-8ec4-b9c86c8c6a86");

fn day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

#[allow(clippy::too_many_arguments)]
fn outcome(
    id: Uuid,
    title: &str,
    category: &str,
    status: OutcomeStatus,
    metric: &str,
    owner: &str,
    confidence: i32,
    date: Option<NaiveDate>,
    evidence: &str,
    story: &str,
    tags: &[&str],
) -> Outcome {
    Outcome {
        id,
        title: title.to_string(),
        category: category.to_string(),
        status,
        metric: metric.to_string(),
        owner: owner.to_string(),
        confidence,
        last_updated: date,
        evidence: Some(evidence.to_string()),
        story: Some(story.to_string()),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

pub fn demo_outcomes() -> Vec<Outcome> {
    vec![
        outcome(
            RETENTION_ID,
            "Scholar retention up 12% year-over-year",
            "Retention",
            OutcomeStatus::OnTrack,
            "Retention rate",
            "Program Ops",
            88,
            day(2026, 2, 2),
            "https://example.com/retention-report",
            "Advisor office hours tied to term readiness reduced midterm drop-offs.",
            &["retention", "advisor outreach", "first-gen"],
        ),
        outcome(
            PLACEMENT_ID,
            "Career placement within 6 months reached 64%",
            "Career",
            OutcomeStatus::Watching,
            "Placement rate",
            "Career Success",
            72,
            day(2026, 1, 26),
            "https://example.com/placement-dashboard",
            "Employer cohort matchups improving, but pipeline still uneven for STEM majors.",
            &["career", "employer pipeline", "STEM"],
        ),
        outcome(
            GRANTS_ID,
            "Emergency grant requests down 18%",
            "Wellbeing",
            OutcomeStatus::OnTrack,
            "Grant requests",
            "Scholar Support",
            83,
            day(2026, 1, 20),
            "https://example.com/grant-log",
            "New financial coaching cadence reduced crisis escalations.",
            &["wellbeing", "financial coaching", "emergency grants"],
        ),
        outcome(
            BELONGING_ID,
            "Community belonging score dipped to 3.8/5",
            "Community",
            OutcomeStatus::NeedsLift,
            "Belonging survey",
            "Community Team",
            58,
            day(2026, 1, 29),
            "https://example.com/survey-highlights",
            "Scholars want more peer pods across campuses; listening sessions scheduled.",
            &["community", "belonging", "peer pods"],
        ),
    ]
}

fn checkin(
    id: Uuid,
    outcome_id: Uuid,
    date: Option<NaiveDate>,
    delta: i32,
    momentum: Momentum,
    note: &str,
    next_step: &str,
) -> CheckIn {
    let mut checkin = CheckIn::new(outcome_id, delta, momentum);
    checkin.id = id;
    checkin.update_date = date;
    checkin.note = Some(note.to_string());
    checkin.next_step = Some(next_step.to_string());
    checkin
}

pub fn demo_checkins() -> Vec<CheckIn> {
    vec![
        checkin(
            uuid!("2fd519ae-0f2a-4ac6-9d0a-b8b0cb5dbd12"),
            RETENTION_ID,
            day(2026, 2, 5),
            4,
            Momentum::Up,
            "Retention nudges for first-gen scholars continued to reduce stop-out risk.",
            "Share weekly playbook with regional advisors.",
        ),
        checkin(
            uuid!("b67dbe98-1b1b-45d8-8d61-8b1d600cd3be"),
            PLACEMENT_ID,
            day(2026, 2, 1),
            -3,
            Momentum::Down,
            "STEM placement pipeline slowed as spring internships confirmed later than expected.",
            "Accelerate employer outreach for April cohorts.",
        ),
        checkin(
            uuid!("bb6b1a9e-3b9b-4b33-9722-5d7efb859e77"),
            BELONGING_ID,
            day(2026, 2, 3),
            2,
            Momentum::Up,
            "New peer pod pilots improved belonging scores in early feedback.",
            "Roll pods to remaining campuses by March.",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn story_beat(
    id: Uuid,
    outcome_id: Uuid,
    audience: Audience,
    headline: &str,
    proof_point: &str,
    next_move: &str,
    scheduled: Option<NaiveDate>,
    owner: &str,
) -> StoryBeat {
    StoryBeat {
        id,
        outcome_id,
        audience,
        headline: headline.to_string(),
        proof_point: Some(proof_point.to_string()),
        next_move: Some(next_move.to_string()),
        scheduled_date: scheduled,
        owner: Some(owner.to_string()),
        created_at: None,
        outcome_title: None,
        outcome_owner: None,
    }
}

pub fn demo_story_beats() -> Vec<StoryBeat> {
    vec![
        story_beat(
            uuid!("9a78dd5d-0e40-4f1a-a3a5-58d5f2a2d3a1"),
            RETENTION_ID,
            Audience::Leadership,
            "Retention playbook proving out",
            "Stop-out risk down in regions piloting advisor nudges.",
            "Draft slide for the February exec review.",
            day(2026, 2, 12),
            "Program Ops",
        ),
        story_beat(
            uuid!("b28d0d3d-69b0-4f9b-9d7b-8b3d9f2b0a2a"),
            BELONGING_ID,
            Audience::Partners,
            "Peer pod pilots lifting belonging",
            "Pilot campuses reported a 0.4 bump in belonging scores.",
            "Confirm partner talking points and scholar quotes.",
            day(2026, 2, 10),
            "Community Team",
        ),
        story_beat(
            uuid!("6d9b3a1b-9b2d-4f0a-9b1d-1b4c2f4c8b9a"),
            PLACEMENT_ID,
            Audience::Leadership,
            "Placement pipeline needs April lift",
            "STEM internships confirming later, but employer interest remains strong.",
            "Align employer outreach sprint with March deadlines.",
            day(2026, 2, 17),
            "Career Success",
        ),
    ]
}

/// Full demo state: outcomes, check-ins and story beats; no sources.
pub fn demo_state() -> AtlasState {
    AtlasState {
        outcomes: demo_outcomes(),
        checkins: demo_checkins(),
        story_beats: demo_story_beats(),
        sources: Vec::new(),
    }
}
