//! Momentum signals: recent check-in deltas grouped per outcome.

use crate::metrics::scope::OutcomeScope;
use crate::metrics::RENDER_LIMIT;
use crate::model::checkin::{CheckIn, Momentum};
use crate::model::outcome::OutcomeId;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Check-ins older than this many days are ignored.
pub const MOMENTUM_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentumSignal {
    pub outcome_id: OutcomeId,
    pub title: String,
    pub owner: String,
    /// Sum of confidence deltas inside the window.
    pub net_delta: i64,
    pub up: usize,
    pub down: usize,
    pub checkins: usize,
    pub last_checkin: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentumView {
    /// Largest absolute swing first, top `RENDER_LIMIT`.
    pub signals: Vec<MomentumSignal>,
    /// Outcomes with at least one check-in in the window.
    pub tracked: usize,
}

fn in_window(checkin: &CheckIn, today: NaiveDate) -> bool {
    checkin
        .effective_date()
        .is_some_and(|date| today.signed_duration_since(date).num_days() <= MOMENTUM_WINDOW_DAYS)
}

pub fn build_momentum(scope: &OutcomeScope<'_>, checkins: &[CheckIn], today: NaiveDate) -> MomentumView {
    let mut order: Vec<OutcomeId> = Vec::new();
    let mut signals: HashMap<OutcomeId, MomentumSignal> = HashMap::new();

    for checkin in checkins
        .iter()
        .filter(|checkin| scope.admits(checkin.outcome_id))
        .filter(|checkin| in_window(checkin, today))
    {
        // The first check-in seen for an outcome supplies its title/owner.
        let signal = signals.entry(checkin.outcome_id).or_insert_with(|| {
            order.push(checkin.outcome_id);
            MomentumSignal {
                outcome_id: checkin.outcome_id,
                title: scope.resolve_title(checkin),
                owner: scope.resolve_owner(checkin),
                net_delta: 0,
                up: 0,
                down: 0,
                checkins: 0,
                last_checkin: None,
            }
        });
        signal.net_delta += i64::from(checkin.confidence_delta);
        signal.checkins += 1;
        match checkin.momentum {
            Momentum::Up => signal.up += 1,
            Momentum::Down => signal.down += 1,
            Momentum::Steady => {}
        }
        signal.last_checkin = signal.last_checkin.max(checkin.effective_date());
    }

    let mut ordered: Vec<MomentumSignal> = order
        .into_iter()
        .filter_map(|id| signals.remove(&id))
        .collect();
    ordered.sort_by(|a, b| {
        b.net_delta
            .abs()
            .cmp(&a.net_delta.abs())
            .then_with(|| a.title.cmp(&b.title))
    });

    let tracked = ordered.len();
    ordered.truncate(RENDER_LIMIT);
    MomentumView {
        signals: ordered,
        tracked,
    }
}
