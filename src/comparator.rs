//! Two-sided comparison: leader tracking and lead-change events.
//!
//! The [`Comparator`] is the battle's referee.  It owns both samplers,
//! re-evaluates the lead after every window close on either side, and
//! surfaces a [`LeadChange`] only on an actual flip — the edge, not the
//! level.  Like the samplers it is pure state: the live layer (or a test)
//! drives it call by call.

use std::time::Instant;

use crate::{Error, Sampler, Side, SideSummary, WindowReport};

/// Identity and context of a lead flip.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeadChange {
    /// Side that led before this flip; `None` on the first lead of the
    /// battle.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub previous: Option<Side>,
    /// Side now leading.
    pub leader: Side,
    /// Contender key of the new leader.
    pub leader_key: String,
    /// Display label of the new leader.
    pub leader_label: String,
    /// Aggregate score of the new leader at flip time.
    pub leader_aggregate: f64,
    /// Aggregate score of the side now trailing.
    pub trailing_aggregate: f64,
}

/// Outcome of one window close as seen through the comparator.
///
/// The report always precedes the lead change: observers learn the new
/// count first, then (only on a flip) the new leader, matching the order
/// the live callbacks fire in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickOutcome {
    /// The closed window.
    pub report: WindowReport,
    /// Present only when this close flipped the lead.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub lead_change: Option<LeadChange>,
}

/// Point-in-time view of a whole battle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSummary {
    /// Left side.
    pub left: SideSummary,
    /// Right side.
    pub right: SideSummary,
    /// Currently recorded leader, if any side has ever pulled strictly
    /// ahead.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub leader: Option<Side>,
}

/// Owns the two samplers of a battle and tracks which side leads.
///
/// Lead semantics: after any window close, the side with the strictly
/// greater aggregate score is the candidate leader.  Equal aggregates leave
/// the recorded leader untouched: an unset leader stays unset, a set one
/// keeps its seat.  A [`LeadChange`] is reported exactly when the candidate
/// differs from the recorded leader, so consumers see flips, never
/// repeats.
///
/// No ordering is assumed between the two sides' closes; evaluation reads
/// only the latest aggregates, so any interleaving yields the same leader
/// for the same data.
#[derive(Debug, Clone)]
pub struct Comparator {
    left: Sampler,
    right: Sampler,
    leader: Option<Side>,
}

impl Comparator {
    /// Pair two samplers: the first must be `Side::Left`, the second
    /// `Side::Right`.
    pub fn new(left: Sampler, right: Sampler) -> Result<Self, Error> {
        if left.side() != Side::Left || right.side() != Side::Right {
            return Err(Error::Domain(
                "Comparator: expected a Left and a Right sampler, in that order",
            ));
        }
        Ok(Self {
            left,
            right,
            leader: None,
        })
    }

    /// Record one event arrival on `side`.
    pub fn record_event(&mut self, side: Side, at: Instant) {
        self.sampler_mut(side).record_event(at);
    }

    /// Close `side`'s window, then re-evaluate the lead.
    pub fn close_window(&mut self, side: Side) -> TickOutcome {
        let report = self.sampler_mut(side).close_window();
        let lead_change = self.evaluate_lead();
        TickOutcome {
            report,
            lead_change,
        }
    }

    /// Sampler on `side`.
    pub fn sampler(&self, side: Side) -> &Sampler {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Currently recorded leader, if any.
    pub fn leader(&self) -> Option<Side> {
        self.leader
    }

    /// Point-in-time summary of both sides and the lead.
    pub fn summary(&self) -> BattleSummary {
        BattleSummary {
            left: self.left.summary(),
            right: self.right.summary(),
            leader: self.leader,
        }
    }

    fn sampler_mut(&mut self, side: Side) -> &mut Sampler {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn evaluate_lead(&mut self) -> Option<LeadChange> {
        let l = self.left.aggregate();
        let r = self.right.aggregate();
        let candidate = if l > r {
            Side::Left
        } else if r > l {
            Side::Right
        } else {
            // Tie: the recorded leader stands, set or not.
            return None;
        };
        if self.leader == Some(candidate) {
            return None;
        }
        let previous = self.leader;
        self.leader = Some(candidate);
        let (leading, leader_aggregate, trailing_aggregate) = match candidate {
            Side::Left => (&self.left, l, r),
            Side::Right => (&self.right, r, l),
        };
        Some(LeadChange {
            previous,
            leader: candidate,
            leader_key: leading.contender().key.clone(),
            leader_label: leading.contender().label.clone(),
            leader_aggregate,
            trailing_aggregate,
        })
    }
}
