//! Credit assessment definitions.

use std::fmt;

use common::{define_kind, DateTime, Money, Percent};
use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::domain::{customer, Customer};

/// Credit score of a [`Customer`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(try_from = "u16")]
pub struct Score(u16);

impl Score {
    /// Lowest [`Score`] a synthesized assessment starts from.
    pub const FLOOR: Self = Self(300);

    /// Highest possible [`Score`].
    pub const MAX: Self = Self(850);

    /// Lowest [`Score`] a credit is approved with.
    pub const APPROVAL_THRESHOLD: Self = Self(650);

    /// Creates a new [`Score`] if the provided value is in `1..=850` range.
    ///
    /// Zero is rejected, as it means "no score" in the legacy data.
    #[must_use]
    pub const fn new(value: u16) -> Option<Self> {
        if value == 0 || value > Self::MAX.0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the numeric value of this [`Score`].
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Score {
    type Error = &'static str;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("credit score must be in `1..=850` range")
    }
}

/// Source of [`Score`]s for [`Customer`]s having none stored.
pub trait Scorer: fmt::Debug + Send + Sync {
    /// Assesses the [`Score`] of the provided [`Customer`] at the provided
    /// moment.
    fn assess(&self, customer: &Customer, now: DateTime) -> Score;
}

/// Deterministic [`Scorer`] deriving a [`Score`] from the [`Customer`] age
/// and ID.
///
/// Starts from [`Score::FLOOR`], adds `100` for the age of `25` and older,
/// `50` more for `35` and older, and a stable per-customer bonus in `0..200`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticScorer;

impl Scorer for SyntheticScorer {
    fn assess(&self, customer: &Customer, now: DateTime) -> Score {
        let mut score = u64::from(Score::FLOOR.0);

        match customer.age_in(now.year()) {
            Some(age) if age >= 35 => score += 150,
            Some(age) if age >= 25 => score += 100,
            Some(_) | None => {}
        }

        score += id_bonus(customer.id);

        Score(
            u16::try_from(score.min(u64::from(Score::MAX.0)))
                .unwrap_or(Score::MAX.0),
        )
    }
}

/// Stable bonus in `0..200` range derived from the provided [`customer::Id`].
fn id_bonus(id: customer::Id) -> u64 {
    xxh3_64(id.to_string().as_bytes()) % 200
}

define_kind! {
    #[doc = "Reason of a [`CreditDecision`]."]
    enum Reason {
        #[doc = "[`Score`] of `750` and above."]
        ExcellentScore = 1,

        #[doc = "[`Score`] in `700..750` range."]
        GoodScore = 2,

        #[doc = "[`Score`] in `650..700` range."]
        FairScore = 3,

        #[doc = "[`Score`] below `650`."]
        ScoreTooLow = 4,
    }
}

impl Reason {
    /// Returns the human-readable description of this [`Reason`].
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ExcellentScore => "excellent credit score",
            Self::GoodScore => "good credit score",
            Self::FairScore => "fair credit score",
            Self::ScoreTooLow => "credit score too low",
        }
    }

    /// Returns the base interest rate this [`Reason`] implies.
    #[must_use]
    pub fn interest_rate(self) -> Percent {
        let bps = match self {
            Self::ExcellentScore => 350,
            Self::GoodScore => 590,
            Self::FairScore => 890,
            Self::ScoreTooLow => 1500,
        };
        Percent::from_basis_points(bps).unwrap_or(Percent::ZERO)
    }
}

/// Outcome of a credit evaluation of a [`Customer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct CreditDecision {
    /// ID of the evaluated [`Customer`].
    pub customer_id: customer::Id,

    /// [`Score`] the decision is based on.
    pub score: Score,

    /// Indicator whether the credit is approved.
    pub approved: bool,

    /// Maximum amount of credit, zero when rejected.
    pub credit_limit: Money,

    /// Base annual interest rate.
    pub interest_rate: Percent,

    /// [`Reason`] of the decision.
    pub reason: Reason,
}

impl CreditDecision {
    /// Decides upon the credit for the provided [`Customer`], using its stored
    /// [`Score`] or assessing a new one with the provided [`Scorer`].
    #[must_use]
    pub fn evaluate(
        customer: &Customer,
        scorer: &dyn Scorer,
        now: DateTime,
    ) -> Self {
        let score = customer
            .credit_score
            .unwrap_or_else(|| scorer.assess(customer, now));
        Self::for_score(customer.id, score)
    }

    /// Decides upon the credit for the provided [`Score`].
    #[must_use]
    pub fn for_score(customer_id: customer::Id, score: Score) -> Self {
        let reason = match score.0 {
            750.. => Reason::ExcellentScore,
            700..750 => Reason::GoodScore,
            650..700 => Reason::FairScore,
            _ => Reason::ScoreTooLow,
        };
        let approved = score >= Score::APPROVAL_THRESHOLD;

        Self {
            customer_id,
            score,
            approved,
            credit_limit: if approved {
                Money::from(u32::from(score.0))
            } else {
                Money::ZERO
            },
            interest_rate: reason.interest_rate(),
            reason,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Money, Percent};

    use super::{
        CreditDecision, Reason, Score, Scorer as _, SyntheticScorer,
    };
    use crate::domain::customer::{self, spec::customer};

    fn decide(score: u16) -> CreditDecision {
        CreditDecision::for_score(
            customer::Id::new(),
            Score::new(score).unwrap(),
        )
    }

    #[test]
    fn rejects_out_of_range_scores() {
        assert!(Score::new(0).is_none());
        assert!(Score::new(851).is_none());
        assert!(Score::new(1).is_some());
        assert!(Score::new(850).is_some());
    }

    #[test]
    fn tiers_by_score() {
        let d = decide(780);
        assert!(d.approved);
        assert_eq!(d.reason, Reason::ExcellentScore);
        assert_eq!(d.interest_rate, Percent::from_basis_points(350).unwrap());
        assert_eq!(d.credit_limit, Money::from(780));

        let d = decide(700);
        assert!(d.approved);
        assert_eq!(d.reason, Reason::GoodScore);
        assert_eq!(d.interest_rate, Percent::from_basis_points(590).unwrap());

        let d = decide(650);
        assert!(d.approved);
        assert_eq!(d.reason, Reason::FairScore);
        assert_eq!(d.interest_rate, Percent::from_basis_points(890).unwrap());
        assert_eq!(d.credit_limit, Money::from(650));
    }

    #[test]
    fn rejects_low_scores() {
        let d = decide(649);

        assert!(!d.approved);
        assert_eq!(d.reason, Reason::ScoreTooLow);
        assert_eq!(d.reason.description(), "credit score too low");
        assert_eq!(d.credit_limit, Money::ZERO);
        assert_eq!(d.interest_rate, Percent::from_basis_points(1500).unwrap());
    }

    #[test]
    fn prefers_stored_score() {
        let mut c = customer();
        c.credit_score = Score::new(720);

        let d = CreditDecision::evaluate(&c, &SyntheticScorer, DateTime::now());

        assert_eq!(d.score.value(), 720);
        assert_eq!(d.reason, Reason::GoodScore);
    }

    #[test]
    fn synthesizes_deterministic_scores() {
        let now = DateTime::from_ymd(2025, 6, 1).unwrap();
        let mut c = customer();

        let unknown_age = SyntheticScorer.assess(&c, now);
        assert!((300..500).contains(&unknown_age.value()));
        assert_eq!(SyntheticScorer.assess(&c, now), unknown_age);

        c.born_at = Some(DateTime::from_ymd(1995, 1, 1).unwrap().coerce());
        assert_eq!(
            SyntheticScorer.assess(&c, now).value(),
            unknown_age.value() + 100,
        );

        c.born_at = Some(DateTime::from_ymd(1980, 1, 1).unwrap().coerce());
        assert_eq!(
            SyntheticScorer.assess(&c, now).value(),
            unknown_age.value() + 150,
        );
    }

    #[test]
    fn serializes_reason() {
        let d = decide(780);
        let json = serde_json::to_value(d).unwrap();

        assert_eq!(json["reason"], "excellent_score");
        assert_eq!(json["interest_rate"], "3.5");
        assert_eq!(json["credit_limit"], "780");
        assert_eq!(json["score"], 780);
    }
}
