//! Event resolution.
//!
//! Every phase resolves at most one narrative event. Two independent
//! day-scaled rolls decide the lethality bucket and whether a day/night
//! phase turns into a feast; a qualifying template is then picked uniformly
//! and filled with distinct tributes drawn from the roster.

pub mod chance;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::trace;

use crate::content::{ContentPool, EventPhase, EventTemplate, Lethality};
use crate::game::{GameError, Participant, ParticipantId, PhaseLabel};

pub use chance::ChanceCurve;

/// A template filled with tributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEvent {
    pub lethal: bool,
    pub rendered_fields: Vec<String>,
    /// Tributes in draw order.
    pub tributes: Vec<ParticipantId>,
}

/// What one phase resolution decided. `event` is `None` when no template
/// qualified; that is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub phase: PhaseLabel,
    pub day: u32,
    pub effective_phase: EventPhase,
    pub lethality: Lethality,
    pub event: Option<RenderedEvent>,
}

impl Resolution {
    pub fn is_feast(&self) -> bool {
        self.effective_phase == EventPhase::Feast
    }
}

/// Picks and renders events using the configured chance curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventResolver {
    fatality: ChanceCurve,
    feast: ChanceCurve,
}

impl Default for EventResolver {
    fn default() -> Self {
        EventResolver {
            fatality: ChanceCurve::fatality(),
            feast: ChanceCurve::feast(),
        }
    }
}

impl EventResolver {
    pub fn new(fatality: ChanceCurve, feast: ChanceCurve) -> Result<Self, GameError> {
        fatality.validate("fatality")?;
        feast.validate("feast")?;
        Ok(EventResolver { fatality, feast })
    }

    pub fn fatality(&self) -> &ChanceCurve {
        &self.fatality
    }

    pub fn feast(&self) -> &ChanceCurve {
        &self.feast
    }

    /// Rolls the lethality bucket for `day`.
    pub fn roll_lethality(&self, day: u32, rng: &mut impl Rng) -> Lethality {
        if rng.gen_bool(self.fatality.probability(day)) {
            Lethality::Fatal
        } else {
            Lethality::Nonfatal
        }
    }

    /// Maps the clock phase to a lookup phase. The bloodbath never feasts.
    pub fn roll_phase(&self, phase: PhaseLabel, day: u32, rng: &mut impl Rng) -> EventPhase {
        if phase == PhaseLabel::Bloodbath {
            return EventPhase::Bloodbath;
        }
        if rng.gen_bool(self.feast.probability(day)) {
            EventPhase::Feast
        } else {
            phase.into()
        }
    }

    /// Resolves one event for `phase` on `day` against `roster`.
    pub fn resolve(
        &self,
        phase: PhaseLabel,
        day: u32,
        roster: &[Participant],
        pool: &ContentPool,
        rng: &mut impl Rng,
    ) -> Resolution {
        let lethality = self.roll_lethality(day, rng);
        let effective_phase = self.roll_phase(phase, day, rng);

        let event = if roster.is_empty() {
            None
        } else {
            let qualifying: Vec<&EventTemplate> = pool
                .templates(effective_phase, lethality)
                .iter()
                .filter(|t| t.required_tributes() <= roster.len())
                .collect();
            qualifying
                .choose(rng)
                .map(|template| draw_and_render(template, roster, rng))
        };

        trace!(
            %phase,
            day,
            %effective_phase,
            %lethality,
            resolved = event.is_some(),
            "resolved phase"
        );

        Resolution {
            phase,
            day,
            effective_phase,
            lethality,
            event,
        }
    }
}

/// Draws the template's tributes without replacement and renders it.
///
/// Callers guarantee `roster.len() >= template.required_tributes()`.
fn draw_and_render(template: &EventTemplate, roster: &[Participant], rng: &mut impl Rng) -> RenderedEvent {
    let mut tributes: Vec<&Participant> = roster
        .choose_multiple(rng, template.required_tributes())
        .collect();
    tributes.shuffle(rng);

    RenderedEvent {
        lethal: template.is_lethal(),
        rendered_fields: template.render(&tributes),
        tributes: tributes.iter().map(|p| p.id()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn roster(n: u64) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant::new(ParticipantId(i), format!("p{}", i), None))
            .collect()
    }

    fn template(tributes: usize, lethal: bool, text: &str) -> EventTemplate {
        EventTemplate::new(tributes, lethal, vec![text.to_string()]).unwrap()
    }

    /// A pool where every bucket holds one template naming its bucket.
    fn labelled_pool(tributes: usize) -> ContentPool {
        let mut pool = ContentPool::new();
        for phase in crate::content::pool::ALL_EVENT_PHASES {
            for lethality in [Lethality::Fatal, Lethality::Nonfatal] {
                let mut text = format!("{} {}", phase, lethality);
                for i in 0..tributes {
                    text.push_str(&format!(" {{{}}}", i));
                }
                pool.insert(phase, lethality, template(tributes, lethality.is_fatal(), &text));
            }
        }
        pool
    }

    #[test]
    fn empty_pool_yields_no_event() {
        let mut rng = SmallRng::seed_from_u64(1);
        let resolution = EventResolver::default().resolve(
            PhaseLabel::Day,
            3,
            &roster(4),
            &ContentPool::new(),
            &mut rng,
        );
        assert!(resolution.event.is_none());
        assert_eq!(resolution.phase, PhaseLabel::Day);
        assert_eq!(resolution.day, 3);
    }

    #[test]
    fn empty_roster_yields_no_event() {
        let mut rng = SmallRng::seed_from_u64(1);
        let pool = labelled_pool(0);
        for _ in 0..50 {
            let r = EventResolver::default().resolve(PhaseLabel::Night, 1, &[], &pool, &mut rng);
            assert!(r.event.is_none());
        }
    }

    #[test]
    fn never_selects_template_needing_more_tributes() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut pool = ContentPool::new();
        pool.insert(EventPhase::Bloodbath, Lethality::Nonfatal, template(5, false, "{0} {1} {2} {3} {4}"));
        pool.insert(EventPhase::Bloodbath, Lethality::Nonfatal, template(2, false, "{0} meets {1}"));
        pool.insert(EventPhase::Bloodbath, Lethality::Fatal, template(5, true, "{0} {1} {2} {3} {4}"));
        let players = roster(3);

        for _ in 0..200 {
            let r = EventResolver::default().resolve(PhaseLabel::Bloodbath, 0, &players, &pool, &mut rng);
            match r.lethality {
                Lethality::Fatal => assert!(r.event.is_none()),
                Lethality::Nonfatal => {
                    let event = r.event.expect("two-tribute template qualifies");
                    assert_eq!(event.tributes.len(), 2);
                }
            }
        }
    }

    #[test]
    fn tributes_are_distinct_and_rendered_in_draw_order() {
        let mut rng = SmallRng::seed_from_u64(5);
        let pool = labelled_pool(3);
        let players = roster(6);
        for _ in 0..100 {
            let r = EventResolver::default().resolve(PhaseLabel::Day, 2, &players, &pool, &mut rng);
            let event = r.event.unwrap();
            let unique: HashSet<_> = event.tributes.iter().collect();
            assert_eq!(unique.len(), 3);

            let names: Vec<String> = event.tributes.iter().map(|id| format!("p{}", id)).collect();
            let expected = format!(
                "{} {} {} {} {}",
                r.effective_phase, r.lethality, names[0], names[1], names[2]
            );
            assert_eq!(event.rendered_fields, vec![expected]);
            assert_eq!(event.lethal, r.lethality.is_fatal());
        }
    }

    #[test]
    fn zero_tribute_template_renders_constant_text() {
        let mut rng = SmallRng::seed_from_u64(5);
        let always_nonfatal = ChanceCurve::new(0.0, 0.0, 0.0);
        let resolver = EventResolver::new(always_nonfatal, always_nonfatal).unwrap();
        let mut pool = ContentPool::new();
        pool.insert(EventPhase::Night, Lethality::Nonfatal, template(0, false, "The anthem plays."));

        let r = resolver.resolve(PhaseLabel::Night, 4, &roster(2), &pool, &mut rng);
        let event = r.event.unwrap();
        assert!(event.tributes.is_empty());
        assert_eq!(event.rendered_fields, vec!["The anthem plays.".to_string()]);
    }

    #[test]
    fn bloodbath_never_feasts() {
        let mut rng = SmallRng::seed_from_u64(2);
        let always = ChanceCurve::new(0.0, 100.0, 100.0);
        let resolver = EventResolver::new(always, always).unwrap();
        for _ in 0..50 {
            assert_eq!(
                resolver.roll_phase(PhaseLabel::Bloodbath, 0, &mut rng),
                EventPhase::Bloodbath
            );
            assert_eq!(resolver.roll_phase(PhaseLabel::Day, 0, &mut rng), EventPhase::Feast);
        }
    }

    #[test]
    fn rejects_invalid_curves() {
        let bad = ChanceCurve::new(1.0, 50.0, 10.0);
        assert!(matches!(
            EventResolver::new(bad, ChanceCurve::feast()),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    fn frequency(trials: u32, mut hit: impl FnMut() -> bool) -> f64 {
        let hits = (0..trials).filter(|_| hit()).count();
        hits as f64 / trials as f64
    }

    #[test]
    fn fatal_rate_tracks_curve() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let resolver = EventResolver::default();
        let trials = 40_000;

        let at_floor = frequency(trials, || resolver.roll_lethality(0, &mut rng).is_fatal());
        assert!((at_floor - 0.01).abs() < 0.004, "day 0 fatal rate {}", at_floor);

        let at_cap = frequency(trials, || resolver.roll_lethality(10, &mut rng).is_fatal());
        assert!((at_cap - 0.20).abs() < 0.015, "day 10 fatal rate {}", at_cap);
    }

    #[test]
    fn feast_rate_tracks_curve() {
        let mut rng = SmallRng::seed_from_u64(4321);
        let resolver = EventResolver::default();
        let trials = 40_000;

        let at_floor = frequency(trials, || {
            resolver.roll_phase(PhaseLabel::Night, 0, &mut rng) == EventPhase::Feast
        });
        assert!((at_floor - 0.01).abs() < 0.004, "day 0 feast rate {}", at_floor);

        let at_cap = frequency(trials, || {
            resolver.roll_phase(PhaseLabel::Day, 4, &mut rng) == EventPhase::Feast
        });
        assert!((at_cap - 0.20).abs() < 0.015, "day 4 feast rate {}", at_cap);
    }

    #[test]
    fn same_seed_same_resolution() {
        let pool = labelled_pool(2);
        let players = roster(8);
        let resolver = EventResolver::default();
        let a = resolver.resolve(PhaseLabel::Day, 3, &players, &pool, &mut SmallRng::seed_from_u64(77));
        let b = resolver.resolve(PhaseLabel::Day, 3, &players, &pool, &mut SmallRng::seed_from_u64(77));
        assert_eq!(a, b);
    }
}
