//! Engine driven against the simulated encounter, as the runner does

use std::cell::RefCell;
use std::rc::Rc;

use gunner_rotation::actions::{AbilityPolicy, Action, SlotKind};
use gunner_rotation::core::{load_profile, Clock, ManualClock, RotationProfile, Timestamp};
use gunner_rotation::engine::{Collaborators, OpenerState, RotationEngine, TickOutcome};
use gunner_rotation::sim::Encounter;

struct Run {
    encounter: Rc<RefCell<Encounter>>,
    engine: RotationEngine,
    outcomes: Vec<TickOutcome>,
}

fn run(profile: RotationProfile, seconds: f32, reject_chance: f32) -> Run {
    let clock = ManualClock::new();
    let encounter = Rc::new(RefCell::new(
        Encounter::new(clock.clone(), &profile.engine, 42).with_reject_chance(reject_chance),
    ));
    let collab =
        Collaborators::shared(&encounter, clock.clone()).with_combo_reader(Rc::clone(&encounter));
    let mut engine = RotationEngine::new(collab, profile.engine, profile.policy);
    engine.engage();

    let end = Timestamp::from_secs_f32(seconds);
    let mut outcomes = Vec::new();
    while clock.now() < end {
        encounter.borrow_mut().advance_to(clock.now());
        outcomes.push(engine.tick());
        clock.advance_millis(50);
    }
    Run {
        encounter,
        engine,
        outcomes,
    }
}

#[test]
fn test_default_profile_runs_clean() {
    let profile = load_profile("default").expect("default profile");
    let run = run(profile, 90.0, 0.0);
    let encounter = run.encounter.borrow();
    let history = encounter.history();

    // The host never refused anything: the engine respected every timer
    assert!(history.iter().all(|i| i.accepted));
    assert!(history.len() > 30);
    assert!(matches!(
        run.engine.opener().state(),
        OpenerState::Completed | OpenerState::Abandoned
    ));

    let cast_locked: Vec<_> = history
        .iter()
        .filter(|i| i.action.slot() == SlotKind::CastLocked)
        .collect();
    for pair in cast_locked.windows(2) {
        assert!(pair[1].at.since(pair[0].at).as_millis() >= 2500);
    }

    let used = |action| history.iter().filter(|i| i.action == action).count();
    assert!(used(Action::BlazingShot) >= 3);
    assert!(used(Action::HeatBlast) == 0);
    assert!(used(Action::Drill) >= 2);
}

#[test]
fn test_suppressed_burst_holds_tools() {
    let profile = RotationProfile {
        policy: AbilityPolicy {
            suppress_burst: true,
            ..AbilityPolicy::default()
        },
        ..RotationProfile::default()
    };
    let run = run(profile, 30.0, 0.0);
    let encounter = run.encounter.borrow();

    assert!(encounter
        .history()
        .iter()
        .all(|i| !matches!(i.action, Action::Drill | Action::AirAnchor | Action::ChainSaw)));
    assert!(encounter
        .history()
        .iter()
        .any(|i| i.action == Action::HeatedSplitShot));
}

#[test]
fn test_rejections_are_survivable() {
    let profile = load_profile("default").expect("default profile");
    let run = run(profile, 60.0, 0.3);

    let rejected = run
        .outcomes
        .iter()
        .filter(|o| matches!(o, TickOutcome::Rejected(_)))
        .count();
    let invoked = run.outcomes.iter().filter(|o| o.invoked().is_some()).count();
    assert!(rejected > 0);
    assert!(invoked > 15);
}
