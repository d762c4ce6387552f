mod common;

use common::{attach_recorder, new_log, notifications, Notification};
use sonnet::modeling::{ModelError, SolverId};
use sonnet::{Variable, VariableType};

fn labelled(log: &[(String, Notification)]) -> Vec<(&str, Notification)> {
    log.iter().map(|(l, n)| (l.as_str(), n.clone())).collect()
}

fn solved(lower: f64, upper: f64, value: f64) -> Variable {
    let x = Variable::named_with_bounds("x", lower, upper, VariableType::Continuous);
    x.assign(SolverId::next(), 0, value, 0.0);
    x
}

#[test]
fn set_upper_reaches_every_solver_in_attachment_order() {
    let log = new_log();
    let x = Variable::new(0.0, 10.0, VariableType::Continuous);
    let _s1 = attach_recorder(&x, "s1", &log);
    let _s2 = attach_recorder(&x, "s2", &log);
    let _s3 = attach_recorder(&x, "s3", &log);

    x.set_upper(4.0).unwrap();

    assert_eq!(
        labelled(&notifications(&log)),
        vec![
            ("s1", Notification::Upper(4.0)),
            ("s2", Notification::Upper(4.0)),
            ("s3", Notification::Upper(4.0)),
        ]
    );
}

#[test]
fn every_mutator_propagates() {
    let log = new_log();
    let x = Variable::named("x", VariableType::Continuous);
    let _s = attach_recorder(&x, "s", &log);

    x.set_lower(-1.0).unwrap();
    x.set_upper(f64::INFINITY).unwrap();
    x.set_upper(8.0).unwrap();
    x.set_type(VariableType::Integer).unwrap();
    x.set_name("renamed").unwrap();

    assert_eq!(
        labelled(&notifications(&log)),
        vec![
            ("s", Notification::Lower(-1.0)),
            ("s", Notification::Upper(8.0)),
            ("s", Notification::Type(VariableType::Integer)),
            ("s", Notification::Name("renamed".to_string())),
        ]
    );
    assert_eq!(x.name(), "renamed");
}

#[test]
fn unchanged_values_send_nothing() {
    let log = new_log();
    let x = Variable::named_with_bounds("x", 1.0, 5.0, VariableType::Integer);
    let _s = attach_recorder(&x, "s", &log);

    x.set_lower(1.0).unwrap();
    x.set_lower(1.0 + 1e-9).unwrap();
    x.set_upper(5.0 - 1e-9).unwrap();
    x.set_type(VariableType::Integer).unwrap();
    x.set_name("x").unwrap();

    assert!(notifications(&log).is_empty());
    assert_eq!(x.lower(), 1.0);
    assert_eq!(x.upper(), 5.0);
}

#[test]
fn nan_bounds_are_refused_before_reaching_solvers() {
    let log = new_log();
    let x = Variable::named_with_bounds("x", 1.0, 5.0, VariableType::Continuous);
    let _s = attach_recorder(&x, "s", &log);

    for _ in 0..2 {
        assert!(matches!(x.set_upper(f64::NAN), Err(ModelError::InvalidArgument(_))));
        assert!(matches!(x.set_lower(f64::NAN), Err(ModelError::InvalidArgument(_))));
    }

    assert!(notifications(&log).is_empty());
    assert_eq!((x.lower(), x.upper()), (1.0, 5.0));
}

#[test]
fn nested_freeze_pins_once_and_restores_once() {
    for k in 1..=4 {
        let log = new_log();
        let x = solved(0.0, 10.0, 3.0);
        let _s = attach_recorder(&x, "s", &log);

        for i in 0..k {
            assert_eq!(x.freeze().unwrap(), i == 0);
        }
        for i in 0..k {
            assert_eq!(x.unfreeze().unwrap(), i == k - 1);
        }

        assert_eq!(
            labelled(&notifications(&log)),
            vec![
                ("s", Notification::Bounds(3.0, 3.0)),
                ("s", Notification::Bounds(0.0, 10.0)),
            ],
            "k = {k}"
        );
        assert!(!x.is_frozen());
    }
}

#[test]
fn partial_unfreeze_keeps_the_pin() {
    let log = new_log();
    let x = solved(0.0, 10.0, 6.0);
    let _s = attach_recorder(&x, "s", &log);

    x.freeze().unwrap();
    x.freeze().unwrap();
    x.freeze().unwrap();
    assert!(!x.unfreeze().unwrap());
    assert!(!x.unfreeze().unwrap());

    assert!(x.is_frozen());
    assert_eq!(x.frozen_count(), 1);
    assert_eq!(
        labelled(&notifications(&log)),
        vec![("s", Notification::Bounds(6.0, 6.0))]
    );
}

#[test]
fn unfreeze_without_freeze_is_a_no_op() {
    let log = new_log();
    let x = solved(0.0, 10.0, 6.0);
    let _s = attach_recorder(&x, "s", &log);

    assert!(!x.unfreeze().unwrap());
    assert!(notifications(&log).is_empty());
}

#[test]
fn bound_changes_while_frozen_are_held_until_unfreeze() {
    let log = new_log();
    let x = solved(0.0, 10.0, 2.0);
    let _s = attach_recorder(&x, "s", &log);

    x.freeze().unwrap();
    x.set_upper(4.0).unwrap();
    x.set_lower(1.0).unwrap();
    assert_eq!((x.lower(), x.upper()), (1.0, 4.0));
    assert_eq!(x.effective_bounds(), (2.0, 2.0));

    x.unfreeze().unwrap();

    assert_eq!(
        labelled(&notifications(&log)),
        vec![
            ("s", Notification::Bounds(2.0, 2.0)),
            ("s", Notification::Bounds(1.0, 4.0)),
        ]
    );
}

#[test]
fn freeze_before_any_solve_fails_without_side_effects() {
    let log = new_log();
    let x = Variable::default();
    let _s = attach_recorder(&x, "s", &log);

    assert!(matches!(x.freeze(), Err(ModelError::InvalidState(_))));
    assert!(!x.is_frozen());
    assert!(notifications(&log).is_empty());
}

#[test]
fn attaching_twice_keeps_one_entry() {
    let log = new_log();
    let x = Variable::default();
    let s = attach_recorder(&x, "s", &log);
    let id = s.borrow().id;
    x.attach(sonnet::modeling::SolverHandle::from_rc(id, &s));

    assert_eq!(x.attached_solvers(), vec![id]);
    x.set_upper(1.0).unwrap();
    assert_eq!(notifications(&log).len(), 1);

    x.detach(id);
    x.set_upper(2.0).unwrap();
    assert_eq!(notifications(&log).len(), 1);
}

#[test]
fn dropped_solvers_are_pruned() {
    let log = new_log();
    let x = Variable::default();
    let s1 = attach_recorder(&x, "s1", &log);
    let s2 = attach_recorder(&x, "s2", &log);
    let surviving = s2.borrow().id;

    drop(s1);
    x.set_upper(9.0).unwrap();

    assert_eq!(
        labelled(&notifications(&log)),
        vec![("s2", Notification::Upper(9.0))]
    );
    assert_eq!(x.attached_solvers(), vec![surviving]);
}

#[test]
fn observer_failure_propagates_and_stops_the_fan_out() {
    let log = new_log();
    let x = Variable::default();
    let s1 = attach_recorder(&x, "s1", &log);
    let _s2 = attach_recorder(&x, "s2", &log);
    s1.borrow_mut().fail = true;

    let err = x.set_upper(3.0).unwrap_err();
    assert!(err.to_string().contains("s1 refused"));
    assert!(notifications(&log).is_empty());
    // The caller's value is kept; the solvers are now stale.
    assert_eq!(x.upper(), 3.0);
}

#[test]
fn busy_solver_reports_invalid_state() {
    let log = new_log();
    let x = Variable::default();
    let s = attach_recorder(&x, "s", &log);

    let _held = s.borrow_mut();
    assert!(matches!(x.set_upper(3.0), Err(ModelError::InvalidState(_))));
}

#[test]
fn default_names_stay_unique_across_named_construction() {
    let mut ids = Vec::new();
    for i in 0..10 {
        let unnamed = Variable::with_type(VariableType::Continuous);
        let _named = Variable::named(&format!("n{i}"), VariableType::Integer);
        assert_eq!(unnamed.name(), format!("Var_{}", unnamed.id()));
        ids.push(unnamed.id());
    }
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}
