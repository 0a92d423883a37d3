
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use personalize::{
    DiagnosticSink, MemorySink, RenderingReference, RuleContext, RuleEvaluator, Severity,
};
use proptest::prelude::*;
use strategies::{
    arb_non_failing_rule_list, arb_rule_list, Event, GenAction, GenCondition, GenRuleList, Log,
    Outcome,
};

fn ctx() -> RuleContext {
    RuleContext::for_reference(RenderingReference::new("r-1", "hero"))
}

/// Run a generated list and capture what actually happened.
fn run(gen: &GenRuleList, stop_on_first_match: bool) -> Outcome {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let rules = gen.build(&log);
    let sink = Arc::new(MemorySink::new());
    let evaluator = RuleEvaluator::new().with_sink(Arc::clone(&sink) as Arc<dyn DiagnosticSink>);

    let mut ctx = ctx();
    let executed = evaluator.evaluate(&rules, &mut ctx, stop_on_first_match);
    let events = log.lock().unwrap().clone();
    Outcome {
        events,
        executed,
        aborted: ctx.is_aborted(),
        warnings: sink.count(Severity::Warn),
        errors: sink.count(Severity::Error),
    }
}

// ---------------------------------------------------------------------------
// The evaluator does exactly what the straight-line model does: same calls in
// the same order, same count, same abort state, same diagnostics.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn matches_model_first_match(gen in arb_rule_list()) {
        prop_assert_eq!(run(&gen, true), gen.expected(true));
    }

    #[test]
    fn matches_model_multi_match(gen in arb_rule_list()) {
        prop_assert_eq!(run(&gen, false), gen.expected(false));
    }
}

// ---------------------------------------------------------------------------
// A rule whose dependency is unavailable behaves as if it were absent.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn unavailable_dependency_is_like_absence(gen in arb_rule_list(), stop in any::<bool>()) {
        let with = run(&gen, stop);
        let without = run(&gen.without_unavailable(), stop);

        let actions = |o: &Outcome| -> Vec<Event> {
            o.events.iter().copied().filter(|e| matches!(e, Event::Action(..))).collect()
        };
        prop_assert_eq!(actions(&with), actions(&without));
        prop_assert_eq!(with.executed, without.executed);
        prop_assert_eq!(with.aborted, without.aborted);
        prop_assert_eq!(without.warnings, 0);
    }
}

// ---------------------------------------------------------------------------
// After an unexpected condition failure or an action failure, nothing else
// runs.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn nothing_runs_after_a_failure(gen in arb_rule_list(), stop in any::<bool>()) {
        let out = run(&gen, stop);
        let failed_at = out.events.iter().position(|e| match *e {
            Event::Condition(i) => gen.rules[i].condition == GenCondition::Fails,
            Event::Action(i, j) => gen.rules[i].actions[j] == GenAction::Fails,
        });
        if let Some(pos) = failed_at {
            prop_assert_eq!(pos, out.events.len() - 1, "events after failure: {:?}", out.events);
            prop_assert!(out.aborted);
            prop_assert_eq!(out.errors, 1);
        } else {
            prop_assert!(!out.aborted);
            prop_assert_eq!(out.errors, 0);
        }
    }
}

// ---------------------------------------------------------------------------
// First-match mode runs at most one rule's actions.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn first_match_runs_at_most_one_rule(gen in arb_rule_list()) {
        let out = run(&gen, true);
        prop_assert!(out.executed <= 1);

        let mut rules_with_actions: Vec<usize> = out
            .events
            .iter()
            .filter_map(|e| match *e {
                Event::Action(i, _) => Some(i),
                Event::Condition(_) => None,
            })
            .collect();
        rules_with_actions.dedup();
        prop_assert!(rules_with_actions.len() <= 1);
    }

    #[test]
    fn multi_match_applies_every_match_in_order(gen in arb_non_failing_rule_list()) {
        let out = run(&gen, false);
        if out.aborted {
            return Ok(());
        }
        let expected: Vec<usize> = gen
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.condition == GenCondition::Match)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(out.executed, expected.len());
    }
}

// ---------------------------------------------------------------------------
// Listeners fire once per condition attempt and once per applied action.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn listeners_fire_once_per_step(gen in arb_rule_list(), stop in any::<bool>()) {
        let evaluating = Arc::new(AtomicUsize::new(0));
        let evaluated = Arc::new(AtomicUsize::new(0));
        let applied = Arc::new(AtomicUsize::new(0));
        let (a, b, c) = (Arc::clone(&evaluating), Arc::clone(&evaluated), Arc::clone(&applied));

        let evaluator = RuleEvaluator::new()
            .with_sink(Arc::new(MemorySink::new()))
            .on_evaluating(move |_, _, _| {
                a.fetch_add(1, Ordering::SeqCst);
            })
            .on_evaluated(move |_, _, _| {
                b.fetch_add(1, Ordering::SeqCst);
            })
            .on_applied(move |_, _, _, _| {
                c.fetch_add(1, Ordering::SeqCst);
            });

        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let rules = gen.build(&log);
        evaluator.evaluate(&rules, &mut ctx(), stop);

        let expected = gen.expected(stop);
        let conditions = expected.events.iter().filter(|e| matches!(e, Event::Condition(_))).count();
        let actions = expected.events.len() - conditions;
        let failed_condition = expected.events.iter().any(|e| {
            matches!(*e, Event::Condition(i) if gen.rules[i].condition == GenCondition::Fails)
        });
        let failed_action = expected.events.iter().any(|e| {
            matches!(*e, Event::Action(i, j) if gen.rules[i].actions[j] == GenAction::Fails)
        });

        prop_assert_eq!(evaluating.load(Ordering::SeqCst), conditions);
        prop_assert_eq!(
            evaluated.load(Ordering::SeqCst),
            conditions - usize::from(failed_condition)
        );
        prop_assert_eq!(applied.load(Ordering::SeqCst), actions - usize::from(failed_action));
    }
}
