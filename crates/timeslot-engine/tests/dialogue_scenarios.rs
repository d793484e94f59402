use chrono::Duration;

use timeslot_engine::{
    parse_duration, parse_partial, prune, Comparison, DurationBound, Fuzzy, Inclusion,
    IntersectOptions, IntervalKind, PartialDateTime, PartialInterval, PruneOptions,
    SlotConstraint, SlotField, Strictness, TemporalError, TimeSlotPruner, Turn,
};

// ── Helpers ──────────────────────────────────────────────────

fn p(s: &str) -> PartialDateTime {
    parse_partial(s).unwrap()
}

fn range(a: &str, b: &str) -> PartialInterval {
    PartialInterval::range(p(a), p(b), Inclusion::Closed).unwrap()
}

fn duration(s: &str, cmp: Comparison) -> SlotConstraint {
    SlotConstraint::Duration(DurationBound::new(parse_duration(s).unwrap(), cmp).unwrap())
}

// ── Partial date-time ordering ───────────────────────────────

#[test]
fn test_month_only_values_order_by_month() {
    let june = p("June");
    let july = p("July");
    assert_eq!(
        june.fuzzy_less_than(&july, Some(Strictness::SymmetricMissing)),
        Fuzzy::True
    );
    assert!(june.is_before(&july));
    assert!(!july.is_before(&june));
}

#[test]
fn test_hour_and_weekday_are_incomparable() {
    let nine = PartialDateTime::new().with_hour(9);
    let wednesday = p("Wednesday");
    assert!(!nine.comparable(&wednesday, Strictness::SharedField));
    assert_eq!(nine.fuzzy_less_than(&wednesday, None), Fuzzy::Maybe);
    assert!(wednesday.fuzzy_less_than(&nine, None).is_maybe());
    assert!(!nine.is_before(&wednesday));
    assert!(!wednesday.is_before(&nine));
}

#[test]
fn test_complete_value_against_partial_constraint() {
    let meeting = p("2020-12-05 9:30am");
    assert!(meeting.is_complete());
    assert!(meeting.is_before(&p("December 6th")));
    assert!(meeting.is_after(&p("9am")));
    assert_eq!(meeting.weekday(), Some(6));
}

#[test]
fn test_invalid_values_are_reported() {
    let err = PartialDateTime::new().with_month(13).validated().unwrap_err();
    assert!(matches!(err, TemporalError::InvalidTemporalValue(_)));

    let err = parse_partial("1999").unwrap_err();
    assert!(matches!(err, TemporalError::InvalidTemporalValue(_)));
}

// ── Intervals ────────────────────────────────────────────────

#[test]
fn test_office_hours_and_monday_do_not_intersect() {
    let office = range("9am", "5pm");
    let monday = range("Monday", "Monday");
    assert!(!office.intersect(&monday, IntersectOptions::default()));
    assert!(office.compatible(&monday, false, false, None));
}

#[test]
fn test_time_ranges_intersect_to_overlap() {
    let office = range("9am", "5pm");
    let afternoon = range("noon", "8pm");
    assert!(office.intersect(&afternoon, IntersectOptions::default()));

    let overlap = office.intersection(&afternoon, false).unwrap();
    assert_eq!(overlap.start(), &p("noon"));
    assert_eq!(overlap.end(), &p("5pm"));
    assert_eq!(overlap.length(), Some(Duration::hours(5)));
}

#[test]
fn test_reversed_range_is_reordered() {
    let weekdays = range("Thursday", "Monday");
    assert_eq!(weekdays.start(), &p("Monday"));
    assert!(weekdays.start().is_at_or_before(weekdays.end()));
}

#[test]
fn test_interval_is_never_compatible_with_its_negation() {
    for interval in [
        range("9am", "5pm"),
        PartialInterval::point(p("noon")).unwrap(),
        PartialInterval::ray(Comparison::Lt, p("10am"), None).unwrap(),
        PartialInterval::ray(Comparison::Ge, p("December 1st"), None).unwrap(),
    ] {
        assert!(
            !interval.compatible(&interval.negate(), false, false, None),
            "{interval} compatible with its negation"
        );
    }
}

#[test]
fn test_negation_follows_kind_table() {
    let before_ten = PartialInterval::ray(Comparison::Lt, p("10am"), None).unwrap();
    assert_eq!(before_ten.negated_kind(), IntervalKind::Ge);
    assert_eq!(before_ten.negate().kind(), IntervalKind::Ge);
}

// ── Pruning ──────────────────────────────────────────────────

#[test]
fn test_later_range_replaces_overlapping_bound() {
    let evicted = prune(
        vec![
            Turn::Constraints(vec![SlotConstraint::Bound(range("9am", "5pm"))]),
            Turn::Constraints(vec![SlotConstraint::Bound(range("1pm", "3pm"))]),
        ],
        PruneOptions::default(),
    );
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].created_turn, 1);
}

#[test]
fn test_whole_day_bound_outlasts_short_meeting() {
    let evicted = prune(
        vec![
            Turn::Constraints(vec![SlotConstraint::Bound(range("January 5th", "January 5th"))]),
            Turn::Constraints(vec![duration("30m", Comparison::Eq)]),
            Turn::Constraints(vec![SlotConstraint::Start(
                PartialInterval::ray(Comparison::NotEq, p("4pm"), None).unwrap(),
            )]),
        ],
        PruneOptions::default(),
    );
    assert!(evicted.is_empty(), "evicted {evicted:?}");
}

#[test]
fn test_end_before_earlier_start_evicts_start() {
    let from_jan_5 = PartialInterval::ray(Comparison::Ge, p("January 5th"), None).unwrap();
    let until_jan_3 = PartialInterval::ray(Comparison::Le, p("January 3rd"), None).unwrap();

    let mut pruner = TimeSlotPruner::new(PruneOptions::default());
    let start = pruner.process_turn(Turn::Constraints(vec![SlotConstraint::Start(from_jan_5)]));
    let end = pruner.process_turn(Turn::Constraints(vec![SlotConstraint::End(until_jan_3)]));

    let evicted = pruner.take_evictions();
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].id, start[0]);
    assert_eq!(pruner.active(SlotField::End)[0].id, end[0]);
    assert!(pruner.active(SlotField::Start).is_empty());
}

#[test]
fn test_short_window_evicts_older_duration() {
    let evicted = prune(
        vec![
            Turn::Constraints(vec![duration("30m", Comparison::Eq)]),
            Turn::Constraints(vec![
                SlotConstraint::Start(PartialInterval::point(p("9:00")).unwrap()),
                SlotConstraint::End(PartialInterval::point(p("9:15")).unwrap()),
            ]),
        ],
        PruneOptions::default(),
    );
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].field(), SlotField::Duration);
    assert_eq!(evicted[0].created_turn, 1);
}

#[test]
fn test_repeated_turn_touches_nothing_else() {
    let turns = vec![
        Turn::Constraints(vec![SlotConstraint::Bound(range("9am", "5pm"))]),
        Turn::Constraints(vec![duration("1h", Comparison::Le)]),
        Turn::Constraints(vec![SlotConstraint::Start(
            PartialInterval::ray(Comparison::Ge, p("10am"), None).unwrap(),
        )]),
    ];
    let mut pruner = TimeSlotPruner::default();
    for turn in turns.iter().cloned() {
        pruner.process_turn(turn);
    }
    assert!(pruner.pending_evictions().is_empty());

    pruner.process_turn(turns[2].clone());
    assert!(pruner.pending_evictions().is_empty());
    assert_eq!(pruner.active(SlotField::Start).len(), 2);
    assert_eq!(pruner.active(SlotField::Bound).len(), 1);
    assert_eq!(pruner.active(SlotField::Duration).len(), 1);
}

#[test]
fn test_disjunction_is_dropped_when_field_revisited() {
    let mut pruner = TimeSlotPruner::default();
    pruner.process_turn(Turn::AnyOf(vec![
        SlotConstraint::Start(PartialInterval::point(p("Monday")).unwrap()),
        SlotConstraint::Start(PartialInterval::point(p("Tuesday")).unwrap()),
    ]));
    assert_eq!(pruner.clusters().len(), 1);

    pruner.process_turn(Turn::Constraints(vec![SlotConstraint::Start(
        PartialInterval::point(p("Friday")).unwrap(),
    )]));
    assert_eq!(pruner.take_evictions().len(), 2);
    assert!(pruner.clusters().is_empty());
}

#[test]
fn test_options_load_from_json() {
    let opts = PruneOptions::from_json_str(r#"{ "min_overlap_minutes": 30 }"#).unwrap();
    let mut pruner = TimeSlotPruner::new(opts);
    pruner.process_turn(Turn::Constraints(vec![SlotConstraint::Start(
        PartialInterval::ray(Comparison::Ge, p("4:50pm"), None).unwrap(),
    )]));
    pruner.process_turn(Turn::Constraints(vec![SlotConstraint::Start(
        PartialInterval::ray(Comparison::Le, p("5pm"), None).unwrap(),
    )]));
    assert_eq!(pruner.pending_evictions().len(), 1);
}
