//! Embedded lesson content.
//!
//! The lesson ships as `assets/lesson.json`. It is parsed once at start-up
//! and checked so the session can index steps and checks without further
//! validation.

use std::collections::BTreeSet;

use log::info;

use crate::error::ContentError;
use crate::model::{Answer, InteractionKind, Lesson, LessonPage, LessonStep, PageId, PageMode};

const LESSON_JSON: &str = include_str!("../assets/lesson.json");

pub fn load_lesson() -> Result<Lesson, ContentError> {
    let lesson = parse_lesson(LESSON_JSON)?;
    info!(
        "lesson '{}' loaded: {} pages, {} steps",
        lesson.title,
        lesson.pages.len(),
        lesson.pages.iter().map(|p| p.steps.len()).sum::<usize>()
    );
    Ok(lesson)
}

pub fn parse_lesson(raw: &str) -> Result<Lesson, ContentError> {
    let lesson: Lesson = serde_json::from_str(raw)?;
    validate(&lesson)?;
    Ok(lesson)
}

fn page_name(id: PageId) -> String {
    format!("{id:?}")
}

pub fn validate(lesson: &Lesson) -> Result<(), ContentError> {
    for id in PageId::ORDER {
        let count = lesson.pages.iter().filter(|p| p.id == id).count();
        if count != 1 {
            return Err(ContentError::invalid(
                page_name(id),
                None,
                format!("expected exactly one page, found {count}"),
            ));
        }
    }
    lesson.pages.iter().try_for_each(validate_page)
}

fn validate_page(page: &LessonPage) -> Result<(), ContentError> {
    let name = page_name(page.id);
    if page.steps.is_empty() {
        return Err(ContentError::invalid(name, None, "page has no steps"));
    }
    let mut ids = BTreeSet::new();
    for step in &page.steps {
        if !ids.insert(step.id.as_str()) {
            return Err(ContentError::invalid(&name, Some(step.id.as_str()), "duplicate step id"));
        }
        validate_step(step).map_err(|reason| ContentError::invalid(&name, Some(step.id.as_str()), reason))?;
    }
    if let PageMode::Assessment { pass_threshold, .. } = page.mode {
        if pass_threshold == 0 || pass_threshold > page.steps.len() {
            return Err(ContentError::invalid(
                name,
                None,
                format!("pass threshold {pass_threshold} outside 1..={}", page.steps.len()),
            ));
        }
        if let Some(step) = page.steps.iter().find(|s| s.checks.len() != 1) {
            return Err(ContentError::invalid(
                name,
                Some(step.id.as_str()),
                "assessment questions need exactly one check",
            ));
        }
    }
    Ok(())
}

fn validate_step(step: &LessonStep) -> Result<(), String> {
    let clock = &step.clock;
    if clock.hour > 23 || clock.minute > 59 {
        return Err(format!("invalid clock time {}:{:02}", clock.hour, clock.minute));
    }
    if let Some(n) = clock.blank_numbers.iter().find(|n| !(1..=12).contains(*n)) {
        return Err(format!("blank number {n} is not on the dial"));
    }
    if let Some(missing) = &clock.missing {
        if step.kind != InteractionKind::NumberInput {
            return Err("random blanks need a number-input step".into());
        }
        if !clock.blank_numbers.is_empty() {
            return Err("random blanks replace blank_numbers; give only one".into());
        }
        if let Some(n) = missing.anchors.iter().find(|n| !(1..=12).contains(*n)) {
            return Err(format!("anchor {n} is not on the dial"));
        }
        if missing.count == 0 || missing.count > 12 - missing.anchors.len() {
            return Err(format!("cannot hide {} numbers around {} anchors", missing.count, missing.anchors.len()));
        }
    }
    if (step.kind == InteractionKind::AnimationOnly) != step.checks.is_empty() {
        return Err("only animation steps may omit checks".into());
    }
    for check in &step.checks {
        if !check.expected.fits(step.kind) {
            return Err(format!("{:?} answer does not fit a {:?} step", check.expected, step.kind));
        }
        match &check.expected {
            Answer::Number(n) => {
                if !(1..=12).contains(n) || !clock.numbers || clock.is_blank(*n) {
                    return Err(format!("number {n} is not visible on the clock"));
                }
            }
            Answer::Hand(h) if !clock.shows_hand(*h) => {
                return Err(format!("{} is hidden", h.label()));
            }
            Answer::Direction(d) if !clock.arrows.is_empty() && !clock.arrows.contains(d) => {
                return Err(format!("no {} arrow is drawn", d.label()));
            }
            Answer::Choice(id) => {
                if step.choices.len() < 2 {
                    return Err("multiple choice needs at least two choices".into());
                }
                if !step.choices.iter().any(|c| &c.id == id) {
                    return Err(format!("answer '{id}' is not one of the choices"));
                }
            }
            Answer::Slots(slots) if clock.missing.is_some() => {
                if !slots.is_empty() {
                    return Err("random blanks are answered by their own numbers; leave the slots empty".into());
                }
            }
            Answer::Slots(slots) => {
                let blanks: BTreeSet<u8> = clock.blank_numbers.iter().copied().collect();
                let keys: BTreeSet<u8> = slots.keys().copied().collect();
                if blanks.is_empty() || blanks != keys {
                    return Err("input slots must match the blank numbers".into());
                }
                if slots.values().any(|v| !(1..=12).contains(v)) {
                    return Err("slot values must be 1 to 12".into());
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Hand;

    #[test]
    fn shipped_lesson_is_valid() {
        let lesson = load_lesson().unwrap();
        assert_eq!(lesson.pages.len(), PageId::ORDER.len());
        let show_it = lesson.page(PageId::ShowIt).unwrap();
        assert_eq!(show_it.steps.len(), 4);
        assert!(matches!(show_it.mode, PageMode::Assessment { pass_threshold: 3, .. }));
        assert_eq!(lesson.page(PageId::DoIt).unwrap().steps.len(), 8);
        let learn = lesson.page(PageId::LearnIt).unwrap();
        assert!(learn.steps.iter().any(|s| s.is_multi_part()));
        assert!(lesson.glossary.iter().any(|t| t.term == "Clockwise"));
        let warm_up = lesson.page(PageId::WarmUp).unwrap();
        assert!(warm_up.steps.iter().any(|s| s.clock.missing.is_some()));
    }

    fn lesson_with_step(step: serde_json::Value) -> String {
        let mut lesson: serde_json::Value = serde_json::from_str(LESSON_JSON).unwrap();
        lesson["pages"][1]["steps"] = serde_json::json!([step]);
        lesson.to_string()
    }

    fn expect_invalid(step: serde_json::Value, needle: &str) {
        match parse_lesson(&lesson_with_step(step)) {
            Err(ContentError::Invalid { reason, .. }) => assert!(reason.contains(needle), "{reason}"),
            other => panic!("expected invalid content, got {other:?}"),
        }
    }

    #[test]
    fn answer_must_fit_kind() {
        expect_invalid(
            serde_json::json!({
                "id": "x", "title": "", "instruction": "", "kind": "click-hand",
                "checks": [{ "prompt": "", "expected": { "type": "number", "value": 3 } }]
            }),
            "does not fit",
        );
    }

    #[test]
    fn slots_must_match_blanks() {
        expect_invalid(
            serde_json::json!({
                "id": "x", "title": "", "instruction": "", "kind": "number-input",
                "clock": { "blank_numbers": [2, 5] },
                "checks": [{ "prompt": "", "expected": { "type": "slots", "value": { "2": 2 } } }]
            }),
            "blank numbers",
        );
    }

    #[test]
    fn hidden_hand_cannot_be_the_answer() {
        expect_invalid(
            serde_json::json!({
                "id": "x", "title": "", "instruction": "", "kind": "click-hand",
                "clock": { "hands": ["hour"] },
                "checks": [{ "prompt": "", "expected": { "type": "hand", "value": "minute" } }]
            }),
            Hand::Minute.label(),
        );
    }

    #[test]
    fn random_blanks_need_room_around_the_anchors() {
        expect_invalid(
            serde_json::json!({
                "id": "x", "title": "", "instruction": "", "kind": "number-input",
                "clock": { "missing": { "anchors": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10], "count": 3 } },
                "checks": [{ "prompt": "", "expected": { "type": "slots", "value": {} } }]
            }),
            "cannot hide",
        );
    }

    #[test]
    fn random_blanks_only_on_number_input() {
        expect_invalid(
            serde_json::json!({
                "id": "x", "title": "", "instruction": "", "kind": "click-target",
                "clock": { "missing": { "anchors": [12], "count": 2 } },
                "checks": [{ "prompt": "", "expected": { "type": "number", "value": 3 } }]
            }),
            "number-input",
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_lesson("{"), Err(ContentError::Parse(_))));
    }
}
