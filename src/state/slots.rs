// Input boxes of a number-input step
use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Answer, MissingNumbers};

/// Dial neighbours, with 12 and 1 adjacent.
fn adjacent(a: u8, b: u8) -> bool {
    matches!(a.abs_diff(b), 1 | 11)
}

/// Draws the blank numbers for a step. Candidates are shuffled and taken
/// greedily, so fewer than `count` come back when the anchors leave no
/// room. The result is sorted.
pub fn pick_missing<R: Rng + ?Sized>(missing: &MissingNumbers, rng: &mut R) -> Vec<u8> {
    let mut candidates: Vec<u8> = (1..=12).filter(|n| !missing.anchors.contains(n)).collect();
    candidates.shuffle(rng);
    let mut picked: Vec<u8> = Vec::with_capacity(missing.count);
    for n in candidates {
        if picked.len() == missing.count {
            break;
        }
        if !picked.iter().any(|&p| adjacent(p, n)) {
            picked.push(n);
        }
    }
    picked.sort_unstable();
    picked
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotEntry {
    slots: Vec<u8>,
    values: BTreeMap<u8, u8>,
    verdicts: BTreeMap<u8, bool>,
    selected: Option<u8>,
    /// Next digit replaces the value instead of extending it.
    fresh: bool,
}

impl SlotEntry {
    pub fn new(slots: &[u8]) -> Self {
        let mut slots = slots.to_vec();
        slots.sort_unstable();
        slots.dedup();
        Self { slots, ..Default::default() }
    }

    pub fn slots(&self) -> &[u8] {
        &self.slots
    }

    pub fn value(&self, slot: u8) -> Option<u8> {
        self.values.get(&slot).copied()
    }

    pub fn verdict(&self, slot: u8) -> Option<bool> {
        self.verdicts.get(&slot).copied()
    }

    pub fn selected(&self) -> Option<u8> {
        self.selected
    }

    pub fn select(&mut self, slot: u8) -> bool {
        if !self.slots.contains(&slot) {
            return false;
        }
        self.selected = Some(slot);
        self.fresh = true;
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Puts a whole number (keypad button) into the selected slot.
    pub fn enter(&mut self, value: u8) -> Option<u8> {
        let slot = self.selected?;
        if !(1..=12).contains(&value) {
            return None;
        }
        self.values.insert(slot, value);
        self.verdicts.remove(&slot);
        self.fresh = false;
        Some(slot)
    }

    /// Keyboard digit: `1` followed by `0`..`2` in the same selection forms
    /// 10 to 12.
    pub fn push_digit(&mut self, digit: u8) -> Option<u8> {
        let slot = self.selected?;
        let value = match (self.fresh, self.values.get(&slot)) {
            (false, Some(1)) if digit <= 2 => 10 + digit,
            _ => digit,
        };
        self.enter(value)
    }

    pub fn clear_selected(&mut self) -> Option<u8> {
        let slot = self.selected?;
        self.values.remove(&slot);
        self.verdicts.remove(&slot);
        self.fresh = true;
        Some(slot)
    }

    /// The current entries as a candidate answer. Empty slots are left out,
    /// so an incomplete entry never equals the expected map.
    pub fn answer(&self) -> Answer {
        Answer::Slots(self.values.clone())
    }

    /// Colours each filled slot against the expected values.
    pub fn mark(&mut self, expected: &BTreeMap<u8, u8>) {
        self.verdicts = self
            .values
            .iter()
            .map(|(slot, v)| (*slot, expected.get(slot) == Some(v)))
            .collect();
    }

    /// Counting hint for a slot, based on which neighbours are visible.
    pub fn hint(&self, slot: u8) -> String {
        let prev = if slot == 1 { 12 } else { slot - 1 };
        let next = if slot == 12 { 1 } else { slot + 1 };
        let blank = |n: u8| self.slots.contains(&n);
        match (blank(prev), blank(next)) {
            (false, false) => format!("What number comes between {prev} and {next}?"),
            (false, true) => format!("What number comes after {prev}?"),
            (true, false) => format!("What number comes before {next}?"),
            (true, true) => "Count around the clock starting from 12.".to_string(),
        }
    }
}
