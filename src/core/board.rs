//! Board geometry: Ages and zone slots.
//!
//! The timeline has ten slots. Later Ages have more slots:
//!
//! | Age | Slots |
//! |-----|-------|
//! | I   | 0     |
//! | II  | 1-2   |
//! | III | 3-5   |
//! | IV  | 6-9   |

use serde::{Deserialize, Serialize};

/// Number of zone slots on the timeline.
pub const SLOT_COUNT: usize = 10;

/// One of the four game eras.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Age {
    I,
    II,
    III,
    IV,
}

impl Age {
    pub const ALL: [Age; 4] = [Age::I, Age::II, Age::III, Age::IV];

    /// Zero-based index into a score track.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Age::I => 0,
            Age::II => 1,
            Age::III => 2,
            Age::IV => 3,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Age> {
        Self::ALL.get(index).copied()
    }

    /// The Age before this one, if any.
    #[must_use]
    pub fn previous(self) -> Option<Age> {
        self.index().checked_sub(1).and_then(Age::from_index)
    }

    /// The Age a traveller moves into next. Age IV wraps to Age I.
    #[must_use]
    pub fn next_wrapping(self) -> Age {
        Age::ALL[(self.index() + 1) % Age::ALL.len()]
    }

    /// Slots belonging to this Age, in timeline order.
    #[must_use]
    pub fn slots(self) -> std::ops::RangeInclusive<u8> {
        match self {
            Age::I => 0..=0,
            Age::II => 1..=2,
            Age::III => 3..=5,
            Age::IV => 6..=9,
        }
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let numeral = match self {
            Age::I => "I",
            Age::II => "II",
            Age::III => "III",
            Age::IV => "IV",
        };
        write!(f, "Age {}", numeral)
    }
}

/// A zone slot on the timeline (0-9).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(pub u8);

impl Slot {
    /// Create a slot, returning `None` when out of range.
    #[must_use]
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < SLOT_COUNT).then_some(Self(index))
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.index() < SLOT_COUNT
    }

    /// The Age this slot belongs to.
    #[must_use]
    pub fn age(self) -> Age {
        match self.0 {
            0 => Age::I,
            1..=2 => Age::II,
            3..=5 => Age::III,
            _ => Age::IV,
        }
    }

    /// The next slot along the timeline, wrapping back to slot 0.
    #[must_use]
    pub fn forward(self) -> Slot {
        Slot(((self.index() + 1) % SLOT_COUNT) as u8)
    }

    /// All slots in timeline order.
    pub fn all() -> impl Iterator<Item = Slot> {
        (0..SLOT_COUNT as u8).map(Slot)
    }

    /// Slots a traveller standing here may visit: this slot, or any
    /// slot of the next Age.
    #[must_use]
    pub fn reachable(self) -> Vec<Slot> {
        let mut out = vec![self];
        out.extend(self.age().next_wrapping().slots().map(Slot));
        out
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_ages() {
        let ages: Vec<_> = Slot::all().map(Slot::age).collect();
        assert_eq!(
            ages,
            vec![
                Age::I,
                Age::II,
                Age::II,
                Age::III,
                Age::III,
                Age::III,
                Age::IV,
                Age::IV,
                Age::IV,
                Age::IV
            ]
        );
    }

    #[test]
    fn test_age_slots_cover_timeline() {
        let total: usize = Age::ALL.iter().map(|a| a.slots().count()).sum();
        assert_eq!(total, SLOT_COUNT);
        for age in Age::ALL {
            for s in age.slots() {
                assert_eq!(Slot(s).age(), age);
            }
        }
    }

    #[test]
    fn test_age_navigation() {
        assert_eq!(Age::I.previous(), None);
        assert_eq!(Age::III.previous(), Some(Age::II));
        assert_eq!(Age::IV.next_wrapping(), Age::I);
        assert_eq!(Age::from_index(4), None);
        assert_eq!(format!("{}", Age::III), "Age III");
    }

    #[test]
    fn test_reachable() {
        assert_eq!(Slot(0).reachable(), vec![Slot(0), Slot(1), Slot(2)]);
        assert_eq!(Slot(4).reachable(), vec![Slot(4), Slot(6), Slot(7), Slot(8), Slot(9)]);
        assert_eq!(Slot(9).reachable(), vec![Slot(9), Slot(0)]);
    }

    #[test]
    fn test_slot_bounds() {
        assert!(Slot::new(9).is_some());
        assert!(Slot::new(10).is_none());
        assert_eq!(Slot(9).forward(), Slot(0));
    }
}
