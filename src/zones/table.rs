//! Slot → definition table with hourglasses and a rebind audit trail.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::definition::{ZoneDefId, ZoneRegistry};
use crate::core::{Slot, SLOT_COUNT};
use crate::error::{EngineError, Result};

/// Why a slot changed definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebindReason {
    /// A simulated zone reached its threshold.
    BecameReal,
    /// A "change history" effect flipped the slot.
    ChangedHistory,
}

/// One entry of the rebind audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebindRecord {
    pub slot: Slot,
    pub from: ZoneDefId,
    pub to: ZoneDefId,
    pub reason: RebindReason,
    pub turn: u32,
}

/// Exactly one definition per slot, plus one hourglass per slot.
///
/// The binding of a slot only changes through [`ZoneTable::rebind`], which
/// checks the new definition and appends to the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneTable {
    bindings: [ZoneDefId; SLOT_COUNT],
    hourglass: [u8; SLOT_COUNT],
    rebinds: Vector<RebindRecord>,
}

impl ZoneTable {
    #[must_use]
    pub fn new(bindings: [ZoneDefId; SLOT_COUNT]) -> Self {
        Self {
            bindings,
            hourglass: [0; SLOT_COUNT],
            rebinds: Vector::new(),
        }
    }

    #[must_use]
    pub fn binding(&self, slot: Slot) -> ZoneDefId {
        self.bindings[slot.index()]
    }

    #[must_use]
    pub fn bindings(&self) -> &[ZoneDefId; SLOT_COUNT] {
        &self.bindings
    }

    #[must_use]
    pub fn hourglass(&self, slot: Slot) -> u8 {
        self.hourglass[slot.index()]
    }

    pub(crate) fn set_hourglass(&mut self, slot: Slot, value: u8) {
        self.hourglass[slot.index()] = value;
    }

    /// Increment the slot's hourglass, returning the new value.
    pub(crate) fn tick(&mut self, slot: Slot) -> u8 {
        let value = &mut self.hourglass[slot.index()];
        *value = value.saturating_add(1);
        *value
    }

    pub(crate) fn reset(&mut self, slot: Slot) {
        self.hourglass[slot.index()] = 0;
    }

    /// Bind `slot` to `to`. The new definition must exist and belong to
    /// the slot's Age. Resets the slot's hourglass.
    pub(crate) fn rebind(
        &mut self,
        registry: &ZoneRegistry,
        slot: Slot,
        to: ZoneDefId,
        reason: RebindReason,
        turn: u32,
    ) -> Result<()> {
        let def = registry.require(to)?;
        if def.age != slot.age() {
            return Err(EngineError::script(format!(
                "cannot bind {} ({}) to {} ({})",
                def.name,
                def.age,
                slot,
                slot.age()
            )));
        }
        let from = self.bindings[slot.index()];
        self.bindings[slot.index()] = to;
        self.hourglass[slot.index()] = 0;
        self.rebinds.push_back(RebindRecord {
            slot,
            from,
            to,
            reason,
            turn,
        });
        Ok(())
    }

    /// Audit trail, oldest first.
    #[must_use]
    pub fn rebinds(&self) -> &Vector<RebindRecord> {
        &self.rebinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Age;
    use crate::zones::ZoneDefinition;

    fn registry() -> ZoneRegistry {
        let mut r = ZoneRegistry::new();
        r.register(ZoneDefinition::new(ZoneDefId::new(0), "Soup", Age::I)).unwrap();
        r.register(ZoneDefinition::new(ZoneDefId::new(1), "Campfire", Age::I)).unwrap();
        r.register(ZoneDefinition::new(ZoneDefId::new(2), "Forge", Age::II)).unwrap();
        r
    }

    #[test]
    fn test_rebind_records_and_resets() {
        let registry = registry();
        let mut table = ZoneTable::new([ZoneDefId::new(0); SLOT_COUNT]);
        table.tick(Slot(0));
        table.tick(Slot(0));
        assert_eq!(table.hourglass(Slot(0)), 2);

        table
            .rebind(&registry, Slot(0), ZoneDefId::new(1), RebindReason::ChangedHistory, 3)
            .unwrap();
        assert_eq!(table.binding(Slot(0)), ZoneDefId::new(1));
        assert_eq!(table.hourglass(Slot(0)), 0);
        assert_eq!(
            table.rebinds()[0],
            RebindRecord {
                slot: Slot(0),
                from: ZoneDefId::new(0),
                to: ZoneDefId::new(1),
                reason: RebindReason::ChangedHistory,
                turn: 3,
            }
        );
    }

    #[test]
    fn test_rebind_rejects_wrong_age() {
        let registry = registry();
        let mut table = ZoneTable::new([ZoneDefId::new(0); SLOT_COUNT]);
        let before = table.clone();
        assert!(table
            .rebind(&registry, Slot(0), ZoneDefId::new(2), RebindReason::BecameReal, 1)
            .is_err());
        assert!(table
            .rebind(&registry, Slot(0), ZoneDefId::new(9), RebindReason::BecameReal, 1)
            .is_err());
        assert_eq!(table, before);
    }
}
