//! Zone definitions and their registry.
//!
//! A definition is what a slot *shows*: name, Age, script, and the
//! hourglass/alternate/real links used by rebinding. Definitions are
//! immutable; the [`ZoneTable`](super::ZoneTable) decides which one a
//! slot is bound to.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::Age;
use crate::effects::{EffectScript, Step};
use crate::error::{EngineError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneDefId(pub u16);

impl ZoneDefId {
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for ZoneDefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ZoneDef({})", self.0)
    }
}

/// Static zone definition.
///
/// ```
/// use temporum_engine::core::Age;
/// use temporum_engine::effects::Step;
/// use temporum_engine::zones::{ZoneDefId, ZoneDefinition};
///
/// let rift = ZoneDefinition::new(ZoneDefId::new(8), "Temporal Rift", Age::IV)
///     .with_script([Step::TickHourglass])
///     .with_hourglass(3)
///     .simulating(ZoneDefId::new(80));
///
/// assert!(rift.is_simulated());
/// assert_eq!(rift.hourglass_threshold, Some(3));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub id: ZoneDefId,
    pub name: String,
    pub age: Age,
    /// Runs for the visitor on every visit.
    pub script: EffectScript,
    pub hourglass_threshold: Option<u8>,
    /// What "change history" flips this zone to.
    pub alternate: Option<ZoneDefId>,
    /// Set on simulated zones: what "becomes real" rebinds to.
    pub real: Option<ZoneDefId>,
    /// How many players may keep a base here.
    pub base_capacity: u8,
    pub hq_allowed: bool,
}

impl ZoneDefinition {
    pub fn new(id: ZoneDefId, name: impl Into<String>, age: Age) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            script: EffectScript::default(),
            hourglass_threshold: None,
            alternate: None,
            real: None,
            base_capacity: 0,
            hq_allowed: false,
        }
    }

    #[must_use]
    pub fn with_script(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.script = EffectScript::new(steps);
        self
    }

    #[must_use]
    pub fn with_hourglass(mut self, threshold: u8) -> Self {
        self.hourglass_threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn with_alternate(mut self, alternate: ZoneDefId) -> Self {
        self.alternate = Some(alternate);
        self
    }

    /// Mark as a simulated zone that becomes `real`.
    #[must_use]
    pub fn simulating(mut self, real: ZoneDefId) -> Self {
        self.real = Some(real);
        self
    }

    #[must_use]
    pub fn with_bases(mut self, capacity: u8) -> Self {
        self.base_capacity = capacity;
        self
    }

    #[must_use]
    pub fn allow_hq(mut self) -> Self {
        self.hq_allowed = true;
        self
    }

    #[must_use]
    pub fn is_simulated(&self) -> bool {
        self.real.is_some()
    }
}

/// Registry of zone definitions.
#[derive(Clone, Debug, Default)]
pub struct ZoneRegistry {
    zones: FxHashMap<ZoneDefId, ZoneDefinition>,
}

impl ZoneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, zone: ZoneDefinition) -> Result<ZoneDefId> {
        if self.zones.contains_key(&zone.id) {
            return Err(EngineError::config(format!("{} already registered", zone.id)));
        }
        let id = zone.id;
        self.zones.insert(id, zone);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: ZoneDefId) -> Option<&ZoneDefinition> {
        self.zones.get(&id)
    }

    pub fn require(&self, id: ZoneDefId) -> Result<&ZoneDefinition> {
        self.get(id)
            .ok_or_else(|| EngineError::script(format!("unknown zone definition {}", id)))
    }

    #[must_use]
    pub fn contains(&self, id: ZoneDefId) -> bool {
        self.zones.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Check that every `alternate`/`real` link names a registered
    /// definition of the same Age.
    pub fn validate_links(&self) -> Result<()> {
        for zone in self.zones.values() {
            for target in [zone.alternate, zone.real].into_iter().flatten() {
                let linked = self.get(target).ok_or_else(|| {
                    EngineError::config(format!("{} links to unknown {}", zone.name, target))
                })?;
                if linked.age != zone.age {
                    return Err(EngineError::config(format!(
                        "{} ({}) links to {} ({})",
                        zone.name, zone.age, linked.name, linked.age
                    )));
                }
            }
        }
        Ok(())
    }
}
