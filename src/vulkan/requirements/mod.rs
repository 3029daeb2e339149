//! A ledger which merges many independent votes about optional, named
//! features into a single decision per name.
//!
//! There is one ledger for instance extensions and one for layers. Names are
//! observed from the driver, collaborators vote on them, then the ledger is
//! locked and the final set is read back to populate the driver's enable
//! list.

use {std::collections::BTreeMap, thiserror::Error};

/// A collaborator's vote about a named feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Requirement {
    #[default]
    DontCare,
    NotDesired,
    Desired,
    Required,
}

impl Requirement {
    /// True when a name at this tier should be passed to the driver.
    pub fn is_enabled(self) -> bool {
        matches!(self, Requirement::Desired | Requirement::Required)
    }

    /// Merge an incoming vote into this one.
    ///
    /// DontCare and Desired are soft, the incoming vote always wins.
    /// NotDesired and Required persist, and returns None when they are
    /// set against each other.
    pub fn merge(self, incoming: Requirement) -> Option<Requirement> {
        use Requirement::*;
        match (self, incoming) {
            (DontCare | Desired, _) => Some(incoming),
            (NotDesired, Required) | (Required, NotDesired) => None,
            (NotDesired | Required, _) => Some(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    #[error(
        "Unable to set {name} to {requested:?}, the {namespace} \
         configuration is already locked"
    )]
    Locked {
        namespace: &'static str,
        name: String,
        requested: Requirement,
    },

    #[error(
        "The {namespace} {name} cannot be both {existing:?} and {incoming:?}"
    )]
    Conflict {
        namespace: &'static str,
        name: String,
        existing: Requirement,
        incoming: Requirement,
    },

    #[error("The {namespace} configuration must be locked before it is read")]
    NotLocked { namespace: &'static str },
}

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    requirement: Requirement,
    is_observed: bool,
}

/// Tracks the requirement tier of every known name in one namespace.
#[derive(Debug, Clone)]
pub struct RequirementLedger {
    namespace: &'static str,
    entries: BTreeMap<String, Entry>,
    is_locked: bool,
}

// Public API
// ----------

impl RequirementLedger {
    /// Create an empty, unlocked ledger.
    ///
    /// # Params
    ///
    /// * `namespace` - names the kind of feature (e.g. "extension") in
    ///   error messages
    pub fn new(namespace: &'static str) -> Self {
        Self {
            namespace,
            entries: BTreeMap::new(),
            is_locked: false,
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Record that the driver reports the name as available.
    ///
    /// Does nothing once the ledger is locked.
    pub fn observe(&mut self, name: &str) {
        if self.is_locked {
            return;
        }
        self.entries.entry(name.to_owned()).or_default().is_observed = true;
    }

    /// Vote on a name. Unknown names are inserted at the requested tier.
    pub fn set_requirement(
        &mut self,
        name: &str,
        requirement: Requirement,
    ) -> Result<(), RequirementError> {
        if self.is_locked {
            return Err(RequirementError::Locked {
                namespace: self.namespace,
                name: name.to_owned(),
                requested: requirement,
            });
        }

        let namespace = self.namespace;
        let entry = self.entries.entry(name.to_owned()).or_default();
        let existing = entry.requirement;
        entry.requirement = existing.merge(requirement).ok_or_else(|| {
            RequirementError::Conflict {
                namespace,
                name: name.to_owned(),
                existing,
                incoming: requirement,
            }
        })?;

        log::trace!(
            "{} {}: {:?} + {:?} -> {:?}",
            namespace,
            name,
            existing,
            requirement,
            entry.requirement
        );
        Ok(())
    }

    /// Freeze the ledger. Calling it more than once is harmless.
    pub fn lock(&mut self) {
        self.is_locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// The current tier for a name, DontCare when the name is unknown.
    pub fn requirement(&self, name: &str) -> Requirement {
        self.entries
            .get(name)
            .map(|entry| entry.requirement)
            .unwrap_or_default()
    }

    pub fn is_observed(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .map(|entry| entry.is_observed)
            .unwrap_or(false)
    }

    /// True when the name's tier is Desired or Required.
    pub fn should_enable(&self, name: &str) -> bool {
        self.requirement(name).is_enabled()
    }

    /// Every name which should be enabled, in name order.
    pub fn final_set(&self) -> Result<Vec<String>, RequirementError> {
        if !self.is_locked {
            return Err(RequirementError::NotLocked {
                namespace: self.namespace,
            });
        }
        Ok(self
            .entries
            .iter()
            .filter(|(_, entry)| entry.requirement.is_enabled())
            .map(|(name, _)| name.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*, super::Requirement::*};

    const ALL: [Requirement; 4] = [DontCare, NotDesired, Desired, Required];

    fn any_requirement() -> impl Strategy<Value = Requirement> {
        prop::sample::select(ALL.to_vec())
    }

    fn expected_merge(
        existing: Requirement,
        incoming: Requirement,
    ) -> Option<Requirement> {
        match existing {
            DontCare | Desired => Some(incoming),
            NotDesired if incoming == Required => None,
            Required if incoming == NotDesired => None,
            _ => Some(existing),
        }
    }

    #[test]
    fn merge_table_is_total_except_for_conflicts() {
        for existing in ALL {
            for incoming in ALL {
                let mut ledger = RequirementLedger::new("extension");
                ledger.set_requirement("ext.x", existing).unwrap();

                let result = ledger.set_requirement("ext.x", incoming);

                match expected_merge(existing, incoming) {
                    Some(expected) => {
                        assert!(result.is_ok());
                        assert_eq!(ledger.requirement("ext.x"), expected);
                    }
                    None => {
                        assert!(matches!(
                            result,
                            Err(RequirementError::Conflict { .. })
                        ));
                        assert_eq!(ledger.requirement("ext.x"), existing);
                    }
                }
            }
        }
    }

    #[test]
    fn conflicts_are_symmetric() {
        let mut ledger = RequirementLedger::new("extension");
        ledger.set_requirement("a", Required).unwrap();
        assert!(ledger.set_requirement("a", NotDesired).is_err());

        ledger.set_requirement("b", NotDesired).unwrap();
        assert!(ledger.set_requirement("b", Required).is_err());
    }

    #[test]
    fn conflict_names_the_feature() {
        let mut ledger = RequirementLedger::new("extension");
        ledger.set_requirement("ext.x", NotDesired).unwrap();

        let err = ledger.set_requirement("ext.x", Required).unwrap_err();

        assert_eq!(
            err,
            RequirementError::Conflict {
                namespace: "extension",
                name: "ext.x".to_owned(),
                existing: NotDesired,
                incoming: Required,
            }
        );
        assert!(err.to_string().contains("ext.x"));
    }

    #[test]
    fn desired_then_required_is_enabled() {
        let mut ledger = RequirementLedger::new("extension");
        ledger.observe("ext.debug");
        ledger.set_requirement("ext.debug", Desired).unwrap();
        ledger.set_requirement("ext.debug", Required).unwrap();
        ledger.lock();

        assert!(ledger.should_enable("ext.debug"));
        assert_eq!(ledger.final_set().unwrap(), vec!["ext.debug"]);
    }

    #[test]
    fn observed_names_start_as_dont_care() {
        let mut ledger = RequirementLedger::new("layer");
        ledger.observe("VK_LAYER_test");

        assert!(ledger.is_observed("VK_LAYER_test"));
        assert_eq!(ledger.requirement("VK_LAYER_test"), DontCare);
        assert!(!ledger.should_enable("VK_LAYER_test"));
    }

    #[test]
    fn observing_keeps_existing_votes() {
        let mut ledger = RequirementLedger::new("extension");
        ledger.set_requirement("ext.a", Required).unwrap();
        ledger.observe("ext.a");

        assert_eq!(ledger.requirement("ext.a"), Required);
        assert!(ledger.is_observed("ext.a"));
    }

    #[test]
    fn unknown_names_are_never_enabled() {
        let ledger = RequirementLedger::new("extension");

        assert!(!ledger.should_enable("missing"));
        assert!(!ledger.is_observed("missing"));
        assert_eq!(ledger.requirement("missing"), DontCare);
    }

    #[test]
    fn observe_after_lock_is_ignored() {
        let mut ledger = RequirementLedger::new("extension");
        ledger.lock();
        ledger.observe("ext.late");

        assert!(!ledger.is_observed("ext.late"));
        assert!(ledger.final_set().unwrap().is_empty());
    }

    #[test]
    fn set_requirement_after_lock_fails() {
        let mut ledger = RequirementLedger::new("extension");
        ledger.observe("ext.a");
        ledger.lock();
        ledger.lock();

        let result = ledger.set_requirement("ext.a", Desired);

        assert!(matches!(result, Err(RequirementError::Locked { .. })));
        assert_eq!(ledger.requirement("ext.a"), DontCare);
    }

    #[test]
    fn final_set_requires_lock() {
        let ledger = RequirementLedger::new("layer");

        assert_eq!(
            ledger.final_set(),
            Err(RequirementError::NotLocked { namespace: "layer" })
        );
    }

    #[test]
    fn final_set_is_sorted_by_name() {
        let mut ledger = RequirementLedger::new("extension");
        for name in ["c", "a", "b", "d"] {
            ledger.observe(name);
        }
        ledger.set_requirement("c", Required).unwrap();
        ledger.set_requirement("a", Desired).unwrap();
        ledger.set_requirement("d", NotDesired).unwrap();
        ledger.lock();

        assert_eq!(ledger.final_set().unwrap(), vec!["a", "c"]);
    }

    proptest! {
        #[test]
        fn repeating_desired_is_idempotent(initial in any_requirement()) {
            let mut once = RequirementLedger::new("extension");
            let mut twice = RequirementLedger::new("extension");
            once.set_requirement("ext", initial).unwrap();
            twice.set_requirement("ext", initial).unwrap();

            once.set_requirement("ext", Desired).unwrap();
            twice.set_requirement("ext", Desired).unwrap();
            twice.set_requirement("ext", Desired).unwrap();

            prop_assert_eq!(once.requirement("ext"), twice.requirement("ext"));
        }

        #[test]
        fn sticky_tiers_survive_any_soft_vote(
            sticky in prop::sample::select(vec![NotDesired, Required]),
            votes in prop::collection::vec(
                prop::sample::select(vec![DontCare, Desired]),
                0..8,
            ),
        ) {
            let mut ledger = RequirementLedger::new("extension");
            ledger.set_requirement("ext", sticky).unwrap();
            for vote in votes {
                ledger.set_requirement("ext", vote).unwrap();
            }
            prop_assert_eq!(ledger.requirement("ext"), sticky);
        }
    }
}
