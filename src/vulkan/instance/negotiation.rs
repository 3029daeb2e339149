use {
    super::InstanceError,
    crate::{
        logging::PrettyList,
        vulkan::{
            ContributesExtensionRequirements, ContributesLayerRequirements,
            Feature, InstanceDriver, Requirement, RequirementLedger,
        },
    },
    std::cell::Cell,
};

/// Owns the right to run one instance negotiation at a time.
///
/// A scope replaces process-wide negotiation state. Create one during
/// application setup and pass it to whatever needs to negotiate.
#[derive(Debug)]
pub struct NegotiationScope {
    name: String,
    is_active: Cell<bool>,
}

impl NegotiationScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: Cell::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active.get()
    }

    /// Start a negotiation. Fails if another negotiation from this scope is
    /// still alive.
    pub fn begin(&self) -> Result<Negotiation<'_>, InstanceError> {
        if self.is_active.replace(true) {
            return Err(InstanceError::NegotiationAlreadyActive(
                self.name.clone(),
            ));
        }
        Ok(Negotiation {
            scope: self,
            extensions: RequirementLedger::new("extension"),
            layers: RequirementLedger::new("layer"),
        })
    }
}

/// The names which survived negotiation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledNames {
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
}

/// A live negotiation. Releases its scope when dropped.
#[derive(Debug)]
pub struct Negotiation<'scope> {
    scope: &'scope NegotiationScope,
    extensions: RequirementLedger,
    layers: RequirementLedger,
}

impl<'scope> Negotiation<'scope> {
    /// Observe every extension and layer the driver makes available.
    pub fn observe_available(
        &mut self,
        driver: &dyn InstanceDriver,
    ) -> Result<(), InstanceError> {
        let extensions = driver
            .enumerate_instance_extensions()
            .map_err(InstanceError::UnableToListAvailableCapabilities)?;
        let layers = driver
            .enumerate_instance_layers()
            .map_err(InstanceError::UnableToListAvailableCapabilities)?;

        log::debug!(
            "Available instance extensions {:#?}",
            PrettyList(&extensions)
        );
        log::debug!("Available instance layers {:#?}", PrettyList(&layers));

        for name in &extensions {
            self.extensions.observe(name);
        }
        for name in &layers {
            self.layers.observe(name);
        }
        Ok(())
    }

    /// Let each feature vote, in declaration order.
    pub fn apply(&mut self, features: &[Feature]) -> Result<(), InstanceError> {
        for feature in features {
            feature.contribute_extensions(&mut self.extensions)?;
            feature.contribute_layers(&mut self.layers)?;
        }
        Ok(())
    }

    pub fn extensions(&self) -> &RequirementLedger {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut RequirementLedger {
        &mut self.extensions
    }

    pub fn layers(&self) -> &RequirementLedger {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut RequirementLedger {
        &mut self.layers
    }

    pub fn lock(&mut self) {
        self.extensions.lock();
        self.layers.lock();
    }

    /// The final enable lists.
    ///
    /// Required names which the driver never reported are an error. Desired
    /// names which the driver never reported are dropped with a warning.
    pub fn enabled_names(&self) -> Result<EnabledNames, InstanceError> {
        let (extensions, missing_extensions) = available(&self.extensions)?;
        if !missing_extensions.is_empty() {
            return Err(InstanceError::RequiredExtensionsNotFound(
                missing_extensions,
            ));
        }

        let (layers, missing_layers) = available(&self.layers)?;
        if !missing_layers.is_empty() {
            return Err(InstanceError::RequiredLayersNotFound(missing_layers));
        }

        Ok(EnabledNames { extensions, layers })
    }
}

impl Drop for Negotiation<'_> {
    fn drop(&mut self) {
        self.scope.is_active.set(false);
    }
}

/// Split the final set into names the driver has and required names it
/// does not.
fn available(
    ledger: &RequirementLedger,
) -> Result<(Vec<String>, Vec<String>), InstanceError> {
    let mut enabled = vec![];
    let mut missing_required = vec![];
    for name in ledger.final_set()? {
        if ledger.is_observed(&name) {
            enabled.push(name);
        } else if ledger.requirement(&name) == Requirement::Required {
            missing_required.push(name);
        } else {
            log::warn!(
                "Desired {} {} is not available and will not be enabled",
                ledger.namespace(),
                name
            );
        }
    }
    Ok((enabled, missing_required))
}
