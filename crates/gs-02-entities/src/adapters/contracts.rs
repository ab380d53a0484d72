//! Fixed contract registry for name and address resolution.

use crate::ports::outbound::ContractResolver;
use shared_types::Address;

#[derive(Debug, Clone)]
struct Deployment {
    name: String,
    version: Option<String>,
    address: Address,
}

/// Contracts known up front, as a deployment migration would list them.
#[derive(Debug, Clone, Default)]
pub struct StaticContracts {
    deployments: Vec<Deployment>,
}

impl StaticContracts {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_contract(mut self, name: &str, version: Option<&str>, address: Address) -> Self {
        self.deployments.push(Deployment {
            name: name.to_string(),
            version: version.map(str::to_string),
            address,
        });
        self
    }
}

impl ContractResolver for StaticContracts {
    fn contract_name(&self, address: &Address) -> Option<String> {
        self.deployments
            .iter()
            .find(|d| &d.address == address)
            .map(|d| d.name.clone())
    }

    /// Without a version the most recently registered deployment wins.
    fn contract_address(&self, name: &str, version: Option<&str>) -> Option<Address> {
        self.deployments
            .iter()
            .rev()
            .find(|d| d.name == name && (version.is_none() || d.version.as_deref() == version))
            .map(|d| d.address.clone())
    }
}
