//! Vault protocol contract addresses on one chain.

use alloy::primitives::Address;

use crate::{Chain, error::GasError};

/// Source of the price data a product settles against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OracleDataSource {
    #[default]
    None,
    Pyth,
    Pendle,
}

/// Contract addresses of one protocol deployment.
///
/// The address manager and the treasury are always known. Oracle adapters
/// are only deployed on some chains; their accessors fail when the address
/// was never configured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    chain: Chain,
    address_manager: Address,
    treasury: Address,
    pyth_adapter: Option<Address>,
    pendle_adapter: Option<Address>,
}

impl Deployment {
    pub fn new(chain: Chain, address_manager: Address, treasury: Address) -> Self {
        Self {
            chain,
            address_manager,
            treasury,
            pyth_adapter: None,
            pendle_adapter: None,
        }
    }

    pub fn with_pyth_adapter(mut self, address: Address) -> Self {
        self.pyth_adapter = Some(address);
        self
    }

    pub fn with_pendle_adapter(mut self, address: Address) -> Self {
        self.pendle_adapter = Some(address);
        self
    }

    /// Points the deployment at a new address manager, e.g. after an upgrade.
    pub fn set_address_manager(&mut self, address: Address) {
        self.address_manager = address;
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn address_manager(&self) -> Address {
        self.address_manager
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn pyth_adapter(&self) -> Result<Address, GasError> {
        self.pyth_adapter
            .ok_or_else(|| GasError::config("pyth adapter address is not defined"))
    }

    pub fn pendle_adapter(&self) -> Result<Address, GasError> {
        self.pendle_adapter
            .ok_or_else(|| GasError::config("pendle adapter address is not defined"))
    }

    /// Adapter serving the given data source, `None` for
    /// [`OracleDataSource::None`].
    pub fn oracle_adapter(&self, source: OracleDataSource) -> Result<Option<Address>, GasError> {
        match source {
            OracleDataSource::None => Ok(None),
            OracleDataSource::Pyth => self.pyth_adapter().map(Some),
            OracleDataSource::Pendle => self.pendle_adapter().map(Some),
        }
    }
}
