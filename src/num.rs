use alloy::primitives::U256;
use fastnum::{
    UD128, bint,
    decimal::{Context, RoundingMode, UnsignedDecimal},
};

/// Converter between base units (wei) and gwei.
pub const GWEI: Converter = Converter::new(9);

/// Fixed-point to decimal converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("invalid decimal amount: {0:?}")]
    Invalid(String),

    #[error("amount {0:?} has more than {1} fractional digits")]
    TooPrecise(String, i32),

    #[error("amount {0:?} does not fit into 128 bits")]
    Overflow(String),
}

impl Converter {
    pub const fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    pub fn decimals(&self) -> i32 {
        self.decimals
    }

    pub fn from_unsigned<const N: usize>(&self, value: U256) -> UnsignedDecimal<N> {
        let unscaled = bint::UInt::<N>::from_le_slice(value.as_le_slice())
            .expect("Converter: U256 -> UInt::<N>");
        UnsignedDecimal::<N>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    pub fn to_unsigned<const N: usize>(&self, value: UnsignedDecimal<N>) -> U256 {
        let rescaled = value.rescale(self.decimals as i16);
        U256::from_le_slice(rescaled.digits().to_radix_le(256).as_slice())
    }

    /// Parses a decimal string denominated in this converter's unit
    /// (e.g. `"20.5"` gwei) into base units.
    ///
    /// Amounts finer than one base unit are rejected rather than rounded.
    pub fn parse(&self, value: &str) -> Result<u128, UnitsError> {
        let decimal = UD128::from_str(value.trim(), Context::default())
            .map_err(|_| UnitsError::Invalid(value.to_string()))?;
        let base = self.to_unsigned(decimal);
        if self.from_unsigned::<2>(base) != decimal {
            return Err(UnitsError::TooPrecise(value.to_string(), self.decimals));
        }
        u128::try_from(base).map_err(|_| UnitsError::Overflow(value.to_string()))
    }

    /// Base units as a decimal in this converter's unit, for display.
    pub fn format(&self, value: u128) -> UD128 {
        self.from_unsigned(U256::from(value))
    }
}
