//! Gas fee profiles
//!
//! All fee math is unsigned 64-bit with checked intermediate steps: the
//! node-side schedules multiply large base fees by large multipliers, so an
//! overflow is a configuration error the builder refuses rather than wraps.

use phantasma_codec::SmallString;

use crate::Error;

/// The generic profile: `max_gas = base * multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeOptions {
    pub gas_fee_base: u64,
    pub fee_multiplier: u64,
}

impl Default for FeeOptions {
    fn default() -> Self {
        Self {
            gas_fee_base: 10_000,
            fee_multiplier: 1_000,
        }
    }
}

impl FeeOptions {
    pub fn new(gas_fee_base: u64, fee_multiplier: u64) -> Self {
        Self {
            gas_fee_base,
            fee_multiplier,
        }
    }

    pub fn max_gas(&self) -> Result<u64, Error> {
        self.gas_fee_base
            .checked_mul(self.fee_multiplier)
            .ok_or(Error::FeeOverflow)
    }
}

/// Token creation: short symbols are exponentially more expensive, the
/// symbol component halving per extra character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateTokenFeeOptions {
    pub gas_fee_base: u64,
    pub gas_fee_create_token_base: u64,
    pub gas_fee_create_token_symbol: u64,
    pub fee_multiplier: u64,
}

impl Default for CreateTokenFeeOptions {
    fn default() -> Self {
        Self {
            gas_fee_base: 10_000,
            gas_fee_create_token_base: 10_000_000_000,
            gas_fee_create_token_symbol: 10_000_000_000,
            fee_multiplier: 10_000,
        }
    }
}

impl CreateTokenFeeOptions {
    pub fn new(
        gas_fee_base: u64,
        gas_fee_create_token_base: u64,
        gas_fee_create_token_symbol: u64,
        fee_multiplier: u64,
    ) -> Self {
        Self {
            gas_fee_base,
            gas_fee_create_token_base,
            gas_fee_create_token_symbol,
            fee_multiplier,
        }
    }

    /// `(base + create_base + (symbol_fee >> (len - 1))) * multiplier`.
    pub fn max_gas(&self, symbol: &SmallString) -> Result<u64, Error> {
        let mut symbol_part = self.gas_fee_create_token_symbol;
        if !symbol.is_empty() {
            let shift = symbol.len() - 1;
            if shift < u64::BITS as usize {
                symbol_part >>= shift;
            }
        }
        self.gas_fee_base
            .checked_add(self.gas_fee_create_token_base)
            .and_then(|sum| sum.checked_add(symbol_part))
            .and_then(|sum| sum.checked_mul(self.fee_multiplier))
            .ok_or(Error::FeeOverflow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateSeriesFeeOptions {
    pub gas_fee_base: u64,
    pub gas_fee_create_series_base: u64,
    pub fee_multiplier: u64,
}

impl Default for CreateSeriesFeeOptions {
    fn default() -> Self {
        Self {
            gas_fee_base: 10_000,
            gas_fee_create_series_base: 2_500_000_000,
            fee_multiplier: 10_000,
        }
    }
}

impl CreateSeriesFeeOptions {
    pub fn new(gas_fee_base: u64, gas_fee_create_series_base: u64, fee_multiplier: u64) -> Self {
        Self {
            gas_fee_base,
            gas_fee_create_series_base,
            fee_multiplier,
        }
    }

    pub fn max_gas(&self) -> Result<u64, Error> {
        self.gas_fee_base
            .checked_add(self.gas_fee_create_series_base)
            .and_then(|sum| sum.checked_mul(self.fee_multiplier))
            .ok_or(Error::FeeOverflow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintNftFeeOptions {
    pub gas_fee_base: u64,
    pub fee_multiplier: u64,
}

impl Default for MintNftFeeOptions {
    fn default() -> Self {
        Self {
            gas_fee_base: 10_000,
            fee_multiplier: 1_000,
        }
    }
}

impl MintNftFeeOptions {
    pub fn new(gas_fee_base: u64, fee_multiplier: u64) -> Self {
        Self {
            gas_fee_base,
            fee_multiplier,
        }
    }

    pub fn max_gas(&self) -> Result<u64, Error> {
        self.gas_fee_base
            .checked_mul(self.fee_multiplier)
            .ok_or(Error::FeeOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn symbol(s: &str) -> SmallString {
        SmallString::new(s).unwrap()
    }

    #[quickcheck]
    fn generic_profile_agrees_with_checked_mul(base: u64, multiplier: u64) -> bool {
        let result = FeeOptions::new(base, multiplier).max_gas();
        match base.checked_mul(multiplier) {
            Some(expected) => result == Ok(expected),
            None => result == Err(Error::FeeOverflow),
        }
    }

    #[test]
    fn generic_profile() {
        assert_eq!(FeeOptions::default().max_gas().unwrap(), 10_000_000);
        assert_eq!(
            FeeOptions::new(u64::MAX, 2).max_gas().unwrap_err(),
            Error::FeeOverflow
        );
    }

    #[test]
    fn create_token_shifts_by_symbol_length() {
        let fees = CreateTokenFeeOptions::default();
        // 5-letter symbol: (10000 + 1e10 + (1e10 >> 4)) * 10000
        assert_eq!(
            fees.max_gas(&symbol("MYNFT")).unwrap(),
            (10_000u64 + 10_000_000_000 + (10_000_000_000 >> 4)) * 10_000
        );
        // a single letter pays the full symbol fee
        assert_eq!(
            fees.max_gas(&symbol("A")).unwrap(),
            (10_000u64 + 10_000_000_000 + 10_000_000_000) * 10_000
        );
        // beyond 64 characters the shift saturates and the fee stays whole
        let long = symbol(&"A".repeat(80));
        assert_eq!(
            fees.max_gas(&long).unwrap(),
            (10_000u64 + 10_000_000_000 + 10_000_000_000) * 10_000
        );
    }

    #[test]
    fn create_series_profile() {
        assert_eq!(
            CreateSeriesFeeOptions::default().max_gas().unwrap(),
            (10_000u64 + 2_500_000_000) * 10_000
        );
    }

    #[test]
    fn mint_nft_profile() {
        assert_eq!(MintNftFeeOptions::default().max_gas().unwrap(), 10_000_000);
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        let fees = CreateTokenFeeOptions::new(u64::MAX, 1, 0, 1);
        assert_eq!(fees.max_gas(&symbol("AB")).unwrap_err(), Error::FeeOverflow);
    }
}
