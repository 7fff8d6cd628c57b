//! Contract call payload building
//!
//! Call data is the function name followed by `@`-separated hex arguments,
//! each in top-level encoding: unsigned integers as minimal big-endian bytes
//! (zero is the empty argument), strings as their UTF-8 bytes, addresses as
//! their 32 raw bytes.

use num_bigint::BigUint;
use std::fmt;

use crate::address::Address;

/// Builtin function that moves an NFT/SFT and optionally calls the receiver
pub const ESDT_NFT_TRANSFER: &str = "ESDTNFTTransfer";

/// Call data builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallData {
    function: String,
    args: Vec<String>,
}

impl CallData {
    /// Start a call to `function`
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument from raw bytes
    pub fn push_raw(mut self, bytes: &[u8]) -> Self {
        self.args.push(hex::encode(bytes));
        self
    }

    pub fn push_u64(self, value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        self.push_raw(&bytes[first..])
    }

    pub fn push_u8(self, value: u8) -> Self {
        self.push_u64(u64::from(value))
    }

    pub fn push_biguint(self, value: &BigUint) -> Self {
        if value.bits() == 0 {
            self.push_raw(&[])
        } else {
            self.push_raw(&value.to_bytes_be())
        }
    }

    pub fn push_str(self, value: &str) -> Self {
        self.push_raw(value.as_bytes())
    }

    pub fn push_address(self, address: &Address) -> Self {
        self.push_raw(address.as_bytes())
    }

    pub fn push_bool(self, value: bool) -> Self {
        if value {
            self.push_raw(&[1])
        } else {
            self.push_raw(&[])
        }
    }

    /// Wrap this call in an `ESDTNFTTransfer` that sends `amount` units of
    /// `token_id`/`nonce` to `receiver` and then invokes this function on it.
    pub fn esdt_nft_transfer(
        self,
        token_id: &str,
        nonce: u64,
        amount: &BigUint,
        receiver: &Address,
    ) -> Self {
        let mut wrapped = CallData::new(ESDT_NFT_TRANSFER)
            .push_str(token_id)
            .push_u64(nonce)
            .push_biguint(amount)
            .push_address(receiver)
            .push_str(&self.function);
        wrapped.args.extend(self.args);
        wrapped
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// Hex arguments in order
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Decode the hex arguments back into bytes
    pub fn arg_bytes(&self) -> Vec<Vec<u8>> {
        self.args
            .iter()
            .map(|a| hex::decode(a).unwrap_or_default())
            .collect()
    }

    pub fn build(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CallData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.function)?;
        for arg in &self.args {
            write!(f, "@{}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_value;
    use crate::types::{DecodedValue, FieldType};

    #[test]
    fn test_integer_encoding() {
        let call = CallData::new("bid").push_u64(0).push_u64(1).push_u64(256).push_u8(10);
        assert_eq!(call.build(), "bid@@01@0100@0a");
    }

    #[test]
    fn test_biguint_and_bool() {
        let call = CallData::new("f")
            .push_biguint(&BigUint::from(0u32))
            .push_biguint(&BigUint::from(1_000_000_000_000_000_000u64))
            .push_bool(true)
            .push_bool(false);
        assert_eq!(call.build(), "f@@0de0b6b3a7640000@01@");
    }

    #[test]
    fn test_values_decode_back() {
        let seller = Address::from_bytes(&[7u8; 32]).unwrap();
        let price = BigUint::from(123_456_789u64) * BigUint::from(u64::MAX);
        let call = CallData::new("auctionToken")
            .push_biguint(&price)
            .push_u64(1_700_000_000)
            .push_str("EGLD")
            .push_address(&seller)
            .push_bool(true)
            .push_u8(0);

        let args = call.arg_bytes();
        assert_eq!(decode_value(&args[0], FieldType::BigUint).unwrap(), DecodedValue::BigUint(price));
        assert_eq!(decode_value(&args[1], FieldType::U64).unwrap(), DecodedValue::U64(1_700_000_000));
        assert_eq!(decode_value(&args[2], FieldType::String).unwrap(), DecodedValue::String("EGLD".into()));
        assert_eq!(decode_value(&args[3], FieldType::Address).unwrap(), DecodedValue::Address(seller));
        assert_eq!(decode_value(&args[4], FieldType::Boolean).unwrap(), DecodedValue::Boolean(true));
        assert_eq!(decode_value(&args[5], FieldType::U8).unwrap(), DecodedValue::U8(0));
    }

    #[test]
    fn test_nft_transfer_wrapper() {
        let marketplace = Address::from_bytes(&[0u8; 32]).unwrap();
        let call = CallData::new("auctionToken")
            .push_u64(5)
            .esdt_nft_transfer("FRAME-a1b2c3", 12, &BigUint::from(1u32), &marketplace);

        assert_eq!(call.function(), ESDT_NFT_TRANSFER);
        let expected = format!(
            "ESDTNFTTransfer@{}@0c@01@{}@{}@05",
            hex::encode("FRAME-a1b2c3"),
            "00".repeat(32),
            hex::encode("auctionToken")
        );
        assert_eq!(call.build(), expected);
    }
}
