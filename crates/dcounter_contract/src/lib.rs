//! # DCOUNTER Contract Binding
//!
//! Immutable descriptor for the deployed counter contract: the fixed
//! on-chain address plus the set of callable methods with their
//! selectors and mutability. The client crate uses this to construct
//! typed calls; nothing in here performs I/O.
//!
//! ## Method surface
//!
//! | Method           | Kind  | Signature                  |
//! |------------------|-------|----------------------------|
//! | `getNumber`      | read  | `getNumber() -> uint256`   |
//! | `message`        | read  | `message() -> string`      |
//! | `setMessage`     | write | `setMessage(string)`       |
//! | `increaseNumber` | write | `increaseNumber()`         |
//! | `decreaseNumber` | write | `decreaseNumber()`         |

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod abi;

pub use abi::ICounter;

use alloy_primitives::{address, Address};
use alloy_sol_types::SolCall;

/// Address of the deployed counter contract.
pub const COUNTER_ADDRESS: Address = address!("13cbd6f417771ba49ca3345a0a96baef342ff6cb");

/// Whether a method mutates chain state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// Inspects chain state. No signature, no transaction.
    View,
    /// Mutates chain state. Requires a signing account and is
    /// submitted as a transaction.
    NonPayable,
}

/// Descriptor for one callable contract method.
#[derive(Clone, Copy, Debug)]
pub struct MethodDescriptor {
    /// Solidity method name.
    pub name: &'static str,
    /// Four-byte function selector.
    pub selector: [u8; 4],
    /// Read or write.
    pub mutability: Mutability,
}

impl MethodDescriptor {
    /// Returns `true` for view methods.
    #[inline]
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.mutability == Mutability::View
    }

    /// Returns `true` for state-mutating methods.
    #[inline]
    #[must_use]
    pub fn is_write(&self) -> bool {
        self.mutability == Mutability::NonPayable
    }
}

/// Descriptor table for the counter contract.
const COUNTER_METHODS: &[MethodDescriptor] = &[
    MethodDescriptor {
        name: "getNumber",
        selector: ICounter::getNumberCall::SELECTOR,
        mutability: Mutability::View,
    },
    MethodDescriptor {
        name: "message",
        selector: ICounter::messageCall::SELECTOR,
        mutability: Mutability::View,
    },
    MethodDescriptor {
        name: "setMessage",
        selector: ICounter::setMessageCall::SELECTOR,
        mutability: Mutability::NonPayable,
    },
    MethodDescriptor {
        name: "increaseNumber",
        selector: ICounter::increaseNumberCall::SELECTOR,
        mutability: Mutability::NonPayable,
    },
    MethodDescriptor {
        name: "decreaseNumber",
        selector: ICounter::decreaseNumberCall::SELECTOR,
        mutability: Mutability::NonPayable,
    },
];

/// Immutable pairing of a contract address and its callable surface.
///
/// Constructed once and owned by the contract client for the process
/// lifetime. The only operations are lookups; there is no mutation.
#[derive(Clone, Copy, Debug)]
pub struct ContractBinding {
    /// Deployed contract address.
    address: Address,
    /// Callable method descriptors.
    methods: &'static [MethodDescriptor],
}

impl ContractBinding {
    /// Creates the binding for the deployed counter contract.
    #[must_use]
    pub const fn counter() -> Self {
        Self {
            address: COUNTER_ADDRESS,
            methods: COUNTER_METHODS,
        }
    }

    /// Rebinds to a different deployment (test networks).
    #[must_use]
    pub const fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Returns the bound contract address.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the full method descriptor table.
    #[inline]
    #[must_use]
    pub const fn methods(&self) -> &'static [MethodDescriptor] {
        self.methods
    }

    /// Looks up a method descriptor by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&'static MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Looks up a method descriptor by four-byte selector.
    #[must_use]
    pub fn method_by_selector(&self, selector: [u8; 4]) -> Option<&'static MethodDescriptor> {
        self.methods.iter().find(|m| m.selector == selector)
    }
}

impl Default for ContractBinding {
    fn default() -> Self {
        Self::counter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let binding = ContractBinding::counter();

        let get_number = binding.method("getNumber").unwrap();
        assert!(get_number.is_read());
        assert_eq!(get_number.selector, ICounter::getNumberCall::SELECTOR);

        let set_message = binding.method("setMessage").unwrap();
        assert!(set_message.is_write());

        assert!(binding.method("selfdestruct").is_none());
    }

    #[test]
    fn test_lookup_by_selector_matches_name() {
        let binding = ContractBinding::counter();

        for descriptor in binding.methods() {
            let by_selector = binding.method_by_selector(descriptor.selector).unwrap();
            assert_eq!(by_selector.name, descriptor.name);
        }
    }

    #[test]
    fn test_selectors_are_distinct() {
        let binding = ContractBinding::counter();
        let methods = binding.methods();

        for (i, a) in methods.iter().enumerate() {
            for b in &methods[i + 1..] {
                assert_ne!(a.selector, b.selector, "{} vs {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_read_write_split() {
        let binding = ContractBinding::counter();

        let reads = binding.methods().iter().filter(|m| m.is_read()).count();
        let writes = binding.methods().iter().filter(|m| m.is_write()).count();

        assert_eq!(reads, 2);
        assert_eq!(writes, 3);
    }

    #[test]
    fn test_with_address_rebinds() {
        let other = Address::repeat_byte(0xab);
        let binding = ContractBinding::counter().with_address(other);

        assert_eq!(binding.address(), other);
        // Method surface is unchanged by rebinding
        assert!(binding.method("increaseNumber").is_some());
    }
}
