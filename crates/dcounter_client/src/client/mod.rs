//! # Contract Client
//!
//! Typed read/write invocation against the bound counter contract.
//!
//! Reads execute against the provider's current view of chain state
//! and need no account. Writes are submitted as transactions signed by
//! the caller-supplied account. A successful write deliberately
//! returns nothing - the post-write value is only ever observed by a
//! follow-up read (see [`crate::sync`]), never assumed from the call
//! itself.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

use dcounter_contract::{ContractBinding, ICounter, MethodDescriptor};

use crate::error::{ClientError, ClientResult};
use crate::provider::{ProviderError, WalletProvider};

/// Issues read and write calls against one [`ContractBinding`].
pub struct ContractClient<P: WalletProvider> {
    /// The injected wallet provider.
    provider: Arc<P>,
    /// The bound contract.
    binding: ContractBinding,
}

impl<P: WalletProvider> ContractClient<P> {
    /// Creates a client for the given provider and binding.
    #[must_use]
    pub fn new(provider: Arc<P>, binding: ContractBinding) -> Self {
        Self { provider, binding }
    }

    /// Returns the contract binding.
    #[inline]
    #[must_use]
    pub const fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    /// Reads the current number.
    pub fn get_number(&self) -> ClientResult<U256> {
        Ok(self.read(&ICounter::getNumberCall {})?._0)
    }

    /// Reads the current message.
    pub fn message(&self) -> ClientResult<String> {
        Ok(self.read(&ICounter::messageCall {})?._0)
    }

    /// Replaces the stored message.
    pub fn set_message(&self, new_message: impl Into<String>, from: Address) -> ClientResult<()> {
        self.write(
            &ICounter::setMessageCall {
                newMessage: new_message.into(),
            },
            from,
        )
    }

    /// Increments the number by one.
    pub fn increase_number(&self, from: Address) -> ClientResult<()> {
        self.write(&ICounter::increaseNumberCall {}, from)
    }

    /// Decrements the number by one.
    pub fn decrease_number(&self, from: Address) -> ClientResult<()> {
        self.write(&ICounter::decreaseNumberCall {}, from)
    }

    /// Executes a read call. Any provider failure maps to
    /// [`ClientError::ReadFailed`] and is logged; the caller decides
    /// what to do with its previous value.
    fn read<C: SolCall>(&self, call: &C) -> ClientResult<C::Return> {
        let method = self.descriptor::<C>()?;
        debug_assert!(method.is_read(), "{} is not a view method", method.name);
        tracing::debug!(method = method.name, "contract read");

        let returned = self
            .provider
            .call(self.binding.address(), call.abi_encode().into())
            .map_err(|error| {
                tracing::warn!(method = method.name, %error, "read call failed");
                ClientError::ReadFailed(error.to_string())
            })?;

        C::abi_decode_returns(&returned, true).map_err(|error| {
            tracing::warn!(method = method.name, %error, "read returned undecodable data");
            ClientError::ReadFailed(error.to_string())
        })
    }

    /// Submits a write call signed by `from`. A wallet decline maps to
    /// [`ClientError::UserRejected`], anything else to
    /// [`ClientError::TransactionFailed`].
    fn write<C: SolCall>(&self, call: &C, from: Address) -> ClientResult<()> {
        let method = self.descriptor::<C>()?;
        debug_assert!(method.is_write(), "{} is not a write method", method.name);
        tracing::debug!(method = method.name, %from, "contract write");

        self.provider
            .send_transaction(from, self.binding.address(), call.abi_encode().into())
            .map_err(|error| match error {
                ProviderError::UserRejected => {
                    tracing::info!(method = method.name, "wallet declined signature");
                    ClientError::UserRejected
                }
                other => {
                    tracing::warn!(method = method.name, error = %other, "transaction failed");
                    ClientError::TransactionFailed(other.to_string())
                }
            })
    }

    /// Resolves a call type against the binding's descriptor table.
    fn descriptor<C: SolCall>(&self) -> ClientResult<&'static MethodDescriptor> {
        self.binding
            .method_by_selector(C::SELECTOR)
            .ok_or_else(|| ClientError::UnknownMethod(C::SIGNATURE.to_string()))
    }
}
