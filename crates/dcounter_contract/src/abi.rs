//! # Contract ABI
//!
//! Solidity interface for the deployed counter contract, generated
//! with alloy's `sol!` macro.

// The sol! macro generates code that we can't document, so allow missing_docs
#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// The counter contract - a number and a message, both readable by
    /// anyone and writable by any signing account.
    #[derive(Debug)]
    interface ICounter {
        /// Reads the current number.
        function getNumber() external view returns (uint256);

        /// Reads the current message.
        function message() external view returns (string memory);

        /// Replaces the stored message.
        function setMessage(string memory newMessage) external;

        /// Increments the number by one.
        function increaseNumber() external;

        /// Decrements the number by one. Reverts below zero.
        function decreaseNumber() external;
    }
}
