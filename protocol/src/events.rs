//! Accounting records emitted by successful vault operations.
//!
//! Events are plain values: the vault returns the exact record alongside the
//! operation's result and appends a copy to its log for indexers.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::math::Amount;

/// Emitted by `deposit` and `mint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Account that supplied the assets.
    pub caller: Address,
    /// Account credited with the new shares.
    pub receiver: Address,
    /// Assets moved into custody.
    pub assets: Amount,
    /// Shares minted.
    pub shares: Amount,
}

/// Emitted by `withdraw` and `redeem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    /// Account that executed the call.
    pub caller: Address,
    /// Account that received the assets.
    pub receiver: Address,
    /// Account whose shares were burned.
    pub owner: Address,
    /// Assets moved out of custody.
    pub assets: Amount,
    /// Shares burned.
    pub shares: Amount,
}

/// Any event the vault can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultEvent {
    Deposit(Deposit),
    Withdraw(Withdraw),
}

impl VaultEvent {
    /// Assets moved by the operation.
    pub fn assets(&self) -> Amount {
        match self {
            VaultEvent::Deposit(e) => e.assets,
            VaultEvent::Withdraw(e) => e.assets,
        }
    }

    /// Shares minted or burned by the operation.
    pub fn shares(&self) -> Amount {
        match self {
            VaultEvent::Deposit(e) => e.shares,
            VaultEvent::Withdraw(e) => e.shares,
        }
    }

    /// Account that executed the operation.
    pub fn caller(&self) -> Address {
        match self {
            VaultEvent::Deposit(e) => e.caller,
            VaultEvent::Withdraw(e) => e.caller,
        }
    }
}

impl From<Deposit> for VaultEvent {
    fn from(event: Deposit) -> Self {
        VaultEvent::Deposit(event)
    }
}

impl From<Withdraw> for VaultEvent {
    fn from(event: Withdraw) -> Self {
        VaultEvent::Withdraw(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_keyed_by_event_name() {
        let alice = Address::from_label("alice");
        let event = VaultEvent::from(Deposit {
            caller: alice,
            receiver: alice,
            assets: 100,
            shares: 100,
        });
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["deposit"]["caller"], alice.to_string());
        assert_eq!(json["deposit"]["shares"], 100);

        let back: VaultEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn accessors_cover_both_variants() {
        let a = Address::from_label("a");
        let b = Address::from_label("b");
        let withdraw = VaultEvent::Withdraw(Withdraw {
            caller: b,
            receiver: b,
            owner: a,
            assets: 30,
            shares: 31,
        });
        assert_eq!(withdraw.assets(), 30);
        assert_eq!(withdraw.shares(), 31);
        assert_eq!(withdraw.caller(), b);
    }
}
