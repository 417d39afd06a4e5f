//! Wallet session management
//!
//! The session tracks which account is active. Wallet events reach it through an
//! explicit subscription on the [`WalletProvider`], so tests can push synthetic
//! events through [`LocalWalletProvider`].

mod local;
mod provider;
mod wallet_session;

pub use local::LocalWalletProvider;
pub use provider::{EventHandler, SubscriptionId, WalletEvent, WalletProvider};
pub use wallet_session::{format_short, SessionSignal, SessionState, SessionStatus, WalletSession};
