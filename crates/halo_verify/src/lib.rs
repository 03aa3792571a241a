//! Halo Verification Poller
//!
//! Keeps an unverified session in sync with a remote "is verified" flag.
//! While the account is unverified, a background task checks the status
//! endpoint once per interval; the first time it reports verified, polling
//! stops and the reload callback fires exactly once.
//!
//! ```text
//! Idle ──Start──▶ Polling ──Verified──▶ Verified
//!   │               │  ▲
//!   │               └──┘ NotVerified / CheckFailed
//!   │               │
//!   └─AlreadyVerified / Cancel──▶ Stopped ◀──Cancel
//! ```
//!
//! Check failures are absorbed: the poller logs them and waits for the next
//! tick. Nothing is surfaced to the user.

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod poller;
pub mod source;
pub mod state;

pub use error::StatusError;
#[cfg(feature = "http")]
pub use http::HttpStatusSource;
pub use poller::{
    start_for_session, start_polling, PollHandle, PollerConfig, Session, DEFAULT_INTERVAL,
};
pub use source::{AccountId, StatusReport, StatusSource};
pub use state::{PollEvent, PollState, VerificationState};
