//! Halo Core
//!
//! Foundational primitives shared by the Halo runtime crates:
//!
//! - **Color**: RGBA values with CSS serialization, used by the theme palettes
//! - **State Machines**: flat state machines with guards and entry/exit actions,
//!   used by the background reconciliation loops
//!
//! # Example
//!
//! ```rust
//! use halo_core::fsm::StateMachine;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Door { Closed, Open }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Push { Open, Close }
//!
//! let mut fsm = StateMachine::builder(Door::Closed)
//!     .on(Door::Closed, Push::Open, Door::Open)
//!     .on(Door::Open, Push::Close, Door::Closed)
//!     .build();
//!
//! fsm.send(Push::Open);
//! assert!(fsm.is_in(Door::Open));
//! ```

pub mod color;
pub mod fsm;

pub use color::Color;
pub use fsm::{StateMachine, StateMachineBuilder, Transition};
