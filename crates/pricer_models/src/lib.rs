//! # Pricer Models (L2: Business Logic)
//!
//! Contract-level building blocks on top of `pricer_core`.
//!
//! This crate provides:
//! - Coupon schedules and frequencies ([`schedules`])
//! - Closed-form pricers: Black-Scholes, Black-76, Garman-Kohlhagen,
//!   knockout, Asian, lookback and the FX quanto pair ([`analytical`])
//! - Bond cash-flow engines with price, yield and risk analytics ([`bonds`])
//! - Instrument term structs and the tagged [`instruments::Instrument`]
//!   enum ([`instruments`])
//!
//! ## Design Principles
//!
//! - **Enum-based instruments** for static dispatch
//! - **Immutable terms**: pricers read instruments, never mutate them
//! - **Builder pattern** for ergonomic API with sensible defaults

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod bonds;
pub mod instruments;
pub mod schedules;
