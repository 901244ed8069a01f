//! Random number generation for the Monte Carlo kernels.
//!
//! - **Reproducibility**: every generator is seeded; the seed is part of the
//!   Monte Carlo configuration, never global state
//! - **Batch independence**: [`PricerRng::for_stream`] derives one generator
//!   per path batch so results do not depend on how batches are scheduled
//!   across threads
//!
//! ```rust
//! use pricer_pricing::rng::PricerRng;
//!
//! let mut rng = PricerRng::from_seed(12345);
//! let u = rng.gen_uniform();
//! assert!((0.0..1.0).contains(&u));
//!
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//! ```

mod prng;

pub use prng::PricerRng;
