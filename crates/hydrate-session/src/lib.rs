//! Identity resolution and materialization sessions for hydrate.
//!
//! `hydrate-session` is the **read-path materialization layer**. It turns the
//! flat rows of a root-plus-related LEFT OUTER JOIN into entity instances and
//! decides, per session, whether repeated keys share one instance.
//!
//! # Role In The Architecture
//!
//! - **Materializer**: one row → root instance plus optional related instance.
//! - **Identity map**: at most one instance per `(type, key)` in a tracked session.
//! - **Resolver**: lazy, order-preserving row → root pipeline.
//! - **Session**: owns the identity scope and releases it on close.
//!
//! # Example
//!
//! ```ignore
//! let mut session = Session::open(TrackingMode::Untracked);
//! for listing in session.resolve::<BusinessListing, _>(rows)? {
//!     let listing = listing?;
//!     println!("{} -> {:?}", listing.title, listing.category.as_ref().map(|c| &c.name));
//! }
//! session.close();
//! ```

pub mod identity_map;
pub mod materializer;
pub mod resolver;
pub mod session;

pub use identity_map::{IdentityMap, IdentityScope, IdentityStats, NoTracking};
pub use materializer::{expected_arity, materialize_row};
pub use resolver::{EagerResolver, resolve};
pub use session::{Session, SessionConfig, SessionScope, TrackingMode};
