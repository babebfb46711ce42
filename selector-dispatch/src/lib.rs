//! # selector-dispatch
//!
//! Multi-dimensional table dispatch over discrete selectors.
//!
//! Given K selector domains and a [`Family`] of behaviors with one
//! specialization per combination of selector values, a [`Dispatcher`]
//! builds, on first use, a K-level nested table of function pointers. Every
//! later call routes its selectors to the right behavior with K index
//! operations and forwards the trailing arguments, which may borrow from the
//! caller.
//!
//! ```
//! use selector_dispatch::{selector_enum, Combination, Dispatcher, Family};
//!
//! selector_enum! {
//!     pub enum Precision { Half, Single, Double }
//! }
//!
//! selector_enum! {
//!     pub enum Layout { RowMajor, ColumnMajor }
//! }
//!
//! struct Describe;
//!
//! impl Family for Describe {
//!     type Args<'a> = ();
//!     type Output = String;
//!
//!     fn invoke<C: Combination>(_: Self::Args<'_>) -> String {
//!         let precision = C::value::<Precision>(0).unwrap();
//!         let layout = C::value::<Layout>(1).unwrap();
//!         format!("{precision:?}/{layout:?}")
//!     }
//! }
//!
//! static DESCRIBE: Dispatcher<(Precision, Layout), Describe> = Dispatcher::new();
//!
//! assert_eq!(DESCRIBE.call((Precision::Single, Layout::ColumnMajor), ()), "Single/ColumnMajor");
//! // Ordinals past the end clamp to the last value.
//! assert_eq!(DESCRIBE.call_ordinals([7, 0], ()), "Double/RowMajor");
//! ```
//!
//! # Architecture
//!
//! - [`domain`] - selector domains, their END sentinel and type-level values
//! - [`combination`] - the bound selector tuple a behavior is specialized for
//! - [`family`] - the behavior family contract and the generated thunks
//! - [`table`] - type-level domain lists and nested table construction
//! - [`dispatcher`] - lazy, build-once dispatch with clamping
//! - [`registry`] - process-wide dispatchers keyed by signature
//! - [`error`] - strict-mode and malformed-domain errors

pub mod combination;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod family;
pub mod registry;
pub mod table;

pub use combination::{Combination, Root, Then};
pub use dispatcher::Dispatcher;
pub use domain::{Bounded, Fixed, Selector, Value, Visitor};
pub use error::{DispatchError, DispatchResult};
pub use family::{Family, Leaf};
pub use registry::{dispatch, dispatcher, registered};
pub use table::{Cons, DomainList, Domains, Nil, Table, TableStats};
