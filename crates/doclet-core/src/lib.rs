//! Symbol resolution for documentation comments.
//!
//! Raw `/** ... */` comments become [`Doclet`]s with resolved longnames.
//! A [`Session`] collects them into a [`DocletIndex`], gives overloaded
//! functions unique variations as they arrive, and on
//! [`finish`](Session::finish) resolves `@borrows`, `@mixes`,
//! `@implements` and `@augments`.
//!
//! ```
//! use doclet_core::{Config, RawDoclet, Session};
//!
//! let mut session = Session::from_config(&Config::default());
//! session.add_comment(&RawDoclet {
//!     comment: "/** @class Soup */".to_string(),
//!     ..Default::default()
//! });
//! let docset = session.finish().unwrap();
//! assert_eq!(docset.doclets()[0].longname, "Soup");
//! ```

pub mod augment;
pub mod borrow;
pub mod comment;
pub mod config;
pub mod doclet;
pub mod error;
pub mod index;
pub mod name;
pub mod overload;
pub mod plugin;
pub mod session;
pub mod tag;

pub use config::{Config, TagConfig, UnknownTags};
pub use doclet::{Access, Doclet, Kind, Meta, RawDoclet};
pub use error::{DocletError, Location};
pub use index::{DocletId, DocletIndex};
pub use name::{Longname, Scope};
pub use plugin::{NewDoclet, ParseBegin, Plugin};
pub use session::{Docset, Session};
pub use tag::dictionary::Dictionary;
