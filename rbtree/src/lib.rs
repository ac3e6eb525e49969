//! An arena backed red-black tree keyed by any totally ordered type.
//!
//! Nodes are stored in a `Vec` and linked by index, parent links included, so
//! the whole tree is free of `unsafe`. Callers address nodes through
//! [`NodeRef`] handles which are checked against a per-slot generation and
//! therefore can't silently alias a node that was deleted and reallocated.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod error;
mod iter;
mod node;
mod red_black_tree;
mod validate;

pub use error::{Error, InvariantViolation};
pub use iter::{Iter, PreorderIter};
pub use node::{Color, NodeRef};
pub use red_black_tree::RedBlackTree;
