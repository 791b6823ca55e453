//! Catalog wire types shared by the storefront controller and its front ends.

pub mod categories;
pub mod domain;
pub mod error;
pub mod protocol;
