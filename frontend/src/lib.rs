//! W3Lab navigation core: server-pushed state, a lazily resolved route tree
//! and the lab branches built on top of it.

pub mod app;
pub mod clients;
pub mod connection;
pub mod dataflow;
pub mod extension;
pub mod grouping;
pub mod nav;
pub mod pages;
pub mod path_codec;
pub mod state;
pub mod view;

pub use app::{LabApp, Services};
