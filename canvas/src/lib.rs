//! Core engine for the screen-annotation overlay.
//!
//! This crate owns everything about an annotation session that is not pixels:
//! the mapping between the on-screen viewport and the captured canvas under
//! pan and zoom, the typed annotation store, hit-testing, arrowhead geometry,
//! and the edit state machine that turns raw input events into store
//! mutations. Capture, painting and video encoding are supplied by the host
//! through the traits in [`collab`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Edit session aggregate and state machine ([`engine::EngineCore`]) |
//! | [`doc`] | Annotation records and the [`doc::AnnotationStore`] |
//! | [`camera`] | View transform and coordinate conversions |
//! | [`input`] | Edit modes, keys, modifiers and gesture state |
//! | [`hit`] | Hit-testing the cursor against annotations |
//! | [`arrow`] | Arrowhead stroke geometry |
//! | [`geometry`] | Point/size/rect value types |
//! | [`collab`] | Canvas source, renderer and encoder interfaces |
//! | [`config`] | Environment-driven tuning |
//! | [`consts`] | Shared numeric constants (zoom limits, hit sizes, arrow proportions) |

pub mod arrow;
pub mod camera;
pub mod collab;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
