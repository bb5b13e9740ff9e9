//! Exclusion-limit figures: parse mass/limit curves, layer them onto a
//! [`canvas::Canvas`] with the render variants in [`render`], and write the
//! result with [`plot::save`].

pub mod canvas;
pub mod color;
pub mod data;
pub mod figure;
pub mod geometry;
pub mod grid;
pub mod plot;
pub mod render;
pub mod style;
