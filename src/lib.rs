//! Pseudo-3D road racing: a ring of road slices projected in perspective,
//! recycled from a procedurally generated map as the camera drives on.
//!
//! The simulation core ([`race::World`] and the modules beneath it) knows
//! nothing about terminals; it talks to the outside through
//! [`surface::Surface`], [`audio::AudioSink`] and the [`hud`] values. The
//! crossterm front-end lives in [`app`], [`render`], [`overlay`] and
//! [`input`].

pub mod app;
pub mod audio;
pub mod clock;
pub mod config;
pub mod hud;
pub mod input;
pub mod map;
pub mod overlay;
pub mod painter;
pub mod physics;
pub mod projection;
pub mod race;
pub mod render;
pub mod sprites;
pub mod storage;
pub mod surface;
pub mod track;
pub mod traffic;
