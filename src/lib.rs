// Copyright @yucwang 2021

pub extern crate nalgebra as na;

pub mod core;
pub mod emitters;
pub mod integrators;
pub mod io;
pub mod materials;
pub mod math;
pub mod media;
pub mod phase;
pub mod renderers;
pub mod sensors;
pub mod shapes;
pub mod textures;
pub mod volumes;
