// Copyright @yucwang 2021

pub mod bsdf;
pub mod bvh;
pub mod computation_node;
pub mod emitter;
pub mod error;
pub mod integrator;
pub mod interaction;
pub mod medium;
pub mod phase;
pub mod properties;
pub mod registry;
pub mod rng;
pub mod scene;
pub mod scene_loader;
pub mod sensor;
pub mod shape;
pub mod texture;
pub mod volume;
