// Copyright @yucwang 2026

pub mod bumped;
pub mod diffuse;
pub mod microfacet;
pub mod roughconductor;
pub mod roughdielectric;
pub mod roughsubstrate;
