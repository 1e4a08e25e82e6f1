// Copyright @yucwang 2021

use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;

/// Turns a scene into an image the size of its sensor film.
pub trait Renderer {
    fn render(&self, scene: &Scene) -> Bitmap;
}
