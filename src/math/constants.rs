/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;
pub type Vector2i = nalgebra::Vector2<Int>;
pub type Vector3i = nalgebra::Vector3<Int>;
pub type Matrix3f = nalgebra::Matrix3<Float>;
pub type Matrix4f = nalgebra::Matrix4<Float>;
pub type MatrixXF = nalgebra::DMatrix<Float>;

pub const EPSILON: Float = 1e-4;
// Machine epsilon, used as the floor for pdfs and MIS denominators.
pub const FLOAT_EPSILON: Float = std::f32::EPSILON;
// Shadow rays report occlusion only for hits closer than `dist - SHADOW_EPSILON`.
pub const SHADOW_EPSILON: Float = 1e-5;
pub const FLOAT_MIN: Float = std::f32::MIN;
pub const FLOAT_MAX: Float = std::f32::MAX;

pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;
pub const INV_TWOPI: Float = 0.15915494309;
pub const INV_FOURPI: Float = 0.07957747155;
pub const SQUARE_2: Float = 1.41421356;
pub const INV_SQUARE_2: Float = 0.70710678;
