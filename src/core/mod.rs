pub mod error;
pub mod generator;
pub mod grid;
pub mod integration;
pub mod interpolation;
pub mod knots;
mod operators;
pub mod quadrature;
pub mod scalar;
pub mod spline;
pub mod support;
