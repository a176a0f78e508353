//! Data transfer objects.

mod image_dto;

pub use image_dto::{BatchSummary, ImageLoadReport};
