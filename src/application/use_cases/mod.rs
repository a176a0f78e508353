//! Use case implementations.

mod prefetch_images_use_case;

pub use prefetch_images_use_case::PrefetchImagesUseCase;
