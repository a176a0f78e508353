//! Domain entity definitions.

mod image;
mod viewed_jobs;

pub use image::{
    ImageId, ImagePayload, ImageSource, LoadedImage, OCTET_STREAM, ObjectUrl, extension_for_mime,
};
pub use viewed_jobs::{JobId, ViewedJobs};
