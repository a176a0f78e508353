mod image_fetch_port;
mod object_url_port;

pub use image_fetch_port::ImageFetchPort;
pub use object_url_port::ObjectUrlPort;

#[cfg(test)]
pub use object_url_port::MockObjectUrlPort;
