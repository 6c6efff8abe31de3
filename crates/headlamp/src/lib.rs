#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use headlamp_image as image;

#[doc(inline)]
pub use headlamp_blob as blob;
