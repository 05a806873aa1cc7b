//! # lowbit core
//!
//! Hides byte payloads in the low-order bits of an image and finds them
//! again. Two carrier domains are supported:
//! - [`DctCarrier`][dct]: quantized DCT coefficients of a baseline JPEG,
//!   selected by an anti-diagonal rule tuned with a perceptibility parameter
//! - [`PixelCarrier`][pixel]: 8-bit channel values of PNGs and other bitmaps,
//!   with 1 to 4 bits per channel
//!
//! The number of embedded bits and the parameter are stored as a small
//! metadata record in the tag store of the image, and a chi-square
//! [`Detector`][detector] estimates whether an image already hides data.
//!
//! # Usage Examples
//!
//! ## Hide data inside an image
//!
//! ```rust,no_run
//! lowbit_core::api::embed::prepare()
//!     .with_payload(b"Hello, World!")
//!     .with_image("cover.jpg")
//!     .with_parameter(3)
//!     .with_output("secret.jpg")
//!     .execute()
//!     .expect("Failed to hide the payload in the image");
//! ```
//!
//! ## Extract data from an image
//!
//! ```rust,no_run
//! let extraction = lowbit_core::api::extract::prepare()
//!     .with_secret_image("secret.jpg")
//!     .execute()
//!     .expect("Failed to extract the payload");
//! assert!(extraction.is_complete());
//! ```
//!
//! ## Work on carriers directly
//!
//! ```rust
//! use lowbit_core::{BitsPerChannel, Cover, Embedder, Extractor, PixelCarrier};
//!
//! let carrier = PixelCarrier::new(4, 4, 3, vec![0x80; 48]).unwrap();
//! let cover = Cover::new(carrier);
//! let stego = Embedder::default()
//!     .embed(&cover, b"hi", BitsPerChannel::default())
//!     .unwrap();
//! let extraction = Extractor::default().extract(&stego).unwrap();
//! assert_eq!(extraction.payload, b"hi");
//! ```
//!
//! [dct]: ./carrier/struct.DctCarrier.html
//! [pixel]: ./carrier/struct.PixelCarrier.html
//! [detector]: ./detect/struct.Detector.html

#![warn(clippy::redundant_else)]

pub mod api;
pub mod attack;
pub mod bit_iterator;
pub mod capacity;
pub mod carrier;
pub mod detect;
pub mod diagnostics;
pub mod embed;
pub mod error;
pub mod extract;
pub mod media;
pub mod metadata;
pub mod result;
pub mod stats;
pub mod tags;

#[cfg(test)]
mod test_utils;

pub use bit_iterator::{BitCollector, BitIterator};
pub use capacity::{count_capacity, Capacity, Cover};
pub use carrier::{
    BitsPerChannel, Carrier, CarrierKind, CoefficientPlane, DctCarrier, Perceptibility,
    PixelCarrier, Selection,
};
pub use detect::{Detection, Detector, GroupReport, Verdict, DEFAULT_SIGNIFICANCE};
pub use diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, NoDiagnostics, Operation};
pub use embed::{Embedder, StegoCarrier};
pub use error::{LowbitError, MetadataError};
pub use extract::{Extraction, Extractor};
pub use media::{CodecOptions, Media, MediaKind, Persist};
pub use metadata::{Metadata, METADATA_KEY};
pub use result::Result;
pub use tags::{TagStore, Tags};
