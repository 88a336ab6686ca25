//! A crate for producing print raster streams in Rust.
//!
//! This started as a general CUPS Raster / URF codec; it has been pared
//! down to the writing side of CUPS Raster (used to emit PWG-Raster
//! device streams) plus a new HP PCL writer, since nothing downstream of
//! this crate reads raster files back.
//!
//! # Example
//! Pin a `AsyncWrite` instance to the destination, build a `RasterWriter`
//! for the wire format you want, then call `next_page` for each page and
//! write its content through `content_mut`. Call `finish` after the last
//! page.
//!
//! ```rust
//! use futures::AsyncWriteExt;
//! use print_raster::{
//!     model::cups::CupsPageHeaderV2,
//!     writer::{cups::CupsRasterWriterV3BE, RasterPageWriter, RasterWriter},
//! };
//! use std::pin::Pin;
//!
//! # let _ = tokio::runtime::Runtime::new().unwrap().block_on(async {
//! # fn make_header() -> CupsPageHeaderV2 { unimplemented!() }
//! let page_header = make_header();
//! let mut data = Vec::<u8>::new();
//! let writer = CupsRasterWriterV3BE::new(Pin::new(&mut data)).await?;
//! let mut page_writer = writer.next_page(&page_header).await?;
//! page_writer.content_mut().write_all(&[0xffu8; 24]).await?;
//! page_writer.finish().await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```
//!
//! `content_mut` will make small, repeated write calls while encoding a
//! page; wrap the destination in a buffered writer if that matters for
//! your transport.

pub mod decode;
pub mod encode;
pub mod error;
pub mod factory;
pub mod model;
pub mod writer;
// Re-export byteorder crate.
pub use byteorder;
