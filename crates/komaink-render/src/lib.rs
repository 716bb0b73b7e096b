//! KomaInk Render Library
//!
//! Rendering adapter interface for KomaInk pages, with an SVG implementation.

mod adapter;
mod page;
mod svg;

pub use adapter::{DrawStyle, RenderAdapter, RenderError, RenderResult};
pub use page::{render_page, render_svg, PageRenderOptions};
pub use svg::SvgAdapter;
