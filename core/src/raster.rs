use image::{Rgba, RgbaImage};

use crate::error::RasterError;
use crate::geometry::{Point, Polygon};

/// Transparent border kept around every piece image.
pub const RASTER_PADDING: u32 = 2;

// Pixels whose centre lies this close to the outline are kept so neighbors overlap
// instead of leaving a hairline gap.
const EDGE_KEEP_DISTANCE: f32 = 0.5;

/// Turns a region of a source image into a piece image handle.
pub trait Rasterizer {
    type Source;
    type Handle;

    fn source_size(&self, source: &Self::Source) -> (u32, u32);

    fn rasterize(
        &mut self,
        source: &Self::Source,
        polygon: &Polygon,
    ) -> Result<Self::Handle, RasterError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct PieceImage {
    /// Image-space position of the top-left pixel of `pixels`.
    pub origin: (u32, u32),
    pub pixels: RgbaImage,
}

/// Crops each outline's padded bounding box and clears everything outside it.
#[derive(Clone, Copy, Debug)]
pub struct ImageRasterizer {
    pub padding: u32,
}

impl Default for ImageRasterizer {
    fn default() -> Self {
        Self {
            padding: RASTER_PADDING,
        }
    }
}

impl Rasterizer for ImageRasterizer {
    type Source = RgbaImage;
    type Handle = PieceImage;

    fn source_size(&self, source: &RgbaImage) -> (u32, u32) {
        source.dimensions()
    }

    fn rasterize(&mut self, source: &RgbaImage, polygon: &Polygon) -> Result<PieceImage, RasterError> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(RasterError::EmptySource);
        }
        let bounds = polygon.bounds();
        let pad = self.padding as f32;
        let x0 = (bounds.min.x - pad).floor().max(0.0) as u32;
        let y0 = (bounds.min.y - pad).floor().max(0.0) as u32;
        let x1 = ((bounds.max.x + pad).ceil().max(0.0) as u32).min(width);
        let y1 = ((bounds.max.y + pad).ceil().max(0.0) as u32).min(height);
        if x0 >= x1 || y0 >= y1 {
            return Err(RasterError::OutOfBounds);
        }

        let mut pixels = RgbaImage::new(x1 - x0, y1 - y0);
        for (x, y, pixel) in pixels.enumerate_pixels_mut() {
            let sx = x0 + x;
            let sy = y0 + y;
            let center = Point::new(sx as f32 + 0.5, sy as f32 + 0.5);
            let keep = polygon.contains(center)
                || polygon.distance_to_boundary(center) <= EDGE_KEEP_DISTANCE;
            *pixel = if keep {
                *source.get_pixel(sx, sy)
            } else {
                Rgba([0, 0, 0, 0])
            };
        }
        Ok(PieceImage {
            origin: (x0, y0),
            pixels,
        })
    }
}

/// Rasterizer for callers that manage piece imagery themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRaster;

impl Rasterizer for NoRaster {
    type Source = (u32, u32);
    type Handle = ();

    fn source_size(&self, source: &(u32, u32)) -> (u32, u32) {
        *source
    }

    fn rasterize(&mut self, _source: &(u32, u32), _polygon: &Polygon) -> Result<(), RasterError> {
        Ok(())
    }
}
