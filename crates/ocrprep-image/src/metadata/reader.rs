// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Standard metadata tree reader.
//
// Collects physical pixel density from the places common containers keep it
// and records it, together with a description of the colour model, in a
// format-neutral tree:
//
//   StandardMetadata
//   ├── Chroma     ColorSpaceType(name), NumChannels(value)
//   ├── Data       BitsPerSample(value)
//   └── Dimension  PixelAspectRatio, ImageOrientation, HorizontalPixelSize,
//                  VerticalPixelSize (all `value`, pixel sizes in millimetres)
//
// Density sources, in priority order:
// - PNG: the `pHYs` chunk, then EXIF.
// - JPEG: a JFIF `APP0` segment with physical units, then EXIF, then a
//   unitless JFIF aspect ratio.
// - TIFF, WebP: EXIF `XResolution`/`YResolution`/`ResolutionUnit`.

use std::io::Cursor;

use exif::{In, Tag};
use ocrprep_core::types::ImageFileFormat;
use tracing::{debug, instrument};

use super::resolution::{HORIZONTAL_PIXEL_SIZE, MM_PER_INCH, VERTICAL_PIXEL_SIZE};
use super::tree::MetadataTree;
use crate::raster::ColorModel;

/// Name of the root node of every standard tree.
pub const STANDARD_ROOT: &str = "StandardMetadata";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DensityUnit {
    /// Only the ratio between the axes is known.
    Unitless,
    PerInch,
    PerCentimetre,
    PerMetre,
}

/// Pixels per unit along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Density {
    x: f64,
    y: f64,
    unit: DensityUnit,
}

impl Density {
    fn new(x: f64, y: f64, unit: DensityUnit) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(x) && valid(y)).then_some(Self { x, y, unit })
    }

    /// Width and height of one pixel in millimetres.
    fn pixel_size_mm(&self) -> Option<(f64, f64)> {
        let mm_per_unit = match self.unit {
            DensityUnit::Unitless => return None,
            DensityUnit::PerInch => MM_PER_INCH as f64,
            DensityUnit::PerCentimetre => 10.0,
            DensityUnit::PerMetre => 1000.0,
        };
        Some((mm_per_unit / self.x, mm_per_unit / self.y))
    }

    /// Pixel width divided by pixel height.
    fn aspect_ratio(&self) -> f64 {
        self.y / self.x
    }
}

/// Build the standard metadata tree for an encoded image.
///
/// Returns `None` for containers that carry no resolution metadata at all
/// (GIF, BMP, netpbm and others). Containers that can carry it but happen not
/// to still yield a tree, just without pixel-size nodes.
#[instrument(skip_all, fields(data_len = data.len(), format = format.tag()))]
pub fn read_standard_tree(
    data: &[u8],
    format: ImageFileFormat,
    model: &ColorModel,
) -> Option<MetadataTree> {
    if !format.carries_resolution() {
        debug!("Container carries no resolution metadata");
        return None;
    }

    let exif = read_exif(data);
    let exif_density = exif.as_ref().and_then(exif_density);

    let density = match format {
        ImageFileFormat::Png => png_density(data).or(exif_density),
        ImageFileFormat::Jpeg => match jfif_density(data) {
            Some(jfif) if jfif.unit != DensityUnit::Unitless => Some(jfif),
            unitless => exif_density.or(unitless),
        },
        _ => exif_density,
    };
    let orientation = exif.as_ref().and_then(|e| {
        e.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
    });

    debug!(?density, ?orientation, "Metadata collected");
    Some(build_tree(model, density, orientation))
}

fn build_tree(
    model: &ColorModel,
    density: Option<Density>,
    orientation: Option<u32>,
) -> MetadataTree {
    let mut tree = MetadataTree::new(STANDARD_ROOT);
    let root = tree.root();

    let chroma = tree.add_child(root, "Chroma");
    let space = tree.add_child(chroma, "ColorSpaceType");
    tree.set_attribute(space, "name", model.space.name());
    let channels = tree.add_child(chroma, "NumChannels");
    tree.set_attribute(channels, "value", model.channels().to_string());

    let data = tree.add_child(root, "Data");
    let bits = tree.add_child(data, "BitsPerSample");
    let per_channel = vec![model.bits_per_sample.to_string(); model.channels()].join(" ");
    tree.set_attribute(bits, "value", per_channel);

    let dimension = tree.add_child(root, "Dimension");
    if let Some(density) = density {
        let ratio = tree.add_child(dimension, "PixelAspectRatio");
        tree.set_attribute(ratio, "value", format_value(density.aspect_ratio()));
    }
    if let Some(orientation) = orientation {
        let node = tree.add_child(dimension, "ImageOrientation");
        tree.set_attribute(node, "value", orientation.to_string());
    }
    if let Some((width_mm, height_mm)) = density.and_then(|d| d.pixel_size_mm()) {
        let horizontal = tree.add_child(dimension, HORIZONTAL_PIXEL_SIZE);
        tree.set_attribute(horizontal, "value", format_value(width_mm));
        let vertical = tree.add_child(dimension, VERTICAL_PIXEL_SIZE);
        tree.set_attribute(vertical, "value", format_value(height_mm));
    }

    tree
}

/// Shortest decimal text that reads back as the same single-precision value.
fn format_value(value: f64) -> String {
    (value as f32).to_string()
}

// -- PNG ----------------------------------------------------------------------

/// Density from the `pHYs` chunk, which must precede the image data.
fn png_density(data: &[u8]) -> Option<Density> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return None;
    }

    // Each chunk: 4 bytes length + 4 bytes type + body + 4 bytes CRC.
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let length = be_u32(&data[pos..pos + 4])? as usize;
        let kind = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let body_end = body_start.checked_add(length)?;
        let body = data.get(body_start..body_end)?;

        match kind {
            b"pHYs" if body.len() == 9 => {
                let x = be_u32(&body[0..4])?;
                let y = be_u32(&body[4..8])?;
                let unit = match body[8] {
                    0 => DensityUnit::Unitless,
                    1 => DensityUnit::PerMetre,
                    _ => return None,
                };
                return Density::new(x as f64, y as f64, unit);
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        pos = body_end + 4;
    }
    None
}

// -- JPEG ---------------------------------------------------------------------

/// Density from a JFIF `APP0` segment among the header segments.
fn jfif_density(data: &[u8]) -> Option<Density> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    // Skip SOI marker
    let mut i = 2;
    while i + 4 <= data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];

        // Fill byte before a marker
        if marker == 0xFF {
            i += 1;
            continue;
        }
        // Start of scan or end of image: no more header segments.
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        // Standalone markers carry no length.
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }

        let length = be_u16(&data[i + 2..i + 4])? as usize;
        if length < 2 {
            return None;
        }
        let segment_end = i + 2 + length;
        let segment = data.get(i + 4..segment_end)?;

        // JFIF\0, version (2), units (1), x density (2), y density (2)
        if marker == 0xE0 && segment.len() >= 12 && segment.starts_with(b"JFIF\0") {
            let unit = match segment[7] {
                0 => DensityUnit::Unitless,
                1 => DensityUnit::PerInch,
                2 => DensityUnit::PerCentimetre,
                _ => return None,
            };
            let x = be_u16(&segment[8..10])?;
            let y = be_u16(&segment[10..12])?;
            return Density::new(x as f64, y as f64, unit);
        }

        i = segment_end;
    }
    None
}

// -- EXIF ---------------------------------------------------------------------

fn read_exif(data: &[u8]) -> Option<exif::Exif> {
    let mut cursor = Cursor::new(data);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => Some(exif),
        Err(err) => {
            debug!(error = %err, "No usable EXIF data");
            None
        }
    }
}

fn exif_density(exif: &exif::Exif) -> Option<Density> {
    let x = exif_rational(exif, Tag::XResolution)?;
    let y = exif_rational(exif, Tag::YResolution)?;
    // ResolutionUnit defaults to inches when absent.
    let unit = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(2);
    let unit = match unit {
        1 => DensityUnit::Unitless,
        2 => DensityUnit::PerInch,
        3 => DensityUnit::PerCentimetre,
        _ => return None,
    };
    Density::new(x, y, unit)
}

fn exif_rational(exif: &exif::Exif, tag: Tag) -> Option<f64> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        exif::Value::Rational(values) => values.first().map(|r| r.to_f64()),
        _ => None,
    }
}

// -- Byte helpers -------------------------------------------------------------

fn be_u32(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(..4)?.try_into().ok()?))
}

fn be_u16(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(..2)?.try_into().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::resolution::ResolutionMetadataExtractor;
    use crate::metadata::tree::MetadataQuery;
    use ocrprep_core::types::ResolutionInfo;

    fn png_chunk(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut chunk = (body.len() as u32).to_be_bytes().to_vec();
        chunk.extend_from_slice(kind);
        chunk.extend_from_slice(body);
        // CRC is not inspected by the density reader.
        chunk.extend_from_slice(&[0, 0, 0, 0]);
        chunk
    }

    fn png_with_phys(x: u32, y: u32, unit: u8) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(png_chunk(b"IHDR", &[0; 13]));
        let mut phys = x.to_be_bytes().to_vec();
        phys.extend_from_slice(&y.to_be_bytes());
        phys.push(unit);
        data.extend(png_chunk(b"pHYs", &phys));
        data.extend(png_chunk(b"IEND", &[]));
        data
    }

    fn jpeg_with_jfif(unit: u8, x: u16, y: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&[1, 2, unit]);
        data.extend_from_slice(&x.to_be_bytes());
        data.extend_from_slice(&y.to_be_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9]);
        data
    }

    #[test]
    fn png_phys_in_metres_yields_pixel_size() {
        let data = png_with_phys(11811, 11811, 1);
        let tree = read_standard_tree(&data, ImageFileFormat::Png, &ColorModel::rgb8()).unwrap();

        let node = tree.find_first(HORIZONTAL_PIXEL_SIZE).unwrap();
        let pitch: f32 = tree.attribute_value(node, 0).unwrap().parse().unwrap();
        assert!((pitch - 0.084667).abs() < 1e-4, "got {pitch}");

        let extractor = ResolutionMetadataExtractor::new(96).unwrap();
        assert_eq!(
            extractor.extract(Some(&tree)).unwrap(),
            ResolutionInfo::uniform(300)
        );
    }

    #[test]
    fn png_unitless_phys_only_records_aspect_ratio() {
        let data = png_with_phys(2, 1, 0);
        let tree = read_standard_tree(&data, ImageFileFormat::Png, &ColorModel::gray8()).unwrap();

        assert!(tree.find_first(HORIZONTAL_PIXEL_SIZE).is_none());
        let ratio = tree.find_first("PixelAspectRatio").unwrap();
        assert_eq!(tree.attribute_value(ratio, 0), Some("0.5"));
    }

    #[test]
    fn png_without_phys_still_describes_colour_model() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(png_chunk(b"IHDR", &[0; 13]));
        data.extend(png_chunk(b"IDAT", &[1, 2, 3]));
        let tree = read_standard_tree(&data, ImageFileFormat::Png, &ColorModel::rgba8()).unwrap();

        assert!(tree.find_first(VERTICAL_PIXEL_SIZE).is_none());
        let channels = tree.find_first("NumChannels").unwrap();
        assert_eq!(tree.attribute_value(channels, 0), Some("4"));
        let bits = tree.find_first("BitsPerSample").unwrap();
        assert_eq!(tree.attribute_value(bits, 0), Some("8 8 8 8"));
    }

    #[test]
    fn jfif_dots_per_inch() {
        let data = jpeg_with_jfif(1, 72, 144);
        let density = jfif_density(&data).unwrap();
        assert_eq!(density.unit, DensityUnit::PerInch);

        let tree = read_standard_tree(&data, ImageFileFormat::Jpeg, &ColorModel::rgb8()).unwrap();
        let extractor = ResolutionMetadataExtractor::new(96).unwrap();
        assert_eq!(
            extractor.extract(Some(&tree)).unwrap(),
            ResolutionInfo::new(72, 144)
        );
    }

    #[test]
    fn jfif_dots_per_centimetre() {
        let data = jpeg_with_jfif(2, 118, 118);
        let tree = read_standard_tree(&data, ImageFileFormat::Jpeg, &ColorModel::gray8()).unwrap();
        let extractor = ResolutionMetadataExtractor::new(96).unwrap();
        // 118 dots/cm = 299.72 dpi
        assert_eq!(
            extractor.extract(Some(&tree)).unwrap(),
            ResolutionInfo::uniform(300)
        );
    }

    #[test]
    fn zero_density_is_ignored() {
        assert!(jfif_density(&jpeg_with_jfif(1, 0, 72)).is_none());
        assert!(png_density(&png_with_phys(0, 0, 1)).is_none());
    }

    #[test]
    fn truncated_streams_do_not_panic() {
        let png = png_with_phys(11811, 11811, 1);
        for len in 0..png.len() {
            let _ = png_density(&png[..len]);
        }
        let jpeg = jpeg_with_jfif(1, 300, 300);
        for len in 0..jpeg.len() {
            let _ = jfif_density(&jpeg[..len]);
        }
    }

    #[test]
    fn containers_without_resolution_yield_no_tree() {
        let data = png_with_phys(11811, 11811, 1);
        assert!(read_standard_tree(&data, ImageFileFormat::Gif, &ColorModel::rgb8()).is_none());
        assert!(read_standard_tree(&data, ImageFileFormat::Bmp, &ColorModel::rgb8()).is_none());
    }
}
