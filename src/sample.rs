use crate::error::{CaptureUnavailable, SampleError};

/// Luma values below this count as ink.
pub const INK_THRESHOLD: u8 = 128;

/// A one-bit still of the drawing surface, input to classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Sample {
    pub fn new(width: u32, height: u32, pixels: Vec<bool>) -> Result<Self, SampleError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(SampleError::LengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Binarizes an 8-bit grayscale buffer, dark pixels become ink.
    pub fn from_luma(width: u32, height: u32, luma: &[u8]) -> Result<Self, SampleError> {
        Self::new(
            width,
            height,
            luma.iter().map(|&v| v < INK_THRESHOLD).collect(),
        )
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    pub fn is_blank(&self) -> bool {
        self.ink_count() == 0
    }
}

/// Source of drawing-surface samples. Called on the tick path, so it must be cheap.
pub trait SnapshotProvider: Send + Sync + 'static {
    fn capture(&self) -> Result<Sample, CaptureUnavailable>;
}

/// Provider that always returns an empty surface
#[derive(Debug, Clone, Copy)]
pub struct BlankCanvas {
    pub width: u32,
    pub height: u32,
}

impl Default for BlankCanvas {
    fn default() -> Self {
        Self {
            width: 28,
            height: 28,
        }
    }
}

impl SnapshotProvider for BlankCanvas {
    fn capture(&self) -> Result<Sample, CaptureUnavailable> {
        Ok(Sample::blank(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_from_luma_binarizes() {
        let sample = Sample::from_luma(2, 2, &[0, 255, 127, 128]).unwrap();
        assert_eq!(sample.pixels(), &[true, false, true, false]);
        assert_eq!(sample.ink_count(), 2);
        assert!(!sample.is_blank());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert_matches!(
            Sample::new(3, 3, vec![false; 8]),
            Err(SampleError::LengthMismatch {
                expected: 9,
                actual: 8,
                ..
            })
        );
    }

    #[test]
    fn test_blank_canvas_capture() {
        let sample = BlankCanvas::default().capture().unwrap();
        assert_eq!(sample.width(), 28);
        assert_eq!(sample.height(), 28);
        assert!(sample.is_blank());
    }
}
