use super::Overlay;
use crate::pipeline::types::Geometry;
use anyhow::Result;

/// Label and outline for one captured code
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMark {
    pub label: String,
    pub geometry: Geometry,
}

/// Overlay layer that keeps the marks for the frame being built
#[derive(Debug, Default)]
pub struct MarkLayer {
    marks: Vec<OverlayMark>,
}

impl MarkLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Overlay for MarkLayer {
    fn mark(&mut self, text: &str, geometry: &Geometry) -> Result<()> {
        self.marks.push(OverlayMark {
            label: format!("QR Captured: {}", text),
            geometry: geometry.clone(),
        });
        Ok(())
    }

    fn marks(&self) -> &[OverlayMark] {
        &self.marks
    }

    fn clear(&mut self) {
        self.marks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_until_cleared() {
        let mut layer = MarkLayer::new();
        let rect = Geometry::Rect {
            x: 4,
            y: 8,
            width: 120,
            height: 120,
        };

        layer.mark("Patient 1", &rect).unwrap();
        assert_eq!(layer.marks().len(), 1);
        assert_eq!(layer.marks()[0].label, "QR Captured: Patient 1");
        assert_eq!(layer.marks()[0].geometry, rect);

        layer.clear();
        assert!(layer.marks().is_empty());
    }
}
