use crate::labels::label_name;
use ndarray::Array2;

/// Per-image prediction output.
///
/// The four sequences always have the same length and correspond by index,
/// in the order the network produced the detections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// Byte masks (0-255) cropped to the detection box
    pub roi_masks: Vec<Array2<u8>>,
    /// `(y_min, x_min, y_max, x_max)` in original image pixels
    pub bboxes: Vec<[i32; 4]>,
    pub labels: Vec<i32>,
    pub scores: Vec<f32>,
}

/// Borrowed view of one detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection<'a> {
    pub roi_mask: &'a Array2<u8>,
    pub bbox: [i32; 4],
    pub label: i32,
    pub score: f32,
}

impl Segmentation {
    /// Empty result with room for `capacity` detections in every sequence
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            roi_masks: Vec::with_capacity(capacity),
            bboxes: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
            scores: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, roi_mask: Array2<u8>, bbox: [i32; 4], label: i32, score: f32) {
        self.roi_masks.push(roi_mask);
        self.bboxes.push(bbox);
        self.labels.push(label);
        self.scores.push(score);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Detection<'_>> {
        self.roi_masks
            .iter()
            .zip(&self.bboxes)
            .zip(&self.labels)
            .zip(&self.scores)
            .map(|(((roi_mask, bbox), label), score)| Detection {
                roi_mask,
                bbox: *bbox,
                label: *label,
                score: *score,
            })
    }

    /// Class names for every detection; `None` for ids outside `names`
    pub fn label_names(&self, names: &[&'static str]) -> Vec<Option<&'static str>> {
        self.labels.iter().map(|&l| label_name(names, l)).collect()
    }

    /// Split into the tuple `(roi_masks, bboxes, labels, scores)`
    pub fn into_parts(self) -> (Vec<Array2<u8>>, Vec<[i32; 4]>, Vec<i32>, Vec<f32>) {
        (self.roi_masks, self.bboxes, self.labels, self.scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::COCO_INSTANCE_SEGMENTATION_LABEL_NAMES;

    #[test]
    fn test_push_keeps_sequences_aligned() {
        let mut seg = Segmentation::with_capacity(2);
        assert!(seg.is_empty());

        seg.push(Array2::zeros((2, 3)), [0, 0, 2, 3], 0, 0.9);
        seg.push(Array2::zeros((1, 1)), [5, 5, 6, 6], 16, 0.5);

        assert_eq!(seg.len(), 2);
        assert_eq!(seg.roi_masks.len(), seg.bboxes.len());
        assert_eq!(seg.labels.len(), seg.scores.len());

        let dets: Vec<_> = seg.iter().collect();
        assert_eq!(dets[1].label, 16);
        assert_eq!(dets[1].bbox, [5, 5, 6, 6]);
        assert_eq!(dets[0].roi_mask.dim(), (2, 3));
    }

    #[test]
    fn test_label_names() {
        let mut seg = Segmentation::default();
        seg.push(Array2::zeros((1, 1)), [0, 0, 1, 1], 16, 0.9);
        seg.push(Array2::zeros((1, 1)), [0, 0, 1, 1], 80, 0.9);

        assert_eq!(
            seg.label_names(&COCO_INSTANCE_SEGMENTATION_LABEL_NAMES),
            vec![Some("dog"), None]
        );
    }

    #[test]
    fn test_into_parts() {
        let mut seg = Segmentation::default();
        seg.push(Array2::zeros((1, 1)), [1, 2, 3, 4], 3, 0.4);

        let (masks, bboxes, labels, scores) = seg.into_parts();
        assert_eq!(masks.len(), 1);
        assert_eq!(bboxes, vec![[1, 2, 3, 4]]);
        assert_eq!(labels, vec![3]);
        assert_eq!(scores, vec![0.4]);
    }
}
