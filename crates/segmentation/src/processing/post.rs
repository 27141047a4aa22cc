use crate::backend::InferenceOutput;
use crate::processing::roi_mask::mask_to_roi_mask;
use crate::result::Segmentation;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use ndarray::{Array2, ArrayView2, Axis};

/// Mapping from network input back to the caller's image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    pub orig_width: u32,
    pub orig_height: u32,
    pub scale: f32,
}

pub struct PostProcessor {
    pub score_threshold: f32,
    resizer: Resizer,
}

impl PostProcessor {
    pub fn new(score_threshold: f32) -> Self {
        Self {
            score_threshold,
            resizer: Resizer::new(),
        }
    }

    /// Keep detections scoring strictly above the threshold and convert them
    /// to integer boxes and byte masks cropped to those boxes.
    #[tracing::instrument(skip(self, output, transform))]
    pub fn process(
        &mut self,
        output: &InferenceOutput,
        transform: &TransformParams,
    ) -> anyhow::Result<Segmentation> {
        let num_detections = output.num_detections()?;

        let scores = output.scores.index_axis(Axis(0), 0);
        let labels = output.labels.index_axis(Axis(0), 0);
        let bboxes = output.bboxes.index_axis(Axis(0), 0);
        let masks = output.masks.index_axis(Axis(0), 0);

        let mut masks_full = Vec::with_capacity(num_detections);
        let mut kept = Vec::with_capacity(num_detections);

        for i in 0..num_detections {
            let score = scores[[i]];

            // NaN scores never pass
            if !(score > self.score_threshold) {
                continue;
            }

            let bbox = rescale_bbox(
                [
                    bboxes[[i, 0]],
                    bboxes[[i, 1]],
                    bboxes[[i, 2]],
                    bboxes[[i, 3]],
                ],
                transform,
            );

            let mask = masks
                .index_axis(Axis(0), i)
                .into_dimensionality::<ndarray::Ix2>()?;
            masks_full.push(self.mask_to_original(mask_to_u8(mask), transform)?);
            kept.push((bbox, labels[[i]] as i32, score));
        }

        let boxes: Vec<[i32; 4]> = kept.iter().map(|(bbox, _, _)| *bbox).collect();
        let roi_masks = mask_to_roi_mask(&masks_full, &boxes);

        let mut result = Segmentation::with_capacity(kept.len());
        for (roi_mask, (bbox, label, score)) in roi_masks.into_iter().zip(kept) {
            result.push(roi_mask, bbox, label, score);
        }

        tracing::debug!(
            candidates = num_detections,
            kept = result.len(),
            threshold = self.score_threshold,
            "Filtered detections"
        );

        Ok(result)
    }

    fn mask_to_original(
        &mut self,
        mask: Array2<u8>,
        transform: &TransformParams,
    ) -> anyhow::Result<Array2<u8>> {
        let (height, width) = mask.dim();
        let target = (
            transform.orig_height as usize,
            transform.orig_width as usize,
        );

        if (height, width) == target || mask.is_empty() {
            return Ok(mask);
        }

        let mask = mask.as_standard_layout();
        let buffer = mask
            .as_slice()
            .ok_or_else(|| anyhow::anyhow!("Mask is not contiguous"))?;

        let src = ImageRef::new(width as u32, height as u32, buffer, PixelType::U8)?;
        let mut dst = Image::new(transform.orig_width, transform.orig_height, PixelType::U8);

        self.resizer.resize(
            &src,
            &mut dst,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        Ok(Array2::from_shape_vec(target, dst.buffer().to_vec())?)
    }
}

/// Input-tensor `(y_min, x_min, y_max, x_max)` to rounded original-image pixels.
///
/// Rounds half to even, so 50.5 becomes 50 and 51.5 becomes 52.
pub fn rescale_bbox(bbox: [f32; 4], transform: &TransformParams) -> [i32; 4] {
    let h = transform.orig_height as f32;
    let w = transform.orig_width as f32;
    let limits = [h, w, h, w];

    let mut out = [0i32; 4];
    for (k, v) in bbox.iter().enumerate() {
        let v = (v / transform.scale).clamp(0.0, limits[k]);
        out[k] = round_box_coord(v);
    }
    out
}

#[inline]
pub fn round_box_coord(v: f32) -> i32 {
    v.round_ties_even() as i32
}

/// Scale a `[0, 1]` soft mask to bytes. Values are truncated toward zero and
/// saturate at the ends of the byte range.
pub fn mask_to_u8(mask: ArrayView2<f32>) -> Array2<u8> {
    mask.mapv(|v| (v * 255.0) as u8)
}
