//! Cropping full-image masks down to their detection boxes.

use ndarray::{Array2, ArrayView2, s};

/// Crop `mask` to `bbox` = `(y_min, x_min, y_max, x_max)`.
///
/// Bounds are clamped to the mask, and an inverted box yields an empty crop.
pub fn crop_to_bbox(mask: ArrayView2<u8>, bbox: [i32; 4]) -> Array2<u8> {
    let (height, width) = mask.dim();
    let clamp = |v: i32, hi: usize| (v.max(0) as usize).min(hi);

    let y0 = clamp(bbox[0], height);
    let x0 = clamp(bbox[1], width);
    let y1 = clamp(bbox[2], height).max(y0);
    let x1 = clamp(bbox[3], width).max(x0);

    mask.slice(s![y0..y1, x0..x1]).to_owned()
}

/// Crop each mask to the box at the same index
pub fn mask_to_roi_mask(masks: &[Array2<u8>], bboxes: &[[i32; 4]]) -> Vec<Array2<u8>> {
    debug_assert_eq!(masks.len(), bboxes.len());

    masks
        .iter()
        .zip(bboxes)
        .map(|(mask, bbox)| crop_to_bbox(mask.view(), *bbox))
        .collect()
}
