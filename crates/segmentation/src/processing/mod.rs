pub mod post;
pub mod roi_mask;
