use std::ops::RangeInclusive;

pub const MRI_ROOT: &str = "/mri";
pub const BASELINE_SCAN_DATE: &str = "2025-03-24";
pub const FOLLOWUP_SCAN_DATE: &str = "2025-04-18";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceCursor {
    index: u16,
    total: u16,
}

impl SliceCursor {
    /// `total` must be non-zero; `index` is clamped into range.
    pub fn new(index: u16, total: u16) -> Self {
        let total = total.max(1);
        Self {
            index: index.min(total - 1),
            total,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn total(&self) -> u16 {
        self.total
    }

    pub fn last(&self) -> u16 {
        self.total - 1
    }

    pub fn set(&mut self, index: u16) {
        self.index = index.min(self.last());
    }

    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn next(&mut self) {
        if self.index < self.last() {
            self.index += 1;
        }
    }

    pub fn at_start(&self) -> bool {
        self.index == 0
    }

    pub fn at_end(&self) -> bool {
        self.index == self.last()
    }

    pub fn prefetch_window(&self, radius: u16) -> RangeInclusive<u16> {
        prefetch_window(self.index, self.total, radius)
    }
}

/// Indices within `radius` of `index`, clamped to `[0, total)`.
pub fn prefetch_window(index: u16, total: u16, radius: u16) -> RangeInclusive<u16> {
    let last = total.saturating_sub(1);
    index.saturating_sub(radius)..=index.saturating_add(radius).min(last)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    #[default]
    None,
    Segmentation,
    Progression,
}

impl OverlayMode {
    pub fn toggle_segmentation(self) -> Self {
        match self {
            OverlayMode::Segmentation => OverlayMode::None,
            _ => OverlayMode::Segmentation,
        }
    }

    pub fn toggle_progression(self) -> Self {
        match self {
            OverlayMode::Progression => OverlayMode::None,
            _ => OverlayMode::Progression,
        }
    }

    pub fn buckets(self) -> (Bucket, Bucket) {
        match self {
            OverlayMode::None => (Bucket::Baseline, Bucket::Followup),
            OverlayMode::Segmentation => (Bucket::BaselineSegmented, Bucket::FollowupSegmented),
            OverlayMode::Progression => (Bucket::Baseline, Bucket::Difference),
        }
    }

    pub fn left_caption(self) -> &'static str {
        match self {
            OverlayMode::Segmentation => "With Segmentation",
            _ => "Original",
        }
    }

    pub fn right_caption(self) -> &'static str {
        match self {
            OverlayMode::None => "Original",
            OverlayMode::Segmentation => "With Segmentation",
            OverlayMode::Progression => "Progression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Baseline,
    Followup,
    BaselineSegmented,
    FollowupSegmented,
    Difference,
}

impl Bucket {
    pub fn dir_name(self) -> &'static str {
        match self {
            Bucket::Baseline => "baseline",
            Bucket::Followup => "followup",
            Bucket::BaselineSegmented => "baseline-segmented",
            Bucket::FollowupSegmented => "followup-segmented",
            Bucket::Difference => "difference",
        }
    }
}

pub fn format_slice_number(index: u16) -> String {
    format!("{index:03}")
}

pub fn slice_path(root: &str, bucket: Bucket, index: u16) -> String {
    format!(
        "{}/{}/slice_{}.jpg",
        root.trim_end_matches('/'),
        bucket.dir_name(),
        format_slice_number(index)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlicePaths {
    pub left: String,
    pub right: String,
}

impl SlicePaths {
    pub fn for_slice(root: &str, index: u16, mode: OverlayMode) -> Self {
        let (left, right) = mode.buckets();
        Self {
            left: slice_path(root, left, index),
            right: slice_path(root, right, index),
        }
    }
}
