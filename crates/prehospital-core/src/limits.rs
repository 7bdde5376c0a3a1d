//! Resource limits applied to intake submissions.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_INJURIES: usize = 100;
pub const DEFAULT_MAX_SUBMISSIONS_PER_DAY: u32 = 50;

pub const MAX_INJURY_NOTES_LEN: usize = 500;
pub const MAX_SHORT_TEXT_LEN: usize = 255;
pub const MAX_LONG_TEXT_LEN: usize = 5000;
pub const MAX_CHECKBOX_ITEMS: usize = 50;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeLimits {
    pub max_injuries: usize,
    pub max_submissions_per_day: u32,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_injuries: DEFAULT_MAX_INJURIES,
            max_submissions_per_day: DEFAULT_MAX_SUBMISSIONS_PER_DAY,
        }
    }
}
