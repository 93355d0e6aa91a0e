//! Progress bar utilities for displaying collection status

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::pipeline::ProgressFn;
use crate::utils::config::PROGRESS_UPDATE_BATCH_SIZE;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a progress bar for `total` items.
pub fn create_progress_bar(total: usize, desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic,
        unit = " items"
    )))
}

/// Move the bar to `n` completed items.
/// Uses try_lock so the collector never blocks on a contended bar; the next update catches up.
pub fn set_bar_position(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.update_to(n);
    }
}

/// Callback for [`JobOpts::on_collected`](crate::JobOpts): advances `pb` every
/// `PROGRESS_UPDATE_BATCH_SIZE` outcomes and on the last one.
pub fn collected_callback(pb: &ProgressBar, total: usize) -> ProgressFn {
    let bar = Arc::clone(pb);
    Box::new(move |n: usize| {
        if n.is_multiple_of(PROGRESS_UPDATE_BATCH_SIZE) || n == total {
            set_bar_position(&bar, n);
        }
    })
}

/// Final update and newline so later output starts on a clean line.
pub fn finish_bar(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.update_to(total);
        let _ = bar.refresh();
    }
    eprintln!();
}
