//! Progress bars with consistent styling

use indicatif::{ProgressBar, ProgressStyle};

/// Create a standard progress bar.
///
/// A zero total with an empty message yields a hidden bar, which callers
/// use for quiet runs.
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    if total == 0 && message.is_empty() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise})")
    {
        pb.set_style(style.progress_chars("━━─"));
    }
    pb.set_message(message.to_string());
    pb
}

/// Create a spinner for steps without a known length
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}
