//! Elapsed-time logging for long-running operations

use std::time::Instant;

use log::info;

/// Something with a (rows, columns) shape worth reporting in timing logs
pub trait Shaped {
    /// Number of rows and columns
    fn shape(&self) -> (usize, usize);
}

/// Format the completion message for `operation`
pub fn finished_message(operation: &str, seconds: f64, subject: Option<&dyn Shaped>) -> String {
    match subject {
        Some(shaped) => {
            let (rows, cols) = shaped.shape();
            format!(
                "Finished {} [shape=({}, {})] in {:.3} seconds",
                operation, rows, cols, seconds
            )
        }
        None => format!("Finished {} in {:.2} seconds", operation, seconds),
    }
}

/// Log at info level that `operation`, started at `start`, has finished
pub fn log_finished(operation: &str, start: Instant, subject: Option<&dyn Shaped>) {
    info!(
        "{}",
        finished_message(operation, start.elapsed().as_secs_f64(), subject)
    );
}
