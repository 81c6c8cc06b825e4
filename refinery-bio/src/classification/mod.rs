//! Alignment classification into the eleven relationship classes

pub mod classifier;

pub use classifier::{class_counts, classify, classify_all, frequency_ratio, ClassifiedAlignment, Thresholds};
