pub mod fasta;

// Re-export commonly used functions
pub use fasta::{parse_fasta, read_fasta, write_fasta, write_fasta_to_writer};
