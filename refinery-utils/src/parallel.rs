//! Parallel processing utilities

use anyhow::Result;

/// Worker count for a configured value, 0 meaning every available core
pub fn resolve_workers(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get()
    } else {
        requested
    }
}

/// Configure the global thread pool
pub fn configure_thread_pool(threads: usize) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(resolve_workers(threads))
        .build_global()?;

    Ok(())
}

/// Get the number of available CPU cores
pub fn get_available_cores() -> usize {
    num_cpus::get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_get_available_cores() {
        let cores = get_available_cores();
        assert!(cores > 0, "Should detect at least one CPU core");
    }

    #[test]
    fn test_resolve_workers() {
        assert_eq!(resolve_workers(3), 3);
        assert_eq!(resolve_workers(0), num_cpus::get());
    }

    #[test]
    #[serial]
    fn test_configure_thread_pool_with_specific_count() {
        let result = configure_thread_pool(2);

        // The global pool can only be built once per process
        if result.is_ok() {
            assert_eq!(rayon::current_num_threads(), 2);
        }
    }

    #[test]
    #[serial]
    fn test_configure_thread_pool_twice_fails() {
        let _ = configure_thread_pool(1);
        assert!(configure_thread_pool(1).is_err());
    }
}
