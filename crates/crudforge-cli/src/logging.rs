// Logging and verbosity control

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::Level;

/// Global verbosity level
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Quiet mode - errors only
    Quiet = 0,
    /// Normal mode - standard output
    Normal = 1,
    /// Verbose mode - detailed output
    Verbose = 2,
    /// Very verbose mode - debug output
    VeryVerbose = 3,
}

impl VerbosityLevel {
    /// Get the current verbosity level
    pub fn current() -> Self {
        match VERBOSITY.load(Ordering::Relaxed) {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Normal,
            2 => VerbosityLevel::Verbose,
            _ => VerbosityLevel::VeryVerbose,
        }
    }

    /// Set the verbosity level
    pub fn set(level: Self) {
        VERBOSITY.store(level as u8, Ordering::Relaxed);
    }

    /// Check if we should output at this level
    pub fn should_output(&self) -> bool {
        self <= &Self::current()
    }

    /// Most detailed tracing level shown at this verbosity
    pub fn tracing_level(&self) -> Level {
        match self {
            VerbosityLevel::Quiet => Level::ERROR,
            VerbosityLevel::Normal => Level::WARN,
            VerbosityLevel::Verbose => Level::INFO,
            VerbosityLevel::VeryVerbose => Level::DEBUG,
        }
    }

    /// Level selected by the `--verbose` count and `--quiet` flag
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else {
            match verbose {
                0 => VerbosityLevel::Normal,
                1 => VerbosityLevel::Verbose,
                _ => VerbosityLevel::VeryVerbose,
            }
        }
    }
}

/// Initialize logging based on CLI flags
///
/// Installs a stderr fmt subscriber once per process; later calls only change the
/// verbosity consulted by [`VerbosityLevel::should_output`].
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = VerbosityLevel::from_flags(verbose, quiet);
    VerbosityLevel::set(level);

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.tracing_level())
        .with_target(false)
        .try_init();
}
