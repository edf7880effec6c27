pub mod cargo_env {
    pub const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");
    pub const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
}

pub mod common {
    use std::time::Duration;

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const MAX_CONCURRENCY: usize = 64;
    pub const ENV_PREFIX: &str = "SMOKESHOT";
}

pub mod exit_code {
    pub const PASSED: i32 = 0;
    pub const FAILED: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
}
