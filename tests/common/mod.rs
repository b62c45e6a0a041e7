#![allow(dead_code, unused_imports)]

pub use mergebench_test_utils::{builders, fake_backend, init_tracing, with_timeout};

#[cfg(unix)]
pub use mergebench_test_utils::write_script;
