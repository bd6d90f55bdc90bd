pub(crate) mod concurrent_refresh;
