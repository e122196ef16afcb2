//! Router and database tests

mod test_utils;
