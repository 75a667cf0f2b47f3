#[path = "../common/mod.rs"]
mod common;

mod round_flow_tests;
