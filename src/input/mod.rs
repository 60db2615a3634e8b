pub mod converter;
pub mod event;
#[cfg(test)]
pub mod event_test;
