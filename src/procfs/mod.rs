pub mod device;
#[cfg(test)]
pub mod device_test;
