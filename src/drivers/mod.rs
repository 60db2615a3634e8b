pub mod device_file;
pub mod hidg;
