pub mod olaclick;
