pub mod test_hang_up;
pub mod test_rtc_backend;
