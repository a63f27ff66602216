pub mod test_candidates;
pub mod test_relay_roundtrip;
