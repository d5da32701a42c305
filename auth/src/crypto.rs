use subtle::ConstantTimeEq;

/// Compare two byte slices in time independent of where they differ.
///
/// Slices of different length never match.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
