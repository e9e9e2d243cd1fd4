/// Number of snapshots to pop for a normally distributed rollback
///
/// `sample` is a normal draw scaled to the stack depth. It is rounded and
/// clamped into `[1, depth]`; non-finite draws pop a single snapshot.
/// Returns 0 only for an empty stack.
pub fn normal_rollback_depth(depth: usize, sample: f64) -> usize {
    if depth == 0 {
        return 0;
    }
    if !sample.is_finite() {
        return 1;
    }
    (sample.round().max(1.0) as usize).min(depth)
}
