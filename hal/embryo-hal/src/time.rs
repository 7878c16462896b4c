//! Time source abstraction

/// Monotonic millisecond clock
///
/// The counter is allowed to wrap; consumers compare timestamps with
/// wrapping arithmetic.
pub trait Monotonic {
    /// Milliseconds since an arbitrary fixed origin (usually boot)
    fn now_ms(&self) -> u32;
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
