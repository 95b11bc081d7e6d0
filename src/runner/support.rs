#[derive(Debug, Copy)]
#[doc(hidden)]
pub struct HListIterator<'a, Inner: ?Sized>(pub &'a Inner);

impl<'a, T: ?Sized> Clone for HListIterator<'a, T> {
    fn clone(&self) -> Self {
        Self(<&T>::clone(&self.0))
    }
}

pub use core::hint::black_box;

/// Type-level push onto the tail of a `(head, tail)` list so that benchmarks
/// run (and are reported) in the order they were added.
#[doc(hidden)]
pub trait Append<X> {
    type Output;

    fn append(self, x: X) -> Self::Output;
}

impl<X> Append<X> for () {
    type Output = (X, ());

    fn append(self, x: X) -> (X, ()) {
        (x, ())
    }
}

impl<X, H, T: Append<X>> Append<X> for (H, T) {
    type Output = (H, T::Output);

    fn append(self, x: X) -> Self::Output {
        (self.0, self.1.append(x))
    }
}
