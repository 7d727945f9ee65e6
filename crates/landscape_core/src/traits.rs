/// A scalar function of two real variables.
///
/// Implementations must be pure: the same `(x, y)` always yields the same value and
/// evaluation has no side effects. The engine relies on this but never checks it.
/// Implementations that are also `Sync` may be sampled from several threads at once.
pub trait Surface {
    /// Evaluates the function at `(x, y)`.
    /// Errors are handed back to the caller exactly as returned.
    fn evaluate(&self, x: f64, y: f64) -> anyhow::Result<f64>;
}

impl<F> Surface for F
where
    F: Fn(f64, f64) -> f64,
{
    fn evaluate(&self, x: f64, y: f64) -> anyhow::Result<f64> {
        Ok(self(x, y))
    }
}

/// Adapts a closure that can fail into a `Surface`.
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F>(pub F);

impl<F> Surface for Fallible<F>
where
    F: Fn(f64, f64) -> anyhow::Result<f64>,
{
    fn evaluate(&self, x: f64, y: f64) -> anyhow::Result<f64> {
        (self.0)(x, y)
    }
}
