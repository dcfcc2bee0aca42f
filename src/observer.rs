/// Receives the reconstruction error reported during training.
pub trait ErrorObserver {
    fn on_error_calculated(&mut self, mean_squared_error: f64);
}

impl<F> ErrorObserver for F
where
    F: FnMut(f64),
{
    fn on_error_calculated(&mut self, mean_squared_error: f64) {
        self(mean_squared_error)
    }
}
