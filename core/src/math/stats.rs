pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean in iteration order. Summation order is
    /// preserved so repeated runs over the same buffer are
    /// bit-for-bit reproducible.
    pub fn mean<I>(values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in values {
            sum += value;
            count += 1;
        }
        if count == 0 {
            return 0.0;
        }
        sum / count as f64
    }

    /// Largest absolute value seen, 0.0 for an empty sequence.
    pub fn peak<I>(values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .fold(0.0f64, |peak, value| peak.max(value.abs()))
    }
}
