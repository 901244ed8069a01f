//! Streaming statistics over a simulated path.
//!
//! Statistics are accumulated as prices are observed, so payoffs that only
//! need an average or an extremum never hold the full path.

/// Running statistics of a price path.
///
/// # Example
///
/// ```
/// use pricer_pricing::path_dependent::PathObserver;
///
/// let mut observer = PathObserver::new();
/// for price in [100.0, 105.0, 110.0, 95.0] {
///     observer.observe(price);
/// }
/// assert_eq!(observer.count(), 4);
/// assert_eq!(observer.arithmetic_average(), 102.5);
/// assert_eq!(observer.maximum(), 110.0);
/// assert_eq!(observer.minimum(), 95.0);
/// assert_eq!(observer.terminal(), 95.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathObserver {
    sum: f64,
    log_sum: f64,
    max: f64,
    min: f64,
    count: usize,
    terminal: f64,
}

impl Default for PathObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathObserver {
    /// Empty observer.
    #[inline]
    pub fn new() -> Self {
        Self {
            sum: 0.0,
            log_sum: 0.0,
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
            count: 0,
            terminal: 0.0,
        }
    }

    /// Observer over a whole path.
    pub fn from_path(path: &[f64]) -> Self {
        let mut observer = Self::new();
        path.iter().for_each(|&s| observer.observe(s));
        observer
    }

    /// Observes a price; the latest observation is the terminal value.
    #[inline]
    pub fn observe(&mut self, price: f64) {
        self.sum += price;
        self.log_sum += price.ln();
        self.max = self.max.max(price);
        self.min = self.min.min(price);
        self.count += 1;
        self.terminal = price;
    }

    /// Number of observations.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// `Σ S_i / n`; zero before any observation.
    #[inline]
    pub fn arithmetic_average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// `exp(Σ ln S_i / n)`; zero before any observation.
    #[inline]
    pub fn geometric_average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.log_sum / self.count as f64).exp()
        }
    }

    /// Largest observation, `-inf` when empty.
    #[inline]
    pub fn maximum(&self) -> f64 {
        self.max
    }

    /// Smallest observation, `+inf` when empty.
    #[inline]
    pub fn minimum(&self) -> f64 {
        self.min
    }

    /// Last observation.
    #[inline]
    pub fn terminal(&self) -> f64 {
        self.terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty() {
        let o = PathObserver::new();
        assert_eq!(o.count(), 0);
        assert_eq!(o.arithmetic_average(), 0.0);
        assert_eq!(o.geometric_average(), 0.0);
        assert!(o.maximum().is_infinite());
    }

    #[test]
    fn test_averages() {
        let o = PathObserver::from_path(&[1.0, 4.0, 16.0]);
        assert_relative_eq!(o.arithmetic_average(), 7.0);
        assert_relative_eq!(o.geometric_average(), 4.0, epsilon = 1e-12);
        assert!(o.geometric_average() <= o.arithmetic_average());
    }
}
