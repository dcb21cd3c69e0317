//! Measurement sources feeding the filter.
//!
//! A [`MeasurementSource`] produces one noisy scalar observation of a true signal per call.

use rand_core::RngCore;
use rand_distr::{Distribution, Normal};

use crate::error::MeasurementError;

/// Producer of noisy scalar observations.
pub trait MeasurementSource {
    /// One observation.
    fn measure(&mut self) -> f64;

    /// The true value being observed.
    fn true_value(&self) -> f64;
}

/// A voltmeter observing a constant voltage with additive Gaussian noise.
pub struct Voltmeter<R: RngCore> {
    voltage: f64,
    sigma: f64,
    noise: Normal<f64>,
    rng: R,
}

impl<R: RngCore> Voltmeter<R> {
    /// Voltmeter reading `voltage` with noise standard deviation `noise`, drawing from `rng`.
    pub fn new(voltage: f64, noise: f64, rng: R) -> Result<Self, MeasurementError> {
        if !noise.is_finite() || noise < 0. {
            return Err(MeasurementError::InvalidNoise(noise));
        }
        let sigma = noise;
        let noise = Normal::new(voltage, sigma).map_err(|_| MeasurementError::InvalidNoise(sigma))?;
        Ok(Voltmeter {
            voltage,
            sigma,
            noise,
            rng,
        })
    }

    /// Noise standard deviation.
    pub fn noise(&self) -> f64 {
        self.sigma
    }
}

impl<R: RngCore> MeasurementSource for Voltmeter<R> {
    fn measure(&mut self) -> f64 {
        self.noise.sample(&mut self.rng)
    }

    fn true_value(&self) -> f64 {
        self.voltage
    }
}

/// Replays a recorded sequence of measurements, starting again from the first when exhausted.
#[derive(Clone, Debug)]
pub struct Replay {
    truth: f64,
    values: Vec<f64>,
    next: usize,
}

impl Replay {
    pub fn new(truth: f64, values: Vec<f64>) -> Result<Self, MeasurementError> {
        if values.is_empty() {
            return Err(MeasurementError::EmptyReplay);
        }
        Ok(Replay {
            truth,
            values,
            next: 0,
        })
    }

    /// Records `count` measurements from `source`.
    pub fn record(source: &mut impl MeasurementSource, count: usize) -> Result<Self, MeasurementError> {
        let values = (0..count).map(|_| source.measure()).collect();
        Replay::new(source.true_value(), values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl MeasurementSource for Replay {
    fn measure(&mut self) -> f64 {
        let z = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        z
    }

    fn true_value(&self) -> f64 {
        self.truth
    }
}
