//! Simulation of a filter observing a measurement source.
//!
//! A [`Scenario`] holds the model matrices, the initial estimate and the measured signal. It is
//! plain configuration, passed explicitly to whatever needs it, and can be read from JSON.
//! [`simulate`] runs the filter loop and records a [`Trace`].

use std::io;

use log::info;
use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MeasurementError};
use crate::estimators::KalmanFilter;
use crate::linalg::Matrix;
use crate::measurement::{MeasurementSource, Voltmeter};
use crate::models::Estimator;

/// Configuration of a filtering run.
///
/// The defaults observe a constant 1.50 V with a voltmeter of noise 0.3, starting from a poor
/// initial estimate of 5 V.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// State transition matrix A
    pub transition: Matrix,
    /// Control matrix B
    pub control: Matrix,
    /// Observation matrix H
    pub observation: Matrix,
    /// Measurement noise covariance R
    pub measurement_noise: Matrix,
    /// Process noise covariance Q
    pub process_noise: Matrix,
    /// Initial state estimate
    pub initial_state: Matrix,
    /// Initial error covariance
    pub initial_covariance: Matrix,
    /// Control input u applied at every step
    pub control_input: Matrix,
    /// Number of measurements taken
    pub steps: usize,
    /// True value of the measured signal
    pub true_value: f64,
    /// Standard deviation of the measurement noise
    pub noise: f64,
    /// Seed for the measurement noise, entropy if absent
    pub seed: Option<u64>,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            transition: Matrix::scalar(1.),
            control: Matrix::scalar(0.),
            observation: Matrix::scalar(1.),
            measurement_noise: Matrix::scalar(0.2),
            process_noise: Matrix::scalar(0.0001),
            initial_state: Matrix::scalar(5.),
            initial_covariance: Matrix::scalar(1.),
            control_input: Matrix::scalar(0.),
            steps: 50,
            true_value: 1.50,
            noise: 0.3,
            seed: None,
        }
    }
}

impl Scenario {
    /// The filter configured by this scenario.
    pub fn filter(&self) -> Result<KalmanFilter, MatrixError> {
        KalmanFilter::from_matrices(
            self.transition.clone(),
            self.control.clone(),
            self.observation.clone(),
            self.measurement_noise.clone(),
            self.process_noise.clone(),
            self.initial_state.clone(),
            self.initial_covariance.clone(),
        )
    }

    /// A voltmeter observing the scenario's signal.
    pub fn voltmeter<R: RngCore>(&self, rng: R) -> Result<Voltmeter<R>, MeasurementError> {
        Voltmeter::new(self.true_value, self.noise, rng)
    }
}

/// Per step record of a run.
///
/// Entry `k` holds the estimate and covariance the filter had when measurement `k` was taken,
/// so the first estimate is the initial state. Only the first state component is recorded.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Trace {
    pub actual: Vec<f64>,
    pub measured: Vec<f64>,
    pub estimated: Vec<f64>,
    pub covariance: Vec<f64>,
}

impl Trace {
    fn with_capacity(steps: usize) -> Self {
        Trace {
            actual: Vec::with_capacity(steps),
            measured: Vec::with_capacity(steps),
            estimated: Vec::with_capacity(steps),
            covariance: Vec::with_capacity(steps),
        }
    }

    pub fn len(&self) -> usize {
        self.measured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measured.is_empty()
    }

    /// Writes `step,actual,measured,estimated,covariance` rows with a header.
    pub fn to_csv<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "step,actual,measured,estimated,covariance")?;
        for k in 0..self.len() {
            writeln!(
                w,
                "{},{},{},{},{}",
                k, self.actual[k], self.measured[k], self.estimated[k], self.covariance[k]
            )?;
        }
        w.flush()
    }
}

/// Runs `scenario.steps` filter steps on measurements from `source`.
///
/// A step failure ends the run with its error; the filter keeps the state of the last good step.
pub fn simulate<S: MeasurementSource>(
    scenario: &Scenario,
    filter: &mut KalmanFilter,
    source: &mut S,
) -> Result<Trace, MatrixError> {
    let mut trace = Trace::with_capacity(scenario.steps);
    for _ in 0..scenario.steps {
        let z = source.measure();
        trace.actual.push(source.true_value());
        trace.measured.push(z);
        trace.estimated.push(filter.state()[(0, 0)]);
        trace.covariance.push(filter.covariance()[(0, 0)]);

        filter.step(z, &scenario.control_input)?;
    }
    info!(
        "simulated {} steps, final estimate {} covariance {}",
        scenario.steps,
        filter.state()[(0, 0)],
        filter.covariance()[(0, 0)]
    );
    Ok(trace)
}
