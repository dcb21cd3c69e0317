#![allow(non_snake_case)]

//! Test the Kalman filter recursion.
//!
//! The scalar voltmeter filter is checked against hand computed values and for convergence.
//! A two state constant velocity filter is checked against the same recursion written with nalgebra.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kalman1d::linalg::Matrix;
use kalman1d::measurement::{MeasurementSource, Replay, Voltmeter};
use kalman1d::models::{Estimator, KalmanEstimator, KalmanState};
use kalman1d::{KalmanFilter, MatrixError};

const VOLTAGE: f64 = 1.50;
const NOISE: f64 = 0.3;

fn voltmeter_filter() -> KalmanFilter {
    KalmanFilter::from_matrices(
        Matrix::scalar(1.),
        Matrix::scalar(0.),
        Matrix::scalar(1.),
        Matrix::scalar(0.2),
        Matrix::scalar(0.0001),
        Matrix::scalar(5.),
        Matrix::scalar(1.),
    )
    .unwrap()
}

fn no_control() -> Matrix {
    Matrix::scalar(0.)
}

/// Run the filter over all measurements, returning the estimate before each step and the final one.
fn run(filter: &mut KalmanFilter, source: &mut impl MeasurementSource, steps: usize) -> Vec<f64> {
    let mut estimates = vec![filter.state()[(0, 0)]];
    for _ in 0..steps {
        filter.step(source.measure(), &no_control()).unwrap();
        estimates.push(filter.state()[(0, 0)]);
    }
    estimates
}

#[test]
fn test_single_step() {
    let mut filter = voltmeter_filter();
    let innov = filter.step(6., &no_control()).unwrap();

    // X' = 1 + 0.0001, S = X' + 0.2
    let X_pred = 1.0001;
    let K = X_pred / (X_pred + 0.2);
    assert_relative_eq!(innov.S[(0, 0)], 1.2001, epsilon = 1e-12);
    assert_relative_eq!(innov.y[(0, 0)], 1., epsilon = 1e-12);
    assert_relative_eq!(innov.K[(0, 0)], K, epsilon = 1e-12);
    assert!(innov.K[(0, 0)] > 0. && innov.K[(0, 0)] < 1.);

    let x = filter.state()[(0, 0)];
    assert!(x > 5. && x < 6.);
    assert_relative_eq!(x, 5. + K, epsilon = 1e-12);
    assert_relative_eq!(filter.covariance()[(0, 0)], (1. - K) * X_pred, epsilon = 1e-12);
}

#[test]
fn test_convergence() {
    let mut voltmeter = Voltmeter::new(VOLTAGE, NOISE, StdRng::seed_from_u64(1234)).unwrap();
    let mut filter = voltmeter_filter();
    let estimates = run(&mut filter, &mut voltmeter, 50);

    assert_eq!(estimates[0], 5.);
    let final_estimate = *estimates.last().unwrap();
    assert!((final_estimate - VOLTAGE).abs() < 0.3, "final estimate {}", final_estimate);

    let early: f64 = estimates[..10].iter().map(|x| (x - VOLTAGE).abs()).sum();
    let late: f64 = estimates[estimates.len() - 10..].iter().map(|x| (x - VOLTAGE).abs()).sum();
    assert!(late < early);

    assert!(filter.covariance()[(0, 0)] < 1.);
}

#[test]
fn test_covariance_decreases() {
    // The covariance recursion does not depend on the measurements
    let mut filter = voltmeter_filter();
    let mut previous = filter.covariance()[(0, 0)];
    for k in 0..50 {
        filter.step(k as f64, &no_control()).unwrap();
        let X = filter.covariance()[(0, 0)];
        assert!(X <= previous);
        assert!(X > 0.);
        previous = X;
    }
    assert!(previous < 0.01);
}

#[test]
fn test_deterministic() {
    let mut voltmeter = Voltmeter::new(VOLTAGE, NOISE, StdRng::seed_from_u64(99)).unwrap();
    let recorded = Replay::record(&mut voltmeter, 50).unwrap();

    assert_eq!(recorded.values().len(), 50);
    let first = run(&mut voltmeter_filter(), &mut recorded.clone(), 50);
    let second = run(&mut voltmeter_filter(), &mut recorded.clone(), 50);
    assert_eq!(first, second);
}

#[test]
fn test_models_from_matrices() {
    let filter = KalmanFilter::from_matrices(
        Matrix::scalar(1.),
        Matrix::scalar(2.),
        Matrix::scalar(3.),
        Matrix::scalar(0.2),
        Matrix::scalar(0.1),
        Matrix::scalar(5.),
        Matrix::scalar(1.),
    )
    .unwrap();
    assert_eq!(filter.predict_model().Fx, Matrix::scalar(1.));
    assert_eq!(filter.predict_model().Fu, Matrix::scalar(2.));
    assert_eq!(filter.observe_model().Hx, Matrix::scalar(3.));
    assert_eq!(filter.observe_model().dim(), 1);
}

#[test]
fn test_construct_conformance() {
    let s = Matrix::scalar;
    // A not square
    assert!(matches!(
        KalmanFilter::from_matrices(Matrix::zeros(1, 2).unwrap(), s(0.), s(1.), s(0.2), s(0.1), s(5.), s(1.)),
        Err(MatrixError::Dimension { .. })
    ));
    // H with the wrong number of columns
    assert!(matches!(
        KalmanFilter::from_matrices(s(1.), s(0.), Matrix::zeros(1, 2).unwrap(), s(0.2), s(0.1), s(5.), s(1.)),
        Err(MatrixError::Dimension { .. })
    ));
    // R not matching H's rows
    assert!(matches!(
        KalmanFilter::from_matrices(s(1.), s(0.), s(1.), Matrix::zeros(2, 2).unwrap(), s(0.1), s(5.), s(1.)),
        Err(MatrixError::Dimension { .. })
    ));
    // Q not n x n
    assert!(matches!(
        KalmanFilter::from_matrices(s(1.), s(0.), s(1.), s(0.2), Matrix::zeros(2, 2).unwrap(), s(5.), s(1.)),
        Err(MatrixError::Dimension { .. })
    ));
    // x not a column
    assert!(matches!(
        KalmanFilter::from_matrices(s(1.), s(0.), s(1.), s(0.2), s(0.1), Matrix::zeros(1, 2).unwrap(), s(1.)),
        Err(MatrixError::Dimension { .. })
    ));
    // B with the wrong number of rows
    assert!(matches!(
        KalmanFilter::from_matrices(s(1.), Matrix::zeros(2, 1).unwrap(), s(1.), s(0.2), s(0.1), s(5.), s(1.)),
        Err(MatrixError::Dimension { .. })
    ));
}

#[test]
fn test_singular_innovation_keeps_state() {
    // With no noise and no uncertainty the innovation covariance is zero
    let mut filter = KalmanFilter::from_matrices(
        Matrix::scalar(1.),
        Matrix::scalar(0.),
        Matrix::scalar(1.),
        Matrix::scalar(0.),
        Matrix::scalar(0.),
        Matrix::scalar(5.),
        Matrix::scalar(0.),
    )
    .unwrap();
    let before = filter.kalman_state();

    assert_eq!(filter.step(6., &no_control()), Err(MatrixError::Singular { row: 0 }));
    assert_eq!(filter.kalman_state(), before);
}

#[test]
fn test_bad_control_keeps_state() {
    let mut filter = voltmeter_filter();
    filter.step(2., &no_control()).unwrap();
    let before = filter.kalman_state();

    let u = Matrix::zeros(2, 1).unwrap();
    assert!(matches!(filter.step(3., &u), Err(MatrixError::Dimension { .. })));
    assert_eq!(filter.kalman_state(), before);
}

#[test]
fn test_control_input() {
    // x' = x + 2u with no measurement weight on the prediction error
    let mut filter = KalmanFilter::from_matrices(
        Matrix::scalar(1.),
        Matrix::scalar(2.),
        Matrix::scalar(1.),
        Matrix::scalar(1e6),
        Matrix::scalar(0.),
        Matrix::scalar(0.),
        Matrix::scalar(1e-9),
    )
    .unwrap();
    filter.step(100., &Matrix::scalar(0.5)).unwrap();
    assert_abs_diff_eq!(filter.state()[(0, 0)], 1., epsilon = 1e-6);
}

#[test]
fn test_init() {
    let mut filter = voltmeter_filter();
    let state = KalmanState::new(Matrix::scalar(2.), Matrix::scalar(0.5)).unwrap();
    filter.init(&state).unwrap();
    assert_eq!(filter.kalman_state(), state);

    let wrong = KalmanState::new_zero(2).unwrap();
    assert!(filter.init(&wrong).is_err());
    assert_eq!(filter.kalman_state(), state);
}

const DT: f64 = 0.1;

fn to_matrix(m: &DMatrix<f64>) -> Matrix {
    Matrix::try_from(m).unwrap()
}

fn constant_velocity() -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
    let A = DMatrix::from_row_slice(2, 2, &[1., DT, 0., 1.]);
    let B = DMatrix::from_row_slice(2, 1, &[0.5 * DT * DT, DT]);
    let H = DMatrix::from_row_slice(1, 2, &[1., 0.]);
    let R = DMatrix::from_row_slice(1, 1, &[0.01]);
    let Q = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![1e-6, 1e-6]));
    (A, B, H, R, Q)
}

#[test]
fn test_two_states_match_nalgebra() {
    let (A, B, H, R, Q) = constant_velocity();
    let mut x = DMatrix::<f64>::zeros(2, 1);
    let mut X = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![10., 10.]));

    let mut filter = KalmanFilter::from_matrices(
        to_matrix(&A),
        to_matrix(&B),
        to_matrix(&H),
        to_matrix(&R),
        to_matrix(&Q),
        to_matrix(&x),
        to_matrix(&X),
    )
    .unwrap();

    let u = DMatrix::from_row_slice(1, 1, &[0.]);
    for k in 0..100 {
        // Target moving at 2 units per second
        let z = 2. * DT * (k + 1) as f64;

        let x_pred = &A * &x + &B * &u;
        let X_pred = &A * &X * A.transpose() + &Q;
        let y = DMatrix::from_row_slice(1, 1, &[z]) - &H * &x_pred;
        let S = &H * &X_pred * H.transpose() + &R;
        let K = &X_pred * H.transpose() * S.try_inverse().unwrap();
        x = &x_pred + &K * &y;
        X = (DMatrix::identity(2, 2) - &K * &H) * &X_pred;

        filter.step(z, &to_matrix(&u)).unwrap();
        assert_relative_eq!(*filter.state(), to_matrix(&x), epsilon = 1e-9);
        assert_relative_eq!(*filter.covariance(), to_matrix(&X), epsilon = 1e-9);
    }

    assert_abs_diff_eq!(filter.state()[(1, 0)], 2., epsilon = 0.05);
}

#[test]
fn test_vector_observation() {
    // Observe position and velocity together
    let (A, B, _, _, Q) = constant_velocity();
    let H = Matrix::identity_of(2).unwrap();
    let R = Matrix::from_diagonal(&[0.01, 0.04]).unwrap();
    let mut filter = KalmanFilter::from_matrices(
        to_matrix(&A),
        to_matrix(&B),
        H,
        R,
        to_matrix(&Q),
        Matrix::zeros(2, 1).unwrap(),
        Matrix::identity_of(2).unwrap(),
    )
    .unwrap();

    assert!(matches!(
        filter.step(1., &Matrix::scalar(0.)),
        Err(MatrixError::Dimension { op: "step", .. })
    ));

    let z = Matrix::from_row_slice(2, 1, &[1., 2.]).unwrap();
    let innov = filter.step_vector(&z, &Matrix::scalar(0.)).unwrap();
    assert_eq!(innov.K.shape(), (2, 2));
    assert_eq!(innov.S.shape(), (2, 2));
    assert!(filter.state()[(0, 0)] > 0. && filter.state()[(0, 0)] < 1.);
    assert!(filter.state()[(1, 0)] > 0. && filter.state()[(1, 0)] < 2.);
}
