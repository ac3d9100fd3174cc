//! Trainer: fits a least-squares linear model over look-back windows of
//! the accumulated data log, reports training error, and predicts forward
//! autoregressively.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use ouro_core::{Result, DATA_LOG, PREDICTIONS};

use super::datalog;

#[derive(Clone, Debug)]
pub struct TrainerConfig {
    pub store_root: PathBuf,
    /// Number of previous samples used as features for the next one.
    pub look_back: usize,
    /// Interval between data-log checks while waiting for enough samples.
    pub check_interval: Duration,
    /// Steps to predict; defaults to the sample count.
    pub predict_steps: Option<usize>,
}

/// Sliding windows of `look_back` samples paired with the sample that
/// follows each window. Empty when there is not enough data.
pub fn create_sequences(data: &[f64], look_back: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut features = Vec::new();
    let mut targets = Vec::new();
    if look_back == 0 || data.len() <= look_back {
        return (features, targets);
    }
    for i in 0..data.len() - look_back {
        features.push(data[i..i + look_back].to_vec());
        targets.push(data[i + look_back]);
    }
    (features, targets)
}

#[derive(Clone, Debug)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Ordinary least squares with intercept via the normal equations. A
    /// tiny ridge term keeps the system solvable when feature columns are
    /// collinear, which sliding windows of a smooth series always are.
    pub fn fit(features: &[Vec<f64>], targets: &[f64]) -> Option<Self> {
        let rows = features.len();
        if rows == 0 || rows != targets.len() {
            return None;
        }
        let k = features[0].len() + 1;

        let mut xtx = vec![vec![0.0f64; k]; k];
        let mut xty = vec![0.0f64; k];
        for (row, &y) in features.iter().zip(targets) {
            if row.len() + 1 != k {
                return None;
            }
            let mut aug = Vec::with_capacity(k);
            aug.push(1.0);
            aug.extend_from_slice(row);
            for i in 0..k {
                xty[i] += aug[i] * y;
                for j in 0..k {
                    xtx[i][j] += aug[i] * aug[j];
                }
            }
        }
        let trace: f64 = (0..k).map(|i| xtx[i][i]).sum();
        let damp = 1e-9 * (trace / k as f64).max(1.0);
        for (i, row) in xtx.iter_mut().enumerate() {
            row[i] += damp;
        }

        let weights = solve(xtx, xty)?;
        Some(Self {
            intercept: weights[0],
            coefficients: weights[1..].to_vec(),
        })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    pub fn mean_absolute_error(&self, features: &[Vec<f64>], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let total: f64 = features
            .iter()
            .zip(targets)
            .map(|(row, &y)| (self.predict(row) - y).abs())
            .sum();
        total / targets.len() as f64
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in row + 1..n {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }
    Some(x)
}

/// Predict `steps` values forward, feeding each prediction back into the
/// window.
pub fn predict_forward(
    model: &LinearModel,
    data: &[f64],
    look_back: usize,
    steps: usize,
) -> Vec<f64> {
    if data.len() < look_back {
        return Vec::new();
    }
    let mut window: Vec<f64> = data[data.len() - look_back..].to_vec();
    let mut predictions = Vec::with_capacity(steps);
    for _ in 0..steps {
        let next = model.predict(&window[window.len() - look_back..]);
        predictions.push(next);
        window.push(next);
    }
    predictions
}

/// Wait for the data log to hold enough samples, fit, report training MAE,
/// predict forward, and write the predictions artifact. Interrupt while
/// waiting exits cleanly.
pub async fn run_trainer(config: TrainerConfig) -> Result<()> {
    let data_path = config.store_root.join(DATA_LOG);
    let out_path = config.store_root.join(PREDICTIONS);
    let needed = config.look_back + 1;

    info!(
        "trainer waiting for {} to hold at least {needed} samples",
        data_path.display()
    );
    let data = loop {
        match datalog::load(&data_path).await {
            Some(data) if data.len() >= needed => {
                info!("loaded {} samples, proceeding with training", data.len());
                break data;
            }
            Some(data) => info!(
                "{} holds {} samples, need at least {needed}; retrying",
                data_path.display(),
                data.len()
            ),
            None => info!("{} not found or empty; retrying", data_path.display()),
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("trainer stopped by interrupt");
                return Ok(());
            }
            _ = tokio::time::sleep(config.check_interval) => {}
        }
    };

    let (features, targets) = create_sequences(&data, config.look_back);
    let Some(model) = LinearModel::fit(&features, &targets) else {
        warn!("could not fit a model over {} sequences", features.len());
        return Ok(());
    };
    info!(
        "model trained: coefficients {:?}, intercept {:.4}",
        model.coefficients, model.intercept
    );
    let mae = model.mean_absolute_error(&features, &targets);
    info!("mean absolute error on training data: {mae:.4}");

    let steps = config.predict_steps.unwrap_or(data.len());
    let predictions = predict_forward(&model, &data, config.look_back, steps);

    let doc = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "look_back": config.look_back,
        "training_mae": mae,
        "predicted": predictions,
    });
    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');
    tokio::fs::write(&out_path, text).await?;
    info!(
        "wrote {} predictions to {}",
        predictions.len(),
        out_path.display()
    );
    Ok(())
}
