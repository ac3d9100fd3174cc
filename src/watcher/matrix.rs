//! The four 5x5 element-wise matrix work units, one per trigger artifact.

use rand::Rng;

pub const SIZE: usize = 5;

pub type Grid = [[i64; SIZE]; SIZE];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixOp {
    Multiply,
    Divide,
    Subtract,
    Add,
}

impl MatrixOp {
    /// Work unit bound to a selector choice.
    pub fn for_trigger(choice: u8) -> Option<Self> {
        match choice {
            1 => Some(Self::Multiply),
            2 => Some(Self::Divide),
            3 => Some(Self::Subtract),
            4 => Some(Self::Add),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Multiply => "multiplication",
            Self::Divide => "division",
            Self::Subtract => "subtraction",
            Self::Add => "addition",
        }
    }
}

pub fn random_grid(min: i64, max: i64) -> Grid {
    let mut rng = rand::thread_rng();
    let mut grid = [[0i64; SIZE]; SIZE];
    for row in &mut grid {
        for cell in row.iter_mut() {
            *cell = rng.gen_range(min..=max);
        }
    }
    grid
}

/// Apply the op element-wise, returning the 25 results flattened row-major.
/// A zero divisor yields 0.0 instead of an error.
pub fn apply(op: MatrixOp, a: &Grid, b: &Grid) -> Vec<f64> {
    let mut out = Vec::with_capacity(SIZE * SIZE);
    for i in 0..SIZE {
        for j in 0..SIZE {
            let (x, y) = (a[i][j] as f64, b[i][j] as f64);
            out.push(match op {
                MatrixOp::Multiply => x * y,
                MatrixOp::Divide => {
                    if b[i][j] == 0 {
                        0.0
                    } else {
                        x / y
                    }
                }
                MatrixOp::Subtract => x - y,
                MatrixOp::Add => x + y,
            });
        }
    }
    out
}

/// One full work unit: two fresh random grids, combined element-wise.
/// Operands stay in 1..=10 so division never sees a zero divisor.
pub fn run_work_unit(op: MatrixOp) -> Vec<f64> {
    let a = random_grid(1, 10);
    let b = random_grid(1, 10);
    apply(op, &a, &b)
}
