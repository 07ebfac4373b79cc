use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Frequency readings drifting around `nominal`, clamped into `(low, high)`.
fn frequency_walk(rng: &mut SimpleRng, n: usize, nominal: f64, step: f64, low: f64, high: f64) -> Vec<f64> {
    let mut value = nominal;
    (0..n)
        .map(|_| {
            value = rng.gauss(value, step).clamp(low, high);
            value
        })
        .collect()
}

fn write_values(path: &Path, values: &[f64]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for v in values {
        writeln!(out, "{v:.6}")?;
    }
    out.flush()?;
    println!("Wrote {} values to {}", values.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let data_dir = Path::new("data");
    std::fs::create_dir_all(data_dir).context("creating data directory")?;

    // Test-suite readings lost one decimal place: all below 1.
    let tst = frequency_walk(&mut rng, 120, 0.5, 0.02, 0.01, 0.99);
    write_values(&data_dir.join("tst_suit.txt"), &tst)?;

    // NBS readings are stored in hundredths: all above 10.
    let nbs = frequency_walk(&mut rng, 60, 500.0, 8.0, 100.0, 999.0);
    write_values(&data_dir.join("nbs.txt"), &nbs)?;

    Ok(())
}
