//! Fixed-size radix-2 FFT for real frames.

use std::f64::consts::PI;

/// Radix-2 Cooley-Tukey FFT with precomputed twiddles for one power-of-two size.
#[derive(Debug, Clone)]
pub struct RealFft {
    n: usize,
    bit_rev: Vec<usize>,
    twiddle_re: Vec<f64>,
    twiddle_im: Vec<f64>,
}

impl RealFft {
    /// Plans an FFT of size `n`. Returns `None` unless `n` is a power of two.
    pub fn new(n: usize) -> Option<Self> {
        if n == 0 || !n.is_power_of_two() {
            return None;
        }
        let bits = n.trailing_zeros();
        let bit_rev = (0..n)
            .map(|i| if bits == 0 { 0 } else { i.reverse_bits() >> (usize::BITS - bits) })
            .collect();
        let (twiddle_re, twiddle_im) = (0..n / 2)
            .map(|k| {
                let angle = -2.0 * PI * k as f64 / n as f64;
                (angle.cos(), angle.sin())
            })
            .unzip();
        Some(Self {
            n,
            bit_rev,
            twiddle_re,
            twiddle_im,
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    /// Number of non-negative frequency bins, `n / 2 + 1`.
    pub fn num_bins(&self) -> usize {
        self.n / 2 + 1
    }

    /// Transforms a real frame and writes `|X[k]|` for the non-negative bins.
    ///
    /// `frame.len()` must equal the planned size and `out.len()` must equal
    /// [`num_bins`](Self::num_bins). `re` and `im` are caller-owned scratch.
    pub fn magnitude(&self, frame: &[f64], re: &mut [f64], im: &mut [f64], out: &mut [f64]) {
        self.transform(frame, re, im);
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = (re[k] * re[k] + im[k] * im[k]).sqrt();
        }
    }

    fn transform(&self, frame: &[f64], re: &mut [f64], im: &mut [f64]) {
        let n = self.n;
        for i in 0..n {
            re[self.bit_rev[i]] = frame[i];
        }
        im[..n].fill(0.0);

        let mut size = 2;
        while size <= n {
            let half = size / 2;
            let stride = n / size;
            let mut start = 0;
            while start < n {
                for k in 0..half {
                    let w_r = self.twiddle_re[k * stride];
                    let w_i = self.twiddle_im[k * stride];
                    let u = start + k;
                    let v = u + half;

                    let t_r = w_r * re[v] - w_i * im[v];
                    let t_i = w_r * im[v] + w_i * re[v];

                    re[v] = re[u] - t_r;
                    im[v] = im[u] - t_i;
                    re[u] += t_r;
                    im[u] += t_i;
                }
                start += size;
            }
            size <<= 1;
        }
    }
}
